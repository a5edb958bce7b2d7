//! Grapheme segmentation.
//!
//! Words are decomposed right to left by longest suffix match against a
//! grapheme catalog. Characters the catalog cannot cover become single
//! character units, so segmentation always terminates and concatenating the
//! units gives back the word.

/// Sort graphemes longest first (by `char` count), ties in lexical order.
///
/// [`segment`] expects its candidates in this order.
pub fn sort_by_length_desc<S: AsRef<str>>(graphemes: &[S]) -> Vec<String> {
    let mut sorted: Vec<String> = graphemes
        .iter()
        .map(|g| g.as_ref().to_string())
        .filter(|g| !g.is_empty())
        .collect();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    sorted.dedup();
    sorted
}

/// Split `word` into grapheme units.
///
/// `graphemes` must be sorted longest first (see [`sort_by_length_desc`]).
pub fn segment<S: AsRef<str>>(word: &str, graphemes: &[S]) -> Vec<String> {
    let mut units = Vec::new();
    let mut rest = word;

    while !rest.is_empty() {
        let matched = graphemes
            .iter()
            .map(AsRef::as_ref)
            .find(|g| !g.is_empty() && rest.ends_with(*g));

        let unit = match matched {
            Some(g) => g,
            None => {
                // A Rust char is a whole scalar value; surrogate halves never appear.
                let start = rest.char_indices().next_back().map_or(0, |(i, _)| i);
                &rest[start..]
            }
        };

        units.push(unit.to_string());
        rest = &rest[..rest.len() - unit.len()];
    }

    units.reverse();
    units
}

/// Convert full-notation GPC tokens to plain graphemes.
///
/// A token looks like `grapheme_pronunciation`. A `-` inside the grapheme
/// marks a split digraph: the part before it stays with this token and the
/// part after it is prepended to the next token's grapheme (`a-e_eI` followed
/// by `k_k` gives `a`, `ke`). A dangling tail is kept as its own unit.
pub fn full_gpcs_to_graphemes<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut graphemes = Vec::with_capacity(tokens.len());
    let mut carry = String::new();

    for token in tokens {
        let token = token.as_ref();
        let grapheme = token.split_once('_').map_or(token, |(g, _)| g);

        let (head, tail) = match grapheme.split_once('-') {
            Some((head, tail)) => (head, Some(tail)),
            None => (grapheme, None),
        };

        let mut unit = std::mem::take(&mut carry);
        unit.push_str(head);
        if !unit.is_empty() {
            graphemes.push(unit);
        }
        if let Some(tail) = tail {
            carry.push_str(tail);
        }
    }

    if !carry.is_empty() {
        graphemes.push(carry);
    }
    graphemes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(items: &[&str]) -> Vec<String> {
        sort_by_length_desc(items)
    }

    #[test]
    fn longest_match_wins() {
        let g = catalog(&["a", "c", "h", "ch", "d"]);
        assert_eq!(segment("chad", &g), vec!["ch", "a", "d"]);
    }

    #[test]
    fn matches_from_the_right() {
        // Right-to-left greedy: "sh" is taken before "s" could pair with "h".
        let g = catalog(&["s", "h", "sh", "ss"]);
        assert_eq!(segment("ssh", &g), vec!["s", "sh"]);
    }

    #[test]
    fn unknown_characters_become_single_units() {
        let g = catalog(&["a"]);
        assert_eq!(segment("x,a", &g), vec!["x", ",", "a"]);
        assert_eq!(segment("a\u{1F600}", &g), vec!["a", "\u{1F600}"]);
    }

    #[test]
    fn empty_word_has_no_units() {
        let g = catalog(&["a"]);
        assert!(segment("", &g).is_empty());
    }

    #[test]
    fn segmentation_round_trips() {
        let g = catalog(&["th", "e", "ee", "igh", "t", "n", "\u{0915}\u{094D}"]);
        for word in ["thee", "night", "tenth", "\u{0915}\u{094D}\u{0937}", "x-y'z", ""] {
            assert_eq!(segment(word, &g).concat(), word);
        }
    }

    #[test]
    fn sorting_drops_empty_and_duplicates() {
        assert_eq!(catalog(&["a", "", "igh", "a", "ch"]), vec!["igh", "ch", "a"]);
    }

    #[test]
    fn full_notation_plain_tokens() {
        let tokens = ["c_k", "a_a", "t_t"];
        assert_eq!(full_gpcs_to_graphemes(&tokens), vec!["c", "a", "t"]);
    }

    #[test]
    fn full_notation_split_digraph() {
        let tokens = ["m_m", "a-e_eI", "k_k"];
        let graphemes = full_gpcs_to_graphemes(&tokens);
        assert_eq!(graphemes, vec!["m", "a", "ke"]);
        assert_eq!(graphemes.concat(), "make");
    }

    #[test]
    fn full_notation_dangling_tail() {
        assert_eq!(full_gpcs_to_graphemes(&["o-e_oU"]), vec!["o", "e"]);
    }
}
