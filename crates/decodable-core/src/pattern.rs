//! Helpers for splicing caller-supplied text into regular expressions.
//!
//! Word and grapheme lists come from users and language files, so anything
//! that ends up inside a pattern goes through [`escape`] or [`class_member`].

/// Escape a literal so it matches itself inside a pattern.
pub fn escape(literal: &str) -> String {
    regex::escape(literal)
}

/// Escape one character for use inside a `[...]` class.
///
/// The class-set operators (`--`, `&&`, `~~`) and brackets are escaped as
/// well as the usual metacharacters.
pub fn class_member(ch: char) -> String {
    match ch {
        '\\' | ']' | '[' | '^' | '-' | '&' | '~' => format!("\\{ch}"),
        _ if ch.is_whitespace() || ch.is_control() => format!("\\x{{{:X}}}", ch as u32),
        _ => ch.to_string(),
    }
}

/// Build an alternation of escaped literals, longest first.
///
/// Longest-first ordering makes the leftmost-first regex engine prefer
/// multi-character graphemes over their prefixes. Empty literals are
/// dropped. Returns `None` if nothing is left.
pub fn alternation<'a, I>(literals: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut items: Vec<&str> = literals.into_iter().filter(|s| !s.is_empty()).collect();
    if items.is_empty() {
        return None;
    }
    items.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    items.dedup();
    Some(
        items
            .into_iter()
            .map(escape)
            .collect::<Vec<_>>()
            .join("|"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn escaped_literals_match_themselves() {
        for lit in ["a.b", "(x)", "c++", "[q]", "$1", "a|b", "^~"] {
            let re = Regex::new(&format!("^{}$", escape(lit))).unwrap();
            assert!(re.is_match(lit), "{lit}");
        }
    }

    #[test]
    fn class_members_compile() {
        let members: String = "]-^\\&~[ a'".chars().map(class_member).collect();
        let re = Regex::new(&format!("^[{members}]+$")).unwrap();
        assert!(re.is_match("]-^\\&~[ a'"));
        assert!(!re.is_match("b"));
    }

    #[test]
    fn alternation_prefers_longest() {
        let alt = alternation(["a", "aa", "", "ch", "a"]).unwrap();
        assert_eq!(alt, "aa|ch|a");
        assert!(alternation([""]).is_none());
    }
}
