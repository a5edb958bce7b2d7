//! Sentence and phrase boundary detection over the placeholder buffer.

use std::sync::LazyLock;

use regex::Regex;

use super::holders::{Markup, Piece};
use crate::punctuation::{self, PHRASE_DELIMITER, SentenceRules};

static CLOSING_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[\p{Pf}\p{Pe}"']$"#).expect("valid regex"));

fn is_closing_punctuation(ch: char) -> bool {
    let mut buf = [0u8; 4];
    CLOSING_PUNCTUATION.is_match(ch.encode_utf8(&mut buf))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChunkKind {
    Sentence,
    Space,
}

/// A run of pieces that becomes one fragment.
#[derive(Debug, Clone)]
pub(crate) struct Chunk {
    pub(crate) kind: ChunkKind,
    pub(crate) pieces: Vec<Piece>,
}

fn is_paragraph_break(piece: Piece) -> bool {
    match piece {
        Piece::LineBreak(_) => true,
        Piece::Char(c) => punctuation::is_paragraph_ending(c),
        _ => false,
    }
}

fn is_whitespace(piece: Piece) -> bool {
    match piece {
        Piece::Nbsp(_) => true,
        Piece::Char(c) => c.is_whitespace() && !punctuation::is_paragraph_ending(c),
        _ => false,
    }
}

/// Whitespace plus the invisible things allowed to pad the gap between sentences.
fn is_padding(piece: Piece) -> bool {
    match piece {
        Piece::Empty(_) | Piece::SelfClosing(_) => true,
        Piece::Char(c) if punctuation::is_format(c) => true,
        _ => is_whitespace(piece),
    }
}

fn push_chunk(chunks: &mut Vec<Chunk>, kind: ChunkKind, pieces: &[Piece]) {
    if pieces.is_empty() {
        return;
    }
    if kind == ChunkKind::Space
        && let Some(last) = chunks.last_mut()
        && last.kind == ChunkKind::Space
    {
        last.pieces.extend_from_slice(pieces);
        return;
    }
    chunks.push(Chunk {
        kind,
        pieces: pieces.to_vec(),
    });
}

/// Split the whole buffer into sentence and space chunks.
pub(crate) fn chunk(pieces: &[Piece], rules: &SentenceRules) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut i = 0;

    while i < pieces.len() {
        if is_paragraph_break(pieces[i]) {
            let start = i;
            while i < pieces.len() && (is_paragraph_break(pieces[i]) || is_whitespace(pieces[i])) {
                i += 1;
            }
            push_chunk(&mut chunks, ChunkKind::Space, &pieces[start..i]);
            continue;
        }

        let start = i;
        while i < pieces.len() && !is_paragraph_break(pieces[i]) {
            i += 1;
        }
        chunk_paragraph(&pieces[start..i], rules, &mut chunks);
    }

    chunks
}

/// Chunk one paragraph, peeling leading and trailing whitespace into spaces.
fn chunk_paragraph(paragraph: &[Piece], rules: &SentenceRules, chunks: &mut Vec<Chunk>) {
    let lead = paragraph
        .iter()
        .take_while(|p| is_whitespace(**p))
        .count();
    let trail = paragraph[lead..]
        .iter()
        .rev()
        .take_while(|p| is_whitespace(**p))
        .count();
    let body = &paragraph[lead..paragraph.len() - trail];

    push_chunk(chunks, ChunkKind::Space, &paragraph[..lead]);

    let cues = next_cues(body);
    let mut sentence_start = 0;
    let mut i = 0;
    while i < body.len() {
        match body[i].as_char() {
            Some(c) if rules.is_terminator(c) => match boundary_at(body, &cues, i, rules) {
                Boundary::Accepted {
                    sentence_end,
                    space_end,
                } => {
                    push_sentence(chunks, &body[sentence_start..sentence_end]);
                    push_chunk(chunks, ChunkKind::Space, &body[sentence_end..space_end]);
                    sentence_start = space_end;
                    i = space_end;
                }
                Boundary::Rejected { resume } => i = resume,
            },
            _ => i += 1,
        }
    }
    push_sentence(chunks, &body[sentence_start..]);

    push_chunk(chunks, ChunkKind::Space, &paragraph[paragraph.len() - trail..]);
}

enum Boundary {
    Accepted { sentence_end: usize, space_end: usize },
    Rejected { resume: usize },
}

/// What the first significant character at or after a position says about
/// a boundary before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    /// Sentence-continuing punctuation.
    Continues,
    /// A lowercase letter.
    Lowercase,
    /// Any other letter.
    Letter,
    /// Neither before the end of the paragraph.
    End,
}

/// One backward pass: `cues[k]` describes the first letter or
/// sentence-continuing character in `body[k..]`.
fn next_cues(body: &[Piece]) -> Vec<Cue> {
    let mut cues = vec![Cue::End; body.len() + 1];
    for k in (0..body.len()).rev() {
        cues[k] = match body[k].as_char() {
            Some(c) if punctuation::is_sentence_continuing(c) => Cue::Continues,
            Some(c) if c.is_alphabetic() && c.is_lowercase() => Cue::Lowercase,
            Some(c) if c.is_alphabetic() => Cue::Letter,
            _ => cues[k + 1],
        };
    }
    cues
}

/// Try to match a sentence boundary starting at the terminator at `start`.
///
/// terminators+ (closing punctuation | closing tags)* whitespace padding*
/// opening tags*, and the next letter must not be lowercase nor preceded by
/// sentence-continuing punctuation.
fn boundary_at(body: &[Piece], cues: &[Cue], start: usize, rules: &SentenceRules) -> Boundary {
    let is_terminator = |p: Piece| p.as_char().is_some_and(|c| rules.is_terminator(c));
    let mut j = start;
    while j < body.len() && is_terminator(body[j]) {
        j += 1;
    }
    let resume = j;

    while j < body.len() {
        match body[j] {
            Piece::Close(_) | Piece::Empty(_) => j += 1,
            Piece::Char(c) if is_closing_punctuation(c) || punctuation::is_format(c) => j += 1,
            _ => break,
        }
    }
    let sentence_end = j;

    if !rules.space_terminates() {
        // Format characters are skipped but never count as the required space.
        while j < body.len() && body[j].as_char().is_some_and(punctuation::is_format) {
            j += 1;
        }
        if j >= body.len() || !is_whitespace(body[j]) {
            return Boundary::Rejected { resume };
        }
    }
    while j < body.len() && is_padding(body[j]) {
        j += 1;
    }
    let space_end = j;

    while j < body.len() && matches!(body[j], Piece::Open(_)) {
        j += 1;
    }

    if matches!(cues[j], Cue::Continues | Cue::Lowercase) {
        return Boundary::Rejected { resume };
    }

    Boundary::Accepted {
        sentence_end,
        space_end,
    }
}

/// Push a sentence, splitting it on phrase delimiters.
///
/// Adjacent delimiters collapse; whitespace right after a delimiter becomes
/// its own space chunk so phrases keep their spacing.
fn push_sentence(chunks: &mut Vec<Chunk>, pieces: &[Piece]) {
    let mut first = true;
    for phrase in pieces.split(|p| *p == Piece::Char(PHRASE_DELIMITER)) {
        if phrase.is_empty() {
            continue;
        }
        let lead = if first {
            0
        } else {
            phrase.iter().take_while(|p| is_whitespace(**p)).count()
        };
        push_chunk(chunks, ChunkKind::Space, &phrase[..lead]);
        push_chunk(chunks, ChunkKind::Sentence, &phrase[lead..]);
        first = false;
    }
}

/// Close tags left open at the end of each chunk and reopen them at the
/// start of the next, keeping nesting order.
pub(crate) fn balance_tags(chunks: &mut [Chunk], markup: &Markup) {
    let mut open: Vec<usize> = Vec::new();

    for chunk in chunks.iter_mut() {
        let mut balanced: Vec<Piece> = open.iter().map(|&i| Piece::Open(i)).collect();

        for &piece in &chunk.pieces {
            match piece {
                Piece::Open(i) => open.push(i),
                Piece::Close(c) => {
                    let name = markup.close_name(c);
                    if let Some(pos) = open.iter().rposition(|&o| markup.open_name(o) == name) {
                        open.truncate(pos);
                    }
                }
                _ => {}
            }
            balanced.push(piece);
        }

        balanced.extend(open.iter().rev().map(|&i| Piece::SyntheticClose(i)));
        chunk.pieces = balanced;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragments::holders::lift;

    fn chunk_text(html: &str, rules: &SentenceRules) -> Vec<(ChunkKind, String)> {
        let (pieces, markup) = lift(html);
        chunk(&pieces, rules)
            .into_iter()
            .map(|c| (c.kind, markup.render(&c.pieces)))
            .collect()
    }

    #[test]
    fn sentences_and_spaces_alternate() {
        let chunks = chunk_text("One. Two! Three?", &SentenceRules::new());
        assert_eq!(
            chunks,
            vec![
                (ChunkKind::Sentence, "One.".to_string()),
                (ChunkKind::Space, " ".to_string()),
                (ChunkKind::Sentence, "Two!".to_string()),
                (ChunkKind::Space, " ".to_string()),
                (ChunkKind::Sentence, "Three?".to_string()),
            ]
        );
    }

    #[test]
    fn lowercase_continuation_is_not_a_break() {
        let chunks = chunk_text("Wait... what? Yes.", &SentenceRules::new());
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].1, "Wait... what?");
    }

    #[test]
    fn continuing_punctuation_is_not_a_break() {
        let chunks = chunk_text("He said \"Go!\" , Then left.", &SentenceRules::new());
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn closing_quotes_stay_with_sentence() {
        let chunks = chunk_text("\"Run!\" Then he ran.", &SentenceRules::new());
        assert_eq!(chunks[0].1, "\"Run!\"");
        assert_eq!(chunks[2].1, "Then he ran.");
    }

    #[test]
    fn format_characters_do_not_make_a_space() {
        let chunks = chunk_text("One.\u{200B}Two.", &SentenceRules::new());
        assert_eq!(chunks.len(), 1);
        let chunks = chunk_text("One.\u{200B} Two.", &SentenceRules::new());
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn extra_terminator() {
        let rules = SentenceRules::new().with_extra_punctuation("\u{00A7}");
        let chunks = chunk_text("One\u{00A7} Two", &rules);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn space_as_terminator_needs_no_whitespace() {
        let rules = SentenceRules::new().with_extra_punctuation(" ");
        let chunks = chunk_text("\u{0E01}\u{0E02} \u{0E04}", &rules);
        let sentences = chunks
            .iter()
            .filter(|(k, _)| *k == ChunkKind::Sentence)
            .count();
        assert_eq!(sentences, 2);
    }

    #[test]
    fn phrase_delimiters_split_and_collapse() {
        let chunks = chunk_text("one two|| three", &SentenceRules::new());
        assert_eq!(
            chunks,
            vec![
                (ChunkKind::Sentence, "one two".to_string()),
                (ChunkKind::Space, " ".to_string()),
                (ChunkKind::Sentence, "three".to_string()),
            ]
        );
    }

    #[test]
    fn cues_look_past_digits_and_markup() {
        let (pieces, _) = lift("1. <b>x</b> Y,");
        assert_eq!(pieces.len(), 9);
        let cues = next_cues(&pieces);
        assert_eq!(cues[0], Cue::Lowercase);
        assert_eq!(cues[5], Cue::Letter);
        assert_eq!(cues[8], Cue::Continues);
        assert_eq!(cues[9], Cue::End);
    }

    #[test]
    fn long_letterless_paragraph_splits_every_number() {
        let n = 200_000;
        let text = "1. ".repeat(n);
        let (pieces, _) = lift(&text);
        let started = std::time::Instant::now();
        let chunks = chunk(&pieces, &SentenceRules::new());
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        let sentences = chunks
            .iter()
            .filter(|c| c.kind == ChunkKind::Sentence)
            .count();
        assert_eq!(sentences, n);
    }

    #[test]
    fn open_tags_are_carried_across_chunks() {
        let (pieces, markup) = lift("<p><b>One. Two.</b></p>");
        let mut chunks = chunk(&pieces, &SentenceRules::new());
        balance_tags(&mut chunks, &markup);
        let rendered: Vec<String> = chunks.iter().map(|c| markup.render(&c.pieces)).collect();
        assert_eq!(
            rendered,
            vec![
                "<p><b>One.</b></p>",
                "<p><b> </b></p>",
                "<p><b>Two.</b></p>",
            ]
        );
    }
}
