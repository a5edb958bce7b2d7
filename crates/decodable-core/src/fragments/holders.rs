//! Markup placeholders.
//!
//! Before boundaries are located, every piece of markup is lifted out of the
//! text and replaced by a single [`Piece`] that the boundary scanner can step
//! over. The removed text is kept in [`Markup`] and put back verbatim when
//! fragments are rendered.

use std::sync::LazyLock;

use regex::Regex;

static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^</?\s*([A-Za-z][A-Za-z0-9:_-]*)").expect("valid regex"));

static BREAK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:<br\b[^>]*>|</br\s*>)$").expect("valid regex"));

static TRAILING_BREAK_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*</br\s*>").expect("valid regex"));

/// Named and numeric spellings of the non-breaking space.
static NBSP_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^&(?:nbsp|#0*160|#x0*a0);").expect("valid regex"));

/// One unit of the working buffer: a text character or a placeholder.
///
/// Placeholder payloads index into the matching list of [`Markup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Piece {
    Char(char),
    LineBreak(usize),
    Open(usize),
    Close(usize),
    SelfClosing(usize),
    /// An opening tag immediately followed by its closing tag.
    Empty(usize),
    Nbsp(usize),
    /// A closing tag that was not in the input, added to balance `Open(i)`.
    SyntheticClose(usize),
}

impl Piece {
    pub(crate) const fn is_markup(self) -> bool {
        matches!(
            self,
            Self::Open(_)
                | Self::Close(_)
                | Self::SelfClosing(_)
                | Self::Empty(_)
                | Self::SyntheticClose(_)
        )
    }

    pub(crate) const fn as_char(self) -> Option<char> {
        match self {
            Self::Char(c) => Some(c),
            _ => None,
        }
    }
}

/// The text that placeholders stand for, per kind, in input order.
#[derive(Debug, Default)]
pub(crate) struct Markup {
    line_breaks: Vec<String>,
    open: Vec<String>,
    close: Vec<String>,
    self_closing: Vec<String>,
    empty: Vec<String>,
    nbsp: Vec<String>,
}

impl Markup {
    /// Tag name of an opening tag, lowercased.
    pub(crate) fn open_name(&self, index: usize) -> Option<String> {
        tag_name(&self.open[index])
    }

    /// Tag name of a closing tag, lowercased.
    pub(crate) fn close_name(&self, index: usize) -> Option<String> {
        tag_name(&self.close[index])
    }

    /// Render pieces back to text.
    pub(crate) fn render(&self, pieces: &[Piece]) -> String {
        let mut out = String::new();
        for &piece in pieces {
            match piece {
                Piece::Char(c) => out.push(c),
                Piece::LineBreak(i) => out.push_str(&self.line_breaks[i]),
                Piece::Open(i) => out.push_str(&self.open[i]),
                Piece::Close(i) => out.push_str(&self.close[i]),
                Piece::SelfClosing(i) => out.push_str(&self.self_closing[i]),
                Piece::Empty(i) => out.push_str(&self.empty[i]),
                Piece::Nbsp(i) => out.push_str(&self.nbsp[i]),
                Piece::SyntheticClose(i) => {
                    if let Some(name) = self.open_name(i) {
                        out.push_str("</");
                        out.push_str(&name);
                        out.push('>');
                    }
                }
            }
        }
        out
    }
}

fn tag_name(tag: &str) -> Option<String> {
    TAG_NAME
        .captures(tag)
        .map(|caps| caps[1].to_ascii_lowercase())
}

/// Lift markup out of `html`.
///
/// Break tags and CRLF become line breaks, tags become open/close/self-closing
/// placeholders, `&nbsp;` (or `&#160;`, `&#xA0;`) becomes a non-breaking-space
/// placeholder. A final
/// pass folds an opening tag directly followed by a closing tag into a single
/// empty-tag placeholder.
pub(crate) fn lift(html: &str) -> (Vec<Piece>, Markup) {
    let mut markup = Markup::default();
    let mut pieces = Vec::with_capacity(html.len());
    let mut rest = html;
    // Once no `>` is left, every later `<` is text.
    let mut tags_possible = true;

    while let Some(ch) = rest.chars().next() {
        if rest.starts_with("\r\n") {
            markup.line_breaks.push("\r\n".to_string());
            pieces.push(Piece::LineBreak(markup.line_breaks.len() - 1));
            rest = &rest[2..];
            continue;
        }

        if ch == '&'
            && let Some(m) = NBSP_ENTITY.find(rest)
        {
            markup.nbsp.push(m.as_str().to_string());
            pieces.push(Piece::Nbsp(markup.nbsp.len() - 1));
            rest = &rest[m.end()..];
            continue;
        }

        let tag_end = if ch == '<' && tags_possible {
            let end = rest.find('>');
            tags_possible = end.is_some();
            end
        } else {
            None
        };
        if let Some(end) = tag_end {
            let mut tag_len = end + 1;
            let tag = &rest[..tag_len];
            let piece = if BREAK_TAG.is_match(tag) {
                if !tag.starts_with("</")
                    && let Some(m) = TRAILING_BREAK_CLOSE.find(&rest[tag_len..])
                {
                    tag_len += m.end();
                }
                markup.line_breaks.push(rest[..tag_len].to_string());
                Piece::LineBreak(markup.line_breaks.len() - 1)
            } else if tag.starts_with("</") {
                markup.close.push(tag.to_string());
                Piece::Close(markup.close.len() - 1)
            } else if tag.ends_with("/>") || tag_name(tag).is_none() {
                // Self-closing tags, comments, doctypes and processing instructions.
                markup.self_closing.push(tag.to_string());
                Piece::SelfClosing(markup.self_closing.len() - 1)
            } else {
                markup.open.push(tag.to_string());
                Piece::Open(markup.open.len() - 1)
            };
            pieces.push(piece);
            rest = &rest[tag_len..];
            continue;
        }

        pieces.push(Piece::Char(ch));
        rest = &rest[ch.len_utf8()..];
    }

    let pieces = fold_empty_tags(pieces, &mut markup);
    (pieces, markup)
}

fn fold_empty_tags(pieces: Vec<Piece>, markup: &mut Markup) -> Vec<Piece> {
    let mut folded = Vec::with_capacity(pieces.len());
    let mut iter = pieces.into_iter().peekable();

    while let Some(piece) = iter.next() {
        if let Piece::Open(o) = piece
            && let Some(&Piece::Close(c)) = iter.peek()
            && markup.open_name(o) == markup.close_name(c)
        {
            iter.next();
            let text = format!("{}{}", markup.open[o], markup.close[c]);
            markup.empty.push(text);
            folded.push(Piece::Empty(markup.empty.len() - 1));
            continue;
        }
        folded.push(piece);
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lift_and_render_round_trip() {
        let html = "<p class=\"x\">Hi&nbsp;<b>there</b>.<br />Next\r\nline<span></span><img src=\"a.png\"/></p>";
        let (pieces, markup) = lift(html);
        assert_eq!(markup.render(&pieces), html);
    }

    #[test]
    fn kinds_are_recognized() {
        let (pieces, _) = lift("<i>a</i><br/>&NBSP;<hr/><u></u>\r\n");
        assert_eq!(
            pieces,
            vec![
                Piece::Open(0),
                Piece::Char('a'),
                Piece::Close(0),
                Piece::LineBreak(0),
                Piece::Nbsp(0),
                Piece::SelfClosing(0),
                Piece::Empty(0),
                Piece::LineBreak(1),
            ]
        );
    }

    #[test]
    fn numeric_nbsp_entities_are_placeholders() {
        let html = "a&#160;b&#xA0;c&#xa0;d";
        let (pieces, markup) = lift(html);
        let nbsp = pieces.iter().filter(|p| matches!(p, Piece::Nbsp(_))).count();
        assert_eq!(nbsp, 3);
        assert_eq!(markup.render(&pieces), html);
    }

    #[test]
    fn many_unclosed_angles_stay_text() {
        let html = "a < b ".repeat(50_000);
        let (pieces, markup) = lift(&html);
        assert!(pieces.iter().all(|p| p.as_char().is_some()));
        assert_eq!(markup.render(&pieces), html);
    }

    #[test]
    fn br_pair_is_one_break() {
        let (pieces, markup) = lift("a<br></br>b");
        assert_eq!(pieces.len(), 3);
        assert_eq!(markup.render(&pieces[1..2]), "<br></br>");
    }

    #[test]
    fn unterminated_angle_is_text() {
        let (pieces, markup) = lift("a < b");
        assert!(pieces.iter().all(|p| p.as_char().is_some()));
        assert_eq!(markup.render(&pieces), "a < b");
    }

    #[test]
    fn synthetic_close_uses_open_name() {
        let (pieces, markup) = lift("<SPAN id=\"s1\">x");
        let mut balanced = pieces.clone();
        balanced.push(Piece::SyntheticClose(0));
        assert_eq!(markup.render(&balanced), "<SPAN id=\"s1\">x</span>");
    }
}
