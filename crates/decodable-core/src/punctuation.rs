//! Curated punctuation classes for sentence and paragraph boundaries.
//!
//! These are hand-maintained codepoint tables, not derived from the Unicode
//! general categories. Sentence-ending punctuation follows the Unicode
//! `Sentence_Terminal` list of the BMP; paragraph-ending and
//! sentence-continuing punctuation are small fixed sets.
//!
//! Sentence_Ending_Punctuation:
//! `0021 002E 003F 055C 055E 0589 061F 06D4 0700-0702 07F9 0964-0965
//! 104A-104B 1362 1367-1368 166E 1803 1809 1944-1945 1AA8-1AAB 1B5A-1B5B
//! 1B5E-1B5F 1C3B-1C3C 1C7E-1C7F 203C-203D 2047-2049 2E2E 3002 A4FF
//! A60E-A60F A6F3 A6F7 A876-A877 A8CE-A8CF A92F A9C8-A9C9 AA5D-AA5F
//! AAF0-AAF1 ABEB FE52 FE56-FE57 FF01 FF0E FF1F FF61`
//!
//! Paragraph_Ending_Punctuation: `000A-000D 0085 2028 2029`
//!
//! Sentence_Continuing_Punctuation: `002C 002D 003A 003B 055D 060C 060D
//! 07F8 1802 1808 3001 FE10 FE11 FE13 FE14 FE50 FE51 FE54 FE55 FF0C FF0D
//! FF1A FF1B FF64`

use std::collections::BTreeSet;

const SENTENCE_ENDING: &[(char, char)] = &[
    ('\u{0021}', '\u{0021}'),
    ('\u{002E}', '\u{002E}'),
    ('\u{003F}', '\u{003F}'),
    ('\u{055C}', '\u{055C}'),
    ('\u{055E}', '\u{055E}'),
    ('\u{0589}', '\u{0589}'),
    ('\u{061F}', '\u{061F}'),
    ('\u{06D4}', '\u{06D4}'),
    ('\u{0700}', '\u{0702}'),
    ('\u{07F9}', '\u{07F9}'),
    ('\u{0964}', '\u{0965}'),
    ('\u{104A}', '\u{104B}'),
    ('\u{1362}', '\u{1362}'),
    ('\u{1367}', '\u{1368}'),
    ('\u{166E}', '\u{166E}'),
    ('\u{1803}', '\u{1803}'),
    ('\u{1809}', '\u{1809}'),
    ('\u{1944}', '\u{1945}'),
    ('\u{1AA8}', '\u{1AAB}'),
    ('\u{1B5A}', '\u{1B5B}'),
    ('\u{1B5E}', '\u{1B5F}'),
    ('\u{1C3B}', '\u{1C3C}'),
    ('\u{1C7E}', '\u{1C7F}'),
    ('\u{203C}', '\u{203D}'),
    ('\u{2047}', '\u{2049}'),
    ('\u{2E2E}', '\u{2E2E}'),
    ('\u{3002}', '\u{3002}'),
    ('\u{A4FF}', '\u{A4FF}'),
    ('\u{A60E}', '\u{A60F}'),
    ('\u{A6F3}', '\u{A6F3}'),
    ('\u{A6F7}', '\u{A6F7}'),
    ('\u{A876}', '\u{A877}'),
    ('\u{A8CE}', '\u{A8CF}'),
    ('\u{A92F}', '\u{A92F}'),
    ('\u{A9C8}', '\u{A9C9}'),
    ('\u{AA5D}', '\u{AA5F}'),
    ('\u{AAF0}', '\u{AAF1}'),
    ('\u{ABEB}', '\u{ABEB}'),
    ('\u{FE52}', '\u{FE52}'),
    ('\u{FE56}', '\u{FE57}'),
    ('\u{FF01}', '\u{FF01}'),
    ('\u{FF0E}', '\u{FF0E}'),
    ('\u{FF1F}', '\u{FF1F}'),
    ('\u{FF61}', '\u{FF61}'),
];

const PARAGRAPH_ENDING: &[(char, char)] = &[
    ('\u{000A}', '\u{000D}'),
    ('\u{0085}', '\u{0085}'),
    ('\u{2028}', '\u{2029}'),
];

const SENTENCE_CONTINUING: &[(char, char)] = &[
    ('\u{002C}', '\u{002D}'),
    ('\u{003A}', '\u{003B}'),
    ('\u{055D}', '\u{055D}'),
    ('\u{060C}', '\u{060D}'),
    ('\u{07F8}', '\u{07F8}'),
    ('\u{1802}', '\u{1802}'),
    ('\u{1808}', '\u{1808}'),
    ('\u{3001}', '\u{3001}'),
    ('\u{FE10}', '\u{FE11}'),
    ('\u{FE13}', '\u{FE14}'),
    ('\u{FE50}', '\u{FE51}'),
    ('\u{FE54}', '\u{FE55}'),
    ('\u{FF0C}', '\u{FF0D}'),
    ('\u{FF1A}', '\u{FF1B}'),
    ('\u{FF64}', '\u{FF64}'),
];

const FORMAT: &[(char, char)] = &[
    ('\u{00AD}', '\u{00AD}'),
    ('\u{0600}', '\u{0605}'),
    ('\u{061C}', '\u{061C}'),
    ('\u{06DD}', '\u{06DD}'),
    ('\u{070F}', '\u{070F}'),
    ('\u{180E}', '\u{180E}'),
    ('\u{200B}', '\u{200F}'),
    ('\u{202A}', '\u{202E}'),
    ('\u{2060}', '\u{2064}'),
    ('\u{2066}', '\u{206F}'),
    ('\u{FEFF}', '\u{FEFF}'),
    ('\u{FFF9}', '\u{FFFB}'),
];

fn in_table(table: &[(char, char)], ch: char) -> bool {
    table
        .binary_search_by(|&(lo, hi)| {
            if hi < ch {
                std::cmp::Ordering::Less
            } else if lo > ch {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Built-in sentence-ending punctuation.
pub fn is_sentence_ending(ch: char) -> bool {
    in_table(SENTENCE_ENDING, ch)
}

/// Paragraph-ending characters (newline family, line/paragraph separators).
pub fn is_paragraph_ending(ch: char) -> bool {
    in_table(PARAGRAPH_ENDING, ch)
}

/// Punctuation that continues a sentence (comma, colon, semicolon, ...).
pub fn is_sentence_continuing(ch: char) -> bool {
    in_table(SENTENCE_CONTINUING, ch)
}

/// Invisible format characters (the BMP part of `Cf`).
///
/// These never trigger or satisfy a boundary on their own.
pub fn is_format(ch: char) -> bool {
    in_table(FORMAT, ch)
}

/// Marks a manual phrase break inside a sentence.
pub const PHRASE_DELIMITER: char = '|';

/// Sentence terminators in effect for one fragmenting run.
///
/// Starts from the built-in sentence-ending set and adds whatever the user
/// configured. A plain space in the extra set turns space itself into a
/// terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceRules {
    extra: BTreeSet<char>,
    space_terminates: bool,
}

impl SentenceRules {
    /// Rules using only the built-in terminators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add user-configured terminators.
    ///
    /// Whitespace other than U+0020 is ignored; it can never end a sentence.
    pub fn with_extra_punctuation(mut self, extra: &str) -> Self {
        for ch in extra.chars() {
            if ch == ' ' {
                self.space_terminates = true;
            } else if !ch.is_whitespace() {
                self.extra.insert(ch);
            }
        }
        self
    }

    /// Whether a plain space was configured as a terminator.
    pub const fn space_terminates(&self) -> bool {
        self.space_terminates
    }

    /// Whether `ch` ends a sentence under these rules.
    pub fn is_terminator(&self, ch: char) -> bool {
        is_sentence_ending(ch) || self.extra.contains(&ch) || (self.space_terminates && ch == ' ')
    }
}
