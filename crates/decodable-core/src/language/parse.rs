//! Ingestion of language data files.
//!
//! Language files are JSON objects written loosely: they may be wrapped in a
//! `setLangData( ... );` call, start with a bare `name:` or `name =` prefix,
//! carry `//` line comments and trailing commas, and end with `;`. The text is
//! normalized to strict JSON first, then read field by field. Parsing either
//! produces a complete, indexed model or fails.
//!
//! ```json
//! {
//!   "LangName": "English",
//!   "LangID": "en",
//!   "GPCS": [{ "GPC": "a", "GPCuc": "A", "Category": "vowel" }],
//!   "group1": [{ "Name": "cat", "Count": 2, "GPCForm": ["c", "a", "t"] }],
//!   "UseFullGPCNotation": false
//! }
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::{GraphemeCategory, GraphemeUnit, LanguageData, MAX_GROUPS, WordEntry};
use crate::error::{LanguageDataError, LanguageDataResult};
use crate::index;

static BARE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$.]*\s*[:=]\s*").expect("valid regex")
});

static CALL_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^setLangData\s*\((.*)\)\s*;?$").expect("valid regex")
});

/// Parse language data text into an indexed model.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn parse_language_data(text: &str) -> LanguageDataResult<LanguageData> {
    let json = normalize(text);
    let value: Value = serde_json::from_str(&json).map_err(|e| LanguageDataError::Syntax {
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })?;

    let Value::Object(root) = value else {
        return Err(LanguageDataError::NotAnObject {
            found: type_name(&value),
        });
    };

    let mut model = read_model(&root)?;
    index::reindex(&mut model);
    tracing::debug!(
        language = %model.name,
        graphemes = model.graphemes.len(),
        words = model.all_words().count(),
        "parsed language data"
    );
    Ok(model)
}

/// Turn loose language-data text into strict JSON.
fn normalize(text: &str) -> String {
    let cleaned = strip_comments_and_trailing_commas(text);
    let mut body = cleaned.trim();

    if let Some(caps) = CALL_WRAPPER.captures(body)
        && let Some(inner) = caps.get(1)
    {
        body = inner.as_str().trim();
    }
    if let Some(m) = BARE_PREFIX.find(body) {
        body = &body[m.end()..];
    }
    body.trim_end_matches(|c: char| c == ';' || c.is_whitespace())
        .to_string()
}

/// Drop `//` comments and commas that directly precede `}` or `]`, leaving
/// string contents untouched. Newlines are kept so error positions still
/// line up with the input.
fn strip_comments_and_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                while chars.peek().is_some_and(|&c| c != '\n') {
                    chars.next();
                }
            }
            ',' => {
                if !matches!(next_significant(chars.clone()), Some('}' | ']')) {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

/// First character that is neither whitespace nor inside a `//` comment.
fn next_significant(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let mut slash = false;
    while let Some(ch) = chars.next() {
        if slash {
            if ch != '/' {
                return Some('/');
            }
            slash = false;
            chars.by_ref().find(|&c| c == '\n')?;
        } else if ch == '/' {
            slash = true;
        } else if !ch.is_whitespace() {
            return Some(ch);
        }
    }
    slash.then_some('/')
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn invalid(field: &str, message: impl Into<String>) -> LanguageDataError {
    LanguageDataError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
}

fn read_model(root: &Map<String, Value>) -> LanguageDataResult<LanguageData> {
    let mut model = LanguageData::new(
        string_field(root, "LangName")?.unwrap_or_default(),
        string_field(root, "LangID")?.unwrap_or_default(),
    );
    model.sort_order = string_list(root, "LanguageSortOrder")?;
    model.productivity_sequence = string_list(root, "ProductivityGPCSequence")?;
    model.numbers = string_list(root, "Numbers")?;
    model.always_match = string_list(root, "AlwaysMatch")?;
    model.use_full_gpc_notation = bool_field(root, "UseFullGPCNotation")?.unwrap_or(false);

    if let Some(gpcs) = root.get("GPCS") {
        let items = gpcs
            .as_array()
            .ok_or_else(|| invalid("GPCS", format!("expected an array, found {}", type_name(gpcs))))?;
        for item in items {
            let unit = read_grapheme(item)?;
            model.add_grapheme(unit);
        }
    }

    for (key, value) in root {
        let Some(number) = key.strip_prefix("group") else {
            continue;
        };
        let Ok(group) = number.parse::<usize>() else {
            continue;
        };
        if !(1..=MAX_GROUPS).contains(&group) {
            return Err(LanguageDataError::GroupOutOfRange(group));
        }
        let items = value
            .as_array()
            .ok_or_else(|| invalid(key, format!("expected an array, found {}", type_name(value))))?;
        for item in items {
            let entry = read_word(key, item, group)?;
            model.push_entry(entry)?;
        }
    }

    Ok(model)
}

fn read_grapheme(item: &Value) -> LanguageDataResult<GraphemeUnit> {
    if let Some(text) = item.as_str() {
        return Ok(GraphemeUnit::new(text.to_lowercase()));
    }
    let obj = item
        .as_object()
        .ok_or_else(|| invalid("GPCS", format!("expected an object, found {}", type_name(item))))?;

    let grapheme = string_field(obj, "GPC")?
        .or(string_field(obj, "Grapheme")?)
        .ok_or_else(|| invalid("GPCS", "grapheme without a `GPC` value"))?;
    let mut unit = GraphemeUnit::new(grapheme.to_lowercase());
    if let Some(upper) = string_field(obj, "GPCuc")?.filter(|u| !u.is_empty()) {
        unit.upper = upper;
    }
    unit.phoneme = string_field(obj, "Phoneme")?.unwrap_or_default();
    unit.category = GraphemeCategory::from_label(&string_field(obj, "Category")?.unwrap_or_default());
    unit.combining = bool_field(obj, "Combining")?.unwrap_or(false);
    unit.frequency = number_field(obj, "Frequency")?.unwrap_or(0);
    unit.token_frequency = number_field(obj, "TokenFreq")?.unwrap_or(0);
    unit.alternates = string_list(obj, "Alt")?;
    Ok(unit)
}

fn read_word(field: &str, item: &Value, group: usize) -> LanguageDataResult<WordEntry> {
    if let Some(name) = item.as_str() {
        return Ok(WordEntry::new(name, group));
    }
    let obj = item
        .as_object()
        .ok_or_else(|| invalid(field, format!("expected a word, found {}", type_name(item))))?;

    let name = string_field(obj, "Name")?.ok_or_else(|| invalid(field, "word without a `Name`"))?;
    let mut entry = WordEntry::new(&name, group);
    entry.count = number_field(obj, "Count")?.unwrap_or(1);
    entry.part_of_speech = string_field(obj, "PartOfSpeech")?.unwrap_or_default();
    entry.syllables = number_field(obj, "Syllables")?.unwrap_or(0);
    entry.gpc_form = string_list(obj, "GPCForm")?;
    Ok(entry)
}

fn string_field(obj: &Map<String, Value>, field: &str) -> LanguageDataResult<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(invalid(
            field,
            format!("expected a string, found {}", type_name(other)),
        )),
    }
}

fn string_list(obj: &Map<String, Value>, field: &str) -> LanguageDataResult<Vec<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(invalid(
                    field,
                    format!("expected strings, found {}", type_name(other)),
                )),
            })
            .collect(),
        // A single space-separated string is accepted for lists of letters.
        Some(Value::String(s)) => Ok(s.split_whitespace().map(str::to_string).collect()),
        Some(other) => Err(invalid(
            field,
            format!("expected an array, found {}", type_name(other)),
        )),
    }
}

fn bool_field(obj: &Map<String, Value>, field: &str) -> LanguageDataResult<Option<bool>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" | "" => Ok(Some(false)),
            _ => Err(invalid(field, format!("`{s}` is not a boolean"))),
        },
        Some(Value::Number(n)) => Ok(Some(n.as_f64().is_some_and(|v| v != 0.0))),
        Some(other) => Err(invalid(
            field,
            format!("expected a boolean, found {}", type_name(other)),
        )),
    }
}

fn number_field(obj: &Map<String, Value>, field: &str) -> LanguageDataResult<Option<u32>> {
    let parsed = match obj.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(other) => {
            return Err(invalid(
                field,
                format!("expected a number, found {}", type_name(other)),
            ));
        }
    };
    parsed
        .and_then(|n| u32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| invalid(field, "expected a non-negative integer"))
}
