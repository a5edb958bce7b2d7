//! Command implementations.

use anyhow::{Context, bail};
use camino::Utf8Path;

use decodable_core::language::LanguageData;
use decodable_core::language::parse::parse_language_data;

pub mod classify;
pub mod fragments;
pub mod graphemes;
pub mod info;
pub mod leveled;
pub mod segment;
#[cfg(feature = "mcp")]
pub mod serve;
pub mod tokenize;
pub mod words;

/// Read a file and validate its size against the configured limit.
///
/// Story files and language data both go through here.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    // Preflight: check file size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > max {
            bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    std::fs::read_to_string(path.as_std_path()).with_context(|| format!("failed to read {path}"))
}

/// Load language data from `--lang`, or the configured default.
pub fn load_language(
    lang: Option<&Utf8Path>,
    default: Option<&Utf8Path>,
    max_bytes: Option<usize>,
) -> anyhow::Result<LanguageData> {
    let Some(path) = lang.or(default) else {
        bail!("no language data: pass --lang FILE or set `language_data` in the config");
    };
    let text = read_input_file(path, max_bytes)?;
    let model =
        parse_language_data(&text).with_context(|| format!("failed to load language data {path}"))?;
    tracing::debug!(
        path = %path,
        language = %model.name,
        graphemes = model.graphemes.len(),
        "language data loaded"
    );
    Ok(model)
}

#[cfg(test)]
pub(crate) mod test_support {
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    /// A small English-like model: five graphemes plus `ch`, two groups.
    pub const SAMPLE_LANGUAGE: &str = r#"setLangData({
        "LangName": "Sample",
        "LangID": "x-sample",
        "GPCS": [
            {"GPC": "a", "Category": "vowel"},
            {"GPC": "c"},
            {"GPC": "t"},
            {"GPC": "s"},
            {"GPC": "ch"},
            {"GPC": "h"},
        ],
        "group1": ["cat", "sat", "chat", "cats", "at"],
        "group2": ["hat"],
    });"#;

    /// Write `body` to `name` inside a fresh temp dir.
    pub fn write_temp(name: &str, body: &str) -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().join(name)).unwrap();
        std::fs::write(&path, body).unwrap();
        (dir, path)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn oversized_input_is_rejected() {
        let (_dir, path) = write_temp("story.html", "The cat sat.");
        let err = read_input_file(&path, Some(4)).unwrap_err();
        assert!(err.to_string().contains("input too large"));
        assert!(read_input_file(&path, None).is_ok());
    }

    #[test]
    fn language_falls_back_to_default() {
        let (_dir, path) = write_temp("lang.js", SAMPLE_LANGUAGE);
        let model = load_language(None, Some(&path), None).unwrap();
        assert_eq!(model.name, "Sample");
    }

    #[test]
    fn missing_language_is_an_error() {
        let err = load_language(None, None, None).unwrap_err();
        assert!(err.to_string().contains("--lang"));
    }

    #[test]
    fn malformed_language_names_the_file() {
        let (_dir, path) = write_temp("broken.json", "{ \"LangName\": ");
        let err = load_language(Some(&path), None, None).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }
}
