//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes the decodability engine to AI assistants over stdio. The server is
//! a presentation layer: each `#[tool]` method delegates to `decodable-core`.
//!
//! Tools that need a language take it inline (`language_data`) or fall back
//! to the model installed with `load_language` (or preloaded from the
//! config at startup).

use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;

use decodable_core::classify::{StoryCheck, check_story};
use decodable_core::fragments::split_with_rules;
use decodable_core::language::LanguageData;
use decodable_core::language::parse::parse_language_data;
use decodable_core::language::store;
use decodable_core::punctuation::SentenceRules;
use decodable_core::{gpc, leveled, markup, words};

use crate::commands::classify::cumulative_words;

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `load_language` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct LoadLanguageParams {
    /// Language data text (JSON, optionally wrapped in `setLangData(...)`).
    pub data: String,
}

/// Parameters for the `classify_story` tool.
#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct ClassifyStoryParams {
    /// The story, plain text or HTML.
    pub story: String,
    /// Words being taught now.
    #[serde(default)]
    pub focus_words: Vec<String>,
    /// Graphemes the reader knows.
    #[serde(default)]
    pub known_graphemes: Vec<String>,
    /// Sight words as free text.
    #[serde(default)]
    pub sight_words: String,
    /// Vocabulary groups whose words count as already taught.
    #[serde(default)]
    pub cumulative_groups: Vec<usize>,
    /// Also return the story with classified words wrapped in spans.
    #[serde(default)]
    pub highlight: bool,
    /// Language data to use instead of the loaded language.
    pub language_data: Option<String>,
}

/// Parameters for the `split_fragments` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SplitFragmentsParams {
    /// The text to split, plain or HTML.
    pub text: String,
    /// Extra sentence-ending characters; a space makes space a terminator.
    pub extra_punctuation: Option<String>,
}

/// Parameters for the `tokenize_text` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct TokenizeTextParams {
    /// The text to tokenize, plain or HTML.
    pub text: String,
    /// Return each word once, in order of first appearance.
    #[serde(default)]
    pub unique: bool,
    /// Characters that are letters, never punctuation.
    pub letters: Option<String>,
}

/// Parameters for the `segment_word` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SegmentWordParams {
    /// Words to split into graphemes.
    pub words: Vec<String>,
    /// Language data to use instead of the loaded language.
    pub language_data: Option<String>,
}

/// Parameters for the `check_leveled` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CheckLeveledParams {
    /// The story, plain text or HTML.
    pub text: String,
    /// Maximum words in any one sentence.
    pub max_words_per_sentence: Option<usize>,
    /// Maximum words in the whole story.
    pub max_words: Option<usize>,
}

#[derive(Serialize)]
struct FragmentOut<'a> {
    text: &'a str,
    is_sentence: bool,
    word_count: usize,
}

#[derive(Serialize)]
struct SegmentOut {
    word: String,
    graphemes: Vec<String>,
}

/// MCP server exposing the decodability engine.
#[derive(Clone)]
pub struct DecodableServer {
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
    max_input_bytes: Option<usize>,
    rules: SentenceRules,
}

impl Default for DecodableServer {
    fn default() -> Self {
        Self::new(Some(decodable_core::DEFAULT_MAX_INPUT_BYTES), SentenceRules::new())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))
}

impl DecodableServer {
    fn check_size(&self, text: &str) -> Result<(), McpError> {
        match self.max_input_bytes {
            Some(max) if text.len() > max => Err(McpError::invalid_params(
                format!("input too large: {} bytes (limit: {max} bytes)", text.len()),
                None,
            )),
            _ => Ok(()),
        }
    }

    /// The inline language if given, otherwise the loaded one.
    fn model(&self, inline: Option<&str>) -> Result<Arc<LanguageData>, McpError> {
        match inline {
            Some(text) => {
                self.check_size(text)?;
                parse_language_data(text)
                    .map(Arc::new)
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))
            }
            None => Ok(store::current()),
        }
    }
}

#[tool_router]
impl DecodableServer {
    /// Create a server with the given input limit and sentence terminators.
    pub fn new(max_input_bytes: Option<usize>, rules: SentenceRules) -> Self {
        Self {
            tool_router: Self::tool_router(),
            max_input_bytes,
            rules,
        }
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let language = store::current();
        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "language": language.name,
        });

        let text = if params.format == "json" {
            to_json(&info)?
        } else {
            format!(
                "{} v{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
            )
        };

        tracing::info!(tool = "get_info", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Parse language data and make it the loaded language.
    #[tool(
        description = "Load language data (graphemes and vocabulary groups) for later tool calls. Returns a summary of the language."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn load_language(
        &self,
        Parameters(params): Parameters<LoadLanguageParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "load_language", len = params.data.len(), "executing MCP tool");
        self.check_size(&params.data)?;

        let model = parse_language_data(&params.data)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        let summary = serde_json::json!({
            "name": model.name,
            "id": model.id,
            "graphemes": model.graphemes.len(),
            "words": model.all_words().count(),
        });
        store::install(model);

        tracing::info!(tool = "load_language", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(to_json(&summary)?)]))
    }

    /// Classify the words of a story into decodability buckets.
    #[tool(
        description = "Classify every word of a story as focus, cumulative, possible (decodable with known graphemes), sight, or remaining. Returns the buckets plus readable and total word counts."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn classify_story(
        &self,
        Parameters(params): Parameters<ClassifyStoryParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(
            tool = "classify_story",
            known = params.known_graphemes.len(),
            "executing MCP tool"
        );
        self.check_size(&params.story)?;

        let model = self.model(params.language_data.as_deref())?;
        let cumulative = cumulative_words(&model, &params.cumulative_groups)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        let results = check_story(
            &model,
            &StoryCheck {
                focus_words: &params.focus_words,
                cumulative_words: &cumulative,
                known_graphemes: &params.known_graphemes,
                story_html: &params.story,
                sight_words: &params.sight_words,
            },
        );

        let mut json = serde_json::to_value(&results)
            .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;
        json["numbers"] = serde_json::json!(results.numbers());
        if params.highlight {
            json["highlighted"] = serde_json::json!(markup::highlight(&params.story, &results));
        }

        tracing::info!(
            tool = "classify_story",
            readable = results.readable_words,
            total = results.total_words,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(to_json(&json)?)]))
    }

    /// Split text into sentence fragments.
    #[tool(
        description = "Split text (plain or HTML) into sentences and the whitespace between them, keeping markup intact."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn split_fragments(
        &self,
        Parameters(params): Parameters<SplitFragmentsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "split_fragments", "executing MCP tool");
        self.check_size(&params.text)?;

        let rules = match &params.extra_punctuation {
            Some(extra) => SentenceRules::new().with_extra_punctuation(extra),
            None => self.rules.clone(),
        };
        let fragments = split_with_rules(&params.text, &rules);
        let out: Vec<FragmentOut<'_>> = fragments
            .iter()
            .map(|f| FragmentOut {
                text: &f.text,
                is_sentence: f.is_sentence,
                word_count: f.word_count(),
            })
            .collect();

        tracing::info!(tool = "split_fragments", fragments = out.len(), "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(to_json(&out)?)]))
    }

    /// Tokenize text into words.
    #[tool(description = "Split text (plain or HTML) into lowercase words.")]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn tokenize_text(
        &self,
        Parameters(params): Parameters<TokenizeTextParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "tokenize_text", unique = params.unique, "executing MCP tool");
        self.check_size(&params.text)?;

        let letters = params.letters.as_deref().filter(|l| !l.is_empty());
        let tokens = if params.unique {
            words::unique_words(&params.text, letters)
        } else {
            words::get_words(&params.text, letters)
        };

        tracing::info!(tool = "tokenize_text", words = tokens.len(), "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(to_json(&tokens)?)]))
    }

    /// Split words into graphemes.
    #[tool(
        description = "Split words into the graphemes of the language, longest match first from the end of the word."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn segment_word(
        &self,
        Parameters(params): Parameters<SegmentWordParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "segment_word", words = params.words.len(), "executing MCP tool");

        let model = self.model(params.language_data.as_deref())?;
        let catalog = model.graphemes_desc();
        let out: Vec<SegmentOut> = params
            .words
            .iter()
            .map(|w| {
                let word = w.to_lowercase();
                SegmentOut {
                    graphemes: gpc::segment(&word, &catalog),
                    word,
                }
            })
            .collect();

        tracing::info!(tool = "segment_word", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(to_json(&out)?)]))
    }

    /// Check leveled-reader length limits.
    #[tool(
        description = "Count sentences and words of a story and flag sentences or stories over the given word limits."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn check_leveled(
        &self,
        Parameters(params): Parameters<CheckLeveledParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "check_leveled", "executing MCP tool");
        self.check_size(&params.text)?;

        let report = leveled::check_leveled(
            &params.text,
            &self.rules,
            params.max_words_per_sentence,
            params.max_words,
        )
        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        tracing::info!(tool = "check_leveled", pass = report.passes(), "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(to_json(&report)?)]))
    }
}

#[tool_handler]
impl ServerHandler for DecodableServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Load language data with load_language, then classify stories \
                 against the graphemes a reader knows.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::SAMPLE_LANGUAGE;
    use rmcp::model::RawContent;

    /// Extract text from the first content item in a `CallToolResult`.
    fn extract_text(result: &CallToolResult) -> Option<&str> {
        result.content.first().and_then(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
    }

    fn json_of(result: &CallToolResult) -> serde_json::Value {
        assert!(!result.is_error.unwrap_or(false));
        let text = extract_text(result).expect("should have text content");
        serde_json::from_str(text).expect("valid JSON")
    }

    #[test]
    fn server_info_has_correct_name() {
        let server = DecodableServer::default();
        let info = ServerHandler::get_info(&server);

        assert_eq!(info.server_info.name, env!("CARGO_PKG_NAME"));
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn get_info_tool_returns_json_when_requested() {
        let server = DecodableServer::default();
        let params = Parameters(GetInfoParams {
            format: "json".to_string(),
        });

        let result = server.get_info(params).expect("get_info should succeed");
        let json = json_of(&result);
        assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn load_language_reports_summary() {
        let server = DecodableServer::default();
        let result = server
            .load_language(Parameters(LoadLanguageParams {
                data: SAMPLE_LANGUAGE.to_string(),
            }))
            .expect("load_language should succeed");
        let json = json_of(&result);
        assert_eq!(json["name"], "Sample");
        assert_eq!(json["graphemes"], 6);
        assert_eq!(json["words"], 6);
    }

    #[test]
    fn load_language_rejects_malformed_data() {
        let server = DecodableServer::default();
        let result = server.load_language(Parameters(LoadLanguageParams {
            data: "[1, 2]".to_string(),
        }));
        assert!(result.is_err());
    }

    #[test]
    fn classify_story_with_inline_language() {
        let server = DecodableServer::default();
        let params = Parameters(ClassifyStoryParams {
            story: "<p>The cat sat on 3 mats.</p>".to_string(),
            known_graphemes: vec!["c".into(), "a".into(), "t".into(), "s".into()],
            sight_words: "the on".to_string(),
            highlight: true,
            language_data: Some(SAMPLE_LANGUAGE.to_string()),
            ..ClassifyStoryParams::default()
        });

        let json = json_of(&server.classify_story(params).expect("classify should succeed"));
        assert_eq!(json["possible_words"], serde_json::json!(["cat", "sat"]));
        assert_eq!(json["sight_words"], serde_json::json!(["the", "on"]));
        assert_eq!(json["remaining_words"], serde_json::json!(["3", "mats"]));
        assert_eq!(json["numbers"], serde_json::json!(["3"]));
        assert_eq!(json["readable_words"], 4);
        assert_eq!(json["total_words"], 5);
        assert!(
            json["highlighted"]
                .as_str()
                .unwrap()
                .contains("<span class=\"word-not-found\">mats</span>")
        );
    }

    #[test]
    fn classify_story_rejects_unknown_group() {
        let server = DecodableServer::default();
        let params = Parameters(ClassifyStoryParams {
            story: "cat".to_string(),
            cumulative_groups: vec![7],
            language_data: Some(SAMPLE_LANGUAGE.to_string()),
            ..ClassifyStoryParams::default()
        });
        assert!(server.classify_story(params).is_err());
    }

    #[test]
    fn split_fragments_tool_works() {
        let server = DecodableServer::default();
        let params = Parameters(SplitFragmentsParams {
            text: "One two. Three four!".to_string(),
            extra_punctuation: None,
        });

        let json = json_of(&server.split_fragments(params).expect("split should succeed"));
        let fragments = json.as_array().unwrap();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0]["text"], "One two.");
        assert_eq!(fragments[0]["word_count"], 2);
        assert_eq!(fragments[1]["is_sentence"], false);
    }

    #[test]
    fn tokenize_text_tool_works() {
        let server = DecodableServer::default();
        let params = Parameters(TokenizeTextParams {
            text: "<b>Cat</b> cat, dog.".to_string(),
            unique: true,
            letters: None,
        });

        let json = json_of(&server.tokenize_text(params).expect("tokenize should succeed"));
        assert_eq!(json, serde_json::json!(["cat", "dog"]));
    }

    #[test]
    fn segment_word_tool_works() {
        let server = DecodableServer::default();
        let params = Parameters(SegmentWordParams {
            words: vec!["Chat".to_string()],
            language_data: Some(SAMPLE_LANGUAGE.to_string()),
        });

        let json = json_of(&server.segment_word(params).expect("segment should succeed"));
        assert_eq!(json[0]["graphemes"], serde_json::json!(["ch", "a", "t"]));
    }

    #[test]
    fn check_leveled_tool_works() {
        let server = DecodableServer::default();
        let params = Parameters(CheckLeveledParams {
            text: "The cat sat. The big fat cat sat on the mat.".to_string(),
            max_words_per_sentence: Some(5),
            max_words: None,
        });

        let json = json_of(&server.check_leveled(params).expect("leveled should succeed"));
        assert_eq!(json["sentences"], 2);
        assert_eq!(json["long_sentences"][0]["sentence_num"], 2);
    }

    #[test]
    fn oversized_input_is_rejected() {
        let server = DecodableServer::new(Some(8), SentenceRules::new());
        let params = Parameters(TokenizeTextParams {
            text: "far too long for the limit".to_string(),
            unique: false,
            letters: None,
        });
        assert!(server.tokenize_text(params).is_err());
    }
}
