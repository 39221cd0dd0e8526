//! Descriptor parsers for the supported input formats.
//!
//! Each parser declares a `supports` predicate over file paths and a `parse`
//! function that returns a validated `Descriptor`. Parsing is pure: no file
//! access and no logging.

use std::path::{Path, PathBuf};

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::descriptor::{DescriptorBuilder, DescriptorKind};
use crate::error::{ConvertError, Result};
use crate::naming::safe_name;
use crate::toolmap::{resolve_tools, split_tool_list};

pub mod json;
pub mod markdown_header;
pub mod rules;

pub use crate::descriptor::Descriptor;

/// Metadata key holding tool tokens that map to no capability.
pub const UNMAPPED_TOOLS_KEY: &str = "unmapped_tools";

/// Parser trait implemented by each input format.
pub trait DescriptorParser {
    fn supports(path: &Path) -> bool;
    fn parse(content: &str, source: &SourceRef) -> Result<Descriptor>;
}

/// Input format tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    MarkdownHeader,
    Json,
    Rules,
}

impl InputFormat {
    pub fn detect(path: &Path) -> Option<InputFormat> {
        if markdown_header::MarkdownHeaderParser::supports(path) {
            Some(InputFormat::MarkdownHeader)
        } else if json::JsonParser::supports(path) {
            Some(InputFormat::Json)
        } else if rules::RulesParser::supports(path) {
            Some(InputFormat::Rules)
        } else {
            None
        }
    }
}

/// Where a descriptor's text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub path: PathBuf,
    pub kind: DescriptorKind,
    /// Name used when the content does not carry one (commands, settings).
    pub name_hint: Option<String>,
}

impl SourceRef {
    /// Agents must name themselves; other kinds fall back to the file stem.
    pub fn new(path: impl Into<PathBuf>, kind: DescriptorKind) -> Self {
        let path = path.into();
        let name_hint = match kind {
            DescriptorKind::Agent => None,
            _ => Some(stem_name(&path)),
        };
        Self {
            path,
            kind,
            name_hint,
        }
    }

    pub fn with_name_hint(mut self, hint: impl Into<String>) -> Self {
        self.name_hint = Some(hint.into());
        self
    }

    pub fn origin(&self) -> String {
        self.path.display().to_string()
    }
}

/// `review.md` → `review`, `settings.local.json` → `settings-local`.
fn stem_name(path: &Path) -> String {
    let fname = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    let stem = fname
        .strip_suffix(".md")
        .or_else(|| fname.strip_suffix(".json"))
        .or_else(|| fname.strip_suffix(".rules"))
        .unwrap_or(fname);
    safe_name(stem)
}

/// Parse `content` according to `format`.
pub fn parse_descriptor(
    content: &str,
    format: InputFormat,
    source: &SourceRef,
) -> Result<Descriptor> {
    match format {
        InputFormat::MarkdownHeader => {
            markdown_header::MarkdownHeaderParser::parse(content, source)
        }
        InputFormat::Json => json::JsonParser::parse(content, source),
        InputFormat::Rules => rules::RulesParser::parse(content, source),
    }
}

/// Fold a header/JSON object into a builder: recognized keys become fields,
/// everything else is preserved in metadata in its original order.
pub(crate) fn apply_fields(
    mut builder: DescriptorBuilder,
    fields: JsonMap<String, JsonValue>,
    origin: &str,
    body_keys: &[&str],
) -> Result<DescriptorBuilder> {
    let mut unmapped: Vec<String> = Vec::new();
    for (key, value) in fields {
        match key.as_str() {
            "name" => builder = builder.name(expect_string(origin, &key, value)?),
            "description" => builder = builder.description(expect_string(origin, &key, value)?),
            "model" | "modelHint" => {
                builder = builder.model_hint(expect_string(origin, &key, value)?)
            }
            "tools" | "allowed-tools" | "toolCapabilities" => {
                let (caps, rest) = resolve_tools(tool_tokens(origin, &key, value)?);
                builder = builder.capabilities(caps);
                unmapped.extend(rest);
            }
            "kind" => {
                let kind = expect_string(origin, &key, value)?
                    .parse::<DescriptorKind>()
                    .map_err(|e| ConvertError::malformed(origin, e))?;
                builder = builder.kind(kind);
            }
            k if body_keys.contains(&k) => {
                builder = builder.body(expect_string(origin, &key, value)?)
            }
            _ => builder = builder.metadata_entry(key, value),
        }
    }
    if !unmapped.is_empty() {
        builder = builder.metadata_entry(
            UNMAPPED_TOOLS_KEY,
            JsonValue::Array(unmapped.into_iter().map(JsonValue::String).collect()),
        );
    }
    Ok(builder)
}

fn expect_string(origin: &str, key: &str, value: JsonValue) -> Result<String> {
    match value {
        JsonValue::String(s) => Ok(s),
        JsonValue::Null => Ok(String::new()),
        other => Err(ConvertError::malformed(
            origin,
            format!(
                "field '{}' must be a string, found {}",
                key,
                type_name(&other)
            ),
        )),
    }
}

/// Tools may be a list or a comma/space separated string.
fn tool_tokens(origin: &str, key: &str, value: JsonValue) -> Result<Vec<String>> {
    match value {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::String(s) => Ok(split_tool_list(&s)),
        JsonValue::Array(items) => items
            .into_iter()
            .map(|it| match it {
                JsonValue::String(s) => Ok(s.trim().to_string()),
                other => Err(ConvertError::malformed(
                    origin,
                    format!(
                        "entries of '{}' must be strings, found {}",
                        key,
                        type_name(&other)
                    ),
                )),
            })
            .filter(|r| r.as_ref().map(|s| !s.is_empty()).unwrap_or(true))
            .collect(),
        other => Err(ConvertError::malformed(
            origin,
            format!(
                "field '{}' must be a list or string, found {}",
                key,
                type_name(&other)
            ),
        )),
    }
}

pub(crate) fn type_name(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_by_extension() {
        assert_eq!(
            InputFormat::detect(Path::new("agents/a.md")),
            Some(InputFormat::MarkdownHeader)
        );
        assert_eq!(
            InputFormat::detect(Path::new("settings.json")),
            Some(InputFormat::Json)
        );
        assert_eq!(
            InputFormat::detect(Path::new("x.rules")),
            Some(InputFormat::Rules)
        );
        assert_eq!(InputFormat::detect(Path::new("notes.txt")), None);
    }

    #[test]
    fn name_hints_only_for_non_agents() {
        let agent = SourceRef::new("a/review.md", DescriptorKind::Agent);
        assert_eq!(agent.name_hint, None);
        let command = SourceRef::new("a/review.md", DescriptorKind::Command);
        assert_eq!(command.name_hint.as_deref(), Some("review"));
        let settings = SourceRef::new("settings.local.json", DescriptorKind::Settings);
        assert_eq!(settings.name_hint.as_deref(), Some("settings-local"));
    }
}
