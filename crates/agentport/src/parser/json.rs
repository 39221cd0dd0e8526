//! Parser for JSON descriptors and Claude-style settings files.

use std::path::Path;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::descriptor::{Descriptor, DescriptorBuilder, DescriptorKind};
use crate::error::{ConvertError, Result};
use crate::toolmap::resolve_tools;

use super::{DescriptorParser, SourceRef, UNMAPPED_TOOLS_KEY, apply_fields, type_name};

/// Keys that may carry the instructional body.
const BODY_KEYS: &[&str] = &["bodyText", "body", "prompt", "instructions"];

/// Parser for `.json` files.
pub struct JsonParser;

impl DescriptorParser for JsonParser {
    fn supports(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    fn parse(content: &str, source: &SourceRef) -> Result<Descriptor> {
        let origin = source.origin();
        let value: JsonValue = serde_json::from_str(content)
            .map_err(|e| ConvertError::malformed(&origin, format!("invalid JSON: {}", e)))?;
        let fields = match value {
            JsonValue::Object(map) => map,
            other => {
                return Err(ConvertError::malformed(
                    &origin,
                    format!("expected a JSON object, found {}", type_name(&other)),
                ));
            }
        };

        let mut builder = Descriptor::builder(source.kind);
        if let Some(hint) = &source.name_hint {
            builder = builder.name(hint.clone());
        }
        if matches!(source.kind, DescriptorKind::Settings) {
            return parse_settings(builder, fields, &origin);
        }
        apply_fields(builder, fields, &origin, BODY_KEYS)?.build(&origin)
    }
}

/// Settings files keep every key as metadata; `model` becomes the hint and
/// `permissions.allow` entries become capabilities.
fn parse_settings(
    mut builder: DescriptorBuilder,
    fields: JsonMap<String, JsonValue>,
    origin: &str,
) -> Result<Descriptor> {
    let mut unmapped: Vec<String> = Vec::new();
    for (key, value) in fields {
        match (key.as_str(), value.as_str()) {
            ("model", Some(m)) => builder = builder.model_hint(m),
            ("name", Some(n)) => builder = builder.name(n),
            ("description", Some(d)) => builder = builder.description(d),
            ("permissions", _) => {
                if let Some(allow) = value.get("allow").and_then(|a| a.as_array()) {
                    let (caps, rest) = resolve_tools(allow.iter().filter_map(|t| t.as_str()));
                    builder = builder.capabilities(caps);
                    unmapped.extend(rest);
                }
                builder = builder.metadata_entry(key, value);
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
    builder.build(origin)
}
