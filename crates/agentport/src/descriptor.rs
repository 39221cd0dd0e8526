//! The normalized record every parser produces and every emitter consumes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::capability::{Capability, CapabilitySet};
use crate::error::{ConvertError, Result};

/// What kind of artifact a descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    Agent,
    Command,
    Settings,
}

impl DescriptorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DescriptorKind::Agent => "agent",
            DescriptorKind::Command => "command",
            DescriptorKind::Settings => "settings",
        }
    }

    /// Settings carry no prose, so their body may be empty.
    pub fn requires_body(self) -> bool {
        !matches!(self, DescriptorKind::Settings)
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DescriptorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "agent" => Ok(DescriptorKind::Agent),
            "command" => Ok(DescriptorKind::Command),
            "settings" => Ok(DescriptorKind::Settings),
            other => Err(format!("unknown descriptor kind '{}'", other)),
        }
    }
}

/// A validated, immutable agent/command/settings record.
///
/// Fields are only reachable through accessors; "changing" a descriptor means
/// building a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    name: String,
    kind: DescriptorKind,
    description: String,
    tool_capabilities: CapabilitySet,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_hint: Option<String>,
    body_text: String,
    #[serde(flatten)]
    metadata: JsonMap<String, JsonValue>,
}

impl Descriptor {
    pub fn builder(kind: DescriptorKind) -> DescriptorBuilder {
        DescriptorBuilder::new(kind)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.tool_capabilities
    }

    pub fn model_hint(&self) -> Option<&str> {
        self.model_hint.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body_text
    }

    pub fn metadata(&self) -> &JsonMap<String, JsonValue> {
        &self.metadata
    }

    /// A degraded copy with the given capabilities removed.
    pub fn without_capabilities(&self, drop: &[Capability]) -> Descriptor {
        let mut next = self.clone();
        next.tool_capabilities.retain(|c| !drop.contains(c));
        next
    }

    /// A copy carrying a different (non-blank) name.
    pub fn renamed(&self, name: &str) -> Descriptor {
        let mut next = self.clone();
        let name = name.trim();
        if !name.is_empty() && !name.chars().any(char::is_control) {
            next.name = name.to_string();
        }
        next
    }
}

/// Collects descriptor fields and validates them in [`DescriptorBuilder::build`].
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    kind: DescriptorKind,
    name: Option<String>,
    description: String,
    capabilities: CapabilitySet,
    model_hint: Option<String>,
    body: Option<String>,
    metadata: JsonMap<String, JsonValue>,
}

impl DescriptorBuilder {
    pub fn new(kind: DescriptorKind) -> Self {
        Self {
            kind,
            name: None,
            description: String::new(),
            capabilities: CapabilitySet::new(),
            model_hint: None,
            body: None,
            metadata: JsonMap::new(),
        }
    }

    pub fn kind(mut self, kind: DescriptorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn capabilities<I: IntoIterator<Item = Capability>>(mut self, caps: I) -> Self {
        self.capabilities.extend(caps);
        self
    }

    pub fn model_hint(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model_hint = if model.trim().is_empty() {
            None
        } else {
            Some(model.trim().to_string())
        };
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn metadata_entry(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Validate required fields; `origin` names the input in error messages.
    pub fn build(self, origin: &str) -> Result<Descriptor> {
        let name = match self.name.map(|n| n.trim().to_string()) {
            Some(n) if !n.is_empty() => n,
            _ => return Err(ConvertError::missing_field(origin, "name")),
        };
        // Names become headings and file names; keep them on one line.
        if name.chars().any(char::is_control) {
            return Err(ConvertError::malformed(
                origin,
                "field 'name' must not contain control characters",
            ));
        }
        let body = match (self.body.map(|b| b.trim().to_string()), self.kind) {
            (Some(b), kind) if !b.is_empty() || !kind.requires_body() => b,
            (None, kind) if !kind.requires_body() => String::new(),
            _ => return Err(ConvertError::missing_field(origin, "bodyText")),
        };
        Ok(Descriptor {
            name,
            kind: self.kind,
            description: self.description.trim().to_string(),
            tool_capabilities: self.capabilities,
            model_hint: self.model_hint,
            body_text: body,
            metadata: self.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_name_and_body() {
        let err = Descriptor::builder(DescriptorKind::Agent)
            .body("text")
            .build("a.md")
            .unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput { .. }));
        assert!(err.to_string().contains("'name'"));

        let err = Descriptor::builder(DescriptorKind::Agent)
            .name("x")
            .body("   ")
            .build("a.md")
            .unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput { .. }));
        assert!(err.to_string().contains("'bodyText'"));
    }

    #[test]
    fn multi_line_name_is_rejected() {
        let err = Descriptor::builder(DescriptorKind::Agent)
            .name("two\nlines")
            .body("text")
            .build("a.md")
            .unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput { .. }));
        assert!(err.to_string().contains("'name'"));

        let d = Descriptor::builder(DescriptorKind::Agent)
            .name("one")
            .body("text")
            .build("a.md")
            .expect("valid");
        assert_eq!(d.renamed("tab\there").name(), "one");
    }

    #[test]
    fn settings_body_defaults_to_empty() {
        let d = Descriptor::builder(DescriptorKind::Settings)
            .name("settings")
            .build("settings.json")
            .expect("settings without body");
        assert_eq!(d.body(), "");
    }

    #[test]
    fn degraded_copy_leaves_original_untouched() {
        let d = Descriptor::builder(DescriptorKind::Agent)
            .name("runner")
            .body("Run things.")
            .capabilities([Capability::Read, Capability::Execute])
            .build("runner.md")
            .expect("valid");
        let degraded = d.without_capabilities(&[Capability::Execute]);
        assert_eq!(degraded.capabilities().len(), 1);
        assert_eq!(d.capabilities().len(), 2);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let d = Descriptor::builder(DescriptorKind::Agent)
            .name("react-expert")
            .body("You are a React expert.")
            .capabilities([Capability::Read])
            .model_hint("sonnet")
            .metadata_entry("color", serde_json::json!("red"))
            .build("x")
            .expect("valid");
        let v = serde_json::to_value(&d).expect("json");
        assert_eq!(v["color"], "red");
        assert_eq!(v["bodyText"], "You are a React expert.");
        assert_eq!(v["toolCapabilities"], serde_json::json!(["read"]));
        assert_eq!(v["modelHint"], "sonnet");
        assert!(v.get("metadata").is_none());
    }
}
