//! Agent-file variant: `---` delimited YAML header followed by the body.
//!
//! Backs both VS Code custom agents (`.agent.md`) and prompt files
//! (`.prompt.md`, which add a `mode` key).

use serde::Serialize;

use crate::descriptor::Descriptor;
use crate::error::{ConvertError, Result};

use super::{EmitContext, Emitter, Rendered};

/// Metadata keys copied into the header verbatim when present.
const PASSTHROUGH_KEYS: &[&str] = &["argument-hint"];

#[derive(Debug, Default, Clone, Copy)]
pub struct AgentFileEmitter {
    /// Chat mode written into prompt-file headers.
    pub mode: Option<&'static str>,
}

impl AgentFileEmitter {
    pub fn agent() -> Self {
        Self { mode: None }
    }

    pub fn prompt(mode: &'static str) -> Self {
        Self { mode: Some(mode) }
    }
}

#[derive(Debug, Serialize)]
struct Header<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<&'a str>,
    name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(flatten)]
    passthrough: serde_json::Map<String, serde_json::Value>,
}

impl Emitter for AgentFileEmitter {
    fn render(&self, d: &Descriptor, ctx: &EmitContext<'_>) -> Result<Rendered> {
        let passthrough = PASSTHROUGH_KEYS
            .iter()
            .filter_map(|k| d.metadata().get(*k).map(|v| (k.to_string(), v.clone())))
            .collect();
        let header = Header {
            mode: self.mode,
            name: d.name(),
            description: d.description(),
            tools: d.capabilities().iter().map(|c| c.as_str()).collect(),
            model: ctx.model_for(d).map(|c| c.model),
            passthrough,
        };
        let yaml = serde_yaml::to_string(&header).map_err(|e| {
            ConvertError::malformed(d.name(), format!("cannot serialize header: {}", e))
        })?;
        Ok(Rendered::new(format!("---\n{}---\n\n{}\n", yaml, d.body())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::descriptor::DescriptorKind;
    use crate::modelmap::{ResolveOptions, load_default};
    use crate::naming::Target;
    use crate::parser::markdown_header::split_header;
    use serde_json::json;

    fn render_with(emitter: AgentFileEmitter, d: &Descriptor) -> String {
        let map = load_default();
        let ctx = EmitContext {
            target: Target::Vscode,
            model_map: &map,
            model_options: ResolveOptions::default(),
        };
        emitter.render(d, &ctx).expect("render").content
    }

    #[test]
    fn react_expert_header_lists_exact_tools() {
        let d = Descriptor::builder(DescriptorKind::Agent)
            .name("react-expert")
            .body("You are a React expert...")
            .capabilities([Capability::Read, Capability::Write, Capability::Edit])
            .build("x")
            .expect("valid");
        let out = render_with(AgentFileEmitter::agent(), &d);
        let split = split_header(&out).expect("split");
        let header: serde_json::Value =
            serde_yaml::from_str(split.header.as_deref().expect("header")).expect("yaml");
        assert_eq!(header["tools"], json!(["read", "write", "edit"]));
        assert_eq!(header["name"], "react-expert");
        assert!(header.get("model").is_none());
        assert_eq!(split.body.trim(), "You are a React expert...");
    }

    #[test]
    fn model_hint_is_mapped_and_inherit_dropped() {
        let base = Descriptor::builder(DescriptorKind::Agent)
            .name("m")
            .description("Uses a model")
            .body("b");
        let d = base.clone().model_hint("opus").build("x").expect("valid");
        let out = render_with(AgentFileEmitter::agent(), &d);
        assert!(out.contains("model: Claude Opus 4.1"), "{out}");
        assert!(out.contains("description: Uses a model"));

        let d = base.model_hint("inherit").build("x").expect("valid");
        let out = render_with(AgentFileEmitter::agent(), &d);
        assert!(!out.contains("model:"), "{out}");
    }

    #[test]
    fn prompt_file_has_mode_and_argument_hint() {
        let d = Descriptor::builder(DescriptorKind::Command)
            .name("commit")
            .description("Create a commit")
            .body("Commit $ARGUMENTS")
            .metadata_entry("argument-hint", json!("[message]"))
            .metadata_entry("color", json!("red"))
            .build("x")
            .expect("valid");
        let out = render_with(AgentFileEmitter::prompt("agent"), &d);
        let split = split_header(&out).expect("split");
        let header: serde_json::Value =
            serde_yaml::from_str(split.header.as_deref().expect("header")).expect("yaml");
        assert_eq!(header["mode"], "agent");
        assert_eq!(header["argument-hint"], "[message]");
        assert!(header.get("color").is_none());
        assert!(header.get("tools").is_none());
    }
}
