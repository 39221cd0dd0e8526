//! Settings-fragment variant: known metadata keys mapped onto a closed JSON
//! schema. Keys the schema does not know are dropped with a warning.

use serde_json::{Map as JsonMap, Value as JsonValue, json};

use crate::capability::Capability;
use crate::descriptor::{Descriptor, DescriptorKind};
use crate::error::Result;
use crate::naming::{Target, safe_name};
use crate::parser::UNMAPPED_TOOLS_KEY;

use super::{EmitContext, Emitter, Rendered};

/// How a source value is reshaped for the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Copy objects as-is.
    Object,
    /// Claude `mcpServers` entries into the target's server shape.
    McpServers(Target),
    /// `permissions.defaultMode == "bypassPermissions"` into a boolean.
    BypassFlag,
}

/// One known metadata key and where it lands.
#[derive(Debug, Clone, Copy)]
pub struct KeyMapping {
    pub key: &'static str,
    pub paths: &'static [&'static [&'static str]],
    pub transform: Transform,
}

/// The closed schema a settings emitter writes.
#[derive(Debug, Clone, Copy)]
pub struct SettingsSchema {
    pub keys: &'static [KeyMapping],
    /// Agent capabilities become `agent.profiles.<name>.tools` (Zed).
    pub agent_profiles: bool,
    /// Settings model hint becomes `agent.default_model` (Zed).
    pub default_model: bool,
}

pub static ZED_SCHEMA: SettingsSchema = SettingsSchema {
    keys: &[
        KeyMapping {
            key: "env",
            paths: &[&["terminal", "env"]],
            transform: Transform::Object,
        },
        KeyMapping {
            key: "mcpServers",
            paths: &[&["context_servers"]],
            transform: Transform::McpServers(Target::Zed),
        },
        KeyMapping {
            key: "permissions",
            paths: &[&["agent", "always_allow_tool_actions"]],
            transform: Transform::BypassFlag,
        },
    ],
    agent_profiles: true,
    default_model: true,
};

pub static VSCODE_SCHEMA: SettingsSchema = SettingsSchema {
    keys: &[
        KeyMapping {
            key: "env",
            paths: &[
                &["terminal.integrated.env.linux"],
                &["terminal.integrated.env.osx"],
                &["terminal.integrated.env.windows"],
            ],
            transform: Transform::Object,
        },
        KeyMapping {
            key: "mcpServers",
            paths: &[&["mcp", "servers"]],
            transform: Transform::McpServers(Target::Vscode),
        },
        KeyMapping {
            key: "permissions",
            paths: &[&["chat.tools.autoApprove"]],
            transform: Transform::BypassFlag,
        },
    ],
    agent_profiles: false,
    default_model: false,
};

/// Zed agent tool names granted by each capability.
pub fn zed_tools_for(cap: Capability) -> &'static [&'static str] {
    match cap {
        Capability::Read => &["read_file", "list_directory", "diagnostics"],
        Capability::Write => &["create_directory", "copy_path", "move_path", "delete_path"],
        Capability::Edit => &["edit_file"],
        Capability::Search => &["grep", "find_path", "fetch", "web_search"],
        Capability::Execute => &["terminal"],
    }
}

pub struct SettingsFragmentEmitter {
    schema: &'static SettingsSchema,
}

impl SettingsFragmentEmitter {
    pub fn new(schema: &'static SettingsSchema) -> Self {
        Self { schema }
    }

    pub fn zed() -> Self {
        Self::new(&ZED_SCHEMA)
    }

    pub fn vscode() -> Self {
        Self::new(&VSCODE_SCHEMA)
    }
}

impl SettingsFragmentEmitter {
    /// Map a settings descriptor's metadata and model hint onto the schema.
    fn map_settings(
        &self,
        d: &Descriptor,
        ctx: &EmitContext<'_>,
        root: &mut JsonValue,
        warnings: &mut Vec<String>,
    ) {
        for (key, value) in d.metadata() {
            if key == UNMAPPED_TOOLS_KEY {
                continue;
            }
            let Some(mapping) = self.schema.keys.iter().find(|m| m.key == key) else {
                warnings.push(format!(
                    "'{}': dropped setting '{}' (no {} equivalent)",
                    d.name(),
                    key,
                    ctx.target
                ));
                continue;
            };
            if let Some(v) = transform_value(mapping.transform, value, warnings, d.name()) {
                for path in mapping.paths {
                    set_path(root, path, v.clone());
                }
            }
        }

        let Some(hint) = d.model_hint() else {
            return;
        };
        match ctx.model_for(d) {
            Some(c) if self.schema.default_model => match c.provider {
                Some(provider) => set_path(
                    root,
                    &["agent", "default_model"],
                    json!({ "provider": provider, "model": c.model }),
                ),
                None => warnings.push(format!(
                    "'{}': dropped model '{}' (no {} provider mapping)",
                    d.name(),
                    hint,
                    ctx.target
                )),
            },
            Some(_) => warnings.push(format!(
                "'{}': dropped model '{}' (no {} settings equivalent)",
                d.name(),
                hint,
                ctx.target
            )),
            None => {}
        }
    }

    /// Zed agent profile granting the tools behind each capability.
    fn map_agent_profile(&self, d: &Descriptor, root: &mut JsonValue) {
        if !self.schema.agent_profiles || d.capabilities().is_empty() {
            return;
        }
        let mut tools = JsonMap::new();
        for cap in d.capabilities() {
            for t in zed_tools_for(*cap) {
                tools.insert((*t).to_string(), JsonValue::Bool(true));
            }
        }
        let profile = safe_name(d.name());
        set_path(
            root,
            &["agent", "profiles", profile.as_str()],
            json!({ "name": d.name(), "tools": tools }),
        );
    }
}

impl Emitter for SettingsFragmentEmitter {
    fn render(&self, d: &Descriptor, ctx: &EmitContext<'_>) -> Result<Rendered> {
        let mut root = JsonValue::Object(JsonMap::new());
        let mut warnings: Vec<String> = Vec::new();

        // Agent header keys and model hints have no settings counterpart.
        match d.kind() {
            DescriptorKind::Settings => self.map_settings(d, ctx, &mut root, &mut warnings),
            DescriptorKind::Agent => self.map_agent_profile(d, &mut root),
            DescriptorKind::Command => {}
        }

        for w in &warnings {
            tracing::warn!("{}", w);
        }
        let content = serde_json::to_string_pretty(&root).unwrap_or_else(|_| "{}".to_string());
        Ok(Rendered {
            content: format!("{}\n", content),
            warnings,
        })
    }
}

fn transform_value(
    transform: Transform,
    value: &JsonValue,
    warnings: &mut Vec<String>,
    name: &str,
) -> Option<JsonValue> {
    match transform {
        Transform::Object => {
            if value.is_object() {
                Some(value.clone())
            } else {
                warnings.push(format!("'{}': expected an object, dropping value", name));
                None
            }
        }
        Transform::BypassFlag => {
            let mode = value.get("defaultMode").and_then(|m| m.as_str());
            (mode == Some("bypassPermissions")).then_some(JsonValue::Bool(true))
        }
        Transform::McpServers(target) => {
            let servers = value.as_object()?;
            let mut out = JsonMap::new();
            for (key, def) in servers {
                match convert_server(target, def) {
                    Some(v) => {
                        out.insert(key.clone(), v);
                    }
                    None => warnings.push(format!(
                        "'{}': dropped MCP server '{}' (neither command nor url)",
                        name, key
                    )),
                }
            }
            (!out.is_empty()).then_some(JsonValue::Object(out))
        }
    }
}

/// Convert one Claude MCP server definition into the target's shape.
fn convert_server(target: Target, def: &JsonValue) -> Option<JsonValue> {
    let obj = def.as_object()?;
    let args = obj.get("args").cloned().unwrap_or_else(|| json!([]));
    let env = obj.get("env").cloned().unwrap_or_else(|| json!({}));
    if let Some(command) = obj.get("command").and_then(|c| c.as_str()) {
        return Some(match target {
            Target::Zed => json!({
                "source": "custom",
                "command": command,
                "args": args,
                "env": env,
            }),
            Target::Vscode => json!({
                "type": "stdio",
                "command": command,
                "args": args,
                "env": env,
            }),
        });
    }
    let url = obj.get("url").and_then(|u| u.as_str())?;
    let mut remote = JsonMap::new();
    if target == Target::Vscode {
        let kind = match obj.get("type").and_then(|t| t.as_str()) {
            Some("sse") => "sse",
            _ => "http",
        };
        remote.insert("type".to_string(), JsonValue::from(kind));
    } else {
        remote.insert("source".to_string(), JsonValue::from("custom"));
    }
    remote.insert("url".to_string(), JsonValue::from(url));
    if let Some(headers) = obj.get("headers").filter(|h| h.is_object()) {
        remote.insert("headers".to_string(), headers.clone());
    }
    Some(JsonValue::Object(remote))
}

/// Set `value` at `path`, creating intermediate objects.
fn set_path(root: &mut JsonValue, path: &[&str], value: JsonValue) {
    match path {
        [] => *root = value,
        [first, rest @ ..] => {
            if !root.is_object() {
                *root = JsonValue::Object(JsonMap::new());
            }
            if let JsonValue::Object(map) = root {
                let child = map.entry((*first).to_string()).or_insert(JsonValue::Null);
                set_path(child, rest, value);
            }
        }
    }
}
