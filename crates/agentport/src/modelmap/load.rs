use std::collections::HashMap;

use super::default::{default_inherit_tokens, default_model_tokens};
use super::{Canonical, ModelMap, RawEntry, RawMappingFile};
use crate::naming::Target;

pub fn from_toml_str(s: &str) -> anyhow::Result<ModelMap> {
    let raw: RawMappingFile = toml::from_str(s)?;
    Ok(build_model_map(raw))
}

pub fn load_from_file(path: &std::path::Path) -> anyhow::Result<ModelMap> {
    let content = std::fs::read_to_string(path)?;
    from_toml_str(&content)
}

pub fn load_default() -> ModelMap {
    ModelMap {
        by_target: [Target::Zed, Target::Vscode]
            .into_iter()
            .map(|t| (t, default_model_tokens(t)))
            .collect(),
        inherit_tokens: default_inherit_tokens(),
    }
}

/// File entries are layered over the built-in defaults.
fn build_model_map(raw: RawMappingFile) -> ModelMap {
    let mut map = load_default();
    for e in raw.mappings.into_iter() {
        let table = map.by_target.entry(e.target).or_default();
        insert_entry(table, &e.token, &e);
        if let Some(aliases) = e.aliases.as_ref() {
            for a in aliases {
                insert_entry(table, a, &e);
            }
        }
    }
    if let Some(tokens) = raw.inherit {
        for t in tokens {
            map.inherit_tokens.insert(t.to_ascii_lowercase());
        }
    }
    map
}

fn insert_entry(map: &mut HashMap<String, Canonical>, token: &str, e: &RawEntry) {
    map.insert(
        token.trim().to_ascii_lowercase(),
        Canonical {
            model: e.to_model.clone(),
            provider: e.to_provider.clone(),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_layer_over_defaults() {
        let toml = r#"
inherit = ["Host"]

[[mappings]]
token = "Sonnet"
target = "zed"
to_model = "claude-sonnet-4-thinking-latest"
to_provider = "anthropic"
aliases = ["sonnet-thinking"]
"#;
        let m = from_toml_str(toml).expect("parse ok");
        let zed = m.by_target.get(&Target::Zed).expect("zed table");
        assert_eq!(
            zed.get("sonnet").map(|c| c.model.as_str()),
            Some("claude-sonnet-4-thinking-latest")
        );
        assert!(zed.contains_key("sonnet-thinking"));
        // untouched defaults survive
        assert!(zed.contains_key("opus"));
        assert!(m.by_target[&Target::Vscode].contains_key("sonnet"));
        assert!(m.inherit_tokens.contains("host"));
        assert!(m.inherit_tokens.contains("inherit"));
    }

    #[test]
    fn rejects_unknown_target() {
        let toml = r#"
[[mappings]]
token = "x"
target = "emacs"
to_model = "y"
"#;
        assert!(from_toml_str(toml).is_err());
    }
}
