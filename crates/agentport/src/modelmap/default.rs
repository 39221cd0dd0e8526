use super::types::Canonical;
use crate::naming::Target;
use std::collections::{HashMap, HashSet};

pub fn default_inherit_tokens() -> HashSet<String> {
    ["inherit", "default"].into_iter().map(String::from).collect()
}

pub fn default_model_tokens(target: Target) -> HashMap<String, Canonical> {
    match target {
        Target::Zed => zed_tokens(),
        Target::Vscode => vscode_tokens(),
    }
}

fn zed_tokens() -> HashMap<String, Canonical> {
    let mut m: HashMap<String, Canonical> = HashMap::new();
    let mk = |model: &str, provider: &str| Canonical {
        model: model.to_string(),
        provider: Some(provider.to_string()),
    };

    // Claude aliases → Zed anthropic provider ids
    for t in [
        "sonnet",
        "claude sonnet 4",
        "claude-sonnet-4",
        "claude-sonnet-4-0",
    ] {
        m.insert(t.into(), mk("claude-sonnet-4-latest", "anthropic"));
    }
    for t in [
        "opus",
        "claude opus 4",
        "claude opus 4.1",
        "claude-opus-4-1",
    ] {
        m.insert(t.into(), mk("claude-opus-4-latest", "anthropic"));
    }
    for t in ["haiku", "claude haiku 3.5", "claude-3-5-haiku"] {
        m.insert(t.into(), mk("claude-3-5-haiku-latest", "anthropic"));
    }
    m.insert(
        "claude sonnet 3.7".into(),
        mk("claude-3-7-sonnet-latest", "anthropic"),
    );

    // OpenAI names
    for t in ["gpt-5", "gpt 5"] {
        m.insert(t.into(), mk("gpt-5", "openai"));
    }
    for t in ["gpt-5-mini", "gpt-5 mini"] {
        m.insert(t.into(), mk("gpt-5-mini", "openai"));
    }
    m.insert("gpt-4.1".into(), mk("gpt-4.1", "openai"));
    m.insert("gpt-4o".into(), mk("gpt-4o", "openai"));
    m.insert("o3-mini".into(), mk("o3-mini", "openai"));

    m.insert("gemini 2.5 pro".into(), mk("gemini-2.5-pro", "google"));
    m
}

fn vscode_tokens() -> HashMap<String, Canonical> {
    let mut m: HashMap<String, Canonical> = HashMap::new();
    // VS Code model pickers use display names; the provider is implicit.
    let mk = |model: &str| Canonical {
        model: model.to_string(),
        provider: None,
    };

    for t in [
        "sonnet",
        "claude-sonnet-4",
        "claude-sonnet-4-0",
        "claude sonnet 4",
    ] {
        m.insert(t.into(), mk("Claude Sonnet 4"));
    }
    for t in ["opus", "claude-opus-4-1", "claude opus 4.1"] {
        m.insert(t.into(), mk("Claude Opus 4.1"));
    }
    for t in ["haiku", "claude-3-5-haiku", "claude haiku 3.5"] {
        m.insert(t.into(), mk("Claude Haiku 3.5"));
    }
    m.insert("claude sonnet 3.7".into(), mk("Claude Sonnet 3.7"));
    m.insert("gpt-5".into(), mk("GPT-5"));
    for t in ["gpt-5-mini", "gpt-5 mini"] {
        m.insert(t.into(), mk("GPT-5 mini"));
    }
    m.insert("gpt-4.1".into(), mk("GPT-4.1"));
    m.insert("gpt-4o".into(), mk("GPT-4o"));
    m.insert("o3-mini".into(), mk("o3-mini"));
    m.insert("gemini 2.5 pro".into(), mk("Gemini 2.5 Pro"));
    m
}
