use super::{Canonical, ModelMap, ResolveOptions};
use crate::naming::Target;

/// Resolve a model hint for `target`.
///
/// Inherit tokens resolve to `None`; unknown hints pass through unchanged.
pub fn resolve_model(
    map: &ModelMap,
    target: Target,
    hint: &str,
    opts: ResolveOptions,
) -> Option<Canonical> {
    let key = hint.trim().to_ascii_lowercase();
    if key.is_empty() || map.inherit_tokens.contains(&key) {
        return None;
    }
    if let Some(canon) = map.by_target.get(&target).and_then(|t| t.get(&key)) {
        return Some(canon.clone());
    }
    if opts.strict {
        tracing::warn!(
            "model mapping strict: unknown token '{}' for target {}",
            hint,
            target
        );
    } else {
        tracing::debug!("model mapping: no entry for token '{}' ({})", hint, target);
    }
    Some(Canonical {
        model: hint.trim().to_string(),
        provider: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modelmap::load_default;

    #[test]
    fn maps_per_target_case_insensitively() {
        let map = load_default();
        let zed = resolve_model(&map, Target::Zed, "Sonnet", ResolveOptions::default())
            .expect("mapped");
        assert_eq!(zed.model, "claude-sonnet-4-latest");
        assert_eq!(zed.provider.as_deref(), Some("anthropic"));

        let vsc = resolve_model(&map, Target::Vscode, "sonnet", ResolveOptions::default())
            .expect("mapped");
        assert_eq!(vsc.model, "Claude Sonnet 4");
        assert_eq!(vsc.provider, None);
    }

    #[test]
    fn inherit_resolves_to_none() {
        let map = load_default();
        assert_eq!(
            resolve_model(&map, Target::Zed, "inherit", ResolveOptions::default()),
            None
        );
    }

    #[test]
    fn unknown_hint_passes_through() {
        let map = load_default();
        let c = resolve_model(
            &map,
            Target::Vscode,
            "my-local-llm",
            ResolveOptions { strict: true },
        )
        .expect("passthrough");
        assert_eq!(c.model, "my-local-llm");
        assert_eq!(c.provider, None);
    }
}
