//! Writes emissions under the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::emit::{Emission, WriteMode};
use crate::error::{ConvertError, Result};

/// Write one emission below `out_dir`, returning the full path written.
pub fn write_emission(out_dir: &Path, emission: &Emission) -> Result<PathBuf> {
    let path = out_dir.join(&emission.path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    match emission.write_mode {
        WriteMode::Replace => fs::write(&path, &emission.content)?,
        WriteMode::MergeJson => {
            let merged = merge_into_existing(&path, &emission.content)?;
            fs::write(&path, merged)?;
        }
    }
    Ok(path)
}

/// Merged file text for a JSON fragment landing on `path`.
pub fn merge_into_existing(path: &Path, fragment: &str) -> Result<String> {
    let invalid = |reason: String| ConvertError::InvalidSettings {
        path: path.to_path_buf(),
        reason,
    };
    let incoming: JsonValue = serde_json::from_str(fragment)
        .map_err(|e| invalid(format!("fragment is not JSON: {}", e)))?;

    let mut base = if path.exists() {
        let existing = fs::read_to_string(path)?;
        if existing.trim().is_empty() {
            JsonValue::Object(JsonMap::new())
        } else {
            // Zed and VS Code both allow comments and trailing commas.
            json5::from_str::<JsonValue>(&existing).map_err(|e| invalid(e.to_string()))?
        }
    } else {
        JsonValue::Object(JsonMap::new())
    };
    if !base.is_object() {
        return Err(invalid("existing content is not a JSON object".to_string()));
    }

    deep_merge(&mut base, incoming);
    let mut out = serde_json::to_string_pretty(&base).map_err(|e| invalid(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

/// Objects merge key by key; any other value replaces what was there.
pub fn deep_merge(base: &mut JsonValue, incoming: JsonValue) {
    match (base, incoming) {
        (JsonValue::Object(dst), JsonValue::Object(src)) => {
            for (k, v) in src {
                match dst.get_mut(&k) {
                    Some(slot) => deep_merge(slot, v),
                    None => {
                        dst.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn emission(path: &str, content: &str, write_mode: WriteMode) -> Emission {
        Emission {
            format: "test".into(),
            path: PathBuf::from(path),
            content: content.into(),
            write_mode,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn replace_creates_parent_dirs() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let e = emission(".github/agents/a.agent.md", "hello\n", WriteMode::Replace);
        let written = write_emission(tmp.path(), &e).expect("write");
        assert_eq!(written, tmp.path().join(".github/agents/a.agent.md"));
        assert_eq!(fs::read_to_string(&written).unwrap(), "hello\n");

        let e = emission(".github/agents/a.agent.md", "again\n", WriteMode::Replace);
        write_emission(tmp.path(), &e).expect("overwrite");
        assert_eq!(fs::read_to_string(&written).unwrap(), "again\n");
    }

    #[test]
    fn merge_json_keeps_existing_keys() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path().join(".zed");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("settings.json"),
            r#"{"theme":"One Dark","terminal":{"font_size":13,"env":{"A":"1"}}}"#,
        )
        .unwrap();

        let fragment = json!({"terminal": {"env": {"B": "2"}}, "agent": {"enabled": true}});
        let e = emission(
            ".zed/settings.json",
            &serde_json::to_string(&fragment).unwrap(),
            WriteMode::MergeJson,
        );
        let written = write_emission(tmp.path(), &e).expect("merge");
        let merged: JsonValue =
            serde_json::from_str(&fs::read_to_string(written).unwrap()).unwrap();
        assert_eq!(
            merged,
            json!({
                "theme": "One Dark",
                "terminal": {"font_size": 13, "env": {"A": "1", "B": "2"}},
                "agent": {"enabled": true}
            })
        );
    }

    #[test]
    fn merge_json_creates_missing_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let fragment = r#"{"mcp":{"servers":{}}}"#;
        let e = emission(".vscode/settings.json", fragment, WriteMode::MergeJson);
        let written = write_emission(tmp.path(), &e).expect("merge");
        let v: JsonValue = serde_json::from_str(&fs::read_to_string(written).unwrap()).unwrap();
        assert_eq!(v, json!({"mcp": {"servers": {}}}));
    }

    #[test]
    fn merge_json_accepts_comments_and_trailing_commas() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path().join(".zed");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("settings.json"),
            "// Zed settings\n{ \"theme\": \"One Dark\", }\n",
        )
        .unwrap();

        let e = emission(
            ".zed/settings.json",
            r#"{"agent":{"default_profile":"write"}}"#,
            WriteMode::MergeJson,
        );
        let written = write_emission(tmp.path(), &e).expect("merge");
        let merged: JsonValue =
            serde_json::from_str(&fs::read_to_string(written).unwrap()).unwrap();
        assert_eq!(
            merged,
            json!({"theme": "One Dark", "agent": {"default_profile": "write"}})
        );
    }

    #[test]
    fn merge_json_rejects_non_object_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::write(tmp.path().join("settings.json"), "[1, 2]").unwrap();
        let e = emission("settings.json", "{}", WriteMode::MergeJson);
        let err = write_emission(tmp.path(), &e).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidSettings { .. }), "{err}");
        assert_eq!(
            fs::read_to_string(tmp.path().join("settings.json")).unwrap(),
            "[1, 2]"
        );
    }

    #[test]
    fn deep_merge_replaces_scalars_and_arrays() {
        let mut base = json!({"a": [1, 2], "b": {"c": 1, "d": 2}, "e": "x"});
        let incoming = json!({"a": [3], "b": {"d": 5}, "e": {"f": true}});
        deep_merge(&mut base, incoming);
        let expected = json!({"a": [3], "b": {"c": 1, "d": 5}, "e": {"f": true}});
        assert_eq!(base, expected);
    }
}
