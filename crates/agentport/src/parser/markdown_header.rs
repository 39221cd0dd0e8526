//! Parser for Markdown files with a `---` delimited YAML header.

use std::path::Path;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::descriptor::Descriptor;
use crate::error::{ConvertError, Result};

use super::{DescriptorParser, SourceRef, apply_fields, type_name};

/// Parser for `.md` agent and command files.
pub struct MarkdownHeaderParser;

/// A split document: raw YAML header (if any) and the body after it.
#[derive(Debug, PartialEq, Eq)]
pub struct Split<'a> {
    pub header: Option<String>,
    pub body: &'a str,
}

/// Split a leading `---` ... `---` header from the body.
///
/// Content that does not open with `---` has no header. An opened header that
/// never closes is an error.
pub fn split_header(content: &str) -> std::result::Result<Split<'_>, &'static str> {
    let mut offset = 0usize;
    let mut lines = content.split_inclusive('\n');
    // Skip leading blank lines.
    let first = loop {
        match lines.next() {
            Some(l) if l.trim().is_empty() => offset += l.len(),
            Some(l) => break Some(l),
            None => break None,
        }
    };
    let Some(first_line) = first else {
        return Ok(Split {
            header: None,
            body: content,
        });
    };
    if first_line.trim() != "---" {
        return Ok(Split {
            header: None,
            body: content,
        });
    }
    offset += first_line.len();

    // Collect lines after the opening '---' until the closing one.
    let mut yaml_buf = String::new();
    for l in lines {
        offset += l.len();
        if l.trim() == "---" {
            return Ok(Split {
                header: Some(yaml_buf),
                body: &content[offset..],
            });
        }
        yaml_buf.push_str(l.trim_end_matches(['\r', '\n']));
        yaml_buf.push('\n');
    }
    Err("unterminated header (expected closing '---')")
}

impl DescriptorParser for MarkdownHeaderParser {
    fn supports(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("md"))
            .unwrap_or(false)
    }

    fn parse(content: &str, source: &SourceRef) -> Result<Descriptor> {
        let origin = source.origin();
        if content.trim().is_empty() {
            return Err(ConvertError::malformed(&origin, "empty file"));
        }
        let split = split_header(content).map_err(|e| ConvertError::malformed(&origin, e))?;

        let fields = match split.header {
            Some(yaml) => header_fields(&yaml, &origin)?,
            None => JsonMap::new(),
        };

        let mut builder = Descriptor::builder(source.kind);
        if let Some(hint) = &source.name_hint {
            builder = builder.name(hint.clone());
        }
        builder = apply_fields(builder, fields, &origin, &[])?;
        builder.body(split.body).build(&origin)
    }
}

fn header_fields(yaml: &str, origin: &str) -> Result<JsonMap<String, JsonValue>> {
    if yaml.trim().is_empty() {
        return Ok(JsonMap::new());
    }
    let value: JsonValue = serde_yaml::from_str(yaml)
        .map_err(|e| ConvertError::malformed(origin, format!("invalid YAML header: {}", e)))?;
    match value {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(JsonMap::new()),
        other => Err(ConvertError::malformed(
            origin,
            format!(
                "header must be a key/value mapping, found {}",
                type_name(&other)
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::descriptor::DescriptorKind;
    use crate::parser::UNMAPPED_TOOLS_KEY;

    fn agent(path: &str) -> SourceRef {
        SourceRef::new(path, DescriptorKind::Agent)
    }

    #[test]
    fn parse_agent_with_list_and_unknown_keys() {
        let content = r#"---
name: react-expert
description: Builds React components
tools:
  - Read
  - Write
  - Edit
model: sonnet
color: blue
---
You are a React expert.
"#;
        let source = agent("/tmp/react-expert.md");
        let d = MarkdownHeaderParser::parse(content, &source).expect("parse ok");
        assert_eq!(d.name(), "react-expert");
        assert_eq!(d.description(), "Builds React components");
        assert_eq!(d.model_hint(), Some("sonnet"));
        assert_eq!(d.body(), "You are a React expert.");
        let caps: Vec<_> = d.capabilities().iter().copied().collect();
        use Capability::{Edit, Read, Write};
        assert_eq!(caps, vec![Read, Write, Edit]);
        assert_eq!(d.metadata().get("color"), Some(&JsonValue::from("blue")));
    }

    #[test]
    fn parse_tools_single_string() {
        let content = "---\nname: grep-bot\ntools: Grep, Glob Bash\n---\nbody\n";
        let d = MarkdownHeaderParser::parse(content, &agent("/tmp/g.md")).expect("parse ok");
        let caps: Vec<_> = d.capabilities().iter().copied().collect();
        assert_eq!(caps, vec![Capability::Search, Capability::Execute]);
    }

    #[test]
    fn unknown_tools_are_kept_in_metadata() {
        let content = "---\nname: gh\ntools: Read, mcp__github__create_issue\n---\nbody\n";
        let d = MarkdownHeaderParser::parse(content, &agent("/tmp/gh.md")).expect("parse ok");
        assert_eq!(
            d.metadata().get(UNMAPPED_TOOLS_KEY),
            Some(&serde_json::json!(["mcp__github__create_issue"]))
        );
    }

    #[test]
    fn missing_name_is_malformed() {
        let content = "---\ndescription: nameless\n---\nbody\n";
        let err = MarkdownHeaderParser::parse(content, &agent("/tmp/x.md")).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput { .. }));
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn missing_body_is_malformed() {
        let content = "---\nname: empty\n---\n\n";
        let err = MarkdownHeaderParser::parse(content, &agent("/tmp/x.md")).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput { .. }));
        assert!(err.to_string().contains("'bodyText'"));
    }

    #[test]
    fn quoted_multi_line_name_is_malformed() {
        let content = "---\nname: \"two\\nlines\"\n---\nbody\n";
        let err = MarkdownHeaderParser::parse(content, &agent("/tmp/x.md")).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput { .. }));
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn unterminated_header_is_malformed() {
        let content = "---\nname: open\nbody never closes\n";
        let err = MarkdownHeaderParser::parse(content, &agent("/tmp/x.md")).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput { .. }));
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn command_without_header_uses_file_name() {
        let source = SourceRef::new("/tmp/commands/commit.md", DescriptorKind::Command);
        let d = MarkdownHeaderParser::parse("Create a git commit for $ARGUMENTS.\n", &source)
            .expect("parse ok");
        assert_eq!(d.name(), "commit");
        assert_eq!(d.kind(), DescriptorKind::Command);
        assert_eq!(d.body(), "Create a git commit for $ARGUMENTS.");
    }

    #[test]
    fn command_allowed_tools_patterns() {
        let content = r#"---
allowed-tools: Bash(git add:*), Bash(git status:*), Read
argument-hint: [message]
description: Create a git commit
---
Commit staged work.
"#;
        let source = SourceRef::new("/tmp/commands/commit.md", DescriptorKind::Command);
        let d = MarkdownHeaderParser::parse(content, &source).expect("parse ok");
        let caps: Vec<_> = d.capabilities().iter().copied().collect();
        assert_eq!(caps, vec![Capability::Read, Capability::Execute]);
        assert!(d.metadata().contains_key("argument-hint"));
    }

    #[test]
    fn split_keeps_body_verbatim() {
        let split = split_header("\n---\na: 1\n---\nline one\n---\nline two\n").expect("split");
        assert_eq!(split.header.as_deref(), Some("a: 1\n"));
        assert_eq!(split.body, "line one\n---\nline two\n");
    }
}
