//! Parser for headerless rules files (`# name`, body, `## Capabilities`).

use std::path::Path;

use crate::capability::{Capability, CapabilitySet};
use crate::descriptor::Descriptor;
use crate::error::{ConvertError, Result};

use super::{DescriptorParser, SourceRef};

/// Heading that opens the trailing capability list.
pub const CAPABILITIES_HEADING: &str = "## Capabilities";

/// Parser for `.rules` files.
pub struct RulesParser;

impl DescriptorParser for RulesParser {
    fn supports(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("rules"))
            .unwrap_or(false)
            || path.file_name().and_then(|s| s.to_str()) == Some(".rules")
    }

    fn parse(content: &str, source: &SourceRef) -> Result<Descriptor> {
        let origin = source.origin();
        let lines: Vec<&str> = content.lines().collect();
        let Some(first_idx) = lines.iter().position(|l| !l.trim().is_empty()) else {
            return Err(ConvertError::malformed(&origin, "empty file"));
        };

        let mut builder = Descriptor::builder(source.kind);
        if let Some(hint) = &source.name_hint {
            builder = builder.name(hint.clone());
        }
        let body_start = match lines[first_idx].trim().strip_prefix("# ") {
            Some(title) => {
                builder = builder.name(title.trim());
                first_idx + 1
            }
            None => first_idx,
        };

        let rest = &lines[body_start..];
        let (body_lines, caps) = match trailing_capabilities(rest) {
            Some((idx, caps)) => (&rest[..idx], caps),
            None => (rest, CapabilitySet::new()),
        };

        builder
            .capabilities(caps)
            .body(body_lines.join("\n"))
            .build(&origin)
    }
}

/// Find the last `## Capabilities` heading whose remaining lines are all
/// capability bullets; returns its line index and the parsed set.
fn trailing_capabilities(lines: &[&str]) -> Option<(usize, CapabilitySet)> {
    let idx = lines
        .iter()
        .rposition(|line| line.trim() == CAPABILITIES_HEADING)?;
    let mut caps = CapabilitySet::new();
    for l in &lines[idx + 1..] {
        let l = l.trim();
        if l.is_empty() {
            continue;
        }
        let tag = l.strip_prefix("- ").or_else(|| l.strip_prefix("* "))?;
        caps.insert(Capability::from_tag(tag)?);
    }
    Some((idx, caps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorKind;

    #[test]
    fn parse_heading_body_and_capabilities() {
        let content = "# reviewer\n\nReview diffs carefully.\n\nBe terse.\n\n\
                       ## Capabilities\n\n- read\n- search\n";
        let source = SourceRef::new("/tmp/reviewer.rules", DescriptorKind::Agent);
        let d = RulesParser::parse(content, &source).expect("parse ok");
        assert_eq!(d.name(), "reviewer");
        assert_eq!(d.body(), "Review diffs carefully.\n\nBe terse.");
        let caps: Vec<_> = d.capabilities().iter().copied().collect();
        assert_eq!(caps, vec![Capability::Read, Capability::Search]);
    }

    #[test]
    fn non_capability_bullets_stay_in_body() {
        let content = "# notes\n\nText.\n\n## Capabilities\n\n- flying\n";
        let source = SourceRef::new("/tmp/notes.rules", DescriptorKind::Agent);
        let d = RulesParser::parse(content, &source).expect("parse ok");
        assert!(d.capabilities().is_empty());
        assert!(d.body().ends_with("- flying"));
    }

    #[test]
    fn project_rules_file_without_heading_needs_a_hint() {
        let source = SourceRef::new("/tmp/.rules", DescriptorKind::Agent);
        let err = RulesParser::parse("Always write tests.\n", &source).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput { .. }));

        let source = source.with_name_hint("project");
        let d = RulesParser::parse("Always write tests.\n", &source).expect("parse ok");
        assert_eq!(d.name(), "project");
    }
}
