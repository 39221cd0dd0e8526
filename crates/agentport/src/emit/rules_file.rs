//! Rules-file variant: heading, prose, capability bullets, no header block.

use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::parser::rules::CAPABILITIES_HEADING;

use super::{EmitContext, Emitter, Rendered};

pub struct RulesFileEmitter;

impl Emitter for RulesFileEmitter {
    fn render(&self, d: &Descriptor, _ctx: &EmitContext<'_>) -> Result<Rendered> {
        // The section is always written; an empty one means unrestricted.
        let mut out = format!(
            "# {}\n\n{}\n\n{}\n",
            d.name(),
            d.body(),
            CAPABILITIES_HEADING
        );
        if !d.capabilities().is_empty() {
            out.push('\n');
            for cap in d.capabilities() {
                out.push_str("- ");
                out.push_str(cap.as_str());
                out.push('\n');
            }
        }
        Ok(Rendered::new(out))
    }
}
