//! Model mapping: normalize free-form model hints to each target's canonical IDs.

pub mod apply;
pub mod default;
pub mod load;
pub mod types;

pub use apply::*;
pub use load::*;
pub use types::*;
