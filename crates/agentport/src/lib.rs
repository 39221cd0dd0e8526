//! Convert agent, command and settings descriptors between AI coding tools.
//!
//! Sources are parsed into a normalized [`Descriptor`](descriptor::Descriptor),
//! then rendered by every format registered for the chosen target.

pub mod batch;
pub mod capability;
pub mod config;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod logging;
pub mod modelmap;
pub mod naming;
pub mod parser;
pub mod registry;
pub mod toolmap;
pub mod writer;
