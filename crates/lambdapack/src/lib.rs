mod bundler;
mod discover;
mod generate_stage;
mod graph;
mod link_stage;
mod scan_stage;
mod types;
mod utils;

pub use crate::{
  bundler::Bundler,
  discover::{EntryDescriptor, discover_entries},
  generate_stage::generate_entry_filename,
  types::bundle_output::BundleOutput,
};
pub use lambdapack_common::*;
pub use lambdapack_error::{BuildError, BuildResult, Diagnostic, DiagnosticKind, Location};
