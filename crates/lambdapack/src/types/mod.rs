pub mod bundle_output;
pub mod generator;
pub mod linking_metadata;

use std::sync::Arc;

use lambdapack_common::{ModuleIdx, NormalizedBundlerOptions};
use lambdapack_resolver::Resolver;
use oxc_index::IndexVec;

use self::linking_metadata::LinkingMetadata;

pub type LinkingMetadataVec = IndexVec<ModuleIdx, LinkingMetadata>;

pub type SharedResolver = Arc<Resolver>;
pub type SharedOptions = Arc<NormalizedBundlerOptions>;
