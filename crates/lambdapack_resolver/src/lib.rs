// An wrapper around the `oxc_resolver` crate to provide a lambdapack-specific API.

mod external;
mod resolver;

pub use crate::{
  external::{ExternalPolicy, package_name_of},
  resolver::Resolver,
};

pub use oxc_resolver::ResolveError;
