pub mod cjs;
pub mod esm;

use lambdapack_sourcemap::SourceJoiner;

use super::module_finalizer::RenderedModule;

fn append_module<'a>(source_joiner: &mut SourceJoiner<'a>, module: &'a RenderedModule) {
  if let Some(namespace) = &module.namespace {
    source_joiner.append_source(namespace.as_str());
  }
  if let Some(source) = &module.source {
    source_joiner.append_source(source);
  }
}
