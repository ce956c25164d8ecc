use lambdapack_sourcemap::SourceJoiner;
use lambdapack_utils::{
  concat_string,
  ecmascript::{is_validate_identifier_name, property_key_str},
};
use oxc::syntax::keyword::RESERVED_KEYWORDS;

use crate::{generate_stage::module_finalizer::RenderedModule, types::generator::GenerateContext};

use super::append_module;

pub struct CjsChunk<'a> {
  pub source_joiner: SourceJoiner<'a>,
  /// Added after minification, which would drop it as dead code.
  pub footer: Option<String>,
}

/// ```js
/// "use strict";
/// // runtime helpers
/// var ping_exports = {};
/// __export(ping_exports, { handler: () => handler });
/// module.exports = __toCommonJS(ping_exports);
/// // modules in execution order, the entry last
/// 0 && (module.exports = {
///   handler
/// });
/// ```
pub fn render_cjs<'a>(ctx: &GenerateContext<'_>, modules: &'a [RenderedModule]) -> CjsChunk<'a> {
  let runtime_idx = ctx.link_output.runtime_module.idx;
  let entry_idx = ctx.chunk.entry_module;
  let entry = ctx.entry_module();
  let entry_meta = &ctx.link_output.metadata[entry_idx];
  let is_esm_entry = entry.is_some_and(|entry| !entry.is_commonjs());

  let mut source_joiner = SourceJoiner::new(ctx.options.sourcemap.is_some());
  // A CommonJS entry that is emitted unwrapped keeps its own prologue.
  if is_esm_entry || entry_meta.wrapped {
    source_joiner.append_source("\"use strict\";");
  }

  // `__toESM` calls in `require` replacements rely on the runtime being in place first.
  if let Some(runtime) = modules.iter().find(|module| module.module_idx == runtime_idx) {
    append_module(&mut source_joiner, runtime);
  }

  let mut footer = None;
  if let Some(entry) = entry.filter(|_| is_esm_entry) {
    if let Some(namespace) = modules
      .iter()
      .find(|module| module.module_idx == entry_idx)
      .and_then(|module| module.namespace.as_deref())
    {
      source_joiner.append_source(namespace);
    }
    source_joiner.append_source(concat_string!(
      "module.exports = ",
      ctx.finalized_runtime_helper("__toCommonJS"),
      "(",
      ctx.finalized_string_pattern_for_symbol_ref(entry.namespace_object_ref),
      ");"
    ));
    footer = render_export_names_annotation(entry_meta.resolved_exports.keys().map(AsRef::as_ref));
  }

  for module in modules.iter().filter(|module| module.module_idx != runtime_idx) {
    if module.module_idx == entry_idx && is_esm_entry {
      if let Some(source) = &module.source {
        source_joiner.append_source(source);
      }
    } else {
      append_module(&mut source_joiner, module);
    }
  }

  if let Some(entry) = entry.filter(|_| entry_meta.wrapped) {
    source_joiner.append_source(concat_string!(
      "module.exports = ",
      ctx.finalized_string_pattern_for_symbol_ref(entry.wrapper_ref),
      "();"
    ));
  }

  CjsChunk { source_joiner, footer }
}

/// Node's CommonJS lexer reads export names from this when the bundle is `import`ed from ESM.
fn render_export_names_annotation<'a>(names: impl Iterator<Item = &'a str>) -> Option<String> {
  let properties = names
    .map(|name| {
      if is_validate_identifier_name(name) && !RESERVED_KEYWORDS.contains(name) {
        concat_string!("  ", name)
      } else {
        concat_string!("  ", property_key_str(name), ": null")
      }
    })
    .collect::<Vec<_>>();
  if properties.is_empty() {
    return None;
  }
  Some(concat_string!("0 && (module.exports = {\n", properties.join(",\n"), "\n});"))
}

#[cfg(test)]
mod tests {
  use super::render_export_names_annotation;

  #[test]
  fn annotation_lists_export_names() {
    let annotation = render_export_names_annotation(["handler", "default", "not-an-id"].into_iter());
    assert_eq!(
      annotation.as_deref(),
      Some("0 && (module.exports = {\n  handler,\n  default: null,\n  \"not-an-id\": null\n});")
    );
  }

  #[test]
  fn no_annotation_without_exports() {
    assert_eq!(render_export_names_annotation(std::iter::empty()), None);
  }
}
