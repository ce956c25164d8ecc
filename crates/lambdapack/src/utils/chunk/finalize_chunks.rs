use std::collections::hash_map::Entry;

use lambdapack_common::{NormalizedBundlerOptions, OutputAsset, OutputAssetKind, OutputFormat, SourceMapType};
use lambdapack_ecmascript::EcmaCompiler;
use lambdapack_error::{BuildResult, Diagnostic, DiagnosticKind};
use lambdapack_utils::{
  base64::to_standard_base64,
  concat_string,
  rayon::{IntoParallelIterator, ParallelIterator},
  xxhash::xxhash_base64_url,
};
use oxc::span::SourceType;
use rustc_hash::FxHashMap;

use crate::types::generator::RenderedChunk;

const HASH_LENGTH: usize = 8;

/// Minifies, fills `[hash]` and attaches sourcemaps. Every chunk gets its own file, two entries
/// rendering to the same filename fail the build.
pub fn finalize_chunks(
  options: &NormalizedBundlerOptions,
  chunks: Vec<RenderedChunk>,
) -> BuildResult<Vec<OutputAsset>> {
  let mut errors = vec![];
  let mut assets = vec![];
  for result in chunks.into_par_iter().map(|chunk| finalize_chunk(options, chunk)).collect::<Vec<_>>() {
    match result {
      Ok(chunk_assets) => assets.extend(chunk_assets),
      Err(error) => errors.extend(error.into_vec()),
    }
  }
  if !errors.is_empty() {
    Err(std::mem::take(&mut errors))?;
  }

  let mut seen = FxHashMap::<&str, &str>::default();
  for asset in assets.iter().filter(|asset| asset.is_chunk()) {
    match seen.entry(asset.filename.as_str()) {
      Entry::Occupied(occupied) => errors.push(
        Diagnostic::new(
          DiagnosticKind::FilenameConflict,
          format!(
            "\"{}\" and \"{}\" are both written to \"{}\"",
            occupied.get(),
            asset.entry,
            asset.filename
          ),
        )
        .into(),
      ),
      Entry::Vacant(vacant) => {
        vacant.insert(&asset.entry);
      }
    }
  }
  if !errors.is_empty() {
    Err(errors)?;
  }

  Ok(assets)
}

fn finalize_chunk(options: &NormalizedBundlerOptions, chunk: RenderedChunk) -> BuildResult<Vec<OutputAsset>> {
  let RenderedChunk { entry, preliminary_filename, mut code, map, footer } = chunk;

  if options.minify {
    let source_type = match options.format {
      OutputFormat::Cjs => SourceType::cjs(),
      OutputFormat::Esm => SourceType::mjs(),
    };
    code = EcmaCompiler::minify(&code, source_type).map_err(|error| {
      error
        .into_vec()
        .into_iter()
        .map(|error| error.context(format!("Minifying the bundle of \"{entry}\"")))
        .collect::<Vec<_>>()
    })?;
  }
  if let Some(footer) = footer {
    if !code.ends_with('\n') {
      code.push('\n');
    }
    code.push_str(&footer);
  }

  let filename = if options.entry_filenames.has_hash_pattern() {
    let hash = xxhash_base64_url(code.as_bytes());
    preliminary_filename.replace("[hash]", &hash[..HASH_LENGTH])
  } else {
    preliminary_filename
  };

  let mut assets = vec![];
  if let (Some(sourcemap_type), Some(map)) = (options.sourcemap, map) {
    let json = map.to_json_string();
    match sourcemap_type {
      SourceMapType::File => {
        let map_filename = concat_string!(filename, ".map");
        let basename = map_filename.rsplit('/').next().unwrap_or(&map_filename);
        code.push_str(&concat_string!("\n//# sourceMappingURL=", basename));
        assets.push(OutputAsset {
          filename: map_filename.clone(),
          content: json,
          kind: OutputAssetKind::SourceMap,
          entry: entry.clone(),
        });
      }
      SourceMapType::Inline => {
        code.push_str(&concat_string!(
          "\n//# sourceMappingURL=data:application/json;charset=utf-8;base64,",
          to_standard_base64(json)
        ));
      }
    }
  }
  if !code.ends_with('\n') {
    code.push('\n');
  }

  tracing::debug!(%entry, %filename, bytes = code.len(), "chunk finalized");
  assets.insert(0, OutputAsset { filename, content: code, kind: OutputAssetKind::Chunk, entry });
  Ok(assets)
}

#[cfg(test)]
mod tests {
  use lambdapack_common::{BuildMode, BundlerOptions, InputItem};
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::utils::normalize_options::normalize_options;

  fn options(mode: BuildMode) -> NormalizedBundlerOptions {
    normalize_options(BundlerOptions {
      input: Some(vec![InputItem { name: Some("ping".to_string()), import: "./ping.ts".to_string() }]),
      cwd: Some("/app".into()),
      ..BundlerOptions::for_mode(mode)
    })
    .unwrap()
  }

  fn chunk(entry: &str, filename: &str) -> RenderedChunk {
    RenderedChunk {
      entry: entry.to_string(),
      preliminary_filename: filename.to_string(),
      code: "\"use strict\";\nconst answer = 42;\nconsole.log(answer);".to_string(),
      map: None,
      footer: Some("0 && (module.exports = {\n  handler\n});".to_string()),
    }
  }

  #[test]
  fn footer_survives_minification() {
    let chunks = vec![chunk("src/handlers/ping.ts", "handlers/ping/index.js")];
    let assets = finalize_chunks(&options(BuildMode::Production), chunks).unwrap();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].filename, "handlers/ping/index.js");
    assert!(assets[0].content.trim_end().ends_with("0 && (module.exports = {\n  handler\n});"));
    assert!(!assets[0].content.contains("sourceMappingURL"));
  }

  #[test]
  fn same_filename_twice_is_an_error() {
    let chunks =
      vec![chunk("src/handlers/a/ping.ts", "ping/index.js"), chunk("src/handlers/b/ping.ts", "ping/index.js")];
    let error = finalize_chunks(&options(BuildMode::Development), chunks).unwrap_err();
    assert_eq!(error.len(), 1);
    let message = error[0].to_string();
    assert!(message.contains("FILENAME_CONFLICT"), "{message}");
    assert!(message.contains("src/handlers/a/ping.ts"), "{message}");
  }
}
