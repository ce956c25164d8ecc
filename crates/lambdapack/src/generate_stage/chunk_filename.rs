use std::path::{Path, PathBuf};

use itertools::Itertools;
use lambdapack_common::{ChunkIdx, FileNameRenderOptions, FilenameTemplate};
use lambdapack_utils::path_ext::PathExt;
use oxc_index::IndexVec;

use crate::utils::normalize_options::outbase_for;

use super::GenerateStage;

impl GenerateStage<'_> {
  /// Output filenames relative to `dir`, `[hash]` is filled once the content is final.
  pub fn generate_preliminary_filenames(&self) -> IndexVec<ChunkIdx, String> {
    let module_table = &self.link_output.module_table;
    let chunk_table = &self.link_output.chunk_graph.chunk_table;
    let entry_paths = chunk_table
      .iter()
      .map(|chunk| PathBuf::from(module_table[chunk.entry_module].id()))
      .collect::<Vec<_>>();
    let outbase = outbase_for(self.options, &entry_paths);

    chunk_table
      .iter()
      .zip(&entry_paths)
      .map(|(chunk, entry_path)| {
        generate_entry_filename(
          &self.options.entry_filenames,
          outbase.as_deref(),
          entry_path,
          &chunk.name,
          self.options.format.default_extension(),
        )
      })
      .collect()
  }
}

/// `src/handlers/ping.ts` with the template `[dir]/[name]/index` and outbase `src` renders to
/// `handlers/ping/index.js`.
pub fn generate_entry_filename(
  template: &FilenameTemplate,
  outbase: Option<&Path>,
  entry_path: &Path,
  name: &str,
  ext: &str,
) -> String {
  let dir = match (outbase, entry_path.parent()) {
    (Some(outbase), Some(parent)) => parent.relative_slash(outbase),
    _ => String::new(),
  };
  // `[dir]` must not climb out of the output directory.
  let dir = dir
    .split('/')
    .filter(|segment| !segment.is_empty() && *segment != ".")
    .map(|segment| if segment == ".." { "_.._" } else { segment })
    .join("/");

  template.render(FileNameRenderOptions {
    dir: Some(&dir),
    name: Some(name),
    hash: None,
    ext: Some(ext),
  })
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn lambda_template() -> FilenameTemplate {
    FilenameTemplate::new("[dir]/[name]/index".to_string())
  }

  #[test]
  fn dir_is_relative_to_outbase() {
    let filename = generate_entry_filename(
      &lambda_template(),
      Some(Path::new("/app/src")),
      Path::new("/app/src/handlers/ping.ts"),
      "ping",
      "js",
    );
    assert_eq!(filename, "handlers/ping/index.js");
  }

  #[test]
  fn entry_in_outbase_has_empty_dir() {
    let filename = generate_entry_filename(
      &lambda_template(),
      Some(Path::new("/app/src/handlers")),
      Path::new("/app/src/handlers/ping.ts"),
      "ping",
      "js",
    );
    assert_eq!(filename, "ping/index.js");
  }

  #[test]
  fn parent_segments_stay_inside_output_dir() {
    let filename = generate_entry_filename(
      &lambda_template(),
      Some(Path::new("/app/src")),
      Path::new("/app/scripts/seed.ts"),
      "seed",
      "mjs",
    );
    assert_eq!(filename, "_.._/scripts/seed/index.mjs");
  }
}
