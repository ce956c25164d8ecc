use std::{
  fs,
  path::{Path, PathBuf},
};

use lambdapack::{BuildMode, BuildResult, BundleOutput, Bundler, BundlerOptions, EntryDescriptor};
use tempfile::TempDir;

pub const HANDLERS: &str = "src/handlers/*.ts";

/// A throwaway project directory with the given files.
pub struct Project {
  dir: TempDir,
}

impl Project {
  pub fn new(files: &[(&str, &str)]) -> Self {
    let dir = tempfile::tempdir().unwrap();
    for (relative, content) in files {
      let path = dir.path().join(relative);
      fs::create_dir_all(path.parent().unwrap()).unwrap();
      fs::write(path, content).unwrap();
    }
    Self { dir }
  }

  pub fn root(&self) -> &Path {
    self.dir.path()
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.root().join(relative)
  }

  pub fn read(&self, relative: &str) -> String {
    fs::read_to_string(self.path(relative))
      .unwrap_or_else(|err| panic!("failed to read {relative}: {err}"))
  }

  pub fn exists(&self, relative: &str) -> bool {
    self.path(relative).exists()
  }

  pub fn discover(&self) -> BuildResult<Vec<EntryDescriptor>> {
    lambdapack::discover_entries(self.root(), HANDLERS)
  }

  /// Discovers the handlers and writes their bundles, the way the CLI does.
  pub async fn write(&self, mode: BuildMode) -> BuildResult<BundleOutput> {
    let entries = self.discover()?;
    let bundler = Bundler::new(BundlerOptions {
      input: Some(entries.iter().map(EntryDescriptor::to_input_item).collect()),
      cwd: Some(self.root().to_path_buf()),
      ..BundlerOptions::for_mode(mode)
    })?;
    bundler.write().await
  }
}

pub fn error_messages(errors: &[anyhow::Error]) -> String {
  errors.iter().map(|error| format!("{error:#}")).collect::<Vec<_>>().join("\n")
}
