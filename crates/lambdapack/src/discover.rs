use std::path::{Path, PathBuf};

use lambdapack_common::{InputItem, ModuleType};
use lambdapack_error::{BuildResult, Diagnostic, DiagnosticKind};
use lambdapack_utils::path_ext::PathExt;
use walkdir::WalkDir;

/// A source file matched by the entry pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
  pub path: PathBuf,
  /// Relative to the working directory, slash separated, e.g. `src/handlers/ping.ts`.
  pub relative: String,
}

impl EntryDescriptor {
  pub fn to_input_item(&self) -> InputItem {
    InputItem::from(self.relative.as_str())
  }
}

/// Collects the files under `cwd` matching `pattern`, sorted by path. Declaration files and files
/// without a module loader are skipped. Finding nothing is an error.
pub fn discover_entries(cwd: &Path, pattern: &str) -> BuildResult<Vec<EntryDescriptor>> {
  let pattern = pattern.trim_start_matches("./");
  let walk_root = cwd.join(static_prefix(pattern));

  let mut entries = WalkDir::new(&walk_root)
    .follow_links(true)
    .into_iter()
    .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != "node_modules")
    // A missing directory simply matches nothing.
    .filter_map(Result::ok)
    .filter(|entry| entry.file_type().is_file())
    .filter_map(|entry| {
      let path = entry.into_path();
      let relative = path.relative_slash(cwd);
      (fast_glob::glob_match(pattern, &relative) && is_entry_candidate(&path))
        .then_some(EntryDescriptor { path, relative })
    })
    .collect::<Vec<_>>();

  if entries.is_empty() {
    Err(Diagnostic::new(
      DiagnosticKind::NoEntries,
      format!("No entry points found matching \"{pattern}\" in {}", cwd.display()),
    ))?;
  }

  entries.sort_unstable_by(|a, b| a.relative.cmp(&b.relative));
  tracing::debug!(count = entries.len(), pattern, "discovered entries");
  Ok(entries)
}

fn is_entry_candidate(path: &Path) -> bool {
  let file_name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
  let is_declaration = [".d.ts", ".d.mts", ".d.cts"].iter().any(|ext| file_name.ends_with(ext));
  !is_declaration && ModuleType::from_path(path).is_some()
}

/// `src/handlers/*.ts` -> `src/handlers`, the directory the walk can start from.
fn static_prefix(pattern: &str) -> PathBuf {
  let segments = pattern.split('/').collect::<Vec<_>>();
  let static_len =
    segments.iter().take_while(|segment| !segment.contains(['*', '?', '[', '{', '!'])).count();
  // Without any glob the last segment is the file itself.
  let dir_len = if static_len == segments.len() { static_len - 1 } else { static_len };
  segments[..dir_len].iter().collect()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use pretty_assertions::assert_eq;

  use super::*;

  fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "export {};").unwrap();
  }

  #[test]
  fn finds_sorted_handlers() {
    let dir = tempfile::tempdir().unwrap();
    for file in [
      "src/handlers/ping.ts",
      "src/handlers/create-user.ts",
      "src/handlers/types.d.ts",
      "src/handlers/nested/deep.ts",
      "src/services/user.ts",
    ] {
      touch(dir.path(), file);
    }

    let entries = discover_entries(dir.path(), "src/handlers/*.ts").unwrap();
    let relative = entries.iter().map(|entry| entry.relative.as_str()).collect::<Vec<_>>();
    assert_eq!(relative, vec!["src/handlers/create-user.ts", "src/handlers/ping.ts"]);
    assert!(entries[0].path.is_absolute());
  }

  #[test]
  fn no_match_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "src/services/user.ts");
    let err = discover_entries(dir.path(), "src/handlers/*.ts").unwrap_err();
    assert!(err.to_string().contains("NO_ENTRIES"), "{err}");
  }

  #[test]
  fn static_prefix_stops_at_the_first_glob() {
    assert_eq!(static_prefix("src/handlers/*.ts"), PathBuf::from("src/handlers"));
    assert_eq!(static_prefix("src/**/handler.ts"), PathBuf::from("src"));
    assert_eq!(static_prefix("*.ts"), PathBuf::new());
    assert_eq!(static_prefix("src/handlers/ping.ts"), PathBuf::from("src/handlers"));
  }
}
