use std::{
  borrow::Cow,
  ffi::OsStr,
  path::{Path, PathBuf},
};

use sugar_path::SugarPath;

pub trait PathExt {
  /// Forward-slash form of the path, replacing invalid UTF-8 lossily.
  fn to_slash_string(&self) -> String;

  fn representative_file_name(&self) -> Cow<str>;

  /// Path of `self` relative to `base`, in forward-slash form.
  fn relative_slash(&self, base: &Path) -> String;
}

impl PathExt for Path {
  fn to_slash_string(&self) -> String {
    self.to_slash_lossy().into_owned()
  }

  /// It doesn't ensure the file name is a valid identifier in JS.
  fn representative_file_name(&self) -> Cow<str> {
    let file_name =
      self.file_stem().map_or_else(|| self.to_string_lossy(), |stem| stem.to_string_lossy());

    match &*file_name {
      // "index": Node.js use `index` as a special name for directory import.
      "index" => self
        .parent()
        .and_then(Self::file_stem)
        .map(OsStr::to_string_lossy)
        .map_or(file_name, |parent_dir_name| parent_dir_name),
      _ => file_name,
    }
  }

  fn relative_slash(&self, base: &Path) -> String {
    let relative: PathBuf = self.relative(base);
    relative.to_slash_string()
  }
}

/// The deepest directory containing every path in `paths`.
pub fn lowest_common_ancestor<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Option<PathBuf> {
  let mut paths = paths.into_iter();
  let mut ancestor = paths.next()?.parent()?.to_path_buf();
  for path in paths {
    while !path.starts_with(&ancestor) {
      if !ancestor.pop() {
        return None;
      }
    }
  }
  Some(ancestor)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_representative_file_name() {
    let cwd = Path::new(".").join("project");
    let path = cwd.join("src").join("user.ts");
    assert_eq!(path.representative_file_name(), "user");

    let path = cwd.join("services").join("index.ts");
    assert_eq!(path.representative_file_name(), "services");
  }

  #[test]
  fn test_lowest_common_ancestor() {
    let a = Path::new("/app/src/handlers/ping.ts");
    let b = Path::new("/app/src/handlers/admin/users.ts");
    let c = Path::new("/app/src/jobs/nightly.ts");
    assert_eq!(lowest_common_ancestor([a, b]), Some(PathBuf::from("/app/src/handlers")));
    assert_eq!(lowest_common_ancestor([a, b, c]), Some(PathBuf::from("/app/src")));
    assert_eq!(lowest_common_ancestor([a]), Some(PathBuf::from("/app/src/handlers")));
    assert_eq!(lowest_common_ancestor(std::iter::empty()), None);
  }

  #[test]
  fn test_relative_slash() {
    let module = Path::new("/app/src/services/user.ts");
    assert_eq!(module.relative_slash(Path::new("/app/dist/handlers/ping")), "../../../src/services/user.ts");
  }
}
