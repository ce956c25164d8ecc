use std::{io, path::Path};

use crate::FileSystem;

#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
  }

  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    std::fs::create_dir_all(path)
  }

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
    std::fs::write(path, content)
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
      Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
      other => other,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn writes_and_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let fs = OsFileSystem;
    let nested = dir.path().join("dist/handlers/ping");
    fs.create_dir_all(&nested).unwrap();
    let file = nested.join("index.js");
    fs.write(&file, b"module.exports = {};").unwrap();
    assert!(fs.exists(&file));
    assert_eq!(fs.read_to_string(&file).unwrap(), "module.exports = {};");
    fs.remove_file(&file).unwrap();
    fs.remove_file(&file).unwrap();
    assert!(!fs.exists(&file));
  }
}
