#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExportsKind {
  Esm,
  CommonJs,
  /// No `import`/`export` and no `module`/`exports`, decided by how the module is imported.
  #[default]
  None,
}

impl ExportsKind {
  pub fn is_commonjs(self) -> bool {
    matches!(self, Self::CommonJs)
  }
}
