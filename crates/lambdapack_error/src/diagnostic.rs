use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
  ParseError,
  UnresolvedImport,
  MissingExport,
  AmbiguousExport,
  UnsupportedSyntax,
  TopLevelAwait,
  CircularDependency,
  ImportMetaInCjs,
  NoEntries,
  FilenameConflict,
  InvalidOption,
}

impl DiagnosticKind {
  pub fn code(self) -> &'static str {
    match self {
      Self::ParseError => "PARSE_ERROR",
      Self::UnresolvedImport => "UNRESOLVED_IMPORT",
      Self::MissingExport => "MISSING_EXPORT",
      Self::AmbiguousExport => "AMBIGUOUS_EXPORT",
      Self::UnsupportedSyntax => "UNSUPPORTED_SYNTAX",
      Self::TopLevelAwait => "TOP_LEVEL_AWAIT",
      Self::CircularDependency => "CIRCULAR_DEPENDENCY",
      Self::ImportMetaInCjs => "IMPORT_META_IN_CJS",
      Self::NoEntries => "NO_ENTRIES",
      Self::FilenameConflict => "FILENAME_CONFLICT",
      Self::InvalidOption => "INVALID_OPTION",
    }
  }
}

/// A position inside a source file, 1-based like editors print it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
  pub path: String,
  pub line: usize,
  pub column: usize,
  /// The full text of the line the offset points into.
  pub line_text: String,
}

impl Location {
  pub fn from_offset(path: impl Into<String>, source: &str, offset: u32) -> Self {
    let offset = (offset as usize).min(source.len());
    let line_start = source[..offset].rfind('\n').map_or(0, |idx| idx + 1);
    let line_end = source[offset..].find('\n').map_or(source.len(), |idx| offset + idx);
    let line = source[..line_start].bytes().filter(|b| *b == b'\n').count() + 1;
    let column = source[line_start..offset].chars().count() + 1;
    Self {
      path: path.into(),
      line,
      column,
      line_text: source[line_start..line_end].trim_end_matches('\r').to_string(),
    }
  }
}

impl Display for Location {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}:{}", self.path, self.line, self.column)
  }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
  pub kind: DiagnosticKind,
  pub message: String,
  pub location: Option<Location>,
}

impl Diagnostic {
  pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
    Self { kind, message: message.into(), location: None }
  }

  pub fn with_location(mut self, location: Location) -> Self {
    self.location = Some(location);
    self
  }

  pub fn at(self, path: impl Into<String>, source: &str, offset: u32) -> Self {
    self.with_location(Location::from_offset(path, source, offset))
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{}] {}", self.kind.code(), self.message)?;
    if let Some(location) = &self.location {
      let gutter = location.line.to_string();
      write!(f, "\n  --> {location}")?;
      write!(f, "\n {gutter} | {}", location.line_text)?;
      let padding = " ".repeat(gutter.len());
      let caret_offset = " ".repeat(location.column.saturating_sub(1));
      write!(f, "\n {padding} | {caret_offset}^")?;
    }
    Ok(())
  }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn location_counts_lines_and_columns_from_one() {
    let source = "const a = 1;\nconst b = a +;\n";
    let location = Location::from_offset("src/a.ts", source, 26);
    assert_eq!(location.line, 2);
    assert_eq!(location.column, 14);
    assert_eq!(location.line_text, "const b = a +;");
    assert_eq!(location.to_string(), "src/a.ts:2:14");
  }

  #[test]
  fn location_clamps_offsets_past_the_end() {
    let location = Location::from_offset("a.ts", "x", 100);
    assert_eq!((location.line, location.column), (1, 2));
  }

  #[test]
  fn diagnostic_renders_code_frame() {
    let diagnostic = Diagnostic::new(DiagnosticKind::UnresolvedImport, "Could not resolve \"./nope\"")
      .at("src/handlers/ping.ts", "import x from \"./nope\";", 14);
    assert_eq!(
      diagnostic.to_string(),
      "[UNRESOLVED_IMPORT] Could not resolve \"./nope\"\n  --> src/handlers/ping.ts:1:15\n 1 | import x from \"./nope\";\n   |               ^"
    );
  }
}
