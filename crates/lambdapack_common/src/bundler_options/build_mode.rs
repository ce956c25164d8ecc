use std::fmt::Display;

/// Whether the build targets a deployment or local iteration. Read from the environment once, at
/// the edge of the program, and passed down explicitly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
  Production,
  #[default]
  Development,
}

impl BuildMode {
  pub const PRODUCTION_MARKER: &'static str = "production";

  /// Anything but the exact value `production` is a development build.
  pub fn from_env_value(value: Option<&str>) -> Self {
    match value {
      Some(Self::PRODUCTION_MARKER) => Self::Production,
      _ => Self::Development,
    }
  }

  pub fn is_production(self) -> bool {
    matches!(self, Self::Production)
  }

  pub fn minify(self) -> bool {
    self.is_production()
  }

  pub fn sourcemap(self) -> bool {
    !self.is_production()
  }
}

impl Display for BuildMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Production => write!(f, "production"),
      Self::Development => write!(f, "development"),
    }
  }
}

#[test]
fn test_from_env_value() {
  assert_eq!(BuildMode::from_env_value(Some("production")), BuildMode::Production);
  assert_eq!(BuildMode::from_env_value(Some("Production")), BuildMode::Development);
  assert_eq!(BuildMode::from_env_value(Some("")), BuildMode::Development);
  assert_eq!(BuildMode::from_env_value(None), BuildMode::Development);
  assert!(BuildMode::Production.minify() && !BuildMode::Production.sourcemap());
  assert!(!BuildMode::Development.minify() && BuildMode::Development.sourcemap());
}
