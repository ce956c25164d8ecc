use std::{fmt::Display, str::FromStr};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  Esm,
  #[default]
  Cjs,
}

impl OutputFormat {
  #[inline]
  pub fn keep_esm_import_export_syntax(self) -> bool {
    matches!(self, Self::Esm)
  }

  #[inline]
  pub fn default_extension(self) -> &'static str {
    match self {
      Self::Esm => "mjs",
      Self::Cjs => "js",
    }
  }
}

impl FromStr for OutputFormat {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "esm" => Ok(Self::Esm),
      "cjs" => Ok(Self::Cjs),
      _ => Err(format!("Invalid format \"{s}\", expected \"cjs\" or \"esm\".")),
    }
  }
}

impl Display for OutputFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Esm => write!(f, "esm"),
      Self::Cjs => write!(f, "cjs"),
    }
  }
}
