use std::{fmt::Display, str::FromStr};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
  /// Node built-ins are external and resolution uses the `node` condition.
  #[default]
  Node,
  Neutral,
}

impl FromStr for Platform {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "node" => Ok(Self::Node),
      "neutral" => Ok(Self::Neutral),
      _ => Err(format!("Invalid platform \"{s}\", expected \"node\" or \"neutral\".")),
    }
  }
}

impl Display for Platform {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Node => write!(f, "node"),
      Self::Neutral => write!(f, "neutral"),
    }
  }
}
