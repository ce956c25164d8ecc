use std::{fmt::Display, str::FromStr};

/// The runtime the bundle is written for. Syntax is never lowered, so the target only gates what
/// the bundle is allowed to contain and how it is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
  /// Major Node.js version.
  Node(u32),
  Es(ESTarget),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ESTarget {
  Es2015,
  Es2016,
  Es2017,
  Es2018,
  Es2019,
  Es2020,
  Es2021,
  Es2022,
  Es2023,
  Es2024,
  #[default]
  EsNext,
}

impl Default for Target {
  fn default() -> Self {
    Self::Node(20)
  }
}

impl Target {
  pub const MIN_NODE_MAJOR: u32 = 16;
}

impl FromStr for ESTarget {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "es2015" | "es6" => Ok(Self::Es2015),
      "es2016" => Ok(Self::Es2016),
      "es2017" => Ok(Self::Es2017),
      "es2018" => Ok(Self::Es2018),
      "es2019" => Ok(Self::Es2019),
      "es2020" => Ok(Self::Es2020),
      "es2021" => Ok(Self::Es2021),
      "es2022" => Ok(Self::Es2022),
      "es2023" => Ok(Self::Es2023),
      "es2024" => Ok(Self::Es2024),
      "esnext" => Ok(Self::EsNext),
      _ => Err(format!("Invalid target \"{s}\".")),
    }
  }
}

impl FromStr for Target {
  type Err = String;

  /// Accepts `node20`, `node20.11.1` and `es2015` up to `esnext`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.to_ascii_lowercase();
    if let Some(version) = lower.strip_prefix("node") {
      let major = version.split('.').next().unwrap_or_default();
      return major
        .parse::<u32>()
        .map(Self::Node)
        .map_err(|_| format!("Invalid target \"{s}\", expected a Node.js version like \"node20\"."));
    }
    lower.parse::<ESTarget>().map(Self::Es)
  }
}

impl Display for ESTarget {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Self::Es2015 => "es2015",
      Self::Es2016 => "es2016",
      Self::Es2017 => "es2017",
      Self::Es2018 => "es2018",
      Self::Es2019 => "es2019",
      Self::Es2020 => "es2020",
      Self::Es2021 => "es2021",
      Self::Es2022 => "es2022",
      Self::Es2023 => "es2023",
      Self::Es2024 => "es2024",
      Self::EsNext => "esnext",
    };
    f.write_str(name)
  }
}

impl Display for Target {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Node(major) => write!(f, "node{major}"),
      Self::Es(target) => target.fmt(f),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_node_versions() {
    assert_eq!("node20".parse::<Target>(), Ok(Target::Node(20)));
    assert_eq!("node18.19.0".parse::<Target>(), Ok(Target::Node(18)));
    assert!("nodeX".parse::<Target>().is_err());
  }

  #[test]
  fn parses_es_versions() {
    assert_eq!("es2022".parse::<Target>(), Ok(Target::Es(ESTarget::Es2022)));
    assert_eq!("ESNext".parse::<Target>(), Ok(Target::Es(ESTarget::EsNext)));
    assert!("es3".parse::<Target>().is_err());
    assert_eq!(Target::Node(20).to_string(), "node20");
  }
}
