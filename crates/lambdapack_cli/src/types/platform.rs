use clap::ValueEnum;

#[derive(Debug, PartialEq, Eq, Clone, Copy, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum Platform {
  Node,
  Neutral,
}

impl From<Platform> for lambdapack::Platform {
  fn from(value: Platform) -> Self {
    match value {
      Platform::Node => lambdapack::Platform::Node,
      Platform::Neutral => lambdapack::Platform::Neutral,
    }
  }
}
