use clap::ValueEnum;

#[derive(Debug, PartialEq, Eq, Clone, Copy, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum OutputFormat {
  Esm,
  Cjs,
}

impl From<OutputFormat> for lambdapack::OutputFormat {
  fn from(value: OutputFormat) -> Self {
    match value {
      OutputFormat::Esm => lambdapack::OutputFormat::Esm,
      OutputFormat::Cjs => lambdapack::OutputFormat::Cjs,
    }
  }
}
