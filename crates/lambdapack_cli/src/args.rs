use std::path::PathBuf;

use clap::{Args, Parser};
use lambdapack::Target;

use crate::types::{output_format::OutputFormat, platform::Platform};

#[derive(Parser)]
#[command(version, about = "Bundles TypeScript Lambda handlers into deployable CommonJS files", long_about = None)]
pub struct Commands {
  /// Glob of entry files relative to the working directory [default: src/handlers/*.ts]
  pub entries: Option<String>,

  #[clap(flatten)]
  pub input: InputArgs,

  #[clap(flatten)]
  pub output: OutputArgs,

  #[clap(flatten)]
  pub enhance: EnhanceArgs,

  /// `production` minifies without sourcemaps, anything else is a development build.
  #[clap(long = "node-env", env = "NODE_ENV", hide_env_values = true)]
  pub node_env: Option<String>,

  /// Only print errors.
  #[clap(long, short)]
  pub silent: bool,
}

#[derive(Args)]
pub struct InputArgs {
  #[clap(long)]
  pub cwd: Option<PathBuf>,

  /// Defaults to `lambdapack.toml` in the working directory when it exists.
  #[clap(long, short = 'c')]
  pub config: Option<PathBuf>,

  #[clap(long, short)]
  pub platform: Option<Platform>,

  /// Bare specifiers matching this glob stay `require` calls. Can be repeated.
  #[clap(long, action = clap::ArgAction::Append)]
  pub external: Option<Vec<String>>,

  #[clap(long)]
  pub tsconfig: Option<String>,
}

#[derive(Args)]
pub struct OutputArgs {
  #[clap(long, short = 'd')]
  pub outdir: Option<String>,

  #[clap(long)]
  pub outbase: Option<String>,

  /// Supports `[dir]`, `[name]`, `[hash]` and `[ext]`.
  #[clap(long)]
  pub entry_names: Option<String>,

  #[clap(long)]
  pub format: Option<OutputFormat>,
}

#[derive(Args)]
pub struct EnhanceArgs {
  #[clap(long, short = 'm')]
  pub minify: Option<bool>,

  /// `true`, `false`, `file` or `inline`.
  #[clap(long)]
  pub sourcemap: Option<String>,

  #[clap(long)]
  pub tree_shaking: Option<bool>,

  /// e.g. `node20`.
  #[clap(long)]
  pub target: Option<Target>,
}
