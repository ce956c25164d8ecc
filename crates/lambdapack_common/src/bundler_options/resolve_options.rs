#[derive(Debug, Default, Clone)]
pub struct ResolveOptions {
  /// Path to a `tsconfig.json` whose `paths` are honored. Relative to `cwd`.
  pub tsconfig_filename: Option<String>,
  pub condition_names: Option<Vec<String>>,
}
