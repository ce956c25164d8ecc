#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
  template: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FileNameRenderOptions<'a> {
  pub dir: Option<&'a str>,
  pub name: Option<&'a str>,
  pub hash: Option<&'a str>,
  pub ext: Option<&'a str>,
}

impl FilenameTemplate {
  pub fn new(template: String) -> Self {
    Self { template }
  }

  pub fn template(&self) -> &str {
    &self.template
  }

  pub fn has_hash_pattern(&self) -> bool {
    self.template.contains("[hash]")
  }

  /// Fills the placeholders. Without an `[ext]` placeholder the extension is appended, and an
  /// empty `[dir]` leaves no stray separators behind.
  pub fn render(&self, options: FileNameRenderOptions<'_>) -> String {
    let mut rendered = self.template.clone();
    if let Some(dir) = options.dir {
      rendered = rendered.replace("[dir]", dir);
    }
    if let Some(name) = options.name {
      rendered = rendered.replace("[name]", name);
    }
    if let Some(hash) = options.hash {
      rendered = rendered.replace("[hash]", hash);
    }
    if let Some(ext) = options.ext {
      if rendered.contains("[ext]") {
        rendered = rendered.replace("[ext]", ext);
      } else {
        rendered.push('.');
        rendered.push_str(ext);
      }
    }

    let segments = rendered.split('/').filter(|segment| !segment.is_empty() && *segment != ".");
    segments.collect::<Vec<_>>().join("/")
  }
}

impl From<String> for FilenameTemplate {
  fn from(template: String) -> Self {
    Self::new(template)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_lambda_layout() {
    let template = FilenameTemplate::new("[dir]/[name]/index".to_string());
    let options = FileNameRenderOptions { dir: Some("handlers"), name: Some("ping"), ext: Some("js"), hash: None };
    assert_eq!(template.render(options), "handlers/ping/index.js");
  }

  #[test]
  fn empty_dir_leaves_no_leading_separator() {
    let template = FilenameTemplate::new("[dir]/[name]/index".to_string());
    let options = FileNameRenderOptions { dir: Some(""), name: Some("ping"), ext: Some("js"), hash: None };
    assert_eq!(template.render(options), "ping/index.js");
  }

  #[test]
  fn explicit_ext_and_hash() {
    let template = FilenameTemplate::new("[name]-[hash].[ext]".to_string());
    assert!(template.has_hash_pattern());
    let options =
      FileNameRenderOptions { dir: None, name: Some("ping"), hash: Some("abc123"), ext: Some("mjs") };
    assert_eq!(template.render(options), "ping-abc123.mjs");
  }
}
