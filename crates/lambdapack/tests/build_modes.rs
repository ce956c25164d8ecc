mod common;

use common::Project;
use lambdapack::{BuildMode, OutputAssetKind};
use pretty_assertions::assert_eq;

const PING: &str = r#"
// Replies to health checks.
export const handler = async () => {
  const message = "pong";
  return { statusCode: 200, body: message };
};
"#;

fn project() -> Project {
  Project::new(&[("src/handlers/ping.ts", PING)])
}

#[tokio::test]
async fn development_writes_sourcemaps() {
  let project = project();
  let output = project.write(BuildMode::Development).await.unwrap();

  let kinds = output.assets.iter().map(|asset| (asset.filename.as_str(), asset.kind)).collect::<Vec<_>>();
  assert_eq!(
    kinds,
    vec![("handlers/ping/index.js", OutputAssetKind::Chunk), ("handlers/ping/index.js.map", OutputAssetKind::SourceMap)]
  );

  let code = project.read("dist/handlers/ping/index.js");
  assert!(code.trim_end().ends_with("//# sourceMappingURL=index.js.map"), "{code}");
  assert!(code.contains("// Replies to health checks."), "{code}");

  let map: serde_json::Value = serde_json::from_str(&project.read("dist/handlers/ping/index.js.map")).unwrap();
  assert_eq!(map["version"], 3);
  let sources = map["sources"].as_array().unwrap();
  assert!(sources.iter().any(|source| source == "../../../src/handlers/ping.ts"), "{sources:?}");
  assert!(!map["mappings"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn production_minifies_without_sourcemaps() {
  let development = project();
  development.write(BuildMode::Development).await.unwrap();
  let production = project();
  let output = production.write(BuildMode::Production).await.unwrap();

  assert_eq!(output.assets.len(), 1);
  assert!(!production.exists("dist/handlers/ping/index.js.map"));

  let minified = production.read("dist/handlers/ping/index.js");
  let readable = development.read("dist/handlers/ping/index.js");
  assert!(minified.len() < readable.len(), "{minified}");
  assert!(!minified.contains("sourceMappingURL"), "{minified}");
  assert!(!minified.contains("Replies to health checks"), "{minified}");
  // The export annotation is added after minification, which would drop it.
  assert!(minified.trim_end().ends_with("0 && (module.exports = {\n  handler\n});"), "{minified}");
}

#[tokio::test]
async fn production_build_removes_stale_sourcemaps() {
  let project = project();
  project.write(BuildMode::Development).await.unwrap();
  assert!(project.exists("dist/handlers/ping/index.js.map"));

  project.write(BuildMode::Production).await.unwrap();
  assert!(!project.exists("dist/handlers/ping/index.js.map"));
}
