mod common;

use common::Project;
use lambdapack::BuildMode;

const PING: &str = r#"
class Greeter {
  greet?(): string;
  prefix?: string;
  run(name?: string): string {
    return `${this.prefix ?? "hello"} ${name ?? "world"}`;
  }
}

let calls!: number;
calls = 0;

export const handler = async (event: { name: string }, context?: unknown) => {
  calls += 1;
  return { statusCode: 200, body: new Greeter().run(event.name) };
};
"#;

fn project() -> Project {
  Project::new(&[("src/handlers/ping.ts", PING)])
}

#[tokio::test]
async fn optional_markers_are_stripped_in_development() {
  let project = project();
  project.write(BuildMode::Development).await.unwrap();

  let code = project.read("dist/handlers/ping/index.js");
  assert!(code.contains("const handler = async (event, context) => {"), "{code}");
  assert!(code.contains("  run(name) {"), "{code}");
  assert!(code.contains("  prefix;"), "{code}");
  assert!(code.contains("let calls;"), "{code}");
  assert!(!code.contains("greet"), "{code}");
  assert!(!code.contains("?)"), "{code}");
}

#[tokio::test]
async fn optional_markers_are_stripped_in_production() {
  let project = project();
  let output = project.write(BuildMode::Production).await.unwrap();

  assert_eq!(output.chunks().count(), 1);
  let code = project.read("dist/handlers/ping/index.js");
  assert!(!code.contains("?)"), "{code}");
  assert!(!code.contains("?:"), "{code}");
  assert!(!project.exists("dist/handlers/ping/index.js.map"));
}
