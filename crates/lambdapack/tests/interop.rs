mod common;

use common::Project;
use lambdapack::BuildMode;

#[tokio::test]
async fn commonjs_dependencies_are_wrapped() {
  let project = Project::new(&[
    (
      "src/handlers/greet.ts",
      "import { greet } from \"../lib/legacy\";\nexport const handler = async () => greet(\"Ada\");\n",
    ),
    ("src/lib/legacy.js", "exports.greet = (name) => \"hello \" + name;\n"),
  ]);
  project.write(BuildMode::Development).await.unwrap();

  let code = project.read("dist/handlers/greet/index.js");
  assert!(code.contains("__commonJS("), "{code}");
  assert!(code.contains("require_legacy()"), "{code}");
  assert!(code.contains("__toESM("), "{code}");
  assert!(code.contains("exports.greet = (name) =>"), "{code}");
}

#[tokio::test]
async fn externals_stay_require_calls() {
  let project = Project::new(&[(
    "src/handlers/upload.ts",
    r#"
import { randomUUID } from "node:crypto";
import { S3Client } from "@aws-sdk/client-s3";

const client = new S3Client({});

export const handler = async () => ({ id: randomUUID(), client: typeof client });
"#,
  )]);
  project.write(BuildMode::Development).await.unwrap();

  let code = project.read("dist/handlers/upload/index.js");
  assert!(code.contains("require(\"node:crypto\")"), "{code}");
  assert!(code.contains("require(\"@aws-sdk/client-s3\")"), "{code}");
  assert!(!code.contains("import "), "{code}");
}

#[tokio::test]
async fn json_modules_are_inlined() {
  let project = Project::new(&[
    (
      "src/handlers/config.ts",
      "import settings from \"../settings.json\";\nexport const handler = async () => settings.region;\n",
    ),
    ("src/settings.json", "{ \"region\": \"eu-west-1\" }\n"),
  ]);
  project.write(BuildMode::Development).await.unwrap();

  let code = project.read("dist/handlers/config/index.js");
  assert!(code.contains("\"region\": \"eu-west-1\""), "{code}");
  assert!(!code.contains("require("), "{code}");
}

#[tokio::test]
async fn colliding_top_level_names_are_renamed() {
  let project = Project::new(&[
    (
      "src/handlers/ping.ts",
      "import { label as other } from \"../lib/label\";\nconst label = \"ping\";\nexport const handler = () => label + other;\n",
    ),
    ("src/lib/label.ts", "export const label = \"lib\";\n"),
  ]);
  project.write(BuildMode::Development).await.unwrap();

  let code = project.read("dist/handlers/ping/index.js");
  // The entry keeps its own names.
  assert!(code.contains("const label = \"ping\";"), "{code}");
  assert!(code.contains("const label$1 = \"lib\";"), "{code}");
  assert!(code.contains("() => label + label$1"), "{code}");
}
