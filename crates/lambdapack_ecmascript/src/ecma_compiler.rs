use arcstr::ArcStr;
use lambdapack_error::{BuildError, BuildResult, Diagnostic, DiagnosticKind};
use oxc::{
  allocator::Allocator,
  codegen::{Codegen, CodegenOptions},
  diagnostics::{OxcDiagnostic, Severity},
  minifier::{Minifier, MinifierOptions},
  parser::Parser,
  span::SourceType,
};

use crate::ecma_ast::{
  program_cell::{ProgramCell, ProgramCellDependent, ProgramCellOwner},
  EcmaAst,
};

pub struct EcmaCompiler;

impl EcmaCompiler {
  /// Parses `source`, reporting every syntax error against `stable_id`.
  pub fn parse(stable_id: &str, source: impl Into<ArcStr>, source_type: SourceType) -> BuildResult<EcmaAst> {
    let allocator = Allocator::default();
    let owner = ProgramCellOwner { source: source.into(), allocator };
    let program = ProgramCell::try_new(owner, |owner| {
      let ret = Parser::new(&owner.allocator, &owner.source, source_type).parse();
      let errors = ret
        .errors
        .iter()
        .filter(|error| matches!(error.severity, Severity::Error))
        .collect::<Vec<_>>();
      if errors.is_empty() && !ret.panicked {
        Ok(ProgramCellDependent { program: ret.program })
      } else if errors.is_empty() {
        Err(BuildError::from(
          Diagnostic::new(DiagnosticKind::ParseError, "Unrecoverable syntax error").at(stable_id, &owner.source, 0),
        ))
      } else {
        Err(BuildError::from(
          errors
            .into_iter()
            .map(|error| Self::to_diagnostic(stable_id, &owner.source, error).into())
            .collect::<Vec<anyhow::Error>>(),
        ))
      }
    })?;

    Ok(EcmaAst { program, source_type })
  }

  pub fn to_diagnostic(stable_id: &str, source: &str, error: &OxcDiagnostic) -> Diagnostic {
    let offset = error
      .labels
      .as_ref()
      .and_then(|labels| labels.first())
      .and_then(|label| u32::try_from(label.offset()).ok())
      .unwrap_or(0);
    Diagnostic::new(DiagnosticKind::ParseError, error.message.to_string()).at(stable_id, source, offset)
  }

  /// Compresses and prints `source_text` without whitespace. Identifiers keep their names so that
  /// stack traces in CloudWatch stay readable.
  pub fn minify(source_text: &str, source_type: SourceType) -> BuildResult<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source_text, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
      return Err(BuildError::from(
        ret
          .errors
          .iter()
          .map(|error| {
            anyhow::anyhow!("Failed to minify the generated bundle: {}", error.message)
          })
          .collect::<Vec<_>>(),
      ));
    }
    let mut program = ret.program;

    let _ = Minifier::new(MinifierOptions::default()).build(&allocator, &mut program);

    let ret =
      Codegen::new().with_options(CodegenOptions { minify: true, ..CodegenOptions::default() }).build(&program);

    Ok(ret.code)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_typescript() {
    let ast = EcmaCompiler::parse("a.ts", "const a: number = 1;", SourceType::ts()).unwrap();
    assert_eq!(ast.program().body.len(), 1);
    assert_eq!(ast.source().as_str(), "const a: number = 1;");
  }

  #[test]
  fn reports_syntax_errors_with_location() {
    let err = EcmaCompiler::parse("src/handlers/broken.ts", "const a = ;\n", SourceType::ts()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("[PARSE_ERROR]"), "{message}");
    assert!(message.contains("src/handlers/broken.ts:1:"), "{message}");
  }

  #[test]
  fn minify_strips_whitespace() {
    let code = EcmaCompiler::minify(
      "\"use strict\";\nfunction handler(event) {\n  return { statusCode: 200, body: event };\n}\nmodule.exports = { handler };\n",
      SourceType::cjs(),
    )
    .unwrap();
    assert!(!code.contains("\n  "), "{code}");
    assert!(code.contains("handler"));
    assert!(code.contains("statusCode:200"), "{code}");
  }

  #[test]
  fn minify_rejects_invalid_input() {
    assert!(EcmaCompiler::minify("let = ;", SourceType::cjs()).is_err());
  }
}
