//! Compile typed function-call schemas into a constrained-decoding grammar
//! (GBNF-style rule notation) and matching plain-text documentation.
//!
//! Pipeline:
//! 1. build or deserialize [`FunctionSpec`]s (validated at construction);
//! 2. [`Grammar::compile`]: collect float precisions, emit per-function rules,
//!    emit shared float rules, check rule ids for collisions;
//! 3. [`Grammar::render_with`] appends the primitive token fragment;
//! 4. [`render_documentation`] walks the same schema for humans.
pub mod assemble;
pub mod cli;
pub mod docs;
pub mod emit;
pub mod error;
pub mod files;
pub mod jq_exec;
pub mod naming;
pub mod path_de;
pub mod precision;
pub mod schema;

use std::path::Path;

pub use assemble::Grammar;
pub use docs::render_documentation;
pub use emit::Rule;
pub use error::{CompileError, Error, Result, SchemaError};
pub use naming::RuleId;
pub use precision::PrecisionRegistry;
pub use schema::{EnumValues, Fields, FunctionSpec, ParamType, Parameter, Precision};

/// Default primitive fragment (`string`, `number`, `boolean`, `ws`).
pub const PRIMITIVE_GRAMMAR: &str = include_str!("primitive.gbnf");

/// Both output documents, computed in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    pub grammar: String,
    pub documentation: String,
}

pub fn compile(functions: &[FunctionSpec], primitives: &str) -> Result<Compilation> {
    let grammar = Grammar::compile(functions)?;
    Ok(Compilation {
        grammar: grammar.render_with(primitives),
        documentation: render_documentation(functions),
    })
}

impl Compilation {
    /// Write both documents. On failure the text is still available on `self`.
    pub fn write(&self, grammar_path: &Path, docs_path: &Path) -> Result<()> {
        files::write_document(grammar_path, &self.grammar)?;
        files::write_document(docs_path, &self.documentation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send_message() -> FunctionSpec {
        FunctionSpec::new(
            "send_message",
            "Sends a message to the User.",
            [("message", Parameter::string().describe("Message you want to send to the user."))],
        )
        .unwrap()
    }

    #[test]
    fn compile_produces_both_documents() {
        let out = compile(&[send_message()], PRIMITIVE_GRAMMAR).unwrap();
        assert!(out.grammar.starts_with("root ::= send-message\n"));
        assert!(out.grammar.ends_with(PRIMITIVE_GRAMMAR));
        assert!(out.documentation.contains("message (string, required): Message you want to send to the user."));
    }

    #[test]
    fn compile_failures_are_crate_errors() {
        let err = compile(&[], PRIMITIVE_GRAMMAR).unwrap_err();
        assert!(matches!(err, Error::Compile(CompileError::NoFunctions)));

        let err = compile(&[send_message(), send_message()], PRIMITIVE_GRAMMAR).unwrap_err();
        assert!(matches!(err, Error::Compile(CompileError::DuplicateFunction(name)) if name == "send_message"));
    }

    #[test]
    fn repeated_compilation_is_byte_identical() {
        let a = compile(&[send_message()], PRIMITIVE_GRAMMAR).unwrap();
        let b = compile(&[send_message()], PRIMITIVE_GRAMMAR).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bundled_primitives_define_every_token() {
        for token in emit::PRIMITIVE_TOKENS {
            assert!(
                PRIMITIVE_GRAMMAR.lines().any(|l| l.starts_with(&format!("{token} ::="))),
                "missing {token}"
            );
        }
    }

    #[test]
    fn failed_write_keeps_text() {
        let dir = tempfile::tempdir().unwrap();
        let out = compile(&[send_message()], "").unwrap();
        let err = out.write(dir.path(), &dir.path().join("docs.txt")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(out.grammar.contains("send-message-params"));
    }

    #[test]
    fn fixtures_match_snapshots() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let mut checked = 0;
        for entry in std::fs::read_dir(&root).unwrap() {
            let dir = entry.unwrap().path();
            let Ok(source) = std::fs::read_to_string(dir.join("schema.json")) else { continue };
            let functions = path_de::from_str_with_path::<Vec<FunctionSpec>>(&source).unwrap();

            let grammar = Grammar::compile(&functions).unwrap();
            let expected = std::fs::read_to_string(dir.join("expected.gbnf")).unwrap();
            assert_eq!(format!("{}\n", grammar.render()), expected, "{}", dir.display());

            let expected = std::fs::read_to_string(dir.join("expected.txt")).unwrap();
            assert_eq!(render_documentation(&functions), expected, "{}", dir.display());
            checked += 1;
        }
        assert!(checked >= 3);
    }

    #[test]
    fn writes_both_documents() {
        let dir = tempfile::tempdir().unwrap();
        let (g, d) = (dir.path().join("g.gbnf"), dir.path().join("docs/d.txt"));
        let out = compile(&[send_message()], PRIMITIVE_GRAMMAR).unwrap();
        out.write(&g, &d).unwrap();
        assert_eq!(std::fs::read_to_string(g).unwrap(), out.grammar);
        assert_eq!(std::fs::read_to_string(d).unwrap(), out.documentation);
    }
}
