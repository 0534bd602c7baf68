//! Error taxonomy: schema construction, grammar compilation, boundary I/O.
use std::path::PathBuf;

use crate::naming::RuleId;

/// Invariant violations caught while a schema is being built.
///
/// These never surface during emission: a `Parameter` or `FunctionSpec` that
/// exists has already passed every check below.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid function name `{0}`: expected letters, digits and underscores")]
    InvalidFunctionName(String),
    #[error("invalid field name `{0}`: expected letters, digits, `_` or `-`")]
    InvalidFieldName(String),
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),
    #[error("object parameter has no fields")]
    EmptyObject,
    #[error("enum parameter has no values")]
    EmptyEnum,
    #[error("enum value `{0}` is listed more than once")]
    DuplicateEnumValue(String),
    #[error("float precision must be a positive integer")]
    ZeroPrecision,
    #[error("float precision {digits} is too large: at most {max} decimal places are supported")]
    PrecisionTooLarge { digits: u32, max: u32 },
    #[error("object parameter is missing its `structure`")]
    MissingStructure,
    #[error("array parameter is missing its `element_type`")]
    MissingElementType,
    #[error("enum parameter is missing its `enum` values")]
    MissingEnumValues,
    #[error("`{attribute}` is not allowed on a {kind} parameter")]
    UnexpectedAttribute { kind: &'static str, attribute: &'static str },
}

/// Whole-schema failures found while assembling the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("cannot build a grammar without any functions")]
    NoFunctions,
    #[error("function `{0}` is declared more than once")]
    DuplicateFunction(String),
    #[error("rule `{rule}` is reserved for the root rule or the primitive grammar")]
    ReservedRule { rule: RuleId },
    #[error("rule `{rule}` is defined twice with conflicting bodies: `{first}` vs `{second}`")]
    RuleCollision {
        rule: RuleId,
        first: String,
        second: String,
    },
}

/// Failures at the crate boundary. Schema problems found while reading a file
/// surface as `Parse`, since they carry the file and JSON path.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("failed to {op} {}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse schema {}: at JSON path {json_path} → {message}", .path.display())]
    Parse {
        path: PathBuf,
        json_path: String,
        message: String,
    },
}

impl Error {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { op, path: path.into(), source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
