// Strongly-typed schema model. Invalid shapes are rejected at construction.
use std::fmt;
use std::num::NonZeroU32;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::SchemaError;

/// Largest accepted float precision. A `fractional-part-N` rule spells out N digit tokens.
pub const MAX_PRECISION: u32 = 64;

static FUNCTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static function-name pattern"));
static FIELD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static field-name pattern"));

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Closed set of parameter kinds. Every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    String,
    Boolean,
    Integer,
    Float(Option<Precision>),
    Object(Fields),
    Array(Box<Parameter>),
    Enum(EnumValues),
}

/// Digits required after the decimal point, in `1..=MAX_PRECISION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Precision(NonZeroU32);

/// Non-empty, declaration-ordered object fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields(IndexMap<String, Parameter>);

/// Non-empty list of distinct enum literals, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValues(Vec<String>);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawParameter")]
pub struct Parameter {
    ty: ParamType,
    required: bool,
    description: Option<String>,
    /// Kind name as written in the source schema when it differs from `ty.label()`.
    #[serde(skip)]
    declared_as: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFunction")]
pub struct FunctionSpec {
    name: String,
    description: String,
    parameters: IndexMap<String, Parameter>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ParamType {
    /// Lowercase kind name, as used in documentation and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
            ParamType::Integer => "integer",
            ParamType::Float(_) => "float",
            ParamType::Object(_) => "object",
            ParamType::Array(_) => "array",
            ParamType::Enum(_) => "enum",
        }
    }
}

impl Precision {
    pub fn new(digits: u32) -> Result<Self, SchemaError> {
        if digits > MAX_PRECISION {
            return Err(SchemaError::PrecisionTooLarge { digits, max: MAX_PRECISION });
        }
        NonZeroU32::new(digits).map(Self).ok_or(SchemaError::ZeroPrecision)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Fields {
    pub fn new<I, K>(fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (K, Parameter)>,
        K: Into<String>,
    {
        let fields = collect_fields(fields)?;
        if fields.is_empty() {
            return Err(SchemaError::EmptyObject);
        }
        Ok(Self(fields))
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Parameter> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a Parameter);
    type IntoIter = indexmap::map::Iter<'a, String, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl EnumValues {
    pub fn new<I, S>(values: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if out.contains(&value) {
                return Err(SchemaError::DuplicateEnumValue(value));
            }
            out.push(value);
        }
        if out.is_empty() {
            return Err(SchemaError::EmptyEnum);
        }
        Ok(Self(out))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl Parameter {
    pub fn new(ty: ParamType) -> Self {
        Self { ty, required: true, description: None, declared_as: None }
    }

    pub fn string() -> Self {
        Self::new(ParamType::String)
    }

    pub fn boolean() -> Self {
        Self::new(ParamType::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(ParamType::Integer)
    }

    pub fn float(precision: Option<u32>) -> Result<Self, SchemaError> {
        let precision = precision.map(Precision::new).transpose()?;
        Ok(Self::new(ParamType::Float(precision)))
    }

    pub fn object<I, K>(fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (K, Parameter)>,
        K: Into<String>,
    {
        Ok(Self::new(ParamType::Object(Fields::new(fields)?)))
    }

    pub fn array(element: Parameter) -> Self {
        Self::new(ParamType::Array(Box::new(element)))
    }

    pub fn enumeration<I, S>(values: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(ParamType::Enum(EnumValues::new(values)?)))
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn optional(self) -> Self {
        self.required(false)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Kind name for documentation: `number` stays `number` even though it is an integer.
    pub fn type_label(&self) -> &'static str {
        self.declared_as.unwrap_or_else(|| self.ty.label())
    }
}

impl FunctionSpec {
    /// A function may declare no parameters at all; its params object is then `{}`.
    pub fn new<I, K>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: I,
    ) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (K, Parameter)>,
        K: Into<String>,
    {
        let name = name.into();
        if !FUNCTION_NAME.is_match(&name) {
            return Err(SchemaError::InvalidFunctionName(name));
        }
        Ok(Self {
            name,
            description: description.into(),
            parameters: collect_fields(parameters)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &IndexMap<String, Parameter> {
        &self.parameters
    }
}

// ————————————————————————————————————————————————————————————————————————————
// WIRE FORMAT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    String,
    Boolean,
    Integer,
    Number,
    Float,
    Object,
    Array,
    Enum,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParameter {
    #[serde(rename = "type")]
    kind: RawKind,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    precision: Option<u32>,
    #[serde(default)]
    structure: Option<IndexMap<String, Parameter>>,
    #[serde(default)]
    element_type: Option<Box<Parameter>>,
    #[serde(default, rename = "enum")]
    values: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFunction {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    parameters: IndexMap<String, Parameter>,
}

fn default_required() -> bool {
    true
}

impl RawKind {
    fn label(self) -> &'static str {
        match self {
            RawKind::String => "string",
            RawKind::Boolean => "boolean",
            RawKind::Integer => "integer",
            RawKind::Number => "number",
            RawKind::Float => "float",
            RawKind::Object => "object",
            RawKind::Array => "array",
            RawKind::Enum => "enum",
        }
    }
}

impl TryFrom<RawParameter> for Parameter {
    type Error = SchemaError;

    fn try_from(raw: RawParameter) -> Result<Self, Self::Error> {
        let RawParameter { kind, required, description, precision, structure, element_type, values } = raw;

        let unexpected = |attribute: &'static str| SchemaError::UnexpectedAttribute {
            kind: kind.label(),
            attribute,
        };
        if precision.is_some() && !matches!(kind, RawKind::Float) {
            return Err(unexpected("precision"));
        }
        if structure.is_some() && !matches!(kind, RawKind::Object) {
            return Err(unexpected("structure"));
        }
        if element_type.is_some() && !matches!(kind, RawKind::Array) {
            return Err(unexpected("element_type"));
        }
        if values.is_some() && !matches!(kind, RawKind::Enum) {
            return Err(unexpected("enum"));
        }

        let ty = match kind {
            RawKind::String => ParamType::String,
            RawKind::Boolean => ParamType::Boolean,
            RawKind::Integer | RawKind::Number => ParamType::Integer,
            RawKind::Float => ParamType::Float(precision.map(Precision::new).transpose()?),
            RawKind::Object => {
                let structure = structure.ok_or(SchemaError::MissingStructure)?;
                ParamType::Object(Fields::new(structure)?)
            }
            RawKind::Array => ParamType::Array(element_type.ok_or(SchemaError::MissingElementType)?),
            RawKind::Enum => {
                let values = values.ok_or(SchemaError::MissingEnumValues)?;
                ParamType::Enum(EnumValues::new(values)?)
            }
        };
        let declared_as = matches!(kind, RawKind::Number).then_some("number");
        Ok(Parameter { ty, required, description, declared_as })
    }
}

impl TryFrom<RawFunction> for FunctionSpec {
    type Error = SchemaError;

    fn try_from(raw: RawFunction) -> Result<Self, Self::Error> {
        FunctionSpec::new(raw.name, raw.description, raw.parameters)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn collect_fields<I, K>(fields: I) -> Result<IndexMap<String, Parameter>, SchemaError>
where
    I: IntoIterator<Item = (K, Parameter)>,
    K: Into<String>,
{
    let mut out = IndexMap::new();
    for (name, param) in fields {
        let name = name.into();
        if !FIELD_NAME.is_match(&name) {
            return Err(SchemaError::InvalidFieldName(name));
        }
        if out.contains_key(&name) {
            return Err(SchemaError::DuplicateField(name));
        }
        out.insert(name, param);
    }
    Ok(out)
}
