//! Recursive rule emission.
//!
//! Walks one parameter tree and produces the text that references it plus
//! every rule it needs. Object fields are visited depth-first in declaration
//! order; a rule is always followed by the rules it references.
//!
//! Fixed-precision floats are only *referenced* here (`float-3`). Their rule
//! text is produced once per precision by [`PrecisionRegistry::rules`].
pub mod literal;

use std::fmt;

use crate::naming::RuleId;
use crate::precision::PrecisionRegistry;
use crate::schema::{EnumValues, FunctionSpec, ParamType, Parameter};

use literal::{function_name, json_string, literal, object_key};

// Primitive tokens defined by the external primitive grammar.
pub const STRING_TOKEN: &str = "string";
pub const NUMBER_TOKEN: &str = "number";
pub const BOOLEAN_TOKEN: &str = "boolean";
pub const WS: &str = "ws";

pub const PRIMITIVE_TOKENS: [&str; 4] = [STRING_TOKEN, NUMBER_TOKEN, BOOLEAN_TOKEN, WS];

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// One production: `id ::= body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    pub body: String,
}

/// What a parameter compiles to: the text used where it appears, and the
/// rules that text depends on (in reference order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub reference: String,
    pub rules: Vec<Rule>,
}

/// Rules for one function: the call-shape rule and its params subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRules {
    pub rule: Rule,
    pub params: Vec<Rule>,
}

/// Space-separated sequence, joined once at the end.
#[derive(Default)]
struct Seq(Vec<String>);

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Rule {
    pub fn new(id: RuleId, body: impl Into<String>) -> Self {
        Self { id, body: body.into() }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ::= {}", self.id, self.body)
    }
}

impl Seq {
    fn push(&mut self, token: impl Into<String>) -> &mut Self {
        self.0.push(token.into());
        self
    }

    fn finish(self) -> String {
        self.0.join(" ")
    }
}

pub fn emit(rule_id: &RuleId, param: &Parameter, registry: &mut PrecisionRegistry) -> Emitted {
    let mut rules = Vec::new();
    let reference = emit_into(rule_id, param.ty(), registry, &mut rules);
    Emitted { reference, rules }
}

/// Compile a whole function: the two-key call object and its params object.
pub fn emit_function(function: &FunctionSpec, registry: &mut PrecisionRegistry) -> FunctionRules {
    let id = RuleId::function(function.name());
    let params_id = id.params();

    let mut params = Vec::new();
    emit_object(&params_id, function.parameters(), registry, &mut params);

    let mut body = Seq::default();
    body.push(literal("{"))
        .push(WS)
        .push(object_key("function"))
        .push(WS)
        .push(function_name(function.name()))
        .push(WS)
        .push(object_key("params"))
        .push(WS)
        .push(params_id.as_str())
        .push(literal("}"));

    tracing::debug!(function = function.name(), rules = params.len() + 1, "emitted function rules");
    FunctionRules { rule: Rule::new(id, body.finish()), params }
}

fn emit_into(
    rule_id: &RuleId,
    ty: &ParamType,
    registry: &mut PrecisionRegistry,
    out: &mut Vec<Rule>,
) -> String {
    match ty {
        ParamType::String => STRING_TOKEN.to_owned(),
        ParamType::Boolean => BOOLEAN_TOKEN.to_owned(),
        ParamType::Integer | ParamType::Float(None) => NUMBER_TOKEN.to_owned(),
        ParamType::Float(Some(precision)) => registry.register(*precision).to_string(),
        ParamType::Enum(values) => {
            out.push(Rule::new(rule_id.clone(), enum_body(values)));
            rule_id.to_string()
        }
        ParamType::Object(fields) => {
            emit_object(rule_id, fields, registry, out);
            rule_id.to_string()
        }
        ParamType::Array(element) => {
            let mut nested = Vec::new();
            let item = emit_into(&rule_id.element(), element.ty(), registry, &mut nested);
            out.push(Rule::new(rule_id.clone(), array_body(&item)));
            out.append(&mut nested);
            rule_id.to_string()
        }
    }
}

fn emit_object<'a, I>(rule_id: &RuleId, fields: I, registry: &mut PrecisionRegistry, out: &mut Vec<Rule>)
where
    I: IntoIterator<Item = (&'a String, &'a Parameter)>,
{
    let mut nested = Vec::new();
    let mut body = Seq::default();
    body.push(literal("{")).push(WS);

    let mut empty = true;
    for (i, (name, param)) in fields.into_iter().enumerate() {
        if i > 0 {
            body.push(literal(",")).push(WS);
        }
        let reference = emit_into(&rule_id.child(name), param.ty(), registry, &mut nested);
        body.push(object_key(name)).push(WS).push(reference);
        empty = false;
    }

    if !empty {
        body.push(WS);
    }
    body.push(literal("}"));

    out.push(Rule::new(rule_id.clone(), body.finish()));
    out.append(&mut nested);
}

fn enum_body(values: &EnumValues) -> String {
    values.iter().map(|v| json_string(v)).collect::<Vec<_>>().join(" | ")
}

fn array_body(item: &str) -> String {
    format!(
        "{open} {WS} ( {item} ({comma} {WS} {item})* )? {WS} {close}",
        open = literal("["),
        comma = literal(","),
        close = literal("]"),
    )
}
