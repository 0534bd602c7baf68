//! Shared fixed-precision float rules.
//!
//! Phase 1 ([`PrecisionRegistry::collect`]) walks every function, including
//! nested objects and array elements, and accumulates the set of precisions.
//! Phase 3 ([`PrecisionRegistry::rules`]) emits one `float-p` /
//! `fractional-part-p` pair per precision in ascending order, then a single
//! `integer-part` rule.
use std::collections::BTreeSet;

use crate::emit::Rule;
use crate::emit::literal::literal;
use crate::naming::RuleId;
use crate::schema::{FunctionSpec, ParamType, Parameter, Precision};

pub const INTEGER_PART: &str = "integer-part";
const DIGIT: &str = "[0-9]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecisionRegistry {
    precisions: BTreeSet<Precision>,
}

pub fn float_rule_id(precision: Precision) -> RuleId {
    RuleId::verbatim(format!("float-{precision}"))
}

pub fn fractional_rule_id(precision: Precision) -> RuleId {
    RuleId::verbatim(format!("fractional-part-{precision}"))
}

impl PrecisionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(functions: &[FunctionSpec]) -> Self {
        let mut registry = Self::new();
        for function in functions {
            for param in function.parameters().values() {
                registry.visit(param);
            }
        }
        tracing::debug!(precisions = ?registry.precisions, "collected float precisions");
        registry
    }

    fn visit(&mut self, param: &Parameter) {
        match param.ty() {
            ParamType::String
            | ParamType::Boolean
            | ParamType::Integer
            | ParamType::Float(None)
            | ParamType::Enum(_) => {}
            ParamType::Float(Some(precision)) => {
                self.precisions.insert(*precision);
            }
            ParamType::Object(fields) => {
                for (_, field) in fields {
                    self.visit(field);
                }
            }
            ParamType::Array(element) => self.visit(element),
        }
    }

    /// Record `precision` (idempotent) and return the rule id that refers to it.
    pub fn register(&mut self, precision: Precision) -> RuleId {
        self.precisions.insert(precision);
        float_rule_id(precision)
    }

    pub fn contains(&self, precision: Precision) -> bool {
        self.precisions.contains(&precision)
    }

    pub fn len(&self) -> usize {
        self.precisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precisions.is_empty()
    }

    /// Precisions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Precision> + '_ {
        self.precisions.iter().copied()
    }

    pub fn rules(&self) -> Vec<Rule> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut rules = Vec::with_capacity(self.len() * 2 + 1);
        for precision in self.iter() {
            let fractional = fractional_rule_id(precision);
            rules.push(Rule::new(
                float_rule_id(precision),
                format!("{INTEGER_PART} {} {fractional}", literal(".")),
            ));
            let digits = vec![DIGIT; precision.get() as usize];
            rules.push(Rule::new(fractional, digits.join(" ")));
        }
        rules.push(Rule::new(RuleId::verbatim(INTEGER_PART), format!("{DIGIT}+")));
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(digits: u32) -> Precision {
        Precision::new(digits).unwrap()
    }

    fn float(digits: u32) -> Parameter {
        Parameter::float(Some(digits)).unwrap()
    }

    #[test]
    fn register_is_idempotent() {
        let mut reg = PrecisionRegistry::new();
        assert_eq!(reg.register(p(3)), "float-3");
        assert_eq!(reg.register(p(3)), "float-3");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn collects_every_precision_in_one_object() {
        // Two precisions side by side plus one deeper: all three must be found.
        let reading = Parameter::object([
            ("lat", float(4)),
            ("lon", float(6)),
            ("meta", Parameter::object([("accuracy", float(1))]).unwrap()),
        ])
        .unwrap();
        let f = FunctionSpec::new("log_reading", "", [("reading", reading)]).unwrap();
        let reg = PrecisionRegistry::collect(&[f]);
        assert_eq!(reg.iter().map(Precision::get).collect::<Vec<_>>(), [1, 4, 6]);
    }

    #[test]
    fn collects_through_arrays_and_across_functions() {
        let samples = Parameter::array(
            Parameter::object([(
                "stats",
                Parameter::object([("mean", float(3))]).unwrap(),
            )])
            .unwrap(),
        );
        let a = FunctionSpec::new("a", "", [("x", float(3)), ("y", Parameter::float(None).unwrap())]).unwrap();
        let b = FunctionSpec::new("b", "", [("samples", samples)]).unwrap();
        let c = FunctionSpec::new("c", "", [("m", Parameter::array(float(2)))]).unwrap();

        let reg = PrecisionRegistry::collect(&[a, b, c]);
        assert_eq!(reg.iter().map(Precision::get).collect::<Vec<_>>(), [2, 3]);
    }

    #[test]
    fn rule_pairs_ascending_then_single_integer_part() {
        let mut reg = PrecisionRegistry::new();
        reg.register(p(5));
        reg.register(p(2));
        let text: Vec<String> = reg.rules().iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            [
                r#"float-2 ::= integer-part "." fractional-part-2"#,
                "fractional-part-2 ::= [0-9] [0-9]",
                r#"float-5 ::= integer-part "." fractional-part-5"#,
                "fractional-part-5 ::= [0-9] [0-9] [0-9] [0-9] [0-9]",
                "integer-part ::= [0-9]+",
            ]
        );
    }

    #[test]
    fn no_precisions_no_rules() {
        assert!(PrecisionRegistry::new().rules().is_empty());
    }
}
