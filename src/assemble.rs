//! Final grammar layout.
//!
//! Order is fixed: root alternation, every function rule, every function's
//! params subtree (contiguous per function), float rules, then the primitive
//! fragment verbatim.
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::emit::{self, PRIMITIVE_TOKENS, Rule};
use crate::error::CompileError;
use crate::naming::RuleId;
use crate::precision::PrecisionRegistry;
use crate::schema::FunctionSpec;

pub const ROOT: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
}

/// Every id defined so far, with the body it was defined with.
/// `None` marks ids owned by the root rule or the primitive fragment.
struct RuleTable {
    bodies: HashMap<RuleId, Option<String>>,
}

impl RuleTable {
    fn new() -> Self {
        let bodies = std::iter::once(ROOT)
            .chain(PRIMITIVE_TOKENS)
            .map(|id| (RuleId::verbatim(id), None))
            .collect();
        Self { bodies }
    }

    /// `Ok(true)` if the rule is new, `Ok(false)` if an identical definition exists.
    fn admit(&mut self, rule: &Rule) -> Result<bool, CompileError> {
        match self.bodies.get(&rule.id) {
            None => {
                self.bodies.insert(rule.id.clone(), Some(rule.body.clone()));
                Ok(true)
            }
            Some(None) => Err(CompileError::ReservedRule { rule: rule.id.clone() }),
            Some(Some(body)) if *body == rule.body => Ok(false),
            Some(Some(body)) => Err(CompileError::RuleCollision {
                rule: rule.id.clone(),
                first: body.clone(),
                second: rule.body.clone(),
            }),
        }
    }
}

impl Grammar {
    pub fn compile(functions: &[FunctionSpec]) -> Result<Self, CompileError> {
        if functions.is_empty() {
            return Err(CompileError::NoFunctions);
        }
        let mut seen = HashSet::new();
        for function in functions {
            if !seen.insert(function.name()) {
                return Err(CompileError::DuplicateFunction(function.name().to_owned()));
            }
        }

        // 1) which precisions exist anywhere in the schema
        let mut registry = PrecisionRegistry::collect(functions);

        // 2) per-function rules, referencing `float-p` by name
        let compiled = functions
            .iter()
            .map(|f| emit::emit_function(f, &mut registry))
            .collect::<Vec<_>>();

        let root = Rule::new(
            RuleId::verbatim(ROOT),
            compiled.iter().map(|c| c.rule.id.as_str()).collect::<Vec<_>>().join(" | "),
        );

        // 3) float rules, once, from the collected set
        let floats = registry.rules();

        let ordered = compiled
            .iter()
            .map(|c| &c.rule)
            .chain(compiled.iter().flat_map(|c| c.params.iter()))
            .chain(floats.iter());

        let mut table = RuleTable::new();
        let mut rules = vec![root];
        for rule in ordered {
            if table.admit(rule)? {
                rules.push(rule.clone());
            } else {
                tracing::warn!(rule = %rule.id, "identical rule defined twice; keeping the first");
            }
        }

        tracing::debug!(
            functions = functions.len(),
            rules = rules.len(),
            precisions = registry.len(),
            "assembled grammar"
        );
        Ok(Self { rules })
    }

    /// Rules in document order, starting with `root`.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Generated rules only, separated by `\n`, no trailing separator.
    pub fn render(&self) -> String {
        self.rules.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
    }

    /// Generated rules followed by the primitive fragment, unmodified.
    pub fn render_with(&self, primitives: &str) -> String {
        let mut out = self.render();
        if !primitives.is_empty() {
            out.push('\n');
            out.push_str(primitives);
        }
        out
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
