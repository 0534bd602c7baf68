//! Deterministic rule identifiers derived from schema paths.
//!
//! A path segment is normalized by mapping `_` to `-` and lowercasing; the
//! segments are then joined with `-`. No counters, no hashing: the same path
//! always yields the same id, which keeps repeated compilations byte-identical.
use std::fmt;

/// Suffix of the rule holding a function's parameter object.
pub const PARAMS_SUFFIX: &str = "params";
/// Suffix of the rule describing each element of an array.
pub const ELEMENT_SUFFIX: &str = "element";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(String);

pub fn normalize(segment: &str) -> String {
    segment.replace('_', "-").to_lowercase()
}

impl RuleId {
    /// Build an id from raw (un-normalized) path segments.
    pub fn from_path<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let parts = segments
            .into_iter()
            .map(|s| normalize(s.as_ref()))
            .collect::<Vec<_>>();
        Self(parts.join("-"))
    }

    /// Ids that are fixed by the grammar layout rather than by the schema
    /// (`root`, `float-3`, primitive tokens, ...).
    pub fn verbatim(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn function(name: &str) -> Self {
        Self::from_path([name])
    }

    pub fn params(&self) -> Self {
        Self(format!("{}-{PARAMS_SUFFIX}", self.0))
    }

    pub fn child(&self, field: &str) -> Self {
        Self(format!("{}-{}", self.0, normalize(field)))
    }

    pub fn element(&self) -> Self {
        Self(format!("{}-{ELEMENT_SUFFIX}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for RuleId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RuleId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
