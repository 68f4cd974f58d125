use std::fmt;

/// One field of an exception rule.
///
/// Wildcards are a distinct variant rather than the string `"*"`, so a value
/// that is literally `*` can still be matched exactly.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldPattern {
    /// Matches any value, including a missing one.
    Any,
    /// Matches only a problem field the scanner left empty.
    Missing,
    /// Matches exactly this value (string equality).
    Exact(String),
}

impl FieldPattern {
    /// Config spelling of [`FieldPattern::Any`].
    pub const WILDCARD: &'static str = "*";
    /// Report spelling of [`FieldPattern::Missing`].
    pub const MISSING: &'static str = "<missing>";

    /// Interpret a config value: `"*"` is a wildcard, an omitted field only
    /// matches a missing value.
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            None => FieldPattern::Missing,
            Some(Self::WILDCARD) => FieldPattern::Any,
            Some(v) => FieldPattern::Exact(v.to_string()),
        }
    }

    /// The pattern that matches exactly this problem field.
    pub fn exact_for(value: Option<&str>) -> Self {
        match value {
            None => FieldPattern::Missing,
            Some(v) => FieldPattern::Exact(v.to_string()),
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (FieldPattern::Any, _) => true,
            (FieldPattern::Missing, None) => true,
            (FieldPattern::Exact(want), Some(have)) => want == have,
            _ => false,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, FieldPattern::Any)
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPattern::Any => f.write_str(Self::WILDCARD),
            FieldPattern::Missing => f.write_str(Self::MISSING),
            FieldPattern::Exact(v) => f.write_str(v),
        }
    }
}
