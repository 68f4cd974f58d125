//! Configured advisory exceptions and their per-run usage tracking.

use crate::pattern::FieldPattern;
use crate::problem::Problem;
use auditgate_types::ExceptionSummary;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use time::Date;

/// `(repository, package, advisory_id)` pattern identifying an exception.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleKey {
    pub repository: FieldPattern,
    pub package: FieldPattern,
    pub advisory_id: FieldPattern,
}

impl RuleKey {
    pub fn new(repository: FieldPattern, package: FieldPattern, advisory_id: FieldPattern) -> Self {
        Self {
            repository,
            package,
            advisory_id,
        }
    }

    /// The key that names `problem` verbatim.
    pub fn exact_for(problem: &Problem) -> Self {
        Self {
            repository: FieldPattern::Exact(problem.repository.clone()),
            package: FieldPattern::exact_for(problem.package.as_deref()),
            advisory_id: FieldPattern::exact_for(problem.advisory_id.as_deref()),
        }
    }

    /// Field-by-field match; each field is independent of the others.
    pub fn matches(&self, problem: &Problem) -> bool {
        self.repository.matches(Some(&problem.repository))
            && self.package.matches(problem.package.as_deref())
            && self.advisory_id.matches(problem.advisory_id.as_deref())
    }

    /// `("*", "*", "*")` skips every advisory in every repository.
    pub fn is_catch_all(&self) -> bool {
        self.repository.is_any() && self.package.is_any() && self.advisory_id.is_any()
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.repository, self.package, self.advisory_id
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionRule {
    pub key: RuleKey,
    pub expires: Date,
    pub reason: Option<String>,
}

impl ExceptionRule {
    pub fn new(key: RuleKey, expires: Date) -> Self {
        Self {
            key,
            expires,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// An exception expires at the start of its expiry date.
    pub fn is_expired(&self, today: Date) -> bool {
        self.expires <= today
    }

    pub fn summary(&self) -> ExceptionSummary {
        ExceptionSummary {
            repository: self.key.repository.to_string(),
            package: self.key.package.to_string(),
            advisory: self.key.advisory_id.to_string(),
            expires: self.expires,
            reason: self.reason.clone(),
        }
    }
}

/// The set of exceptions configured for one run.
///
/// Rules keep their configuration order, which is the order wildcard rules are
/// tried in. Every rule starts out unused; [`ExceptionRegistry::mark_used`]
/// drains it from the unused set.
///
/// The registry is mutated through `&mut` only, so usage tracking stays
/// confined to whichever thread owns it.
#[derive(Clone, Debug, Default)]
pub struct ExceptionRegistry {
    rules: Vec<ExceptionRule>,
    index: BTreeMap<RuleKey, usize>,
    unused: BTreeSet<usize>,
}

impl ExceptionRegistry {
    /// Build a registry. A repeated key replaces the earlier rule in place
    /// (last write wins, first position kept).
    pub fn configure<I: IntoIterator<Item = ExceptionRule>>(rules: I) -> Self {
        let mut registry = ExceptionRegistry::default();
        for rule in rules {
            match registry.index.get(&rule.key) {
                Some(&i) => registry.rules[i] = rule,
                None => {
                    registry
                        .index
                        .insert(rule.key.clone(), registry.rules.len());
                    registry.rules.push(rule);
                }
            }
        }
        registry.unused = (0..registry.rules.len()).collect();
        registry
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[ExceptionRule] {
        &self.rules
    }

    pub fn all_keys(&self) -> Vec<&RuleKey> {
        self.rules.iter().map(|r| &r.key).collect()
    }

    pub fn get(&self, key: &RuleKey) -> Option<&ExceptionRule> {
        self.index.get(key).map(|&i| &self.rules[i])
    }

    /// Idempotent. Unknown keys are ignored.
    pub fn mark_used(&mut self, key: &RuleKey) {
        if let Some(&i) = self.index.get(key) {
            self.unused.remove(&i);
        }
    }

    pub fn is_used(&self, key: &RuleKey) -> bool {
        self.index
            .get(key)
            .is_some_and(|i| !self.unused.contains(i))
    }

    /// Rules that have not matched any problem yet, in configuration order.
    pub fn unused(&self) -> Vec<&ExceptionRule> {
        self.unused.iter().map(|&i| &self.rules[i]).collect()
    }

    /// The rule that applies to `problem`, without recording usage.
    ///
    /// An exact key wins; otherwise the first matching rule in configuration order.
    pub fn find(&self, problem: &Problem) -> Option<&ExceptionRule> {
        if let Some(rule) = self.get(&RuleKey::exact_for(problem)) {
            return Some(rule);
        }
        self.rules.iter().find(|r| r.key.matches(problem))
    }

    /// Keep only rules that can apply to `repository`.
    ///
    /// Used when a run is restricted to one repository, so that exceptions for
    /// other repositories are not reported as unused.
    pub fn retain_repository(&mut self, repository: &str) {
        let kept: Vec<(ExceptionRule, bool)> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.key.repository.matches(Some(repository)))
            .map(|(i, r)| (r.clone(), self.unused.contains(&i)))
            .collect();

        let mut registry = ExceptionRegistry::configure(kept.iter().map(|(r, _)| r.clone()));
        for (rule, unused) in &kept {
            if !unused {
                registry.mark_used(&rule.key);
            }
        }
        *self = registry;
    }
}
