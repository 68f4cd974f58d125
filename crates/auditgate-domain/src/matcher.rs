//! Per-problem classification against the exception registry.

use crate::problem::Problem;
use crate::registry::{ExceptionRegistry, ExceptionRule, RuleKey};
use auditgate_types::format_iso_date;
use time::Date;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// No exception applies.
    Unmatched,
    /// An exception applies and has not expired.
    SkippedActive,
    /// An exception applies but expired on or before today. Still a failure.
    SkippedExpired,
}

impl Verdict {
    pub fn is_pass(self) -> bool {
        self == Verdict::SkippedActive
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub problem: Problem,
    pub verdict: Verdict,
    /// The rule that matched, if any.
    pub rule: Option<ExceptionRule>,
}

impl Classification {
    pub fn matched_key(&self) -> Option<&RuleKey> {
        self.rule.as_ref().map(|r| &r.key)
    }

    /// Operator-facing note for this outcome.
    pub fn note(&self) -> String {
        let label = self.problem.label();
        match (&self.verdict, &self.rule) {
            (Verdict::SkippedActive, Some(rule)) => format!(
                "{label} was skipped (exception expires {})",
                format_iso_date(rule.expires)
            ),
            (Verdict::SkippedExpired, Some(rule)) => format!(
                "skip for {label} has expired (expired {})",
                format_iso_date(rule.expires)
            ),
            _ => format!("{label} has no exception"),
        }
    }
}

/// Classify one problem and record usage of the rule that matched.
///
/// `today` is supplied by the caller; nothing here reads the clock.
pub fn classify(registry: &mut ExceptionRegistry, problem: &Problem, today: Date) -> Classification {
    let Some(rule) = registry.find(problem).cloned() else {
        return Classification {
            problem: problem.clone(),
            verdict: Verdict::Unmatched,
            rule: None,
        };
    };

    registry.mark_used(&rule.key);
    let verdict = if rule.is_expired(today) {
        Verdict::SkippedExpired
    } else {
        Verdict::SkippedActive
    };

    Classification {
        problem: problem.clone(),
        verdict,
        rule: Some(rule),
    }
}

pub fn classify_all<'a, I>(
    registry: &mut ExceptionRegistry,
    problems: I,
    today: Date,
) -> Vec<Classification>
where
    I: IntoIterator<Item = &'a Problem>,
{
    problems
        .into_iter()
        .map(|p| classify(registry, p, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::FieldPattern;
    use time::macros::date;

    fn key(repo: &str, pkg: &str, id: &str) -> RuleKey {
        RuleKey::new(
            FieldPattern::from_config(Some(repo)),
            FieldPattern::from_config(Some(pkg)),
            FieldPattern::from_config(Some(id)),
        )
    }

    fn chrono_registry() -> ExceptionRegistry {
        ExceptionRegistry::configure([ExceptionRule::new(
            key("*", "chrono", "RUSTSEC-2020-0159"),
            date!(2023 - 03 - 01),
        )])
    }

    #[test]
    fn exact_rule_with_future_expiry_is_active_and_used() {
        let exact = key("reponame", "chrono", "RUSTSEC-2020-0159");
        let mut reg =
            ExceptionRegistry::configure([ExceptionRule::new(exact.clone(), date!(2030 - 01 - 01))]);
        let p = Problem::new("reponame", Some("chrono"), Some("RUSTSEC-2020-0159"));

        let c = classify(&mut reg, &p, date!(2023 - 02 - 01));
        assert_eq!(c.verdict, Verdict::SkippedActive);
        assert_eq!(c.matched_key(), Some(&exact));
        assert!(reg.is_used(&exact));
    }

    #[test]
    fn no_rule_means_unmatched_and_nothing_used() {
        let mut reg = chrono_registry();
        let p = Problem::new("reponame", Some("libfoo"), Some("RUSTSEC-2099-0001"));

        let c = classify(&mut reg, &p, date!(2023 - 02 - 01));
        assert_eq!(c.verdict, Verdict::Unmatched);
        assert!(c.rule.is_none());
        assert_eq!(reg.unused().len(), 1);
    }

    #[test]
    fn exact_beats_catch_all() {
        let exact = key("reponame", "chrono", "RUSTSEC-2020-0159");
        let mut reg = ExceptionRegistry::configure([
            ExceptionRule::new(key("*", "*", "*"), date!(2030 - 01 - 01)),
            ExceptionRule::new(exact.clone(), date!(2030 - 01 - 01)),
        ]);
        let p = Problem::new("reponame", Some("chrono"), Some("RUSTSEC-2020-0159"));

        let c = classify(&mut reg, &p, date!(2023 - 02 - 01));
        assert_eq!(c.matched_key(), Some(&exact));
        assert!(reg.is_used(&exact));
        assert!(!reg.is_used(&key("*", "*", "*")));
    }

    #[test]
    fn expiry_on_today_is_expired() {
        let mut reg = chrono_registry();
        let p = Problem::new("reponame", Some("chrono"), Some("RUSTSEC-2020-0159"));
        let c = classify(&mut reg, &p, date!(2023 - 03 - 01));
        assert_eq!(c.verdict, Verdict::SkippedExpired);
        assert!(!c.verdict.is_pass());
    }

    #[test]
    fn shared_wildcard_rule_is_consumed_once() {
        let wildcard = key("*", "time", "*");
        let mut reg =
            ExceptionRegistry::configure([ExceptionRule::new(wildcard.clone(), date!(2030 - 01 - 01))]);
        let a = Problem::new("snare", Some("time"), Some("RUSTSEC-2020-0071"));
        let b = Problem::new("grmtools", Some("time"), Some("RUSTSEC-2020-0071"));

        let out = classify_all(&mut reg, [&a, &b], date!(2023 - 02 - 01));
        assert!(out.iter().all(|c| c.verdict == Verdict::SkippedActive));
        assert!(reg.unused().is_empty());
        assert!(reg.is_used(&wildcard));
    }

    #[test]
    fn each_match_compares_expiry_independently() {
        let mut reg = chrono_registry();
        let p = Problem::new("reponame", Some("chrono"), Some("RUSTSEC-2020-0159"));
        assert_eq!(
            classify(&mut reg, &p, date!(2023 - 04 - 01)).verdict,
            Verdict::SkippedExpired
        );
        assert_eq!(
            classify(&mut reg, &p, date!(2023 - 02 - 01)).verdict,
            Verdict::SkippedActive
        );
    }

    #[test]
    fn partial_wildcards_match_per_field() {
        let mut reg = ExceptionRegistry::configure([ExceptionRule::new(
            key("yksom", "*", "RUSTSEC-2020-0071"),
            date!(2030 - 01 - 01),
        )]);
        let today = date!(2023 - 02 - 01);
        let hit = Problem::new("yksom", Some("time"), Some("RUSTSEC-2020-0071"));
        let wrong_repo = Problem::new("snare", Some("time"), Some("RUSTSEC-2020-0071"));
        let wrong_id = Problem::new("yksom", Some("time"), Some("RUSTSEC-2020-0159"));

        assert_eq!(classify(&mut reg, &hit, today).verdict, Verdict::SkippedActive);
        assert_eq!(classify(&mut reg, &wrong_repo, today).verdict, Verdict::Unmatched);
        assert_eq!(classify(&mut reg, &wrong_id, today).verdict, Verdict::Unmatched);
    }

    #[test]
    fn unidentified_problem_does_not_match_concrete_fields() {
        let mut reg = chrono_registry();
        let c = classify(&mut reg, &Problem::unidentified("reponame"), date!(2023 - 02 - 01));
        assert_eq!(c.verdict, Verdict::Unmatched);
    }

    #[test]
    fn notes_distinguish_outcomes() {
        let mut reg = chrono_registry();
        let p = Problem::new("reponame", Some("chrono"), Some("RUSTSEC-2020-0159"));

        let active = classify(&mut reg, &p, date!(2023 - 02 - 01)).note();
        let expired = classify(&mut reg, &p, date!(2023 - 04 - 01)).note();
        let unmatched = classify(
            &mut reg,
            &Problem::new("reponame", Some("libfoo"), Some("RUSTSEC-2099-0001")),
            date!(2023 - 02 - 01),
        )
        .note();

        assert_eq!(
            active,
            "chrono/RUSTSEC-2020-0159 was skipped (exception expires 2023-03-01)"
        );
        assert_eq!(
            expired,
            "skip for chrono/RUSTSEC-2020-0159 has expired (expired 2023-03-01)"
        );
        assert_eq!(unmatched, "libfoo/RUSTSEC-2099-0001 has no exception");
    }
}
