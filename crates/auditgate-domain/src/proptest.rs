//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - exact-over-wildcard precedence
//! - single-rule consumption per classification
//! - expiry boundaries
//! - findings ordering determinism

use crate::aggregate::AuditAggregator;
use crate::matcher::{Verdict, classify};
use crate::pattern::FieldPattern;
use crate::problem::Problem;
use crate::registry::{ExceptionRegistry, ExceptionRule, RuleKey};
use crate::report::{ReportPolicy, build_report, compare_findings};
use auditgate_types::RepoId;
use proptest::prelude::*;
use time::{Date, Duration};
use time::macros::date;

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

/// Small alphabets so generated rules and problems actually collide.
fn arb_repo() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["yksom", "grmtools", "snare", "ykcbf"]).prop_map(str::to_string)
}

fn arb_package() -> impl Strategy<Value = Option<String>> {
    prop::option::weighted(
        0.85,
        prop::sample::select(vec!["chrono", "time", "ansi_term", "*"]).prop_map(str::to_string),
    )
}

fn arb_advisory() -> impl Strategy<Value = Option<String>> {
    prop::option::weighted(
        0.85,
        prop::sample::select(vec![
            "RUSTSEC-2020-0159",
            "RUSTSEC-2020-0071",
            "RUSTSEC-2021-0139",
        ])
        .prop_map(str::to_string),
    )
}

fn arb_problem() -> impl Strategy<Value = Problem> {
    (arb_repo(), arb_package(), arb_advisory()).prop_map(|(r, p, a)| Problem {
        repository: r,
        package: p,
        advisory_id: a,
    })
}

fn arb_pattern(values: Vec<&'static str>) -> impl Strategy<Value = FieldPattern> {
    prop_oneof![
        2 => Just(FieldPattern::Any),
        1 => Just(FieldPattern::Missing),
        4 => prop::sample::select(values).prop_map(|v| FieldPattern::Exact(v.to_string())),
    ]
}

fn arb_key() -> impl Strategy<Value = RuleKey> {
    (
        arb_pattern(vec!["yksom", "grmtools", "snare", "ykcbf"]),
        arb_pattern(vec!["chrono", "time", "ansi_term"]),
        arb_pattern(vec!["RUSTSEC-2020-0159", "RUSTSEC-2020-0071", "RUSTSEC-2021-0139"]),
    )
        .prop_map(|(r, p, a)| RuleKey::new(r, p, a))
}

fn arb_date() -> impl Strategy<Value = Date> {
    (0i64..60).prop_map(|d| date!(2023 - 01 - 01) + Duration::days(d))
}

fn arb_rule() -> impl Strategy<Value = ExceptionRule> {
    (arb_key(), arb_date()).prop_map(|(k, d)| ExceptionRule::new(k, d))
}

fn arb_rules() -> impl Strategy<Value = Vec<ExceptionRule>> {
    prop::collection::vec(arb_rule(), 0..12)
}

// ============================================================================
// Matcher invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn exact_rule_wins_wherever_it_is_configured(
        rules in arb_rules(),
        problem in arb_problem(),
        position in 0usize..13,
        today in arb_date(),
    ) {
        let exact = RuleKey::exact_for(&problem);
        let mut all: Vec<ExceptionRule> = rules.into_iter().filter(|r| r.key != exact).collect();
        let at = position.min(all.len());
        all.insert(at, ExceptionRule::new(exact.clone(), date!(2030 - 01 - 01)));

        let mut registry = ExceptionRegistry::configure(all);
        let c = classify(&mut registry, &problem, today);

        prop_assert_eq!(c.matched_key(), Some(&exact));
        prop_assert_eq!(c.verdict, Verdict::SkippedActive);
        prop_assert!(registry.is_used(&exact));
    }

    #[test]
    fn classification_consumes_at_most_one_rule(
        rules in arb_rules(),
        problem in arb_problem(),
        today in arb_date(),
    ) {
        let mut registry = ExceptionRegistry::configure(rules);
        let before = registry.unused().len();
        let c = classify(&mut registry, &problem, today);
        let after = registry.unused().len();

        match c.verdict {
            Verdict::Unmatched => prop_assert_eq!(before, after),
            _ => prop_assert!(before - after <= 1),
        }
    }

    #[test]
    fn matched_rule_really_matches(
        rules in arb_rules(),
        problem in arb_problem(),
        today in arb_date(),
    ) {
        let mut registry = ExceptionRegistry::configure(rules.clone());
        let c = classify(&mut registry, &problem, today);

        match &c.rule {
            Some(rule) => prop_assert!(rule.key.matches(&problem)),
            None => prop_assert!(rules.iter().all(|r| !r.key.matches(&problem))),
        }
    }

    #[test]
    fn verdict_follows_expiry(
        rules in arb_rules(),
        problem in arb_problem(),
        today in arb_date(),
    ) {
        let mut registry = ExceptionRegistry::configure(rules);
        let c = classify(&mut registry, &problem, today);

        match (&c.rule, c.verdict) {
            (None, v) => prop_assert_eq!(v, Verdict::Unmatched),
            (Some(rule), Verdict::SkippedExpired) => prop_assert!(rule.expires <= today),
            (Some(rule), Verdict::SkippedActive) => prop_assert!(rule.expires > today),
            (Some(_), Verdict::Unmatched) => prop_assert!(false, "matched rule reported as unmatched"),
        }
    }

    #[test]
    fn unused_is_exactly_the_rules_nothing_matched(
        rules in arb_rules(),
        problems in prop::collection::vec(arb_problem(), 0..20),
        today in arb_date(),
    ) {
        let mut registry = ExceptionRegistry::configure(rules);
        let mut matched = Vec::new();
        for p in &problems {
            if let Some(k) = classify(&mut registry, p, today).matched_key() {
                matched.push(k.clone());
            }
        }
        for rule in registry.rules() {
            prop_assert_eq!(registry.is_used(&rule.key), matched.contains(&rule.key));
        }
    }
}

// ============================================================================
// Report invariants
// ============================================================================

proptest! {
    #[test]
    fn findings_are_sorted_and_independent_of_record_order(
        rules in arb_rules(),
        problems in prop::collection::vec(arb_problem(), 0..20),
        today in arb_date(),
    ) {
        let run = |order: &[Problem]| {
            let mut registry = ExceptionRegistry::configure(rules.clone());
            let mut agg = AuditAggregator::new();
            for p in order {
                let c = classify(&mut registry, p, today);
                agg.record_classified(&RepoId::new("softdevteam", &p.repository), vec![c]);
            }
            build_report(&agg.finish(&registry), ReportPolicy::default())
        };

        let forward = run(&problems[..]);
        let mut reversed = problems.clone();
        reversed.reverse();
        let backward = run(&reversed[..]);

        for pair in forward.findings.windows(2) {
            prop_assert_ne!(compare_findings(&pair[0], &pair[1]), std::cmp::Ordering::Greater);
        }
        prop_assert_eq!(forward.verdict, backward.verdict);
        prop_assert_eq!(forward.findings.len(), backward.findings.len());
    }
}
