//! Option recommendation.
//!
//! Ranks the options available in the current period with a fixed cascade:
//! high-priority rule match, then gradient score, then impact, then the
//! pros/cons balance. Pure and deterministic; ties keep authored order.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::foundation::RuleId;

use super::{gradient_score, DayPeriod, DecisionOption, DecisionRule};

/// The chosen option and why it won.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub option: DecisionOption,
    pub score: f64,
    /// True when the option matched at least one rule with priority >= 8.
    pub high_priority_match: bool,
    /// High-priority rules the option matched.
    pub matched_rule_ids: Vec<RuleId>,
    pub period: DayPeriod,
    /// Number of options available in `period`.
    pub candidates: usize,
}

/// Active rules whose category is empty or one of `categories`.
pub fn active_rules<'a>(rules: &'a [DecisionRule], categories: &[String]) -> Vec<&'a DecisionRule> {
    rules
        .iter()
        .filter(|rule| rule.active && rule.applies_to_any(categories))
        .collect()
}

/// Picks the best option for `period`, or `None` when no option is available.
pub fn recommend(
    options: &[DecisionOption],
    rules: &[DecisionRule],
    period: DayPeriod,
) -> Option<Recommendation> {
    let candidates: Vec<&DecisionOption> = options
        .iter()
        .filter(|option| option.effective_time_of_day().matches(period))
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let mut categories: Vec<String> = Vec::new();
    for option in &candidates {
        for category in option.category_list() {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
    }

    let high_priority: Vec<&DecisionRule> = active_rules(rules, &categories)
        .into_iter()
        .filter(|rule| rule.is_high_priority())
        .collect();

    let mut ranked: Vec<Ranked<'_>> = candidates
        .iter()
        .copied()
        .map(|option| {
            let matched: Vec<&DecisionRule> = high_priority
                .iter()
                .copied()
                .filter(|rule| rule.matches_option(option, period))
                .collect();
            Ranked {
                option,
                score: gradient_score(option),
                matched,
            }
        })
        .collect();

    ranked.sort_by(compare);

    let total = ranked.len();
    ranked.into_iter().next().map(|best| Recommendation {
        option: best.option.clone(),
        score: best.score,
        high_priority_match: !best.matched.is_empty(),
        matched_rule_ids: best.matched.iter().map(|rule| rule.id.clone()).collect(),
        period,
        candidates: total,
    })
}

struct Ranked<'a> {
    option: &'a DecisionOption,
    score: f64,
    matched: Vec<&'a DecisionRule>,
}

/// Orders better options first.
fn compare(a: &Ranked<'_>, b: &Ranked<'_>) -> Ordering {
    let a_rule = !a.matched.is_empty();
    let b_rule = !b.matched.is_empty();

    b_rule
        .cmp(&a_rule)
        .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
        .then_with(|| b.option.impact.rank().cmp(&a.option.impact.rank()))
        .then_with(|| {
            b.option
                .pros_cons_balance()
                .cmp(&a.option.pros_cons_balance())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decision::{GradientFactors, Impact, NewOption, NewRule, TimeOfDay};

    fn option(title: &str) -> NewOption {
        NewOption {
            title: title.to_string(),
            impact: Impact::Medium,
            ..Default::default()
        }
    }

    fn build(new: NewOption) -> DecisionOption {
        DecisionOption::from_new(new)
    }

    fn rule(priority: u8, time_of_day: TimeOfDay, category: &str) -> DecisionRule {
        DecisionRule::create(NewRule {
            title: format!("rule p{}", priority),
            description: String::new(),
            priority,
            time_of_day,
            category: category.to_string(),
            active: true,
        })
        .unwrap()
    }

    #[test]
    fn no_options_yields_none() {
        assert!(recommend(&[], &[], DayPeriod::Day).is_none());
    }

    #[test]
    fn options_for_other_periods_are_excluded() {
        let night_only = build(NewOption {
            time_of_day: Some(TimeOfDay::Night),
            ..option("Cinema")
        });

        assert!(recommend(&[night_only], &[], DayPeriod::Day).is_none());
    }

    #[test]
    fn higher_gradient_score_wins_without_rules() {
        let low = build(NewOption {
            gradient_factors: Some(GradientFactors::uniform(3.0)),
            ..option("Low")
        });
        let high = build(NewOption {
            gradient_factors: Some(GradientFactors::uniform(6.0)),
            ..option("High")
        });

        let rec = recommend(&[low, high], &[], DayPeriod::Day).unwrap();
        assert_eq!(rec.option.title, "High");
        assert_eq!(rec.score, 6.0);
        assert!(!rec.high_priority_match);
        assert_eq!(rec.candidates, 2);
    }

    #[test]
    fn high_priority_rule_beats_higher_score() {
        let matching = build(NewOption {
            categories: Some(vec!["saude".to_string()]),
            gradient_factors: Some(GradientFactors::uniform(2.0)),
            ..option("Matches rule")
        });
        let better_score = build(NewOption {
            gradient_factors: Some(GradientFactors::uniform(9.5)),
            ..option("Better score")
        });
        let rules = vec![rule(9, TimeOfDay::Day, "saude")];

        let rec = recommend(&[better_score, matching], &rules, DayPeriod::Day).unwrap();
        assert_eq!(rec.option.title, "Matches rule");
        assert!(rec.high_priority_match);
        assert_eq!(rec.matched_rule_ids, vec![rules[0].id.clone()]);
    }

    #[test]
    fn low_priority_rules_do_not_reorder() {
        let matching = build(NewOption {
            categories: Some(vec!["saude".to_string()]),
            gradient_factors: Some(GradientFactors::uniform(2.0)),
            ..option("Matches rule")
        });
        let better_score = build(NewOption {
            gradient_factors: Some(GradientFactors::uniform(9.0)),
            ..option("Better score")
        });
        let rules = vec![rule(7, TimeOfDay::Any, "saude")];

        let rec = recommend(&[matching, better_score], &rules, DayPeriod::Day).unwrap();
        assert_eq!(rec.option.title, "Better score");
    }

    #[test]
    fn rule_for_another_period_does_not_match() {
        let matching = build(NewOption {
            categories: Some(vec!["saude".to_string()]),
            gradient_factors: Some(GradientFactors::uniform(2.0)),
            ..option("Category only")
        });
        let better_score = build(NewOption {
            gradient_factors: Some(GradientFactors::uniform(9.0)),
            ..option("Better score")
        });
        let rules = vec![rule(10, TimeOfDay::Night, "saude")];

        let rec = recommend(&[matching, better_score], &rules, DayPeriod::Day).unwrap();
        assert_eq!(rec.option.title, "Better score");
    }

    #[test]
    fn inactive_rules_are_ignored() {
        let matching = build(NewOption {
            categories: Some(vec!["saude".to_string()]),
            ..option("Category only")
        });
        let better_score = build(NewOption {
            gradient_factors: Some(GradientFactors::uniform(1.0)),
            ..option("Better score")
        });
        let mut inactive = rule(10, TimeOfDay::Any, "saude");
        inactive.active = false;

        let rec = recommend(&[matching, better_score], &[inactive], DayPeriod::Day).unwrap();
        assert_eq!(rec.option.title, "Better score");
    }

    #[test]
    fn uncategorized_high_priority_rule_matches_every_option() {
        let a = build(NewOption {
            gradient_factors: Some(GradientFactors::uniform(4.0)),
            ..option("A")
        });
        let b = build(NewOption {
            gradient_factors: Some(GradientFactors::uniform(5.0)),
            ..option("B")
        });
        let rules = vec![rule(8, TimeOfDay::Any, "")];

        let rec = recommend(&[a, b], &rules, DayPeriod::Dawn).unwrap();
        assert_eq!(rec.option.title, "B");
        assert!(rec.high_priority_match);
    }

    #[test]
    fn impact_breaks_score_ties() {
        let low = build(NewOption {
            impact: Impact::Low,
            ..option("Low impact")
        });
        let high = build(NewOption {
            impact: Impact::High,
            ..option("High impact")
        });
        let unknown = build(NewOption {
            impact: Impact::Unknown("critical".to_string()),
            ..option("Unknown impact")
        });

        let rec = recommend(&[unknown, low, high], &[], DayPeriod::Night).unwrap();
        assert_eq!(rec.option.title, "High impact");
    }

    #[test]
    fn pros_minus_cons_breaks_remaining_ties() {
        let favourable = build(NewOption {
            pros: vec!["a".into(), "b".into()],
            cons: vec![],
            gradient_factors: Some(GradientFactors::uniform(5.0)),
            ..option("Favourable")
        });
        let unfavourable = build(NewOption {
            pros: vec!["a".into()],
            cons: vec!["x".into(), "y".into()],
            gradient_factors: Some(GradientFactors::uniform(5.0)),
            ..option("Unfavourable")
        });

        let rec = recommend(&[unfavourable, favourable], &[], DayPeriod::Day).unwrap();
        assert_eq!(rec.option.title, "Favourable");
    }

    #[test]
    fn full_ties_keep_authored_order() {
        let first = build(option("First"));
        let second = build(option("Second"));

        let rec = recommend(&[first, second], &[], DayPeriod::Day).unwrap();
        assert_eq!(rec.option.title, "First");
    }

    #[test]
    fn active_rules_filters_by_category_union() {
        let rules = vec![
            rule(5, TimeOfDay::Any, ""),
            rule(5, TimeOfDay::Any, "saude"),
            rule(5, TimeOfDay::Any, "trabalho"),
        ];

        let applicable = active_rules(&rules, &["saude".to_string()]);
        assert_eq!(applicable.len(), 2);
        assert!(applicable.iter().all(|r| r.category != "trabalho"));
    }
}
