use std::collections::BTreeMap;

use super::weights::{ScoreComponent, SelfLeadershipFactor, Term, WeightTable};
use super::{AnswerSheet, ScoreCard};

/// Sums `score(code) * weight` in term order, starting from zero.
pub(crate) fn weighted_sum(terms: &[Term], sheet: &AnswerSheet) -> f64 {
    terms
        .iter()
        .fold(0.0, |total, term| total + f64::from(sheet.score(term.code)) * term.weight)
}

pub(crate) fn score_sheet(table: &WeightTable, sheet: &AnswerSheet) -> ScoreCard {
    let sub_factors: BTreeMap<ScoreComponent, f64> = ScoreComponent::ALL
        .iter()
        .map(|component| (*component, weighted_sum(table.terms(*component), sheet)))
        .collect();
    let sub_factor = |component: ScoreComponent| {
        sub_factors.get(&component).copied().unwrap_or(0.0)
    };

    let factor = |which: SelfLeadershipFactor| {
        table
            .members(which)
            .iter()
            .fold(0.0, |total, member| total + sub_factor(*member))
    };
    let e1 = factor(SelfLeadershipFactor::E1);
    let e2 = factor(SelfLeadershipFactor::E2);
    let e3 = factor(SelfLeadershipFactor::E3);

    let overall_selfleadership = table.self_leadership_overall.iter().fold(
        0.0,
        |total, (member, weight)| {
            let value = match member {
                SelfLeadershipFactor::E1 => e1,
                SelfLeadershipFactor::E2 => e2,
                SelfLeadershipFactor::E3 => e3,
            };
            total + value * weight
        },
    );

    let overall_performance_score = table
        .performance_overall
        .iter()
        .fold(0.0, |total, (member, weight)| total + sub_factor(*member) * weight);

    ScoreCard {
        f1: sub_factor(ScoreComponent::F1),
        f2: sub_factor(ScoreComponent::F2),
        f3: sub_factor(ScoreComponent::F3),
        f4: sub_factor(ScoreComponent::F4),
        f5: sub_factor(ScoreComponent::F5),
        e1,
        f6: sub_factor(ScoreComponent::F6),
        e2,
        f7: sub_factor(ScoreComponent::F7),
        f8: sub_factor(ScoreComponent::F8),
        f9: sub_factor(ScoreComponent::F9),
        e3,
        overall_selfleadership,
        d1: sub_factor(ScoreComponent::D1),
        d2: sub_factor(ScoreComponent::D2),
        d3: sub_factor(ScoreComponent::D3),
        overall_performance_score,
        organizational_support_score: sub_factor(ScoreComponent::OrganizationalSupport),
    }
}
