use crate::evaluation::catalog::Catalog;
use crate::evaluation::domain::{AssignmentId, QuestionId, RecordedResponse, ResponseId};
use crate::evaluation::scoring::{
    AnswerSheet, ScoreComponent, ScoringEngine, SelfLeadershipFactor, WeightTable,
};

const TOLERANCE: f64 = 1e-9;

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < TOLERANCE
}

fn weight_sum(table: &WeightTable, component: ScoreComponent) -> f64 {
    table
        .terms(component)
        .iter()
        .map(|term| term.weight)
        .sum()
}

#[test]
fn f1_is_the_weighted_sum_of_its_four_codes() {
    let sheet = AnswerSheet::new()
        .with("Auto_10", 5)
        .with("Auto_6", 4)
        .with("Auto_5", 3)
        .with("Auto_3", 2);

    let card = ScoringEngine::default().score(&sheet);

    assert!(close(card.f1, 2.4085), "F1 was {}", card.f1);
    assert_eq!(card.e1, card.f1);
    assert_eq!(card.f2, 0.0);
    assert_eq!(card.e2, 0.0);
    assert_eq!(card.e3, 0.0);
    assert!(close(card.overall_selfleadership, 0.3172 * 2.4085));
    assert_eq!(card.overall_performance_score, 0.0);
    assert_eq!(card.organizational_support_score, 0.0);
}

#[test]
fn empty_sheet_scores_zero_everywhere() {
    let card = ScoringEngine::default().score(&AnswerSheet::new());
    for component in ScoreComponent::ALL {
        assert_eq!(card.component(component), 0.0, "{}", component.label());
    }
    for factor in SelfLeadershipFactor::ALL {
        assert_eq!(card.factor(factor), 0.0);
    }
    assert_eq!(card.overall_selfleadership, 0.0);
    assert_eq!(card.overall_performance_score, 0.0);
}

#[test]
fn scoring_is_deterministic() {
    let catalog = Catalog::standard();
    let mut sheet = AnswerSheet::new();
    for (index, question) in catalog.questions().iter().enumerate() {
        sheet.record(&question.code, (index % 6) as u8);
    }

    let engine = ScoringEngine::default();
    let first = engine.score(&sheet);
    let second = engine.score(&sheet);
    assert_eq!(first, second);
    assert_eq!(first.overall_performance_score.to_bits(), second.overall_performance_score.to_bits());
}

#[test]
fn uniform_answers_scale_the_weight_sums() {
    let table = WeightTable::standard();
    let catalog = Catalog::standard();
    let mut sheet = AnswerSheet::new();
    for question in catalog.questions() {
        sheet.record(&question.code, 3);
    }

    let card = ScoringEngine::default().score(&sheet);

    for component in ScoreComponent::ALL {
        let expected = 3.0 * weight_sum(table, component);
        assert!(
            close(card.component(component), expected),
            "{} was {} expected {}",
            component.label(),
            card.component(component),
            expected
        );
    }

    for factor in SelfLeadershipFactor::ALL {
        let expected: f64 = table
            .members(factor)
            .iter()
            .map(|member| 3.0 * weight_sum(table, *member))
            .sum();
        assert!(close(card.factor(factor), expected), "{}", factor.label());
    }

    let expected_self_leadership: f64 = table
        .self_leadership_overall
        .iter()
        .map(|(factor, weight)| weight * card.factor(*factor))
        .sum();
    assert!(close(card.overall_selfleadership, expected_self_leadership));

    let expected_performance: f64 = table
        .performance_overall
        .iter()
        .map(|(component, weight)| weight * 3.0 * weight_sum(table, *component))
        .sum();
    assert!(close(card.overall_performance_score, expected_performance));
}

#[test]
fn factor_rollups_follow_the_hierarchy() {
    let table = WeightTable::standard();
    assert_eq!(
        table.members(SelfLeadershipFactor::E1),
        &[
            ScoreComponent::F1,
            ScoreComponent::F2,
            ScoreComponent::F3,
            ScoreComponent::F4,
            ScoreComponent::F5
        ]
    );
    assert_eq!(table.members(SelfLeadershipFactor::E2), &[ScoreComponent::F6]);
    assert_eq!(
        table.members(SelfLeadershipFactor::E3),
        &[ScoreComponent::F7, ScoreComponent::F8, ScoreComponent::F9]
    );
}

#[test]
fn standard_table_keeps_the_published_contextual_weight() {
    let table = WeightTable::standard();
    assert_eq!(table.version, "adap-2024.11");
    let des_5 = table
        .terms(ScoreComponent::D2)
        .iter()
        .find(|term| term.code == "Des_5")
        .expect("Des_5 weighted");
    assert_eq!(des_5.weight, 0.834);
    assert_eq!(table.terms(ScoreComponent::D2).len(), 8);
    assert_eq!(table.terms(ScoreComponent::OrganizationalSupport).len(), 6);
}

#[test]
fn answer_sheet_keeps_the_first_score_per_code() {
    let sheet = AnswerSheet::new().with("Apoyo_1", 4).with("Apoyo_1", 1);
    assert_eq!(sheet.score("Apoyo_1"), 4);
    assert_eq!(sheet.score("Apoyo_2"), 0);
    assert_eq!(sheet.len(), 1);
}

#[test]
fn answer_sheet_from_responses_skips_questions_outside_the_catalog() {
    let catalog = Catalog::standard();
    let known = catalog.question_by_code("Des_2").expect("known").id;
    let responses = vec![
        RecordedResponse {
            id: ResponseId(1),
            assignment_id: AssignmentId(1),
            question_id: known,
            score: 5,
        },
        RecordedResponse {
            id: ResponseId(2),
            assignment_id: AssignmentId(1),
            question_id: QuestionId(900),
            score: 3,
        },
    ];

    let sheet = AnswerSheet::from_responses(&responses, &catalog);
    assert_eq!(sheet.len(), 1);
    assert_eq!(sheet.score("Des_2"), 5);
}
