use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::assessment::{
    Answers, ApproachType, BooleanField, Category, CategoryRegistry, FieldId, Questionnaire,
    ScoreChange, ScoringEngine, WeightRegistry,
};

pub(super) fn standard_engine() -> Arc<ScoringEngine> {
    Arc::new(ScoringEngine::standard().expect("standard configuration is complete"))
}

pub(super) fn standard_session() -> Questionnaire {
    Questionnaire::new(standard_engine())
}

/// Engine where the pilot category can only go negative, to exercise the
/// unfloored category scores.
pub(super) fn mitigation_heavy_engine() -> Arc<ScoringEngine> {
    let weights = WeightRegistry::standard()
        .with_flag(BooleanField::DualInLast90, -4)
        .with_flag(BooleanField::WingsInLast6Mo, -3);
    Arc::new(
        ScoringEngine::new(&weights, CategoryRegistry::standard())
            .expect("adjusted weights are complete"),
    )
}

/// Deterministic spread of answer combinations covering every field and
/// approach variant.
pub(super) fn answer_samples() -> Vec<Answers> {
    let mut samples = Vec::new();
    let mut mask: u32 = 0x2b_5a3c;

    for round in 0..48 {
        let approach = ApproachType::ALL[round % ApproachType::COUNT];
        let answers = BooleanField::ALL.into_iter().enumerate().fold(
            Answers::default().with_approach(approach),
            |answers, (bit, field)| answers.with_flag(field, mask & (1 << bit) != 0),
        );
        samples.push(answers);
        mask = mask.rotate_left(5) ^ 0x1f_3d29;
    }

    samples.push(Answers::default());
    samples.push(
        BooleanField::ALL
            .into_iter()
            .fold(Answers::default(), |answers, field| answers.with_flag(field, true)),
    );
    samples
}

/// Expected category score computed straight from a weight listing.
pub(super) fn expected_category_score(
    weights: &WeightRegistry,
    categories: &CategoryRegistry,
    category: Category,
    answers: &Answers,
) -> i32 {
    use crate::assessment::ScoringRule;

    let fields = categories.fields_of(category).expect("real category");
    let mut score = 0;
    for field in fields {
        if let (FieldId::Flag(flag), Some(ScoringRule::Boolean { weight })) =
            (*field, weights.rule(*field))
        {
            if answers.flag(flag) {
                score += weight;
            }
        }
    }

    if category == Category::Airport {
        if let Some(ScoringRule::Variant { weights }) = weights.rule(FieldId::ApproachType) {
            score += weights[&answers.approach()];
        }
    }
    score
}

pub(super) fn record_changes(session: &mut Questionnaire) -> Rc<RefCell<Vec<ScoreChange>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    session.subscribe(move |change| sink.borrow_mut().push(*change));
    log
}
