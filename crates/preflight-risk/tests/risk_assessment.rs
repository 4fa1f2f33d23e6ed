use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use preflight_risk::assessment::{
    AnswerValue, ApproachType, BooleanField, Category, CategoryRegistry, ConfigurationError,
    FieldId, Questionnaire, ScoreChange, ScoringEngine, WeightRegistry,
};

fn illustrative_weights() -> WeightRegistry {
    BooleanField::ALL
        .into_iter()
        .fold(WeightRegistry::new(), |registry, field| {
            registry.with_flag(field, 0)
        })
        .with_flag(BooleanField::LessThan50InType, 2)
        .with_flag(BooleanField::AfterWork, 1)
        .with_flag(BooleanField::Mountainous, 3)
        .with_approach_weights([
            (ApproachType::NotApplicable, 0),
            (ApproachType::Precision, 0),
            (ApproachType::Nonprecision, 2),
            (ApproachType::Circling, 0),
            (ApproachType::NoApproach, 0),
        ])
}

#[test]
fn pilot_walkthrough_with_illustrative_weights() {
    let engine = ScoringEngine::new(&illustrative_weights(), CategoryRegistry::standard())
        .expect("illustrative weights are complete");
    let mut session = Questionnaire::new(Arc::new(engine));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    session.subscribe(move |change| sink.borrow_mut().push(*change));

    assert_eq!(session.total_score(), 0);

    session
        .set_answer_by_key("lessThan50InType", AnswerValue::Flag(true))
        .expect("known field");
    session
        .set_answer_by_key("afterWork", AnswerValue::Flag(true))
        .expect("known field");
    let scores = session.scores();
    assert_eq!(
        (scores.pilot, scores.airport, scores.environment, scores.external, scores.total),
        (3, 0, 0, 0, 3)
    );

    session.set_approach(ApproachType::Nonprecision);
    assert_eq!(session.scores().airport, 2);
    assert_eq!(session.scores().total, 5);

    session.set_flag(BooleanField::Mountainous, true);
    assert_eq!(session.scores().airport, 5);
    assert_eq!(session.scores().total, 8);

    let last = *seen.borrow().last().expect("notifications recorded");
    assert_eq!(
        last,
        ScoreChange {
            category: Category::Total,
            value: 8
        }
    );
}

#[test]
fn field_without_weight_is_a_startup_failure() {
    let weights = BooleanField::ALL
        .into_iter()
        .filter(|field| *field != BooleanField::RunwayObstacles)
        .fold(WeightRegistry::new(), |registry, field| {
            registry.with_flag(field, 1)
        })
        .with_approach_weights(ApproachType::ALL.into_iter().map(|variant| (variant, 0)));

    let error = ScoringEngine::new(&weights, CategoryRegistry::standard())
        .expect_err("missing weight must not default to zero");

    assert_eq!(
        error,
        ConfigurationError::MissingWeight(FieldId::Flag(BooleanField::RunwayObstacles))
    );
    assert!(error.to_string().contains("runwayObstacles"));
}

#[test]
fn stable_identifiers_round_trip_through_serde() {
    let field: BooleanField = serde_json::from_str("\"IFRCurrent\"").expect("deserializes");
    assert_eq!(field, BooleanField::IfrCurrent);
    assert_eq!(
        serde_json::to_string(&BooleanField::WetOrSoftFieldRunway).expect("serializes"),
        "\"wetOrSoftFieldRunway\""
    );
    let approach: ApproachType = serde_json::from_str("\"none\"").expect("deserializes");
    assert_eq!(approach, ApproachType::NoApproach);

    for field in BooleanField::ALL {
        let encoded = serde_json::to_string(&field).expect("serializes");
        assert_eq!(encoded, format!("\"{}\"", field.key()));
        assert_eq!(field.key().parse::<FieldId>(), Ok(FieldId::Flag(field)));
    }
}

#[test]
fn score_sheet_serializes_for_presentation_layers() {
    let mut session = Questionnaire::standard().expect("standard configuration");
    session.set_flag(BooleanField::Night, true);
    session.set_flag(BooleanField::VfrFlightFollowing, true);

    let json = serde_json::to_value(session.scores()).expect("serializes");
    assert_eq!(
        json,
        serde_json::json!({
            "pilot": 0,
            "airport": 0,
            "environment": 2,
            "external": -1,
            "total": 1
        })
    );
}
