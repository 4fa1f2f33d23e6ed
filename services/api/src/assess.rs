use crate::infra::replay_answers;
use clap::Args;
use preflight_risk::assessment::{
    BooleanField, Category, FieldId, Questionnaire, ScoringEngine, ScoringRule, WeightRegistry,
};
use preflight_risk::error::AppError;
use serde_json::json;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct AssessArgs {
    /// Risk factor answered "yes", by identifier (repeatable, e.g. --yes night)
    #[arg(long = "yes", value_name = "FIELD")]
    pub(crate) yes: Vec<String>,
    /// Planned instrument approach (precision, nonprecision, none, circling, notApplicable)
    #[arg(long, default_value = "notApplicable")]
    pub(crate) approach: String,
    /// List the contribution of every answered factor
    #[arg(long)]
    pub(crate) breakdown: bool,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct WeightsArgs {
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let engine = Arc::new(ScoringEngine::standard()?);
    let answers = args.yes.iter().map(|key| (key.as_str(), true));
    let session = replay_answers(&engine, answers, Some(args.approach.as_str()))?;

    if args.json {
        println!("{:#}", assessment_json(&session, args.breakdown));
    } else {
        render_assessment(&session, args.breakdown);
    }

    Ok(())
}

fn assessment_json(session: &Questionnaire, breakdown: bool) -> serde_json::Value {
    let mut body = json!({
        "scores": session.scores(),
        "ifrApproachType": session.approach(),
    });
    if breakdown {
        body["breakdown"] = json!(session.breakdown(Category::Total));
    }
    body
}

fn render_assessment(session: &Questionnaire, breakdown: bool) {
    println!("Preflight risk assessment");
    println!("Approach: {}", session.approach().label());

    println!("\nCategory scores");
    for category in Category::real() {
        println!(
            "- {}: {}",
            category.label(),
            session.category_score(category)
        );
    }
    println!("\nTotal risk score: {}", session.total_score());

    if breakdown {
        let components = session.breakdown(Category::Total);
        if components.is_empty() {
            println!("\nContributions: none");
        } else {
            println!("\nContributions");
            for component in components {
                println!(
                    "- [{}] {}: {:+}",
                    component.category.label(),
                    component.field,
                    component.weight
                );
            }
        }
    }
}

pub(crate) fn run_weights(args: WeightsArgs) -> Result<(), AppError> {
    let engine = ScoringEngine::standard()?;
    let registry = WeightRegistry::standard();

    if args.json {
        println!("{:#}", weights_json(&registry));
        return Ok(());
    }

    println!("Standard weight table");
    for category in Category::real() {
        println!("\n{}", category.label());
        let fields = engine
            .categories()
            .fields_of(category)
            .into_iter()
            .flatten();
        for field in fields {
            if let FieldId::Flag(flag) = field {
                println!(
                    "- {} ({}): {:+}",
                    flag.key(),
                    flag.label(),
                    engine.weights().flag_weight(*flag, true)
                );
            }
        }
        if category == Category::Airport {
            if let Some(ScoringRule::Variant { weights }) = registry.rule(FieldId::ApproachType) {
                for (approach, weight) in weights {
                    println!(
                        "- {}={} ({}): {:+}",
                        FieldId::APPROACH_TYPE_KEY,
                        approach.key(),
                        approach.label(),
                        weight
                    );
                }
            }
        }
    }

    let total_fields = BooleanField::ALL.len() + 1;
    println!("\n{total_fields} fields; total score is floored at zero");
    Ok(())
}

fn weights_json(registry: &WeightRegistry) -> serde_json::Value {
    let rules: serde_json::Map<String, serde_json::Value> = registry
        .rules()
        .map(|(field, rule)| (field.key().to_string(), json!(rule)))
        .collect();
    json!({ "rules": rules })
}
