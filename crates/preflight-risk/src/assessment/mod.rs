//! Preflight risk assessment: answers, registries, scoring, and the session
//! that keeps category and total scores in step with the latest answers.

mod categories;
pub mod domain;
mod scoring;
mod session;
mod weights;

#[cfg(test)]
mod tests;

pub use categories::CategoryRegistry;
pub use domain::{
    AnswerValue, Answers, ApproachType, AssessmentError, BooleanField, Category,
    ConfigurationError, FieldId,
};
pub use scoring::{ScoreComponent, ScoringEngine};
pub use session::{Questionnaire, ScoreChange, ScoreSheet, SubscriptionId};
pub use weights::{ScoringRule, WeightRegistry, WeightTable};
