use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::domain::{
    AnswerValue, Answers, ApproachType, AssessmentError, BooleanField, Category,
    ConfigurationError, FieldId,
};
use super::scoring::{ScoreComponent, ScoringEngine};

/// Derived scores for one assessment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreSheet {
    pub pilot: i32,
    pub airport: i32,
    pub environment: i32,
    pub external: i32,
    pub total: i32,
}

impl ScoreSheet {
    pub fn get(&self, category: Category) -> i32 {
        match category {
            Category::Pilot => self.pilot,
            Category::Airport => self.airport,
            Category::Environment => self.environment,
            Category::External => self.external,
            Category::Total => self.total,
        }
    }

    fn replace(&mut self, category: Category, value: i32) -> i32 {
        let slot = match category {
            Category::Pilot => &mut self.pilot,
            Category::Airport => &mut self.airport,
            Category::Environment => &mut self.environment,
            Category::External => &mut self.external,
            Category::Total => &mut self.total,
        };
        std::mem::replace(slot, value)
    }
}

/// Notification payload: which derived score moved, and its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreChange {
    pub category: Category,
    pub value: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Listener {
    id: SubscriptionId,
    callback: Box<dyn FnMut(&ScoreChange)>,
}

/// Mutable answers for one assessment session, with scores kept current.
///
/// Writes flow field → owning category → total and finish before the setter
/// returns. Listeners run only after both tiers are updated, and are dropped
/// together with the session.
pub struct Questionnaire {
    engine: Arc<ScoringEngine>,
    answers: Answers,
    scores: ScoreSheet,
    listeners: Vec<Listener>,
    next_subscription: u64,
}

impl fmt::Debug for Questionnaire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Questionnaire")
            .field("answers", &self.answers)
            .field("scores", &self.scores)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Questionnaire {
    pub fn new(engine: Arc<ScoringEngine>) -> Self {
        let answers = Answers::default();
        let mut scores = ScoreSheet::default();
        for category in Category::real() {
            scores.replace(category, engine.category_score(category, &answers));
        }
        scores.replace(Category::Total, engine.total_score(&answers));

        Self {
            engine,
            answers,
            scores,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Session backed by the standard weights and category layout.
    pub fn standard() -> Result<Self, ConfigurationError> {
        Ok(Self::new(Arc::new(ScoringEngine::standard()?)))
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn flag(&self, field: BooleanField) -> bool {
        self.answers.flag(field)
    }

    pub fn approach(&self) -> ApproachType {
        self.answers.approach()
    }

    pub fn answer(&self, field: FieldId) -> AnswerValue {
        self.answers.get(field)
    }

    pub fn scores(&self) -> &ScoreSheet {
        &self.scores
    }

    /// Current score for `category`; [`Category::Total`] yields the total.
    pub fn category_score(&self, category: Category) -> i32 {
        self.scores.get(category)
    }

    pub fn total_score(&self) -> i32 {
        self.scores.total
    }

    pub fn breakdown(&self, category: Category) -> Vec<ScoreComponent> {
        self.engine.breakdown(category, &self.answers)
    }

    pub fn set_flag(&mut self, field: BooleanField, value: bool) {
        self.answers.set_flag(field, value);
        debug!(field = field.key(), value, "answer recorded");
        self.propagate(FieldId::Flag(field));
    }

    pub fn set_approach(&mut self, approach: ApproachType) {
        self.answers.set_approach(approach);
        debug!(
            field = FieldId::APPROACH_TYPE_KEY,
            value = approach.key(),
            "answer recorded"
        );
        self.propagate(FieldId::ApproachType);
    }

    /// Write an answer, rejecting values of the wrong kind for `field`.
    pub fn set_answer(&mut self, field: FieldId, value: AnswerValue) -> Result<(), AssessmentError> {
        match (field, value) {
            (FieldId::Flag(flag), AnswerValue::Flag(value)) => self.set_flag(flag, value),
            (FieldId::ApproachType, AnswerValue::Approach(approach)) => {
                self.set_approach(approach)
            }
            (field, _) => {
                return Err(AssessmentError::InvalidAnswer {
                    field: field.key(),
                    expected: field.expected_kind(),
                });
            }
        }
        Ok(())
    }

    /// Write an answer addressed by its stable identifier.
    pub fn set_answer_by_key(&mut self, key: &str, value: AnswerValue) -> Result<(), AssessmentError> {
        let field = FieldId::from_str(key)?;
        self.set_answer(field, value)
    }

    /// Restore every answer to its default and rescore.
    pub fn reset(&mut self) {
        self.answers = Answers::default();
        debug!("answers reset");

        let mut changes = Vec::new();
        for category in Category::real() {
            let score = self.engine.category_score(category, &self.answers);
            self.store_category_score(category, score, &mut changes);
        }
        self.refresh_total(&mut changes);
        self.notify(&changes);
    }

    /// Register a listener for derived score changes. It lives until
    /// [`Questionnaire::unsubscribe`] or until the session is dropped.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ScoreChange) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push(Listener {
            id,
            callback: Box::new(callback),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    pub fn subscription_count(&self) -> usize {
        self.listeners.len()
    }

    fn propagate(&mut self, field: FieldId) {
        let Some(category) = self.engine.categories().owner_of(field) else {
            return;
        };

        let mut changes = Vec::new();
        let score = self.engine.category_score(category, &self.answers);
        self.store_category_score(category, score, &mut changes);
        self.refresh_total(&mut changes);
        self.notify(&changes);
    }

    // Callers follow every category store with `refresh_total` before
    // notifying. Neither step touches answers.
    fn store_category_score(
        &mut self,
        category: Category,
        score: i32,
        changes: &mut Vec<ScoreChange>,
    ) {
        if self.scores.replace(category, score) != score {
            debug!(category = category.label(), score, "category score changed");
            changes.push(ScoreChange {
                category,
                value: score,
            });
        }
    }

    fn refresh_total(&mut self, changes: &mut Vec<ScoreChange>) {
        let total = self.engine.aggregate(
            Category::real()
                .into_iter()
                .map(|category| self.scores.get(category)),
        );
        if self.scores.replace(Category::Total, total) != total {
            debug!(total, "total score changed");
            changes.push(ScoreChange {
                category: Category::Total,
                value: total,
            });
        }
    }

    fn notify(&mut self, changes: &[ScoreChange]) {
        for change in changes {
            for listener in &mut self.listeners {
                (listener.callback)(change);
            }
        }
    }
}
