use serde::Serialize;
use tracing::info;

use super::categories::CategoryRegistry;
use super::domain::{Answers, AnswerValue, Category, ConfigurationError, FieldId};
use super::weights::{WeightRegistry, WeightTable};

/// Stateless scorer combining the validated weights with the category layout.
///
/// Every method is a pure function of the supplied answers, so one engine can
/// be shared by any number of sessions.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: WeightTable,
    categories: CategoryRegistry,
}

/// One non-zero contribution to a category score, kept for audit views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComponent {
    pub category: Category,
    pub field: &'static str,
    pub answer: AnswerValue,
    pub weight: i32,
}

impl ScoringEngine {
    pub fn new(
        weights: &WeightRegistry,
        categories: CategoryRegistry,
    ) -> Result<Self, ConfigurationError> {
        let weights = weights.resolve(&categories)?;
        info!(
            fields = categories.known_fields().count(),
            "scoring engine configured"
        );
        Ok(Self {
            weights,
            categories,
        })
    }

    pub fn standard() -> Result<Self, ConfigurationError> {
        Self::new(&WeightRegistry::standard(), CategoryRegistry::standard())
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Score for `category`. Requesting [`Category::Total`] aggregates.
    pub fn category_score(&self, category: Category, answers: &Answers) -> i32 {
        if category.is_aggregate() {
            return self.total_score(answers);
        }

        let listed: i32 = self
            .listed_fields(category)
            .filter(|field| *field != FieldId::ApproachType)
            .map(|field| self.weights.weight_of(field, answers))
            .sum();

        if category == Category::Airport {
            listed + self.weights.weight_of(FieldId::ApproachType, answers)
        } else {
            listed
        }
    }

    /// Sum of the four category scores, floored at zero.
    pub fn total_score(&self, answers: &Answers) -> i32 {
        self.aggregate(
            Category::real()
                .into_iter()
                .map(|category| self.category_score(category, answers)),
        )
    }

    /// Combine per-category scores into the total. Individual categories may
    /// be negative; only the sum is floored.
    pub fn aggregate<I>(&self, category_scores: I) -> i32
    where
        I: IntoIterator<Item = i32>,
    {
        category_scores.into_iter().sum::<i32>().max(0)
    }

    /// Contributions behind a category score, skipping zero-weight answers.
    /// For [`Category::Total`] the contributions of every category are listed.
    pub fn breakdown(&self, category: Category, answers: &Answers) -> Vec<ScoreComponent> {
        if category.is_aggregate() {
            return Category::real()
                .into_iter()
                .flat_map(|category| self.breakdown(category, answers))
                .collect();
        }

        let mut scored: Vec<FieldId> = self
            .listed_fields(category)
            .filter(|field| *field != FieldId::ApproachType)
            .collect();
        if category == Category::Airport {
            scored.push(FieldId::ApproachType);
        }

        scored
            .into_iter()
            .filter_map(|field| {
                let weight = self.weights.weight_of(field, answers);
                (weight != 0).then(|| ScoreComponent {
                    category,
                    field: field.key(),
                    answer: answers.get(field),
                    weight,
                })
            })
            .collect()
    }

    fn listed_fields(&self, category: Category) -> impl Iterator<Item = FieldId> + '_ {
        self.categories
            .fields_of(category)
            .into_iter()
            .flat_map(|fields| fields.iter().copied())
    }
}
