use std::collections::BTreeMap;

use serde::Serialize;

use super::categories::CategoryRegistry;
use super::domain::{Answers, ApproachType, BooleanField, ConfigurationError, FieldId};

/// How a single field converts its answer into points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ScoringRule {
    /// Points awarded when the toggle is on; nothing when it is off.
    Boolean { weight: i32 },
    /// Points per approach variant.
    Variant { weights: BTreeMap<ApproachType, i32> },
}

/// Immutable field → rule lookup, assembled once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightRegistry {
    rules: BTreeMap<FieldId, ScoringRule>,
}

impl WeightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(mut self, field: BooleanField, weight: i32) -> Self {
        self.rules
            .insert(FieldId::Flag(field), ScoringRule::Boolean { weight });
        self
    }

    pub fn with_approach_weights<I>(mut self, weights: I) -> Self
    where
        I: IntoIterator<Item = (ApproachType, i32)>,
    {
        self.rules.insert(
            FieldId::ApproachType,
            ScoringRule::Variant {
                weights: weights.into_iter().collect(),
            },
        );
        self
    }

    pub fn with_rule(mut self, field: FieldId, rule: ScoringRule) -> Self {
        self.rules.insert(field, rule);
        self
    }

    /// Weights used by the preflight questionnaire. Mitigating factors are negative.
    pub fn standard() -> Self {
        use BooleanField::*;

        let flags = [
            (LessThan50InType, 2),
            (LessThan15InLast90, 3),
            (AfterWork, 1),
            (LessThan8HrSleep, 2),
            (DualInLast90, -1),
            (WingsInLast6Mo, -1),
            (IfrCurrent, -1),
            (Mountainous, 3),
            (Nontowered, 1),
            (ShortRunway, 2),
            (WetOrSoftFieldRunway, 2),
            (RunwayObstacles, 2),
            (NoDestWx, 2),
            (Night, 2),
            (StrongWinds, 2),
            (StrongCrosswinds, 3),
            (VfrCeilingUnder3000, 2),
            (VfrVisibilityUnder5, 2),
            (IfrLowCeiling, 2),
            (IfrLowVisibility, 2),
            (VfrFlightPlan, -1),
            (VfrFlightFollowing, -1),
        ];

        flags
            .into_iter()
            .fold(Self::new(), |registry, (field, weight)| {
                registry.with_flag(field, weight)
            })
            .with_approach_weights([
                (ApproachType::Precision, 0),
                (ApproachType::Nonprecision, 2),
                (ApproachType::NoApproach, 4),
                (ApproachType::Circling, 3),
                (ApproachType::NotApplicable, 0),
            ])
    }

    pub fn rule(&self, field: FieldId) -> Option<&ScoringRule> {
        self.rules.get(&field)
    }

    pub fn rules(&self) -> impl Iterator<Item = (FieldId, &ScoringRule)> + '_ {
        self.rules.iter().map(|(field, rule)| (*field, rule))
    }

    /// Validate against `categories` and flatten into a total lookup table.
    ///
    /// Every field a category lists, and the approach type with all of its
    /// variants, must carry a rule of the matching kind. The largest score any
    /// answer set can reach must fit in an `i32`.
    pub fn resolve(&self, categories: &CategoryRegistry) -> Result<WeightTable, ConfigurationError> {
        let mut flags = [0; BooleanField::COUNT];

        for field in BooleanField::ALL {
            let id = FieldId::Flag(field);
            match self.rules.get(&id) {
                Some(ScoringRule::Boolean { weight }) => flags[field.index()] = *weight,
                Some(ScoringRule::Variant { .. }) => {
                    return Err(ConfigurationError::MismatchedRule { field: id });
                }
                None if categories.owner_of(id).is_some() => {
                    return Err(ConfigurationError::MissingWeight(id));
                }
                None => {}
            }
        }

        let variants = match self.rules.get(&FieldId::ApproachType) {
            Some(ScoringRule::Variant { weights }) => weights,
            Some(ScoringRule::Boolean { .. }) => {
                return Err(ConfigurationError::MismatchedRule {
                    field: FieldId::ApproachType,
                });
            }
            None => return Err(ConfigurationError::MissingWeight(FieldId::ApproachType)),
        };

        let mut approach = [0; ApproachType::COUNT];
        for variant in ApproachType::ALL {
            let weight = variants
                .get(&variant)
                .ok_or(ConfigurationError::MissingVariantWeight(variant))?;
            approach[variant.index()] = *weight;
        }

        let bound = score_bound(&flags, &approach);
        if bound > i64::from(i32::MAX) {
            return Err(ConfigurationError::WeightOverflow { bound });
        }

        Ok(WeightTable { flags, approach })
    }
}

// Sum of every boolean weight's magnitude plus the largest approach weight.
fn score_bound(flags: &[i32], approach: &[i32]) -> i64 {
    let flags: i64 = flags.iter().map(|weight| i64::from(*weight).abs()).sum();
    let approach = approach
        .iter()
        .map(|weight| i64::from(*weight).abs())
        .max()
        .unwrap_or(0);
    flags + approach
}

/// Validated weights with an entry for every field and approach variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable {
    flags: [i32; BooleanField::COUNT],
    approach: [i32; ApproachType::COUNT],
}

impl WeightTable {
    pub fn flag_weight(&self, field: BooleanField, value: bool) -> i32 {
        if value {
            self.flags[field.index()]
        } else {
            0
        }
    }

    pub fn approach_weight(&self, approach: ApproachType) -> i32 {
        self.approach[approach.index()]
    }

    /// Points `field` contributes given its current answer.
    pub fn weight_of(&self, field: FieldId, answers: &Answers) -> i32 {
        match field {
            FieldId::Flag(flag) => self.flag_weight(flag, answers.flag(flag)),
            FieldId::ApproachType => self.approach_weight(answers.approach()),
        }
    }
}
