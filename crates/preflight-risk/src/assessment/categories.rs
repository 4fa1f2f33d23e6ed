use std::collections::{BTreeMap, BTreeSet};

use super::domain::{BooleanField, Category, ConfigurationError, FieldId};

/// Immutable mapping from each real category to the fields scored under it.
///
/// The approach type is always scored under [`Category::Airport`], whether or
/// not it is listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    members: BTreeMap<Category, BTreeSet<FieldId>>,
}

impl CategoryRegistry {
    /// Build a registry, rejecting fields claimed by more than one category.
    pub fn new<I, F>(entries: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (Category, F)>,
        F: IntoIterator<Item = FieldId>,
    {
        let mut members: BTreeMap<Category, BTreeSet<FieldId>> = Category::real()
            .into_iter()
            .map(|category| (category, BTreeSet::new()))
            .collect();
        let mut owners: BTreeMap<FieldId, Category> = BTreeMap::new();

        for (category, fields) in entries {
            if category.is_aggregate() {
                return Err(ConfigurationError::AggregateHasFields);
            }

            for field in fields {
                if field == FieldId::ApproachType && category != Category::Airport {
                    return Err(ConfigurationError::ApproachOutsideAirport(category));
                }

                match owners.get(&field).copied() {
                    Some(first) if first != category => {
                        return Err(ConfigurationError::OverlappingField {
                            field,
                            first,
                            second: category,
                        });
                    }
                    _ => {
                        owners.insert(field, category);
                    }
                }

                members.entry(category).or_default().insert(field);
            }
        }

        Ok(Self { members })
    }

    /// The standard four-category layout of the preflight questionnaire.
    pub fn standard() -> Self {
        use BooleanField::*;

        let layout: [(Category, &[BooleanField]); 4] = [
            (
                Category::Pilot,
                &[
                    LessThan50InType,
                    LessThan15InLast90,
                    AfterWork,
                    LessThan8HrSleep,
                    DualInLast90,
                    WingsInLast6Mo,
                    IfrCurrent,
                ],
            ),
            (
                Category::Airport,
                &[
                    Mountainous,
                    Nontowered,
                    ShortRunway,
                    WetOrSoftFieldRunway,
                    RunwayObstacles,
                    NoDestWx,
                ],
            ),
            (
                Category::Environment,
                &[
                    Night,
                    StrongWinds,
                    StrongCrosswinds,
                    VfrCeilingUnder3000,
                    VfrVisibilityUnder5,
                    IfrLowCeiling,
                    IfrLowVisibility,
                ],
            ),
            (Category::External, &[VfrFlightPlan, VfrFlightFollowing]),
        ];

        let members = layout
            .into_iter()
            .map(|(category, fields)| {
                let fields = fields.iter().copied().map(FieldId::Flag).collect();
                (category, fields)
            })
            .collect();

        Self { members }
    }

    /// Fields listed under a real category. `None` for the aggregate.
    pub fn fields_of(&self, category: Category) -> Option<&BTreeSet<FieldId>> {
        if category.is_aggregate() {
            return None;
        }
        self.members.get(&category)
    }

    /// Category whose score depends on `field`, if any.
    pub fn owner_of(&self, field: FieldId) -> Option<Category> {
        if field == FieldId::ApproachType {
            return Some(Category::Airport);
        }

        self.members
            .iter()
            .find(|(_, fields)| fields.contains(&field))
            .map(|(category, _)| *category)
    }

    /// Every field listed under some category.
    pub fn known_fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.members.values().flat_map(|fields| fields.iter().copied())
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
