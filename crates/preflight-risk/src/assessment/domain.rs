use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Yes/no risk factors a pilot answers before a flight.
///
/// The serialized form of each variant is its stable identifier, the same key
/// accepted by [`FieldId::from_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BooleanField {
    LessThan50InType,
    LessThan15InLast90,
    AfterWork,
    LessThan8HrSleep,
    DualInLast90,
    WingsInLast6Mo,
    #[serde(rename = "IFRCurrent")]
    IfrCurrent,
    Mountainous,
    Nontowered,
    ShortRunway,
    WetOrSoftFieldRunway,
    RunwayObstacles,
    NoDestWx,
    Night,
    StrongWinds,
    StrongCrosswinds,
    VfrCeilingUnder3000,
    VfrVisibilityUnder5,
    IfrLowCeiling,
    IfrLowVisibility,
    VfrFlightPlan,
    VfrFlightFollowing,
}

impl BooleanField {
    pub const COUNT: usize = 22;

    pub const ALL: [Self; Self::COUNT] = [
        Self::LessThan50InType,
        Self::LessThan15InLast90,
        Self::AfterWork,
        Self::LessThan8HrSleep,
        Self::DualInLast90,
        Self::WingsInLast6Mo,
        Self::IfrCurrent,
        Self::Mountainous,
        Self::Nontowered,
        Self::ShortRunway,
        Self::WetOrSoftFieldRunway,
        Self::RunwayObstacles,
        Self::NoDestWx,
        Self::Night,
        Self::StrongWinds,
        Self::StrongCrosswinds,
        Self::VfrCeilingUnder3000,
        Self::VfrVisibilityUnder5,
        Self::IfrLowCeiling,
        Self::IfrLowVisibility,
        Self::VfrFlightPlan,
        Self::VfrFlightFollowing,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::LessThan50InType => "lessThan50InType",
            Self::LessThan15InLast90 => "lessThan15InLast90",
            Self::AfterWork => "afterWork",
            Self::LessThan8HrSleep => "lessThan8HrSleep",
            Self::DualInLast90 => "dualInLast90",
            Self::WingsInLast6Mo => "wingsInLast6Mo",
            Self::IfrCurrent => "IFRCurrent",
            Self::Mountainous => "mountainous",
            Self::Nontowered => "nontowered",
            Self::ShortRunway => "shortRunway",
            Self::WetOrSoftFieldRunway => "wetOrSoftFieldRunway",
            Self::RunwayObstacles => "runwayObstacles",
            Self::NoDestWx => "noDestWx",
            Self::Night => "night",
            Self::StrongWinds => "strongWinds",
            Self::StrongCrosswinds => "strongCrosswinds",
            Self::VfrCeilingUnder3000 => "vfrCeilingUnder3000",
            Self::VfrVisibilityUnder5 => "vfrVisibilityUnder5",
            Self::IfrLowCeiling => "ifrLowCeiling",
            Self::IfrLowVisibility => "ifrLowVisibility",
            Self::VfrFlightPlan => "vfrFlightPlan",
            Self::VfrFlightFollowing => "vfrFlightFollowing",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LessThan50InType => "Less than 50 hours in type",
            Self::LessThan15InLast90 => "Less than 15 hours in the last 90 days",
            Self::AfterWork => "Flying after work",
            Self::LessThan8HrSleep => "Less than 8 hours of sleep",
            Self::DualInLast90 => "Dual instruction in the last 90 days",
            Self::WingsInLast6Mo => "WINGS credit in the last 6 months",
            Self::IfrCurrent => "IFR current",
            Self::Mountainous => "Mountainous terrain",
            Self::Nontowered => "Non-towered airport",
            Self::ShortRunway => "Short runway",
            Self::WetOrSoftFieldRunway => "Wet or soft-field runway",
            Self::RunwayObstacles => "Runway obstacles",
            Self::NoDestWx => "No weather reporting at destination",
            Self::Night => "Night flight",
            Self::StrongWinds => "Strong winds",
            Self::StrongCrosswinds => "Strong crosswinds",
            Self::VfrCeilingUnder3000 => "VFR ceiling under 3000 ft",
            Self::VfrVisibilityUnder5 => "VFR visibility under 5 sm",
            Self::IfrLowCeiling => "IFR low ceiling",
            Self::IfrLowVisibility => "IFR low visibility",
            Self::VfrFlightPlan => "VFR flight plan filed",
            Self::VfrFlightFollowing => "VFR flight following",
        }
    }
}

impl fmt::Display for BooleanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Kind of instrument approach planned at the destination.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ApproachType {
    Precision,
    Nonprecision,
    #[serde(rename = "none")]
    NoApproach,
    Circling,
    /// VFR flights.
    #[default]
    NotApplicable,
}

impl ApproachType {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Precision,
        Self::Nonprecision,
        Self::NoApproach,
        Self::Circling,
        Self::NotApplicable,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Precision => "precision",
            Self::Nonprecision => "nonprecision",
            Self::NoApproach => "none",
            Self::Circling => "circling",
            Self::NotApplicable => "notApplicable",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Precision => "Precision approach",
            Self::Nonprecision => "Non-precision approach",
            Self::NoApproach => "No instrument approach",
            Self::Circling => "Circling approach",
            Self::NotApplicable => "Not applicable (VFR)",
        }
    }
}

impl fmt::Display for ApproachType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ApproachType {
    type Err = AssessmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|approach| approach.key() == trimmed)
            .ok_or_else(|| AssessmentError::UnknownApproach(trimmed.to_owned()))
    }
}

/// Score groupings. `Total` is the aggregate and owns no fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pilot,
    Airport,
    Environment,
    External,
    Total,
}

impl Category {
    /// The four categories that own fields, in reporting order.
    pub const fn real() -> [Self; 4] {
        [Self::Pilot, Self::Airport, Self::Environment, Self::External]
    }

    pub const fn is_aggregate(self) -> bool {
        matches!(self, Self::Total)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pilot => "Pilot",
            Self::Airport => "Airport",
            Self::Environment => "Environment",
            Self::External => "External factors",
            Self::Total => "Total",
        }
    }
}

/// Identifier of any answerable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    Flag(BooleanField),
    ApproachType,
}

impl FieldId {
    pub const APPROACH_TYPE_KEY: &'static str = "ifrApproachType";

    pub const fn key(self) -> &'static str {
        match self {
            Self::Flag(field) => field.key(),
            Self::ApproachType => Self::APPROACH_TYPE_KEY,
        }
    }

    pub(crate) const fn expected_kind(self) -> &'static str {
        match self {
            Self::Flag(_) => "a boolean",
            Self::ApproachType => "an approach type",
        }
    }
}

impl From<BooleanField> for FieldId {
    fn from(value: BooleanField) -> Self {
        Self::Flag(value)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FieldId {
    type Err = AssessmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed == Self::APPROACH_TYPE_KEY {
            return Ok(Self::ApproachType);
        }

        BooleanField::ALL
            .into_iter()
            .find(|field| field.key() == trimmed)
            .map(Self::Flag)
            .ok_or_else(|| AssessmentError::UnknownField(trimmed.to_owned()))
    }
}

/// A single answer, either a toggle or an approach variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Approach(ApproachType),
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<ApproachType> for AnswerValue {
    fn from(value: ApproachType) -> Self {
        Self::Approach(value)
    }
}

/// Current answer for every field. Defaults to all toggles off and no approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Answers {
    flags: [bool; BooleanField::COUNT],
    approach: ApproachType,
}

impl Answers {
    pub fn flag(&self, field: BooleanField) -> bool {
        self.flags[field.index()]
    }

    pub fn approach(&self) -> ApproachType {
        self.approach
    }

    pub fn get(&self, field: FieldId) -> AnswerValue {
        match field {
            FieldId::Flag(flag) => AnswerValue::Flag(self.flag(flag)),
            FieldId::ApproachType => AnswerValue::Approach(self.approach),
        }
    }

    pub fn set_flag(&mut self, field: BooleanField, value: bool) {
        self.flags[field.index()] = value;
    }

    pub fn set_approach(&mut self, approach: ApproachType) {
        self.approach = approach;
    }

    pub fn with_flag(mut self, field: BooleanField, value: bool) -> Self {
        self.set_flag(field, value);
        self
    }

    pub fn with_approach(mut self, approach: ApproachType) -> Self {
        self.set_approach(approach);
        self
    }

    /// Toggles currently answered "yes".
    pub fn raised_flags(&self) -> impl Iterator<Item = BooleanField> + '_ {
        BooleanField::ALL
            .into_iter()
            .filter(move |field| self.flag(*field))
    }
}

/// Rejected answer writes. State is never modified when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssessmentError {
    #[error("unknown field identifier '{0}'")]
    UnknownField(String),
    #[error("unknown approach type '{0}'")]
    UnknownApproach(String),
    #[error("field '{field}' expects {expected}")]
    InvalidAnswer {
        field: &'static str,
        expected: &'static str,
    },
}

/// Registry problems detected while building the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no weight configured for field '{0}'")]
    MissingWeight(FieldId),
    #[error("no weight configured for approach type '{0}'")]
    MissingVariantWeight(ApproachType),
    #[error("field '{field}' configured with the wrong kind of scoring rule")]
    MismatchedRule { field: FieldId },
    #[error("field '{field}' listed under both {first:?} and {second:?}")]
    OverlappingField {
        field: FieldId,
        first: Category,
        second: Category,
    },
    #[error("'ifrApproachType' is always scored under the airport category, not {0:?}")]
    ApproachOutsideAirport(Category),
    #[error("the total category is an aggregate and cannot own fields")]
    AggregateHasFields,
    #[error("weights can add up to {bound}, beyond the range of a score")]
    WeightOverflow { bound: i64 },
}
