//! Category averages and the pass/fail signal derived from raw attribute sheets.

mod config;

pub use config::{ScoringConfig, DEFAULT_PASS_THRESHOLD};

use serde::{Deserialize, Serialize};

use super::domain::{AttributeCategory, SkillAttributes, TestResult};

pub const MIN_ATTRIBUTE: i32 = 1;
pub const MAX_ATTRIBUTE: i32 = 99;

/// Raised when an attribute sheet cannot be scored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("invalid attribute data: {attribute} = {value} (expected 1..=99)")]
    InvalidAttributeData { attribute: &'static str, value: i32 },
    /// The sheet could not be read as whole numbers at all (fractions, strings, missing fields).
    #[error("invalid attribute data: {detail}")]
    MalformedSheet { detail: String },
}

/// Rounded mean per attribute category. All zero when no test exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub physical: u8,
    pub mental: u8,
    pub technical: u8,
    pub goalkeeper: u8,
}

impl CategoryScores {
    pub fn get(&self, category: AttributeCategory) -> u8 {
        match category {
            AttributeCategory::Physical => self.physical,
            AttributeCategory::Mental => self.mental,
            AttributeCategory::Technical => self.technical,
            AttributeCategory::Goalkeeper => self.goalkeeper,
        }
    }
}

pub fn validate(attributes: &SkillAttributes) -> Result<(), AttributeError> {
    match attributes
        .iter()
        .find(|(_, value)| !(MIN_ATTRIBUTE..=MAX_ATTRIBUTE).contains(value))
    {
        Some((attribute, value)) => Err(AttributeError::InvalidAttributeData {
            attribute: attribute.key(),
            value,
        }),
        None => Ok(()),
    }
}

/// Category averages for a single result; zeros when `result` is `None`.
pub fn category_scores(result: Option<&TestResult>) -> Result<CategoryScores, AttributeError> {
    let Some(result) = result else {
        return Ok(CategoryScores::default());
    };
    let attributes = &result.attributes;
    validate(attributes)?;

    Ok(CategoryScores {
        physical: category_average(attributes, AttributeCategory::Physical),
        mental: category_average(attributes, AttributeCategory::Mental),
        technical: category_average(attributes, AttributeCategory::Technical),
        goalkeeper: category_average(attributes, AttributeCategory::Goalkeeper),
    })
}

/// Mean of the category's members rounded half up. Callers validate first.
pub(crate) fn category_average(attributes: &SkillAttributes, category: AttributeCategory) -> u8 {
    let (sum, count) = category
        .attributes()
        .fold((0i64, 0i64), |(sum, count), attribute| {
            (sum + i64::from(attributes.value(attribute)), count + 1)
        });
    rounded_mean(sum, count)
}

/// Mean across every attribute of every category, rounded half up.
pub fn overall_average(attributes: &SkillAttributes) -> Result<u8, AttributeError> {
    validate(attributes)?;
    let (sum, count) = totals(attributes);
    Ok(rounded_mean(sum, count))
}

/// Whether a sheet clears the threshold. The unrounded mean is compared so that 59.6 fails a
/// threshold of 60.
pub fn passes(attributes: &SkillAttributes, config: &ScoringConfig) -> Result<bool, AttributeError> {
    validate(attributes)?;
    let (sum, count) = totals(attributes);
    Ok(sum >= i64::from(config.pass_threshold) * count)
}

/// Monotonic pass signal: true if any historical result clears the threshold.
pub fn has_ever_passed(
    results: &[TestResult],
    config: &ScoringConfig,
) -> Result<bool, AttributeError> {
    for result in results {
        if passes(&result.attributes, config)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The authoritative result for scoring: latest `created_at`, later insertion wins ties.
pub fn latest(results: &[TestResult]) -> Option<&TestResult> {
    results
        .iter()
        .enumerate()
        .max_by_key(|(index, result)| (result.created_at, *index))
        .map(|(_, result)| result)
}

fn totals(attributes: &SkillAttributes) -> (i64, i64) {
    attributes.iter().fold((0i64, 0i64), |(sum, count), (_, value)| {
        (sum + i64::from(value), count + 1)
    })
}

fn rounded_mean(sum: i64, count: i64) -> u8 {
    if count == 0 {
        return 0;
    }
    let mean = (sum * 2 + count) / (count * 2);
    mean.clamp(0, i64::from(u8::MAX)) as u8
}
