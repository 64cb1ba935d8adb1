//! Gradient scoring - a fixed weighted sum of five 0-10 factors.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

use super::DecisionOption;

pub const URGENCY_WEIGHT: f64 = 0.20;
pub const IMPORTANCE_WEIGHT: f64 = 0.30;
pub const CONFIDENCE_WEIGHT: f64 = 0.15;
pub const EMOTIONAL_IMPACT_WEIGHT: f64 = 0.15;
pub const LONG_TERM_VALUE_WEIGHT: f64 = 0.20;

/// Lower bound of every gradient factor.
pub const FACTOR_MIN: f64 = 0.0;
/// Upper bound of every gradient factor.
pub const FACTOR_MAX: f64 = 10.0;

const WEIGHT_SUM: f64 = URGENCY_WEIGHT
    + IMPORTANCE_WEIGHT
    + CONFIDENCE_WEIGHT
    + EMOTIONAL_IMPACT_WEIGHT
    + LONG_TERM_VALUE_WEIGHT;

/// User ratings (0-10) describing a decision option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientFactors {
    pub urgency: f64,
    pub importance: f64,
    pub confidence: f64,
    pub emotional_impact: f64,
    pub long_term_value: f64,
}

impl GradientFactors {
    /// Creates factors, rejecting values outside 0-10.
    pub fn new(
        urgency: f64,
        importance: f64,
        confidence: f64,
        emotional_impact: f64,
        long_term_value: f64,
    ) -> Result<Self, ValidationError> {
        let factors = Self {
            urgency,
            importance,
            confidence,
            emotional_impact,
            long_term_value,
        };
        factors.validate()?;
        Ok(factors)
    }

    /// Creates factors with every value clamped into 0-10.
    pub fn clamped(
        urgency: f64,
        importance: f64,
        confidence: f64,
        emotional_impact: f64,
        long_term_value: f64,
    ) -> Self {
        let clamp = |v: f64| {
            if v.is_nan() {
                FACTOR_MIN
            } else {
                v.clamp(FACTOR_MIN, FACTOR_MAX)
            }
        };
        Self {
            urgency: clamp(urgency),
            importance: clamp(importance),
            confidence: clamp(confidence),
            emotional_impact: clamp(emotional_impact),
            long_term_value: clamp(long_term_value),
        }
    }

    /// Every factor set to the same value (unchecked).
    pub fn uniform(value: f64) -> Self {
        Self {
            urgency: value,
            importance: value,
            confidence: value,
            emotional_impact: value,
            long_term_value: value,
        }
    }

    /// Checks every factor lies within 0-10.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let named = [
            ("urgency", self.urgency),
            ("importance", self.importance),
            ("confidence", self.confidence),
            ("emotionalImpact", self.emotional_impact),
            ("longTermValue", self.long_term_value),
        ];
        for (field, value) in named {
            if value.is_nan() {
                return Err(ValidationError::invalid_format(field, "not a number"));
            }
            if !(FACTOR_MIN..=FACTOR_MAX).contains(&value) {
                return Err(ValidationError::out_of_range(
                    field,
                    FACTOR_MIN as i32,
                    FACTOR_MAX as i32,
                    value.round() as i32,
                ));
            }
        }
        Ok(())
    }

    /// Multiplies every factor by `c`.
    pub fn scaled(&self, c: f64) -> Self {
        Self {
            urgency: self.urgency * c,
            importance: self.importance * c,
            confidence: self.confidence * c,
            emotional_impact: self.emotional_impact * c,
            long_term_value: self.long_term_value * c,
        }
    }

    /// Weighted score, rounded to two decimal places.
    pub fn score(&self) -> f64 {
        let weighted = self.urgency * URGENCY_WEIGHT
            + self.importance * IMPORTANCE_WEIGHT
            + self.confidence * CONFIDENCE_WEIGHT
            + self.emotional_impact * EMOTIONAL_IMPACT_WEIGHT
            + self.long_term_value * LONG_TERM_VALUE_WEIGHT;
        round2(weighted / WEIGHT_SUM)
    }
}

/// Gradient score of an option; exactly 0 when it has no factors.
pub fn gradient_score(option: &DecisionOption) -> f64 {
    option
        .gradient_factors
        .as_ref()
        .map(GradientFactors::score)
        .unwrap_or(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
