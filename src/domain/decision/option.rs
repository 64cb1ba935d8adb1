//! Decision options and their create/patch inputs.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OptionId, ValidationError};

use super::{GradientFactors, Impact, TimeOfDay};

/// One of the choices of a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOption {
    pub id: OptionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub impact: Impact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_factors: Option<GradientFactors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl DecisionOption {
    /// Builds an option with a freshly generated id.
    pub fn from_new(new: NewOption) -> Self {
        Self {
            id: OptionId::new(),
            title: new.title,
            description: new.description,
            pros: new.pros,
            cons: new.cons,
            impact: new.impact,
            time_of_day: new.time_of_day,
            gradient_factors: new.gradient_factors,
            categories: new.categories,
        }
    }

    /// Time-of-day tag, treating a missing tag as `any`.
    pub fn effective_time_of_day(&self) -> TimeOfDay {
        self.time_of_day.unwrap_or_default()
    }

    /// Categories the option is tagged with (empty when untagged).
    pub fn category_list(&self) -> &[String] {
        self.categories.as_deref().unwrap_or(&[])
    }

    /// `pros - cons`, the last tie-break of the recommendation.
    pub fn pros_cons_balance(&self) -> i64 {
        self.pros.len() as i64 - self.cons.len() as i64
    }

    /// Shallow-merges the fields present in `patch`.
    pub fn apply(&mut self, patch: OptionPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(pros) = patch.pros {
            self.pros = pros;
        }
        if let Some(cons) = patch.cons {
            self.cons = cons;
        }
        if let Some(impact) = patch.impact {
            self.impact = impact;
        }
        if let Some(time_of_day) = patch.time_of_day {
            self.time_of_day = Some(time_of_day);
        }
        if let Some(factors) = patch.gradient_factors {
            self.gradient_factors = Some(factors);
        }
        if let Some(categories) = patch.categories {
            self.categories = Some(categories);
        }
    }
}

/// Input for creating an option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOption {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub impact: Impact,
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub gradient_factors: Option<GradientFactors>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl NewOption {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        if let Some(factors) = &self.gradient_factors {
            factors.validate()?;
        }
        Ok(())
    }
}

/// Partial update of an option; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub pros: Option<Vec<String>>,
    pub cons: Option<Vec<String>>,
    pub impact: Option<Impact>,
    pub time_of_day: Option<TimeOfDay>,
    pub gradient_factors: Option<GradientFactors>,
    pub categories: Option<Vec<String>>,
}

impl OptionPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(ValidationError::empty_field("title"));
        }
        if let Some(factors) = &self.gradient_factors {
            factors.validate()?;
        }
        Ok(())
    }
}
