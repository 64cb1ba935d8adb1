//! User-authored rules that bias option ranking.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RuleId, ValidationError};

use super::{DayPeriod, DecisionOption, TimeOfDay};

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 10;

/// Rules at or above this priority take precedence over gradient scores.
pub const HIGH_PRIORITY_THRESHOLD: u8 = 8;

/// A priority/category/time-of-day annotation. Never enforced as a hard
/// constraint; only used to rank options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRule {
    pub id: RuleId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: u8,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
    /// Empty means the rule applies to every category.
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl DecisionRule {
    /// Builds a rule with a freshly generated id.
    pub fn create(new: NewRule) -> Result<Self, ValidationError> {
        new.validate()?;
        Ok(Self {
            id: RuleId::new(),
            title: new.title,
            description: new.description,
            priority: new.priority,
            time_of_day: new.time_of_day,
            category: new.category,
            active: new.active,
        })
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority >= HIGH_PRIORITY_THRESHOLD
    }

    /// True when the rule has no category or its category is listed.
    pub fn applies_to_any(&self, categories: &[String]) -> bool {
        self.category.is_empty() || categories.iter().any(|c| c == &self.category)
    }

    /// True when the rule is in effect for `period` and covers the option.
    pub fn matches_option(&self, option: &DecisionOption, period: DayPeriod) -> bool {
        self.time_of_day.matches(period) && self.applies_to_any(option.category_list())
    }

    /// Shallow-merges the fields present in `patch`.
    pub fn apply(&mut self, patch: RulePatch) -> Result<(), ValidationError> {
        patch.validate()?;
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(time_of_day) = patch.time_of_day {
            self.time_of_day = time_of_day;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        Ok(())
    }
}

fn validate_priority(priority: u8) -> Result<(), ValidationError> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        return Err(ValidationError::out_of_range(
            "priority",
            MIN_PRIORITY as i32,
            MAX_PRIORITY as i32,
            priority as i32,
        ));
    }
    Ok(())
}

/// Input for creating a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRule {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: u8,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl NewRule {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        validate_priority(self.priority)
    }
}

/// Partial update of a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<u8>,
    pub time_of_day: Option<TimeOfDay>,
    pub category: Option<String>,
    pub active: Option<bool>,
}

impl RulePatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(ValidationError::empty_field("title"));
        }
        if let Some(priority) = self.priority {
            validate_priority(priority)?;
        }
        Ok(())
    }
}
