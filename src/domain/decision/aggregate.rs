//! Decision aggregate.
//!
//! A decision owns its options. Selecting an option completes the decision;
//! there is no way back, and a completed decision's options are frozen.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DecisionId, OptionId, Timestamp, ValidationError};

use super::{DecisionError, DecisionOption, NewOption, OptionPatch};

/// Decision aggregate.
///
/// # Invariants
///
/// - `selected_option_id`, when set, names one of `options`
/// - `selected_option_id.is_some()` implies `completed`
/// - once `completed`, options cannot be added, changed or removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    id: DecisionId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    options: Vec<DecisionOption>,
    created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deadline: Option<Timestamp>,
    #[serde(default)]
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_option_id: Option<OptionId>,
}

impl Decision {
    /// Creates an open decision with a generated id and the current time.
    pub fn create(new: NewDecision) -> Result<Self, DecisionError> {
        new.validate()?;
        Ok(Self {
            id: DecisionId::new(),
            title: new.title,
            description: new.description,
            options: new.options.into_iter().map(DecisionOption::from_new).collect(),
            created_at: Timestamp::now(),
            deadline: new.deadline,
            completed: false,
            selected_option_id: None,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &DecisionId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn options(&self) -> &[DecisionOption] {
        &self.options
    }

    pub fn option(&self, option_id: &OptionId) -> Option<&DecisionOption> {
        self.options.iter().find(|o| &o.id == option_id)
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn deadline(&self) -> Option<&Timestamp> {
        self.deadline.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn selected_option_id(&self) -> Option<&OptionId> {
        self.selected_option_id.as_ref()
    }

    pub fn selected_option(&self) -> Option<&DecisionOption> {
        self.selected_option_id.as_ref().and_then(|id| self.option(id))
    }

    /// True when a deadline is set, has passed, and the decision is still open.
    pub fn is_overdue(&self, now: &Timestamp) -> bool {
        !self.completed && self.deadline.is_some_and(|d| d.is_before(now))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Shallow-merges title, description and deadline.
    pub fn apply(&mut self, patch: DecisionPatch) -> Result<(), DecisionError> {
        patch.validate()?;
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        Ok(())
    }

    /// Appends a new option and returns its id.
    pub fn add_option(&mut self, new: NewOption) -> Result<OptionId, DecisionError> {
        self.ensure_open()?;
        new.validate()?;
        let option = DecisionOption::from_new(new);
        let id = option.id.clone();
        self.options.push(option);
        Ok(id)
    }

    pub fn update_option(
        &mut self,
        option_id: &OptionId,
        patch: OptionPatch,
    ) -> Result<(), DecisionError> {
        self.ensure_open()?;
        patch.validate()?;
        let decision_id = self.id.clone();
        let option = self
            .options
            .iter_mut()
            .find(|o| &o.id == option_id)
            .ok_or_else(|| DecisionError::OptionNotFound {
                decision_id,
                option_id: option_id.clone(),
            })?;
        option.apply(patch);
        Ok(())
    }

    pub fn remove_option(&mut self, option_id: &OptionId) -> Result<DecisionOption, DecisionError> {
        self.ensure_open()?;
        let index = self.option_index(option_id)?;
        Ok(self.options.remove(index))
    }

    /// Records the chosen option and completes the decision.
    pub fn select_option(&mut self, option_id: &OptionId) -> Result<(), DecisionError> {
        self.ensure_open()?;
        self.option_index(option_id)?;
        self.selected_option_id = Some(option_id.clone());
        self.completed = true;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), DecisionError> {
        if self.completed {
            return Err(DecisionError::AlreadyCompleted(self.id.clone()));
        }
        Ok(())
    }

    fn option_index(&self, option_id: &OptionId) -> Result<usize, DecisionError> {
        self.options
            .iter()
            .position(|o| &o.id == option_id)
            .ok_or_else(|| DecisionError::OptionNotFound {
                decision_id: self.id.clone(),
                option_id: option_id.clone(),
            })
    }
}

/// Input for creating a decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDecision {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<NewOption>,
    #[serde(default)]
    pub deadline: Option<Timestamp>,
}

impl NewDecision {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        self.options.iter().try_for_each(NewOption::validate)
    }
}

/// Partial update of a decision.
///
/// `deadline: Some(None)` clears the deadline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "double_option")]
    pub deadline: Option<Option<Timestamp>>,
}

impl DecisionPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(ValidationError::empty_field("title"));
        }
        Ok(())
    }
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
