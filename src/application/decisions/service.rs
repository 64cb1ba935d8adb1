//! DecisionService - persisted rule and decision operations.
//!
//! Every mutation runs under the board's write lock: the board is changed,
//! the touched collection is written back whole, and the lock is released.
//! If the write fails the board is restored, so a failed operation leaves no
//! trace in memory or in storage.

use tokio::sync::RwLock;

use crate::domain::decision::{
    gradient_score, DayPeriod, Decision, DecisionBoard, DecisionError, DecisionOption,
    DecisionPatch, DecisionRule, NewDecision, NewOption, NewRule, OptionPatch, Recommendation,
    RulePatch,
};
use crate::domain::foundation::{DecisionId, OptionId, RuleId};

use super::DecisionRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Rules,
    Decisions,
}

pub struct DecisionService {
    board: RwLock<DecisionBoard>,
    repository: DecisionRepository,
}

impl DecisionService {
    /// Loads persisted rules and decisions.
    pub async fn load(repository: DecisionRepository) -> Self {
        let board = repository.load_board().await;
        tracing::info!(
            rules = board.rules().len(),
            decisions = board.decisions().len(),
            "Decision board loaded"
        );
        Self {
            board: RwLock::new(board),
            repository,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn rules(&self) -> Vec<DecisionRule> {
        self.board.read().await.rules().to_vec()
    }

    pub async fn active_rules(&self, categories: &[String]) -> Vec<DecisionRule> {
        self.board
            .read()
            .await
            .active_rules(categories)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn decisions(&self) -> Vec<Decision> {
        self.board.read().await.decisions().to_vec()
    }

    pub async fn decision(&self, id: &DecisionId) -> Result<Decision, DecisionError> {
        self.board
            .read()
            .await
            .decision(id)
            .cloned()
            .ok_or_else(|| DecisionError::NotFound(id.clone()))
    }

    pub async fn pending_decisions(&self) -> Vec<Decision> {
        self.board
            .read()
            .await
            .pending_decisions()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn completed_decisions(&self) -> Vec<Decision> {
        self.board
            .read()
            .await
            .completed_decisions()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Recommended option of a decision; `None` when nothing is available.
    pub async fn recommended_option(
        &self,
        decision_id: &DecisionId,
        period: DayPeriod,
    ) -> Result<Option<Recommendation>, DecisionError> {
        let board = self.board.read().await;
        if board.decision(decision_id).is_none() {
            return Err(DecisionError::NotFound(decision_id.clone()));
        }
        Ok(board.recommended_option(decision_id, period))
    }

    pub fn gradient_score(&self, option: &DecisionOption) -> f64 {
        gradient_score(option)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rules
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn add_rule(&self, new: NewRule) -> Result<DecisionRule, DecisionError> {
        self.mutate(Collection::Rules, |board| board.add_rule(new).cloned())
            .await
    }

    pub async fn update_rule(
        &self,
        id: &RuleId,
        patch: RulePatch,
    ) -> Result<DecisionRule, DecisionError> {
        self.mutate(Collection::Rules, |board| board.update_rule(id, patch).cloned())
            .await
    }

    pub async fn toggle_rule(&self, id: &RuleId) -> Result<DecisionRule, DecisionError> {
        self.mutate(Collection::Rules, |board| board.toggle_rule(id).cloned())
            .await
    }

    pub async fn delete_rule(&self, id: &RuleId) -> Result<DecisionRule, DecisionError> {
        self.mutate(Collection::Rules, |board| board.delete_rule(id))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Decisions and options
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn add_decision(&self, new: NewDecision) -> Result<Decision, DecisionError> {
        self.mutate(Collection::Decisions, |board| board.add_decision(new).cloned())
            .await
    }

    pub async fn update_decision(
        &self,
        id: &DecisionId,
        patch: DecisionPatch,
    ) -> Result<Decision, DecisionError> {
        self.mutate(Collection::Decisions, |board| {
            board.update_decision(id, patch).cloned()
        })
        .await
    }

    pub async fn delete_decision(&self, id: &DecisionId) -> Result<Decision, DecisionError> {
        self.mutate(Collection::Decisions, |board| board.delete_decision(id))
            .await
    }

    pub async fn add_option(
        &self,
        decision_id: &DecisionId,
        new: NewOption,
    ) -> Result<DecisionOption, DecisionError> {
        self.mutate(Collection::Decisions, |board| {
            board.add_option(decision_id, new).cloned()
        })
        .await
    }

    pub async fn update_option(
        &self,
        decision_id: &DecisionId,
        option_id: &OptionId,
        patch: OptionPatch,
    ) -> Result<Decision, DecisionError> {
        self.mutate(Collection::Decisions, |board| {
            board.update_option(decision_id, option_id, patch).cloned()
        })
        .await
    }

    pub async fn remove_option(
        &self,
        decision_id: &DecisionId,
        option_id: &OptionId,
    ) -> Result<DecisionOption, DecisionError> {
        self.mutate(Collection::Decisions, |board| {
            board.remove_option(decision_id, option_id)
        })
        .await
    }

    pub async fn select_option(
        &self,
        decision_id: &DecisionId,
        option_id: &OptionId,
    ) -> Result<Decision, DecisionError> {
        let decision = self
            .mutate(Collection::Decisions, |board| {
                board.select_option(decision_id, option_id).cloned()
            })
            .await?;
        tracing::info!(decision_id = %decision_id, option_id = %option_id, "Decision completed");
        Ok(decision)
    }

    /// Applies `change` and persists the touched collection, restoring the
    /// board when either step fails.
    async fn mutate<T, F>(&self, collection: Collection, change: F) -> Result<T, DecisionError>
    where
        F: FnOnce(&mut DecisionBoard) -> Result<T, DecisionError>,
    {
        let mut board = self.board.write().await;
        let snapshot = board.clone();

        let output = change(&mut board)?;

        let saved = match collection {
            Collection::Rules => self.repository.save_rules(board.rules()).await,
            Collection::Decisions => self.repository.save_decisions(board.decisions()).await,
        };

        if let Err(e) = saved {
            tracing::error!(
                collection = ?collection,
                error = %e,
                "Failed to persist, rolling back"
            );
            *board = snapshot;
            return Err(DecisionError::storage(e.to_string()));
        }
        Ok(output)
    }
}
