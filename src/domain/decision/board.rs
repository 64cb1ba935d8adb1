//! DecisionBoard - the in-memory rule and decision collections.
//!
//! Every mutation replaces or edits an element of one of the two
//! collections; persistence of the whole collection is the caller's job.

use crate::domain::foundation::{DecisionId, OptionId, RuleId};

use super::{
    active_rules, recommend, Decision, DecisionError, DecisionOption, DecisionPatch, DecisionRule,
    DayPeriod, NewDecision, NewOption, NewRule, OptionPatch, Recommendation, RulePatch,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionBoard {
    rules: Vec<DecisionRule>,
    decisions: Vec<Decision>,
}

impl DecisionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a board from previously persisted collections.
    pub fn from_parts(rules: Vec<DecisionRule>, decisions: Vec<Decision>) -> Self {
        Self { rules, decisions }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rules
    // ─────────────────────────────────────────────────────────────────────────

    pub fn rules(&self) -> &[DecisionRule] {
        &self.rules
    }

    pub fn rule(&self, id: &RuleId) -> Option<&DecisionRule> {
        self.rules.iter().find(|r| &r.id == id)
    }

    pub fn add_rule(&mut self, new: NewRule) -> Result<&DecisionRule, DecisionError> {
        let rule = DecisionRule::create(new)?;
        self.rules.push(rule);
        Ok(&self.rules[self.rules.len() - 1])
    }

    pub fn update_rule(
        &mut self,
        id: &RuleId,
        patch: RulePatch,
    ) -> Result<&DecisionRule, DecisionError> {
        let rule = self.rule_mut(id)?;
        rule.apply(patch)?;
        Ok(rule)
    }

    pub fn toggle_rule(&mut self, id: &RuleId) -> Result<&DecisionRule, DecisionError> {
        let rule = self.rule_mut(id)?;
        rule.active = !rule.active;
        Ok(rule)
    }

    pub fn delete_rule(&mut self, id: &RuleId) -> Result<DecisionRule, DecisionError> {
        let index = self
            .rules
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| DecisionError::RuleNotFound(id.clone()))?;
        Ok(self.rules.remove(index))
    }

    /// Active rules applicable to any of `categories` (or uncategorized).
    pub fn active_rules(&self, categories: &[String]) -> Vec<&DecisionRule> {
        active_rules(&self.rules, categories)
    }

    fn rule_mut(&mut self, id: &RuleId) -> Result<&mut DecisionRule, DecisionError> {
        self.rules
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| DecisionError::RuleNotFound(id.clone()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Decisions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn decision(&self, id: &DecisionId) -> Option<&Decision> {
        self.decisions.iter().find(|d| d.id() == id)
    }

    pub fn pending_decisions(&self) -> Vec<&Decision> {
        self.decisions.iter().filter(|d| !d.is_completed()).collect()
    }

    pub fn completed_decisions(&self) -> Vec<&Decision> {
        self.decisions.iter().filter(|d| d.is_completed()).collect()
    }

    pub fn add_decision(&mut self, new: NewDecision) -> Result<&Decision, DecisionError> {
        let decision = Decision::create(new)?;
        self.decisions.push(decision);
        Ok(&self.decisions[self.decisions.len() - 1])
    }

    pub fn update_decision(
        &mut self,
        id: &DecisionId,
        patch: DecisionPatch,
    ) -> Result<&Decision, DecisionError> {
        let decision = self.decision_mut(id)?;
        decision.apply(patch)?;
        Ok(decision)
    }

    pub fn delete_decision(&mut self, id: &DecisionId) -> Result<Decision, DecisionError> {
        let index = self
            .decisions
            .iter()
            .position(|d| d.id() == id)
            .ok_or_else(|| DecisionError::NotFound(id.clone()))?;
        Ok(self.decisions.remove(index))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Options
    // ─────────────────────────────────────────────────────────────────────────

    pub fn add_option(
        &mut self,
        decision_id: &DecisionId,
        new: NewOption,
    ) -> Result<&DecisionOption, DecisionError> {
        let decision = self.decision_mut(decision_id)?;
        let option_id = decision.add_option(new)?;
        decision
            .option(&option_id)
            .ok_or_else(|| DecisionError::OptionNotFound {
                decision_id: decision_id.clone(),
                option_id,
            })
    }

    pub fn update_option(
        &mut self,
        decision_id: &DecisionId,
        option_id: &OptionId,
        patch: OptionPatch,
    ) -> Result<&Decision, DecisionError> {
        let decision = self.decision_mut(decision_id)?;
        decision.update_option(option_id, patch)?;
        Ok(decision)
    }

    pub fn remove_option(
        &mut self,
        decision_id: &DecisionId,
        option_id: &OptionId,
    ) -> Result<DecisionOption, DecisionError> {
        self.decision_mut(decision_id)?.remove_option(option_id)
    }

    /// Selects an option, completing the decision.
    pub fn select_option(
        &mut self,
        decision_id: &DecisionId,
        option_id: &OptionId,
    ) -> Result<&Decision, DecisionError> {
        let decision = self.decision_mut(decision_id)?;
        decision.select_option(option_id)?;
        Ok(decision)
    }

    /// Recommended option of a decision for `period`.
    ///
    /// `None` for unknown decisions and when no option is available.
    pub fn recommended_option(
        &self,
        decision_id: &DecisionId,
        period: DayPeriod,
    ) -> Option<Recommendation> {
        let decision = self.decision(decision_id)?;
        recommend(decision.options(), &self.rules, period)
    }

    fn decision_mut(&mut self, id: &DecisionId) -> Result<&mut Decision, DecisionError> {
        self.decisions
            .iter_mut()
            .find(|d| d.id() == id)
            .ok_or_else(|| DecisionError::NotFound(id.clone()))
    }
}
