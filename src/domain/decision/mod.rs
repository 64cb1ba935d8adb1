//! Decision-maker domain.
//!
//! User-authored rules, decisions with options, the gradient score of an
//! option and the recommendation cascade that picks the best option for the
//! current period of the day.

mod aggregate;
mod board;
mod errors;
mod impact;
mod option;
mod recommender;
mod rule;
mod scoring;
mod time_of_day;

pub use aggregate::{Decision, DecisionPatch, NewDecision};
pub use board::DecisionBoard;
pub use errors::DecisionError;
pub use impact::Impact;
pub use option::{DecisionOption, NewOption, OptionPatch};
pub use recommender::{active_rules, recommend, Recommendation};
pub use rule::{
    DecisionRule, NewRule, RulePatch, HIGH_PRIORITY_THRESHOLD, MAX_PRIORITY, MIN_PRIORITY,
};
pub use scoring::{gradient_score, GradientFactors, FACTOR_MAX, FACTOR_MIN};
pub use time_of_day::{DayPeriod, TimeOfDay};
