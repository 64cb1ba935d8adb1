//! Request and response bodies for decision endpoints.
//!
//! Rules, decisions and options are returned as their domain JSON; only the
//! envelopes below are specific to HTTP.

use serde::{Deserialize, Serialize};

use crate::domain::decision::{DayPeriod, Recommendation};
use crate::domain::foundation::OptionId;

/// `status` filter for `GET /api/decisions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDecisionsQuery {
    pub status: Option<DecisionStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRulesQuery {
    /// Comma-separated categories; when present only active rules that
    /// apply to one of them are returned.
    pub categories: Option<String>,
}

impl ListRulesQuery {
    pub fn category_list(&self) -> Option<Vec<String>> {
        self.categories.as_ref().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptionRequest {
    pub option_id: OptionId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationQuery {
    /// Defaults to the server's current local period.
    pub period: Option<DayPeriod>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub period: DayPeriod,
    /// `null` when no option fits the period.
    pub recommendation: Option<Recommendation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_split_and_trimmed() {
        let query = ListRulesQuery {
            categories: Some("saude, trabalho,,".to_string()),
        };
        assert_eq!(
            query.category_list(),
            Some(vec!["saude".to_string(), "trabalho".to_string()])
        );
        assert_eq!(ListRulesQuery::default().category_list(), None);
    }

    #[test]
    fn select_request_uses_camel_case() {
        let req: SelectOptionRequest = serde_json::from_str(r#"{"optionId":"o1"}"#).unwrap();
        assert_eq!(req.option_id, OptionId::from("o1"));
    }
}
