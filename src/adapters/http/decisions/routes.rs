//! Route configuration for rule and decision endpoints.

use axum::routing::{get, patch, post};
use axum::Router;

use super::super::AppState;
use super::handlers::{
    add_option, create_decision, create_rule, delete_decision, delete_rule, get_decision,
    list_decisions, list_rules, recommendation, remove_option, select_option, toggle_rule,
    update_decision, update_option, update_rule,
};

/// Creates the decisions router.
pub fn decisions_router() -> Router<AppState> {
    Router::new()
        .route("/api/rules", get(list_rules).post(create_rule))
        .route("/api/rules/:id", patch(update_rule).delete(delete_rule))
        .route("/api/rules/:id/toggle", post(toggle_rule))
        .route("/api/decisions", get(list_decisions).post(create_decision))
        .route(
            "/api/decisions/:id",
            get(get_decision)
                .patch(update_decision)
                .delete(delete_decision),
        )
        .route("/api/decisions/:id/options", post(add_option))
        .route(
            "/api/decisions/:id/options/:option_id",
            patch(update_option).delete(remove_option),
        )
        .route("/api/decisions/:id/select", post(select_option))
        .route("/api/decisions/:id/recommendation", get(recommendation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::test_support::{json_request, read_json, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn create_decision_with_options(app: &Router) -> Value {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/decisions",
                json!({
                    "title": "Tarde livre",
                    "options": [
                        {"title": "OptionA", "impact": "medium", "timeOfDay": "day",
                         "categories": ["bem-estar"],
                         "gradientFactors": {"urgency": 5, "importance": 5, "confidence": 5,
                                             "emotionalImpact": 5, "longTermValue": 5}},
                        {"title": "OptionB", "impact": "medium", "timeOfDay": "day",
                         "categories": [],
                         "gradientFactors": {"urgency": 9, "importance": 9, "confidence": 9,
                                             "emotionalImpact": 9, "longTermValue": 9}}
                    ]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        read_json(response).await
    }

    #[tokio::test]
    async fn recommendation_follows_high_priority_rule() {
        let app = decisions_router().with_state(test_state().await);

        let rule = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/rules",
                json!({"title": "Cuidar de mim", "priority": 10, "category": "bem-estar"}),
            ))
            .await
            .unwrap();
        assert_eq!(rule.status(), StatusCode::CREATED);

        let decision = create_decision_with_options(&app).await;
        let id = decision["id"].as_str().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/decisions/{}/recommendation?period=day", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["period"], "day");
        assert_eq!(body["recommendation"]["option"]["title"], "OptionA");
    }

    #[tokio::test]
    async fn selecting_twice_conflicts() {
        let app = decisions_router().with_state(test_state().await);
        let decision = create_decision_with_options(&app).await;
        let id = decision["id"].as_str().unwrap();
        let option_id = decision["options"][0]["id"].as_str().unwrap();
        let uri = format!("/api/decisions/{}/select", id);

        let first = app
            .clone()
            .oneshot(json_request("POST", &uri, json!({"optionId": option_id})))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(json_request("POST", &uri, json!({"optionId": option_id})))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(read_json(second).await["code"], "DECISION_COMPLETED");
    }

    #[tokio::test]
    async fn unknown_decision_is_404() {
        let app = decisions_router().with_state(test_state().await);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/decisions/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_rule_title_is_400() {
        let app = decisions_router().with_state(test_state().await);
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/rules",
                json!({"title": "  ", "priority": 5}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn pending_filter_excludes_completed() {
        let app = decisions_router().with_state(test_state().await);
        let decision = create_decision_with_options(&app).await;
        let id = decision["id"].as_str().unwrap();
        let option_id = decision["options"][1]["id"].as_str().unwrap();
        app.clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/decisions/{}/select", id),
                json!({"optionId": option_id}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/decisions?status=pending")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(read_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn out_of_range_priority_is_json_400() {
        let app = decisions_router().with_state(test_state().await);
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/rules",
                json!({"title": "x", "priority": 300}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
        let body = read_json(response).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert!(body["message"].as_str().unwrap().contains("priority"));
    }

    #[tokio::test]
    async fn unparseable_body_is_json_400() {
        let app = decisions_router().with_state(test_state().await);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/decisions")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn unknown_period_is_json_400() {
        let app = decisions_router().with_state(test_state().await);
        let decision = create_decision_with_options(&app).await;
        let id = decision["id"].as_str().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/decisions/{}/recommendation?period=any", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["code"], "VALIDATION_FAILED");
    }
}
