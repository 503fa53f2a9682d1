//! Integration tests for league-server API

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use league_core::{Season, SeasonConfig, DEFAULT_ROSTER};
use league_server::{create_router, ServerState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let season = Season::in_memory(&DEFAULT_ROSTER, SeasonConfig::default().with_seed(99)).unwrap();
    let state = Arc::new(ServerState::new(season));
    create_router(state)
}

async fn send(app: &axum::Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri).await
}

async fn post(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::POST, uri).await
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, json) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["message"].as_str().unwrap().contains("running"));
}

#[tokio::test]
async fn test_status_endpoint() {
    let app = test_app();
    let (status, json) = get(&app, "/api/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["engine"], "rust");
}

#[tokio::test]
async fn test_teams_endpoints() {
    let app = test_app();

    let (status, json) = get(&app, "/api/teams").await;
    assert_eq!(status, StatusCode::OK);
    let teams = json.as_array().unwrap();
    assert_eq!(teams.len(), 4);
    assert_eq!(teams[0]["name"], "Chelsea");

    let (status, json) = get(&app, "/api/teams/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Manchester City");

    let (status, json) = get(&app, "/api/teams/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "not_found");
}

#[tokio::test]
async fn test_simulate_week_lazily_generates() {
    let app = test_app();

    let (_, json) = get(&app, "/api/matches").await;
    assert!(json.as_array().unwrap().is_empty());

    let (status, json) = post(&app, "/api/matches/simulate/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Successfully simulated week 1");
    let matches = json["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["played"], true);
    assert!(matches[0]["home_team"]["name"].is_string());
    assert!(json.get("predictions").is_none());

    let (_, json) = get(&app, "/api/matches").await;
    assert_eq!(json.as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_out_of_order_week_conflicts() {
    let app = test_app();

    let (status, json) = post(&app, "/api/matches/simulate/2").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["kind"], "precondition");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("previous weeks must be simulated first"));
}

#[tokio::test]
async fn test_invalid_week_is_bad_request() {
    let app = test_app();

    let (status, json) = post(&app, "/api/matches/simulate/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "validation");

    let (status, _) = get(&app, "/api/matches/week/-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/league/table/week/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_week_is_validation_error() {
    let app = test_app();

    let (status, json) = post(&app, "/api/matches/simulate/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "validation");
    assert!(json["error"].as_str().unwrap().contains("abc"));

    for uri in ["/api/matches/week/two", "/api/league/table/week/1.5"] {
        let (status, json) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["kind"], "validation", "{uri}");
    }

    // nothing was scheduled by the rejected request
    let (_, json) = get(&app, "/api/matches").await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_matches_once() {
    let app = test_app();

    let (status, json) = post(&app, "/api/matches/generate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["matches"].as_array().unwrap().len(), 12);

    let (status, json) = post(&app, "/api/matches/generate").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["kind"], "precondition");

    let (_, json) = get(&app, "/api/matches/week/4").await;
    let week = json.as_array().unwrap();
    assert_eq!(week.len(), 2);
    assert!(week.iter().all(|m| m["week"] == 4));
}

#[tokio::test]
async fn test_predictions_after_halfway() {
    let app = test_app();
    for week in 1..=3 {
        let (status, json) = post(&app, &format!("/api/matches/simulate/{week}")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.get("predictions").is_none());
    }

    let (status, json) = post(&app, "/api/matches/simulate/4").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .ends_with("and generated championship predictions"));
    assert_eq!(json["predictions"].as_array().unwrap().len(), 4);

    let (_, json) = get(&app, "/api/predictions").await;
    let predictions = json.as_array().unwrap();
    assert_eq!(predictions.len(), 4);
    assert_eq!(predictions[0]["predicted_position"], 1);
    assert!(predictions[0]["team"]["id"].is_number());
}

#[tokio::test]
async fn test_simulate_all_and_table() {
    let app = test_app();

    let (status, json) = post(&app, "/api/matches/simulate-all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["matches"].as_array().unwrap().len(), 12);
    assert!(json["predictions"].is_array());

    let (status, json) = get(&app, "/api/league/table").await;
    assert_eq!(status, StatusCode::OK);
    let table = json.as_array().unwrap();
    assert_eq!(table.len(), 4);
    for row in table {
        assert_eq!(row["played"], 6);
    }
    let points: Vec<u64> = table.iter().map(|r| r["points"].as_u64().unwrap()).collect();
    assert!(points.windows(2).all(|w| w[0] >= w[1]));

    let (_, json) = get(&app, "/api/league/table/week/1").await;
    for row in json.as_array().unwrap() {
        assert_eq!(row["played"], 1);
    }
}

#[tokio::test]
async fn test_generate_predictions_on_demand() {
    let app = test_app();
    post(&app, "/api/matches/simulate/1").await;

    let (status, json) = post(&app, "/api/predictions/generate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["predictions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_league_reset_keeps_matches() {
    let app = test_app();
    post(&app, "/api/matches/simulate/1").await;

    let (status, _) = post(&app, "/api/league/reset").await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = get(&app, "/api/league/table").await;
    assert!(json.as_array().unwrap().iter().all(|r| r["points"] == 0));

    let (_, json) = get(&app, "/api/matches").await;
    assert_eq!(json.as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_system_reset_clears_season() {
    let app = test_app();
    post(&app, "/api/matches/simulate-all").await;

    let (status, json) = post(&app, "/api/system/reset").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().starts_with("System reset successful"));

    let (_, json) = get(&app, "/api/matches").await;
    assert!(json.as_array().unwrap().is_empty());
    let (_, json) = get(&app, "/api/predictions").await;
    assert!(json.as_array().unwrap().is_empty());

    // the season can start again
    let (status, _) = post(&app, "/api/matches/simulate/1").await;
    assert_eq!(status, StatusCode::OK);
}
