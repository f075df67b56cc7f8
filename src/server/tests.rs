use super::*;
use crate::engine::NO_MATCH_REPLY;

fn test_state() -> AppState {
    let engine = RetrievalEngine::build(
        vec![
            "capillary loyalty program overview".to_string(),
            "capillary api authentication guide".to_string(),
        ],
        0.1,
    )
    .expect("test corpus is usable");

    AppState {
        engine: Arc::new(engine),
        excerpt_chars: 1000,
    }
}

#[tokio::test]
async fn ask_returns_best_matching_excerpt() {
    let state = test_state();

    let response = handle_ask(
        State(state),
        Json(AskRequest {
            message: "how do I authenticate with the api".to_string(),
        }),
    )
    .await;

    let Json(reply) = response.expect("matching query should succeed");
    assert_eq!(reply.reply, "capillary api authentication guide");
}

#[tokio::test]
async fn ask_renders_no_match_as_normal_reply() {
    let state = test_state();

    let response = handle_ask(
        State(state),
        Json(AskRequest {
            message: "unrelated gibberish xyzzy plugh".to_string(),
        }),
    )
    .await;

    let Json(reply) = response.expect("no-match is not an HTTP error");
    assert_eq!(reply.reply, NO_MATCH_REPLY);
}

#[tokio::test]
async fn empty_message_is_a_bad_request() {
    let state = test_state();

    let response = handle_ask(
        State(state.clone()),
        Json(AskRequest {
            message: String::new(),
        }),
    )
    .await;
    let error = response.err().expect("empty message must be rejected");
    assert_eq!(error.status, StatusCode::BAD_REQUEST);

    let response = handle_ask(
        State(state),
        Json(AskRequest {
            message: "   \n ".to_string(),
        }),
    )
    .await;
    assert!(response.is_err());
}

#[tokio::test]
async fn excerpt_respects_configured_length() {
    let engine = RetrievalEngine::build(vec!["token ".repeat(500)], 0.1)
        .expect("test corpus is usable");
    let state = AppState {
        engine: Arc::new(engine),
        excerpt_chars: 120,
    };

    let response = handle_ask(
        State(state),
        Json(AskRequest {
            message: "token".to_string(),
        }),
    )
    .await;

    let Json(reply) = response.expect("matching query should succeed");
    assert_eq!(reply.reply.chars().count(), 120);
}

#[tokio::test]
async fn health_reports_name_and_version() {
    let Json(health) = handle_health().await;
    assert_eq!(health.name, "docs-chat");
    assert!(!health.version.is_empty());
}
