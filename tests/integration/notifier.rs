//! Notification sinks against a mock webhook

use crate::test_utils::start_time;
use chrono::Utc;
use cipherwatch::error::DetectorError;
use cipherwatch::models::signal::{AlertEvent, AlertKind, ScreenCondition};
use cipherwatch::models::timeframe::Timeframe;
use cipherwatch::services::notifier::{LogNotifier, NotificationSink, WebhookNotifier};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn alert() -> AlertEvent {
    AlertEvent {
        symbol: "BTCUSDT".to_string(),
        timeframes: vec![Timeframe::Hour4],
        kind: AlertKind::Screen(ScreenCondition::BuyOpportunity),
        bar_timestamp: start_time(),
        snapshot: Vec::new(),
        detected_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_webhook_posts_destination_and_alert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(serde_json::json!({
            "destination": "ops",
            "alert": {
                "symbol": "BTCUSDT",
                "timeframes": ["4h"],
                "kind": { "type": "screen", "name": "buy_opportunity" }
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(format!("{}/hook", server.uri())).unwrap();
    notifier.send("ops", &alert()).await.unwrap();
}

#[tokio::test]
async fn test_webhook_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(format!("{}/hook", server.uri())).unwrap();
    let err = notifier.send("ops", &alert()).await.unwrap_err();
    match err {
        DetectorError::NotificationDelivery {
            destination,
            message,
        } => {
            assert_eq!(destination, "ops");
            assert!(message.contains("502"));
        }
        other => panic!("expected NotificationDelivery, got {:?}", other),
    }
}

#[tokio::test]
async fn test_log_notifier_always_succeeds() {
    assert!(LogNotifier.send("default", &alert()).await.is_ok());
}
