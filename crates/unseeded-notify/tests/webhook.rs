//! Webhook delivery against a mock endpoint.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;
use unseeded_config::WebhookConfig;
use unseeded_notify::{NotifyError, WebhookNotifier};

fn notifier(server: &MockServer) -> WebhookNotifier {
    let config = WebhookConfig {
        url: format!("{}/hook", server.base_url()),
        title: Some("Cleanup".to_string()),
        timeout_secs: 5,
    };
    WebhookNotifier::from_config(&config)
        .expect("notifier")
        .with_backoff_base(Duration::from_millis(1))
}

#[tokio::test]
async fn posts_title_and_text() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/hook")
            .json_body(json!({ "title": "Cleanup", "text": "report body" }));
        then.status(200);
    });

    notifier(&server).send("report body").await?;

    mock.assert();
    Ok(())
}

#[tokio::test]
async fn server_errors_are_retried_three_times() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/hook");
        then.status(503);
    });

    let err = notifier(&server)
        .send("report")
        .await
        .expect_err("delivery should fail");

    mock.assert_hits(3);
    assert!(matches!(
        err,
        NotifyError::Status {
            attempts: 3,
            status: 503
        }
    ));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST).path("/hook");
        then.status(400);
    });

    let err = notifier(&server)
        .send("report")
        .await
        .expect_err("delivery should fail");

    mock.assert_hits(1);
    assert!(matches!(
        err,
        NotifyError::Status {
            attempts: 1,
            status: 400
        }
    ));
}
