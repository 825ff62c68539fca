use httpmock::prelude::*;
use rullino_core::RullinoError;
use rullino_icloud::adapter::{CloudKitTransport, HttpTransport};
use serde_json::json;
use url::Url;

fn transport(server: &MockServer) -> HttpTransport {
    let endpoint = Url::parse(&server.url("/database/1/com.apple.photos.cloud/production/private"))
        .unwrap();
    HttpTransport::new(
        endpoint,
        vec![("dsid".to_string(), "12345".to_string())],
    )
}

#[tokio::test]
async fn post_appends_the_path_and_session_params() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/database/1/com.apple.photos.cloud/production/private/records/query")
                .query_param("dsid", "12345");
            then.status(200).json_body(json!({ "records": [] }));
        })
        .await;

    let response = transport(&server)
        .post(
            "records/query",
            &json!({ "query": { "filterBy": [{ "fieldName": "startRank" }] } }),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response["records"], json!([]));
}

#[tokio::test]
async fn non_success_statuses_become_transport_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(421).body("gone");
        })
        .await;

    let err = transport(&server)
        .post("records/query", &json!({}))
        .await
        .unwrap_err();
    match err {
        RullinoError::Transport { connector, msg } => {
            assert_eq!(connector, "rullino-icloud");
            assert!(msg.contains("421"), "message was: {msg}");
        }
        other => panic!("expected transport error, got {other}"),
    }
}

#[tokio::test]
async fn fetch_bytes_returns_the_raw_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rendition");
            then.status(200).body(b"raw-bytes");
        })
        .await;

    let bytes = transport(&server)
        .fetch_bytes(&server.url("/rendition"))
        .await
        .unwrap();
    assert_eq!(bytes, b"raw-bytes");
}
