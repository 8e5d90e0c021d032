//! End-to-end sessions over a real WebSocket on loopback.

use base64::Engine as _;
use base64::engine::general_purpose;
use dialogue::{CancelSignal, DialogueClient};
use errors::ErrorKind;
use testing::{ScriptedWsServer, error_frame, progress_frame, stream_frames, test_config};

#[tokio::test]
async fn test_guide_over_websocket() {
    let server = ScriptedWsServer::start(stream_frames(&["# Word Analysis\n", "学: learn\n", "# Complete Translation\nTo learn."]))
        .await
        .unwrap();
    let config = test_config(&server.host());
    let client = DialogueClient::from_config(&config).unwrap();

    let answer = client
        .request_guide("学而时习之", "en", &CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(
        answer.full_text,
        "# Word Analysis\n学: learn\n# Complete Translation\nTo learn."
    );
    let sections = answer.sections();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[1].heading.as_deref(), Some("Complete Translation"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.uri.starts_with("/v1.1/chat?"));

    let query = request.query_pairs();
    let keys: Vec<&str> = query.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["authorization", "date", "host"]);
    assert_eq!(query[2].1, server.host());
    assert!(query[1].1.ends_with(" GMT"));

    let descriptor = general_purpose::STANDARD.decode(&query[0].1).unwrap();
    let descriptor = String::from_utf8(descriptor).unwrap();
    let api_key = config.credentials.api_key.as_deref().unwrap();
    assert!(descriptor.starts_with(&format!("api_key=\"{api_key}\", algorithm=\"hmac-sha256\"")));
    assert!(descriptor.contains("headers=\"host date request-line\""));

    let payload = request.payload_json().unwrap();
    assert_eq!(payload["header"]["app_id"], config.credentials.app_id.clone().unwrap());
    assert_eq!(payload["header"]["uid"], answer.session_uid);
}

#[tokio::test]
async fn test_signature_verifies_against_recorded_date() {
    use hmac::{Hmac, KeyInit, Mac};
    use sha2::Sha256;

    let server = ScriptedWsServer::start(stream_frames(&["ok"])).await.unwrap();
    let config = test_config(&server.host());
    let client = DialogueClient::from_config(&config).unwrap();
    client
        .request_translation("道可道", "fr", &CancelSignal::new())
        .await
        .unwrap();

    let request = &server.requests()[0];
    let query = request.query_pairs();
    let date = &query[1].1;

    let canonical = format!("host: {}\ndate: {}\nGET /v1.1/chat HTTP/1.1", server.host(), date);
    let mut mac = Hmac::<Sha256>::new_from_slice(config.credentials.api_secret.as_deref().unwrap().as_bytes()).unwrap();
    mac.update(canonical.as_bytes());
    let expected = general_purpose::STANDARD.encode(&mac.finalize().into_bytes()[..]);

    let descriptor = String::from_utf8(general_purpose::STANDARD.decode(&query[0].1).unwrap()).unwrap();
    assert!(descriptor.ends_with(&format!("signature=\"{expected}\"")));
}

#[tokio::test]
async fn test_server_rejection_over_websocket() {
    let server = ScriptedWsServer::start(vec![error_frame(10005, "app id authorization failed")])
        .await
        .unwrap();
    let client = DialogueClient::from_config(&test_config(&server.host())).unwrap();

    let err = client
        .request_guide("text", "en", &CancelSignal::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteRejected);
}

#[tokio::test]
async fn test_server_close_before_final_frame() {
    let server = ScriptedWsServer::start_closing(vec![progress_frame("half")])
        .await
        .unwrap();
    let client = DialogueClient::from_config(&test_config(&server.host())).unwrap();

    let err = client
        .request_guide("text", "en", &CancelSignal::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportError);
}

#[tokio::test]
async fn test_nothing_listening_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);

    let client = DialogueClient::from_config(&test_config(&host)).unwrap();
    let err = client
        .request_guide("text", "en", &CancelSignal::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportError);
}
