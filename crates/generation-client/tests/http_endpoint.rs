use generation_client::{GenerationError, HttpGenerationClient, ReplyGenerator};
use mailassist_core_types::{ExtractionResult, GenerationRequest, GenerationSettings, Tone};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> GenerationRequest {
    let extraction = ExtractionResult {
        sender_name: "Alice".into(),
        recipient_name: String::new(),
        subject: String::new(),
        body_text: "Can we move the call?".into(),
    };
    GenerationRequest::new(
        &extraction,
        GenerationSettings {
            tone: Tone::Casual,
            include_names: true,
            include_signature: false,
            keep_formatting: false,
        },
    )
}

#[tokio::test]
async fn posts_request_and_returns_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/email/generate"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "emailContent": "Can we move the call?",
            "tone": "casual",
            "senderName": "Alice",
            "includeNames": true,
            "includeSignature": false,
            "keepFormatting": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("  Sure, <b>Thursday</b> works.\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpGenerationClient::new(format!("{}/api/email/generate", server.uri())).unwrap();
    let reply = client.generate(&request()).await.unwrap();

    assert_eq!(reply, "  Sure, <b>Thursday</b> works.\n");
}

#[tokio::test]
async fn non_success_status_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpGenerationClient::new(format!("{}/api/email/generate", server.uri())).unwrap();
    let err = client.generate(&request()).await.unwrap_err();

    assert_eq!(err, GenerationError::Status { status: 503 });
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_failure() {
    // Reserve a free port, then close it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/api/email/generate", listener.local_addr().unwrap());
    drop(listener);

    let client = HttpGenerationClient::new(endpoint).unwrap();
    let err = client.generate(&request()).await.unwrap_err();

    assert!(matches!(err, GenerationError::Transport(_)));
}
