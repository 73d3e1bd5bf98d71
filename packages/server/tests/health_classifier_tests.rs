//! Azure health classifier against a mock Azure OpenAI endpoint.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use server_core::common::pii::PiiType;
use server_core::kernel::{
    AzureHealthClassifier, AzureOpenAICredentials, BaseHealthClassifier, InMemorySubmissionStore,
    PiiService,
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEPLOYMENT: &str = "gpt-test";
const COMPLETIONS_PATH: &str = "/openai/deployments/gpt-test/chat/completions";

fn completion(content: &str) -> Value {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content }
        }],
        "usage": { "prompt_tokens": 40, "completion_tokens": 12, "total_tokens": 52 }
    })
}

fn classifier_for(server: &MockServer, timeout: Duration) -> AzureHealthClassifier {
    // Pasted endpoints often carry the API path; it must be stripped
    let endpoint = format!("{}/openai/v1/", server.uri());
    let creds = AzureOpenAICredentials::new(endpoint, "test-key", Some(DEPLOYMENT.to_string()));
    AzureHealthClassifier::from_credentials(&creds, timeout).unwrap()
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(query_param("api-version", "2024-02-15-preview"))
        .and(header("api-key", "test-key"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn locates_every_reported_term() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_partial_json(json!({
            "model": DEPLOYMENT,
            "max_tokens": 200,
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"detections":[{"term":"diabetes"},{"term":"Chest pain"}]}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let classifier = classifier_for(&server, Duration::from_secs(5));
    let text = "Diabetes since 2010, chest pain last week, diabetes stable";

    let detections = classifier.classify(text).await.unwrap();

    assert_eq!(detections.len(), 3);
    assert!(detections.iter().all(|d| d.pii_type == PiiType::Health));
    for d in &detections {
        assert_eq!(&text[d.start_index..d.end_index], d.original_value);
    }
    let values: Vec<_> = detections.iter().map(|d| d.original_value.as_str()).collect();
    assert!(values.contains(&"Diabetes"));
    assert!(values.contains(&"diabetes"));
    assert!(values.contains(&"chest pain"));
}

#[tokio::test]
async fn accepts_capitalised_fields_and_code_fences() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(completion(
            "```json\n{\"Detections\":[{\"Term\":\"asthma\"},{\"Term\":null},{\"Term\":\"  \"}]}\n```",
        )),
    )
    .await;

    let classifier = classifier_for(&server, Duration::from_secs(5));
    let detections = classifier.classify("Has asthma").await.unwrap();

    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].original_value, "asthma");
    assert_eq!(detections[0].start_index, 4);
}

#[tokio::test]
async fn term_missing_from_text_yields_nothing() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(completion(r#"{"detections":[{"term":"hypertension"}]}"#)),
    )
    .await;

    let classifier = classifier_for(&server, Duration::from_secs(5));

    assert!(classifier.classify("All good today").await.unwrap().is_empty());
}

#[tokio::test]
async fn server_error_is_reported() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(500).set_body_string("boom")).await;

    let classifier = classifier_for(&server, Duration::from_secs(5));

    assert!(classifier.classify("Has asthma").await.is_err());
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_string("<html>")).await;

    let classifier = classifier_for(&server, Duration::from_secs(5));

    assert!(classifier.classify("Has asthma").await.is_err());
}

#[tokio::test]
async fn malformed_content_is_reported() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(completion("asthma, probably")),
    )
    .await;

    let classifier = classifier_for(&server, Duration::from_secs(5));

    assert!(classifier.classify("Has asthma").await.is_err());
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(completion(r#"{"detections":[{"term":"asthma"}]}"#))
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let classifier = classifier_for(&server, Duration::from_millis(200));

    assert!(classifier.classify("Has asthma").await.is_err());
}

#[tokio::test]
async fn blank_text_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let classifier = classifier_for(&server, Duration::from_secs(5));

    assert!(classifier.classify("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn service_degrades_when_endpoint_fails() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(503)).await;

    let classifier: Arc<dyn BaseHealthClassifier> =
        Arc::new(classifier_for(&server, Duration::from_secs(5)));
    let pii = PiiService::new(
        Arc::new(InMemorySubmissionStore::new()),
        Some(classifier),
        Duration::from_secs(5),
    );

    let chosen = pii.classifier_for(None);
    let outcome = pii
        .submit("Has asthma, mail a@b.co", chosen.as_deref())
        .await
        .unwrap();

    assert_eq!(outcome.classifications.len(), 1);
    assert_eq!(outcome.classifications[0].tag, PiiType::Email);
    assert!(outcome.tokenized_text.starts_with("Has asthma, mail {EMAIL_TOKEN_"));
}

#[tokio::test]
async fn request_credentials_reach_their_endpoint() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(completion(r#"{"detections":[{"term":"flu"}]}"#)),
    )
    .await;

    let pii = PiiService::new(
        Arc::new(InMemorySubmissionStore::new()),
        None,
        Duration::from_secs(5),
    );
    let creds = AzureOpenAICredentials::new(server.uri(), "test-key", Some(DEPLOYMENT.to_string()));

    let chosen = pii.classifier_for(Some(&creds));
    let detections = pii.detect("Down with the flu", chosen.as_deref()).await;

    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].pii_type, PiiType::Health);
    assert_eq!(detections[0].original_value, "flu");
}
