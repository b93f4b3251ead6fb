/*!
 * Tests for the translation client driven by the scheduler
 */

use std::sync::Arc;
use std::time::Duration;

use dirtrans::output::OutputResolver;
use dirtrans::providers::mock::{MockProvider, MockReply};
use dirtrans::providers::CompletionRequest;
use dirtrans::scheduler::BatchScheduler;
use dirtrans::translation::{RetryPolicy, TranslationClient, Translator};

use crate::common;

/// Uppercases single requests; answers batch requests with a fenced JSON array
fn uppercase_service(request: &CompletionRequest) -> String {
    if request.system.contains("JSON array") {
        let labels: Vec<String> = request.user.lines().map(|line| line.to_uppercase()).collect();
        format!("```json\n{}\n```", serde_json::to_string(&labels).unwrap())
    } else {
        format!("  {}\n", request.user.to_uppercase())
    }
}

fn client(provider: MockProvider) -> TranslationClient {
    TranslationClient::new(Arc::new(provider), "mock-model", "English")
        .with_retry_policy(RetryPolicy::fixed(Duration::ZERO))
}

#[tokio::test]
async fn test_scheduler_withClient_shouldWarmUpThenBatch() {
    let input = common::create_temp_dir().unwrap();
    let output = common::create_temp_dir().unwrap();
    let grouped = common::create_input_tree(input.path(), &["alpha", "beta", "gamma", "delta"]).unwrap();

    let provider = MockProvider::working().with_custom_response(uppercase_service);
    let observer = provider.clone();

    let summary = BatchScheduler::new(client(provider), grouped, OutputResolver::new(output.path()), &[200, 1], 0)
        .run()
        .await;

    assert_eq!(summary.written, 4);
    // one warm-up request, then one batch for the rest
    assert_eq!(observer.request_count(), 2);
    let batch = &observer.requests()[1];
    assert_eq!(batch.user, "beta\ndelta\ngamma");
    for label in ["ALPHA", "BETA", "DELTA", "GAMMA"] {
        assert!(output.path().join(format!("{}.csv", label)).exists());
    }
}

#[tokio::test]
async fn test_translateSingle_afterRateLimits_shouldReturnLabel() {
    let provider = MockProvider::scripted(vec![
        MockReply::RateLimited,
        MockReply::RateLimited,
        MockReply::Text("Athletics".to_string()),
    ]);
    let observer = provider.clone();

    assert_eq!(client(provider).translate_single("Αθλητισμός").await, "Athletics");
    assert_eq!(observer.request_count(), 3);
}

#[tokio::test]
async fn test_translateBatch_withProseAroundArray_shouldParse() {
    let provider = MockProvider::scripted(vec![MockReply::Text(
        "Here you go: [\" Athletics \", \"History\"] Hope it helps".to_string(),
    )]);

    let labels = client(provider)
        .translate_batch(&["Αθλητισμός".to_string(), "Ιστορία".to_string()])
        .await;

    assert_eq!(labels, Some(vec!["Athletics".to_string(), "History".to_string()]));
}

#[tokio::test]
async fn test_translateBatch_withEmptyOrServerError_shouldReturnNone() {
    let empty = MockProvider::empty();
    assert_eq!(client(empty).translate_batch(&["a".to_string()]).await, None);

    let failing = MockProvider::scripted(vec![MockReply::Fail]);
    assert_eq!(client(failing).translate_batch(&["a".to_string()]).await, None);
}

#[tokio::test]
async fn test_translateBatch_withEmptyStrings_shouldKeepThem() {
    let provider = MockProvider::scripted(vec![MockReply::Text(r#"["", "Football"]"#.to_string())]);

    let labels = client(provider)
        .translate_batch(&["a".to_string(), "b".to_string()])
        .await;

    assert_eq!(labels, Some(vec![String::new(), "Football".to_string()]));
}
