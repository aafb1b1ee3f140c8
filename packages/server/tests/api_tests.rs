//! Integration tests for the HTTP surface over in-memory stores.
//!
//! - Ingestion creates collections with one fresh-keyed entry per item
//! - apply_prompt writes provenance-chained entries
//! - Research tasks move through webhook and lazy expiry
//! - Tools are listed with schemas and invocable by name

mod common;

use std::collections::HashSet;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use pipeline::testing::{collection, seed, MockFetcher, MockGenerator, MockResearcher};
use pipeline::{ResearchConfig, ResearchTask};
use serde_json::json;
use server_core::kernel::TestDependencies;

use crate::common::ApiClient;

// =============================================================================
// Test Helpers
// =============================================================================

fn client(deps: TestDependencies) -> ApiClient {
    ApiClient::new(deps.into_deps())
}

async fn seeded_reviews(deps: &TestDependencies) {
    seed(
        deps.store.as_ref(),
        &collection(
            "reviews",
            &[(&["k1"], "Great product"), (&["k2"], "Bad shipping")],
        ),
    )
    .await
    .expect("Failed to seed reviews");
}

// =============================================================================
// Health and collections
// =============================================================================

#[tokio::test]
async fn test_health_reports_memory_backend() {
    let api = client(TestDependencies::new());

    let body = api.get("/health").await.ok();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["backend"], "memory");
    assert_eq!(body["tools"], 6);
}

#[tokio::test]
async fn test_input_strings_creates_collection() {
    let api = client(TestDependencies::new());

    let body = api
        .post(
            "/input_data",
            json!({
                "created_object_name": "notes",
                "data_type": "strings",
                "input_data": ["first", {"n": 2}]
            }),
        )
        .await
        .ok();
    assert_eq!(body["processed"], 2);

    let notes = api.get("/objects/notes").await;
    assert_eq!(notes.status, StatusCode::OK);
    assert_eq!(notes.get("object_name"), "notes");
    assert_eq!(notes.get("data.0.value"), "first");
    assert_eq!(notes.get("data.1.value"), r#"{"n":2}"#);

    let first_keys = notes.get("data.0.key_list");
    let second_keys = notes.get("data.1.key_list");
    assert_eq!(first_keys.as_array().map(Vec::len), Some(1));
    assert_ne!(first_keys, second_keys);
}

#[tokio::test]
async fn test_input_empty_list_still_creates_collection() {
    let api = client(TestDependencies::new());

    api.post(
        "/input_data",
        json!({"created_object_name": "empty", "data_type": "strings", "input_data": []}),
    )
    .await
    .ok();

    let listed = api.get("/objects").await.ok();
    assert_eq!(listed["objects"], json!(["empty"]));
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn test_scrape_urls_records_failures() {
    let fetcher = MockFetcher::new()
        .with_page("https://ok.example", "hello page")
        .with_failure("https://down.example", "connection refused");
    let api = client(TestDependencies::new().mock_fetcher(fetcher));

    let body = api
        .post(
            "/scrape_urls",
            json!({"object_name": "pages", "urls": "ok.example, https://down.example"}),
        )
        .await
        .ok();

    assert_eq!(body["urls_processed"], 2);
    assert_eq!(body["rows_created"], 1);

    let pages = api.get("/objects/pages").await;
    let first = pages.get("data.0.value");
    let second = pages.get("data.1.value");
    assert_eq!(
        first.as_str(),
        Some("--- Content from https://ok.example ---\nhello page")
    );
    assert!(second
        .as_str()
        .is_some_and(|v| v.starts_with("--- Failed to fetch from https://down.example")));
}

#[tokio::test]
async fn test_missing_and_deleted_collections() {
    let deps = TestDependencies::new();
    seeded_reviews(&deps).await;
    let api = client(deps);

    let missing = api.get("/objects/nope").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(missing.get("error").as_str().is_some());

    let deleted = api.delete("/objects/reviews").await.ok();
    assert_eq!(deleted["deleted"], true);

    let again = api.delete("/objects/reviews").await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_return_data_finds_related_collections() {
    let deps = TestDependencies::new();
    seed(
        deps.store.as_ref(),
        &collection("names", &[(&["u1"], "Ann"), (&["u2"], "Bob")]),
    )
    .await
    .unwrap();
    seed(
        deps.store.as_ref(),
        &collection("emails", &[(&["u1", "e1"], "ann@x.org")]),
    )
    .await
    .unwrap();
    seed(
        deps.store.as_ref(),
        &collection("unrelated", &[(&["z9"], "noise")]),
    )
    .await
    .unwrap();
    let api = client(deps);

    let body = api.get("/return_data/names").await.ok();

    assert_eq!(body["object_name"], "names");
    assert_eq!(body["total_objects"], 2);
    assert_eq!(body["related_objects"][0]["object_name"], "emails");
    assert_eq!(body["shared_keys_summary"][0]["shared_keys"], json!(["u1"]));
    assert_eq!(body["shared_keys_summary"][0]["shared_key_count"], 1);
    assert_eq!(body["primary_object_keys"], json!(["u1", "u2"]));
}

// =============================================================================
// Apply prompt
// =============================================================================

#[tokio::test]
async fn test_apply_prompt_chains_provenance() {
    let generator = MockGenerator::new()
        .with_response("Summarize: Great product", json!({"summary": "positive"}))
        .with_response("Summarize: Bad shipping", json!({"summary": "negative"}));
    let deps = TestDependencies::new().mock_generator(generator.clone());
    seeded_reviews(&deps).await;
    let api = client(deps);

    let body = api
        .post(
            "/apply_prompt",
            json!({
                "created_object_names": ["summary"],
                "prompt_string": "Summarize: {reviews}",
                "inputs": [{"input_object_name": "reviews", "mode": "use_individually"}]
            }),
        )
        .await
        .ok();

    assert_eq!(body["combinations_processed"], 2);
    assert_eq!(body["created_objects"], json!(["summary"]));
    assert_eq!(body["entries_written"], 2);
    assert_eq!(body["failures"], json!([]));
    assert_eq!(generator.call_count(), 2);

    let summary = api.get("/objects/summary").await;
    assert_eq!(summary.get("data.0.value"), "positive");
    assert_eq!(summary.get("data.0.key_list.0"), "k1");
    assert_eq!(summary.get("data.1.key_list.0"), "k2");

    // Lineage reaches back to the source collection
    let related = api.get("/return_data/summary").await.ok();
    assert_eq!(related["related_objects"][0]["object_name"], "reviews");
}

#[tokio::test]
async fn test_apply_prompt_missing_input_is_not_found() {
    let generator = MockGenerator::new();
    let api = client(TestDependencies::new().mock_generator(generator.clone()));

    let response = api
        .post(
            "/apply_prompt",
            json!({
                "created_object_names": ["out"],
                "prompt_string": "{ghost}",
                "inputs": [{"input_object_name": "ghost", "mode": "use_individually"}]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_apply_prompt_rejects_empty_outputs() {
    let deps = TestDependencies::new();
    seeded_reviews(&deps).await;
    let api = client(deps);

    let response = api
        .post(
            "/apply_prompt",
            json!({
                "created_object_names": [],
                "prompt_string": "{reviews}",
                "inputs": [{"input_object_name": "reviews", "mode": "combine_events"}]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_apply_prompt_generation_failure_is_bad_gateway() {
    let generator = MockGenerator::new().with_failure("Summarize: Great product", "model down");
    let deps = TestDependencies::new().mock_generator(generator);
    seeded_reviews(&deps).await;
    let api = client(deps);

    let response = api
        .post(
            "/apply_prompt",
            json!({
                "created_object_names": ["summary"],
                "prompt_string": "Summarize: {reviews}",
                "inputs": [{"input_object_name": "reviews", "mode": "use_individually"}]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_apply_prompt_continue_reports_failures() {
    let generator = MockGenerator::new().with_failure("Summarize: Great product", "model down");
    let deps = TestDependencies::new().mock_generator(generator);
    seeded_reviews(&deps).await;
    let api = client(deps);

    let body = api
        .post(
            "/apply_prompt",
            json!({
                "created_object_names": ["summary"],
                "prompt_string": "Summarize: {reviews}",
                "inputs": [{"input_object_name": "reviews", "mode": "use_individually"}],
                "failure_policy": "continue"
            }),
        )
        .await
        .ok();

    assert_eq!(body["combinations_processed"], 1);
    assert_eq!(body["failures"][0]["combination"], 0);
    assert_eq!(body["entries_written"], 1);
}

// =============================================================================
// Research tasks
// =============================================================================

#[tokio::test]
async fn test_research_webhook_completes_task() {
    let researcher = MockResearcher::new();
    let api = client(TestDependencies::new().mock_researcher(researcher.clone()));

    let started = api
        .post(
            "/research_topic",
            json!({"goal": "Find the CEO of Acme", "return_data": ["name"]}),
        )
        .await
        .ok();
    assert_eq!(started["status"], "pending");
    let task_id = started["task_id"].as_str().unwrap().to_string();

    let calls = researcher.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0]
        .webhook_url
        .ends_with(&format!("/webhook/research/{}", task_id)));

    let pending = api.get(&format!("/research_status/{}", task_id)).await.ok();
    assert_eq!(pending["status"], "pending");

    let ack = api
        .post(
            &format!("/webhook/research/{}", task_id),
            json!({"status": "completed", "output": {"name": "Wile E."}}),
        )
        .await
        .ok();
    assert_eq!(ack["status"], "received");
    assert_eq!(ack["task_status"], "completed");

    let done = api.get(&format!("/research_status/{}", task_id)).await.ok();
    assert_eq!(done["status"], "completed");
    assert_eq!(done["output_data"]["name"], "Wile E.");

    // A second delivery does not move a finished task
    let repeat = api
        .post(
            &format!("/webhook/research/{}", task_id),
            json!({"status": "failed", "error": "late"}),
        )
        .await
        .ok();
    assert_eq!(repeat["status"], "unknown_task");

    let completed = api.get("/tasks/completed").await.ok();
    assert_eq!(completed["total"], 1);
}

#[tokio::test]
async fn test_research_status_expires_overdue_task() {
    let deps = TestDependencies::new()
        .research_config(ResearchConfig::new().with_pending_timeout(Duration::minutes(30)));
    let stale = ResearchTask::pending("old goal", vec!["email".into()])
        .with_created_at(Utc::now() - Duration::minutes(45));
    pipeline::TaskStore::insert_task(deps.store.as_ref(), &stale)
        .await
        .unwrap();
    let api = client(deps);

    let body = api.get(&format!("/research_status/{}", stale.id)).await.ok();

    assert_eq!(body["status"], "timeout");
    assert_eq!(body["message"], "Task timed out after 30 minutes");

    let pending = api.get("/tasks/pending").await.ok();
    assert_eq!(pending["total"], 0);
}

#[tokio::test]
async fn test_research_backend_failure_marks_task_failed() {
    let researcher = MockResearcher::new().failing("quota exceeded");
    let deps = TestDependencies::new().mock_researcher(researcher);
    let store = deps.store.clone();
    let api = client(deps);

    let response = api
        .post(
            "/research_topic",
            json!({"goal": "Find things", "return_data": ["a", "b"]}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);

    let failed =
        pipeline::TaskStore::list_tasks(store.as_ref(), pipeline::TaskFilter::Finished)
            .await
            .unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].status, pipeline::TaskStatus::Failed);
}

#[tokio::test]
async fn test_unknown_task_paths() {
    let api = client(TestDependencies::new());
    let id = uuid::Uuid::new_v4();

    let status = api.get(&format!("/research_status/{}", id)).await;
    assert_eq!(status.status, StatusCode::NOT_FOUND);

    let deleted = api.delete(&format!("/tasks/{}", id)).await;
    assert_eq!(deleted.status, StatusCode::NOT_FOUND);

    let ack = api
        .post("/webhook/research/not-a-uuid", json!({"status": "completed"}))
        .await
        .ok();
    assert_eq!(ack["status"], "unknown_task");
}

// =============================================================================
// Tools
// =============================================================================

#[tokio::test]
async fn test_list_tools_with_schemas() {
    let api = client(TestDependencies::new());

    let body = api.get("/tools").await.ok();

    assert_eq!(body["total"], 6);
    let names: HashSet<&str> = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    for expected in [
        "input_data",
        "object_by_name",
        "list_objects",
        "apply_prompt",
        "research_topic",
        "research_status",
    ] {
        assert!(names.contains(expected), "missing tool {}", expected);
    }

    let object_by_name = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "object_by_name")
        .unwrap();
    assert_eq!(
        object_by_name["parameters"]["properties"]["object_name"]["type"],
        "string"
    );
}

#[tokio::test]
async fn test_invoke_tool_by_name() {
    let deps = TestDependencies::new();
    seeded_reviews(&deps).await;
    let api = client(deps);

    let body = api
        .post(
            "/tools/object_by_name/invoke",
            json!({"object_name": "reviews"}),
        )
        .await
        .ok();
    assert_eq!(body["data"][1]["value"], "Bad shipping");

    let unknown = api.post("/tools/nope/invoke", json!({})).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let bad_args = api
        .post("/tools/object_by_name/invoke", json!({"name": 1}))
        .await;
    assert_eq!(bad_args.status, StatusCode::BAD_REQUEST);
}
