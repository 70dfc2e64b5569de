//! Integration tests for the per-project batch pass.
//!
//! These run the full pipeline against a wiremock tracker and assert the
//! update request shape and the journal output.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fieldsync_syncd::client::TrackerClient;
use fieldsync_syncd::config::ProjectContext;
use fieldsync_syncd::error::SyncError;
use fieldsync_syncd::journal::Journal;
use fieldsync_syncd::pipeline::Pipeline;

// =============================================================================
// Test Helpers
// =============================================================================

fn test_project() -> ProjectContext {
    ProjectContext {
        name: "AGOL Requests".to_string(),
        gid: "11".to_string(),
    }
}

/// Builds a pipeline against the mock server, journaling into a temp dir.
fn test_pipeline(server_uri: &str, journal_dir: &TempDir) -> (Arc<Pipeline>, PathBuf) {
    let journal_path = journal_dir.path().join("journal.log");
    let client = TrackerClient::new(server_uri, "test-token").unwrap();
    let pipeline = Pipeline::new(client, Journal::new(&journal_path), "New Requests");
    (Arc::new(pipeline), journal_path)
}

/// Custom-field settings with Priority (enum), Owner (text), and the
/// api_updated sentinel.
fn settings_body() -> serde_json::Value {
    json!({
        "data": [
            {
                "custom_field": {
                    "gid": "f1",
                    "name": "Priority",
                    "resource_subtype": "enum",
                    "enum_options": [
                        {"gid": "opt1", "name": "High"},
                        {"gid": "opt2", "name": "Low"}
                    ]
                }
            },
            {
                "custom_field": {
                    "gid": "f2",
                    "name": "Owner",
                    "resource_subtype": "text"
                }
            },
            {
                "custom_field": {
                    "gid": "f9",
                    "name": "api_updated",
                    "resource_subtype": "enum",
                    "enum_options": [
                        {"gid": "optyes", "name": "yes"}
                    ]
                }
            }
        ]
    })
}

/// A full task with an unset sentinel and the given notes.
fn task_body(gid: &str, notes: &str) -> serde_json::Value {
    json!({
        "data": {
            "gid": gid,
            "name": "Request",
            "notes": notes,
            "custom_fields": [
                {
                    "gid": "f9",
                    "name": "api_updated",
                    "resource_subtype": "enum",
                    "enum_value": null
                }
            ]
        }
    })
}

/// Mounts the happy-path board project mocks: project, sections, section
/// tasks with one candidate, its detail, and the field settings.
async fn mount_board_project(server: &MockServer, notes: &str) {
    Mock::given(method("GET"))
        .and(path("/projects/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"gid": "11", "name": "AGOL Requests", "layout": "board"}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/11/sections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"gid": "s1", "name": "New Requests"},
                {"gid": "s2", "name": "Done"}
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sections/s1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"gid": "t1", "name": "Request"}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body("t1", notes)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/11/custom_field_settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_body()))
        .mount(server)
        .await;
}

// =============================================================================
// Batch Pass Tests
// =============================================================================

/// Board project with one qualifying task: exactly one update call whose
/// payload carries the resolved Priority mapping and the sentinel, and the
/// journal receives a "was updated" line with the padded ticket id.
#[tokio::test]
async fn board_pass_updates_qualifying_task() {
    let server = MockServer::start().await;
    mount_board_project(&server, "TicketId | abc-42||Priority | High").await;

    Mock::given(method("PUT"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"gid": "t1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let journal_dir = TempDir::new().unwrap();
    let (pipeline, journal_path) = test_pipeline(&server.uri(), &journal_dir);

    pipeline.process_project(&test_project()).await.unwrap();

    // Inspect the PUT body that actually went out.
    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .expect("one update call");
    let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();

    assert_eq!(body["data"]["custom_fields"]["f1"], "opt1"); // Priority -> High
    assert_eq!(body["data"]["custom_fields"]["f9"], "optyes"); // sentinel
    // TicketId is not itself a custom field in this schema, so it must not
    // appear in the payload, and there was no "notes" label to carry through.
    assert_eq!(body["data"]["custom_fields"].as_object().unwrap().len(), 2);
    assert!(body["data"].get("notes").is_none());

    let journal = fs::read_to_string(&journal_path).unwrap();
    assert!(journal.contains("Processing AGOL Requests."));
    let updated_lines: Vec<&str> = journal
        .lines()
        .filter(|line| line.contains("was updated"))
        .collect();
    assert_eq!(updated_lines.len(), 1);
    assert!(updated_lines[0].ends_with("The task (abc-000042) was updated!"));
}

/// A task whose sentinel is already set is never updated.
#[tokio::test]
async fn already_processed_task_is_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"gid": "11", "name": "AGOL Requests", "layout": "board"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/11/sections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"gid": "s1", "name": "New Requests"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sections/s1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"gid": "t1", "name": "Request"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "gid": "t1",
                "notes": "Priority | High",
                "custom_fields": [
                    {
                        "gid": "f9",
                        "name": "api_updated",
                        "resource_subtype": "enum",
                        "enum_value": {"gid": "optyes", "name": "yes"}
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let journal_dir = TempDir::new().unwrap();
    let (pipeline, journal_path) = test_pipeline(&server.uri(), &journal_dir);

    pipeline.process_project(&test_project()).await.unwrap();

    let journal = fs::read_to_string(&journal_path).unwrap();
    assert!(journal.contains("There were no tasks to update!"));
}

/// A list-layout project lists tasks project-wide instead of by section.
#[tokio::test]
async fn list_pass_skips_section_resolution() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"gid": "11", "name": "AGOL Requests", "layout": "list"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/11/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"gid": "t1", "name": "Request"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks/t1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(task_body("t1", "Priority | Low")),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/11/custom_field_settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_body()))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"gid": "t1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let journal_dir = TempDir::new().unwrap();
    let (pipeline, _) = test_pipeline(&server.uri(), &journal_dir);

    pipeline.process_project(&test_project()).await.unwrap();
}

/// A board project without the configured section fails that project's
/// pass with MissingSection.
#[tokio::test]
async fn missing_section_fails_the_pass() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"gid": "11", "name": "AGOL Requests", "layout": "board"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/11/sections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"gid": "s2", "name": "Done"}]
        })))
        .mount(&server)
        .await;

    let journal_dir = TempDir::new().unwrap();
    let (pipeline, _) = test_pipeline(&server.uri(), &journal_dir);

    let err = pipeline.process_project(&test_project()).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::MissingSection { ref section, ref project }
            if section == "New Requests" && project == "AGOL Requests"
    ));
}

/// A failing update call is contained per task: the pass still completes
/// and the attempted payload lands in the journal for manual remediation.
#[tokio::test]
async fn failed_update_journals_payload_and_continues() {
    let server = MockServer::start().await;
    mount_board_project(&server, "Priority | High||Owner | jdoe").await;

    Mock::given(method("PUT"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let journal_dir = TempDir::new().unwrap();
    let (pipeline, journal_path) = test_pipeline(&server.uri(), &journal_dir);

    // Per-task containment: the pass itself succeeds.
    pipeline.process_project(&test_project()).await.unwrap();

    let journal = fs::read_to_string(&journal_path).unwrap();
    assert!(journal.contains("There was a problem updating the fields in task via the API"));
    // Full payload dump, one "gid, value" line per field.
    assert!(journal.contains("f1, opt1"));
    assert!(journal.contains("f2, jdoe"));
    assert!(journal.contains("f9, optyes"));
    assert!(!journal.contains("was updated!"));
}

/// A notes value missing from the enum's declared options is contained per
/// task and never produces an update call.
#[tokio::test]
async fn unrecognized_option_is_contained() {
    let server = MockServer::start().await;
    mount_board_project(&server, "Priority | Urgent").await;

    Mock::given(method("PUT"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let journal_dir = TempDir::new().unwrap();
    let (pipeline, journal_path) = test_pipeline(&server.uri(), &journal_dir);

    pipeline.process_project(&test_project()).await.unwrap();

    let journal = fs::read_to_string(&journal_path).unwrap();
    assert!(journal.contains("Failed to update task t1"));
    assert!(journal.contains("Urgent"));
}

/// Freeform notes parse to an empty mapping; the task is still marked as
/// processed so it is not revisited on every pass.
#[tokio::test]
async fn freeform_notes_still_set_the_sentinel() {
    let server = MockServer::start().await;
    mount_board_project(&server, "A task typed straight into the tracker UI.").await;

    Mock::given(method("PUT"))
        .and(path("/tasks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"gid": "t1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let journal_dir = TempDir::new().unwrap();
    let (pipeline, _) = test_pipeline(&server.uri(), &journal_dir);

    pipeline.process_project(&test_project()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .expect("one update call");
    let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
    let custom_fields = body["data"]["custom_fields"].as_object().unwrap();
    assert_eq!(custom_fields.len(), 1);
    assert_eq!(custom_fields["f9"], "optyes");
}
