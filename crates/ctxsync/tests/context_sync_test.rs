use ctxsync::testing::ScriptedTransport;
use ctxsync::{
    ApiResponse, ContextSyncSpec, ContextSyncWorkflow, Method, Outcome, SyncError, SyncOptions,
    WorkflowState,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn version_list(mappings: serde_json::Value) -> serde_json::Value {
    json!({ "contextDefinitionVersionList": [{ "contextMappings": mappings }] })
}

fn workflow(transport: &Arc<ScriptedTransport>, options: SyncOptions) -> ContextSyncWorkflow {
    ContextSyncWorkflow::new(
        transport.clone(),
        ContextSyncSpec::sales_transaction(),
        options,
    )
    .expect("valid workflow")
}

#[tokio::test]
async fn test_full_run_threads_ids_between_calls() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(201, json!({"contextDefinitionId": "CTX1"}))
            .respond(
                200,
                version_list(json!([{"name": "SalesTransaction", "contextMappingId": "MAP1"}])),
            )
            .respond(200, json!({}))
            .respond(200, json!({})),
    );

    let result = workflow(&transport, SyncOptions::default()).run().await;

    assert_eq!(result.state, WorkflowState::Done);
    assert_eq!(result.outcome(), Outcome::Complete);
    assert_eq!(result.context_id.as_deref(), Some("CTX1"));
    assert_eq!(result.mapping_id.as_deref(), Some("MAP1"));
    assert_eq!(result.error, None);

    let requests = transport.requests();
    let calls: Vec<(Method, &str)> = requests
        .iter()
        .map(|r| (r.method, r.path.as_str()))
        .collect();
    assert_eq!(
        calls,
        vec![
            (Method::Post, "connect/context-definitions"),
            (Method::Get, "connect/context-definitions/CTX1"),
            (
                Method::Patch,
                "connect/context-definitions/CTX1/context-mappings"
            ),
            (Method::Patch, "connect/context-definitions/CTX1"),
        ]
    );

    assert_eq!(
        requests[0].body,
        Some(json!({
            "name": "RLM_SalesTransactionContext",
            "description": "Extension of Standard Sales Transaction Context",
            "developerName": "RLM_SalesTransactionContext",
            "baseReference": "SalesTransactionContext__stdctx",
            "startDate": "2024-01-01T00:00:00.000Z"
        }))
    );
    assert_eq!(requests[1].body, None);
    assert_eq!(
        requests[2].body,
        Some(json!({
            "contextMappings": [
                {"contextMappingId": "MAP1", "isDefault": true, "name": "SalesTransaction"}
            ]
        }))
    );
    assert_eq!(requests[3].body, Some(json!({"isActive": true})));
}

#[tokio::test]
async fn test_first_matching_mapping_wins() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(201, json!({"contextDefinitionId": "CTX1"}))
            .respond(
                200,
                version_list(json!([
                    {"name": "Header", "contextMappingId": "MAP0"},
                    {"name": "SalesTransaction", "contextMappingId": "MAP1"},
                    {"name": "SalesTransaction", "contextMappingId": "MAP2"}
                ])),
            )
            .respond(200, json!({}))
            .respond(200, json!({})),
    );

    let result = workflow(&transport, SyncOptions::default()).run().await;

    assert_eq!(result.mapping_id.as_deref(), Some("MAP1"));
}

#[tokio::test]
async fn test_create_failure_issues_no_further_calls() {
    let transport = Arc::new(ScriptedTransport::new().respond_raw(500, "server error"));

    let result = workflow(&transport, SyncOptions::default()).run().await;

    assert_eq!(result.state, WorkflowState::Failed);
    assert_eq!(result.context_id, None);
    assert_eq!(transport.request_count(), 1);
    assert_eq!(
        result.error,
        Some(SyncError::Request {
            method: Method::Post,
            endpoint: "connect/context-definitions".to_string(),
            status: 500,
            body: "server error".to_string(),
        })
    );
}

#[tokio::test]
async fn test_create_without_id_fails() {
    let transport = Arc::new(
        ScriptedTransport::new().respond_raw(201, r#"{"errors":["dup developerName"]}"#),
    );

    let result = workflow(&transport, SyncOptions::default()).run().await;

    assert_eq!(result.state, WorkflowState::Failed);
    assert_eq!(transport.request_count(), 1);
    assert_eq!(
        result.error,
        Some(SyncError::DataShape {
            endpoint: "connect/context-definitions".to_string(),
            reason: "no contextDefinitionId in response".to_string(),
            status: 201,
            body: r#"{"errors":["dup developerName"]}"#.to_string(),
        })
    );
    assert_eq!(result.error.as_ref().and_then(SyncError::status), Some(201));
}

#[tokio::test]
async fn test_empty_version_list_stops_before_bind() {
    let fetched = json!({"contextDefinitionVersionList": []});
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(201, json!({"contextDefinitionId": "CTX1"}))
            .respond(200, fetched.clone()),
    );

    let result = workflow(&transport, SyncOptions::default()).run().await;

    assert_eq!(result.state, WorkflowState::Failed);
    assert_eq!(result.context_id.as_deref(), Some("CTX1"));
    assert_eq!(
        result.error,
        Some(SyncError::data_shape(
            "connect/context-definitions/CTX1",
            "no version list",
            &ApiResponse::new(200, fetched.to_string())
        ))
    );
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_missing_mapping_stops_before_bind() {
    let fetched = version_list(json!([{"name": "Other", "contextMappingId": "MAP9"}]));
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(201, json!({"contextDefinitionId": "CTX1"}))
            .respond(200, fetched.clone()),
    );

    let result = workflow(&transport, SyncOptions::default()).run().await;

    assert_eq!(result.state, WorkflowState::Failed);
    assert_eq!(result.mapping_id, None);
    assert_eq!(
        result.error,
        Some(SyncError::data_shape(
            "connect/context-definitions/CTX1",
            "mapping 'SalesTransaction' not found",
            &ApiResponse::new(200, fetched.to_string())
        ))
    );
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_matched_mapping_without_id_stops_before_bind() {
    let fetched = version_list(json!([{"name": "SalesTransaction"}]));
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(201, json!({"contextDefinitionId": "CTX1"}))
            .respond(200, fetched.clone()),
    );

    let result = workflow(&transport, SyncOptions::default()).run().await;

    assert_eq!(result.state, WorkflowState::Failed);
    assert_eq!(result.context_id.as_deref(), Some("CTX1"));
    assert_eq!(result.mapping_id, None);
    assert_eq!(
        result.error,
        Some(SyncError::data_shape(
            "connect/context-definitions/CTX1",
            "mapping 'SalesTransaction' has no contextMappingId",
            &ApiResponse::new(200, fetched.to_string())
        ))
    );
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_fetch_failure_stops_before_bind() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(201, json!({"contextDefinitionId": "CTX1"}))
            .respond_raw(404, "not found"),
    );

    let result = workflow(&transport, SyncOptions::default()).run().await;

    assert_eq!(result.state, WorkflowState::Failed);
    assert_eq!(result.error.as_ref().and_then(SyncError::status), Some(404));
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_bind_failure_still_activates() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(201, json!({"contextDefinitionId": "CTX1"}))
            .respond(
                200,
                version_list(json!([{"name": "SalesTransaction", "contextMappingId": "MAP1"}])),
            )
            .respond_raw(400, "bad mapping")
            .respond(200, json!({})),
    );

    let result = workflow(&transport, SyncOptions::default()).run().await;

    assert_eq!(result.state, WorkflowState::Done);
    assert_eq!(result.outcome(), Outcome::CompletedWithWarnings);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].status(), Some(400));

    let requests = transport.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[3].path, "connect/context-definitions/CTX1");
    assert_eq!(requests[3].body, Some(json!({"isActive": true})));
}

#[tokio::test]
async fn test_bind_failure_halts_when_configured() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(201, json!({"contextDefinitionId": "CTX1"}))
            .respond(
                200,
                version_list(json!([{"name": "SalesTransaction", "contextMappingId": "MAP1"}])),
            )
            .respond_raw(400, "bad mapping"),
    );

    let options = SyncOptions {
        halt_on_bind_failure: true,
        ..SyncOptions::default()
    };
    let result = workflow(&transport, options).run().await;

    assert_eq!(result.state, WorkflowState::Failed);
    assert_eq!(result.error.as_ref().and_then(SyncError::status), Some(400));
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn test_activate_failure_still_reaches_done() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(201, json!({"contextDefinitionId": "CTX1"}))
            .respond(
                200,
                version_list(json!([{"name": "SalesTransaction", "contextMappingId": "MAP1"}])),
            )
            .respond(200, json!({}))
            .respond_raw(503, "unavailable"),
    );

    let result = workflow(&transport, SyncOptions::default()).run().await;

    assert!(result.is_done());
    assert_eq!(result.outcome(), Outcome::CompletedWithWarnings);
    assert_eq!(result.warnings[0].status(), Some(503));
    assert_eq!(result.context_id.as_deref(), Some("CTX1"));
}

#[tokio::test]
async fn test_transport_error_on_create_fails() {
    let transport = Arc::new(ScriptedTransport::new().fail_with(SyncError::Transport {
        endpoint: "connect/context-definitions".to_string(),
        details: "connection refused".to_string(),
    }));

    let result = workflow(&transport, SyncOptions::default()).run().await;

    assert_eq!(result.state, WorkflowState::Failed);
    assert!(matches!(result.error, Some(SyncError::Transport { .. })));
}

#[tokio::test]
async fn test_product_discovery_binds_its_own_mapping() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(201, json!({"contextDefinitionId": "PD1"}))
            .respond(
                200,
                version_list(json!([
                    {"name": "SalesTransaction", "contextMappingId": "MAP1"},
                    {"name": "ProductDiscoveryMapping", "contextMappingId": "MAP2"}
                ])),
            )
            .respond(200, json!({}))
            .respond(200, json!({})),
    );

    let result = ContextSyncWorkflow::new(
        transport.clone(),
        ContextSyncSpec::product_discovery(),
        SyncOptions {
            step_timeout: Duration::from_secs(5),
            ..SyncOptions::default()
        },
    )
    .expect("valid workflow")
    .run()
    .await;

    assert_eq!(result.outcome(), Outcome::Complete);
    assert_eq!(result.mapping_id.as_deref(), Some("MAP2"));
    assert_eq!(
        transport.requests()[2].body,
        Some(json!({
            "contextMappings": [
                {"contextMappingId": "MAP2", "isDefault": true, "name": "ProductDiscoveryMapping"}
            ]
        }))
    );
}

#[test]
fn test_empty_mapping_name_rejected() {
    let mut spec = ContextSyncSpec::sales_transaction();
    spec.mapping_name = " ".to_string();

    let result = ContextSyncWorkflow::new(
        Arc::new(ScriptedTransport::new()),
        spec,
        SyncOptions::default(),
    );
    assert!(matches!(result, Err(SyncError::Configuration(_))));
}
