#![allow(clippy::unwrap_used)]
// Integration tests for `LabClient` and `DashboardClient` using wiremock.

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netdeck_api::types::{CreateLinkRequest, CreateNodeRequest};
use netdeck_api::{DashboardClient, Error, LabClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup_lab() -> (MockServer, LabClient) {
    let server = MockServer::start().await;
    let client = LabClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

async fn setup_dashboard() -> (MockServer, DashboardClient) {
    let server = MockServer::start().await;
    let client = DashboardClient::new(&server.uri(), None, &TransportConfig::default()).unwrap();
    (server, client)
}

const PROJECT: &str = "5f0d8a02-3a9d-4c5e-9b2e-7d1a6f4b8c3d";
const NODE: &str = "1b2f4d66-8a9c-4d2e-b1f3-0c5d7e9a2b4c";

// ── Lab server tests ────────────────────────────────────────────────

#[tokio::test]
async fn list_projects() {
    let (server, client) = setup_lab().await;

    Mock::given(method("GET"))
        .and(path("/v2/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "project_id": PROJECT, "name": "campus-lab", "status": "opened" }
        ])))
        .mount(&server)
        .await;

    let projects = client.projects().await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "campus-lab");
    assert_eq!(projects[0].status, "opened");
}

#[tokio::test]
async fn list_nodes_with_ports() {
    let (server, client) = setup_lab().await;

    Mock::given(method("GET"))
        .and(path(format!("/v2/projects/{PROJECT}/nodes")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "node_id": NODE,
            "name": "R1",
            "node_type": "router",
            "status": "started",
            "x": 120.0,
            "y": -40.0,
            "ports": [
                { "name": "Gi0/0", "status": "up", "connected": true },
                { "name": "Gi0/1", "connected": false }
            ]
        }])))
        .mount(&server)
        .await;

    let nodes = client
        .nodes(Uuid::parse_str(PROJECT).unwrap())
        .await
        .unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].node_type, "router");
    assert_eq!(nodes[0].ports.len(), 2);
    assert!(nodes[0].ports[0].connected);
    assert!(!nodes[0].ports[1].connected);
}

#[tokio::test]
async fn create_node_posts_body() {
    let (server, client) = setup_lab().await;

    let req = CreateNodeRequest {
        name: "SW1".into(),
        node_type: "switch".into(),
        x: 0.0,
        y: 0.0,
    };

    Mock::given(method("POST"))
        .and(path(format!("/v2/projects/{PROJECT}/nodes")))
        .and(body_json(&req))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "node_id": NODE,
            "name": "SW1",
            "node_type": "switch",
            "status": "stopped",
            "x": 0.0,
            "y": 0.0
        })))
        .mount(&server)
        .await;

    let node = client
        .create_node(Uuid::parse_str(PROJECT).unwrap(), &req)
        .await
        .unwrap();
    assert_eq!(node.name, "SW1");
    assert_eq!(node.status, "stopped");
}

#[tokio::test]
async fn create_link_round_trip() {
    let (server, client) = setup_lab().await;
    let other: Uuid = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/v2/projects/{PROJECT}/links")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "link_id": Uuid::new_v4(),
            "source": { "node_id": NODE, "port_number": 0 },
            "target": { "node_id": other, "port_number": 1 },
            "link_type": "ethernet"
        })))
        .mount(&server)
        .await;

    let link = client
        .create_link(
            Uuid::parse_str(PROJECT).unwrap(),
            &CreateLinkRequest {
                source_node_id: Uuid::parse_str(NODE).unwrap(),
                source_port: 0,
                target_node_id: other,
                target_port: 1,
                link_type: Some("ethernet".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(link.source.port_number, 0);
    assert_eq!(link.target.node_id, other);
}

#[tokio::test]
async fn start_node_hits_lifecycle_endpoint() {
    let (server, client) = setup_lab().await;

    Mock::given(method("POST"))
        .and(path(format!("/v2/projects/{PROJECT}/nodes/{NODE}/start")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .start_node(
            Uuid::parse_str(PROJECT).unwrap(),
            Uuid::parse_str(NODE).unwrap(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn api_error_carries_server_message() {
    let (server, client) = setup_lab().await;

    Mock::given(method("GET"))
        .and(path("/v2/projects"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "project is locked",
            "code": "conflict"
        })))
        .mount(&server)
        .await;

    let result = client.projects().await;
    match result {
        Err(Error::Api {
            status,
            message,
            code,
        }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "project is locked");
            assert_eq!(code.as_deref(), Some("conflict"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_is_typed() {
    let (server, client) = setup_lab().await;

    Mock::given(method("GET"))
        .and(path("/v2/computes"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(matches!(
        client.computes().await,
        Err(Error::Unauthorized)
    ));
}

// ── Dashboard service tests ─────────────────────────────────────────

#[tokio::test]
async fn qos_policies_unwrap_envelope() {
    let (server, client) = setup_dashboard().await;

    Mock::given(method("GET"))
        .and(path("/api/qos/policies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{
                "id": "qos-1",
                "name": "voip-priority",
                "direction": "outbound",
                "class": "voice",
                "rate_limit_kbps": 512,
                "matched_sessions": 42,
                "enabled": true
            }],
            "metadata": { "total": 1 }
        })))
        .mount(&server)
        .await;

    let policies = client.qos_policies().await.unwrap();
    assert_eq!(policies.len(), 1);
    assert_eq!(policies[0].class, "voice");
    assert!(policies[0].enabled);
}

#[tokio::test]
async fn envelope_failure_is_typed() {
    let (server, client) = setup_dashboard().await;

    Mock::given(method("GET"))
        .and(path("/api/sla/targets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": { "type": "upstream", "message": "collector offline" }
        })))
        .mount(&server)
        .await;

    match client.sla_targets().await {
        Err(Error::Envelope { message, .. }) => assert_eq!(message, "collector offline"),
        other => panic!("expected Envelope error, got {other:?}"),
    }
}

#[tokio::test]
async fn set_policy_enabled_patches() {
    let (server, client) = setup_dashboard().await;

    Mock::given(method("PATCH"))
        .and(path("/api/qos/policies/qos-1"))
        .and(body_json(json!({ "enabled": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.set_policy_enabled("qos-1", false).await.unwrap();
}
