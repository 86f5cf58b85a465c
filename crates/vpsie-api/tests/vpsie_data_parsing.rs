//! Integration tests for parsing VPSie data.
//!
//! These tests validate that the vpsie-api models decode realistic VPSie
//! responses and re-encode them without losing declared fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use vpsie_api::models::{
    BackupResponse, Datacenter, Image, Offer, PasswordResponse, RebuildResponse,
    SnapshotResponse, StatisticsGraph, Vps,
};
use vpsie_core::envelope::Envelope;
use vpsie_core::Error;

#[derive(Debug, Serialize, Deserialize)]
struct VpsList {
    vpsies: Vec<Vps>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Offers {
    offers: Vec<Offer>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Datacenters {
    datacenters: Vec<Datacenter>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Images {
    images: Vec<Image>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Statistics {
    graph: StatisticsGraph,
}

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load a fixture from disk as JSON.
fn load_fixture(name: &str) -> Value {
    let fixture_path = fixtures_dir().join(name);
    let text = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("Fixture {} is not valid JSON: {}", name, e))
}

/// Decode `value` as `T`, re-encode it, and require the result to equal the input.
fn assert_round_trip<T>(value: &Value) -> T
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let decoded: T = serde_json::from_value(value.clone())
        .unwrap_or_else(|e| panic!("Failed to deserialize: {}\nJSON: {}", e, value));
    let encoded = serde_json::to_value(&decoded).unwrap();
    assert_eq!(&encoded, value, "re-encoded JSON lost or changed fields");
    decoded
}

#[test]
fn test_deserialize_vps_list() {
    let json_data = load_fixture("vps_list.json");
    let vpsies = assert_round_trip::<Envelope<VpsList>>(&json_data)
        .into_result()
        .unwrap()
        .vpsies;

    assert_eq!(vpsies.len(), 2, "Expected 2 VPSies in test data");
}

#[test]
fn test_vps_fields() {
    let json_data = load_fixture("vps_list.json");
    let list: Envelope<VpsList> = serde_json::from_value(json_data).unwrap();
    let web = list
        .data
        .vpsies
        .iter()
        .find(|vps| vps.name == "web-prod-01")
        .expect("Should have the web VPS");

    assert_eq!(web.id, "4f6c2a1e9b");
    assert_eq!(web.ram, 4096);
    assert_eq!(web.ssd, 80);
    assert_eq!(web.cpu, 2);
    assert_eq!(web.bandwidth, 4000);
    assert_eq!(web.os_slug, "ubuntu-22-04-x64");
    assert_eq!(web.ipv6, "2001:db8::24");
    assert_eq!(web.private_ip, "10.8.0.24");
    assert_eq!(web.status, "running");
    assert_eq!(
        web.created_on.map(|t| t.to_rfc3339()),
        Some("2021-05-04T12:30:00+00:00".to_string())
    );
}

#[test]
fn test_stopped_vps_has_process() {
    let json_data = load_fixture("vps_list.json");
    let list: Envelope<VpsList> = serde_json::from_value(json_data).unwrap();
    let db = &list.data.vpsies[1];

    assert_eq!(db.status, "stopped");
    assert_eq!(db.process_id, "proc-5521");
    assert!(db.ipv6.is_empty());
}

#[test]
fn test_catalog_round_trip() {
    let catalog = load_fixture("catalog.json");

    let offers = assert_round_trip::<Envelope<Offers>>(&catalog["offers"])
        .into_result()
        .unwrap()
        .offers;
    assert_eq!(offers.len(), 3);
    assert_eq!(offers[2].ram, 8192);
    assert_eq!(offers[2].price, 40);

    let datacenters = assert_round_trip::<Envelope<Datacenters>>(&catalog["datacenters"])
        .into_result()
        .unwrap()
        .datacenters;
    assert_eq!(datacenters[1].name, "Amsterdam");
    assert_eq!(datacenters[1].country, "Netherlands");

    let images = assert_round_trip::<Envelope<Images>>(&catalog["images"])
        .into_result()
        .unwrap()
        .images;
    assert_eq!(images[0].category, "ubuntu");
}

#[test]
fn test_statistics_graph() {
    let json_data = load_fixture("statistics.json");
    let graph = assert_round_trip::<Envelope<Statistics>>(&json_data)
        .into_result()
        .unwrap()
        .graph;

    assert_eq!(graph.time.len(), 4);
    assert_eq!(graph.cpu.len(), graph.time.len());
    assert_eq!(graph.disk_read[2], 1_048_576);
    assert!((graph.cpu[2] - 12.75).abs() < f32::EPSILON);
}

#[test]
fn test_action_responses() {
    let responses = load_fixture("action_responses.json");

    let password = assert_round_trip::<Envelope<PasswordResponse>>(&responses["password"])
        .into_result()
        .unwrap();
    assert_eq!(password.action.process_id, "proc-7001");
    assert_eq!(password.password, "Zq8#vP2m");

    let backup = assert_round_trip::<Envelope<BackupResponse>>(&responses["backup"])
        .into_result()
        .unwrap();
    assert_eq!(backup.backup_name, "nightly-2023-01-10");

    let snapshot = assert_round_trip::<Envelope<SnapshotResponse>>(&responses["snapshot"])
        .into_result()
        .unwrap();
    assert_eq!(snapshot.snapshot_name, "before-upgrade");

    let rebuild = assert_round_trip::<Envelope<RebuildResponse>>(&responses["rebuild"])
        .into_result()
        .unwrap();
    assert_eq!(rebuild.new_vpsie_id, "7a1e3c9d02");
    assert_eq!(rebuild.action.action, "rebuild");
}

#[test]
fn test_failed_envelope_decodes_without_payload() {
    let responses = load_fixture("action_responses.json");
    let envelope: Envelope<BackupResponse> =
        serde_json::from_value(responses["failed"].clone()).unwrap();

    assert_eq!(
        envelope.into_result().unwrap_err(),
        Error::Api {
            code: "INSUFFICIENT_BALANCE".to_string()
        }
    );
}
