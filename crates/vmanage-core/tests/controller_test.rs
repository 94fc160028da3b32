#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` against a mocked controller.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vmanage_core::{
    Controller, ControllerConfig, CoreError, Credentials, DeviceAssociation, PrefixEntry,
    expand_subnet_to_hosts, merge_unique, parse_ngfw_rules,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn connected(server: &MockServer) -> Controller {
    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "JSESSIONID=abc123; Path=/"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dataservice/client/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tok-1"))
        .mount(server)
        .await;

    let config = ControllerConfig::new(
        server.uri().parse().unwrap(),
        Credentials::new("admin", "pw"),
    );
    Controller::connect(config).await.unwrap()
}

async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn prefix_parcel(id: &str, name: &str, values: &[&str]) -> serde_json::Value {
    let entries: Vec<_> = values
        .iter()
        .map(|v| json!({ "ipPrefix": { "optionType": "global", "value": v } }))
        .collect();
    json!({
        "parcelId": id,
        "parcelType": "security-data-ip-prefix",
        "createdBy": "admin",
        "payload": { "name": name, "data": { "entries": entries } }
    })
}

// ── Connection ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_bad_login_is_authentication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>bad creds</html>"))
        .mount(&server)
        .await;

    let config = ControllerConfig::new(server.uri().parse().unwrap(), Credentials::new("a", "b"));
    let result = Controller::connect(config).await;
    assert!(matches!(result, Err(CoreError::AuthenticationFailed { .. })));
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_devices_accepts_both_envelopes() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;
    let devices = json!([{ "host-name": "edge-1" }, { "host-name": "edge-2" }]);

    mount_get(&server, "/dataservice/device", json!({ "data": devices })).await;
    let wrapped = controller.devices().await.unwrap();

    server.reset().await;
    let controller = connected(&server).await;
    mount_get(&server, "/dataservice/device", devices).await;
    let bare = controller.devices().await.unwrap();

    assert_eq!(wrapped, bare);
    assert_eq!(bare[1].str("host-name", ""), "edge-2");
}

#[tokio::test]
async fn test_unexpected_device_shape_names_the_endpoint() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;
    mount_get(&server, "/dataservice/device", json!({ "error": "nope" })).await;

    match controller.devices().await {
        Err(CoreError::UnexpectedShape { endpoint, preview }) => {
            assert_eq!(endpoint, "/device");
            assert!(preview.contains("nope"));
        }
        other => panic!("expected UnexpectedShape, got: {other:?}"),
    }
}

// ── Policy groups ───────────────────────────────────────────────────

#[tokio::test]
async fn test_device_association_reports_errors_in_band() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    mount_get(
        &server,
        "/dataservice/v1/policy-group/pg-1/device/associate",
        json!({ "data": [{ "host-name": "edge-1" }, { "system-ip": "10.0.0.2" }] }),
    )
    .await;
    mount_get(
        &server,
        "/dataservice/v1/policy-group/pg-2/device/associate",
        json!({ "unexpected": true }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/dataservice/v1/policy-group/pg-3/device/associate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    assert_eq!(
        controller.device_association("pg-1").await.to_string(),
        "edge-1, 10.0.0.2"
    );
    assert_eq!(controller.device_association("pg-2").await.to_string(), "-");
    assert!(matches!(
        controller.device_association("pg-3").await,
        DeviceAssociation::Error(_)
    ));
    assert_eq!(controller.device_association("").await.to_string(), "-");
}

// ── Data prefixes ───────────────────────────────────────────────────

#[tokio::test]
async fn test_prefix_objects_are_numbered_across_profiles() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    mount_get(
        &server,
        "/dataservice/v1/feature-profile/sdwan/policy-object",
        json!([{ "profileId": "prof-a" }, { "profileName": "no id" }, { "profileId": "prof-b" }]),
    )
    .await;
    mount_get(
        &server,
        "/dataservice/v1/feature-profile/sdwan/policy-object/prof-a/security-data-ip-prefix",
        json!({ "data": [prefix_parcel("p1", "grp_one", &["10.0.0.1/32"])] }),
    )
    .await;
    mount_get(
        &server,
        "/dataservice/v1/feature-profile/sdwan/policy-object/prof-b/security-data-ip-prefix",
        json!([
            prefix_parcel("p2", "grp_two", &[]),
            prefix_parcel("p3", "grp_three", &["10.1.1.10/32"])
        ]),
    )
    .await;

    let objects = controller.prefix_objects().await.unwrap();
    let summary: Vec<_> = objects
        .iter()
        .map(|o| (o.number, o.name.as_str(), o.profile_id.as_str(), o.parcel_id.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "grp_one", "prof-a", "p1"),
            (2, "grp_two", "prof-b", "p2"),
            (3, "grp_three", "prof-b", "p3"),
        ]
    );
}

#[tokio::test]
async fn test_expand_merge_and_push_end_to_end() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;
    let parcel_path =
        "/dataservice/v1/feature-profile/sdwan/policy-object/prof-a/security-data-ip-prefix/p1";

    let existing = vec![PrefixEntry::global("10.1.1.10/32")];
    let merged = merge_unique(&existing, expand_subnet_to_hosts("10.1.0.0/16").unwrap());

    let expected_body = json!({
        "name": "grp_servers",
        "data": { "entries": [
            { "ipPrefix": { "optionType": "global", "value": "10.1.1.10/32" } },
            { "ipPrefix": { "optionType": "global", "value": "10.1.1.11/32" } }
        ] }
    });
    Mock::given(method("PUT"))
        .and(path(parcel_path))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "parcelId": "p1" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_get(
        &server,
        parcel_path,
        prefix_parcel("p1", "grp_servers", &["10.1.1.10/32", "10.1.1.11/32"]),
    )
    .await;

    let resp = controller
        .push_prefix_update("prof-a", "p1", "grp_servers", &merged)
        .await
        .unwrap();
    assert!(resp.is_success());

    let fresh = controller.prefix_object("prof-a", "p1").await.unwrap();
    assert_eq!(
        fresh.array_at(&["payload", "data", "entries"]).len(),
        2
    );
}

#[tokio::test]
async fn test_rejected_push_is_returned_not_raised() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Duplicate prefix" }
        })))
        .mount(&server)
        .await;

    let resp = controller
        .push_prefix_update("prof-a", "p1", "grp", &[PrefixEntry::global("10.0.0.0/8")])
        .await
        .unwrap();
    assert_eq!(resp.status, 400);
    assert_eq!(
        resp.body.as_json().unwrap()["error"]["message"],
        "Duplicate prefix"
    );
}

// ── AAR ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_aar_profiles_request_reference_counts() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/dataservice/v1/feature-profile/sdwan/application-priority"))
        .and(query_param("referenceCount", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "profileId": "aar-1", "profileName": "AAR", "referenceCount": 2 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let profiles = controller.aar_profiles().await.unwrap();
    assert_eq!(profiles[0].str("referenceCount", ""), "2");
}

#[tokio::test]
async fn test_aar_parcels_include_subparcels() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    mount_get(
        &server,
        "/dataservice/v1/feature-profile/sdwan/application-priority/aar-1",
        json!({
            "profileId": "aar-1",
            "associatedProfileParcels": [{
                "parcelType": "policy",
                "payload": { "name": "main" },
                "subparcels": [{ "parcelType": "sla", "payload": { "name": "voice" } }]
            }]
        }),
    )
    .await;

    let parcels = controller.aar_parcels("aar-1").await.unwrap();
    assert_eq!(parcels.len(), 1);
    assert_eq!(parcels[0].subparcels[0].name, "voice");

    assert!(matches!(
        controller.aar_parcels("").await,
        Err(CoreError::NotFound { .. })
    ));
}

// ── NGFW ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ngfw_list_refs_resolve_with_fallback() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    mount_get(
        &server,
        "/dataservice/v1/feature-profile/sdwan/embedded-security/sec-1/unified/ngfirewall",
        json!({ "data": [{
            "payload": {
                "name": "ngfw",
                "data": { "sequences": [{
                    "sequenceName": { "value": "r1" },
                    "baseAction": { "value": "pass" },
                    "match": { "entries": [
                        { "destinationDataPrefixList": { "refId": { "value": ["ref-known"] } } },
                        { "destinationPortList": { "refId": { "value": ["ref-missing"] } } }
                    ] }
                }] }
            }
        }] }),
    )
    .await;
    mount_get(
        &server,
        "/dataservice/v1/feature-profile/sdwan/policy-object/ref-known",
        json!({ "name": "pci_servers" }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/dataservice/v1/feature-profile/sdwan/policy-object/ref-missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let parcels = controller.ngfw_parcels("sec-1").await.unwrap();
    let mut rules = parse_ngfw_rules(&parcels);
    controller.resolve_list_names(&mut rules).await;

    let rule = &rules[0];
    assert_eq!(rule.prefix_list.as_ref().unwrap().label(), "pci_servers");
    assert_eq!(rule.port_list.as_ref().unwrap().label(), "ref-missing");
}
