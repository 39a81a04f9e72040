//! Host group reconciliation and facts against a scripted array.

use serde_json::{Value, json};
use vsp_cli::application::services::host_group::{ensure_host_group, host_group_facts};
use vsp_cli::domain::args::Ensure;
use vsp_cli::domain::host_group::{HostGroupFactsSpec, HostGroupSpec};
use vsp_cli::domain::http::Method;

use crate::helpers::{RecordingReporter, ScriptedTransport, manager};

fn group(port: &str, number: u32, name: &str) -> Value {
    json!({
        "hostGroupId": format!("{port},{number}"),
        "portId": port,
        "hostGroupNumber": number,
        "hostGroupName": name,
        "hostMode": "LINUX/IRIX",
        "hostModeOptions": [],
    })
}

fn wwn(port: &str, number: u32, wwn: &str) -> Value {
    json!({
        "hostWwnId": format!("{port},{number},{wwn}"),
        "portId": port,
        "hostGroupNumber": number,
        "hostWwn": wwn,
    })
}

fn lun_path(port: &str, number: u32, lun: u32, ldev: u32) -> Value {
    json!({
        "lunId": format!("{port},{number},{lun}"),
        "portId": port,
        "hostGroupNumber": number,
        "lun": lun,
        "ldevId": ldev,
    })
}

fn spec(yaml: &str) -> HostGroupSpec {
    serde_yaml::from_str(yaml).expect("valid spec")
}

#[test]
fn test_missing_group_is_created_with_wwns_and_luns() {
    let transport = ScriptedTransport::new()
        .get("v1/objects/host-groups", json!({"data": []}))
        .job(Method::Post, "v1/objects/host-groups", "host-groups/CL1-A,5")
        .get("v1/objects/host-groups/CL1-A,5", group("CL1-A", 5, "esx01"))
        .get("v1/objects/host-wwns", json!({"data": []}))
        .get(
            "v1/objects/host-wwns",
            json!({"data": [wwn("CL1-A", 5, "50060e8012345678")]}),
        )
        .get("v1/objects/luns", json!({"data": []}))
        .get("v1/objects/luns", json!({"data": [lun_path("CL1-A", 5, 0, 10)]}))
        .job(Method::Post, "v1/objects/host-wwns", "host-wwns/CL1-A,5,50060e8012345678")
        .job(Method::Post, "v1/objects/luns", "luns/CL1-A,5,0");
    let cm = manager(transport);
    let spec = spec(
        "port: cl1-a\nname: esx01\nwwns: ['50:06:0E:80:12:34:56:78']\nluns: ['00:0A']\n",
    );

    let done = ensure_host_group(&cm, spec, Ensure::Present, &RecordingReporter::default())
        .expect("reconcile");

    assert!(done.changed);
    assert_eq!(
        cm.transport().mutations(),
        vec![
            (Method::Post, "v1/objects/host-groups".to_string()),
            (Method::Post, "v1/objects/host-wwns".to_string()),
            (Method::Post, "v1/objects/luns".to_string()),
        ]
    );
    let create = cm.transport().body(Method::Post, "v1/objects/host-groups", 0);
    assert_eq!(create["portId"], "CL1-A");
    assert_eq!(create["hostGroupName"], "esx01");
    let lun = cm.transport().body(Method::Post, "v1/objects/luns", 0);
    assert_eq!(lun["ldevId"], 10);
    assert_eq!(lun["hostGroupNumber"], 5);
    let resource = done.resource.expect("group");
    assert_eq!(resource.lun_paths.len(), 1);
    assert_eq!(resource.wwns[0].host_wwn, "50060e8012345678");
}

#[test]
fn test_matching_group_is_left_alone() {
    let transport = ScriptedTransport::new()
        .get(
            "v1/objects/host-groups",
            json!({"data": [group("CL1-A", 1, "other"), group("CL1-A", 5, "esx01")]}),
        )
        .get(
            "v1/objects/host-wwns",
            json!({"data": [wwn("CL1-A", 5, "50060e8012345678")]}),
        )
        .get("v1/objects/luns", json!({"data": [lun_path("CL1-A", 5, 0, 10)]}));
    let cm = manager(transport);

    let done = ensure_host_group(
        &cm,
        spec("port: CL1-A\nname: esx01\nwwns: ['50060E8012345678']\nluns: [10]\n"),
        Ensure::Present,
        &RecordingReporter::default(),
    )
    .expect("reconcile");

    assert!(!done.changed);
    assert!(cm.transport().mutations().is_empty());
}

#[test]
fn test_exclusive_removes_unlisted_wwns_and_paths() {
    let transport = ScriptedTransport::new()
        .get("v1/objects/host-groups/CL1-A,5", group("CL1-A", 5, "esx01"))
        .get(
            "v1/objects/host-wwns",
            json!({"data": [wwn("CL1-A", 5, "50060e8012345678"), wwn("CL1-A", 5, "50060e80aaaaaaaa")]}),
        )
        .get(
            "v1/objects/luns",
            json!({"data": [lun_path("CL1-A", 5, 0, 10), lun_path("CL1-A", 5, 1, 11)]}),
        )
        .on(
            Method::Delete,
            "v1/objects/host-wwns/CL1-A,5,50060e80aaaaaaaa",
            200,
            Value::Null,
        )
        .on(Method::Delete, "v1/objects/luns/CL1-A,5,1", 200, Value::Null);
    let cm = manager(transport);

    let done = ensure_host_group(
        &cm,
        spec("port: CL1-A\nhost_group_number: 5\nwwns: ['50060e8012345678']\nluns: [10]\nexclusive: true\n"),
        Ensure::Present,
        &RecordingReporter::default(),
    )
    .expect("reconcile");

    assert!(done.changed);
    assert_eq!(
        cm.transport().mutations(),
        vec![
            (
                Method::Delete,
                "v1/objects/host-wwns/CL1-A,5,50060e80aaaaaaaa".to_string()
            ),
            (Method::Delete, "v1/objects/luns/CL1-A,5,1".to_string()),
        ]
    );
}

#[test]
fn test_absent_group_is_deleted() {
    let transport = ScriptedTransport::new()
        .get("v1/objects/host-groups/CL1-A,5", group("CL1-A", 5, "esx01"))
        .get("v1/objects/host-wwns", json!({"data": []}))
        .get("v1/objects/luns", json!({"data": []}))
        .job(Method::Delete, "v1/objects/host-groups/CL1-A,5", "host-groups/CL1-A,5");
    let cm = manager(transport);

    let done = ensure_host_group(
        &cm,
        spec("port: CL1-A\nhost_group_number: 5\n"),
        Ensure::Absent,
        &RecordingReporter::default(),
    )
    .expect("reconcile");

    assert!(done.changed);
    assert!(done.resource.is_none());
    assert_eq!(cm.transport().count(Method::Delete, "v1/objects/host-groups/CL1-A,5"), 1);
}

#[test]
fn test_bad_port_fails_before_any_request() {
    let cm = manager(ScriptedTransport::new());
    let err = ensure_host_group(
        &cm,
        spec("port: not-a-port\nname: esx01\n"),
        Ensure::Present,
        &RecordingReporter::default(),
    )
    .expect_err("bad port");
    assert!(format!("{err:#}").contains("port"));
    assert!(cm.transport().requests().is_empty());
}

#[test]
fn test_facts_lun_filter_keeps_only_matching_paths() {
    let transport = ScriptedTransport::new()
        .get(
            "v1/objects/host-groups?portId=CL1-A",
            json!({"data": [group("CL1-A", 1, "a"), group("CL1-A", 2, "b")]}),
        )
        .get("v1/objects/host-wwns", json!({"data": []}))
        .get(
            "v1/objects/luns?portId=CL1-A&hostGroupNumber=1",
            json!({"data": [lun_path("CL1-A", 1, 0, 10), lun_path("CL1-A", 1, 1, 11)]}),
        )
        .get(
            "v1/objects/luns?portId=CL1-A&hostGroupNumber=2",
            json!({"data": [lun_path("CL1-A", 2, 0, 12)]}),
        );
    let cm = manager(transport);
    let spec: HostGroupFactsSpec =
        serde_yaml::from_str("ports: [CL1-A]\nlun: '0:A'\n").expect("spec");

    let groups = host_group_facts(&cm, &spec).expect("facts");

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].host_group.host_group_name, "a");
    assert_eq!(groups[0].lun_paths.len(), 1);
    assert_eq!(groups[0].lun_paths[0].ldev_id, 10);
}

#[test]
fn test_facts_without_ports_lists_every_group() {
    let transport = ScriptedTransport::new()
        .get(
            "v1/objects/host-groups",
            json!([group("CL1-A", 1, "a"), group("CL2-B", 1, "b")]),
        )
        .get("v1/objects/host-wwns", json!({"data": []}))
        .get("v1/objects/luns", json!({"data": []}));
    let cm = manager(transport);
    let spec: HostGroupFactsSpec = serde_yaml::from_str("name: b\n").expect("spec");

    let groups = host_group_facts(&cm, &spec).expect("facts");

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].host_group.port_id, "CL2-B");
    assert_eq!(cm.transport().count(Method::Get, "v1/objects/host-groups"), 1);
}
