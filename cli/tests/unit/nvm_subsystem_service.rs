//! NVM subsystem reconciliation and facts against a scripted array.

use serde_json::{Value, json};
use vsp_cli::application::services::nvm_subsystem::{ensure_nvm_subsystem, nvm_subsystem_facts};
use vsp_cli::domain::args::Ensure;
use vsp_cli::domain::http::Method;
use vsp_cli::domain::nvm::{NvmSubsystemFactsSpec, NvmSubsystemSpec};

use crate::helpers::{RecordingReporter, ScriptedTransport, manager};

const NQN: &str = "nqn.2014-08.org.nvmexpress:uuid:host01";

fn subsystem(id: u32, name: &str) -> Value {
    json!({
        "nvmSubsystemId": id,
        "nvmSubsystemName": name,
        "hostMode": "VMWARE_EX",
        "namespaceSecuritySetting": "Enable",
    })
}

fn spec(yaml: &str) -> NvmSubsystemSpec {
    serde_yaml::from_str(yaml).expect("valid spec")
}

/// A subsystem with one port, one host NQN and one namespace.
fn populated(transport: ScriptedTransport, id: u32, name: &str) -> ScriptedTransport {
    transport
        .get(&format!("v1/objects/nvm-subsystems/{id}"), subsystem(id, name))
        .get(
            "v1/objects/nvm-subsystem-ports",
            json!({"data": [{"nvmSubsystemId": id, "portId": "CL1-D"}]}),
        )
        .get(
            "v1/objects/host-nqns",
            json!({"data": [{"nvmSubsystemId": id, "hostNqn": NQN}]}),
        )
        .get(
            "v1/objects/namespaces",
            json!({"data": [{"nvmSubsystemId": id, "namespaceId": 1, "ldevId": 10}]}),
        )
}

#[test]
fn test_missing_subsystem_is_created_then_members_added() {
    let transport = ScriptedTransport::new()
        .missing("v1/objects/nvm-subsystems/5")
        .get("v1/objects/nvm-subsystems/5", subsystem(5, "nvme01"))
        .get("v1/objects/nvm-subsystem-ports", json!({"data": []}))
        .get("v1/objects/host-nqns", json!({"data": []}))
        .get("v1/objects/namespaces", json!({"data": []}))
        .job(Method::Post, "v1/objects/nvm-subsystems", "nvm-subsystems/5")
        .job(Method::Post, "v1/objects/nvm-subsystem-ports", "nvm-subsystem-ports/5,CL1-D")
        .job(Method::Post, "v1/objects/host-nqns", "host-nqns/5,x")
        .job(Method::Post, "v1/objects/namespaces", "namespaces/5,1");
    let cm = manager(transport);

    let done = ensure_nvm_subsystem(
        &cm,
        spec(&format!(
            "id: 5\nname: nvme01\nhost_mode: vmware_ex\nnamespace_security: true\nports: [cl1-d]\nhost_nqns: ['{NQN}']\nnamespaces: [10]\n"
        )),
        Ensure::Present,
        &RecordingReporter::default(),
    )
    .expect("reconcile");

    assert!(done.changed);
    assert_eq!(
        cm.transport().mutations(),
        vec![
            (Method::Post, "v1/objects/nvm-subsystems".to_string()),
            (Method::Post, "v1/objects/nvm-subsystem-ports".to_string()),
            (Method::Post, "v1/objects/host-nqns".to_string()),
            (Method::Post, "v1/objects/namespaces".to_string()),
        ]
    );
    assert_eq!(
        cm.transport().body(Method::Post, "v1/objects/nvm-subsystems", 0),
        json!({
            "nvmSubsystemId": 5,
            "nvmSubsystemName": "nvme01",
            "hostMode": "VMWARE_EX",
            "namespaceSecuritySetting": "Enable",
        })
    );
    assert_eq!(
        cm.transport()
            .body(Method::Post, "v1/objects/nvm-subsystem-ports", 0)["portId"],
        "CL1-D"
    );
    assert_eq!(
        cm.transport().body(Method::Post, "v1/objects/namespaces", 0)["ldevId"],
        10
    );
}

#[test]
fn test_members_already_present_are_not_re_added() {
    let cm = manager(populated(ScriptedTransport::new(), 5, "nvme01"));

    let done = ensure_nvm_subsystem(
        &cm,
        spec(&format!(
            "id: 5\nname: nvme01\nports: [CL1-D]\nhost_nqns: ['{NQN}']\nnamespaces: ['00:0A']\n"
        )),
        Ensure::Present,
        &RecordingReporter::default(),
    )
    .expect("reconcile");

    assert!(!done.changed);
    assert!(cm.transport().mutations().is_empty());
    let details = done.resource.expect("subsystem");
    assert_eq!(details.ports, vec!["CL1-D".to_string()]);
    assert_eq!(details.namespaces[0].ldev_id, 10);
}

#[test]
fn test_rename_patches_and_nothing_is_removed() {
    let transport = populated(ScriptedTransport::new(), 5, "old")
        .on(Method::Patch, "v1/objects/nvm-subsystems/5", 200, Value::Null);
    let cm = manager(transport);

    let done = ensure_nvm_subsystem(
        &cm,
        spec("id: 5\nname: new\n"),
        Ensure::Present,
        &RecordingReporter::default(),
    )
    .expect("reconcile");

    assert!(done.changed);
    assert_eq!(
        cm.transport().mutations(),
        vec![(Method::Patch, "v1/objects/nvm-subsystems/5".to_string())]
    );
    assert_eq!(
        cm.transport().body(Method::Patch, "v1/objects/nvm-subsystems/5", 0),
        json!({"nvmSubsystemName": "new"})
    );
}

#[test]
fn test_absent_subsystem_is_deleted() {
    let transport = populated(ScriptedTransport::new(), 5, "nvme01").job(
        Method::Delete,
        "v1/objects/nvm-subsystems/5",
        "nvm-subsystems/5",
    );
    let cm = manager(transport);

    let done = ensure_nvm_subsystem(
        &cm,
        spec("id: 5\n"),
        Ensure::Absent,
        &RecordingReporter::default(),
    )
    .expect("reconcile");

    assert!(done.changed);
    assert!(done.resource.is_none());
}

#[test]
fn test_bad_nqn_and_id_fail_validation() {
    let cm = manager(ScriptedTransport::new());
    for yaml in ["id: 5\nhost_nqns: ['iqn.bad']\n", "id: 4096\n", "name: x\n"] {
        assert!(
            ensure_nvm_subsystem(&cm, spec(yaml), Ensure::Present, &RecordingReporter::default())
                .is_err(),
            "{yaml} should be rejected"
        );
    }
    assert!(cm.transport().requests().is_empty());
}

#[test]
fn test_facts_by_name_lists_and_filters() {
    let transport = ScriptedTransport::new()
        .get(
            "v1/objects/nvm-subsystems",
            json!({"data": [subsystem(5, "nvme01"), subsystem(6, "nvme02")]}),
        )
        .get("v1/objects/nvm-subsystem-ports", json!({"data": []}))
        .get("v1/objects/host-nqns", json!({"data": []}))
        .get("v1/objects/namespaces", json!({"data": []}));
    let cm = manager(transport);
    let spec: NvmSubsystemFactsSpec = serde_yaml::from_str("name: nvme02\n").expect("spec");

    let found = nvm_subsystem_facts(&cm, &spec).expect("facts");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].subsystem.nvm_subsystem_id, 6);
    assert_eq!(
        cm.transport().count(Method::Get, "v1/objects/nvm-subsystem-ports"),
        1,
        "members are only read for matching subsystems"
    );
}
