//! Volume reconciliation against a scripted array.

use serde_json::{Value, json};
use vsp_cli::application::services::volume::{ensure_volume, volume_facts};
use vsp_cli::domain::args::Ensure;
use vsp_cli::domain::http::Method;
use vsp_cli::domain::volume::{VolumeFactsSpec, VolumeSpec};

use crate::helpers::{RecordingReporter, ScriptedTransport, manager};

const GIB_BLOCKS: u64 = 2_097_152;

fn ldev(id: u32, blocks: u64, label: &str) -> Value {
    json!({
        "ldevId": id,
        "emulationType": "OPEN-V-CVS",
        "blockCapacity": blocks,
        "label": label,
        "poolId": 0,
        "status": "NML",
        "dataReductionMode": "disabled",
    })
}

fn spec(yaml: &str) -> VolumeSpec {
    serde_yaml::from_str(yaml).expect("valid spec")
}

#[test]
fn test_present_volume_already_matching_makes_no_changes() {
    let transport =
        ScriptedTransport::new().get("v1/objects/ldevs/10", ldev(10, GIB_BLOCKS, "db01"));
    let cm = manager(transport);
    let spec = spec("ldev_id: 10\npool_id: 0\nsize: 1GB\nname: db01\n");

    let done = ensure_volume(&cm, &spec, Ensure::Present, &RecordingReporter::default())
        .expect("reconcile");

    assert!(!done.changed);
    assert!(cm.transport().mutations().is_empty());
    assert_eq!(done.resource.map(|v| v.ldev_id), Some(10));
    assert!(done.message.contains("up to date"));
}

#[test]
fn test_missing_volume_is_created_once_then_read_back() {
    let transport = ScriptedTransport::new()
        .missing("v1/objects/ldevs/10")
        .get("v1/objects/ldevs/10", ldev(10, GIB_BLOCKS, ""))
        .job(Method::Post, "v1/objects/ldevs", "ldevs/10");
    let cm = manager(transport);
    let spec = spec("ldev_id: 10\npool_id: 0\nsize: 1GB\n");

    let done = ensure_volume(&cm, &spec, Ensure::Present, &RecordingReporter::default())
        .expect("reconcile");

    assert!(done.changed);
    assert!(cm.changed());
    assert_eq!(
        cm.transport().mutations(),
        vec![(Method::Post, "v1/objects/ldevs".to_string())]
    );
    assert_eq!(cm.transport().count(Method::Get, "v1/objects/ldevs/10"), 2);
    let body = cm.transport().body(Method::Post, "v1/objects/ldevs", 0);
    assert_eq!(body["ldevId"], 10);
    assert_eq!(body["poolId"], 0);
    assert_eq!(body["blockCapacity"], GIB_BLOCKS);
}

#[test]
fn test_new_volume_id_comes_from_the_job() {
    let transport = ScriptedTransport::new()
        .get("v1/objects/ldevs", json!({"data": [ldev(5, GIB_BLOCKS, "other")]}))
        .job(Method::Post, "v1/objects/ldevs", "ldevs/321")
        .get("v1/objects/ldevs/321", ldev(321, GIB_BLOCKS, "db02"));
    let cm = manager(transport);
    let spec = spec("pool_id: 0\nsize: 1GB\nname: db02\n");

    let done = ensure_volume(&cm, &spec, Ensure::Present, &RecordingReporter::default())
        .expect("reconcile");

    assert_eq!(done.resource.map(|v| v.ldev_id), Some(321));
    assert!(
        cm.transport().body(Method::Post, "v1/objects/ldevs", 0)["ldevId"].is_null(),
        "the array picks the id"
    );
}

#[test]
fn test_volume_found_by_label_is_not_created_again() {
    let transport = ScriptedTransport::new().get(
        "v1/objects/ldevs?ldevOption=defined&count=16384",
        json!({"data": [ldev(76, GIB_BLOCKS, "web01"), ldev(77, GIB_BLOCKS, "db01")]}),
    );
    let cm = manager(transport);
    let spec = spec("pool_id: 0\nsize: 1GB\nname: db01\n");

    let done = ensure_volume(&cm, &spec, Ensure::Present, &RecordingReporter::default())
        .expect("reconcile");

    assert!(!done.changed);
    assert!(cm.transport().mutations().is_empty());
    assert_eq!(done.resource.map(|v| v.ldev_id), Some(77));
}

#[test]
fn test_second_run_by_label_is_idempotent() {
    let transport = ScriptedTransport::new()
        .get("v1/objects/ldevs", json!({"data": []}))
        .get("v1/objects/ldevs", json!({"data": [ldev(321, GIB_BLOCKS, "db02")]}))
        .job(Method::Post, "v1/objects/ldevs", "ldevs/321")
        .get("v1/objects/ldevs/321", ldev(321, GIB_BLOCKS, "db02"));
    let cm = manager(transport);
    let spec = spec("pool_id: 0\nsize: 1GB\nname: db02\n");
    let reporter = RecordingReporter::default();

    let first = ensure_volume(&cm, &spec, Ensure::Present, &reporter).expect("first run");
    let second = ensure_volume(&cm, &spec, Ensure::Present, &reporter).expect("second run");

    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(
        cm.transport().mutations(),
        vec![(Method::Post, "v1/objects/ldevs".to_string())]
    );
}

#[test]
fn test_duplicate_labels_are_refused() {
    let transport = ScriptedTransport::new().get(
        "v1/objects/ldevs",
        json!({"data": [ldev(7, GIB_BLOCKS, "db01"), ldev(8, GIB_BLOCKS, "db01")]}),
    );
    let cm = manager(transport);

    let err = ensure_volume(
        &cm,
        &spec("pool_id: 0\nsize: 1GB\nname: db01\n"),
        Ensure::Present,
        &RecordingReporter::default(),
    )
    .expect_err("ambiguous");

    assert!(format!("{err:#}").contains("set ldev_id"));
    assert!(cm.transport().mutations().is_empty());
}

#[test]
fn test_present_without_id_or_name_fails_before_any_request() {
    let cm = manager(ScriptedTransport::new());
    let err = ensure_volume(
        &cm,
        &spec("pool_id: 0\nsize: 1GB\n"),
        Ensure::Present,
        &RecordingReporter::default(),
    )
    .expect_err("unidentified volume");
    assert!(format!("{err:#}").contains("spec.name"));
    assert!(cm.transport().requests().is_empty());
}

#[test]
fn test_pool_and_parity_group_together_fail_before_any_request() {
    let cm = manager(ScriptedTransport::new());
    let spec = spec("ldev_id: 10\npool_id: 0\nparity_group: 1-1\nsize: 1GB\n");

    let err = ensure_volume(&cm, &spec, Ensure::Present, &RecordingReporter::default())
        .expect_err("exclusive fields");

    assert!(format!("{err:#}").contains("parity_group"));
    assert!(cm.transport().requests().is_empty());
    assert!(!cm.changed());
}

#[test]
fn test_growing_volume_expands_by_the_difference() {
    let transport = ScriptedTransport::new()
        .get("v1/objects/ldevs/10", ldev(10, GIB_BLOCKS, "db01"))
        .get("v1/objects/ldevs/10", ldev(10, 2 * GIB_BLOCKS, "db01"))
        .job(Method::Post, "v1/objects/ldevs/10/actions/expand/invoke", "ldevs/10");
    let cm = manager(transport);
    let spec = spec("ldev_id: 10\nsize: 2GB\n");

    let done = ensure_volume(&cm, &spec, Ensure::Present, &RecordingReporter::default())
        .expect("reconcile");

    assert!(done.changed);
    let body = cm
        .transport()
        .body(Method::Post, "v1/objects/ldevs/10/actions/expand/invoke", 0);
    assert_eq!(body["parameters"]["additionalBlockCapacity"], GIB_BLOCKS);
    assert_eq!(done.resource.and_then(|v| v.block_capacity), Some(2 * GIB_BLOCKS));
}

#[test]
fn test_shrinking_volume_is_refused_without_requests() {
    let transport =
        ScriptedTransport::new().get("v1/objects/ldevs/10", ldev(10, 2 * GIB_BLOCKS, "db01"));
    let cm = manager(transport);
    let spec = spec("ldev_id: 10\nsize: 1GB\n");

    let err = ensure_volume(&cm, &spec, Ensure::Present, &RecordingReporter::default())
        .expect_err("shrink");

    assert!(format!("{err:#}").contains("shrinking"));
    assert!(cm.transport().mutations().is_empty());
}

#[test]
fn test_rename_patches_label() {
    let transport = ScriptedTransport::new()
        .get("v1/objects/ldevs/10", ldev(10, GIB_BLOCKS, "old"))
        .get("v1/objects/ldevs/10", ldev(10, GIB_BLOCKS, "new"))
        .on(Method::Patch, "v1/objects/ldevs/10", 200, Value::Null);
    let cm = manager(transport);

    let done = ensure_volume(
        &cm,
        &spec("ldev_id: 10\nname: new\n"),
        Ensure::Present,
        &RecordingReporter::default(),
    )
    .expect("reconcile");

    assert!(done.changed);
    assert_eq!(
        cm.transport().body(Method::Patch, "v1/objects/ldevs/10", 0),
        json!({"label": "new"})
    );
}

#[test]
fn test_absent_volume_already_gone_is_unchanged() {
    let cm = manager(ScriptedTransport::new().missing("v1/objects/ldevs/10"));

    let done = ensure_volume(
        &cm,
        &spec("ldev_id: 10\n"),
        Ensure::Absent,
        &RecordingReporter::default(),
    )
    .expect("reconcile");

    assert!(!done.changed);
    assert!(done.resource.is_none());
    assert!(cm.transport().mutations().is_empty());
}

#[test]
fn test_not_defined_volume_counts_as_absent() {
    let cm = manager(ScriptedTransport::new().get(
        "v1/objects/ldevs/10",
        json!({"ldevId": 10, "emulationType": "NOT DEFINED"}),
    ));

    let done = ensure_volume(
        &cm,
        &spec("ldev_id: 10\n"),
        Ensure::Absent,
        &RecordingReporter::default(),
    )
    .expect("reconcile");

    assert!(!done.changed);
}

#[test]
fn test_mapped_volume_delete_requires_force() {
    let mut mapped = ldev(10, GIB_BLOCKS, "db01");
    mapped["ports"] = json!([{"portId": "CL1-A", "hostGroupNumber": 1, "lun": 3}]);
    let cm = manager(ScriptedTransport::new().get("v1/objects/ldevs/10", mapped));

    let err = ensure_volume(
        &cm,
        &spec("ldev_id: 10\n"),
        Ensure::Absent,
        &RecordingReporter::default(),
    )
    .expect_err("mapped");

    assert!(format!("{err:#}").contains("force"));
    assert!(cm.transport().mutations().is_empty());
}

#[test]
fn test_forced_delete_unmaps_every_path_first() {
    let mut mapped = ldev(10, GIB_BLOCKS, "db01");
    mapped["ports"] = json!([
        {"portId": "CL1-A", "hostGroupNumber": 1, "lun": 3},
        {"portId": "CL2-A", "hostGroupNumber": 4, "lun": 0},
    ]);
    let transport = ScriptedTransport::new()
        .get("v1/objects/ldevs/10", mapped)
        .on(Method::Delete, "v1/objects/luns/CL1-A,1,3", 200, Value::Null)
        .on(Method::Delete, "v1/objects/luns/CL2-A,4,0", 200, Value::Null)
        .job(Method::Delete, "v1/objects/ldevs/10", "ldevs/10");
    let cm = manager(transport);

    let done = ensure_volume(
        &cm,
        &spec("ldev_id: 10\nforce: true\n"),
        Ensure::Absent,
        &RecordingReporter::default(),
    )
    .expect("reconcile");

    assert!(done.changed);
    assert_eq!(
        cm.transport().mutations(),
        vec![
            (Method::Delete, "v1/objects/luns/CL1-A,1,3".to_string()),
            (Method::Delete, "v1/objects/luns/CL2-A,4,0".to_string()),
            (Method::Delete, "v1/objects/ldevs/10".to_string()),
        ]
    );
}

#[test]
fn test_absent_without_ldev_id_is_a_validation_error() {
    let cm = manager(ScriptedTransport::new());
    let err = ensure_volume(
        &cm,
        &spec("pool_id: 0\n"),
        Ensure::Absent,
        &RecordingReporter::default(),
    )
    .expect_err("missing id");
    assert!(format!("{err:#}").contains("ldev_id"));
    assert!(cm.transport().requests().is_empty());
}

#[test]
fn test_facts_by_id_skips_undefined_volume() {
    let cm = manager(ScriptedTransport::new().get(
        "v1/objects/ldevs/10",
        json!({"ldevId": 10, "emulationType": "NOT DEFINED"}),
    ));
    let spec = VolumeFactsSpec {
        ldev_id: Some("10".parse().expect("id")),
        ..VolumeFactsSpec::default()
    };
    assert!(volume_facts(&cm, &spec).expect("facts").is_empty());
}

#[test]
fn test_facts_listing_sends_query_and_filters_by_name() {
    let transport = ScriptedTransport::new().get(
        "v1/objects/ldevs?ldevOption=defined&headLdevId=5&count=2",
        json!({"data": [ldev(5, GIB_BLOCKS, "a"), ldev(6, GIB_BLOCKS, "b")]}),
    );
    let cm = manager(transport);
    let spec: VolumeFactsSpec =
        serde_yaml::from_str("start_ldev_id: 5\ncount: 2\nname: b\n").expect("spec");

    let volumes = volume_facts(&cm, &spec).expect("facts");

    assert_eq!(volumes.len(), 1);
    assert_eq!(volumes[0].ldev_id, 6);
}
