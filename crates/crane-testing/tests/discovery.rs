use crane_testing::schema::{
    CargoPackage, CargoTestListResult, NodeTarget, TestListRequest, TestNode, TestSuiteInfo,
};
use crane_testing::{list_tests, parse_test_list_results, SCHEMA_VERSION};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).unwrap()
}

fn result(name: &str, kind: &str, output: impl Into<String>) -> Option<CargoTestListResult> {
    Some(CargoTestListResult {
        output: output.into(),
        node_target: NodeTarget::new(name, kind),
    })
}

fn child_ids(suite: &TestSuiteInfo) -> Vec<&str> {
    suite.children.iter().map(TestNode::id).collect()
}

fn suite<'a>(parent: &'a TestSuiteInfo, id: &str) -> &'a TestSuiteInfo {
    parent
        .children
        .iter()
        .find(|c| c.id() == id)
        .and_then(TestNode::as_suite)
        .unwrap_or_else(|| panic!("missing suite {id} under {}", parent.id))
}

#[test]
fn single_target_listing_is_flattened_under_package() {
    let package = CargoPackage::new("pkg");
    let loaded = parse_test_list_results(
        Some(&package),
        &[result(
            "lib",
            "test",
            "mod1::sub::case_a: test\nmod1::case_b: test\n\n2 tests",
        )],
    )
    .unwrap();

    let root = &loaded.root_test_suite;
    assert_eq!(root.id, "pkg");
    assert_eq!(root.label, "pkg");
    assert_eq!(child_ids(root), vec!["pkg::lib::test::mod1"]);

    let mod1 = suite(root, "pkg::lib::test::mod1");
    assert_eq!(mod1.label, "mod1");
    assert_eq!(
        child_ids(mod1),
        vec!["pkg::lib::test::mod1::sub", "pkg::lib::test::mod1::case_b"]
    );

    let sub = suite(mod1, "pkg::lib::test::mod1::sub");
    assert_eq!(child_ids(sub), vec!["pkg::lib::test::mod1::sub::case_a"]);
    assert_eq!(sub.children[0].label(), "case_a");
    assert!(sub.children[0].as_test().is_some());

    let suite_ids: Vec<_> = loaded.test_suites_map.keys().map(String::as_str).collect();
    assert_eq!(
        suite_ids,
        vec![
            "pkg",
            "pkg::lib::test",
            "pkg::lib::test::mod1",
            "pkg::lib::test::mod1::sub",
        ]
    );
    let case_ids: Vec<_> = loaded.test_cases_map.keys().map(String::as_str).collect();
    assert_eq!(
        case_ids,
        vec![
            "pkg::lib::test::mod1::case_b",
            "pkg::lib::test::mod1::sub::case_a",
        ]
    );
}

#[test]
fn multiple_targets_keep_one_node_per_target() {
    let package = CargoPackage::new("crane");
    let loaded = parse_test_list_results(
        Some(&package),
        &[
            result("crane", "lib", fixture("lib-unit.txt")),
            result("workflows", "test", fixture("integration.txt")),
        ],
    )
    .unwrap();

    let root = &loaded.root_test_suite;
    assert_eq!(
        child_ids(root),
        vec!["crane::crane::lib", "crane::workflows::test"]
    );

    let lib = suite(root, "crane::crane::lib");
    assert_eq!(lib.label, "crane");
    assert_eq!(
        child_ids(lib),
        vec![
            "crane::crane::lib::config",
            "crane::crane::lib::parser",
            "crane::crane::lib::smoke",
        ]
    );
    let lexer_tests = suite(
        suite(suite(lib, "crane::crane::lib::parser"), "crane::crane::lib::parser::lexer"),
        "crane::crane::lib::parser::lexer::tests",
    );
    assert_eq!(
        child_ids(lexer_tests),
        vec![
            "crane::crane::lib::parser::lexer::tests::skips_whitespace",
            "crane::crane::lib::parser::lexer::tests::tokenizes_idents",
        ]
    );

    let workflows = suite(root, "crane::workflows::test");
    assert_eq!(workflows.label, "workflows");
    assert_eq!(
        child_ids(workflows),
        vec![
            "crane::workflows::test::cli_runs_with_help",
            "crane::workflows::test::workflows",
        ]
    );

    assert_eq!(loaded.test_cases_map.len(), 9);
    let package_root = &loaded.test_suites_map["crane"];
    assert_eq!(
        package_root.children_node_ids,
        vec!["crane::crane::lib", "crane::workflows::test"]
    );
    assert_eq!(
        package_root.targets,
        vec![
            NodeTarget::new("crane", "lib"),
            NodeTarget::new("workflows", "test"),
        ]
    );
    assert_eq!(
        loaded.test_suites_map["crane::crane::lib::parser::lexer"].test_spec_name,
        "parser::lexer::"
    );
}

#[test]
fn zero_test_results_contribute_nothing() {
    let package = CargoPackage::new("pkg");
    let loaded = parse_test_list_results(
        Some(&package),
        &[
            result("lib", "lib", "0 tests, 0 passed"),
            result("empty", "test", fixture("no-tests.txt")),
        ],
    )
    .unwrap();

    assert!(loaded.root_test_suite.children.is_empty());
    assert!(loaded.test_cases_map.is_empty());
    assert_eq!(loaded.test_suites_map.len(), 1);
    assert!(loaded.test_suites_map["pkg"].children_node_ids.is_empty());
}

#[test]
fn skipped_results_do_not_prevent_flattening() {
    let package = CargoPackage::new("pkg");
    let loaded = parse_test_list_results(
        Some(&package),
        &[
            None,
            result("empty", "test", "0 tests, 0 benchmarks\n"),
            result("lib", "lib", "a::t: test\n\n1 test"),
        ],
    )
    .unwrap();

    assert_eq!(child_ids(&loaded.root_test_suite), vec!["pkg::lib::lib::a"]);
    assert!(loaded.test_suite("pkg::empty::test").is_none());
}

#[test]
fn missing_package_or_results_yield_no_result() {
    let package = CargoPackage::new("pkg");
    assert_eq!(parse_test_list_results(Some(&package), &[]), None);
    assert_eq!(
        parse_test_list_results(None, &[result("lib", "lib", "t: test")]),
        None
    );
}

#[test]
fn all_null_results_yield_an_empty_tree() {
    let package = CargoPackage::new("pkg");
    let loaded = parse_test_list_results(Some(&package), &[None, None]).unwrap();
    assert_eq!(loaded.root_test_suite, TestSuiteInfo::new("pkg", "pkg"));
    assert_eq!(loaded.test_count(), 0);
}

#[test]
fn response_json_matches_host_schema() {
    let request: TestListRequest = serde_json::from_value(serde_json::json!({
        "package": { "name": "pkg", "manifestPath": "/work/pkg/Cargo.toml" },
        "results": [
            {
                "output": "smoke: test\n\n1 test, 0 benchmarks",
                "nodeTarget": { "targetName": "lib", "targetType": "lib" }
            },
            null
        ]
    }))
    .unwrap();

    let response = serde_json::to_value(list_tests(&request)).unwrap();
    assert_eq!(response["schemaVersion"], SCHEMA_VERSION);
    assert_eq!(
        response["result"]["package"]["manifestPath"],
        "/work/pkg/Cargo.toml"
    );
    assert_eq!(
        response["result"]["rootTestSuite"],
        serde_json::json!({
            "id": "pkg",
            "label": "pkg",
            "children": [
                { "type": "test", "id": "pkg::lib::lib::smoke", "label": "smoke" }
            ]
        })
    );
    assert_eq!(
        response["result"]["testCasesMap"]["pkg::lib::lib::smoke"],
        serde_json::json!({
            "id": "pkg::lib::lib::smoke",
            "packageName": "pkg",
            "nodeTarget": { "targetName": "lib", "targetType": "lib" },
            "nodeIdPrefix": "pkg::lib::lib",
            "testSpecName": "smoke"
        })
    );
    assert_eq!(
        response["result"]["testSuitesMap"]["pkg::lib::lib"],
        serde_json::json!({
            "id": "pkg::lib::lib",
            "packageName": "pkg",
            "isStructural": true,
            "category": "structural",
            "testSpecName": "",
            "targets": [{ "targetName": "lib", "targetType": "lib" }],
            "childrenNodeIds": ["pkg::lib::lib::smoke"]
        })
    );
}

#[test]
fn no_result_response_serializes_null() {
    let response = serde_json::to_value(list_tests(&TestListRequest {
        package: None,
        results: Vec::new(),
    }))
    .unwrap();
    assert_eq!(
        response,
        serde_json::json!({ "schemaVersion": 1, "result": null })
    );
}
