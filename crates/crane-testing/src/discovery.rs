use crate::listing::{declaration_lines, has_no_tests, parse_declaration};
use crate::schema::{
    CargoPackage, CargoTestListResult, LoadedTestsResult, NodeTarget, TestCaseNode, TestInfo,
    TestListRequest, TestListResponse, TestNode, TestSuiteNode,
};
use crate::util::{child_id, target_id};
use crate::{Result, SCHEMA_VERSION};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

mod tree;

use tree::{SuiteHandle, SuiteTree};

/// Builds the test tree for one package from the listings of its build targets.
///
/// Returns `None` when there is no package or no results at all. Individual `None` results and
/// listings reporting `0 tests,` are skipped; if every result is skipped the returned tree is
/// empty rather than `None`.
///
/// When exactly one target contributed, the package root adopts that target's children
/// directly instead of showing a single wrapping node.
pub fn parse_test_list_results(
    package: Option<&CargoPackage>,
    results: &[Option<CargoTestListResult>],
) -> Option<LoadedTestsResult> {
    let package = package?;
    if results.is_empty() {
        return None;
    }

    let mut ctx = ParseContext::new(package);
    for (idx, result) in results.iter().enumerate() {
        let Some(result) = result else {
            tracing::debug!(
                target: "crane.testing",
                package = %package.name,
                index = idx,
                "skipping missing test list result"
            );
            continue;
        };
        if has_no_tests(&result.output) {
            tracing::debug!(
                target: "crane.testing",
                package = %package.name,
                node_target = %result.node_target,
                "skipping target without tests"
            );
            continue;
        }

        ctx.merge_target(result);
    }

    Some(ctx.finish())
}

/// Applies [`parse_test_list_results`] to a request and wraps the outcome in the versioned
/// response envelope.
pub fn list_tests(req: &TestListRequest) -> TestListResponse {
    TestListResponse {
        schema_version: SCHEMA_VERSION,
        result: parse_test_list_results(req.package.as_ref(), &req.results),
    }
}

/// Reads a JSON [`TestListRequest`] from disk.
pub fn read_request(path: &Path) -> Result<TestListRequest> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Per-invocation state: the suite arena plus both side tables.
struct ParseContext<'a> {
    package: &'a CargoPackage,
    tree: SuiteTree,
    test_suites_map: BTreeMap<String, TestSuiteNode>,
    test_cases_map: BTreeMap<String, TestCaseNode>,
}

/// Where the leaves of one build target are attached.
struct TargetScope<'t> {
    id: String,
    handle: SuiteHandle,
    target: &'t NodeTarget,
}

impl<'a> ParseContext<'a> {
    fn new(package: &'a CargoPackage) -> Self {
        let mut test_suites_map = BTreeMap::new();
        test_suites_map.insert(
            package.name.clone(),
            TestSuiteNode::structural(package.name.as_str(), package),
        );

        Self {
            package,
            tree: SuiteTree::new(package.name.as_str(), package.name.as_str()),
            test_suites_map,
            test_cases_map: BTreeMap::new(),
        }
    }

    fn merge_target(&mut self, result: &CargoTestListResult) {
        let scope = self.register_target(&result.node_target);

        for line in declaration_lines(&result.output) {
            let path = parse_declaration(line);
            let (leaf, is_new) = self.insert_test_case(&scope, path.qualified_name, path.test_name);
            self.merge_module_path(&scope, &path.module_path, leaf, is_new);
        }
    }

    /// Creates (or, for a repeated target, reuses) the target root below the package root.
    fn register_target<'t>(&mut self, target: &'t NodeTarget) -> TargetScope<'t> {
        let package = self.package;
        let id = target_id(&package.name, target);
        let root = self.tree.root();
        let (handle, created) = self
            .tree
            .get_or_insert_suite(root, &id, &target.target_name);
        if !created {
            tracing::debug!(
                target: "crane.testing",
                target_id = %id,
                "merging repeated build target into existing suite"
            );
        }

        if let Some(package_root) = self.test_suites_map.get_mut(&package.name) {
            if created {
                package_root.push_child_id(&id);
            }
            package_root.add_target(target);
        }
        self.test_suites_map
            .entry(id.clone())
            .or_insert_with(|| TestSuiteNode::structural(id.as_str(), package))
            .add_target(target);

        TargetScope { id, handle, target }
    }

    fn insert_test_case(
        &mut self,
        scope: &TargetScope<'_>,
        qualified_name: &str,
        test_name: &str,
    ) -> (TestInfo, bool) {
        let id = child_id(&scope.id, qualified_name);
        let node = TestCaseNode {
            id: id.clone(),
            package_name: self.package.name.clone(),
            node_target: scope.target.clone(),
            node_id_prefix: scope.id.clone(),
            test_spec_name: qualified_name.to_string(),
        };
        let is_new = self.test_cases_map.insert(id.clone(), node).is_none();
        if !is_new {
            tracing::debug!(
                target: "crane.testing",
                test_id = %id,
                "duplicate test declaration; keeping the last one"
            );
        }

        let leaf = TestInfo {
            id,
            label: test_name.to_string(),
        };
        (leaf, is_new)
    }

    /// Walks `module_path` below the target root, creating missing module suites, then hangs
    /// `leaf` under the innermost one. `is_new_test` is `false` for a repeated declaration, whose
    /// id is already listed on the parent suite.
    fn merge_module_path(
        &mut self,
        scope: &TargetScope<'_>,
        module_path: &[&str],
        leaf: TestInfo,
        is_new_test: bool,
    ) {
        let mut current = scope.handle;
        let mut current_id = scope.id.clone();
        let mut test_spec_name = String::new();

        for segment in module_path {
            test_spec_name.push_str(segment);
            test_spec_name.push_str("::");
            let suite_id = child_id(&current_id, segment);

            if !self.test_suites_map.contains_key(&suite_id) {
                let mut suite = TestSuiteNode::module(
                    suite_id.as_str(),
                    self.package,
                    test_spec_name.as_str(),
                );
                suite.add_target(scope.target);
                self.test_suites_map.insert(suite_id.clone(), suite);
                if let Some(parent) = self.test_suites_map.get_mut(&current_id) {
                    parent.push_child_id(&suite_id);
                }
            }

            let (handle, _) = self.tree.get_or_insert_suite(current, &suite_id, segment);
            current = handle;
            current_id = suite_id;
        }

        if is_new_test {
            if let Some(parent) = self.test_suites_map.get_mut(&current_id) {
                parent.push_child_id(&leaf.id);
            }
        }
        self.tree.push_test(current, leaf);
    }

    fn finish(self) -> LoadedTestsResult {
        let root = self.tree.root();
        let single_target = self.tree.children_len(root) == 1;
        let mut root_test_suite = self.tree.into_info(root);

        if single_target {
            if let Some(TestNode::Suite(target)) = root_test_suite.children.pop() {
                root_test_suite.children = target.children;
            }
        }

        LoadedTestsResult {
            package: self.package.clone(),
            root_test_suite,
            test_cases_map: self.test_cases_map,
            test_suites_map: self.test_suites_map,
        }
    }
}
