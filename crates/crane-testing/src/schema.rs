use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::CraneTestingError;

pub const SCHEMA_VERSION: u32 = 1;

/// A Cargo package whose targets produced test listings.
///
/// Only `name` is interpreted. Every other field (manifest path, version, ...) is kept in
/// `metadata` and serialised back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoPackage {
    pub name: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl CargoPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Map::new(),
        }
    }
}

/// Identifies the build artifact (`lib`, an integration test binary, ...) a listing came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTarget {
    pub target_name: String,
    pub target_type: String,
}

impl NodeTarget {
    pub fn new(target_name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            target_name: target_name.into(),
            target_type: target_type.into(),
        }
    }
}

impl fmt::Display for NodeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target_name, self.target_type)
    }
}

/// Parses the `name:type` form used on the command line (`lib:lib`, `integration:test`).
impl FromStr for NodeTarget {
    type Err = CraneTestingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, kind) = s
            .split_once(':')
            .ok_or_else(|| CraneTestingError::InvalidTarget(s.to_string()))?;
        let (name, kind) = (name.trim(), kind.trim());
        if name.is_empty() || kind.is_empty() {
            return Err(CraneTestingError::InvalidTarget(s.to_string()));
        }
        Ok(Self::new(name, kind))
    }
}

/// Raw `cargo test -- --list` output captured for one build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoTestListResult {
    pub output: String,
    pub node_target: NodeTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    /// Package and build-target grouping nodes.
    Structural,
    /// Module suites holding unit tests.
    Unit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestInfo {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteInfo {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub children: Vec<TestNode>,
}

impl TestSuiteInfo {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }
}

/// A node of the UI tree: either a grouping suite or a runnable test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TestNode {
    Suite(TestSuiteInfo),
    Test(TestInfo),
}

impl TestNode {
    pub fn id(&self) -> &str {
        match self {
            TestNode::Suite(suite) => &suite.id,
            TestNode::Test(test) => &test.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TestNode::Suite(suite) => &suite.label,
            TestNode::Test(test) => &test.label,
        }
    }

    pub fn as_suite(&self) -> Option<&TestSuiteInfo> {
        match self {
            TestNode::Suite(suite) => Some(suite),
            TestNode::Test(_) => None,
        }
    }

    pub fn as_test(&self) -> Option<&TestInfo> {
        match self {
            TestNode::Test(test) => Some(test),
            TestNode::Suite(_) => None,
        }
    }
}

/// Bookkeeping record for a suite (package, build target or module), keyed by the same id as
/// its [`TestSuiteInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteNode {
    pub id: String,
    pub package_name: String,
    /// `true` for synthetic grouping suites (package and target roots).
    pub is_structural: bool,
    pub category: NodeCategory,
    /// Accumulated `seg1::seg2::` module path; empty for structural suites.
    #[serde(default)]
    pub test_spec_name: String,
    #[serde(default)]
    pub targets: Vec<NodeTarget>,
    /// Ids of direct child suites and test cases, first-seen first.
    #[serde(default)]
    pub children_node_ids: Vec<String>,
}

impl TestSuiteNode {
    pub fn structural(id: impl Into<String>, package: &CargoPackage) -> Self {
        Self {
            id: id.into(),
            package_name: package.name.clone(),
            is_structural: true,
            category: NodeCategory::Structural,
            test_spec_name: String::new(),
            targets: Vec::new(),
            children_node_ids: Vec::new(),
        }
    }

    pub fn module(
        id: impl Into<String>,
        package: &CargoPackage,
        test_spec_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            package_name: package.name.clone(),
            is_structural: false,
            category: NodeCategory::Unit,
            test_spec_name: test_spec_name.into(),
            targets: Vec::new(),
            children_node_ids: Vec::new(),
        }
    }

    pub(crate) fn add_target(&mut self, target: &NodeTarget) {
        if !self.targets.contains(target) {
            self.targets.push(target.clone());
        }
    }

    /// Callers push each child once; a suite and a test case may share an id (`parse` next to
    /// `parse::x`) and both are listed.
    pub(crate) fn push_child_id(&mut self, id: &str) {
        self.children_node_ids.push(id.to_string());
    }
}

/// Bookkeeping record for one runnable test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseNode {
    pub id: String,
    pub package_name: String,
    pub node_target: NodeTarget,
    /// Id of the enclosing build-target suite.
    pub node_id_prefix: String,
    /// Module-qualified test name as printed by the listing (`tests::nested::adds`).
    pub test_spec_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedTestsResult {
    pub package: CargoPackage,
    pub root_test_suite: TestSuiteInfo,
    pub test_cases_map: BTreeMap<String, TestCaseNode>,
    pub test_suites_map: BTreeMap<String, TestSuiteNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestListRequest {
    #[serde(default)]
    pub package: Option<CargoPackage>,
    /// `null` entries stand for targets whose listing could not be produced.
    #[serde(default)]
    pub results: Vec<Option<CargoTestListResult>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestListResponse {
    pub schema_version: u32,
    /// `null` when there was nothing to parse.
    pub result: Option<LoadedTestsResult>,
}
