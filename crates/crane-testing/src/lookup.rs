use crate::schema::{LoadedTestsResult, TestCaseNode, TestSuiteNode};
use crate::util::is_nested_id;
use std::ops::Bound;

impl LoadedTestsResult {
    pub fn test_case(&self, id: &str) -> Option<&TestCaseNode> {
        self.test_cases_map.get(id)
    }

    pub fn test_suite(&self, id: &str) -> Option<&TestSuiteNode> {
        self.test_suites_map.get(id)
    }

    pub fn test_count(&self) -> usize {
        self.test_cases_map.len()
    }

    /// All test cases nested anywhere below the suite `suite_id`, ordered by id.
    ///
    /// The package root matches every test case. Unknown suite ids yield nothing.
    pub fn test_cases_under(&self, suite_id: &str) -> Vec<&TestCaseNode> {
        if !self.test_suites_map.contains_key(suite_id) {
            return Vec::new();
        }
        self.test_cases_map
            .range::<str, _>((Bound::Included(suite_id), Bound::Unbounded))
            .take_while(|(id, _)| id.starts_with(suite_id))
            .filter(|(id, _)| is_nested_id(id, suite_id))
            .map(|(_, case)| case)
            .collect()
    }
}
