//! Crane testing core.
//!
//! Turns the textual output of `cargo test -- --list` into the test tree shown by a test
//! explorer. For one package it takes the listing of each build target and produces:
//! - a nested UI tree of suites (package, build target, module) and tests, and
//! - two flat side tables, suite-by-id and test-case-by-id, used to resolve ids later on
//!   (for example when running a single test).
//!
//! ## Ids
//!
//! Ids are built by joining with `::` and are stable across parses of the same listing:
//!
//! ```text
//! package     pkg
//! target      pkg::lib::test              (package::targetName::targetType)
//! module      pkg::lib::test::mod1::sub
//! test case   pkg::lib::test::mod1::sub::case_a
//! ```
//!
//! ## Stable JSON schema
//!
//! Request ([`schema::TestListRequest`]):
//!
//! ```json
//! {
//!   "package": { "name": "pkg", "manifestPath": "/work/pkg/Cargo.toml" },
//!   "results": [
//!     {
//!       "output": "mod1::sub::case_a: test\nmod1::case_b: test\n\n2 tests, 0 benchmarks",
//!       "nodeTarget": { "targetName": "lib", "targetType": "test" }
//!     },
//!     null
//!   ]
//! }
//! ```
//!
//! Response ([`schema::TestListResponse`]):
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "result": {
//!     "package": { "name": "pkg", "manifestPath": "/work/pkg/Cargo.toml" },
//!     "rootTestSuite": {
//!       "id": "pkg",
//!       "label": "pkg",
//!       "children": [
//!         {
//!           "type": "suite",
//!           "id": "pkg::lib::test::mod1",
//!           "label": "mod1",
//!           "children": [
//!             {
//!               "type": "suite",
//!               "id": "pkg::lib::test::mod1::sub",
//!               "label": "sub",
//!               "children": [
//!                 { "type": "test", "id": "pkg::lib::test::mod1::sub::case_a", "label": "case_a" }
//!               ]
//!             },
//!             { "type": "test", "id": "pkg::lib::test::mod1::case_b", "label": "case_b" }
//!           ]
//!         }
//!       ]
//!     },
//!     "testCasesMap": { "pkg::lib::test::mod1::case_b": { "...": "..." } },
//!     "testSuitesMap": { "pkg": { "...": "..." } }
//!   }
//! }
//! ```
//!
//! `result` is `null` when the request has no package or no results. A package with a single
//! contributing target is flattened: the target's children sit directly under the package.

pub mod discovery;
pub mod listing;
mod lookup;
pub mod schema;

mod util;

pub use discovery::{list_tests, parse_test_list_results, read_request};
pub use schema::SCHEMA_VERSION;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CraneTestingError {
    #[error("invalid build target `{0}` (expected `name:type`)")]
    InvalidTarget(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CraneTestingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_request_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"package": {{"name": "pkg"}}, "results": [null]}}"#
        )
        .unwrap();

        let req = read_request(file.path()).unwrap();
        assert_eq!(req.package.map(|p| p.name), Some("pkg".to_string()));
        assert_eq!(req.results, vec![None]);
    }

    #[test]
    fn malformed_request_is_a_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = read_request(file.path()).unwrap_err();
        assert!(matches!(err, CraneTestingError::SerdeJson(_)), "{err}");
    }

    #[test]
    fn missing_request_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_request(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CraneTestingError::Io(_)), "{err}");
    }
}
