//! Splitting of raw `cargo test -- --list` output into test declarations.
//!
//! A listing looks like:
//!
//! ```text
//! tests::adds: test
//! tests::nested::divides: test
//!
//! 2 tests, 0 benchmarks
//! ```
//!
//! Everything after the first blank line is summary text and is ignored.

/// Separates the declaration block from the trailing summary.
pub const PARAGRAPH_BREAK: &str = "\n\n";
/// Ends the qualified name on a declaration line.
pub const TEST_MARKER: &str = ": test";
pub const PATH_SEPARATOR: &str = "::";
/// Summary line printed by the test harness when a target has nothing to list.
pub const NO_TESTS_MARKER: &str = "0 tests,";

/// Returns the declaration block of a listing, i.e. everything before the first blank line.
///
/// Without a blank line the whole text is the body.
pub fn listing_body(output: &str) -> &str {
    output
        .split_once(PARAGRAPH_BREAK)
        .map_or(output, |(body, _)| body)
}

/// Iterates the declaration lines of a listing, skipping blank lines.
pub fn declaration_lines(output: &str) -> impl Iterator<Item = &str> {
    listing_body(output)
        .split('\n')
        .filter(|line| !line.trim().is_empty())
}

/// `true` when a listing should contribute nothing: it is empty, or any of its lines starts
/// with the `0 tests,` summary.
pub fn has_no_tests(output: &str) -> bool {
    output.trim().is_empty() || output.split('\n').any(|line| line.starts_with(NO_TESTS_MARKER))
}

/// A declaration line decomposed into its module path and test name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPath<'a> {
    /// The declaration truncated at `": test"` (`tests::nested::divides`).
    pub qualified_name: &'a str,
    /// Enclosing modules, outermost first. Empty for a test at the target root.
    pub module_path: Vec<&'a str>,
    pub test_name: &'a str,
}

/// Decomposes a single declaration line.
///
/// No validation happens here: a line without the `": test"` marker is taken whole as the
/// qualified name, and empty segments (`a::::b`) are kept as-is.
pub fn parse_declaration(line: &str) -> TestPath<'_> {
    let qualified_name = line
        .split_once(TEST_MARKER)
        .map_or(line, |(name, _)| name);
    let mut module_path: Vec<&str> = qualified_name.split(PATH_SEPARATOR).collect();
    let test_name = module_path.pop().unwrap_or(qualified_name);

    TestPath {
        qualified_name,
        module_path,
        test_name,
    }
}
