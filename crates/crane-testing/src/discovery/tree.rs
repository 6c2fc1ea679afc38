use crate::schema::{TestInfo, TestNode, TestSuiteInfo};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SuiteHandle(usize);

#[derive(Debug)]
enum Child {
    Suite(SuiteHandle),
    Test(TestInfo),
}

#[derive(Debug)]
struct SuiteSlot {
    id: String,
    label: String,
    children: Vec<Child>,
}

/// Arena holding the UI suite tree while a parse is in progress.
///
/// Suites are addressed by [`SuiteHandle`] and memoized by id, so walking the same module path
/// twice reuses the existing chain. Children keep insertion order. The nested
/// [`TestSuiteInfo`] is only built by [`SuiteTree::into_info`].
#[derive(Debug)]
pub(crate) struct SuiteTree {
    slots: Vec<SuiteSlot>,
    by_id: HashMap<String, SuiteHandle>,
}

impl SuiteTree {
    pub(crate) fn new(root_id: impl Into<String>, root_label: impl Into<String>) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            by_id: HashMap::new(),
        };
        tree.alloc(root_id.into(), root_label.into());
        tree
    }

    pub(crate) fn root(&self) -> SuiteHandle {
        SuiteHandle(0)
    }

    pub(crate) fn find(&self, id: &str) -> Option<SuiteHandle> {
        self.by_id.get(id).copied()
    }

    /// Returns the suite with `id`, creating it under `parent` when it does not exist yet.
    ///
    /// The boolean is `true` when a new suite was created.
    pub(crate) fn get_or_insert_suite(
        &mut self,
        parent: SuiteHandle,
        id: &str,
        label: &str,
    ) -> (SuiteHandle, bool) {
        if let Some(existing) = self.find(id) {
            return (existing, false);
        }
        let handle = self.alloc(id.to_string(), label.to_string());
        self.slots[parent.0].children.push(Child::Suite(handle));
        (handle, true)
    }

    pub(crate) fn push_test(&mut self, parent: SuiteHandle, test: TestInfo) {
        self.slots[parent.0].children.push(Child::Test(test));
    }

    pub(crate) fn children_len(&self, suite: SuiteHandle) -> usize {
        self.slots[suite.0].children.len()
    }

    /// Builds the nested tree rooted at `suite`, consuming the arena.
    pub(crate) fn into_info(mut self, suite: SuiteHandle) -> TestSuiteInfo {
        self.take_info(suite)
    }

    fn take_info(&mut self, suite: SuiteHandle) -> TestSuiteInfo {
        let slot = &mut self.slots[suite.0];
        let id = std::mem::take(&mut slot.id);
        let label = std::mem::take(&mut slot.label);
        let children = std::mem::take(&mut slot.children);

        let children = children
            .into_iter()
            .map(|child| match child {
                Child::Suite(handle) => TestNode::Suite(self.take_info(handle)),
                Child::Test(test) => TestNode::Test(test),
            })
            .collect();

        TestSuiteInfo {
            id,
            label,
            children,
        }
    }

    fn alloc(&mut self, id: String, label: String) -> SuiteHandle {
        let handle = SuiteHandle(self.slots.len());
        self.by_id.insert(id.clone(), handle);
        self.slots.push(SuiteSlot {
            id,
            label,
            children: Vec::new(),
        });
        handle
    }
}
