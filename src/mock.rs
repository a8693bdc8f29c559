//! In-memory display used to drive the query/select/apply pipeline without touching a real adapter.

use std::cell::Cell;

use crate::{DispChange, DisplayMode, ModeChanger, ModeIndex, ModeSource};

/// A change call received by [`MockDisplay`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeCall {
    Test(DisplayMode),
    Commit(DisplayMode),
}

pub struct MockDisplay {
    current: Option<DisplayMode>,
    table: Vec<DisplayMode>,
    test_response: DispChange,
    commit_response: DispChange,
    enumerated_queries: Cell<usize>,
    calls: Vec<ChangeCall>,
}

impl MockDisplay {
    /// A display running in `current` whose driver reports `table`. Change calls succeed.
    pub fn new(current: Option<DisplayMode>, table: Vec<DisplayMode>) -> Self {
        Self {
            current,
            table,
            test_response: DispChange::Successful,
            commit_response: DispChange::Successful,
            enumerated_queries: Cell::new(0),
            calls: Vec::new(),
        }
    }

    /// Scripts the status codes returned by the test and commit calls.
    pub fn respond_with(&mut self, test: DispChange, commit: DispChange) {
        self.test_response = test;
        self.commit_response = commit;
    }

    pub fn calls(&self) -> &[ChangeCall] {
        &self.calls
    }

    pub fn test_calls(&self) -> usize {
        self.calls.iter().filter(|call| matches!(call, ChangeCall::Test(_))).count()
    }

    pub fn commit_calls(&self) -> usize {
        self.calls.iter().filter(|call| matches!(call, ChangeCall::Commit(_))).count()
    }

    pub fn enumerated_queries(&self) -> usize {
        self.enumerated_queries.get()
    }
}

impl ModeSource for MockDisplay {
    fn query_mode(&self, index: ModeIndex) -> Option<DisplayMode> {
        match index {
            ModeIndex::Current => self.current.clone(),
            ModeIndex::Enumerated(i) => {
                self.enumerated_queries.set(self.enumerated_queries.get() + 1);
                self.table.get(i as usize).cloned()
            }
        }
    }
}

impl ModeChanger for MockDisplay {
    fn test(&mut self, mode: &DisplayMode) -> DispChange {
        self.calls.push(ChangeCall::Test(mode.clone()));
        self.test_response
    }

    fn commit(&mut self, mode: &DisplayMode) -> DispChange {
        self.calls.push(ChangeCall::Commit(mode.clone()));
        self.commit_response
    }
}
