//! Back/forward stack projections.
//!
//! Each stack is a live, filtered view anchored at the journal's
//! *committed* position: the back stack walks downward from
//! `current - 1`, the forward stack upward from `current + 1`. Entries
//! that are not navigable are omitted from the sequence, not treated as
//! stops.
//!
//! Iteration captures the journal version at creation and fails with
//! [`NavError::JournalMutated`] if the list shape changes underneath it
//! -- the standard fail-fast collection contract.

use std::cell::RefCell;
use std::rc::Rc;

use compass_types::{NavError, Result};

use crate::entry::JournalEntry;
use crate::events::{Subscription, ViewChange};
use crate::journal::Journal;

/// Which side of the committed position a stack projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackDirection {
    Back,
    Forward,
}

/// A read-only projection of the journal relative to its committed
/// position.
pub struct EntryStack {
    journal: Rc<RefCell<Journal>>,
    direction: StackDirection,
}

impl EntryStack {
    /// The back stack: committed position minus one, downward.
    pub fn back(journal: Rc<RefCell<Journal>>) -> Self {
        Self {
            journal,
            direction: StackDirection::Back,
        }
    }

    /// The forward stack: committed position plus one, upward.
    pub fn forward(journal: Rc<RefCell<Journal>>) -> Self {
        Self {
            journal,
            direction: StackDirection::Forward,
        }
    }

    pub fn direction(&self) -> StackDirection {
        self.direction
    }

    /// Iterate navigable entries, nearest-to-current first.
    pub fn iter(&self) -> StackIter {
        let journal = self.journal.borrow();
        let cursor = match self.direction {
            StackDirection::Back => journal.current,
            StackDirection::Forward => journal.current + 1,
        };
        StackIter {
            journal: Rc::clone(&self.journal),
            direction: self.direction,
            version: journal.version(),
            cursor,
        }
    }

    /// Collect the stack into a vector, failing if the journal mutates
    /// mid-enumeration.
    pub fn entries(&self) -> Result<Vec<JournalEntry>> {
        self.iter().collect()
    }

    /// Number of navigable entries on this side.
    pub fn len(&self) -> usize {
        let journal = self.journal.borrow();
        let range: Box<dyn Iterator<Item = usize>> = match self.direction {
            StackDirection::Back => Box::new((0..journal.current.min(journal.total_count())).rev()),
            StackDirection::Forward => Box::new((journal.current + 1)..journal.total_count()),
        };
        range
            .filter(|&i| journal.is_navigable(&journal.entries()[i]))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collection-changed notification: fired whenever the journal
    /// republishes its views (commit, abort, truncation, prune).
    pub fn subscribe<F: Fn(ViewChange) + 'static>(&self, f: F) -> Subscription {
        self.journal.borrow_mut().subscribe(f)
    }
}

/// Fail-fast enumerator over one stack.
pub struct StackIter {
    journal: Rc<RefCell<Journal>>,
    direction: StackDirection,
    version: u64,
    cursor: usize,
}

impl Iterator for StackIter {
    type Item = Result<JournalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let journal = self.journal.borrow();
        if journal.version() != self.version {
            return Some(Err(NavError::JournalMutated {
                version: journal.version(),
            }));
        }
        match self.direction {
            StackDirection::Back => {
                while self.cursor > 0 {
                    self.cursor -= 1;
                    let entry = &journal.entries()[self.cursor];
                    if journal.is_navigable(entry) {
                        return Some(Ok(entry.clone()));
                    }
                }
                None
            },
            StackDirection::Forward => {
                while self.cursor < journal.total_count() {
                    let entry = &journal.entries()[self.cursor];
                    self.cursor += 1;
                    if journal.is_navigable(entry) {
                        return Some(Ok(entry.clone()));
                    }
                }
                None
            },
        }
    }
}
