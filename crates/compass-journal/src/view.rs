//! Display-ready history views.
//!
//! [`LimitedView`] caps a stack at a fixed number of entries so a
//! drop-down menu stays manageable. [`UnifiedView`] merges the bounded
//! forward and back views around a synthetic current-position marker
//! into a single ordered sequence for single-menu presentation,
//! recomputed lazily after either side changes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use compass_types::Result;

use crate::config::JournalConfig;
use crate::entry::JournalEntry;
use crate::events::{Subscription, ViewChange};
use crate::journal::Journal;
use crate::stack::{EntryStack, StackIter};

/// Cap on entries shown per direction in history menus.
pub const DEFAULT_MENU_CAP: usize = 9;

// ---------------------------------------------------------------------------
// LimitedView
// ---------------------------------------------------------------------------

/// A stack view bounded to at most `cap` entries.
pub struct LimitedView {
    stack: EntryStack,
    cap: usize,
}

impl LimitedView {
    pub fn new(stack: EntryStack, cap: usize) -> Self {
        Self { stack, cap }
    }

    /// Iterate at most `cap` entries, nearest-to-current first.
    pub fn iter(&self) -> std::iter::Take<StackIter> {
        self.stack.iter().take(self.cap)
    }

    /// Collect the bounded view, failing if the journal mutates
    /// mid-enumeration.
    pub fn entries(&self) -> Result<Vec<JournalEntry>> {
        self.iter().collect()
    }

    /// Propagates the underlying collection-changed event unchanged.
    pub fn subscribe<F: Fn(ViewChange) + 'static>(&self, f: F) -> Subscription {
        self.stack.subscribe(f)
    }
}

// ---------------------------------------------------------------------------
// UnifiedView
// ---------------------------------------------------------------------------

/// Where a menu item sits relative to the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativePosition {
    Back,
    Current,
    Forward,
}

/// One row of the merged history menu.
#[derive(Debug, Clone)]
pub struct MenuItem {
    /// Display label, truncated to the configured menu width.
    pub label: String,
    /// The underlying entry; `None` for the current-position marker.
    pub entry: Option<JournalEntry>,
    /// Position tag for display (e.g. which side gets a check mark).
    pub position: RelativePosition,
}

/// Merged, capped, display-ready history sequence.
///
/// Ordered top to bottom: forward entries (nearest to current last),
/// the current-position marker, then back entries (nearest first).
/// The computed sequence is memoized and invalidated by the journal's
/// change notification, so repeated reads between changes are free.
pub struct UnifiedView {
    journal: Rc<RefCell<Journal>>,
    cap: usize,
    max_label: usize,
    cache: RefCell<Option<Vec<MenuItem>>>,
    stale: Rc<Cell<bool>>,
    _subscription: Subscription,
}

impl UnifiedView {
    pub fn new(journal: Rc<RefCell<Journal>>, config: &JournalConfig) -> Self {
        let stale = Rc::new(Cell::new(true));
        let flag = Rc::clone(&stale);
        // The callback only flips the flag; recomputation happens on
        // the next read, never inside the journal's mutation.
        let subscription = journal.borrow_mut().subscribe(move |_| flag.set(true));
        Self {
            journal,
            cap: config.menu_cap,
            max_label: config.max_menu_label,
            cache: RefCell::new(None),
            stale,
            _subscription: subscription,
        }
    }

    /// The merged sequence, recomputing it if a change invalidated the
    /// memoized copy.
    pub fn items(&self) -> Vec<MenuItem> {
        let mut cache = self.cache.borrow_mut();
        if self.stale.get() || cache.is_none() {
            *cache = Some(self.recompute());
            self.stale.set(false);
        }
        cache.clone().unwrap_or_default()
    }

    /// Build the sequence under a single journal borrow, so the merged
    /// view is consistent by construction.
    fn recompute(&self) -> Vec<MenuItem> {
        let journal = self.journal.borrow();
        let entries = journal.entries();
        let current = journal.current_index();
        let anchor = current.map_or(journal.total_count(), |i| i);

        let mut items = Vec::new();

        // Forward entries, nearest-to-current last.
        let forward: Vec<&JournalEntry> = ((anchor + 1)..entries.len())
            .filter(|&i| journal.is_navigable(&entries[i]))
            .take(self.cap)
            .map(|i| &entries[i])
            .collect();
        for entry in forward.into_iter().rev() {
            items.push(self.item_for(entry, RelativePosition::Forward));
        }

        // Synthetic current-position marker.
        items.push(MenuItem {
            label: truncate_label(journal.current_display_name().unwrap_or(""), self.max_label),
            entry: None,
            position: RelativePosition::Current,
        });

        // Back entries, nearest-to-current first.
        let back: Vec<&JournalEntry> = (0..anchor.min(entries.len()))
            .rev()
            .filter(|&i| journal.is_navigable(&entries[i]))
            .take(self.cap)
            .map(|i| &entries[i])
            .collect();
        for entry in back {
            items.push(self.item_for(entry, RelativePosition::Back));
        }
        items
    }

    fn item_for(&self, entry: &JournalEntry, position: RelativePosition) -> MenuItem {
        MenuItem {
            label: truncate_label(&entry.name, self.max_label),
            entry: Some(entry.clone()),
            position,
        }
    }
}

/// Truncate a display label on a character boundary, appending an
/// ellipsis when anything was cut.
fn truncate_label(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let mut label: String = name.chars().take(max.saturating_sub(1)).collect();
    label.push('\u{2026}');
    label
}
