//! The journal: ordered navigation history with a committed and a
//! staged position.
//!
//! All mutation happens on the single thread that owns the hosting
//! window. A navigation attempt is staged by `begin_back_navigation` /
//! `begin_forward_navigation`, and always resolves back to the idle
//! state through `commit_journal_navigation` or
//! `abort_journal_navigation`; the asynchronous content-binding gap
//! between those edges is invisible to the journal.
//!
//! Index conventions: `current` is the committed position and may equal
//! `entries.len()`, which means "no entry recorded for the current
//! content yet" (the state right after a new navigation). `uncommitted`
//! diverges from `current` only while a navigation is staged.

use std::collections::HashMap;

use compass_types::{GroupKey, HostId, NavError, Result};

use crate::entry::{EntryId, EntryType, JournalEntry};
use crate::events::{ChangePublisher, Subscription, ViewChange};

/// Navigability predicate supplied by the host. An entry is only
/// eligible for Back/Forward traversal if this accepts it, in addition
/// to the entry's own type.
pub type EntryFilter = Box<dyn Fn(&JournalEntry) -> bool>;

/// Ordered history of navigations for one navigation host.
pub struct Journal {
    /// Chronological entry list.
    pub(crate) entries: Vec<JournalEntry>,

    /// Committed position. `entries.len()` means no current entry yet.
    pub(crate) current: usize,

    /// Staged position; equals `current` whenever no navigation is in
    /// flight.
    pub(crate) uncommitted: usize,

    /// Bumped on every structural mutation; the only signal in-flight
    /// enumerators may trust.
    pub(crate) version: u64,

    /// Id counter for entries; ids are stable once assigned.
    pub(crate) next_id: u32,

    /// Optional host-supplied navigability filter.
    filter: Option<EntryFilter>,

    /// Group exit anchors: the most recent entry recorded for each
    /// content group.
    pub(crate) group_exits: HashMap<GroupKey, EntryId>,

    /// Observers notified on every `update_view`.
    publisher: ChangePublisher,
}

impl Journal {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            current: 0,
            uncommitted: 0,
            version: 0,
            next_id: 0,
            filter: None,
            group_exits: HashMap::new(),
            publisher: ChangePublisher::new(),
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Number of entries, navigable or not.
    pub fn total_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The committed position, or `None` when no entry has been
    /// recorded for the current content yet.
    pub fn current_index(&self) -> Option<usize> {
        (self.current < self.entries.len()).then_some(self.current)
    }

    /// The staged position (equals the committed one when idle).
    pub fn staged_index(&self) -> usize {
        self.uncommitted
    }

    /// Whether a navigation is staged but not yet resolved.
    pub fn is_pending(&self) -> bool {
        self.uncommitted != self.current
    }

    /// Structural version counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// All entries in chronological order.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// The entry recorded at the committed position, if any.
    pub fn current_entry(&self) -> Option<&JournalEntry> {
        self.entries.get(self.current)
    }

    /// Display name of the current entry, for the history menu's
    /// current-position marker.
    pub fn current_display_name(&self) -> Option<&str> {
        self.current_entry().map(|e| e.name.as_str())
    }

    /// Whether Back/Forward traversal may land on this entry: the entry
    /// type permits it and the host filter (if any) accepts it.
    pub fn is_navigable(&self, entry: &JournalEntry) -> bool {
        entry.entry_type == EntryType::Navigable
            && self.filter.as_ref().is_none_or(|f| f(entry))
    }

    /// Install or clear the host navigability filter. Counts as a
    /// structural mutation: the navigable sequence changes shape, so
    /// in-flight enumerators are invalidated.
    pub fn set_filter(&mut self, filter: Option<EntryFilter>) {
        self.filter = filter;
        self.version += 1;
        self.update_view(ViewChange::Structure);
    }

    /// Nearest navigable index strictly before `from`.
    fn scan_back(&self, from: usize) -> Option<usize> {
        (0..from.min(self.entries.len()))
            .rev()
            .find(|&i| self.is_navigable(&self.entries[i]))
    }

    /// Nearest navigable index strictly after `from`.
    fn scan_forward(&self, from: usize) -> Option<usize> {
        ((from + 1)..self.entries.len()).find(|&i| self.is_navigable(&self.entries[i]))
    }

    /// Whether a Back navigation could be staged right now. Reflects
    /// the staged position, so chained Back calls made before the first
    /// resolves stay consistent.
    pub fn can_go_back(&self) -> bool {
        self.scan_back(self.uncommitted).is_some()
    }

    /// The entry a Back navigation would land on, if any.
    pub fn go_back_entry(&self) -> Option<&JournalEntry> {
        self.scan_back(self.uncommitted).map(|i| &self.entries[i])
    }

    /// Whether a Forward navigation could be staged right now.
    pub fn can_go_forward(&self) -> bool {
        self.scan_forward(self.uncommitted).is_some()
    }

    /// The entry a Forward navigation would land on, if any.
    pub fn go_forward_entry(&self) -> Option<&JournalEntry> {
        self.scan_forward(self.uncommitted).map(|i| &self.entries[i])
    }

    // -------------------------------------------------------------------
    // Recording
    // -------------------------------------------------------------------

    /// Refresh or create the entry at the committed position.
    ///
    /// If a current entry exists it is replaced in place, preserving
    /// its id; otherwise the entry is appended and assigned the next
    /// id. Bumps the version and re-anchors the entry's group exit.
    pub fn update_current_entry(&mut self, mut entry: JournalEntry) -> EntryId {
        if self.current < self.entries.len() {
            entry.id = self.entries[self.current].id;
            self.entries[self.current] = entry;
        } else {
            debug_assert_eq!(self.current, self.entries.len());
            self.next_id += 1;
            entry.id = EntryId(self.next_id);
            self.entries.push(entry);
        }
        self.version += 1;

        let recorded = &self.entries[self.current];
        self.group_exits.insert(recorded.group, recorded.id);
        recorded.id
    }

    /// Step the committed cursor past the current entry, in
    /// preparation for recording a new navigation. Callers run the
    /// sequence `update_current_entry` (departure snapshot),
    /// `advance_current`, `record_new_navigation`.
    pub fn advance_current(&mut self) {
        assert!(
            self.current < self.entries.len(),
            "advance_current: no current entry to move past"
        );
        self.current += 1;
    }

    /// Record that a navigation to new content has begun.
    ///
    /// Precondition: the caller has already advanced the committed
    /// cursor past the departing entry (append semantics). Discards any
    /// forward entries the move orphaned, and republishes views either
    /// way. Navigating to new content discards old forward history.
    pub fn record_new_navigation(&mut self) {
        debug_assert!(self.current <= self.entries.len());
        self.uncommitted = self.current;
        log::debug!(
            "record new navigation at index {} ({} entries)",
            self.current,
            self.entries.len()
        );
        if !self.clear_forward_stack() {
            self.update_view(ViewChange::Structure);
        }
    }

    /// Remove every entry at or after the committed position.
    ///
    /// Returns `false` without touching anything if there is nothing to
    /// truncate. Panics if a navigation is staged past the truncation
    /// point; that is a caller contract violation, not a runtime
    /// condition.
    pub fn clear_forward_stack(&mut self) -> bool {
        if self.current >= self.entries.len() {
            return false;
        }
        assert!(
            self.uncommitted <= self.current,
            "cannot clear the forward stack beneath a staged navigation"
        );

        let dropped = self.entries.len() - self.current;
        self.entries.truncate(self.current);
        self.sweep_group_exits();
        self.version += 1;
        log::debug!("cleared forward stack: dropped {dropped} entries");
        self.update_view(ViewChange::Structure);
        true
    }

    // -------------------------------------------------------------------
    // Back/Forward protocol
    // -------------------------------------------------------------------

    /// Stage a Back navigation: move the staged position to the nearest
    /// navigable entry behind it.
    ///
    /// Returns the target entry for the caller to bind, or `Ok(None)`
    /// in the degenerate case where the found index is already the
    /// committed position. Errors when nothing behind is navigable;
    /// callers are expected to check [`Journal::can_go_back`] first.
    pub fn begin_back_navigation(&mut self) -> Result<Option<JournalEntry>> {
        let index = self.scan_back(self.uncommitted).ok_or(NavError::NoBackEntry)?;
        self.uncommitted = index;
        log::debug!("staged back navigation to index {index}");
        self.update_view(ViewChange::Staged);
        if index == self.current {
            Ok(None)
        } else {
            Ok(Some(self.entries[index].clone()))
        }
    }

    /// Stage a Forward navigation: move the staged position to the
    /// nearest navigable entry ahead of it.
    pub fn begin_forward_navigation(&mut self) -> Result<Option<JournalEntry>> {
        let index = self
            .scan_forward(self.uncommitted)
            .ok_or(NavError::NoForwardEntry)?;
        self.uncommitted = index;
        log::debug!("staged forward navigation to index {index}");
        self.update_view(ViewChange::Staged);
        if index == self.current {
            Ok(None)
        } else {
            Ok(Some(self.entries[index].clone()))
        }
    }

    /// Commit a staged navigation: make `target`'s position the
    /// committed one. Ignored if the target is no longer in the list.
    pub fn commit_journal_navigation(&mut self, target: &JournalEntry) {
        if let Some(index) = self.entries.iter().position(|e| e.id == target.id) {
            log::debug!("committed navigation to entry {:?} at index {index}", target.id);
            self.current = index;
            self.uncommitted = index;
            self.update_view(ViewChange::Structure);
        }
    }

    /// Alias for [`Journal::commit_journal_navigation`].
    pub fn navigate_to(&mut self, target: &JournalEntry) {
        self.commit_journal_navigation(target);
    }

    /// Abort a staged navigation: revert the staged position to the
    /// committed one. Entry contents are untouched.
    pub fn abort_journal_navigation(&mut self) {
        log::debug!(
            "aborted navigation: staged {} reverts to committed {}",
            self.uncommitted,
            self.current
        );
        self.uncommitted = self.current;
        self.update_view(ViewChange::Abort);
    }

    // -------------------------------------------------------------------
    // Removal and pruning
    // -------------------------------------------------------------------

    /// The single removal routine: every physical removal goes through
    /// here so the two cursors stay consistent. Panics if the index
    /// lies inside the staged range while a navigation is in flight.
    fn remove_at(&mut self, index: usize) -> JournalEntry {
        if self.is_pending() {
            let lo = self.uncommitted.min(self.current);
            let hi = self.uncommitted.max(self.current);
            assert!(
                index < lo || index > hi,
                "cannot remove entry {index} inside the staged range {lo}..={hi}"
            );
        }
        let removed = self.entries.remove(index);
        if self.current > index {
            self.current -= 1;
        }
        if self.uncommitted > index {
            self.uncommitted -= 1;
        }
        self.version += 1;
        removed
    }

    /// Drop group exit anchors whose entry is gone. Runs after every
    /// removal pass so `group_exit` never hands out a stale id.
    fn sweep_group_exits(&mut self) {
        let entries = &self.entries;
        self.group_exits
            .retain(|_, id| entries.iter().any(|e| e.id == *id));
    }

    /// Remove the nearest navigable entry behind the committed
    /// position. Returns `None` (leaving state unchanged) when there is
    /// no back entry.
    pub fn remove_back_entry(&mut self) -> Option<JournalEntry> {
        let index = self.scan_back(self.current)?;
        let removed = self.remove_at(index);
        self.sweep_group_exits();
        log::debug!("removed back entry {:?} at index {index}", removed.id);
        self.update_view(ViewChange::Structure);
        Some(removed)
    }

    /// Make the journal persistable: remove every entry still holding a
    /// live content reference, then pack the state blobs of the
    /// remaining serialized entries.
    ///
    /// Keep-alive content is assumed reachable through other means at
    /// persistence time, not through the journal. Destructive; only
    /// safe when the journal is about to be persisted or torn down.
    pub fn prune_keep_alive_entries(&mut self) -> Result<usize> {
        let mut removed = 0;
        let mut index = self.entries.len();
        while index > 0 {
            index -= 1;
            if self.entries[index].is_keep_alive() {
                self.remove_at(index);
                removed += 1;
            }
        }
        self.sweep_group_exits();
        for entry in &mut self.entries {
            entry.compact_state()?;
        }
        log::info!(
            "pruned {removed} keep-alive entries; {} persistable entries remain",
            self.entries.len()
        );
        self.update_view(ViewChange::Structure);
        Ok(removed)
    }

    /// Remove every entry belonging to `host` except the one at the
    /// committed position. Used when a child host is torn down.
    pub fn remove_entries(&mut self, host: HostId) -> usize {
        let mut removed = 0;
        let mut index = self.entries.len();
        while index > 0 {
            index -= 1;
            if index != self.current && self.entries[index].group.host == host {
                self.remove_at(index);
                removed += 1;
            }
        }
        if removed > 0 {
            self.sweep_group_exits();
            log::debug!("removed {removed} entries for {host:?}");
            self.update_view(ViewChange::Structure);
        }
        removed
    }

    // -------------------------------------------------------------------
    // View publication
    // -------------------------------------------------------------------

    /// Republish the derived views. Fires the subscriber list exactly
    /// once per committed structural change.
    fn update_view(&mut self, change: ViewChange) {
        log::trace!(
            "update_view {change:?}: committed={} staged={} len={} v{}",
            self.current,
            self.uncommitted,
            self.entries.len(),
            self.version
        );
        self.publisher.notify(change);
    }

    /// Subscribe to view republication. Subscribers must not call back
    /// into the journal; they run while it is being mutated.
    pub fn subscribe<F: Fn(ViewChange) + 'static>(&mut self, f: F) -> Subscription {
        self.publisher.subscribe(f)
    }

    /// Group exit anchor for a content group, if one was recorded.
    pub fn group_exit(&self, group: GroupKey) -> Option<EntryId> {
        self.group_exits.get(&group).copied()
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("entries", &self.entries.len())
            .field("current", &self.current)
            .field("uncommitted", &self.uncommitted)
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_types::{ContentRef, Locator, StateBlob};

    fn group() -> GroupKey {
        GroupKey::new(HostId(1), 1)
    }

    fn entry(name: &str) -> JournalEntry {
        let loc = Locator::parse(&format!("app://host/{name}")).unwrap();
        JournalEntry::new(loc, name, group())
    }

    /// Run the full new-navigation protocol: snapshot the departing
    /// content (if any), advance, record, then commit the destination.
    fn navigate_new(journal: &mut Journal, name: &str) {
        if journal.current_index().is_some() {
            let departing = journal.entries[journal.current].clone();
            journal.update_current_entry(departing);
            journal.advance_current();
        }
        journal.record_new_navigation();
        journal.update_current_entry(entry(name));
    }

    fn names(journal: &Journal) -> Vec<&str> {
        journal.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn empty_journal_has_nothing() {
        let journal = Journal::new();
        assert!(journal.is_empty());
        assert!(!journal.can_go_back());
        assert!(!journal.can_go_forward());
        assert_eq!(journal.current_index(), None);
    }

    #[test]
    fn first_navigation_records_current_entry() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        assert_eq!(names(&journal), vec!["a"]);
        assert_eq!(journal.current_index(), Some(0));
        assert!(!journal.can_go_back());
    }

    #[test]
    fn ids_are_assigned_sequentially_and_stable() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        let ids: Vec<EntryId> = journal.entries().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![EntryId(1), EntryId(2)]);

        // Refreshing the current slot keeps its id.
        journal.update_current_entry(entry("b2"));
        assert_eq!(journal.current_entry().unwrap().id(), EntryId(2));
        assert_eq!(journal.current_entry().unwrap().name, "b2");
    }

    #[test]
    fn append_truncates_forward_history() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        navigate_new(&mut journal, "c");

        // Walk back to b.
        let target = journal.begin_back_navigation().unwrap().unwrap();
        journal.commit_journal_navigation(&target);
        assert_eq!(journal.current_entry().unwrap().name, "b");
        assert!(journal.can_go_forward());

        navigate_new(&mut journal, "d");
        assert_eq!(names(&journal), vec!["a", "b", "d"]);
        assert!(!journal.can_go_forward());
    }

    #[test]
    fn back_forward_symmetry_preserves_identity() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        navigate_new(&mut journal, "c");
        let c_id = journal.current_entry().unwrap().id();

        let target = journal.begin_back_navigation().unwrap().unwrap();
        journal.commit_journal_navigation(&target);
        assert_eq!(journal.current_entry().unwrap().name, "b");

        let target = journal.begin_forward_navigation().unwrap().unwrap();
        journal.commit_journal_navigation(&target);
        assert_eq!(journal.current_entry().unwrap().name, "c");
        assert_eq!(journal.current_entry().unwrap().id(), c_id);
    }

    #[test]
    fn abort_is_a_noop_on_structure() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        let before_names: Vec<String> =
            journal.entries().iter().map(|e| e.name.clone()).collect();
        let before_ids: Vec<EntryId> = journal.entries().iter().map(|e| e.id()).collect();
        let before_current = journal.current_index();

        journal.begin_back_navigation().unwrap().unwrap();
        assert!(journal.is_pending());
        journal.abort_journal_navigation();

        assert!(!journal.is_pending());
        assert_eq!(journal.current_index(), before_current);
        let after_names: Vec<String> =
            journal.entries().iter().map(|e| e.name.clone()).collect();
        let after_ids: Vec<EntryId> = journal.entries().iter().map(|e| e.id()).collect();
        assert_eq!(after_names, before_names);
        assert_eq!(after_ids, before_ids);
    }

    #[test]
    fn staged_queries_reflect_pending_position() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        navigate_new(&mut journal, "c");

        journal.begin_back_navigation().unwrap().unwrap(); // staged at b
        // A chained Back query must look behind b, not behind c.
        assert_eq!(journal.go_back_entry().unwrap().name, "a");
        // And Forward must look ahead of b.
        assert_eq!(journal.go_forward_entry().unwrap().name, "c");
    }

    #[test]
    fn chained_back_before_commit() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        navigate_new(&mut journal, "c");

        journal.begin_back_navigation().unwrap().unwrap(); // stage b
        let target = journal.begin_back_navigation().unwrap().unwrap(); // stage a
        assert_eq!(target.name, "a");
        journal.commit_journal_navigation(&target);
        assert_eq!(journal.current_entry().unwrap().name, "a");
    }

    #[test]
    fn ui_less_entries_are_skipped_not_blocking() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");

        // Record a UI-less entry between a and c.
        let departing = journal.entries[journal.current].clone();
        journal.update_current_entry(departing);
        journal.advance_current();
        journal.record_new_navigation();
        journal.update_current_entry(entry("b").ui_less());

        navigate_new(&mut journal, "c");

        let target = journal.begin_back_navigation().unwrap().unwrap();
        assert_eq!(target.name, "a");
    }

    #[test]
    fn all_filtered_out_surfaces_as_no_entry() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");

        journal.set_filter(Some(Box::new(|e| e.name != "a")));
        assert!(!journal.can_go_back());
        assert!(matches!(
            journal.begin_back_navigation(),
            Err(NavError::NoBackEntry)
        ));
    }

    #[test]
    fn filter_clear_restores_navigability() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        journal.set_filter(Some(Box::new(|_| false)));
        assert!(!journal.can_go_back());
        journal.set_filter(None);
        assert!(journal.can_go_back());
    }

    #[test]
    fn begin_back_with_nothing_behind_errors() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        assert!(matches!(
            journal.begin_back_navigation(),
            Err(NavError::NoBackEntry)
        ));
        assert!(matches!(
            journal.begin_forward_navigation(),
            Err(NavError::NoForwardEntry)
        ));
    }

    #[test]
    fn remove_back_entry_is_idempotent_at_the_bottom() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        assert!(journal.remove_back_entry().is_none());
        let version = journal.version();
        assert!(journal.remove_back_entry().is_none());
        assert_eq!(journal.version(), version);
    }

    #[test]
    fn remove_back_entry_targets_nearest_then_next() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        navigate_new(&mut journal, "c");

        let removed = journal.remove_back_entry().unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(journal.current_entry().unwrap().name, "c");

        let removed = journal.remove_back_entry().unwrap();
        assert_eq!(removed.name, "a");
        assert!(journal.remove_back_entry().is_none());
    }

    #[test]
    fn removal_shifts_cursors() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        navigate_new(&mut journal, "c");
        assert_eq!(journal.current_index(), Some(2));

        journal.remove_back_entry().unwrap(); // removes b at index 1
        assert_eq!(journal.current_index(), Some(1));
        assert_eq!(journal.current_entry().unwrap().name, "c");
        assert_eq!(journal.staged_index(), 1);
    }

    #[test]
    #[should_panic(expected = "staged range")]
    fn removing_inside_staged_range_panics() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        journal.begin_back_navigation().unwrap().unwrap(); // staged at a
        // The nearest back entry is now inside the staged range.
        journal.remove_back_entry();
    }

    #[test]
    #[should_panic(expected = "forward stack beneath a staged navigation")]
    fn clearing_forward_stack_under_staged_forward_panics() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        let target = journal.begin_back_navigation().unwrap().unwrap();
        journal.commit_journal_navigation(&target); // at a, b is forward
        journal.begin_forward_navigation().unwrap().unwrap(); // staged at b
        journal.clear_forward_stack();
    }

    #[test]
    fn clear_forward_stack_noop_returns_false() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        let departing = journal.entries[journal.current].clone();
        journal.update_current_entry(departing);
        journal.advance_current();
        journal.record_new_navigation();
        // Cursor is past the end; nothing to truncate.
        assert!(!journal.clear_forward_stack());
    }

    #[test]
    fn prune_drops_live_entries_and_packs_the_rest() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        journal.entries[0].custom_state = Some(StateBlob::capture(&1u32).unwrap());

        // Keep-alive entry for in-memory-only content.
        let departing = journal.entries[journal.current].clone();
        journal.update_current_entry(departing);
        journal.advance_current();
        journal.record_new_navigation();
        journal
            .update_current_entry(JournalEntry::keep_alive(ContentRef::new(9u8), "live", group()));

        navigate_new(&mut journal, "c");

        let removed = journal.prune_keep_alive_entries().unwrap();
        assert_eq!(removed, 1);
        assert_eq!(names(&journal), vec!["a", "c"]);
        assert!(journal.entries()[0].custom_state.as_ref().unwrap().is_packed());
    }

    #[test]
    fn remove_entries_spares_the_current_one() {
        let child = HostId(7);
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");
        navigate_new(&mut journal, "c");
        journal.entries[0].group = GroupKey::new(child, 1);
        journal.entries[2].group = GroupKey::new(child, 2);

        // Current entry belongs to the child host too; it must survive.
        let removed = journal.remove_entries(child);
        assert_eq!(removed, 1);
        assert_eq!(names(&journal), vec!["b", "c"]);
        assert_eq!(journal.current_entry().unwrap().name, "c");
    }

    #[test]
    fn remove_entries_drops_orphaned_group_exits() {
        let child = HostId(7);
        let child_key = GroupKey::new(child, 1);
        let mut journal = Journal::new();
        let loc = Locator::parse("app://child/a").unwrap();
        journal.record_new_navigation();
        journal.update_current_entry(JournalEntry::new(loc, "a", child_key));
        navigate_new(&mut journal, "b");
        navigate_new(&mut journal, "c");
        assert!(journal.group_exit(child_key).is_some());

        journal.remove_entries(child);
        // The torn-down host's anchor must not outlive its entries.
        assert_eq!(journal.group_exit(child_key), None);
        assert!(journal.group_exit(group()).is_some());
    }

    #[test]
    fn prune_drops_orphaned_group_exits() {
        let live_key = GroupKey::new(HostId(1), 99);
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        let departing = journal.entries[journal.current].clone();
        journal.update_current_entry(departing);
        journal.advance_current();
        journal.record_new_navigation();
        journal.update_current_entry(JournalEntry::keep_alive(
            ContentRef::new(9u8),
            "live",
            live_key,
        ));
        assert!(journal.group_exit(live_key).is_some());

        journal.prune_keep_alive_entries().unwrap();
        assert_eq!(journal.group_exit(live_key), None);
        assert!(journal.group_exit(group()).is_some());
    }

    #[test]
    fn group_exit_tracks_most_recent_recording() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        let id = journal.current_entry().unwrap().id();
        assert_eq!(journal.group_exit(group()), Some(id));
    }

    #[test]
    fn version_advances_on_structural_mutation() {
        let mut journal = Journal::new();
        let v0 = journal.version();
        navigate_new(&mut journal, "a");
        let v1 = journal.version();
        assert!(v1 > v0);
        navigate_new(&mut journal, "b");
        assert!(journal.version() > v1);
    }

    #[test]
    fn views_republished_once_per_transition() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");

        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        let _sub = journal.subscribe(move |c| sink.borrow_mut().push(c));

        let target = journal.begin_back_navigation().unwrap().unwrap();
        journal.commit_journal_navigation(&target);
        journal.begin_forward_navigation().unwrap().unwrap();
        journal.abort_journal_navigation();

        assert_eq!(
            *changes.borrow(),
            vec![
                ViewChange::Staged,
                ViewChange::Structure,
                ViewChange::Staged,
                ViewChange::Abort,
            ]
        );
    }

    #[test]
    fn degenerate_begin_returns_none() {
        let mut journal = Journal::new();
        navigate_new(&mut journal, "a");
        navigate_new(&mut journal, "b");

        // Stage a back navigation, then ask to go forward again: the
        // nearest navigable entry ahead of the staged position is the
        // committed one.
        journal.begin_back_navigation().unwrap().unwrap();
        let result = journal.begin_forward_navigation().unwrap();
        assert!(result.is_none());
        assert!(!journal.is_pending());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_names(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
            proptest::collection::vec("[a-z]{3,8}", min..max)
        }

        proptest! {
            #[test]
            fn current_is_last_navigated(names in arb_names(1, 20)) {
                let mut journal = Journal::new();
                for name in &names {
                    navigate_new(&mut journal, name);
                }
                prop_assert_eq!(
                    journal.current_entry().unwrap().name.as_str(),
                    names.last().unwrap().as_str()
                );
            }

            #[test]
            fn back_then_forward_returns_to_same(names in arb_names(2, 10)) {
                let mut journal = Journal::new();
                for name in &names {
                    navigate_new(&mut journal, name);
                }
                let before = journal.current_entry().unwrap().id();
                let target = journal.begin_back_navigation().unwrap().unwrap();
                journal.commit_journal_navigation(&target);
                let target = journal.begin_forward_navigation().unwrap().unwrap();
                journal.commit_journal_navigation(&target);
                prop_assert_eq!(journal.current_entry().unwrap().id(), before);
            }

            #[test]
            fn can_walk_all_the_way_back(names in arb_names(1, 20)) {
                let mut journal = Journal::new();
                for name in &names {
                    navigate_new(&mut journal, name);
                }
                let mut steps = 0;
                while journal.can_go_back() {
                    let target = journal.begin_back_navigation().unwrap().unwrap();
                    journal.commit_journal_navigation(&target);
                    steps += 1;
                }
                prop_assert_eq!(steps, names.len() - 1);
                prop_assert_eq!(
                    journal.current_entry().unwrap().name.as_str(),
                    names[0].as_str()
                );
            }

            #[test]
            fn new_navigation_clears_forward(names in arb_names(3, 10)) {
                let mut journal = Journal::new();
                for name in &names {
                    navigate_new(&mut journal, name);
                }
                let target = journal.begin_back_navigation().unwrap().unwrap();
                journal.commit_journal_navigation(&target);
                prop_assert!(journal.can_go_forward());
                navigate_new(&mut journal, "fresh");
                prop_assert!(!journal.can_go_forward());
            }

            #[test]
            fn cursors_stay_in_bounds(names in arb_names(1, 16), removals in 0usize..8) {
                let mut journal = Journal::new();
                for name in &names {
                    navigate_new(&mut journal, name);
                }
                for _ in 0..removals {
                    journal.remove_back_entry();
                }
                prop_assert!(journal.staged_index() <= journal.total_count());
                prop_assert!(journal.current_index().is_some());
            }
        }
    }
}
