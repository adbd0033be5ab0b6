//! Journal persistence: a journal and its entries serialize as a unit
//! so navigation history survives a host being torn down and recreated.
//!
//! [`Journal::prune_keep_alive_entries`] is the explicit step that
//! makes an in-memory journal persistable; saving refuses to proceed
//! while keep-alive entries remain.

use serde::{Deserialize, Serialize};

use compass_types::{GroupKey, NavError, Result};

use crate::entry::{EntryId, JournalEntry};
use crate::journal::Journal;

/// The serialized shape of a journal: entry list, committed index, the
/// stable id counter, and the group exit anchors. The staged position,
/// version counter, filter, and observers are runtime-only.
#[derive(Serialize, Deserialize)]
struct JournalSnapshot {
    entries: Vec<JournalEntry>,
    current: usize,
    next_id: u32,
    group_exits: Vec<(GroupKey, EntryId)>,
}

/// Serialize a journal. Errors if keep-alive entries remain (prune
/// first) or a navigation is still staged.
pub fn save_journal(journal: &Journal) -> Result<Vec<u8>> {
    if journal.is_pending() {
        return Err(NavError::InvalidOperation(
            "cannot persist a journal with a staged navigation".into(),
        ));
    }
    if journal.entries().iter().any(JournalEntry::is_keep_alive) {
        return Err(NavError::InvalidOperation(
            "journal still holds keep-alive entries; prune before persisting".into(),
        ));
    }

    let snapshot = JournalSnapshot {
        entries: journal.entries.clone(),
        current: journal.current,
        next_id: journal.next_id,
        group_exits: journal
            .group_exits
            .iter()
            .map(|(&k, &v)| (k, v))
            .collect(),
    };
    Ok(serde_json::to_vec(&snapshot)?)
}

/// Rebuild a journal from a serialized snapshot. The staged position
/// starts equal to the committed one; observers and version start
/// fresh.
pub fn load_journal(bytes: &[u8]) -> Result<Journal> {
    let snapshot: JournalSnapshot = serde_json::from_slice(bytes)?;
    if snapshot.current > snapshot.entries.len() {
        return Err(NavError::InvalidOperation(format!(
            "corrupt journal snapshot: committed index {} out of range for {} entries",
            snapshot.current,
            snapshot.entries.len()
        )));
    }

    let mut journal = Journal::new();
    journal.entries = snapshot.entries;
    journal.current = snapshot.current;
    journal.uncommitted = snapshot.current;
    journal.next_id = snapshot.next_id;
    journal.group_exits = snapshot.group_exits.into_iter().collect();
    log::debug!(
        "loaded journal: {} entries, committed index {}",
        journal.total_count(),
        journal.current
    );
    Ok(journal)
}
