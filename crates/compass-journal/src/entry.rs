//! Journal entries: one recorded navigation target plus optional
//! replayable state.

use serde::{Deserialize, Serialize};

use compass_types::{ContentRef, GroupKey, Locator, Result, StateBlob};

/// Stable numeric id of a journal entry, unique within one journal.
/// Assigned when the entry first lands in the entry list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntryId(pub u32);

/// How an entry participates in Back/Forward traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// A normal entry: Back/Forward can land on it.
    Navigable,
    /// Present in the list but skipped by traversal and view
    /// enumeration (internal navigations with no user-visible page).
    UiLess,
}

/// One recorded navigation target.
///
/// Entries are created when content is navigated away from (or when the
/// host explicitly inserts a back entry). An entry representing the
/// *current* position may be refreshed in place; once superseded it is
/// only touched again to pack its state before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique id within the journal; 0 until first recorded.
    pub(crate) id: EntryId,

    /// What was navigated to. Absent for object-only navigations.
    pub source: Option<Locator>,

    /// Display label for history menus.
    pub name: String,

    /// Traversal participation.
    pub entry_type: EntryType,

    /// Application-defined state replayed when this entry becomes
    /// current again.
    pub custom_state: Option<StateBlob>,

    /// Host-chrome state (e.g. scroll position) restored after
    /// navigating back onto this entry.
    pub viewer_state: Option<StateBlob>,

    /// Non-owning key tying this entry to its navigation host.
    pub group: GroupKey,

    /// Live content handle for keep-alive entries. Never serialized;
    /// pruning removes entries that still hold one.
    #[serde(skip)]
    pub(crate) content: Option<ContentRef>,
}

impl JournalEntry {
    /// A locator-addressable entry: durable, re-navigable from its
    /// source after persistence.
    pub fn new(source: Locator, name: impl Into<String>, group: GroupKey) -> Self {
        Self {
            id: EntryId(0),
            source: Some(source),
            name: name.into(),
            entry_type: EntryType::Navigable,
            custom_state: None,
            viewer_state: None,
            group,
            content: None,
        }
    }

    /// A keep-alive entry: content exists only in memory and is
    /// retained through the handle instead of a locator.
    pub fn keep_alive(content: ContentRef, name: impl Into<String>, group: GroupKey) -> Self {
        Self {
            id: EntryId(0),
            source: None,
            name: name.into(),
            entry_type: EntryType::Navigable,
            custom_state: None,
            viewer_state: None,
            group,
            content: Some(content),
        }
    }

    /// Mark this entry UI-less (skipped by traversal).
    pub fn ui_less(mut self) -> Self {
        self.entry_type = EntryType::UiLess;
        self
    }

    /// Attach custom application state.
    pub fn with_custom_state(mut self, state: StateBlob) -> Self {
        self.custom_state = Some(state);
        self
    }

    /// Attach viewer (chrome) state.
    pub fn with_viewer_state(mut self, state: StateBlob) -> Self {
        self.viewer_state = Some(state);
        self
    }

    /// Stable id, `EntryId(0)` until the entry is first recorded.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Whether this entry retains live content instead of a locator.
    pub fn is_keep_alive(&self) -> bool {
        self.content.is_some()
    }

    /// The live content handle, if this is a keep-alive entry.
    pub fn content(&self) -> Option<&ContentRef> {
        self.content.as_ref()
    }

    /// Pack both state blobs into their compact storage form. Part of
    /// the pre-serialization pass run by pruning.
    pub fn compact_state(&mut self) -> Result<()> {
        if let Some(state) = self.custom_state.as_mut() {
            state.pack()?;
        }
        if let Some(state) = self.viewer_state.as_mut() {
            state.pack()?;
        }
        Ok(())
    }
}
