//! The journal-relevant slice of the navigation service.
//!
//! The service sits between the hosting UI, the (out-of-scope) content
//! pipeline, and the journal. It decides when a navigation should
//! create, update, or replay a journal entry, and it drives the
//! commit/abort protocol: a navigation is staged here, content is
//! fetched and bound elsewhere, and the pipeline reports back through
//! [`NavigationService::content_ready`] or
//! [`NavigationService::content_failed`].

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use compass_types::{ContentRef, GroupKey, Locator, NavError, Result, StateBlob};

use crate::config::JournalConfig;
use crate::entry::JournalEntry;
use crate::journal::Journal;
use crate::stack::EntryStack;
use crate::view::UnifiedView;

/// What kind of navigation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Navigation to new content; discards forward history.
    New,
    /// Replay of a back entry.
    Back,
    /// Replay of a forward entry.
    Forward,
    /// Re-bind of the current content; journal position unchanged.
    Refresh,
}

/// The shape of the content a host is currently displaying, as the
/// content pipeline reports it. The journal treats the content itself
/// as opaque.
#[derive(Debug, Clone)]
pub struct ContentDescriptor {
    /// Resolved locator; `None` for object-only content.
    pub source: Option<Locator>,
    /// Display title.
    pub name: String,
    /// Content that cannot be reconstructed from its locator must be
    /// retained live (keep-alive) rather than captured as a locator.
    pub keep_alive: bool,
    /// Opaque handle to the bound content.
    pub content: ContentRef,
    /// Group identity shared by entries from the same content unit.
    pub group: GroupKey,
    /// Host-chrome state to restore when this content is returned to.
    pub viewer_state: Option<StateBlob>,
}

/// A navigation between `navigate`/`go_back`/`go_forward` and its
/// commit or abort.
#[derive(Debug)]
struct PendingNavigation {
    mode: NavigationMode,
    /// Journal entry being replayed, for Back/Forward modes.
    target: Option<JournalEntry>,
}

/// Initiates navigations and drives the journal's commit/abort
/// protocol on behalf of one navigation host.
pub struct NavigationService {
    journal: Rc<RefCell<Journal>>,
    config: JournalConfig,
    /// What the host is displaying right now.
    current: Option<ContentDescriptor>,
    /// Skip journaling the current content on the next departure.
    suppress_journaling: bool,
    pending: Option<PendingNavigation>,
}

impl NavigationService {
    pub fn new(config: JournalConfig) -> Self {
        Self {
            journal: Rc::new(RefCell::new(Journal::new())),
            config,
            current: None,
            suppress_journaling: false,
            pending: None,
        }
    }

    /// Rebuild a service around a journal restored from persistence.
    pub fn with_journal(journal: Journal, config: JournalConfig) -> Self {
        Self {
            journal: Rc::new(RefCell::new(journal)),
            config,
            current: None,
            suppress_journaling: false,
            pending: None,
        }
    }

    /// Shared handle to the journal, for building views.
    pub fn journal(&self) -> Rc<RefCell<Journal>> {
        Rc::clone(&self.journal)
    }

    /// The content currently displayed, if any.
    pub fn current_content(&self) -> Option<&ContentDescriptor> {
        self.current.as_ref()
    }

    /// Whether a navigation is awaiting its content. During this gap
    /// the journal reflects the staged position.
    pub fn is_navigation_pending(&self) -> bool {
        self.pending.is_some()
    }

    // -------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------

    /// Begin a navigation to new content. Any in-flight navigation is
    /// aborted first. The departing content is snapshotted into the
    /// journal unless journaling was suppressed for it; forward history
    /// is discarded either way.
    pub fn navigate(&mut self, target: Option<&Locator>) {
        self.abort_pending();
        match target {
            Some(locator) => log::debug!("navigate: {locator}"),
            None => log::debug!("navigate: object-only content"),
        }

        let departure = self.departure_entry();
        let mut journal = self.journal.borrow_mut();
        if let Some(entry) = departure {
            journal.update_current_entry(entry);
            journal.advance_current();
        }
        journal.record_new_navigation();
        drop(journal);

        self.pending = Some(PendingNavigation {
            mode: NavigationMode::New,
            target: None,
        });
    }

    /// Stage a Back navigation and return the entry to bind. Errors if
    /// nothing behind is navigable; callers check [`Self::can_go_back`]
    /// first. `Ok(None)` is the degenerate already-there case.
    pub fn go_back(&mut self) -> Result<Option<JournalEntry>> {
        self.abort_pending();
        let departure = self.departure_entry();
        let mut journal = self.journal.borrow_mut();
        if let Some(entry) = departure {
            journal.update_current_entry(entry);
        }
        let target = journal.begin_back_navigation()?;
        drop(journal);

        if let Some(entry) = &target {
            self.pending = Some(PendingNavigation {
                mode: NavigationMode::Back,
                target: Some(entry.clone()),
            });
        }
        Ok(target)
    }

    /// Stage a Forward navigation and return the entry to bind.
    pub fn go_forward(&mut self) -> Result<Option<JournalEntry>> {
        self.abort_pending();
        let departure = self.departure_entry();
        let mut journal = self.journal.borrow_mut();
        if let Some(entry) = departure {
            journal.update_current_entry(entry);
        }
        let target = journal.begin_forward_navigation()?;
        drop(journal);

        if let Some(entry) = &target {
            self.pending = Some(PendingNavigation {
                mode: NavigationMode::Forward,
                target: Some(entry.clone()),
            });
        }
        Ok(target)
    }

    /// Re-bind the current content. The journal position is untouched;
    /// the current slot's entry is refreshed when the rebind commits.
    pub fn refresh(&mut self) -> Result<()> {
        if self.current.is_none() {
            return Err(NavError::InvalidOperation("no content to refresh".into()));
        }
        self.abort_pending();
        self.pending = Some(PendingNavigation {
            mode: NavigationMode::Refresh,
            target: None,
        });
        Ok(())
    }

    /// Force a journal snapshot of the current content with
    /// caller-supplied custom state, without navigating anywhere. Used
    /// by content that wants fragment-like sub-states in history.
    ///
    /// Unserializable state is rejected here, not at persistence time.
    pub fn add_back_entry<T: Serialize>(&mut self, custom_state: &T) -> Result<()> {
        let blob = StateBlob::capture(custom_state)?;
        if self.current.is_none() {
            return Err(NavError::InvalidOperation(
                "no current content to snapshot".into(),
            ));
        }
        self.abort_pending();

        // The snapshot lands as a back entry: record it on the current
        // slot and step past it, like a departure without a departure.
        let entry = self
            .departure_entry()
            .map(|e| e.with_custom_state(blob))
            .ok_or_else(|| {
                NavError::InvalidOperation("journaling is suppressed for the current content".into())
            })?;
        let mut journal = self.journal.borrow_mut();
        journal.update_current_entry(entry);
        journal.advance_current();
        journal.record_new_navigation();
        Ok(())
    }

    /// Remove the nearest back entry. `None` when there is none.
    pub fn remove_back_entry(&mut self) -> Option<JournalEntry> {
        self.journal.borrow_mut().remove_back_entry()
    }

    /// Skip journaling the current content when it is next departed.
    pub fn suppress_current_journaling(&mut self) {
        self.suppress_journaling = true;
    }

    pub fn can_go_back(&self) -> bool {
        self.journal.borrow().can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.journal.borrow().can_go_forward()
    }

    // -------------------------------------------------------------------
    // Content pipeline callbacks
    // -------------------------------------------------------------------

    /// The pipeline delivered and bound content for the in-flight
    /// navigation: commit it.
    pub fn content_ready(&mut self, descriptor: ContentDescriptor) {
        match self.pending.take() {
            Some(pending) => match pending.mode {
                NavigationMode::Back | NavigationMode::Forward => {
                    if let Some(target) = &pending.target {
                        self.journal.borrow_mut().commit_journal_navigation(target);
                    }
                },
                NavigationMode::New | NavigationMode::Refresh => {
                    // The destination entry is created (New: appended at
                    // the advanced cursor) or refreshed in place.
                    let entry = Self::entry_for(&descriptor, &self.config);
                    self.journal.borrow_mut().update_current_entry(entry);
                },
            },
            None => {
                log::warn!("content_ready with no navigation pending; adopting content");
            },
        }
        self.current = Some(descriptor);
    }

    /// The pipeline failed or was cancelled: the staged navigation
    /// always resolves to an abort, never a partial commit.
    pub fn content_failed(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("navigation failed; reverting to committed position");
        }
        self.journal.borrow_mut().abort_journal_navigation();
    }

    // -------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------

    /// Observable back stack for binding into a history menu.
    pub fn back_stack(&self) -> EntryStack {
        EntryStack::back(Rc::clone(&self.journal))
    }

    /// Observable forward stack.
    pub fn forward_stack(&self) -> EntryStack {
        EntryStack::forward(Rc::clone(&self.journal))
    }

    /// Merged, capped, display-ready history sequence.
    pub fn history_menu(&self) -> UnifiedView {
        UnifiedView::new(Rc::clone(&self.journal), &self.config)
    }

    // -------------------------------------------------------------------
    // Entry construction
    // -------------------------------------------------------------------

    /// Snapshot the departing content, consuming any suppression.
    /// `None` when there is nothing to journal.
    fn departure_entry(&mut self) -> Option<JournalEntry> {
        if self.suppress_journaling {
            self.suppress_journaling = false;
            return None;
        }
        let descriptor = self.current.as_ref()?;
        Some(Self::entry_for(descriptor, &self.config))
    }

    /// Choose the entry subtype by content shape: content that cannot
    /// be reconstructed from a locator is retained keep-alive;
    /// everything else is captured locator-only so the journal stays
    /// durable and serializable.
    fn entry_for(descriptor: &ContentDescriptor, config: &JournalConfig) -> JournalEntry {
        let mut entry = match (&descriptor.source, descriptor.keep_alive) {
            (Some(locator), false) => {
                JournalEntry::new(locator.clone(), &descriptor.name, descriptor.group)
            },
            _ => JournalEntry::keep_alive(
                descriptor.content.clone(),
                &descriptor.name,
                descriptor.group,
            ),
        };
        if config.capture_viewer_state
            && let Some(state) = &descriptor.viewer_state
        {
            entry = entry.with_viewer_state(state.clone());
        }
        entry
    }

    /// Abort any in-flight navigation; a new request always displaces
    /// the pending one.
    fn abort_pending(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("new navigation request aborts the in-flight one");
            self.journal.borrow_mut().abort_journal_navigation();
        }
    }
}
