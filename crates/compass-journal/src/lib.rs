//! Navigation journal engine: browser-style Back/Forward history for a
//! content host.
//!
//! This crate records, replays, and merges the history of navigations
//! performed by one navigation host (a window or frame). The
//! [`Journal`] holds the ordered entry list with a committed and a
//! staged position; the [`NavigationService`] drives the
//! stage-bind-commit/abort protocol around the out-of-scope content
//! pipeline; [`EntryStack`], [`LimitedView`], and [`UnifiedView`]
//! project the history for binding into UI menus.

pub mod config;
pub mod entry;
pub mod events;
pub mod journal;
pub mod persist;
pub mod service;
pub mod stack;
pub mod view;

// -----------------------------------------------------------------------
// Public re-exports
// -----------------------------------------------------------------------

pub use config::JournalConfig;
pub use entry::{EntryId, EntryType, JournalEntry};
pub use events::{ChangePublisher, Subscription, ViewChange};
pub use journal::{EntryFilter, Journal};
pub use persist::{load_journal, save_journal};
pub use service::{ContentDescriptor, NavigationMode, NavigationService};
pub use stack::{EntryStack, StackDirection, StackIter};
pub use view::{DEFAULT_MENU_CAP, LimitedView, MenuItem, RelativePosition, UnifiedView};
