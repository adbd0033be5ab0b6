//! Opaque state carriers: serializable state blobs and live content
//! handles.
//!
//! A journal entry may carry two kinds of replayable state. A
//! [`StateBlob`] is application state captured through serde and stored
//! opaquely; it survives persistence. A [`ContentRef`] is a handle to
//! live in-memory content that cannot be reconstructed from a locator;
//! entries holding one are "keep-alive" and are dropped by the pruning
//! pass before a journal is persisted.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};

// ---------------------------------------------------------------------------
// StateBlob
// ---------------------------------------------------------------------------

/// Opaque, serializable application state.
///
/// Captured from any `Serialize` value. Capture fails immediately if
/// the value cannot be serialized, so unserializable state is rejected
/// at the point it enters the journal, not at persistence time.
///
/// A blob starts in the `Live` form (a JSON document tree). The
/// pre-serialization compaction pass converts it to the `Packed` form,
/// a contiguous compact encoding suitable for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateBlob {
    /// In-memory document tree, as captured.
    Live(serde_json::Value),
    /// Compact byte encoding produced by [`StateBlob::pack`].
    Packed(Vec<u8>),
}

impl StateBlob {
    /// Capture a serializable value as opaque state.
    pub fn capture<T: Serialize>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| NavError::State(format!("state not serializable: {e}")))?;
        Ok(StateBlob::Live(value))
    }

    /// Restore the captured value.
    pub fn restore<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            StateBlob::Live(value) => Ok(serde_json::from_value(value.clone())?),
            StateBlob::Packed(bytes) => Ok(serde_json::from_slice(bytes)?),
        }
    }

    /// Convert to the compact packed form. No-op if already packed.
    pub fn pack(&mut self) -> Result<()> {
        if let StateBlob::Live(value) = self {
            let bytes = serde_json::to_vec(value)?;
            *self = StateBlob::Packed(bytes);
        }
        Ok(())
    }

    /// Whether this blob is in the packed form.
    pub fn is_packed(&self) -> bool {
        matches!(self, StateBlob::Packed(_))
    }
}

// ---------------------------------------------------------------------------
// ContentRef
// ---------------------------------------------------------------------------

/// A cheaply clonable handle to live in-memory content.
///
/// The journal never inspects the content; it only keeps the handle
/// alive for keep-alive entries and compares handles by pointer
/// identity. Single-threaded by design, like the rest of the engine.
#[derive(Clone)]
pub struct ContentRef(Rc<dyn Any>);

impl ContentRef {
    /// Wrap a content object.
    pub fn new<T: 'static>(content: T) -> Self {
        Self(Rc::new(content))
    }

    /// Borrow the content as a concrete type, if it is one.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Pointer identity: do two handles refer to the same content
    /// object?
    pub fn same_content(&self, other: &ContentRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentRef({:p})", Rc::as_ptr(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct ScrollPos {
        x: i32,
        y: i32,
    }

    #[test]
    fn capture_and_restore() {
        let blob = StateBlob::capture(&ScrollPos { x: 3, y: 150 }).unwrap();
        let back: ScrollPos = blob.restore().unwrap();
        assert_eq!(back, ScrollPos { x: 3, y: 150 });
    }

    #[test]
    fn pack_preserves_value() {
        let mut blob = StateBlob::capture(&ScrollPos { x: 1, y: 2 }).unwrap();
        assert!(!blob.is_packed());
        blob.pack().unwrap();
        assert!(blob.is_packed());
        let back: ScrollPos = blob.restore().unwrap();
        assert_eq!(back, ScrollPos { x: 1, y: 2 });
    }

    #[test]
    fn pack_is_idempotent() {
        let mut blob = StateBlob::capture(&42u32).unwrap();
        blob.pack().unwrap();
        let first = blob.clone();
        blob.pack().unwrap();
        assert_eq!(blob, first);
    }

    #[test]
    fn restore_wrong_type_fails() {
        let blob = StateBlob::capture(&"a string").unwrap();
        assert!(blob.restore::<ScrollPos>().is_err());
    }

    #[test]
    fn serde_round_trip_packed() {
        let mut blob = StateBlob::capture(&ScrollPos { x: 9, y: 9 }).unwrap();
        blob.pack().unwrap();
        let json = serde_json::to_string(&blob).unwrap();
        let back: StateBlob = serde_json::from_str(&json).unwrap();
        let pos: ScrollPos = back.restore().unwrap();
        assert_eq!(pos, ScrollPos { x: 9, y: 9 });
    }

    #[test]
    fn content_ref_identity() {
        let a = ContentRef::new("page".to_string());
        let b = a.clone();
        let c = ContentRef::new("page".to_string());
        assert!(a.same_content(&b));
        assert!(!a.same_content(&c));
    }

    #[test]
    fn content_ref_downcast() {
        let a = ContentRef::new(7u32);
        assert_eq!(a.downcast_ref::<u32>(), Some(&7));
        assert_eq!(a.downcast_ref::<String>(), None);
    }
}
