//! Foundation types for the Compass navigation journal.
//!
//! This crate contains the engine-agnostic core types shared by the
//! Compass crates: the error enum, URI-like locators, opaque state
//! carriers, and host/group identity keys.

pub mod error;
pub mod group;
pub mod locator;
pub mod state;

pub use error::{NavError, Result};
pub use group::{GroupKey, HostId};
pub use locator::Locator;
pub use state::{ContentRef, StateBlob};
