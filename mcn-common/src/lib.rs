//! # MCN Common Library
//!
//! Core of the museum visit companion, shared by the guide service:
//! - Catalog store (artworks, routes) with localized content
//! - Access gate (scan/code-entry authorization per visitor session)
//! - Route progress tracking with a one-time completion signal
//! - Navigation decisions at the artwork detail boundary
//! - Camera scan sessions and chat conversation state
//! - Event bus, configuration loading, common error type

pub mod access;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod events;
pub mod i18n;
pub mod messages;
pub mod navigation;
pub mod progress;
pub mod scan;

pub use catalog::{ArtworkId, Catalog, RouteId};
pub use error::{CollaboratorFailure, Error, Result};
pub use i18n::Language;
