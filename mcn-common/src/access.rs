//! Access gate: scan/code-entry authorization for artwork detail content
//!
//! Each visitor session owns one [`AccessGate`]. Per artwork the gate moves
//! from `Unscanned` to `Granted` and never back; there is no revocation or
//! expiry while the session lives.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::{ArtworkId, Catalog};

/// Path segment that marks an artwork detail URL
pub const DETAIL_SEGMENT: &str = "/artwork/";

/// Per-artwork gate state within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    Unscanned,
    Granted,
}

/// Artworks the session has proven access to
///
/// Grows only; there is no removal operation.
#[derive(Debug, Clone, Default)]
pub struct AccessRecord {
    granted: HashSet<ArtworkId>,
}

impl AccessRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ArtworkId) -> bool {
        self.granted.contains(id)
    }

    /// Returns true when `id` was not already present
    fn insert(&mut self, id: ArtworkId) -> bool {
        self.granted.insert(id)
    }

    pub fn len(&self) -> usize {
        self.granted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }

    /// Granted identifiers, sorted for stable output
    pub fn granted(&self) -> Vec<&ArtworkId> {
        let mut ids: Vec<_> = self.granted.iter().collect();
        ids.sort();
        ids
    }
}

/// Result of normalizing visitor input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCode {
    /// Input names an artwork in the catalog
    Artwork(ArtworkId),
    /// Input does not resolve; carries the identifier that was tried
    Invalid { candidate: String },
}

/// Session-scoped gatekeeper for artwork detail content
#[derive(Debug, Clone)]
pub struct AccessGate {
    catalog: Arc<Catalog>,
    record: AccessRecord,
}

impl AccessGate {
    /// Fresh gate with an empty access record
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            record: AccessRecord::new(),
        }
    }

    pub fn has_access(&self, id: &ArtworkId) -> bool {
        self.record.contains(id)
    }

    pub fn state(&self, id: &ArtworkId) -> AccessState {
        if self.has_access(id) {
            AccessState::Granted
        } else {
            AccessState::Unscanned
        }
    }

    /// Record access to `id`
    ///
    /// Idempotent and infallible. Callers validate `id` against the catalog
    /// first (see [`AccessGate::resolve_code`]). Returns true on the
    /// `Unscanned -> Granted` transition, false if already granted.
    pub fn grant_access(&mut self, id: ArtworkId) -> bool {
        let newly = self.record.insert(id.clone());
        if newly {
            debug!(artwork_id = %id, "Access granted");
        }
        newly
    }

    /// Normalize scanned or typed input into a catalog artwork
    pub fn resolve_code(&self, raw: &str) -> ResolvedCode {
        let candidate = extract_identifier(raw);
        if !candidate.is_empty() && self.catalog.artwork_by_str(candidate).is_some() {
            ResolvedCode::Artwork(ArtworkId::new(candidate))
        } else {
            ResolvedCode::Invalid {
                candidate: candidate.to_string(),
            }
        }
    }

    pub fn record(&self) -> &AccessRecord {
        &self.record
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }
}

/// Identifier carried by scan input
///
/// URL-shaped input containing `/artwork/<id>` yields `<id>` (query string,
/// fragment and trailing slash removed); anything else is taken literally
/// after trimming whitespace.
pub fn extract_identifier(raw: &str) -> &str {
    let input = raw.trim();
    match input.rfind(DETAIL_SEGMENT) {
        Some(pos) => {
            let tail = &input[pos + DETAIL_SEGMENT.len()..];
            let end = tail.find(['/', '?', '#']).unwrap_or(tail.len());
            tail[..end].trim()
        }
        None => input,
    }
}
