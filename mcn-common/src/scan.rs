//! Camera scan sessions
//!
//! A scan session holds the acquired camera as a [`CameraLease`] and feeds
//! decoded text into the navigation controller. The first accepted code
//! wins: access is granted, the camera is released, and later decode events
//! are ignored. The lease is released exactly once, on acceptance, explicit
//! close, or drop.

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::access::AccessGate;
use crate::catalog::ArtworkId;
use crate::i18n::Language;
use crate::navigation::{NavigationController, ScanDecision};

/// Acquired camera resource
pub trait CameraLease: Send {
    /// Stop the stream and free the device
    fn release(&mut self);
}

/// Lifecycle of a scan session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScanState {
    Scanning,
    Accepted { artwork_id: ArtworkId },
    Closed,
}

/// Outcome of one decode event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Session no longer scanning; event dropped
    Ignored,
    /// Code rejected; scanning continues
    Invalid { candidate: String, message: String },
    /// Code accepted; camera released; navigate to the detail view
    Accepted {
        artwork_id: ArtworkId,
        navigate_to: String,
    },
}

/// One camera scanning attempt
pub struct ScanSession<C: CameraLease> {
    id: Uuid,
    lease: Option<C>,
    state: ScanState,
}

impl<C: CameraLease> ScanSession<C> {
    /// Start scanning with an acquired camera
    pub fn open(id: Uuid, lease: C) -> Self {
        debug!(scan_id = %id, "Camera scan opened");
        Self {
            id,
            lease: Some(lease),
            state: ScanState::Scanning,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }

    /// Feed one decoded string through the shared code path
    pub fn on_decoded(
        &mut self,
        raw: &str,
        navigation: &NavigationController,
        gate: &mut AccessGate,
        language: Language,
    ) -> DecodeOutcome {
        if !self.is_scanning() {
            debug!(scan_id = %self.id, "Dropping decode event after scan ended");
            return DecodeOutcome::Ignored;
        }

        match navigation.submit_code(gate, raw, language) {
            ScanDecision::Granted {
                artwork_id,
                navigate_to,
                ..
            } => {
                info!(scan_id = %self.id, artwork_id = %artwork_id, "Camera scan accepted");
                self.release_camera();
                self.state = ScanState::Accepted {
                    artwork_id: artwork_id.clone(),
                };
                DecodeOutcome::Accepted {
                    artwork_id,
                    navigate_to,
                }
            }
            ScanDecision::Invalid { candidate, message } => {
                DecodeOutcome::Invalid { candidate, message }
            }
        }
    }

    /// Stop scanning and release the camera
    ///
    /// An accepted session keeps its `Accepted` state.
    pub fn close(&mut self) {
        self.release_camera();
        if self.is_scanning() {
            self.state = ScanState::Closed;
            debug!(scan_id = %self.id, "Camera scan closed");
        }
    }

    fn release_camera(&mut self) {
        if let Some(mut lease) = self.lease.take() {
            lease.release();
        }
    }
}

impl<C: CameraLease> Drop for ScanSession<C> {
    fn drop(&mut self) {
        self.release_camera();
    }
}

impl<C: CameraLease> std::fmt::Debug for ScanSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("id", &self.id)
            .field("camera_held", &self.lease.is_some())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingLease(Arc<AtomicUsize>);

    impl CameraLease for CountingLease {
        fn release(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn setup() -> (NavigationController, AccessGate, Arc<AtomicUsize>) {
        let catalog = Arc::new(Catalog::builtin().unwrap());
        (
            NavigationController::new(catalog.clone()),
            AccessGate::new(catalog),
            Arc::new(AtomicUsize::new(0)),
        )
    }

    #[test]
    fn test_first_accepted_decode_wins() {
        let (nav, mut gate, releases) = setup();
        let mut scan = ScanSession::open(Uuid::new_v4(), CountingLease(releases.clone()));

        let first = scan.on_decoded("https://site/artwork/1", &nav, &mut gate, Language::Fr);
        assert_eq!(
            first,
            DecodeOutcome::Accepted {
                artwork_id: ArtworkId::new("1"),
                navigate_to: "/artwork/1".to_string(),
            }
        );
        assert_eq!(releases.load(Ordering::SeqCst), 1);

        // Repeated frames of the same code and later codes are dropped
        assert_eq!(
            scan.on_decoded("https://site/artwork/1", &nav, &mut gate, Language::Fr),
            DecodeOutcome::Ignored
        );
        assert_eq!(
            scan.on_decoded("2", &nav, &mut gate, Language::Fr),
            DecodeOutcome::Ignored
        );
        assert!(!gate.has_access(&ArtworkId::new("2")));

        drop(scan);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_decode_keeps_scanning() {
        let (nav, mut gate, releases) = setup();
        let mut scan = ScanSession::open(Uuid::new_v4(), CountingLease(releases.clone()));

        let outcome = scan.on_decoded("not-a-code", &nav, &mut gate, Language::En);
        assert!(matches!(outcome, DecodeOutcome::Invalid { .. }));
        assert!(scan.is_scanning());
        assert_eq!(releases.load(Ordering::SeqCst), 0);

        let outcome = scan.on_decoded("3", &nav, &mut gate, Language::En);
        assert!(matches!(outcome, DecodeOutcome::Accepted { .. }));
        assert!(gate.has_access(&ArtworkId::new("3")));
    }

    #[test]
    fn test_close_releases_once() {
        let (nav, mut gate, releases) = setup();
        let mut scan = ScanSession::open(Uuid::new_v4(), CountingLease(releases.clone()));
        scan.close();
        scan.close();
        assert_eq!(*scan.state(), ScanState::Closed);
        assert_eq!(
            scan.on_decoded("1", &nav, &mut gate, Language::Fr),
            DecodeOutcome::Ignored
        );
        drop(scan);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(gate.record().is_empty());
    }

    #[test]
    fn test_drop_releases_camera() {
        let (_, _, releases) = setup();
        {
            let _scan = ScanSession::open(Uuid::new_v4(), CountingLease(releases.clone()));
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_decode_events_then_close() {
        let (_, _, releases) = setup();
        let mut scan = ScanSession::open(Uuid::new_v4(), CountingLease(releases.clone()));
        assert!(scan.is_scanning());
        scan.close();
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }
}
