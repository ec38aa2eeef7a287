//! Navigation controller: decisions at the artwork detail boundary
//!
//! Detail requests are checked against the catalog and the visitor's access
//! gate. Manual entry and camera decode events both submit raw text through
//! [`NavigationController::submit_code`], so there is one validation path.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::access::{AccessGate, ResolvedCode};
use crate::catalog::{Artwork, ArtworkId, Catalog, Route, RouteId};
use crate::i18n::Language;
use crate::messages;

/// Entry point of the scanning flow
pub const SCANNER_PATH: &str = "/qr-scanner";
pub const GALLERY_PATH: &str = "/gallery";
pub const ROUTES_PATH: &str = "/routes";

pub fn artwork_path(id: &ArtworkId) -> String {
    format!("/artwork/{}", id)
}

pub fn route_path(id: &RouteId) -> String {
    format!("/route/{}", id)
}

/// Labelled link offered to the visitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

/// Explanatory prompt with a single call-to-action back into scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanPrompt {
    pub message: String,
    pub action: Link,
}

/// Redirect instruction for a blocked detail request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub location: String,
    /// Replace the current history entry so "back" skips the blocked page
    pub replace_history: bool,
    pub prompt: ScanPrompt,
}

/// "Not found" outcome with a recovery link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFound {
    pub requested: String,
    pub message: String,
    pub recovery: Link,
}

/// Outcome of a request to view artwork detail
#[derive(Debug, Clone, PartialEq)]
pub enum DetailDecision<'a> {
    NotFound(NotFound),
    Redirect(Redirect),
    Render(&'a Artwork),
}

/// Outcome of a request to view a route
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision<'a> {
    NotFound(NotFound),
    Render(&'a Route),
}

/// Outcome of a scan or manual-entry submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanDecision {
    /// Access recorded; continue to the detail view
    Granted {
        artwork_id: ArtworkId,
        /// False when the session already held this grant
        newly_granted: bool,
        navigate_to: String,
    },
    /// Input matched no artwork; stay in the scanning flow
    Invalid { candidate: String, message: String },
}

/// Orchestrates catalog lookups, the access gate, and redirects
#[derive(Debug, Clone)]
pub struct NavigationController {
    catalog: Arc<Catalog>,
}

impl NavigationController {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Decide what a request for artwork `id` shows
    ///
    /// Unknown artwork: not found, no redirect. Known but not granted:
    /// redirect to scanning, replacing history. Granted: render.
    pub fn request_detail(
        &self,
        gate: &AccessGate,
        id: &str,
        language: Language,
    ) -> DetailDecision<'_> {
        let Some(artwork) = self.catalog.artwork_by_str(id) else {
            debug!(artwork_id = id, "Detail request for unknown artwork");
            return DetailDecision::NotFound(NotFound {
                requested: id.to_string(),
                message: messages::artwork_not_found(language).to_string(),
                recovery: Link {
                    label: messages::back_to_gallery(language).to_string(),
                    href: GALLERY_PATH.to_string(),
                },
            });
        };

        if !gate.has_access(&artwork.id) {
            debug!(artwork_id = id, "Detail request blocked until scanned");
            return DetailDecision::Redirect(scan_redirect(language));
        }

        DetailDecision::Render(artwork)
    }

    /// Decide what a request for route `id` shows
    pub fn request_route(&self, id: &str, language: Language) -> RouteDecision<'_> {
        match self.catalog.find_route(&RouteId::new(id)) {
            Some(route) => RouteDecision::Render(route),
            None => RouteDecision::NotFound(route_not_found(id, language)),
        }
    }

    /// Handle scanned or typed input
    ///
    /// On success the grant is recorded before the navigation target is
    /// returned, so the following detail request is rendered. Invalid input
    /// leaves the gate untouched.
    pub fn submit_code(&self, gate: &mut AccessGate, raw: &str, language: Language) -> ScanDecision {
        match gate.resolve_code(raw) {
            ResolvedCode::Artwork(artwork_id) => {
                let newly_granted = gate.grant_access(artwork_id.clone());
                if newly_granted {
                    info!(artwork_id = %artwork_id, "Artwork unlocked by scan");
                }
                ScanDecision::Granted {
                    navigate_to: artwork_path(&artwork_id),
                    artwork_id,
                    newly_granted,
                }
            }
            ResolvedCode::Invalid { candidate } => {
                debug!(candidate = %candidate, "Rejected scan input");
                ScanDecision::Invalid {
                    candidate,
                    message: messages::invalid_code(language).to_string(),
                }
            }
        }
    }
}

/// "Route not found" with a link back to the route list
pub fn route_not_found(id: &str, language: Language) -> NotFound {
    NotFound {
        requested: id.to_string(),
        message: messages::route_not_found(language).to_string(),
        recovery: Link {
            label: messages::back_to_routes(language).to_string(),
            href: ROUTES_PATH.to_string(),
        },
    }
}

fn scan_redirect(language: Language) -> Redirect {
    Redirect {
        location: SCANNER_PATH.to_string(),
        replace_history: true,
        prompt: ScanPrompt {
            message: messages::scan_required(language).to_string(),
            action: Link {
                label: messages::scan_action(language).to_string(),
                href: SCANNER_PATH.to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (NavigationController, AccessGate) {
        let catalog = Arc::new(Catalog::builtin().unwrap());
        (
            NavigationController::new(catalog.clone()),
            AccessGate::new(catalog),
        )
    }

    #[test]
    fn test_unknown_artwork_is_not_found_without_redirect() {
        let (nav, gate) = setup();
        match nav.request_detail(&gate, "99", Language::En) {
            DetailDecision::NotFound(nf) => {
                assert_eq!(nf.requested, "99");
                assert_eq!(nf.recovery.href, GALLERY_PATH);
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_ungranted_artwork_redirects_with_replace() {
        let (nav, gate) = setup();
        match nav.request_detail(&gate, "2", Language::Fr) {
            DetailDecision::Redirect(redirect) => {
                assert_eq!(redirect.location, SCANNER_PATH);
                assert!(redirect.replace_history);
                assert_eq!(redirect.prompt.action.href, SCANNER_PATH);
            }
            other => panic!("expected Redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_submit_then_render() {
        let (nav, mut gate) = setup();
        let decision = nav.submit_code(&mut gate, "https://site/artwork/2", Language::Fr);
        assert_eq!(
            decision,
            ScanDecision::Granted {
                artwork_id: ArtworkId::new("2"),
                newly_granted: true,
                navigate_to: "/artwork/2".to_string(),
            }
        );
        match nav.request_detail(&gate, "2", Language::Fr) {
            DetailDecision::Render(artwork) => assert_eq!(artwork.id.as_str(), "2"),
            other => panic!("expected Render, got {:?}", other),
        }
    }

    #[test]
    fn test_resubmit_reports_existing_grant() {
        let (nav, mut gate) = setup();
        nav.submit_code(&mut gate, "1", Language::Fr);
        match nav.submit_code(&mut gate, "1", Language::Fr) {
            ScanDecision::Granted { newly_granted, .. } => assert!(!newly_granted),
            other => panic!("expected Granted, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_code_leaves_gate_untouched() {
        let (nav, mut gate) = setup();
        let decision = nav.submit_code(&mut gate, "99", Language::En);
        assert!(matches!(decision, ScanDecision::Invalid { ref candidate, .. } if candidate == "99"));
        assert!(gate.record().is_empty());
    }

    #[test]
    fn test_route_lookup() {
        let (nav, _) = setup();
        assert!(matches!(nav.request_route("1", Language::Fr), RouteDecision::Render(_)));
        match nav.request_route("42", Language::Wo) {
            RouteDecision::NotFound(nf) => assert_eq!(nf.recovery.href, ROUTES_PATH),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
