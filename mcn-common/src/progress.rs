//! Route progress tracking
//!
//! A visitor marks route artworks as seen; the tracker derives counts,
//! percentage, and completion. Progress for a route lives as long as the
//! visitor's current viewing of it: [`RouteProgressTracker::begin`] starts a
//! fresh viewing. Observers are told once per route per session when a route
//! first reaches 100%.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::{ArtworkId, Catalog, Route, RouteId};

/// Counts and percentage for one route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub completed_count: usize,
    pub total_count: usize,
    /// Whole percent, rounded half up; 0 for an empty route
    pub percentage: u32,
}

impl ProgressSnapshot {
    pub fn new(completed_count: usize, total_count: usize) -> Self {
        Self {
            completed_count,
            total_count,
            percentage: percentage(completed_count, total_count),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total_count > 0 && self.completed_count == self.total_count
    }
}

/// `completed / total * 100`, rounded half up, 0 when `total` is 0
pub fn percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    ((completed * 200 + total) / (total * 2)) as u32
}

/// Seen-set for one viewing of one route
///
/// Members are the route's artworks present in the catalog; the completed
/// set is always a subset of them.
#[derive(Debug, Clone)]
pub struct RouteProgress {
    route_id: RouteId,
    members: Vec<ArtworkId>,
    completed: HashSet<ArtworkId>,
}

impl RouteProgress {
    pub fn new(route: &Route, catalog: &Catalog) -> Self {
        Self {
            route_id: route.id.clone(),
            members: catalog.route_members(route),
            completed: HashSet::new(),
        }
    }

    pub fn route_id(&self) -> &RouteId {
        &self.route_id
    }

    /// Returns true if `artwork` was newly recorded
    ///
    /// Non-members are ignored.
    pub fn mark_seen(&mut self, artwork: &ArtworkId) -> bool {
        if !self.members.contains(artwork) {
            return false;
        }
        self.completed.insert(artwork.clone())
    }

    pub fn is_seen(&self, artwork: &ArtworkId) -> bool {
        self.completed.contains(artwork)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(self.completed.len(), self.members.len())
    }

    pub fn is_complete(&self) -> bool {
        self.snapshot().is_complete()
    }
}

/// Outcome of [`RouteProgressTracker::mark_seen`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkSeen {
    /// Route identifier is not in the catalog
    UnknownRoute,
    /// Artwork is not part of the route; nothing changed
    NotOnRoute(ProgressSnapshot),
    /// Artwork was already marked; nothing changed
    AlreadySeen(ProgressSnapshot),
    /// Artwork recorded
    Recorded(ProgressSnapshot),
}

impl MarkSeen {
    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        match self {
            MarkSeen::UnknownRoute => None,
            MarkSeen::NotOnRoute(s) | MarkSeen::AlreadySeen(s) | MarkSeen::Recorded(s) => {
                Some(*s)
            }
        }
    }
}

/// Notice delivered when a route first reaches 100% in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteCompleted {
    pub route_id: RouteId,
    pub total_count: usize,
    pub completed_at: DateTime<Utc>,
}

/// Receiver of route completion notices
pub trait CompletionObserver: Send + Sync {
    fn route_completed(&self, notice: &RouteCompleted);
}

impl<F> CompletionObserver for F
where
    F: Fn(&RouteCompleted) + Send + Sync,
{
    fn route_completed(&self, notice: &RouteCompleted) {
        self(notice)
    }
}

/// Per-session progress across all routes
pub struct RouteProgressTracker {
    catalog: Arc<Catalog>,
    routes: HashMap<RouteId, RouteProgress>,
    celebrated: HashSet<RouteId>,
    observers: Vec<Arc<dyn CompletionObserver>>,
}

impl RouteProgressTracker {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            routes: HashMap::new(),
            celebrated: HashSet::new(),
            observers: Vec::new(),
        }
    }

    /// Register an observer for first-time route completion
    pub fn subscribe(&mut self, observer: Arc<dyn CompletionObserver>) {
        self.observers.push(observer);
    }

    /// Start a fresh viewing of `route_id`, discarding earlier progress
    ///
    /// Returns `None` for an unknown route.
    pub fn begin(&mut self, route_id: &RouteId) -> Option<ProgressSnapshot> {
        let route = self.catalog.find_route(route_id)?;
        let progress = RouteProgress::new(route, &self.catalog);
        let snapshot = progress.snapshot();
        self.routes.insert(route_id.clone(), progress);
        debug!(route_id = %route_id, total = snapshot.total_count, "Route viewing started");
        Some(snapshot)
    }

    /// Mark `artwork_id` as seen on `route_id`
    ///
    /// Non-members leave progress untouched. Repeating a mark changes nothing.
    pub fn mark_seen(&mut self, route_id: &RouteId, artwork_id: &ArtworkId) -> MarkSeen {
        let Some(progress) = self.progress_entry(route_id) else {
            return MarkSeen::UnknownRoute;
        };

        if !progress.members.contains(artwork_id) {
            debug!(route_id = %route_id, artwork_id = %artwork_id, "Ignoring artwork not on route");
            return MarkSeen::NotOnRoute(progress.snapshot());
        }
        if !progress.mark_seen(artwork_id) {
            return MarkSeen::AlreadySeen(progress.snapshot());
        }

        let snapshot = progress.snapshot();
        debug!(
            route_id = %route_id,
            artwork_id = %artwork_id,
            completed = snapshot.completed_count,
            total = snapshot.total_count,
            "Artwork marked as seen"
        );
        if snapshot.is_complete() {
            self.notify_completed(route_id, snapshot);
        }
        MarkSeen::Recorded(snapshot)
    }

    /// Current progress; a route not yet viewed reports 0 of its total
    pub fn progress(&self, route_id: &RouteId) -> Option<ProgressSnapshot> {
        match self.routes.get(route_id) {
            Some(progress) => Some(progress.snapshot()),
            None => self
                .catalog
                .find_route(route_id)
                .map(|route| ProgressSnapshot::new(0, self.catalog.route_members(route).len())),
        }
    }

    /// True iff every artwork on the route has been marked and the route is non-empty
    pub fn is_complete(&self, route_id: &RouteId) -> bool {
        self.progress(route_id)
            .map(|s| s.is_complete())
            .unwrap_or(false)
    }

    pub fn is_seen(&self, route_id: &RouteId, artwork_id: &ArtworkId) -> bool {
        self.routes
            .get(route_id)
            .map(|p| p.is_seen(artwork_id))
            .unwrap_or(false)
    }

    fn progress_entry(&mut self, route_id: &RouteId) -> Option<&mut RouteProgress> {
        if !self.routes.contains_key(route_id) {
            let route = self.catalog.find_route(route_id)?;
            let progress = RouteProgress::new(route, &self.catalog);
            self.routes.insert(route_id.clone(), progress);
        }
        self.routes.get_mut(route_id)
    }

    fn notify_completed(&mut self, route_id: &RouteId, snapshot: ProgressSnapshot) {
        if !self.celebrated.insert(route_id.clone()) {
            return;
        }
        info!(route_id = %route_id, "Route completed");
        let notice = RouteCompleted {
            route_id: route_id.clone(),
            total_count: snapshot.total_count,
            completed_at: Utc::now(),
        };
        for observer in &self.observers {
            observer.route_completed(&notice);
        }
    }
}

impl std::fmt::Debug for RouteProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteProgressTracker")
            .field("routes", &self.routes)
            .field("celebrated", &self.celebrated)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Dataset;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tracker() -> RouteProgressTracker {
        RouteProgressTracker::new(Arc::new(Catalog::builtin().unwrap()))
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(0, 2), 0);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(1, 8), 13);
    }

    #[test]
    fn test_unviewed_route_reports_zero() {
        let tracker = tracker();
        let snapshot = tracker.progress(&RouteId::new("1")).unwrap();
        assert_eq!(snapshot, ProgressSnapshot::new(0, 2));
        assert!(!tracker.is_complete(&RouteId::new("1")));
        assert!(tracker.progress(&RouteId::new("99")).is_none());
    }

    #[test]
    fn test_mark_seen_ignores_non_members() {
        let mut tracker = tracker();
        let outcome = tracker.mark_seen(&RouteId::new("1"), &ArtworkId::new("3"));
        assert_eq!(outcome, MarkSeen::NotOnRoute(ProgressSnapshot::new(0, 2)));
    }

    #[test]
    fn test_mark_seen_unknown_route() {
        let mut tracker = tracker();
        assert_eq!(
            tracker.mark_seen(&RouteId::new("99"), &ArtworkId::new("1")),
            MarkSeen::UnknownRoute
        );
    }

    #[test]
    fn test_mark_seen_twice_is_idempotent() {
        let mut tracker = tracker();
        let route = RouteId::new("1");
        let first = tracker.mark_seen(&route, &ArtworkId::new("1"));
        let second = tracker.mark_seen(&route, &ArtworkId::new("1"));
        assert_eq!(first, MarkSeen::Recorded(ProgressSnapshot::new(1, 2)));
        assert_eq!(second, MarkSeen::AlreadySeen(ProgressSnapshot::new(1, 2)));
    }

    #[test]
    fn test_begin_resets_progress() {
        let mut tracker = tracker();
        let route = RouteId::new("1");
        tracker.mark_seen(&route, &ArtworkId::new("1"));
        assert_eq!(tracker.begin(&route), Some(ProgressSnapshot::new(0, 2)));
        assert!(!tracker.is_seen(&route, &ArtworkId::new("1")));
        assert_eq!(tracker.begin(&RouteId::new("99")), None);
    }

    #[test]
    fn test_completion_notified_once_per_session() {
        let mut tracker = tracker();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        tracker.subscribe(Arc::new(move |notice: &RouteCompleted| {
            assert_eq!(notice.route_id, RouteId::new("1"));
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        let route = RouteId::new("1");
        tracker.mark_seen(&route, &ArtworkId::new("1"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tracker.mark_seen(&route, &ArtworkId::new("2"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(tracker.is_complete(&route));

        // A fresh viewing completed again does not re-notify
        tracker.begin(&route);
        tracker.mark_seen(&route, &ArtworkId::new("1"));
        tracker.mark_seen(&route, &ArtworkId::new("2"));
        assert!(tracker.is_complete(&route));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_route_never_completes() {
        let catalog = Catalog::from_json(
            r#"{"artworks": [], "routes": [{"id": "empty", "translations": {"fr": {"title": "Vide", "description": ""}}, "artworks": []}]}"#,
        )
        .unwrap();
        let tracker = RouteProgressTracker::new(Arc::new(catalog));
        let snapshot = tracker.progress(&RouteId::new("empty")).unwrap();
        assert_eq!(snapshot.percentage, 0);
        assert_eq!(snapshot.total_count, 0);
        assert!(!tracker.is_complete(&RouteId::new("empty")));
    }

    #[test]
    fn test_duplicate_route_entries_counted_once() {
        let mut dataset: Dataset =
            serde_json::from_str(include_str!("../data/catalog.json")).unwrap();
        dataset.routes[0].artworks.push(ArtworkId::new("1"));
        let mut tracker = RouteProgressTracker::new(Arc::new(Catalog::from_dataset(dataset).unwrap()));
        let route = RouteId::new("1");
        assert_eq!(tracker.progress(&route).unwrap().total_count, 2);
        tracker.mark_seen(&route, &ArtworkId::new("1"));
        tracker.mark_seen(&route, &ArtworkId::new("2"));
        assert!(tracker.is_complete(&route));
    }

    #[test]
    fn test_dangling_route_reference_not_counted() {
        let mut dataset: Dataset =
            serde_json::from_str(include_str!("../data/catalog.json")).unwrap();
        dataset.routes[0].artworks.insert(1, ArtworkId::new("ghost"));
        let mut tracker = RouteProgressTracker::new(Arc::new(Catalog::from_dataset(dataset).unwrap()));
        let route = RouteId::new("1");

        assert_eq!(tracker.progress(&route).unwrap().total_count, 2);
        assert_eq!(
            tracker.mark_seen(&route, &ArtworkId::new("ghost")),
            MarkSeen::NotOnRoute(ProgressSnapshot::new(0, 2))
        );
        tracker.mark_seen(&route, &ArtworkId::new("1"));
        tracker.mark_seen(&route, &ArtworkId::new("2"));
        assert_eq!(tracker.progress(&route).unwrap().percentage, 100);
        assert!(tracker.is_complete(&route));
    }
}
