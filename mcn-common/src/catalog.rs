//! Catalog store: the immutable artwork and route collection
//!
//! Populated once at startup from a JSON dataset (built-in or a file named
//! in configuration). Lookups are by stable identifier; listings preserve
//! dataset insertion order.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

use crate::i18n::{Language, Localized};
use crate::{Error, Result};

/// Built-in museum collection
const BUILTIN_DATASET: &str = include_str!("../data/catalog.json");

/// Category filter value that selects every artwork
pub const ALL_CATEGORIES: &str = "all";

/// Stable artwork identifier (the code printed on the artwork's QR label)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtworkId(String);

impl ArtworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtworkId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Stable route identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Placement of an artwork on the floor plan
///
/// `x` and `y` are percentages of the plan's width and height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub floor: String,
    pub room: String,
    pub x: f32,
    pub y: f32,
}

/// Localized artwork text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkText {
    pub title: String,
    pub description: String,
    pub history: String,
}

/// One physical museum piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: ArtworkId,
    /// Image asset path served by the front end
    pub image: String,
    pub category: String,
    pub period: String,
    pub has_audio: bool,
    pub has_ar: bool,
    pub location: Location,
    pub translations: Localized<ArtworkText>,
}

impl Artwork {
    /// Text in `language`, falling back per [`Localized::get`]
    pub fn text(&self, language: Language) -> Option<&ArtworkText> {
        self.translations.get(language)
    }
}

/// Localized route text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteText {
    pub title: String,
    pub description: String,
}

/// Curated, ordered subset of artworks forming a themed tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub translations: Localized<RouteText>,
    /// Artwork identifiers in tour order
    pub artworks: Vec<ArtworkId>,
}

impl Route {
    pub fn text(&self, language: Language) -> Option<&RouteText> {
        self.translations.get(language)
    }

    /// Artwork identifiers in tour order with repeats removed
    pub fn distinct_artworks(&self) -> Vec<ArtworkId> {
        let mut seen = HashSet::new();
        self.artworks
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    }
}

/// Raw dataset as stored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub artworks: Vec<Artwork>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// Category selection for gallery listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Named(String),
}

impl CategoryFilter {
    /// Parse a filter value; `"all"` (any case) or an empty value selects everything
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_CATEGORIES) {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(value.to_string())
        }
    }

    fn matches(&self, artwork: &Artwork) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => artwork.category == *name,
        }
    }
}

/// Immutable catalog with identifier indexes
#[derive(Debug)]
pub struct Catalog {
    artworks: Vec<Artwork>,
    routes: Vec<Route>,
    artwork_index: HashMap<ArtworkId, usize>,
    route_index: HashMap<RouteId, usize>,
}

impl Catalog {
    /// Catalog built from the embedded museum collection
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_DATASET)
    }

    /// Load a JSON dataset file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading catalog from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        Self::from_dataset(dataset)
    }

    /// Validate and index a dataset
    ///
    /// Duplicate identifiers and out-of-range map coordinates are rejected.
    /// Dangling route references and missing translations are logged as
    /// data-integrity warnings and tolerated.
    pub fn from_dataset(dataset: Dataset) -> Result<Self> {
        let mut artwork_index = HashMap::with_capacity(dataset.artworks.len());
        for (pos, artwork) in dataset.artworks.iter().enumerate() {
            if artwork_index.insert(artwork.id.clone(), pos).is_some() {
                return Err(Error::Catalog(format!(
                    "duplicate artwork id '{}'",
                    artwork.id
                )));
            }
            let loc = &artwork.location;
            if !(0.0..=100.0).contains(&loc.x) || !(0.0..=100.0).contains(&loc.y) {
                return Err(Error::Catalog(format!(
                    "artwork '{}' placed outside the floor plan ({}, {})",
                    artwork.id, loc.x, loc.y
                )));
            }
            if artwork.translations.is_empty() {
                return Err(Error::Catalog(format!(
                    "artwork '{}' has no translations",
                    artwork.id
                )));
            }
            for language in artwork.translations.missing() {
                warn!(
                    artwork_id = %artwork.id,
                    language = %language,
                    "Artwork missing translation, default language will be used"
                );
            }
        }

        let mut route_index = HashMap::with_capacity(dataset.routes.len());
        for (pos, route) in dataset.routes.iter().enumerate() {
            if route_index.insert(route.id.clone(), pos).is_some() {
                return Err(Error::Catalog(format!("duplicate route id '{}'", route.id)));
            }
            if route.translations.is_empty() {
                return Err(Error::Catalog(format!(
                    "route '{}' has no translations",
                    route.id
                )));
            }
            for language in route.translations.missing() {
                warn!(
                    route_id = %route.id,
                    language = %language,
                    "Route missing translation, default language will be used"
                );
            }
            for artwork_id in &route.artworks {
                if !artwork_index.contains_key(artwork_id) {
                    warn!(
                        route_id = %route.id,
                        artwork_id = %artwork_id,
                        "Route references unknown artwork"
                    );
                }
            }
        }

        info!(
            artworks = dataset.artworks.len(),
            routes = dataset.routes.len(),
            "Catalog loaded"
        );

        Ok(Self {
            artworks: dataset.artworks,
            routes: dataset.routes,
            artwork_index,
            route_index,
        })
    }

    pub fn find_artwork(&self, id: &ArtworkId) -> Option<&Artwork> {
        self.artwork_index.get(id).map(|&pos| &self.artworks[pos])
    }

    pub fn find_route(&self, id: &RouteId) -> Option<&Route> {
        self.route_index.get(id).map(|&pos| &self.routes[pos])
    }

    /// Lookup by raw identifier text
    pub fn artwork_by_str(&self, id: &str) -> Option<&Artwork> {
        self.find_artwork(&ArtworkId::new(id))
    }

    pub fn artworks(&self) -> &[Artwork] {
        &self.artworks
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Artworks in the selected category, insertion order
    pub fn artworks_by_category(&self, filter: &CategoryFilter) -> Vec<&Artwork> {
        self.artworks.iter().filter(|a| filter.matches(a)).collect()
    }

    /// Artworks of a route in the route's order
    ///
    /// Unresolved identifiers are skipped with a warning.
    pub fn artworks_for_route(&self, route: &Route) -> Vec<&Artwork> {
        route
            .artworks
            .iter()
            .filter_map(|id| {
                let found = self.find_artwork(id);
                if found.is_none() {
                    warn!(
                        route_id = %route.id,
                        artwork_id = %id,
                        "Skipping unresolved artwork in route"
                    );
                }
                found
            })
            .collect()
    }

    /// Distinct artwork identifiers of a route that resolve in the catalog
    ///
    /// Progress is measured over exactly these, so it matches the artworks
    /// listed by [`Catalog::artworks_for_route`].
    pub fn route_members(&self, route: &Route) -> Vec<ArtworkId> {
        route
            .distinct_artworks()
            .into_iter()
            .filter(|id| self.artwork_index.contains_key(id))
            .collect()
    }

    /// Artworks placed on `floor`, insertion order
    pub fn artworks_on_floor(&self, floor: &str) -> Vec<&Artwork> {
        self.artworks
            .iter()
            .filter(|a| a.location.floor == floor)
            .collect()
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        distinct(self.artworks.iter().map(|a| a.category.as_str()))
    }

    /// Distinct floors in first-seen order
    pub fn floors(&self) -> Vec<&str> {
        distinct(self.artworks.iter().map(|a| a.location.floor.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artwork(id: &str, category: &str, floor: &str) -> Artwork {
        Artwork {
            id: ArtworkId::new(id),
            image: format!("/assets/{}.jpg", id),
            category: category.to_string(),
            period: "XXe siècle".to_string(),
            has_audio: false,
            has_ar: false,
            location: Location {
                floor: floor.to_string(),
                room: "Salle 1".to_string(),
                x: 10.0,
                y: 10.0,
            },
            translations: Localized::new().with(
                Language::Fr,
                ArtworkText {
                    title: format!("Oeuvre {}", id),
                    description: String::new(),
                    history: String::new(),
                },
            ),
        }
    }

    fn route(id: &str, artworks: &[&str]) -> Route {
        Route {
            id: RouteId::new(id),
            translations: Localized::new().with(
                Language::Fr,
                RouteText {
                    title: format!("Parcours {}", id),
                    description: String::new(),
                },
            ),
            artworks: artworks.iter().map(|a| ArtworkId::new(*a)).collect(),
        }
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.artworks().len(), 3);
        assert_eq!(catalog.routes().len(), 2);
        assert!(catalog.artwork_by_str("1").is_some());
        assert!(catalog.find_route(&RouteId::new("2")).is_some());
        for artwork in catalog.artworks() {
            assert!(artwork.translations.missing().is_empty());
        }
    }

    #[test]
    fn test_find_unknown_ids() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.artwork_by_str("99").is_none());
        assert!(catalog.find_route(&RouteId::new("99")).is_none());
    }

    #[test]
    fn test_category_filter_all_returns_everything_in_order() {
        let catalog = Catalog::from_dataset(Dataset {
            artworks: vec![
                artwork("a", "Textile", "1"),
                artwork("b", "Armes", "1"),
                artwork("c", "Textile", "2"),
            ],
            routes: vec![],
        })
        .unwrap();

        let all: Vec<_> = catalog
            .artworks_by_category(&CategoryFilter::parse("ALL"))
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(all, vec!["a", "b", "c"]);

        let textile: Vec<_> = catalog
            .artworks_by_category(&CategoryFilter::parse("Textile"))
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(textile, vec!["a", "c"]);

        assert!(catalog
            .artworks_by_category(&CategoryFilter::parse("Peinture"))
            .is_empty());
    }

    #[test]
    fn test_route_artworks_keep_route_order_and_skip_dangling() {
        let catalog = Catalog::from_dataset(Dataset {
            artworks: vec![artwork("a", "X", "1"), artwork("b", "X", "1")],
            routes: vec![route("r", &["b", "ghost", "a"])],
        })
        .unwrap();

        let r = catalog.find_route(&RouteId::new("r")).unwrap();
        let ids: Vec<_> = catalog
            .artworks_for_route(r)
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_route_members_match_listed_artworks() {
        let catalog = Catalog::from_dataset(Dataset {
            artworks: vec![artwork("a", "X", "1"), artwork("b", "X", "1")],
            routes: vec![route("r", &["a", "ghost", "b", "a"])],
        })
        .unwrap();

        let r = catalog.find_route(&RouteId::new("r")).unwrap();
        assert_eq!(
            catalog.route_members(r),
            vec![ArtworkId::new("a"), ArtworkId::new("b")]
        );
    }

    #[test]
    fn test_duplicate_artwork_rejected() {
        let result = Catalog::from_dataset(Dataset {
            artworks: vec![artwork("a", "X", "1"), artwork("a", "Y", "2")],
            routes: vec![],
        });
        assert!(matches!(result, Err(Error::Catalog(_))));
    }

    #[test]
    fn test_out_of_plan_coordinates_rejected() {
        let mut misplaced = artwork("a", "X", "1");
        misplaced.location.x = 140.0;
        let result = Catalog::from_dataset(Dataset {
            artworks: vec![misplaced],
            routes: vec![],
        });
        assert!(matches!(result, Err(Error::Catalog(_))));
    }

    #[test]
    fn test_floors_and_categories_distinct_first_seen() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.floors(), vec!["1", "2"]);
        assert_eq!(
            catalog.categories(),
            vec!["Textile / Mode", "Archéologie", "Armes / Histoire"]
        );
        let floor_one: Vec<_> = catalog
            .artworks_on_floor("1")
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(floor_one, vec!["1", "2"]);
    }

    #[test]
    fn test_distinct_artworks_drops_repeats() {
        let r = route("r", &["a", "b", "a"]);
        assert_eq!(
            r.distinct_artworks(),
            vec![ArtworkId::new("a"), ArtworkId::new("b")]
        );
    }
}
