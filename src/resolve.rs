//! Point resolution: turning a name into a position using geographic
//! context to break ties between same-named fixes.
//!
//! The disambiguation heuristic (nearest candidate to the inferred
//! neighborhood, Manhattan degrees) and the haversine plausibility gate are
//! preserved exactly as filed routes depend on their tie-breaking.

use crate::coord;
use crate::geo::LatLon;
use crate::nav::{NamedPoint, NavData};

/// Hard ceiling on the distance between consecutive route points. With both
/// neighbors known the ceiling tightens to 1.5x their separation.
pub const MAX_REASONABLE_KM: f64 = 4000.0;

#[derive(Clone, Debug)]
pub struct ResolvedPoint {
    pub id: String,
    pub latlon: LatLon,
    pub mandatory: bool,
    pub source_index: usize,
    pub is_airport: bool,
}

impl ResolvedPoint {
    /// Stable identity key (name + coordinates) the renderer uses to toggle
    /// and label points independently of routes.
    pub fn label_key(&self) -> String {
        format!(
            "{}/{:.6},{:.6}",
            self.id,
            self.latlon.lat(),
            self.latlon.lon()
        )
    }
}

/// Resolves a name against the reference tables, preferring facility
/// centerpoints (`ZZ_NAME`) over same-named raw fixes, then coordinate
/// literals, then facility area centroids. Returns None when nothing
/// matches or the match fails the plausibility check.
pub fn resolve_name(
    nav: &NavData,
    name: &str,
    prev: Option<&NamedPoint>,
    next: Option<&NamedPoint>,
) -> Option<NamedPoint> {
    if name.is_empty() {
        return None;
    }

    if let Some(key) = lookup_key(nav, name) {
        let candidates = nav.points.candidates(&key)?;
        let chosen = pick_candidate(candidates, prev, next);
        return confirmed(chosen.clone(), prev, next);
    }

    if let Some(latlon) = coord::parse_coordinate(name) {
        return confirmed(
            NamedPoint {
                id: name.to_string(),
                latlon,
            },
            prev,
            next,
        );
    }

    if let Some(center) = nav.areas.get(name) {
        return confirmed(
            NamedPoint {
                id: name.to_string(),
                latlon: center,
            },
            prev,
            next,
        );
    }

    None
}

/// How many distinct positions a name could resolve to; used to decide
/// whether a look-ahead neighbor hint is trustworthy.
pub fn candidate_count(nav: &NavData, name: &str) -> usize {
    if let Some(key) = lookup_key(nav, name) {
        return nav.points.candidates(&key).map(|c| c.len()).unwrap_or(0);
    }
    if coord::parse_coordinate(name).is_some() || nav.areas.contains(name) {
        return 1;
    }
    0
}

// Key selection mirrors the facility preference: a known facility code
// resolves through its ZZ_ centerpoint when one exists, through a raw
// same-named fix otherwise.
fn lookup_key(nav: &NavData, name: &str) -> Option<String> {
    if name.starts_with("ZZ_") {
        if nav.points.contains(name) {
            return Some(name.to_string());
        }
        return None;
    }

    if nav.points.is_facility(name) {
        let zz = format!("ZZ_{}", name);
        if nav.points.contains(&zz) {
            return Some(zz);
        }
        if nav.points.contains(name) {
            return Some(name.to_string());
        }
        return None;
    }

    if nav.points.contains(name) {
        return Some(name.to_string());
    }
    None
}

// Nearest candidate to the reference position: previous point, midpoint of
// previous and next when both are known, next alone, or (documented policy)
// the first candidate in the table's deterministic order when neither
// neighbor is known.
fn pick_candidate<'a>(
    candidates: &'a [NamedPoint],
    prev: Option<&NamedPoint>,
    next: Option<&NamedPoint>,
) -> &'a NamedPoint {
    if candidates.len() == 1 {
        return &candidates[0];
    }

    let center = match (prev, next) {
        (Some(p), Some(n)) => p.latlon.midpoint_with(n.latlon),
        (Some(p), None) => p.latlon,
        (None, Some(n)) => n.latlon,
        (None, None) => return &candidates[0],
    };

    let mut best = &candidates[0];
    let mut best_err = best.latlon.degree_error_to(center);
    for c in &candidates[1..] {
        let err = c.latlon.degree_error_to(center);
        if err < best_err {
            best = c;
            best_err = err;
        }
    }
    best
}

fn confirmed(
    point: NamedPoint,
    prev: Option<&NamedPoint>,
    next: Option<&NamedPoint>,
) -> Option<NamedPoint> {
    let mut max_km = MAX_REASONABLE_KM;
    if let (Some(p), Some(n)) = (prev, next) {
        max_km = max_km.min(p.latlon.distance_km(n.latlon) * 1.5);
    }

    if let Some(p) = prev {
        if point.latlon.distance_km(p.latlon) > max_km {
            return None;
        }
    }
    if let Some(n) = next {
        if point.latlon.distance_km(n.latlon) > max_km {
            return None;
        }
    }

    Some(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: &str, lat: f64, lon: f64) -> NamedPoint {
        NamedPoint {
            id: id.to_string(),
            latlon: LatLon::new(lat, lon),
        }
    }

    fn nav_with_dup() -> NavData {
        let mut nav = NavData::default();
        // Same-named fix on both coasts
        nav.points.insert("DUPED", LatLon::new(40.0, -74.0));
        nav.points.insert("DUPED", LatLon::new(37.0, -122.0));
        nav.points.insert("KJFK", LatLon::new(40.6413, -73.7781));
        nav.points.insert("KBOS", LatLon::new(42.3656, -71.0096));
        nav.points.insert("ZZ_ZBW", LatLon::new(42.7, -71.5));
        nav.points.insert("ZBW", LatLon::new(10.0, 10.0)); // decoy raw fix
        nav.points.finish_load();
        nav
    }

    #[test]
    fn single_candidate_resolves_directly() {
        let nav = nav_with_dup();
        let p = resolve_name(&nav, "KJFK", None, None).unwrap();
        assert_eq!(p.id, "KJFK");
    }

    #[test]
    fn ambiguous_name_uses_neighbor_midpoint() {
        let nav = nav_with_dup();
        let jfk = named("KJFK", 40.6413, -73.7781);
        let bos = named("KBOS", 42.3656, -71.0096);
        let p = resolve_name(&nav, "DUPED", Some(&jfk), Some(&bos)).unwrap();
        assert_eq!(p.latlon.lon(), -74.0);

        // Neighbors far enough apart that the 1.5x corridor covers the
        // candidate sitting between them
        let sfo = named("KSFO", 37.6, -122.4);
        let mry = named("KMRY", 36.59, -121.84);
        let p = resolve_name(&nav, "DUPED", Some(&sfo), Some(&mry)).unwrap();
        assert_eq!(p.latlon.lon(), -122.0);
    }

    #[test]
    fn plausibility_rejects_far_candidates() {
        let nav = nav_with_dup();
        let jfk = named("KJFK", 40.6413, -73.7781);
        let bos = named("KBOS", 42.3656, -71.0096);
        // The East Coast candidate sits inside the JFK-BOS corridor limit
        // (1.5 x ~300 km) and passes
        assert!(resolve_name(&nav, "DUPED", Some(&jfk), Some(&bos)).is_some());

        // A tight corridor far from every candidate rejects outright
        let a = named("A", 60.0, 10.0);
        let b = named("B", 60.5, 10.5);
        assert!(resolve_name(&nav, "DUPED", Some(&a), Some(&b)).is_none());

        // With one distant neighbor only, the 4000 km ceiling governs
        let far = named("FAR", -45.0, 100.0);
        assert!(resolve_name(&nav, "DUPED", Some(&far), None).is_none());
    }

    #[test]
    fn no_neighbors_picks_deterministic_first() {
        let nav = nav_with_dup();
        let p = resolve_name(&nav, "DUPED", None, None).unwrap();
        // Candidates sorted by (lat, lon): the 37.0 / -122.0 entry is first
        assert_eq!(p.latlon.lat(), 37.0);
    }

    #[test]
    fn facility_prefers_centerpoint_over_raw_fix() {
        let nav = nav_with_dup();
        let p = resolve_name(&nav, "ZBW", None, None).unwrap();
        assert_eq!(p.id, "ZZ_ZBW");
        assert_eq!(p.latlon.lat(), 42.7);
    }

    #[test]
    fn facility_falls_back_to_area_centroid() {
        let mut nav = NavData::default();
        nav.areas.insert("A80", LatLon::new(33.6, -84.4));
        let p = resolve_name(&nav, "A80", None, None).unwrap();
        assert_eq!(p.id, "A80");
        assert_eq!(p.latlon.lon(), -84.4);
    }

    #[test]
    fn coordinate_literal_fallback() {
        let nav = NavData::default();
        let p = resolve_name(&nav, "5275N", None, None).unwrap();
        assert_eq!(p.latlon.lon(), -75.0);
        assert_eq!(p.id, "5275N");
    }

    #[test]
    fn candidate_counts() {
        let nav = nav_with_dup();
        assert_eq!(candidate_count(&nav, "DUPED"), 2);
        assert_eq!(candidate_count(&nav, "KJFK"), 1);
        assert_eq!(candidate_count(&nav, "5275N"), 1);
        assert_eq!(candidate_count(&nav, "NOPE!"), 0);
    }
}
