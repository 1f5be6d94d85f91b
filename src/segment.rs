//! Segment annotation: turning a resolved point list into drawable segments
//! classified by how the renderer should treat them.

use std::collections::HashSet;

use crate::resolve::ResolvedPoint;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SegmentKind {
    /// Both endpoints sit inside a `>...<` span.
    Mandatory,
    /// Ordinary routing, drawn de-emphasized.
    Advisory,
    /// Fan line from one of several boundary airports to the route's first
    /// or last fix.
    FacilityConnector,
}

impl SegmentKind {
    fn rank(self) -> u8 {
        match self {
            SegmentKind::Mandatory => 0,
            SegmentKind::Advisory => 1,
            SegmentKind::FacilityConnector => 2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Segment {
    pub a: ResolvedPoint,
    pub b: ResolvedPoint,
    pub kind: SegmentKind,
}

impl Segment {
    /// Canonical key: endpoint order does not distinguish segments, so the
    /// label keys are sorted before joining.
    pub fn dedup_key(&self) -> String {
        let ka = self.a.label_key();
        let kb = self.b.label_key();
        let (lo, hi) = if ka <= kb { (ka, kb) } else { (kb, ka) };
        format!("{}|{}|{}", lo, hi, self.kind.rank())
    }
}

/// Annotates a resolved route. Consecutive points chain into Mandatory or
/// Advisory segments; a run of two or more airports at either end of the
/// route instead fans each airport to the nearest interior point as
/// FacilityConnector segments (a single boundary airport chains normally).
/// Duplicate segments within the route are dropped.
pub fn annotate(points: &[ResolvedPoint]) -> Vec<Segment> {
    let mut segments = Vec::new();
    if points.len() < 2 {
        return segments;
    }

    let len = points.len();
    let lead = points.iter().take_while(|p| p.is_airport).count();
    let trail = points.iter().rev().take_while(|p| p.is_airport).count();

    // A route that is all airports (every pairing would be a fan) chains
    // normally instead
    let fan_lead = lead > 1 && lead < len;
    let fan_trail = trail > 1 && trail < len && lead + trail <= len;

    let chain_start = if fan_lead { lead } else { 0 };
    let chain_end = if fan_trail { len - trail } else { len };

    if fan_lead {
        let anchor = &points[lead];
        for apt in &points[..lead] {
            segments.push(Segment {
                a: apt.clone(),
                b: anchor.clone(),
                kind: SegmentKind::FacilityConnector,
            });
        }
    }

    for pair in points[chain_start..chain_end].windows(2) {
        let kind = if pair[0].mandatory && pair[1].mandatory {
            SegmentKind::Mandatory
        } else {
            SegmentKind::Advisory
        };
        segments.push(Segment {
            a: pair[0].clone(),
            b: pair[1].clone(),
            kind,
        });
    }

    if fan_trail {
        let anchor = &points[len - trail - 1];
        for apt in &points[len - trail..] {
            segments.push(Segment {
                a: anchor.clone(),
                b: apt.clone(),
                kind: SegmentKind::FacilityConnector,
            });
        }
    }

    let mut seen = HashSet::new();
    segments.retain(|s| seen.insert(s.dedup_key()));
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLon;

    fn pt(id: &str, lat: f64, lon: f64, mandatory: bool, is_airport: bool) -> ResolvedPoint {
        ResolvedPoint {
            id: id.to_string(),
            latlon: LatLon::new(lat, lon),
            mandatory,
            source_index: 0,
            is_airport,
        }
    }

    fn kinds(segments: &[Segment]) -> Vec<SegmentKind> {
        segments.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn chains_with_mandatory_span() {
        // ">KJFK MERIT< WAVEY KBOS"
        let points = vec![
            pt("KJFK", 40.64, -73.78, true, true),
            pt("MERIT", 41.38, -72.95, true, false),
            pt("WAVEY", 40.3, -73.5, false, false),
            pt("KBOS", 42.36, -71.01, false, true),
        ];
        let segs = annotate(&points);
        assert_eq!(segs.len(), 3);
        assert_eq!(
            kinds(&segs),
            vec![
                SegmentKind::Mandatory,
                SegmentKind::Advisory,
                SegmentKind::Advisory,
            ]
        );
        assert_eq!(segs[0].a.id, "KJFK");
        assert_eq!(segs[0].b.id, "MERIT");
    }

    #[test]
    fn single_boundary_airport_chains_normally() {
        let points = vec![
            pt("KJFK", 40.64, -73.78, false, true),
            pt("MERIT", 41.38, -72.95, false, false),
        ];
        let segs = annotate(&points);
        assert_eq!(kinds(&segs), vec![SegmentKind::Advisory]);
    }

    #[test]
    fn leading_airport_run_fans_to_first_fix() {
        let points = vec![
            pt("KJFK", 40.64, -73.78, false, true),
            pt("KLGA", 40.78, -73.87, false, true),
            pt("KEWR", 40.69, -74.17, false, true),
            pt("MERIT", 41.38, -72.95, false, false),
            pt("WAVEY", 40.3, -73.5, false, false),
        ];
        let segs = annotate(&points);
        // Three fan lines to MERIT, then one chained segment
        assert_eq!(
            kinds(&segs),
            vec![
                SegmentKind::FacilityConnector,
                SegmentKind::FacilityConnector,
                SegmentKind::FacilityConnector,
                SegmentKind::Advisory,
            ]
        );
        assert!(segs[..3].iter().all(|s| s.b.id == "MERIT"));
        assert_eq!(segs[3].a.id, "MERIT");
        assert_eq!(segs[3].b.id, "WAVEY");
    }

    #[test]
    fn trailing_airport_run_fans_from_last_fix() {
        let points = vec![
            pt("MERIT", 41.38, -72.95, false, false),
            pt("WAVEY", 40.3, -73.5, false, false),
            pt("KJFK", 40.64, -73.78, false, true),
            pt("KLGA", 40.78, -73.87, false, true),
        ];
        let segs = annotate(&points);
        assert_eq!(
            kinds(&segs),
            vec![
                SegmentKind::Advisory,
                SegmentKind::FacilityConnector,
                SegmentKind::FacilityConnector,
            ]
        );
        assert!(segs[1..].iter().all(|s| s.a.id == "WAVEY"));
    }

    #[test]
    fn all_airports_chain_without_fans() {
        let points = vec![
            pt("KJFK", 40.64, -73.78, false, true),
            pt("KBOS", 42.36, -71.01, false, true),
        ];
        let segs = annotate(&points);
        assert_eq!(kinds(&segs), vec![SegmentKind::Advisory]);
    }

    #[test]
    fn duplicate_segments_dropped() {
        let points = vec![
            pt("A", 40.0, -74.0, false, false),
            pt("B", 41.0, -73.0, false, false),
            pt("A", 40.0, -74.0, false, false),
            pt("B", 41.0, -73.0, false, false),
        ];
        let segs = annotate(&points);
        // A-B, B-A (same pair reversed), A-B again: one survives
        assert_eq!(segs.len(), 1);
    }

    #[test]
    fn dedup_key_is_order_insensitive() {
        let a = pt("A", 40.0, -74.0, false, false);
        let b = pt("B", 41.0, -73.0, false, false);
        let s1 = Segment {
            a: a.clone(),
            b: b.clone(),
            kind: SegmentKind::Advisory,
        };
        let s2 = Segment {
            a: b,
            b: a,
            kind: SegmentKind::Advisory,
        };
        assert_eq!(s1.dedup_key(), s2.dedup_key());
    }
}
