//! Reference Data Store: read-only lookup tables loaded once at startup.
//!
//! Datasets are flat delimited files. A missing file leaves its table empty
//! and a malformed row is skipped; lookups against an empty table simply
//! never hit. Nothing here mutates after load.

use std::collections::{HashMap, HashSet};

use crate::csv_data::{field, CsvFile};
use crate::geo::LatLon;

#[derive(Clone, Debug, PartialEq)]
pub struct NamedPoint {
    pub id: String,
    pub latlon: LatLon,
}

/// Named fixes, navaids, airports and `ZZ_*` facility centerpoints.
/// Multiple entries may share one id (ambiguous fixes).
#[derive(Debug, Default)]
pub struct PointTable {
    points: HashMap<String, Vec<NamedPoint>>,
    facility_codes: HashSet<String>,
}

impl PointTable {
    pub fn from_text(text: &str) -> PointTable {
        let mut table = PointTable::default();
        let data = CsvFile::from_text(text);

        for row in data.raw_rows() {
            if row.len() < 3 {
                continue;
            }
            let id = field(row, 0).to_uppercase();
            if id.is_empty() {
                continue;
            }
            let latlon = match LatLon::from_decimal_fields(field(row, 1), field(row, 2)) {
                Some(p) => p,
                None => continue,
            };
            table.insert(&id, latlon);
        }

        table.finish_load();
        table
    }

    pub fn insert(&mut self, id: &str, latlon: LatLon) {
        let id = id.to_uppercase();
        // A ZZ_* entry also declares the underlying facility code,
        // e.g. ZZ_ZMP -> facility "ZMP"
        if id.starts_with("ZZ_") && id.len() > 3 {
            self.facility_codes.insert(id[3..].to_string());
        }
        self.points
            .entry(id.clone())
            .or_insert_with(Vec::new)
            .push(NamedPoint { id, latlon });
    }

    /// Candidate lists are kept in a deterministic order (by lat, lon, id)
    /// so that "first candidate" does not depend on file row order.
    pub fn finish_load(&mut self) {
        for list in self.points.values_mut() {
            list.sort_by(|a, b| {
                a.latlon
                    .lat()
                    .partial_cmp(&b.latlon.lat())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(
                        a.latlon
                            .lon()
                            .partial_cmp(&b.latlon.lon())
                            .unwrap_or(std::cmp::Ordering::Equal),
                    )
                    .then(a.id.cmp(&b.id))
            });
        }
    }

    pub fn candidates(&self, id: &str) -> Option<&[NamedPoint]> {
        self.points.get(id).map(|v| v.as_slice())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.points.contains_key(id)
    }

    pub fn is_facility(&self, code: &str) -> bool {
        self.facility_codes.contains(code)
    }
}

/// TRACON / ARTCC centroids, the last-ditch fallback for facility tokens
/// with no centerpoint fix.
#[derive(Debug, Default)]
pub struct AreaCenters {
    centers: HashMap<String, LatLon>,
}

impl AreaCenters {
    pub fn from_text(text: &str) -> AreaCenters {
        let mut centers = HashMap::new();
        let data = CsvFile::from_text(text);
        for row in data.raw_rows() {
            if row.len() < 3 {
                continue;
            }
            let code = field(row, 0).to_uppercase();
            if code.is_empty() {
                continue;
            }
            if let Some(p) = LatLon::from_decimal_fields(field(row, 1), field(row, 2)) {
                centers.entry(code).or_insert(p);
            }
        }
        AreaCenters { centers }
    }

    pub fn insert(&mut self, code: &str, latlon: LatLon) {
        self.centers.entry(code.to_uppercase()).or_insert(latlon);
    }

    pub fn get(&self, code: &str) -> Option<LatLon> {
        self.centers.get(code).cloned()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.centers.contains_key(code)
    }
}

/// Airways: id -> ordered fix names. Rows with fewer than 2 fixes are
/// dropped at load.
#[derive(Debug, Default)]
pub struct AirwayTable {
    airways: HashMap<String, Vec<String>>,
}

impl AirwayTable {
    pub fn from_text(text: &str) -> AirwayTable {
        let mut airways = HashMap::new();
        let data = CsvFile::from_text(text);
        for row in data.raw_rows() {
            if row.len() < 2 {
                continue;
            }
            let id = field(row, 0).to_uppercase();
            let fixes: Vec<String> = field(row, 1)
                .split_whitespace()
                .map(|f| f.to_uppercase())
                .collect();
            if id.is_empty() || fixes.len() < 2 {
                continue;
            }
            airways.entry(id).or_insert(fixes);
        }
        AirwayTable { airways }
    }

    pub fn insert(&mut self, id: &str, fixes: &[&str]) {
        self.airways.insert(
            id.to_uppercase(),
            fixes.iter().map(|f| f.to_uppercase()).collect(),
        );
    }

    pub fn fixes(&self, id: &str) -> Option<&[String]> {
        self.airways.get(id).map(|v| v.as_slice())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.airways.contains_key(id)
    }
}

/// Coded departure routes: one opaque code per full route string.
/// The file is line-based, `CODE,route text`, split on the first comma only.
#[derive(Debug, Default)]
pub struct CdrTable {
    routes: HashMap<String, String>,
}

impl CdrTable {
    pub fn from_text(text: &str) -> CdrTable {
        let mut routes = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let idx = match line.find(',') {
                Some(i) if i > 0 => i,
                _ => continue,
            };
            let code = line[..idx].trim().to_uppercase();
            let route = line[idx + 1..].trim().to_string();
            if !code.is_empty() && !route.is_empty() {
                routes.insert(code, route);
            }
        }
        CdrTable { routes }
    }

    pub fn insert(&mut self, code: &str, route: &str) {
        self.routes.insert(code.to_uppercase(), route.to_string());
    }

    pub fn route(&self, code: &str) -> Option<&str> {
        self.routes.get(code).map(|s| s.as_str())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.routes.contains_key(code)
    }
}

#[derive(Builder, Clone, Debug)]
#[builder(private)]
pub struct ProcedureBase {
    pub code: String,
    pub name: String,
    pub served_airports: Vec<String>,
    pub eff_date: u64,
}

#[derive(Clone, Debug)]
pub struct ProcedureRouteRow {
    pub point: String,
    pub point_seq: i64,
    pub arpt_rwy_assoc: String,
}

/// Departure procedures: base records plus BODY / TRANSITION point rows.
///
/// Besides the exact computer-code index there are three fallback indexes
/// (left code, root letters, `ROOT#.FIX` wildcard pattern), each keeping the
/// record with the latest effective date, so that filed tokens with stale
/// version numbers or a `#` placeholder still match something current.
#[derive(Debug, Default)]
pub struct ProcedureTable {
    procs: Vec<ProcedureBase>,
    by_code: HashMap<String, usize>,
    by_left: HashMap<String, usize>,
    by_root: HashMap<String, usize>,
    by_pattern: HashMap<String, usize>,
    bodies: HashMap<String, Vec<ProcedureRouteRow>>,
    transitions: HashMap<String, Vec<ProcedureRouteRow>>,
}

impl ProcedureTable {
    pub fn from_texts(base_text: &str, route_text: &str) -> ProcedureTable {
        let mut table = ProcedureTable::default();
        table.load_base(base_text);
        table.load_routes(route_text);
        table
    }

    fn load_base(&mut self, text: &str) {
        let data = CsvFile::from_text(text);
        let idx_code = data.header_index(&["DP_COMPUTER_CODE"]);
        let idx_served = data.header_index(&["SERVED_ARPT"]);
        let (idx_code, idx_served) = match (idx_code, idx_served) {
            (Some(c), Some(s)) => (c, s),
            _ => return,
        };
        let idx_eff = data.header_index(&["EFF_DATE"]);
        let idx_name = data.header_index(&["DP_NAME"]);

        for row in data.records() {
            let code = field(row, idx_code).to_uppercase();
            if code.is_empty() {
                continue;
            }

            let served: Vec<String> = field(row, idx_served)
                .to_uppercase()
                .split_whitespace()
                .map(|s| s.to_string())
                .collect();

            let rec = ProcedureBaseBuilder::default()
                .code(code)
                .name(idx_name.map(|i| field(row, i).to_uppercase()).unwrap_or_default())
                .served_airports(served)
                .eff_date(idx_eff.map(|i| parse_eff_date(field(row, i))).unwrap_or(0))
                .build();
            let rec = match rec {
                Ok(r) => r,
                Err(_) => continue,
            };

            self.index_base(rec);
        }
    }

    fn index_base(&mut self, rec: ProcedureBase) {
        let idx = self.procs.len();
        let eff = rec.eff_date;
        let code = rec.code.clone();

        self.by_code.insert(code.clone(), idx);

        let mut parts = code.splitn(2, '.');
        let left = parts.next().unwrap_or("").to_string();
        if parts.next().is_some() && !left.is_empty() {
            newest_slot(&mut self.by_left, &self.procs, left.clone(), idx, eff);
            let root = root_letters(&left);
            if !root.is_empty() {
                newest_slot(&mut self.by_root, &self.procs, root, idx, eff);
            }
        }

        if let Some(pattern) = wildcard_pattern(&code) {
            newest_slot(&mut self.by_pattern, &self.procs, pattern, idx, eff);
        }

        self.procs.push(rec);
    }

    fn load_routes(&mut self, text: &str) {
        let data = CsvFile::from_text(text);
        let idx_code = data.header_index(&["DP_COMPUTER_CODE"]);
        let idx_type = data.header_index(&["ROUTE_PORTION_TYPE"]);
        let idx_seq = data.header_index(&["POINT_SEQ"]);
        let idx_point = data.header_index(&["POINT"]);
        let (idx_code, idx_type, idx_seq, idx_point) =
            match (idx_code, idx_type, idx_seq, idx_point) {
                (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
                _ => return,
            };
        let idx_assoc = data.header_index(&["ARPT_RWY_ASSOC"]);

        for row in data.records() {
            let code = field(row, idx_code).to_uppercase();
            let portion = field(row, idx_type).to_uppercase();
            let point = field(row, idx_point).to_uppercase();
            if code.is_empty() || portion.is_empty() || point.is_empty() {
                continue;
            }
            // Body rows must belong to a procedure known from the base
            // table; transition rows are keyed by their own transition
            // computer code, which the base table does not list.
            if portion == "BODY" && !self.by_code.contains_key(&code) {
                continue;
            }
            let seq: i64 = match field(row, idx_seq).parse() {
                Ok(n) => n,
                Err(_) => continue,
            };
            let assoc = idx_assoc
                .map(|i| field(row, i).to_uppercase())
                .unwrap_or_default();

            let row = ProcedureRouteRow {
                point,
                point_seq: seq,
                arpt_rwy_assoc: assoc,
            };

            match portion.as_str() {
                "BODY" => self.bodies.entry(code).or_insert_with(Vec::new).push(row),
                "TRANSITION" => self
                    .transitions
                    .entry(code)
                    .or_insert_with(Vec::new)
                    .push(row),
                _ => {}
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    /// Prioritized lookup for a filed procedure token. Every strategy is
    /// gated on the route origin being one of the record's served airports.
    ///
    /// Order: exact computer code; `ROOT#.FIX` wildcard pattern; root
    /// letters of the left part; bare left code; digit-stripped root for
    /// legacy version numbers; `#`-stripped root.
    pub fn find(&self, token: &str, origin: &str) -> Option<&ProcedureBase> {
        if let Some(&i) = self.by_code.get(token) {
            if origin_matches_served(origin, &self.procs[i].served_airports) {
                return Some(&self.procs[i]);
            }
        }

        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() == 2 {
            let root = root_letters(parts[0]);
            if !root.is_empty() {
                let pattern = format!("{}#.{}", root, parts[1]);
                if let Some(&i) = self.by_pattern.get(&pattern) {
                    if origin_matches_served(origin, &self.procs[i].served_airports) {
                        return Some(&self.procs[i]);
                    }
                }
                if let Some(&i) = self.by_root.get(&root) {
                    if origin_matches_served(origin, &self.procs[i].served_airports) {
                        return Some(&self.procs[i]);
                    }
                }
            }
        }

        if let Some(&i) = self.by_left.get(token) {
            if origin_matches_served(origin, &self.procs[i].served_airports) {
                return Some(&self.procs[i]);
            }
        }

        if token.chars().any(|c| c.is_ascii_digit()) || token.contains('#') {
            let root = root_letters(token);
            if !root.is_empty() {
                if let Some(&i) = self.by_root.get(&root) {
                    if origin_matches_served(origin, &self.procs[i].served_airports) {
                        return Some(&self.procs[i]);
                    }
                }
            }
        }

        None
    }

    /// BODY point sequence for a computer code, preferring rows associated
    /// with the filed origin, ordered by sequence number, de-duplicated, and
    /// oriented so the code's root fix lands at the end.
    pub fn body_sequence(&self, code: &str, origin: &str) -> Option<Vec<String>> {
        let rows = self.bodies.get(code)?;
        let seq = ordered_points(rows, origin)?;

        let mut parts = code.split('.');
        let left = parts.next().unwrap_or("");
        let root_fix = parts.next().unwrap_or(left).to_uppercase();

        let forward = seq.clone();
        let mut reversed = seq;
        reversed.reverse();

        let idx_f = forward.iter().rposition(|p| *p == root_fix);
        let idx_r = reversed.iter().rposition(|p| *p == root_fix);
        let last = forward.len() - 1;

        if idx_f == Some(last) {
            Some(forward)
        } else if idx_r == Some(last) {
            Some(reversed)
        } else if idx_f.is_some() || idx_r.is_some() {
            let dist_f = idx_f.map(|i| last - i).unwrap_or(forward.len());
            let dist_r = idx_r.map(|i| last - i).unwrap_or(reversed.len());
            Some(if dist_r < dist_f { reversed } else { forward })
        } else {
            Some(forward)
        }
    }

    /// TRANSITION point sequence for a `LEFT.FIX` transition code, in stored
    /// order. The caller picks the direction against the body seam.
    pub fn transition_sequence(&self, trans_code: &str, origin: &str) -> Option<Vec<String>> {
        let rows = self.transitions.get(trans_code)?;
        ordered_points(rows, origin)
    }
}

// Origin-preferred, sequence-ordered, de-duplicated point list.
fn ordered_points(rows: &[ProcedureRouteRow], origin: &str) -> Option<Vec<String>> {
    let mut filtered: Vec<&ProcedureRouteRow> = rows
        .iter()
        .filter(|r| row_matches_origin(&r.arpt_rwy_assoc, origin))
        .collect();
    if filtered.is_empty() {
        filtered = rows.iter().collect();
    }
    if filtered.is_empty() {
        return None;
    }

    filtered.sort_by_key(|r| r.point_seq);

    let mut seen = HashSet::new();
    let seq: Vec<String> = filtered
        .into_iter()
        .filter(|r| seen.insert(r.point.clone()))
        .map(|r| r.point.clone())
        .collect();

    if seq.is_empty() {
        None
    } else {
        Some(seq)
    }
}

fn row_matches_origin(assoc: &str, origin: &str) -> bool {
    if assoc.is_empty() || origin.is_empty() {
        return false;
    }
    origin_candidates(origin)
        .iter()
        .any(|c| assoc.contains(&format!("{}/", c)))
}

/// The filed origin plus its K-prefix/strip variants (KMEM <-> MEM).
pub fn origin_candidates(origin: &str) -> Vec<String> {
    let mut out = vec![origin.to_string()];
    if origin.len() == 4 && origin.starts_with('K') {
        out.push(origin[1..].to_string());
    }
    if origin.len() == 3 {
        out.push(format!("K{}", origin));
    }
    out
}

pub fn origin_matches_served(origin: &str, served: &[String]) -> bool {
    if origin.is_empty() || served.is_empty() {
        return false;
    }
    origin_candidates(origin)
        .iter()
        .any(|c| served.iter().any(|s| s == c))
}

fn root_letters(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_ascii_digit() && *c != '#')
        .collect()
}

// SKORR5.RNGRR -> SKORR#.RNGRR
fn wildcard_pattern(code: &str) -> Option<String> {
    let mut parts = code.splitn(2, '.');
    let left = parts.next()?;
    let right = parts.next()?;
    let root = root_letters(left);
    if root.is_empty() {
        return None;
    }
    Some(format!("{}#.{}", root, right))
}

fn parse_eff_date(s: &str) -> u64 {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn newest_slot(
    index: &mut HashMap<String, usize>,
    procs: &[ProcedureBase],
    key: String,
    idx: usize,
    eff: u64,
) {
    match index.get(&key) {
        Some(&existing) if procs[existing].eff_date >= eff => {}
        _ => {
            index.insert(key, idx);
        }
    }
}

#[derive(Builder, Clone, Debug)]
#[builder(private)]
pub struct StarRoute {
    pub eff_date: u64,
    pub star_code: String,
    pub transition_code: String,
    pub dest_group: String,
    pub arrival_name: String,
    pub route_points: Vec<String>,
}

/// STARs, stored as full pre-joined body+transition point lists keyed by
/// both the transition computer code and the bare STAR code.
#[derive(Debug, Default)]
pub struct StarTable {
    routes: Vec<StarRoute>,
    by_transition: HashMap<String, Vec<usize>>,
    by_star: HashMap<String, Vec<usize>>,
}

impl StarTable {
    pub fn from_text(text: &str) -> StarTable {
        let mut table = StarTable::default();
        let data = CsvFile::from_text(text);

        let idx_star = data.header_index(&["STAR_COMPUTER_CODE"]);
        let idx_trans = data.header_index(&["TRANSITION_COMPUTER_CODE"]);
        let idx_group = data.header_index(&["DEST_GROUP"]);
        let idx_points = data.header_index(&["ROUTE_POINTS"]);
        let (idx_star, idx_trans, idx_group, idx_points) =
            match (idx_star, idx_trans, idx_group, idx_points) {
                (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
                _ => return table,
            };
        let idx_eff = data.header_index(&["EFF_DATE"]);
        let idx_name = data.header_index(&["ARRIVAL_NAME"]);

        for row in data.records() {
            let trans_code = field(row, idx_trans).to_uppercase();
            let points: Vec<String> = field(row, idx_points)
                .to_uppercase()
                .split_whitespace()
                .map(|s| s.to_string())
                .collect();
            if trans_code.is_empty() || points.is_empty() {
                continue;
            }

            let rec = StarRouteBuilder::default()
                .eff_date(idx_eff.map(|i| parse_eff_date(field(row, i))).unwrap_or(0))
                .star_code(field(row, idx_star).to_uppercase())
                .transition_code(trans_code)
                .dest_group(field(row, idx_group).to_uppercase())
                .arrival_name(idx_name.map(|i| field(row, i).to_uppercase()).unwrap_or_default())
                .route_points(points)
                .build();
            let rec = match rec {
                Ok(r) => r,
                Err(_) => continue,
            };

            table.push(rec);
        }

        table
    }

    pub fn push(&mut self, rec: StarRoute) {
        let idx = self.routes.len();
        if !rec.transition_code.is_empty() {
            self.by_transition
                .entry(rec.transition_code.clone())
                .or_insert_with(Vec::new)
                .push(idx);
        }
        if !rec.star_code.is_empty() {
            self.by_star
                .entry(rec.star_code.clone())
                .or_insert_with(Vec::new)
                .push(idx);
        }
        self.routes.push(rec);
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.by_transition.contains_key(token) || self.by_star.contains_key(token)
    }

    /// Candidates keyed by transition code or STAR code, filtered by the
    /// destination group (falling back to all candidates when the filter
    /// empties the set), latest effective date winning.
    pub fn find_route(&self, token: &str, dest: Option<&str>) -> Option<&StarRoute> {
        let mut candidates: Vec<&StarRoute> = Vec::new();
        if let Some(list) = self.by_transition.get(token) {
            candidates.extend(list.iter().map(|&i| &self.routes[i]));
        }
        if let Some(list) = self.by_star.get(token) {
            candidates.extend(list.iter().map(|&i| &self.routes[i]));
        }
        if candidates.is_empty() {
            return None;
        }

        let filtered: Vec<&StarRoute> = match dest {
            Some(d) => candidates
                .iter()
                .cloned()
                .filter(|r| dest_group_matches(&r.dest_group, d))
                .collect(),
            None => candidates.clone(),
        };
        let pool = if filtered.is_empty() {
            candidates
        } else {
            filtered
        };

        pool.into_iter().max_by_key(|r| r.eff_date)
    }
}

// Group entries may carry runway suffixes, e.g. "KDEN/25". An empty group
// matches anything.
fn dest_group_matches(group: &str, dest: &str) -> bool {
    if group.is_empty() || dest.is_empty() {
        return true;
    }
    group
        .split_whitespace()
        .filter_map(|p| p.split('/').next())
        .any(|apt| apt == dest)
}

#[derive(Builder, Clone, Debug)]
#[builder(private)]
pub struct PlaybookRoute {
    pub play_name: String,
    pub play_name_norm: String,
    pub full_route: String,
    pub origin_airports: Vec<String>,
    pub origin_tracons: Vec<String>,
    pub origin_artccs: Vec<String>,
    pub dest_airports: Vec<String>,
    pub dest_tracons: Vec<String>,
    pub dest_artccs: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PlaybookTable {
    routes: Vec<PlaybookRoute>,
}

impl PlaybookTable {
    pub fn from_text(text: &str) -> PlaybookTable {
        let mut table = PlaybookTable::default();
        let data = CsvFile::from_text(text);

        let idx_play = data.header_index(&["play_name", "play"]);
        let idx_route = data.header_index(&["full_route", "route string", "route", "route_string"]);
        let (idx_play, idx_route) = match (idx_play, idx_route) {
            (Some(p), Some(r)) => (p, r),
            _ => return table,
        };

        let idx_orig_apts = data.header_index(&["origins", "origin", "origin_airports"]);
        let idx_orig_tracons = data.header_index(&["origin_tracons", "origin_tracon"]);
        let idx_orig_artccs = data.header_index(&["origin_artccs", "origin_artcc"]);
        let idx_dest_apts = data.header_index(&["destinations", "dest", "dest_airports"]);
        let idx_dest_tracons = data.header_index(&["dest_tracons", "dest_tracon"]);
        let idx_dest_artccs = data.header_index(&["dest_artccs", "dest_artcc"]);

        let list = |row: &[String], idx: Option<usize>| -> Vec<String> {
            idx.map(|i| {
                field(row, i)
                    .to_uppercase()
                    .split_whitespace()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
        };

        for row in data.records() {
            let play = field(row, idx_play).to_string();
            let route = field(row, idx_route).to_string();
            if play.is_empty() || route.is_empty() || play.eq_ignore_ascii_case("nan") {
                continue;
            }

            let rec = PlaybookRouteBuilder::default()
                .play_name(play.clone())
                .play_name_norm(normalize_play_name(&play))
                .full_route(route.to_uppercase())
                .origin_airports(list(row, idx_orig_apts))
                .origin_tracons(list(row, idx_orig_tracons))
                .origin_artccs(list(row, idx_orig_artccs))
                .dest_airports(list(row, idx_dest_apts))
                .dest_tracons(list(row, idx_dest_tracons))
                .dest_artccs(list(row, idx_dest_artccs))
                .build();
            if let Ok(rec) = rec {
                table.routes.push(rec);
            }
        }

        table
    }

    pub fn push(&mut self, rec: PlaybookRoute) {
        self.routes.push(rec);
    }

    pub fn contains_play(&self, play_norm: &str) -> bool {
        self.routes.iter().any(|r| r.play_name_norm == play_norm)
    }

    /// All routes under a normalized play name whose origin and destination
    /// token sets intersect the given filters. An empty filter means any.
    pub fn matching(
        &self,
        play_norm: &str,
        origin_tokens: &[String],
        dest_tokens: &[String],
    ) -> Vec<&PlaybookRoute> {
        self.routes
            .iter()
            .filter(|r| r.play_name_norm == play_norm)
            .filter(|r| {
                origin_tokens.is_empty()
                    || origin_tokens.iter().any(|t| {
                        r.origin_airports.contains(&normalize_play_endpoint(t))
                            || r.origin_tracons.contains(t)
                            || r.origin_artccs.contains(t)
                    })
            })
            .filter(|r| {
                dest_tokens.is_empty()
                    || dest_tokens.iter().any(|t| {
                        r.dest_airports.contains(&normalize_play_endpoint(t))
                            || r.dest_tracons.contains(t)
                            || r.dest_artccs.contains(t)
                    })
            })
            .collect()
    }
}

pub fn normalize_play_name(name: &str) -> String {
    name.to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect()
}

/// Normalizes a playbook origin/destination token for airport matching only.
/// TRACON (letter + 2 digits) and ARTCC (`Z??`) codes pass through; 3-letter
/// non-Z codes are treated as domestic IATA and given the K regional prefix.
pub fn normalize_play_endpoint(token: &str) -> String {
    let t = token.trim().to_uppercase();
    let chars: Vec<char> = t.chars().collect();

    if chars.len() == 4 && chars.iter().all(|c| c.is_ascii_alphanumeric()) {
        return t;
    }
    if chars.len() == 3
        && chars[0] == 'Z'
        && chars[1..].iter().all(|c| c.is_ascii_alphanumeric())
    {
        return t;
    }
    if chars.len() == 3 && chars[0].is_ascii_alphabetic() && chars[1..].iter().all(|c| c.is_ascii_digit()) {
        return t;
    }
    if chars.len() == 3 && chars.iter().all(|c| c.is_ascii_alphabetic()) && chars[0] != 'Z' {
        return format!("K{}", t);
    }
    t
}

pub const POINTS_FILE: &str = "points.csv";
pub const AREA_CENTERS_FILE: &str = "area_centers.csv";
pub const AIRWAYS_FILE: &str = "awys.csv";
pub const CDRS_FILE: &str = "cdrs.csv";
pub const DP_BASE_FILE: &str = "dp_base.csv";
pub const DP_RTE_FILE: &str = "dp_rte.csv";
pub const STARS_FILE: &str = "star_full_routes.csv";
pub const PLAYBOOK_FILE: &str = "playbook_routes.csv";

/// Every reference table, loaded once and shared read-only by all route
/// interpretations.
#[derive(Debug, Default)]
pub struct NavData {
    pub points: PointTable,
    pub areas: AreaCenters,
    pub airways: AirwayTable,
    pub cdrs: CdrTable,
    pub procedures: ProcedureTable,
    pub stars: StarTable,
    pub playbooks: PlaybookTable,
}

impl NavData {
    /// Builds all tables through a fetch-by-name callback. `None` (missing
    /// or unreadable dataset) leaves that table empty.
    pub fn load<F: FnMut(&str) -> Option<String>>(mut fetch: F) -> NavData {
        let mut text = |name: &str| fetch(name).unwrap_or_default();

        let points = PointTable::from_text(&text(POINTS_FILE));
        let areas = AreaCenters::from_text(&text(AREA_CENTERS_FILE));
        let airways = AirwayTable::from_text(&text(AIRWAYS_FILE));
        let cdrs = CdrTable::from_text(&text(CDRS_FILE));
        let procedures = ProcedureTable::from_texts(&text(DP_BASE_FILE), &text(DP_RTE_FILE));
        let stars = StarTable::from_text(&text(STARS_FILE));
        let playbooks = PlaybookTable::from_text(&text(PLAYBOOK_FILE));

        NavData {
            points,
            areas,
            airways,
            cdrs,
            procedures,
            stars,
            playbooks,
        }
    }

    /// Airport-like identifiers: ZZ_* centerpoints, 4-character codes, and
    /// facility centroids all behave as route endpoints rather than fixes.
    pub fn is_airport_ident(&self, id: &str) -> bool {
        id.starts_with("ZZ_") || id.chars().count() == 4 || self.areas.contains(id)
    }
}
