//! Ad-hoc coordinate literal grammars (NAT, ICAO, ARINC shorthand).
//!
//! The grammars overlap, so `parse_coordinate` tries them in a fixed priority
//! order and the first one that matches wins. That ordering is a policy
//! choice, not a proof of uniqueness.

use lazy_static::lazy_static;
use regex::Regex;

use crate::geo::LatLon;

/// NAT slash shorthand `DD/DD` -> DD north / DD west (e.g. 51/53).
pub fn parse_nat_slash(token: &str) -> Option<LatLon> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^(\d{2})/(\d{2})$").unwrap();
    }
    let cap = RE.captures(token)?;
    let lat: f64 = cap[1].parse().ok()?;
    let lon: f64 = cap[2].parse().ok()?;
    Some(LatLon::new(lat, -lon))
}

pub fn encode_nat_slash(p: LatLon) -> Option<String> {
    if p.lat().fract() != 0.0 || p.lon().fract() != 0.0 {
        return None;
    }
    if p.lat() < 0.0 || p.lon() > 0.0 {
        return None;
    }
    Some(format!("{:02}/{:02}", p.lat() as i64, -p.lon() as i64))
}

/// NAT half-degree `HDDDD` -> DD degrees 30 minutes north / DD west
/// (e.g. H5250 = 52 30N 050W).
pub fn parse_nat_half_degree(token: &str) -> Option<LatLon> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^H(\d{2})(\d{2})$").unwrap();
    }
    let cap = RE.captures(token)?;
    let lat: f64 = cap[1].parse().ok()?;
    let lon: f64 = cap[2].parse().ok()?;
    Some(LatLon::new(lat + 0.5, -lon))
}

pub fn encode_nat_half_degree(p: LatLon) -> Option<String> {
    if (p.lat().fract() - 0.5).abs() > 1e-9 || p.lon().fract() != 0.0 {
        return None;
    }
    if p.lat() < 0.0 || p.lon() > 0.0 {
        return None;
    }
    Some(format!("H{:02}{:02}", p.lat().trunc() as i64, -p.lon() as i64))
}

// Latitude half of an ICAO literal: ddmmN/S or ddN/S.
fn parse_lat_component(part: &str) -> Option<f64> {
    lazy_static! {
        static ref DEG_MIN: Regex = Regex::new(r"^(\d{2})(\d{2})([NS])$").unwrap();
        static ref DEG: Regex = Regex::new(r"^(\d{2})([NS])$").unwrap();
    }

    if let Some(cap) = DEG_MIN.captures(part) {
        let deg: f64 = cap[1].parse().ok()?;
        let min: f64 = cap[2].parse().ok()?;
        let lat = deg + min / 60.0;
        return Some(if &cap[3] == "S" { -lat } else { lat });
    }

    if let Some(cap) = DEG.captures(part) {
        let lat: f64 = cap[1].parse().ok()?;
        return Some(if &cap[2] == "S" { -lat } else { lat });
    }

    None
}

// Longitude half of an ICAO literal: dddmmE/W, ddmmE/W, dddE/W or ddE/W.
fn parse_lon_component(part: &str) -> Option<f64> {
    lazy_static! {
        static ref DEG_MIN: Regex = Regex::new(r"^(\d{2,3})(\d{2})([EW])$").unwrap();
        static ref DEG: Regex = Regex::new(r"^(\d{2,3})([EW])$").unwrap();
    }

    if let Some(cap) = DEG_MIN.captures(part) {
        let deg: f64 = cap[1].parse().ok()?;
        let min: f64 = cap[2].parse().ok()?;
        let lon = deg + min / 60.0;
        return Some(if &cap[3] == "W" { -lon } else { lon });
    }

    if let Some(cap) = DEG.captures(part) {
        let lon: f64 = cap[1].parse().ok()?;
        return Some(if &cap[2] == "W" { -lon } else { lon });
    }

    None
}

/// ICAO slash form, e.g. 5230N/05000W.
pub fn parse_icao_slash(token: &str) -> Option<LatLon> {
    let mut parts = token.splitn(2, '/');
    let lat = parse_lat_component(parts.next()?)?;
    let lon = parse_lon_component(parts.next()?)?;
    Some(LatLon::new(lat, lon))
}

pub fn encode_icao_slash(p: LatLon) -> Option<String> {
    let (lat_d, lat_m) = whole_minutes(p.lat())?;
    let (lon_d, lon_m) = whole_minutes(p.lon())?;
    Some(format!(
        "{:02}{:02}{}/{:03}{:02}{}",
        lat_d,
        lat_m,
        if p.lat() < 0.0 { 'S' } else { 'N' },
        lon_d,
        lon_m,
        if p.lon() < 0.0 { 'W' } else { 'E' }
    ))
}

/// ICAO / NAT compact forms in a single token: ddmmNdddmmW, ddNdddW and the
/// two mixed-minutes variants.
pub fn parse_icao_compact(token: &str) -> Option<LatLon> {
    lazy_static! {
        static ref FULL: Regex =
            Regex::new(r"^(\d{2})(\d{2})([NS])(\d{3})(\d{2})([EW])$").unwrap();
        static ref DEGREES: Regex = Regex::new(r"^(\d{2})([NS])(\d{3})([EW])$").unwrap();
        static ref LAT_MIN: Regex = Regex::new(r"^(\d{2})(\d{2})([NS])(\d{3})([EW])$").unwrap();
        static ref LON_MIN: Regex = Regex::new(r"^(\d{2})([NS])(\d{3})(\d{2})([EW])$").unwrap();
    }

    if let Some(cap) = FULL.captures(token) {
        let lat = cap[1].parse::<f64>().ok()? + cap[2].parse::<f64>().ok()? / 60.0;
        let lon = cap[4].parse::<f64>().ok()? + cap[5].parse::<f64>().ok()? / 60.0;
        return Some(signed(lat, &cap[3], lon, &cap[6]));
    }

    if let Some(cap) = DEGREES.captures(token) {
        let lat = cap[1].parse::<f64>().ok()?;
        let lon = cap[3].parse::<f64>().ok()?;
        return Some(signed(lat, &cap[2], lon, &cap[4]));
    }

    if let Some(cap) = LAT_MIN.captures(token) {
        let lat = cap[1].parse::<f64>().ok()? + cap[2].parse::<f64>().ok()? / 60.0;
        let lon = cap[4].parse::<f64>().ok()?;
        return Some(signed(lat, &cap[3], lon, &cap[5]));
    }

    if let Some(cap) = LON_MIN.captures(token) {
        let lat = cap[1].parse::<f64>().ok()?;
        let lon = cap[3].parse::<f64>().ok()? + cap[4].parse::<f64>().ok()? / 60.0;
        return Some(signed(lat, &cap[2], lon, &cap[5]));
    }

    None
}

pub fn encode_icao_compact(p: LatLon) -> Option<String> {
    let (lat_d, lat_m) = whole_minutes(p.lat())?;
    let (lon_d, lon_m) = whole_minutes(p.lon())?;
    Some(format!(
        "{:02}{:02}{}{:03}{:02}{}",
        lat_d,
        lat_m,
        if p.lat() < 0.0 { 'S' } else { 'N' },
        lon_d,
        lon_m,
        if p.lon() < 0.0 { 'W' } else { 'E' }
    ))
}

/// ARINC 5-character shorthand (e.g. 5275N, 75N70, 5020S).
///
/// The letter encodes the quadrant combination: N = north/west,
/// S = south/east, E = north/east, W = south/west. A longitude of 100 degrees
/// or more is written by moving the letter between the latitude and a 2-digit
/// longitude remainder.
pub fn parse_arinc_five_char(token: &str) -> Option<LatLon> {
    lazy_static! {
        static ref TRAILING: Regex = Regex::new(r"^(\d{2})(\d{2})([NSEW])$").unwrap();
        static ref EMBEDDED: Regex = Regex::new(r"^(\d{2})([NSEW])(\d{2})$").unwrap();
    }

    let (lat_deg, lon_deg, letter) = if let Some(cap) = TRAILING.captures(token) {
        let lat: f64 = cap[1].parse().ok()?;
        let lon: f64 = cap[2].parse().ok()?;
        (lat, lon, cap[3].chars().next()?)
    } else if let Some(cap) = EMBEDDED.captures(token) {
        let lat: f64 = cap[1].parse().ok()?;
        let lon: f64 = cap[3].parse().ok()?;
        (lat, lon + 100.0, cap[2].chars().next()?)
    } else {
        return None;
    };

    match letter {
        'N' => Some(LatLon::new(lat_deg, -lon_deg)),
        'S' => Some(LatLon::new(-lat_deg, lon_deg)),
        'E' => Some(LatLon::new(lat_deg, lon_deg)),
        'W' => Some(LatLon::new(-lat_deg, -lon_deg)),
        _ => None,
    }
}

pub fn encode_arinc_five_char(p: LatLon) -> Option<String> {
    if p.lat().fract() != 0.0 || p.lon().fract() != 0.0 {
        return None;
    }
    let lat = p.lat().abs() as i64;
    let lon = p.lon().abs() as i64;
    if lat > 90 || lon > 180 {
        return None;
    }

    let letter = match (p.lat() >= 0.0, p.lon() >= 0.0) {
        (true, false) => 'N',
        (false, true) => 'S',
        (true, true) => 'E',
        (false, false) => 'W',
    };

    if lon < 100 {
        Some(format!("{:02}{:02}{}", lat, lon, letter))
    } else {
        Some(format!("{:02}{}{:02}", lat, letter, lon - 100))
    }
}

/// Unified parser: tries each grammar in priority order and returns the
/// first hit.
pub fn parse_coordinate(token: &str) -> Option<LatLon> {
    let s = token.trim();
    if s.is_empty() {
        return None;
    }

    parse_nat_slash(s)
        .or_else(|| parse_nat_half_degree(s))
        .or_else(|| parse_icao_slash(s))
        .or_else(|| parse_icao_compact(s))
        .or_else(|| parse_arinc_five_char(s))
}

fn signed(lat: f64, lat_dir: &str, lon: f64, lon_dir: &str) -> LatLon {
    LatLon::new(
        if lat_dir == "S" { -lat } else { lat },
        if lon_dir == "W" { -lon } else { lon },
    )
}

// Splits a decimal-degree value into whole degrees and whole minutes, or
// None when the value does not land on a whole minute.
fn whole_minutes(dd: f64) -> Option<(i64, i64)> {
    let total = (dd.abs() * 60.0).round();
    if (dd.abs() * 60.0 - total).abs() > 1e-6 {
        return None;
    }
    let total = total as i64;
    Some((total / 60, total % 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn nat_slash() {
        let p = parse_nat_slash("51/53").unwrap();
        assert!(close(p.lat(), 51.0));
        assert!(close(p.lon(), -53.0));
        assert_eq!(encode_nat_slash(p).unwrap(), "51/53");
    }

    #[test]
    fn nat_half_degree() {
        let p = parse_nat_half_degree("H5250").unwrap();
        assert!(close(p.lat(), 52.5));
        assert!(close(p.lon(), -50.0));
        assert_eq!(encode_nat_half_degree(p).unwrap(), "H5250");
    }

    #[test]
    fn icao_slash() {
        let p = parse_icao_slash("5230N/05000W").unwrap();
        assert!(close(p.lat(), 52.5));
        assert!(close(p.lon(), -50.0));
        assert_eq!(encode_icao_slash(p).unwrap(), "5230N/05000W");
    }

    #[test]
    fn icao_slash_degrees_only_components() {
        let p = parse_icao_slash("52N/050W").unwrap();
        assert!(close(p.lat(), 52.0));
        assert!(close(p.lon(), -50.0));
    }

    #[test]
    fn icao_compact_forms() {
        let p = parse_icao_compact("7500N13400W").unwrap();
        assert!(close(p.lat(), 75.0));
        assert!(close(p.lon(), -134.0));
        assert_eq!(encode_icao_compact(p).unwrap(), "7500N13400W");

        let p = parse_icao_compact("52N030W").unwrap();
        assert!(close(p.lat(), 52.0));
        assert!(close(p.lon(), -30.0));

        // Mixed-minutes variants
        let p = parse_icao_compact("5230N050W").unwrap();
        assert!(close(p.lat(), 52.5));
        assert!(close(p.lon(), -50.0));

        let p = parse_icao_compact("52N05030W").unwrap();
        assert!(close(p.lat(), 52.0));
        assert!(close(p.lon(), -50.5));
    }

    #[test]
    fn arinc_quadrants() {
        let p = parse_arinc_five_char("5275N").unwrap();
        assert!(close(p.lat(), 52.0));
        assert!(close(p.lon(), -75.0));
        assert_eq!(encode_arinc_five_char(p).unwrap(), "5275N");

        let p = parse_arinc_five_char("5020S").unwrap();
        assert!(close(p.lat(), -50.0));
        assert!(close(p.lon(), 20.0));

        let p = parse_arinc_five_char("5275E").unwrap();
        assert!(close(p.lat(), 52.0));
        assert!(close(p.lon(), 75.0));

        let p = parse_arinc_five_char("5275W").unwrap();
        assert!(close(p.lat(), -52.0));
        assert!(close(p.lon(), -75.0));
    }

    #[test]
    fn arinc_embedded_letter_adds_100_degrees() {
        let p = parse_arinc_five_char("75N70").unwrap();
        assert!(close(p.lat(), 75.0));
        assert!(close(p.lon(), -170.0));
        assert_eq!(encode_arinc_five_char(p).unwrap(), "75N70");
    }

    #[test]
    fn priority_order_nat_wins_over_arinc() {
        // A 5-character all-digit token with a slash can only be NAT; but a
        // token like "5275N" could look ICAO-ish. The documented order says
        // NAT slash, NAT half-degree, ICAO slash, ICAO compact, then ARINC.
        let p = parse_coordinate("51/53").unwrap();
        assert!(close(p.lat(), 51.0));

        // H#### must hit the half-degree grammar, not fall through
        let p = parse_coordinate("H5250").unwrap();
        assert!(close(p.lat(), 52.5));

        // Plain ARINC still reachable
        let p = parse_coordinate("5275N").unwrap();
        assert!(close(p.lon(), -75.0));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_coordinate("MERIT").is_none());
        assert!(parse_coordinate("Q22").is_none());
        assert!(parse_coordinate("").is_none());
        assert!(parse_coordinate("123/456").is_none());
    }
}
