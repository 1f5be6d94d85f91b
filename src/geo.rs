const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLon(f64, f64);

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        LatLon(lat, lon)
    }

    pub fn lat(self) -> f64 {
        self.0
    }

    pub fn lon(self) -> f64 {
        self.1
    }

    /// Builds a LatLon from two decimal-degree fields, rejecting anything
    /// outside the valid lat/lon ranges.
    pub fn from_decimal_fields(lat: &str, lon: &str) -> Option<Self> {
        let lat: f64 = lat.trim().parse().ok()?;
        let lon: f64 = lon.trim().parse().ok()?;
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if lat < -90.0 || lat > 90.0 || lon < -180.0 || lon > 180.0 {
            return None;
        }
        Some(LatLon(lat, lon))
    }

    /// Great-circle distance in kilometers (haversine).
    pub fn distance_km(self, other: LatLon) -> f64 {
        let lat1 = self.0.to_radians();
        let lat2 = other.0.to_radians();
        let dlat = (self.0 - other.0).to_radians();
        let dlon = (self.1 - other.1).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        c * EARTH_RADIUS_KM
    }

    /// Arithmetic midpoint in degrees. This is the reference position used
    /// for ambiguous-fix disambiguation, not a geodesic midpoint.
    pub fn midpoint_with(self, other: LatLon) -> LatLon {
        LatLon((self.0 + other.0) / 2.0, (self.1 + other.1) / 2.0)
    }

    /// Manhattan distance in degrees, |dlat| + |dlon|. The disambiguation
    /// heuristic ranks same-named candidates with this, not haversine.
    pub fn degree_error_to(self, other: LatLon) -> f64 {
        (self.0 - other.0).abs() + (self.1 - other.1).abs()
    }

    pub fn to_dms(self) -> String {
        fn split(dd: f64) -> (i32, i32, f64) {
            let d = dd.trunc() as i32;
            let m = (dd.abs() * 60.0).trunc() as i32 % 60;
            let s = (dd.abs() * 3600.0) % 60.0;
            (d, m, s)
        }

        let mut tmp = String::new();
        tmp += if self.0.is_sign_positive() { "N" } else { "S" };
        let (d, m, s) = split(self.0);
        tmp += &format!("{:03}.{:02}.{:06.03}", d.abs(), m, s);

        tmp += " ";

        tmp += if self.1.is_sign_positive() { "E" } else { "W" };
        let (d, m, s) = split(self.1);
        tmp += &format!("{:03}.{:02}.{:06.03}", d.abs(), m, s);
        tmp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_jfk_to_bos() {
        let jfk = LatLon::new(40.6413, -73.7781);
        let bos = LatLon::new(42.3656, -71.0096);
        let d = jfk.distance_km(bos);
        // Published great-circle distance is roughly 300 km
        assert!(d > 290.0 && d < 310.0, "got {}", d);
    }

    #[test]
    fn decimal_fields_range_checked() {
        assert!(LatLon::from_decimal_fields("40.5", "-73.9").is_some());
        assert!(LatLon::from_decimal_fields("91.0", "0.0").is_none());
        assert!(LatLon::from_decimal_fields("0.0", "-181.0").is_none());
        assert!(LatLon::from_decimal_fields("abc", "0.0").is_none());
    }

    #[test]
    fn dms_formatting() {
        let p = LatLon::new(40.5, -73.25);
        let s = p.to_dms();
        assert!(s.starts_with("N040.30."));
        assert!(s.contains(" W073.15."));
    }
}
