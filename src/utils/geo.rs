pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two (latitude, longitude)
/// pairs given in decimal degrees. Haversine with the atan2 form, which
/// stays precise for small separations where the law-of-cosines variant
/// collapses to zero.
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, long1) = a;
    let (lat2, long2) = b;

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (long2 - long1).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance when both endpoints are known; `None` means "unknown", which
/// callers must sort after every known distance and never read as 0 km.
pub fn distance_km(from: Option<(f64, f64)>, to: Option<(f64, f64)>) -> Option<f64> {
    match (from, to) {
        (Some(a), Some(b)) => Some(haversine_km(a, b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELHI: (f64, f64) = (28.6139, 77.2090);
    const MUMBAI: (f64, f64) = (19.0760, 72.8777);

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_km(DELHI, MUMBAI);
        let back = haversine_km(MUMBAI, DELHI);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_km(DELHI, DELHI), 0.0);
        assert_eq!(haversine_km((0.0, 0.0), (0.0, 0.0)), 0.0);
    }

    #[test]
    fn known_city_pair_distance() {
        // Delhi to Mumbai is ~1150 km great-circle.
        let d = haversine_km(DELHI, MUMBAI);
        assert!((d - 1150.0).abs() < 20.0, "got {} km", d);
    }

    #[test]
    fn small_separation_does_not_collapse_to_zero() {
        // Two points ~111 m apart along a meridian.
        let a = (28.613900, 77.209000);
        let b = (28.614900, 77.209000);
        let d = haversine_km(a, b);
        assert!(d > 0.0);
        assert!((d - 0.111).abs() < 0.002, "got {} km", d);
    }

    #[test]
    fn unknown_endpoint_yields_none() {
        assert_eq!(distance_km(None, Some(DELHI)), None);
        assert_eq!(distance_km(Some(DELHI), None), None);
        assert_eq!(distance_km(None, None), None);
        assert!(distance_km(Some(DELHI), Some(MUMBAI)).is_some());
    }
}
