//! Distance and travel-time summary for a route geometry.

use geo::LineString;
use serde::Serialize;

/// Mean earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Average walking speed used for time estimates
pub const WALKING_SPEED_KMH: f64 = 5.0;

/// Average urban driving speed used for time estimates
pub const DRIVING_SPEED_KMH: f64 = 54.0;

/// Great-circle distance in meters between two lon/lat positions
pub fn haversine_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Path length in meters of a lon/lat line
pub fn path_length_meters(line: &LineString<f64>) -> f64 {
    line.lines()
        .map(|seg| haversine_distance(seg.start.x, seg.start.y, seg.end.x, seg.end.y))
        .sum()
}

/// Seconds needed to cover `meters` at `speed_kmh`
pub fn travel_seconds(meters: f64, speed_kmh: f64) -> f64 {
    if speed_kmh <= 0.0 {
        return 0.0;
    }
    meters / 1000.0 / speed_kmh * 3600.0
}

/// "850m" below one kilometer, "1.25km" above
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round())
    } else {
        format!("{:.2}km", meters / 1000.0)
    }
}

/// "1h 5min" or "12min"
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{}h {}min", hours, minutes)
    } else {
        format!("{}min", minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub distance_m: f64,
    pub walking_s: f64,
    pub driving_s: f64,
    pub distance_text: String,
    pub walking_text: String,
    pub driving_text: String,
}

impl RouteSummary {
    pub fn from_distance(distance_m: f64) -> Self {
        let distance_m = distance_m.max(0.0);
        let walking_s = travel_seconds(distance_m, WALKING_SPEED_KMH);
        let driving_s = travel_seconds(distance_m, DRIVING_SPEED_KMH);
        Self {
            distance_m,
            walking_s,
            driving_s,
            distance_text: format_distance(distance_m),
            walking_text: format_duration(walking_s),
            driving_text: format_duration(driving_s),
        }
    }

    pub fn from_line(line: &LineString<f64>) -> Self {
        Self::from_distance(path_length_meters(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_one_degree_latitude() {
        let d = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111_195.0).abs() < 10.0, "{}", d);
        assert_eq!(haversine_distance(-46.6, -23.5, -46.6, -23.5), 0.0);
    }

    #[test]
    fn test_path_length_sums_segments() {
        let line: LineString<f64> = vec![(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)].into();
        let direct = haversine_distance(0.0, 0.0, 0.0, 2.0);
        assert!((path_length_meters(&line) - direct).abs() < 1e-6);

        let single: LineString<f64> = vec![(0.0, 0.0)].into();
        assert_eq!(path_length_meters(&single), 0.0);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(850.4), "850m");
        assert_eq!(format_distance(1250.0), "1.25km");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59.0), "0min");
        assert_eq!(format_duration(12.0 * 60.0), "12min");
        assert_eq!(format_duration(3900.0), "1h 5min");
    }

    #[test]
    fn test_summary_speeds() {
        let summary = RouteSummary::from_distance(5000.0);
        assert!((summary.walking_s - 3600.0).abs() < 1e-9);
        assert!((summary.driving_s - 5000.0 / 1000.0 / 54.0 * 3600.0).abs() < 1e-9);
        assert_eq!(summary.walking_text, "1h 0min");
        assert_eq!(summary.driving_text, "5min");
        assert_eq!(summary.distance_text, "5.00km");
    }
}
