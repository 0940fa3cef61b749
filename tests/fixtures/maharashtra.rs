//! Real Maharashtra city locations for realistic test fixtures.
//!
//! Coordinates are city centres as returned by Nominatim.

use ev_trip_planner::model::Coordinate;

/// A named location with coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

pub const NAGPUR: Location = Location::new("Nagpur", 21.1458, 79.0882);
pub const AMRAVATI: Location = Location::new("Amravati", 20.9374, 77.7796);
pub const AKOLA: Location = Location::new("Akola", 20.7002, 77.0082);
pub const JALNA: Location = Location::new("Jalna", 19.8347, 75.8816);
pub const AURANGABAD: Location = Location::new("Aurangabad", 19.8762, 75.3433);
pub const AHMEDNAGAR: Location = Location::new("Ahmednagar", 19.0948, 74.7480);
pub const PUNE: Location = Location::new("Pune", 18.5204, 73.8567);
pub const MUMBAI: Location = Location::new("Mumbai", 19.0760, 72.8777);
pub const NASHIK: Location = Location::new("Nashik", 19.9975, 73.7898);

/// The Samruddhi-ish corridor from Nagpur to Pune, as towns in driving order.
pub const NAGPUR_TO_PUNE: &[Location] = &[NAGPUR, AMRAVATI, AKOLA, JALNA, AURANGABAD, AHMEDNAGAR, PUNE];

/// Interpolates `steps` evenly spaced waypoints per leg between consecutive
/// towns. The result starts at the first town and ends at the last.
pub fn densify(towns: &[Location], steps: usize) -> Vec<Coordinate> {
    let mut points = Vec::new();
    if let Some(first) = towns.first() {
        points.push(first.coords());
    }
    for leg in towns.windows(2) {
        let (a, b) = (leg[0], leg[1]);
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            points.push(Coordinate::new(
                a.lat + (b.lat - a.lat) * t,
                a.lng + (b.lng - a.lng) * t,
            ));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_densify_keeps_endpoints() {
        let points = densify(NAGPUR_TO_PUNE, 10);
        assert_eq!(points.len(), 1 + 10 * (NAGPUR_TO_PUNE.len() - 1));
        assert_eq!(points[0], NAGPUR.coords());
        let last = points[points.len() - 1];
        assert!((last.lat - PUNE.lat).abs() < 1e-9 && (last.lon - PUNE.lng).abs() < 1e-9);
    }
}
