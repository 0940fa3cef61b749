//! Value types shared by the segmenter, the providers and the renderers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label of the first stop of every itinerary.
pub const START_LABEL: &str = "Start";

/// Label of the last stop of every itinerary.
pub const DESTINATION_LABEL: &str = "Destination";

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns `(lat, lon)` rounded to `places` decimals, for display.
    pub fn rounded(&self, places: i32) -> (f64, f64) {
        let factor = 10f64.powi(places);
        (
            (self.lat * factor).round() / factor,
            (self.lon * factor).round() / factor,
        )
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// A charging station returned by a charger directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargerCandidate {
    pub name: String,
    pub address: Option<String>,
    /// Distance from the query point in meters, when the provider reports one.
    pub distance_m: Option<f64>,
}

impl ChargerCandidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            distance_m: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_distance_m(mut self, distance_m: f64) -> Self {
        self.distance_m = Some(distance_m);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Start,
    Charger,
    Destination,
}

/// A labelled point of the final itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub kind: StopKind,
    pub label: String,
    pub coordinate: Coordinate,
    /// Distance travelled along the route to reach this stop, in km.
    pub distance_km: f64,
}

impl Stop {
    pub fn start(coordinate: Coordinate) -> Self {
        Self {
            kind: StopKind::Start,
            label: START_LABEL.to_string(),
            coordinate,
            distance_km: 0.0,
        }
    }

    pub fn charger(name: impl Into<String>, coordinate: Coordinate, distance_km: f64) -> Self {
        Self {
            kind: StopKind::Charger,
            label: name.into(),
            coordinate,
            distance_km,
        }
    }

    pub fn destination(coordinate: Coordinate, distance_km: f64) -> Self {
        Self {
            kind: StopKind::Destination,
            label: DESTINATION_LABEL.to_string(),
            coordinate,
            distance_km,
        }
    }

    pub fn is_destination(&self) -> bool {
        self.kind == StopKind::Destination
    }
}

/// Usable range before a recharge is sought, derived from the rated range.
///
/// Truncated to whole kilometres.
pub fn safe_range_km(vehicle_range_km: f64, safety_margin: f64) -> f64 {
    (vehicle_range_km * safety_margin).floor()
}
