//! Collaborator seams for the trip planner.
//!
//! The segmenter and the pipeline only ever talk to these traits. HTTP
//! adapters implement them for production; tests implement them with
//! in-memory fakes.

use crate::error::ProviderError;
use crate::model::{ChargerCandidate, Coordinate};
use crate::polyline::Polyline;

/// Resolves a free-text place name to a coordinate.
pub trait Geocoder {
    /// Returns the first match, or `None` if the provider knows no such place.
    fn geocode(&self, place: &str) -> Result<Option<Coordinate>, ProviderError>;
}

/// Produces a drivable path between two coordinates.
pub trait Router {
    /// Returns the route geometry in travel order. An empty polyline means the
    /// provider found no route.
    fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<Polyline, ProviderError>;
}

/// Looks up charging stations near a point.
pub trait ChargerDirectory {
    /// Returns candidates ranked by the provider's own relevance.
    fn chargers_near(&self, at: Coordinate) -> Result<Vec<ChargerCandidate>, ProviderError>;
}

impl<F> ChargerDirectory for F
where
    F: Fn(Coordinate) -> Result<Vec<ChargerCandidate>, ProviderError>,
{
    fn chargers_near(&self, at: Coordinate) -> Result<Vec<ChargerCandidate>, ProviderError> {
        self(at)
    }
}

/// Distance between two consecutive waypoints, in kilometers.
pub trait DistanceMetric {
    fn distance_km(&self, from: Coordinate, to: Coordinate) -> f64;
}
