//! In-memory stand-ins for the geocoder, router and charger directory.

use std::cell::RefCell;
use std::collections::HashMap;

use ev_trip_planner::error::ProviderError;
use ev_trip_planner::model::{ChargerCandidate, Coordinate};
use ev_trip_planner::polyline::Polyline;
use ev_trip_planner::traits::{ChargerDirectory, Geocoder, Router};

use super::maharashtra::Location;

/// A transport-style failure that needs no network.
pub fn undecodable_body() -> ProviderError {
    let source = serde_json::from_str::<serde_json::Value>("<html>502 Bad Gateway</html>").unwrap_err();
    ProviderError::Deserialize {
        context: "fake directory".to_string(),
        source,
    }
}

#[derive(Debug, Default)]
pub struct FakeGeocoder {
    places: HashMap<String, Coordinate>,
    failing: bool,
}

impl FakeGeocoder {
    pub fn with_locations(locations: &[Location]) -> Self {
        Self {
            places: locations
                .iter()
                .map(|l| (l.name.to_string(), l.coords()))
                .collect(),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            places: HashMap::new(),
            failing: true,
        }
    }
}

impl Geocoder for FakeGeocoder {
    fn geocode(&self, place: &str) -> Result<Option<Coordinate>, ProviderError> {
        if self.failing {
            return Err(undecodable_body());
        }
        Ok(self.places.get(place).copied())
    }
}

/// Returns the same route for any request, or fails.
#[derive(Debug)]
pub struct FakeRouter {
    route: Option<Vec<Coordinate>>,
    pub requests: RefCell<Vec<(Coordinate, Coordinate)>>,
}

impl FakeRouter {
    pub fn returning(route: Vec<Coordinate>) -> Self {
        Self {
            route: Some(route),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            route: None,
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl Router for FakeRouter {
    fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<Polyline, ProviderError> {
        self.requests.borrow_mut().push((origin, destination));
        match &self.route {
            Some(points) => Ok(Polyline::new(points.clone())),
            None => Err(ProviderError::Malformed {
                context: "fake router".to_string(),
                reason: "upstream unavailable".to_string(),
            }),
        }
    }
}

/// What the scripted directory answers on a given call.
#[derive(Debug, Clone)]
pub enum Reply {
    Chargers(Vec<&'static str>),
    Empty,
    Fail,
}

/// Answers lookups from a script, one reply per call, and records every
/// queried point. Calls past the end of the script get one generic charger.
#[derive(Debug, Default)]
pub struct ScriptedDirectory {
    script: Vec<Reply>,
    pub queried: RefCell<Vec<Coordinate>>,
}

impl ScriptedDirectory {
    pub fn new(script: Vec<Reply>) -> Self {
        Self {
            script,
            queried: RefCell::new(Vec::new()),
        }
    }

    pub fn always_found() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.queried.borrow().len()
    }
}

impl ChargerDirectory for ScriptedDirectory {
    fn chargers_near(&self, at: Coordinate) -> Result<Vec<ChargerCandidate>, ProviderError> {
        let call = self.calls();
        self.queried.borrow_mut().push(at);
        match self.script.get(call).cloned().unwrap_or(Reply::Chargers(vec!["Charger"])) {
            Reply::Chargers(names) => Ok(names.into_iter().map(ChargerCandidate::new).collect()),
            Reply::Empty => Ok(Vec::new()),
            Reply::Fail => Err(undecodable_body()),
        }
    }
}
