//! The trip planning pipeline: geocode, route, segment.
//!
//! Geocoding and routing failures abort the run. Charger lookups happen
//! inside the segmenter and only ever degrade the result.

use std::time::{Duration, Instant};

use tracing::info;

use crate::error::{PlanError, SegmentError};
use crate::model::{safe_range_km, Coordinate};
use crate::polyline::Polyline;
use crate::segmenter::{segment_route, Itinerary, ResetPolicy, SegmentOptions, DEFAULT_REPORTED_CANDIDATES};
use crate::traits::{ChargerDirectory, DistanceMetric, Geocoder, Router};

pub const DEFAULT_SAFETY_MARGIN: f64 = 0.8;

/// Ceiling on one planning run, measured from the start of [`TripPlanner::plan`].
pub const DEFAULT_MAX_RUN: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    /// Rated vehicle range in km.
    pub vehicle_range_km: f64,
}

#[derive(Debug, Clone)]
pub struct PlannerOptions {
    pub safety_margin: f64,
    pub reset_policy: ResetPolicy,
    pub reported_candidates: usize,
    /// Charger lookups stop once a run has taken this long. `None` means no
    /// ceiling.
    pub max_run: Option<Duration>,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
            reset_policy: ResetPolicy::default(),
            reported_candidates: DEFAULT_REPORTED_CANDIDATES,
            max_run: Some(DEFAULT_MAX_RUN),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TripPlan {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub route: Polyline,
    pub safe_range_km: f64,
    pub itinerary: Itinerary,
}

/// Borrowed collaborators for one or more planning runs.
pub struct TripPlanner<'a, G: ?Sized, R: ?Sized, D: ?Sized, M: ?Sized> {
    geocoder: &'a G,
    router: &'a R,
    directory: &'a D,
    metric: &'a M,
    options: PlannerOptions,
}

impl<'a, G, R, D, M> TripPlanner<'a, G, R, D, M>
where
    G: Geocoder + ?Sized,
    R: Router + ?Sized,
    D: ChargerDirectory + ?Sized,
    M: DistanceMetric + ?Sized,
{
    pub fn new(geocoder: &'a G, router: &'a R, directory: &'a D, metric: &'a M) -> Self {
        Self {
            geocoder,
            router,
            directory,
            metric,
            options: PlannerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PlannerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn plan(&self, request: &TripRequest) -> Result<TripPlan, PlanError> {
        let deadline = self
            .options
            .max_run
            .and_then(|limit| Instant::now().checked_add(limit));
        let safe_range_km = safe_range_km(request.vehicle_range_km, self.options.safety_margin);
        // Reject before spending any network calls.
        if !(safe_range_km.is_finite() && safe_range_km > 0.0) {
            return Err(SegmentError::InvalidSafeRange(safe_range_km).into());
        }

        let origin = self.locate(&request.origin)?;
        let destination = self.locate(&request.destination)?;
        info!(origin = %request.origin, destination = %request.destination, "route being generated");

        let route = self
            .router
            .route(origin, destination)
            .map_err(|source| PlanError::Routing {
                origin: request.origin.clone(),
                destination: request.destination.clone(),
                source,
            })?;
        if route.is_empty() {
            return Err(PlanError::RouteNotFound {
                origin: request.origin.clone(),
                destination: request.destination.clone(),
            });
        }
        info!(points = route.len(), "route fetched");

        let segment_options = SegmentOptions {
            safe_range_km,
            reset_policy: self.options.reset_policy,
            reported_candidates: self.options.reported_candidates,
            deadline,
        };
        let itinerary = segment_route(route.points(), &segment_options, self.directory, self.metric)?;
        info!(
            stops = itinerary.stops.len(),
            total_km = itinerary.total_distance_km,
            "trip planned"
        );

        Ok(TripPlan {
            origin,
            destination,
            route,
            safe_range_km,
            itinerary,
        })
    }

    fn locate(&self, city: &str) -> Result<Coordinate, PlanError> {
        self.geocoder
            .geocode(city)
            .map_err(|source| PlanError::Geocoding {
                city: city.to_string(),
                source,
            })?
            .ok_or_else(|| PlanError::CityNotFound(city.to_string()))
    }
}
