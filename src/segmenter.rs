//! Range-exhaustion segmentation.
//!
//! Walks the route once, accumulating distance between consecutive
//! waypoints. Whenever the distance since the last reset reaches the safe
//! range, the charger directory is queried at that waypoint and the first
//! candidate becomes a stop.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::SegmentError;
use crate::model::{ChargerCandidate, Coordinate, Stop};
use crate::traits::{ChargerDirectory, DistanceMetric};

/// Number of candidates kept per exhaustion point for reporting.
pub const DEFAULT_REPORTED_CANDIDATES: usize = 5;

/// Failure reason recorded for exhaustion points reached after the deadline.
pub const DEADLINE_EXCEEDED: &str = "run deadline exceeded";

/// When the distance-since-last-stop accumulator goes back to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPolicy {
    /// Reset after every exhaustion point, whether or not a stop was inserted.
    #[default]
    Always,
    /// Reset only after a stop is inserted. A failed or empty lookup keeps the
    /// accumulator running, so the next waypoint queries again.
    AfterStop,
}

#[derive(Debug, Clone)]
pub struct SegmentOptions {
    /// Distance in km after which a recharge is sought.
    pub safe_range_km: f64,
    pub reset_policy: ResetPolicy,
    /// Candidates retained per exhaustion point in the report.
    pub reported_candidates: usize,
    /// No directory lookups are made once this instant has passed.
    pub deadline: Option<Instant>,
}

impl SegmentOptions {
    pub fn new(safe_range_km: f64) -> Self {
        Self {
            safe_range_km,
            reset_policy: ResetPolicy::default(),
            reported_candidates: DEFAULT_REPORTED_CANDIDATES,
            deadline: None,
        }
    }

    pub fn with_reset_policy(mut self, reset_policy: ResetPolicy) -> Self {
        self.reset_policy = reset_policy;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// What happened at an exhaustion point.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// A stop was appended; `stop_index` points into [`Itinerary::stops`].
    StopInserted { stop_index: usize },
    /// The directory answered with an empty list.
    NoCandidates,
    /// The directory call failed and was treated as an empty list.
    LookupFailed { reason: String },
}

/// One waypoint where the safe range was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct ExhaustionPoint {
    pub waypoint_index: usize,
    pub coordinate: Coordinate,
    /// Total distance travelled when this point was reached.
    pub distance_km: f64,
    pub distance_since_reset_km: f64,
    /// How many candidates the directory returned.
    pub candidates_found: usize,
    /// The first few candidates, for display.
    pub candidates: Vec<ChargerCandidate>,
    pub outcome: LookupOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub stops: Vec<Stop>,
    pub total_distance_km: f64,
    pub exhaustion_points: Vec<ExhaustionPoint>,
}

impl Itinerary {
    /// Stops strictly between Start and Destination.
    pub fn intermediate_stops(&self) -> &[Stop] {
        &self.stops[1..self.stops.len() - 1]
    }
}

/// Segments `waypoints` into charging stops.
///
/// Returns an error only for an empty route or a safe range that is not a
/// positive finite number. Directory failures never abort the scan. Past
/// [`SegmentOptions::deadline`] the scan keeps walking to the destination but
/// records every further exhaustion point as a failed lookup without querying.
pub fn segment_route<D, M>(
    waypoints: &[Coordinate],
    options: &SegmentOptions,
    directory: &D,
    metric: &M,
) -> Result<Itinerary, SegmentError>
where
    D: ChargerDirectory + ?Sized,
    M: DistanceMetric + ?Sized,
{
    let safe_range_km = options.safe_range_km;
    if !(safe_range_km.is_finite() && safe_range_km > 0.0) {
        return Err(SegmentError::InvalidSafeRange(safe_range_km));
    }
    let (first, rest) = waypoints.split_first().ok_or(SegmentError::EmptyRoute)?;

    let mut stops = vec![Stop::start(*first)];
    let mut exhaustion_points = Vec::new();
    let mut since_reset = 0.0;
    let mut total = 0.0;
    let mut previous = *first;
    let mut deadline_passed = false;

    for (offset, &point) in rest.iter().enumerate() {
        let waypoint_index = offset + 1;
        let segment = metric.distance_km(previous, point);
        since_reset += segment;
        total += segment;
        previous = point;

        if since_reset < safe_range_km {
            continue;
        }

        debug!(
            waypoint_index,
            since_reset_km = since_reset,
            total_km = total,
            "safe range reached, searching chargers"
        );

        if !deadline_passed && options.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            warn!(waypoint_index, total_km = total, "run deadline passed, skipping remaining charger lookups");
            deadline_passed = true;
        }

        let (candidates, failure) = if deadline_passed {
            (Vec::new(), Some(DEADLINE_EXCEEDED.to_string()))
        } else {
            match directory.chargers_near(point) {
                Ok(candidates) => (candidates, None),
                Err(err) => {
                    warn!(waypoint_index, %point, error = %err, "charger lookup failed, treating as no chargers");
                    (Vec::new(), Some(err.to_string()))
                }
            }
        };

        let outcome = match (candidates.first(), failure) {
            (Some(chosen), _) => {
                info!(waypoint_index, charger = %chosen.name, total_km = total, "charging stop added");
                stops.push(Stop::charger(chosen.name.clone(), point, total));
                LookupOutcome::StopInserted {
                    stop_index: stops.len() - 1,
                }
            }
            (None, Some(reason)) => LookupOutcome::LookupFailed { reason },
            (None, None) => {
                warn!(waypoint_index, %point, "no chargers found nearby");
                LookupOutcome::NoCandidates
            }
        };

        let inserted = matches!(outcome, LookupOutcome::StopInserted { .. });
        exhaustion_points.push(ExhaustionPoint {
            waypoint_index,
            coordinate: point,
            distance_km: total,
            distance_since_reset_km: since_reset,
            candidates_found: candidates.len(),
            candidates: candidates
                .into_iter()
                .take(options.reported_candidates)
                .collect(),
            outcome,
        });

        if inserted || options.reset_policy == ResetPolicy::Always {
            since_reset = 0.0;
        }
    }

    stops.push(Stop::destination(previous, total));

    Ok(Itinerary {
        stops,
        total_distance_km: total,
        exhaustion_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    /// Every latitude degree counts as 100 km.
    struct Grid;

    impl DistanceMetric for Grid {
        fn distance_km(&self, from: Coordinate, to: Coordinate) -> f64 {
            (to.lat - from.lat).abs() * 100.0
        }
    }

    fn line(n: usize) -> Vec<Coordinate> {
        (0..n).map(|i| Coordinate::new(i as f64, 0.0)).collect()
    }

    fn always_one(_: Coordinate) -> Result<Vec<ChargerCandidate>, ProviderError> {
        Ok(vec![ChargerCandidate::new("Charger")])
    }

    fn never(_: Coordinate) -> Result<Vec<ChargerCandidate>, ProviderError> {
        Ok(Vec::new())
    }

    #[test]
    fn test_rejects_empty_route() {
        let err = segment_route(&[], &SegmentOptions::new(100.0), &always_one, &Grid).unwrap_err();
        assert_eq!(err, SegmentError::EmptyRoute);
    }

    #[test]
    fn test_rejects_non_positive_safe_range() {
        for range in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = segment_route(&line(3), &SegmentOptions::new(range), &always_one, &Grid);
            assert!(matches!(result, Err(SegmentError::InvalidSafeRange(_))));
        }
    }

    #[test]
    fn test_exact_threshold_triggers_stop() {
        let itinerary = segment_route(&line(2), &SegmentOptions::new(100.0), &always_one, &Grid).unwrap();
        assert_eq!(itinerary.stops.len(), 3);
        assert_eq!(itinerary.exhaustion_points.len(), 1);
    }

    #[test]
    fn test_always_policy_resets_after_empty_lookup() {
        // 0 -> 1.5 -> 2.5 -> 3.5 with range 150: exhaustion at index 1 (150),
        // then 100 + 100 = 200 at index 3.
        let waypoints = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.5, 0.0),
            Coordinate::new(2.5, 0.0),
            Coordinate::new(3.5, 0.0),
        ];
        let itinerary = segment_route(&waypoints, &SegmentOptions::new(150.0), &never, &Grid).unwrap();
        let indices: Vec<usize> = itinerary
            .exhaustion_points
            .iter()
            .map(|p| p.waypoint_index)
            .collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_after_stop_policy_keeps_accumulating() {
        let waypoints = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.5, 0.0),
            Coordinate::new(2.5, 0.0),
            Coordinate::new(3.5, 0.0),
        ];
        let options = SegmentOptions::new(150.0).with_reset_policy(ResetPolicy::AfterStop);
        let itinerary = segment_route(&waypoints, &options, &never, &Grid).unwrap();
        let since: Vec<f64> = itinerary
            .exhaustion_points
            .iter()
            .map(|p| p.distance_since_reset_km)
            .collect();
        assert_eq!(since, vec![150.0, 250.0, 350.0]);
    }

    #[test]
    fn test_reported_candidates_are_truncated() {
        let many = |_: Coordinate| -> Result<Vec<ChargerCandidate>, ProviderError> {
            Ok((0..8).map(|i| ChargerCandidate::new(format!("C{i}"))).collect())
        };
        let itinerary = segment_route(&line(2), &SegmentOptions::new(100.0), &many, &Grid).unwrap();
        let point = &itinerary.exhaustion_points[0];
        assert_eq!(point.candidates_found, 8);
        assert_eq!(point.candidates.len(), DEFAULT_REPORTED_CANDIDATES);
        assert_eq!(itinerary.stops[1].label, "C0");
    }

    #[test]
    fn test_past_deadline_skips_lookups_but_reaches_destination() {
        let calls = std::cell::Cell::new(0);
        let counting = |_: Coordinate| -> Result<Vec<ChargerCandidate>, ProviderError> {
            calls.set(calls.get() + 1);
            Ok(vec![ChargerCandidate::new("Charger")])
        };
        let options = SegmentOptions::new(100.0).with_deadline(Instant::now());
        let itinerary = segment_route(&line(4), &options, &counting, &Grid).unwrap();

        assert_eq!(calls.get(), 0);
        assert_eq!(itinerary.exhaustion_points.len(), 3);
        assert!(itinerary.exhaustion_points.iter().all(|p| p.outcome
            == LookupOutcome::LookupFailed {
                reason: DEADLINE_EXCEEDED.to_string()
            }));
        assert_eq!(itinerary.stops.len(), 2);
        assert!(itinerary.stops[1].is_destination());
        assert_eq!(itinerary.total_distance_km, 300.0);
    }

    #[test]
    fn test_intermediate_stops_slice() {
        let itinerary = segment_route(&line(4), &SegmentOptions::new(100.0), &always_one, &Grid).unwrap();
        assert_eq!(itinerary.intermediate_stops().len(), 3);
    }
}
