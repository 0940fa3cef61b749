//! Plain-text trip report sections printed by the CLI.

use crate::model::Stop;
use crate::planner::TripPlan;
use crate::segmenter::{ExhaustionPoint, LookupOutcome};

const SUMMARY_DECIMALS: i32 = 4;

/// Start and end coordinates and the number of route points.
pub fn trip_header(plan: &TripPlan) -> String {
    format!(
        "Start: {} {}\nEnd: {} {}\nRoute points count: {}\nSafe range: {} km\n",
        plan.origin.lat,
        plan.origin.lon,
        plan.destination.lat,
        plan.destination.lon,
        plan.route.len(),
        plan.safe_range_km,
    )
}

/// One block per exhaustion point: the charger search results and the
/// running total distance.
pub fn exhaustion_point_block(point: &ExhaustionPoint) -> String {
    let mut lines = vec![format!(
        "At approx ({}, {}), searching nearby EV charging stations...",
        point.coordinate.lat, point.coordinate.lon
    )];

    match &point.outcome {
        LookupOutcome::StopInserted { .. } => {
            lines.push(format!(
                "Found {} nearby EV charging station(s):",
                point.candidates_found
            ));
            lines.extend(point.candidates.iter().enumerate().map(|(i, candidate)| {
                let address = candidate.address.as_deref().unwrap_or("No address");
                let distance = candidate
                    .distance_m
                    .map_or_else(|| "N/A".to_string(), |d| format!("{d}"));
                format!("  {}. {} - {} ({} m)", i + 1, candidate.name, address, distance)
            }));
        }
        LookupOutcome::NoCandidates => lines.push("No chargers found nearby.".to_string()),
        LookupOutcome::LookupFailed { reason } => {
            lines.push(format!("Charger search failed ({reason}); no stop added here."))
        }
    }

    lines.push(format!(
        "Total distance covered so far: {} km",
        point.distance_km.trunc() as i64
    ));
    as_block(&lines)
}

/// Final ordered stop list with coordinates rounded to 4 decimals.
pub fn stop_summary(stops: &[Stop]) -> String {
    let mut lines = vec!["Stop Summary".to_string()];
    lines.extend(stops.iter().enumerate().map(|(i, stop)| {
        let (lat, lon) = stop.coordinate.rounded(SUMMARY_DECIMALS);
        format!("{}. {} at ({}, {})", i + 1, stop.label, lat, lon)
    }));
    as_block(&lines)
}

/// Joins lines, each terminated by a newline.
fn as_block(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
