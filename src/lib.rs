//! ev-trip-planner
//!
//! Plans charging stops for an electric-vehicle road trip: geocode the
//! endpoints, fetch a driving route, and walk it to find where the safe range
//! runs out.

pub mod config;
pub mod error;
pub mod geodesic;
mod http;
pub mod mapmyindia;
pub mod model;
pub mod nominatim;
pub mod openrouteservice;
pub mod osrm;
pub mod planner;
pub mod polyline;
pub mod render;
pub mod report;
pub mod retry;
pub mod segmenter;
pub mod throttle;
pub mod traits;
