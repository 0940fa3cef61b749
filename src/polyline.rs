//! Polyline representation for route geometries.
//!
//! Routes are held as decoded coordinate sequences. The compact encoded
//! polyline format only appears at the boundary, when a router hands back its
//! geometry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Coordinate;

/// Precision used by OpenRouteService and OSRM `geometries=polyline`.
pub const DEFAULT_PRECISION: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("byte {byte:#04x} at position {position} is outside the polyline alphabet")]
    InvalidByte { byte: u8, position: usize },

    #[error("polyline ends in the middle of a value at position {position}")]
    Truncated { position: usize },

    #[error("value starting before position {position} overflows")]
    Overflow { position: usize },
}

/// A route geometry as decoded coordinates, in travel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Decodes an encoded polyline string at the given decimal precision.
    pub fn decode(encoded: &str, precision: u32) -> Result<Self, PolylineError> {
        let factor = 10f64.powi(precision as i32);
        let bytes = encoded.as_bytes();
        let mut index = 0;
        let mut lat: i64 = 0;
        let mut lon: i64 = 0;
        let mut points = Vec::new();

        while index < bytes.len() {
            lat = accumulate(lat, bytes, &mut index)?;
            lon = accumulate(lon, bytes, &mut index)?;
            points.push(Coordinate::new(lat as f64 / factor, lon as f64 / factor));
        }

        Ok(Self { points })
    }

    /// Encodes the points at the given decimal precision.
    pub fn encode(&self, precision: u32) -> String {
        let factor = 10f64.powi(precision as i32);
        let mut out = String::new();
        let mut prev_lat: i64 = 0;
        let mut prev_lon: i64 = 0;

        for point in &self.points {
            let lat = (point.lat * factor).round() as i64;
            let lon = (point.lon * factor).round() as i64;
            encode_value(lat - prev_lat, &mut out);
            encode_value(lon - prev_lon, &mut out);
            prev_lat = lat;
            prev_lon = lon;
        }

        out
    }
}

fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let mut result: i64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = *bytes
            .get(*index)
            .ok_or(PolylineError::Truncated { position: *index })?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidByte {
                byte,
                position: *index,
            });
        }
        if shift > 55 {
            return Err(PolylineError::Overflow { position: start });
        }

        let chunk = i64::from(byte - 63);
        *index += 1;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Adds the next delta to a running coordinate, rejecting sums outside `i64`.
fn accumulate(total: i64, bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let position = *index;
    let delta = next_value(bytes, index)?;
    total
        .checked_add(delta)
        .ok_or(PolylineError::Overflow { position })
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= 0x20 {
        out.push(char::from((0x20 | (v & 0x1f)) as u8 + 63));
        v >>= 5;
    }
    out.push(char::from(v as u8 + 63));
}
