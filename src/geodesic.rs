//! Distance between consecutive waypoints.
//!
//! Two models are provided: great-circle (haversine) on a sphere, and the
//! Vincenty inverse solution on the WGS-84 ellipsoid.

use crate::model::Coordinate;
use crate::traits::DistanceMetric;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS-84 semi-major axis in meters.
const WGS84_A: f64 = 6_378_137.0;

/// WGS-84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

const VINCENTY_MAX_ITERATIONS: usize = 200;
const VINCENTY_TOLERANCE: f64 = 1e-12;

/// Great-circle distance on a sphere of radius 6371 km.
#[derive(Debug, Clone, Copy, Default)]
pub struct Haversine;

impl Haversine {
    /// Calculate haversine distance between two points in kilometers.
    pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lng = (to.lon - from.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }
}

impl DistanceMetric for Haversine {
    fn distance_km(&self, from: Coordinate, to: Coordinate) -> f64 {
        Self::haversine_km(from, to)
    }
}

/// Ellipsoidal distance on WGS-84.
///
/// Nearly antipodal pairs can keep the iteration from converging; those fall
/// back to the haversine distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vincenty;

impl Vincenty {
    /// Returns the distance in meters, or `None` if the iteration diverged.
    pub fn inverse_m(from: Coordinate, to: Coordinate) -> Option<f64> {
        let b = WGS84_A * (1.0 - WGS84_F);
        let l = (to.lon - from.lon).to_radians();
        let u1 = ((1.0 - WGS84_F) * from.lat.to_radians().tan()).atan();
        let u2 = ((1.0 - WGS84_F) * to.lat.to_radians().tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = l;
        for _ in 0..VINCENTY_MAX_ITERATIONS {
            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
                + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
            .sqrt();
            if sin_sigma == 0.0 {
                return Some(0.0);
            }
            let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            let sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
            // Equatorial lines have cos_sq_alpha == 0.
            let cos_2sigma_m = if cos_sq_alpha != 0.0 {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            } else {
                0.0
            };
            let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));

            let previous = lambda;
            lambda = l
                + (1.0 - c)
                    * WGS84_F
                    * sin_alpha
                    * (sigma
                        + c * sin_sigma
                            * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

            if (lambda - previous).abs() < VINCENTY_TOLERANCE {
                let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - b.powi(2)) / b.powi(2);
                let big_a =
                    1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
                let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
                let delta_sigma = big_b
                    * sin_sigma
                    * (cos_2sigma_m
                        + big_b / 4.0
                            * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                                - big_b / 6.0
                                    * cos_2sigma_m
                                    * (-3.0 + 4.0 * sin_sigma.powi(2))
                                    * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
                return Some(b * big_a * (sigma - delta_sigma));
            }
        }

        None
    }
}

impl DistanceMetric for Vincenty {
    fn distance_km(&self, from: Coordinate, to: Coordinate) -> f64 {
        match Self::inverse_m(from, to) {
            Some(meters) => meters / 1000.0,
            None => {
                tracing::debug!(%from, %to, "vincenty did not converge, using haversine");
                Haversine::haversine_km(from, to)
            }
        }
    }
}

/// Runtime-selectable distance model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceModel {
    #[default]
    Vincenty,
    Haversine,
}

impl DistanceMetric for DistanceModel {
    fn distance_km(&self, from: Coordinate, to: Coordinate) -> f64 {
        match self {
            DistanceModel::Vincenty => Vincenty.distance_km(from, to),
            DistanceModel::Haversine => Haversine.distance_km(from, to),
        }
    }
}
