//! Test fixtures for ev-trip-planner.
//!
//! Provides realistic test data including:
//! - Real Maharashtra city centres (from OpenStreetMap)
//! - Dense synthetic waypoint paths between them
//! - In-memory collaborators for the planning pipeline
//! - OSRM dataset preparation for the container-backed test

#![allow(dead_code)]

pub mod collaborators;
pub mod maharashtra;
pub mod osrm_dataset;

pub use maharashtra::*;
