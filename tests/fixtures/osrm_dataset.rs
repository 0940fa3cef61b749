//! OSRM dataset preparation for the container-backed routing test.
//!
//! Downloads a Geofabrik extract once, then runs the MLD preprocessing
//! pipeline through the `osrm/osrm-backend` image. Everything is cached under
//! the data root, so repeated runs only pay for the container start.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug)]
pub enum DatasetError {
    Io(io::Error),
    Http(reqwest::Error),
    Docker(String),
}

impl From<io::Error> for DatasetError {
    fn from(err: io::Error) -> Self {
        DatasetError::Io(err)
    }
}

impl From<reqwest::Error> for DatasetError {
    fn from(err: reqwest::Error) -> Self {
        DatasetError::Http(err)
    }
}

/// A prepared extract, ready to mount at `/data`.
#[derive(Debug, Clone)]
pub struct PreparedRegion {
    pub data_dir: PathBuf,
    /// File name of the `.osrm` base inside `data_dir`.
    pub osrm_file: String,
}

impl PreparedRegion {
    /// `region` is a Geofabrik path such as `asia/india/western-zone`.
    pub fn ensure(region: &str, data_root: &Path) -> Result<Self, DatasetError> {
        let short_name = region.rsplit('/').next().unwrap_or("region");
        let data_dir = if data_root.is_absolute() {
            data_root.join(short_name)
        } else {
            std::env::current_dir()?.join(data_root).join(short_name)
        };
        fs::create_dir_all(&data_dir)?;

        let pbf_file = format!("{short_name}-latest.osm.pbf");
        let osrm_file = format!("{short_name}-latest.osrm");

        let pbf_path = data_dir.join(&pbf_file);
        if !pbf_path.exists() {
            let url = format!("https://download.geofabrik.de/{region}-latest.osm.pbf");
            let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
            let partial = pbf_path.with_extension("part");
            fs::write(&partial, &bytes)?;
            fs::rename(partial, &pbf_path)?;
        }

        let osrm_path = data_dir.join(&osrm_file);
        if !osrm_path.exists() {
            osrm_tool(&data_dir, &["osrm-extract", "-p", "/opt/car.lua", &format!("/data/{pbf_file}")])?;
        }
        let partitioned = ["partition", "mldgr", "cells"]
            .iter()
            .all(|ext| data_dir.join(format!("{osrm_file}.{ext}")).exists());
        if !partitioned {
            osrm_tool(&data_dir, &["osrm-partition", &format!("/data/{osrm_file}")])?;
            osrm_tool(&data_dir, &["osrm-customize", &format!("/data/{osrm_file}")])?;
        }

        Ok(Self { data_dir, osrm_file })
    }
}

fn osrm_tool(data_dir: &Path, args: &[&str]) -> Result<(), DatasetError> {
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg("osrm/osrm-backend")
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(DatasetError::Docker(format!("{} exited with {}", args[0], status)))
    }
}
