//! Reads and writes networks and solver configuration.
//!
//! Networks may be TOML or JSON, chosen by the file extension; anything other
//! than `.json` is read as TOML.

use std::{fs, path::Path};

use serde::{de::DeserializeOwned, Serialize};

use crate::{config::SolverConfig, error::Result, network::NetworkDescription};

fn is_json(file_name: &Path) -> bool {
    file_name.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn read<T: DeserializeOwned>(file_name: &Path) -> Result<T> {
    let file_contents = fs::read_to_string(file_name)?;
    if is_json(file_name) {
        Ok(serde_json::from_str(&file_contents)?)
    } else {
        Ok(toml::from_str(&file_contents)?)
    }
}

fn write<T: Serialize>(file_name: &Path, value: &T) -> Result<()> {
    let contents = if is_json(file_name) {
        serde_json::to_string_pretty(value)?
    } else {
        toml::to_string(value)?
    };
    fs::write(file_name, contents)?;
    Ok(())
}

/// Reads a network from a file
pub fn parse_network(file_name: impl AsRef<Path>) -> Result<NetworkDescription> {
    read(file_name.as_ref())
}

/// Saves a network to a file
pub fn save_network(file_name: impl AsRef<Path>, network: &NetworkDescription) -> Result<()> {
    write(file_name.as_ref(), network)
}

/// Reads solver configuration from a TOML file; missing keys keep their defaults
pub fn parse_config(file_name: impl AsRef<Path>) -> Result<SolverConfig> {
    let file_contents = fs::read_to_string(file_name)?;
    Ok(toml::from_str(&file_contents)?)
}
