use std::{fs::File, io::BufReader, path::Path};

use crate::site::Site;

use super::LoadError;

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Site, LoadError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

pub fn load_from_str(data: &str) -> Result<Site, LoadError> {
    Ok(serde_json::from_str(data)?)
}

pub fn load_from_slice(data: &[u8]) -> Result<Site, LoadError> {
    Ok(serde_json::from_slice(data)?)
}
