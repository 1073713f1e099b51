//! YAML parser for endpoint descriptors
//!
//! Parses and validates descriptor files. Validation is structural only:
//! required names, a resolvable plugin identifier, and the pairwise key
//! list parity the rekeying merger depends on.

use crate::error::{Error, Result};
use crate::loader::types::{Descriptor, EndpointDescriptor};
use std::fs;
use std::path::{Path, PathBuf};

/// Load a descriptor from a YAML file
pub fn load_descriptor(path: impl AsRef<Path>) -> Result<Descriptor> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read descriptor file '{}': {e}",
            path.display()
        ))
    })?;
    load_descriptor_from_str(&content)
}

/// Load a descriptor from a YAML string
pub fn load_descriptor_from_str(yaml: &str) -> Result<Descriptor> {
    let descriptor: Descriptor = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse descriptor YAML: {e}")))?;
    validate_descriptor(&descriptor)?;
    Ok(descriptor)
}

/// List the descriptor files in a config directory, in name order.
///
/// Only `.yaml` / `.yml` entries are returned; the deterministic ordering
/// makes the observable traversal order independent of the filesystem.
pub fn list_descriptor_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::config(format!(
            "Unable to read config directory '{}': {e}",
            dir.display()
        ))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Validate a descriptor
fn validate_descriptor(descriptor: &Descriptor) -> Result<()> {
    if descriptor.name.is_empty() {
        return Err(Error::config("Descriptor name cannot be empty"));
    }
    if descriptor.plugin.is_empty() {
        return Err(Error::config(format!(
            "Descriptor '{}' must name a plugin",
            descriptor.name
        )));
    }
    for endpoint in &descriptor.endpoints {
        validate_endpoint(endpoint)?;
    }
    Ok(())
}

/// Validate an endpoint and its children
fn validate_endpoint(endpoint: &EndpointDescriptor) -> Result<()> {
    if endpoint.name.is_empty() {
        return Err(Error::config("Endpoint name cannot be empty"));
    }
    if endpoint.current_base_key.len() != endpoint.desired_base_key.len()
        || endpoint.current_error_key.len() != endpoint.desired_error_key.len()
    {
        return Err(Error::KeyListMismatch {
            endpoint: endpoint.name.clone(),
        });
    }
    for children in endpoint.endpoints.values() {
        for child in children {
            validate_endpoint(child)?;
        }
    }
    Ok(())
}
