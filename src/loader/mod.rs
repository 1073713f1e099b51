//! Descriptor loader module
//!
//! Parse endpoint descriptors from YAML files and expand variable
//! matrices.
//!
//! # Overview
//!
//! The loader module provides:
//! - `Descriptor` / `EndpointDescriptor` - declarative endpoint tree
//! - `expand_vars_data` - cartesian matrix expansion over raw YAML
//! - YAML parsing with structural validation

mod expand;
mod parser;
mod types;

pub use expand::expand_vars_data;
pub use parser::{list_descriptor_files, load_descriptor, load_descriptor_from_str};
pub use types::{Descriptor, EndpointDescriptor, ParamBags};
