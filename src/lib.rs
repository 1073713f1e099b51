//! # Harvester
//!
//! A configuration-driven API harvesting engine: point it at a directory
//! of declarative YAML endpoint descriptors and a backend adapter, and it
//! performs authenticated HTTP requests, follows paginated responses to
//! completion, fans out child endpoints parameterized by values extracted
//! from parent responses, and merges everything captured into a single
//! normalized JSON document keyed by the target schema the descriptors
//! declare.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use harvester::{HarvestOptions, Harvester};
//!
//! #[tokio::main]
//! async fn main() -> harvester::Result<()> {
//!     let options = HarvestOptions::new("configs/")
//!         .with_auth_params(vec!["header".into(), "PRIVATE-TOKEN".into(), token]);
//!     let document = Harvester::new().harvest(&options).await?;
//!     println!("{}", String::from_utf8_lossy(&document));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Harvester::harvest                      │
//! │  load descriptors → expand var matrix → bind adapter         │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────┬──────────┬────────┴─────┬─────────────┬───────────┐
//! │ Template │  Paging  │   Fan-out    │  Adapters   │   Merge   │
//! ├──────────┼──────────┼──────────────┼─────────────┼───────────┤
//! │ {{vars}} │ peek     │ parent keys  │ auth        │ extract   │
//! │ {{time}} │ full_url │ child clones │ normalize   │ rekey     │
//! │ matrix   │ calc     │ one level    │ post-process│ collapse  │
//! └──────────┴──────────┴──────────────┴─────────────┴───────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the engine
pub mod error;

/// Common types and type aliases
pub mod types;

/// Descriptor model, YAML parsing, and variable matrix expansion
pub mod loader;

/// Template substitution and time tokens
pub mod template;

/// Dotted key path extract / insert over JSON values
pub mod jsonpath;

/// Effective requests and fingerprints
pub mod request;

/// Credential-flow helpers
pub mod auth;

/// Adapter contract, registry, and built-in backends
pub mod adapter;

/// HTTP transport
pub mod http;

/// Endpoint traversal engine
pub mod engine;

/// Post-processing merger
pub mod postprocess;

/// Dashboard progress reporter
pub mod reporter;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use adapter::{Adapter, AdapterRegistry};
pub use engine::{HarvestOptions, Harvester};
pub use error::{Error, Result};
pub use loader::{Descriptor, EndpointDescriptor};
pub use request::{EffectiveRequest, Fingerprint, ResponseMap};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
