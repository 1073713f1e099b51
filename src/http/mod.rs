//! HTTP transport module
//!
//! Executes realized requests one at a time. Suspension points of the
//! whole engine are exactly the awaits in here (plus whatever network I/O
//! an adapter's auth flow performs).

mod transport;

pub use transport::{run_request, HttpResponse};
