//! Mode routing
//!
//! - Server mode (HTTP server, default)
//! - Id mode (print the identifier for a URL)
//! - Config mode (sample configuration)

pub mod config;
pub mod id;
pub mod server;

pub use config::generate_config;
pub use id::print_id;
pub use server::run_server;
