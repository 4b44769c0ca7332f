//! CLI command implementations

pub mod build;
pub mod config;
pub mod fingerprint;
mod model;
pub mod run;
pub mod store;

pub use build::execute as build;
pub use config::execute as config;
pub use fingerprint::execute as fingerprint;
pub use run::execute as run;
pub use store::execute as store;
