//! # atelier-migrations
//!
//! The immutable, version-ascending list of every upgrade atelier has ever
//! shipped. Call [`Registry::builtin`] to get it; ordering is checked when the
//! registry is built.

pub mod error;
pub mod migrations;
pub mod registry;
mod text;

pub use error::RegistryError;
pub use registry::Registry;
