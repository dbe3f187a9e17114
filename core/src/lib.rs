//! stormlink-core: links insurance claims to named tropical storms.
//!
//! STAGE ORDER (fixed, see pipeline.rs):
//!   build catalog -> persist catalog -> reload catalog
//!   -> link claims -> aggregate -> report

pub mod aggregate;
pub mod catalog_file;
pub mod claims;
pub mod config;
pub mod error;
pub mod event;
pub mod ibtracs;
pub mod inflation;
pub mod linker;
pub mod pipeline;
pub mod storm;
pub mod store;
pub mod types;
