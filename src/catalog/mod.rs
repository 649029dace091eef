//! Barcode product lookup.

pub mod client;
pub mod handlers;

pub use client::{CatalogClient, CatalogConfig, ProductLookup};
