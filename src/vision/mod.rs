//! AI invoice extraction.

pub mod client;
pub mod handlers;

pub use client::{ParsedInvoiceItem, VisionClient, VisionConfig, VisionError};
