//! Prescription documents and share links.

pub mod layout;
mod metrics;
mod pdf;
mod share;

pub use layout::{layout_prescription, numbered_medicines, DocumentLayout, PageLayout, TextItem};
pub use metrics::*;
pub use pdf::*;
pub use share::*;
