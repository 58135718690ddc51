//! Domain models for rxpad.

mod form;
mod record;
mod settings;

pub use form::*;
pub use record::*;
pub use settings::*;
