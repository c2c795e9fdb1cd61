//! Helper functions for page rendering

mod date;
mod html;

pub use date::*;
pub use html::*;
