//! Small shared rendering helpers.

pub mod fmt;
pub mod status;
