//! Filter request log and its reports.

pub mod events;
pub mod reporter;
