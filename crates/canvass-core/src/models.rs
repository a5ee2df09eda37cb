//! Domain models for Canvass.
//!
//! These are the core types shared across all crates.

pub mod admin;
pub mod dropdown;
pub mod setting;
pub mod tenant;
pub mod user;
