//! Core utilities shared across the crate.

mod mt_resource;

pub use mt_resource::MtResource;
