//! parkatlas - Consolidate OpenStreetMap and official parking areas into one geocoded dataset

pub mod api;
pub mod config;
pub mod domain;
pub mod geometry;
pub mod io;
pub mod pipeline;
