//! Public HTTP layer for CareTrack.
//!
//! Exposes the REST surface over the domain services: patients,
//! medications, vital-sign readings and the reading analyzer.

pub mod api;
pub mod entities;
pub mod openapi;
