// CareTrack data layer
//
// Storage models, the in-memory document store, the list-query builder and
// the per-entity repositories.

pub mod models;
pub mod query;
pub mod repository;
pub mod store;
