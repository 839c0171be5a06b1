// CareTrack domain layer
//
// Business logic for the CareTrack application: reading classification,
// resource services with authorization, auth middleware, notifications and
// attachment handling.

// Vital-sign classification and reference ranges
pub mod analysis;

// Authentication and role checks
pub mod auth;

// Attachment normalization
pub mod imaging;

// Notification handle (logging-only transport)
pub mod notify;

// Services that implement business logic
pub mod services;
