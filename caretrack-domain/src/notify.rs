//! Notification handle.
//!
//! The transport is currently inert: alerts and reminders are logged, not
//! delivered. The handle is constructed once at startup and passed to the
//! services that need it rather than reached through a global.

use tracing::{info, warn};
use uuid::Uuid;

use caretrack_data::models::{ReadingKind, ReadingStatus};

/// Process-wide notification handle
#[derive(Debug, Clone, Default)]
pub struct Notifier;

impl Notifier {
    /// Create a notifier. Reads no configuration while the transport is
    /// logging-only.
    pub fn new() -> Self {
        Self
    }

    /// Alert healthcare professionals about a critical reading
    pub fn critical_alert(&self, patient_id: Uuid, kind: ReadingKind, status: ReadingStatus) {
        warn!(
            "CRITICAL READING ALERT for patient {}: {} reading is {:?}",
            patient_id,
            kind.as_str(),
            status
        );
    }

    /// Remind a patient to take a medication
    pub fn medication_reminder(&self, patient_id: Uuid, medication_name: &str) {
        info!(
            "Medication reminder for patient {}: {}",
            patient_id, medication_name
        );
    }
}
