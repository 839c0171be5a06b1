use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoint
        crate::api::handlers::health::health_check,

        // Patient endpoints
        crate::api::handlers::patients::list_patients,
        crate::api::handlers::patients::create_patient,
        crate::api::handlers::patients::get_patient,
        crate::api::handlers::patients::update_patient,
        crate::api::handlers::patients::delete_patient,

        // Medication endpoints
        crate::api::handlers::medications::list_medications,
        crate::api::handlers::medications::create_medication,
        crate::api::handlers::medications::get_medication,
        crate::api::handlers::medications::update_medication,
        crate::api::handlers::medications::delete_medication,
        crate::api::handlers::medications::mark_dose_taken,
        crate::api::handlers::medications::patient_medications,

        // Reading endpoints
        crate::api::handlers::readings::list_readings,
        crate::api::handlers::readings::create_reading,
        crate::api::handlers::readings::get_reading,
        crate::api::handlers::readings::patient_readings,

        // Analysis endpoints
        crate::api::handlers::analysis::analyze,
        crate::api::handlers::analysis::ranges
    ),
    components(
        schemas(
            // Storage models
            caretrack_data::models::Patient,
            caretrack_data::models::Gender,
            caretrack_data::models::BloodType,
            caretrack_data::models::EmergencyContact,
            caretrack_data::models::InsuranceInfo,
            caretrack_data::models::CreatePatientRequest,
            caretrack_data::models::UpdatePatientRequest,
            caretrack_data::models::Medication,
            caretrack_data::models::MedicationStatus,
            caretrack_data::models::Dosage,
            caretrack_data::models::DoseSlot,
            caretrack_data::models::CreateMedicationRequest,
            caretrack_data::models::UpdateMedicationRequest,
            caretrack_data::models::Reading,
            caretrack_data::models::ReadingKind,
            caretrack_data::models::ReadingStatus,
            caretrack_data::models::ReadingValue,
            caretrack_data::models::CreateReadingRequest,
            caretrack_data::query::Pagination,
            caretrack_data::query::PageLink,

            // Domain schemas
            caretrack_domain::analysis::Classification,

            // Handler schemas
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::medications::MarkTakenRequest,
            crate::api::handlers::analysis::AnalyzeRequest,

            // Response envelopes
            crate::entities::common::PatientEnvelope,
            crate::entities::common::PatientListEnvelope,
            crate::entities::common::MedicationEnvelope,
            crate::entities::common::MedicationListEnvelope,
            crate::entities::common::ReadingEnvelope,
            crate::entities::common::ReadingListEnvelope,
            crate::entities::common::AnalysisEnvelope
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "patients", description = "Patient record management"),
        (name = "medications", description = "Medication and dose schedule management"),
        (name = "readings", description = "Vital-sign reading capture and retrieval"),
        (name = "analysis", description = "Reading classification and reference ranges")
    ),
    info(
        title = "CareTrack API",
        version = "0.1.0",
        description = "API for tracking patients, medications and vital-sign readings",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "CareTrack API");
        assert_eq!(openapi.info.version, "0.1.0");

        let paths = &openapi.paths.paths;
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/api/patients"));
        assert!(paths.contains_key("/api/patients/{id}"));
        assert!(paths.contains_key("/api/medications/{id}/taken"));
        assert!(paths.contains_key("/api/readings"));
        assert!(paths.contains_key("/api/ai/analyze"));
        assert!(paths.contains_key("/api/ai/ranges"));
    }
}
