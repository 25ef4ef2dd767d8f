use crate::core::encoding::Schema;
use crate::core::features::{Selection, Selections};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to predict a salary
///
/// Every field may be omitted or left on the placeholder; the builder
/// reports which ones are missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    #[serde(alias = "session_id")]
    pub session_id: Option<uuid::Uuid>,
    #[validate(length(max = 64))]
    #[serde(alias = "experience_level")]
    pub experience_level: Option<String>,
    #[validate(length(max = 64))]
    #[serde(alias = "employment_type")]
    pub employment_type: Option<String>,
    #[validate(length(max = 128))]
    #[serde(alias = "job_title")]
    pub job_title: Option<String>,
    #[validate(length(max = 8))]
    #[serde(alias = "company_location")]
    pub company_location: Option<String>,
    #[validate(length(max = 32))]
    #[serde(alias = "company_size")]
    pub company_size: Option<String>,
}

impl PredictRequest {
    fn raw(&self, schema: Schema) -> Option<&str> {
        match schema {
            Schema::ExperienceLevel => self.experience_level.as_deref(),
            Schema::EmploymentType => self.employment_type.as_deref(),
            Schema::JobTitle => self.job_title.as_deref(),
            Schema::CompanyLocation => self.company_location.as_deref(),
            Schema::CompanySize => self.company_size.as_deref(),
        }
    }

    pub fn selections(&self) -> Selections {
        let mut selections = Selections::new();
        for schema in Schema::ALL {
            selections.set(schema, Selection::parse(self.raw(schema)));
        }
        selections
    }
}

/// Query for reading back the last prediction
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PredictionQuery {
    #[validate(length(min = 3, max = 3))]
    pub currency: Option<String>,
}
