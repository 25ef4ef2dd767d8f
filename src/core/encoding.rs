use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder shown first in every selection list; never a valid label
pub const UNSELECTED: &str = "Select";

/// Errors raised by the encoding tables
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("Unknown label '{label}' for {schema}")]
    UnknownLabel { schema: Schema, label: String },

    #[error("Unknown code {code} for {schema}")]
    UnknownCode { schema: Schema, code: u32 },
}

/// Categorical features, in the column order the model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Schema {
    ExperienceLevel,
    EmploymentType,
    JobTitle,
    CompanyLocation,
    CompanySize,
}

impl Schema {
    /// Every schema, in model column order
    pub const ALL: [Schema; 5] = [
        Schema::ExperienceLevel,
        Schema::EmploymentType,
        Schema::JobTitle,
        Schema::CompanyLocation,
        Schema::CompanySize,
    ];

    /// Column index in the model input
    pub const fn position(self) -> usize {
        match self {
            Schema::ExperienceLevel => 0,
            Schema::EmploymentType => 1,
            Schema::JobTitle => 2,
            Schema::CompanyLocation => 3,
            Schema::CompanySize => 4,
        }
    }

    /// Column name used by the dataset and the model artifact
    pub const fn field_name(self) -> &'static str {
        match self {
            Schema::ExperienceLevel => "experience_level",
            Schema::EmploymentType => "employment_type",
            Schema::JobTitle => "job_title",
            Schema::CompanyLocation => "company_location",
            Schema::CompanySize => "company_size",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Schema::ExperienceLevel => "Experience Level",
            Schema::EmploymentType => "Employment Type",
            Schema::JobTitle => "Job Title",
            Schema::CompanyLocation => "Company Location",
            Schema::CompanySize => "Company Size",
        }
    }

    /// Labels in code order: the index of a label is its code
    pub const fn table(self) -> &'static [&'static str] {
        match self {
            Schema::ExperienceLevel => EXPERIENCE_LEVELS,
            Schema::EmploymentType => EMPLOYMENT_TYPES,
            Schema::JobTitle => JOB_TITLES,
            Schema::CompanyLocation => COMPANY_LOCATIONS,
            Schema::CompanySize => COMPANY_SIZES,
        }
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

const EXPERIENCE_LEVELS: &[&str] = &["Entry-Level", "Executive-Level", "Mid-Level", "Senior-Level"];

const EMPLOYMENT_TYPES: &[&str] = &["Contract", "Freelance", "Full-Time", "Part-Time"];

const COMPANY_SIZES: &[&str] = &["Large", "Medium", "Small"];

const COMPANY_LOCATIONS: &[&str] = &[
    "AE", "AM", "AR", "AS", "AT", "AU", "BE", "BR", "CA", "CF", "CH", "CO", "DE", "DK",
    "EC", "EE", "EG", "ES", "FI", "FR", "GB", "GH", "GR", "HN", "IE", "IL", "IN",
    "IQ", "IT", "JP", "KR", "LT", "LU", "LV", "MT", "MX", "MY", "NG", "NL", "NZ",
    "PH", "PK", "PL", "PT", "RO", "RU", "SE", "SG", "SI", "TH", "TR", "UA", "US",
    "VN", "ZA",
];

const JOB_TITLES: &[&str] = &[
    "AI Architect",
    "AI Developer",
    "AI Engineer",
    "AI Programmer",
    "AI Research Engineer",
    "AI Research Scientist",
    "AI Scientist",
    "AWS Data Architect",
    "Analytics Engineer",
    "Applied Data Scientist",
    // 10
    "Applied Machine Learning Scientist",
    "Applied Scientist",
    "Autonomous Vehicle Technician",
    "BI Analyst",
    "BI Data Analyst",
    "BI Data Engineer",
    "BI Developer",
    "Big Data Architect",
    "Big Data Developer",
    "Big Data Engineer",
    // 20
    "Business Data Analyst",
    "Business Intelligence",
    "Business Intelligence Analyst",
    "Business Intelligence Developer",
    "Business Intelligence Engineer",
    "Business Intelligence Lead",
    "Business Intelligence Manager",
    "Business Intelligence Specialist",
    "CRM Data Analyst",
    "Cloud Data Engineer",
    // 30
    "Cloud Database Engineer",
    "Computational Biologist",
    "Computer Vision Engineer",
    "Computer Vision Software Engineer",
    "Data Analyst",
    "Data Analyst Lead",
    "Data Analytics Consultant",
    "Data Analytics Engineer",
    "Data Analytics Lead",
    "Data Analytics Manager",
    // 40
    "Data Analytics Specialist",
    "Data Architect",
    "Data DevOps Engineer",
    "Data Developer",
    "Data Engineer",
    "Data Infrastructure Engineer",
    "Data Integration Developer",
    "Data Integration Engineer",
    "Data Integration Specialist",
    "Data Lead",
    // 50
    "Data Management Analyst",
    "Data Management Consultant",
    "Data Management Specialist",
    "Data Manager",
    "Data Modeler",
    "Data Modeller",
    "Data Operations Analyst",
    "Data Operations Associate",
    "Data Operations Engineer",
    "Data Operations Specialist",
    // 60
    "Data Pipeline Engineer",
    "Data Product Manager",
    "Data Quality Analyst",
    "Data Quality Engineer",
    "Data Reporting Analyst",
    "Data Science",
    "Data Science Analyst",
    "Data Science Consultant",
    "Data Science Director",
    "Data Science Engineer",
    // 70
    "Data Science Lead",
    "Data Science Manager",
    "Data Science Practitioner",
    "Data Scientist",
    "Data Specialist",
    "Data Strategist",
    "Data Visualization Engineer",
    "Data Visualization Specialist",
    "Decision Scientist",
    "Deep Learning Engineer",
    // 80
    "Director of Data Science",
    "ETL Developer",
    "ETL Engineer",
    "Encounter Data Management Professional",
    "Finance Data Analyst",
    "Financial Data Analyst",
    "Head of Data",
    "Head of Data Science",
    "Head of Machine Learning",
    "Insight Analyst",
    // 90
    "Lead Data Analyst",
    "Lead Data Engineer",
    "Lead Data Scientist",
    "Lead Machine Learning Engineer",
    "ML Engineer",
    "ML Ops Engineer",
    "MLOps Engineer",
    "Machine Learning Developer",
    "Machine Learning Engineer",
    "Machine Learning Infrastructure Engineer",
    // 100
    "Machine Learning Manager",
    "Machine Learning Modeler",
    "Machine Learning Operations Engineer",
    "Machine Learning Research Engineer",
    "Machine Learning Researcher",
    "Machine Learning Scientist",
    "Machine Learning Software Engineer",
    "Marketing Data Engineer",
    "NLP Engineer",
    "Principal Data Analyst",
    // 110
    "Principal Data Scientist",
    "Product Data Analyst",
    "Prompt Engineer",
    "Quantitative Research Analyst",
    "Research Analyst",
    "Research Engineer",
    "Research Scientist",
    "Robotics Engineer",
    "Robotics Software Engineer",
    "Sales Data Analyst",
    // 120
    "Staff Data Analyst",
    "Staff Data Scientist",
    "Staff Machine Learning Engineer",
];

/// Resolve a label to the integer code the model was fit on
pub fn label_to_code(schema: Schema, label: &str) -> Result<u32, EncodingError> {
    schema
        .table()
        .iter()
        .position(|candidate| *candidate == label)
        .map(|index| index as u32)
        .ok_or_else(|| EncodingError::UnknownLabel {
            schema,
            label: label.to_string(),
        })
}

/// Reverse lookup, used when describing a built feature vector
pub fn code_to_label(schema: Schema, code: u32) -> Option<&'static str> {
    schema.table().get(code as usize).copied()
}

/// Options for a selection list: the placeholder first, then labels in code order
pub fn labels(schema: Schema) -> Vec<&'static str> {
    std::iter::once(UNSELECTED)
        .chain(schema.table().iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_sizes() {
        assert_eq!(Schema::ExperienceLevel.table().len(), 4);
        assert_eq!(Schema::EmploymentType.table().len(), 4);
        assert_eq!(Schema::JobTitle.table().len(), 123);
        assert_eq!(Schema::CompanyLocation.table().len(), 55);
        assert_eq!(Schema::CompanySize.table().len(), 3);
    }

    #[test]
    fn test_labels_unique_per_schema() {
        for schema in Schema::ALL {
            let unique: HashSet<_> = schema.table().iter().collect();
            assert_eq!(unique.len(), schema.table().len(), "duplicate label in {}", schema);
            assert!(!unique.contains(&UNSELECTED));
        }
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(label_to_code(Schema::ExperienceLevel, "Entry-Level"), Ok(0));
        assert_eq!(label_to_code(Schema::ExperienceLevel, "Senior-Level"), Ok(3));
        assert_eq!(label_to_code(Schema::EmploymentType, "Full-Time"), Ok(2));
        assert_eq!(label_to_code(Schema::JobTitle, "AI Architect"), Ok(0));
        assert_eq!(label_to_code(Schema::JobTitle, "Data Scientist"), Ok(73));
        assert_eq!(label_to_code(Schema::JobTitle, "Machine Learning Engineer"), Ok(98));
        assert_eq!(label_to_code(Schema::JobTitle, "Staff Machine Learning Engineer"), Ok(122));
        assert_eq!(label_to_code(Schema::CompanyLocation, "US"), Ok(52));
        assert_eq!(label_to_code(Schema::CompanyLocation, "ZA"), Ok(54));
        assert_eq!(label_to_code(Schema::CompanySize, "Medium"), Ok(1));
    }

    #[test]
    fn test_unknown_label() {
        let err = label_to_code(Schema::CompanySize, "Huge").unwrap_err();
        assert_eq!(
            err,
            EncodingError::UnknownLabel {
                schema: Schema::CompanySize,
                label: "Huge".to_string()
            }
        );
        assert!(label_to_code(Schema::JobTitle, UNSELECTED).is_err());
        // Lookup is exact
        assert!(label_to_code(Schema::CompanyLocation, "us").is_err());
    }

    #[test]
    fn test_labels_start_with_placeholder() {
        for schema in Schema::ALL {
            let options = labels(schema);
            assert_eq!(options[0], UNSELECTED);
            assert_eq!(options.len(), schema.table().len() + 1);
            assert_eq!(&options[1..], schema.table());
        }
    }

    #[test]
    fn test_code_round_trip_through_reverse_lookup() {
        assert_eq!(code_to_label(Schema::JobTitle, 73), Some("Data Scientist"));
        assert_eq!(code_to_label(Schema::CompanySize, 3), None);
    }

    #[test]
    fn test_positions_follow_model_order() {
        for (index, schema) in Schema::ALL.iter().enumerate() {
            assert_eq!(schema.position(), index);
        }
    }
}
