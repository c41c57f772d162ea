use models::disease;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Properties the list endpoint accepts in `sort=`.
pub const SORTABLE_PROPERTIES: &[&str] = &["id", "name", "description"];

/// Wire representation of a disease. `id` is absent before creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseDto {
    #[serde(default)]
    pub id: Option<i64>,
    /// Missing in the body reads as blank and fails validation.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl DiseaseDto {
    pub fn validate(&self) -> Result<(), ServiceError> {
        disease::validate_name(&self.name)?;
        disease::validate_description(self.description.as_deref())?;
        Ok(())
    }
}

impl From<disease::Model> for DiseaseDto {
    fn from(m: disease::Model) -> Self {
        Self { id: Some(m.id), name: m.name, description: m.description }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_id_deserializes_to_none() {
        let dto: DiseaseDto = serde_json::from_str(r#"{"name":"flu"}"#).unwrap();
        assert_eq!(dto.id, None);
        let dto: DiseaseDto = serde_json::from_str(r#"{"id":null,"name":"flu"}"#).unwrap();
        assert_eq!(dto.id, None);
        let dto: DiseaseDto = serde_json::from_str(r#"{"id":7,"name":"flu"}"#).unwrap();
        assert_eq!(dto.id, Some(7));
    }

    #[test]
    fn missing_description_is_serialized_as_null() {
        let dto = DiseaseDto::from(disease::Model { id: 1, name: "flu".into(), description: None });
        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            serde_json::json!({"id": 1, "name": "flu", "description": null})
        );
    }

    #[test]
    fn missing_name_reads_as_blank_and_fails_validation() {
        let dto: DiseaseDto = serde_json::from_str(r#"{"id":5}"#).unwrap();
        assert_eq!(dto.name, "");
        assert!(dto.validate().is_err());
    }

    #[test]
    fn validate_surfaces_model_errors() {
        let dto = DiseaseDto { id: None, name: "  ".into(), description: None };
        assert!(matches!(dto.validate(), Err(ServiceError::Model(_))));
    }
}
