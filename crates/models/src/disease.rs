use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors;

pub const NAME_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 2000;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "disease")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("name must be at most {NAME_MAX_LEN} characters")));
    }
    Ok(())
}

pub fn validate_description(description: Option<&str>) -> Result<(), errors::ModelError> {
    match description {
        Some(d) if d.chars().count() > DESCRIPTION_MAX_LEN => Err(errors::ModelError::Validation(
            format!("description must be at most {DESCRIPTION_MAX_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("flu").is_ok());
    }

    #[test]
    fn name_length_counts_characters() {
        let at_limit = "é".repeat(NAME_MAX_LEN);
        assert!(validate_name(&at_limit).is_ok());
        let over = "a".repeat(NAME_MAX_LEN + 1);
        assert!(matches!(validate_name(&over), Err(errors::ModelError::Validation(_))));
    }

    #[test]
    fn description_is_optional_but_bounded() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("")).is_ok());
        let over = "x".repeat(DESCRIPTION_MAX_LEN + 1);
        assert!(validate_description(Some(&over)).is_err());
    }
}
