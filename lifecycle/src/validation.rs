//! Field limits shared by every entry point.

use crate::LifecycleError;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

fn bounded(field: &str, value: &str, max: usize) -> Result<(), LifecycleError> {
    if value.chars().count() > max {
        return Err(LifecycleError::Validation(format!(
            "field {field} failed validation: max={max}"
        )));
    }
    Ok(())
}

pub fn required(field: &str, value: &str) -> Result<(), LifecycleError> {
    if value.is_empty() {
        return Err(LifecycleError::Validation(format!("{field} required")));
    }
    Ok(())
}

pub fn name(value: &str) -> Result<(), LifecycleError> {
    bounded("name", value, MAX_NAME_LEN)
}

pub fn description(value: &str) -> Result<(), LifecycleError> {
    bounded("description", value, MAX_DESCRIPTION_LEN)
}

/// Both content fields of a new entity: present and within limits.
pub fn content(name_value: &str, description_value: &str) -> Result<(), LifecycleError> {
    required("name", name_value)?;
    required("description", description_value)?;
    name(name_value)?;
    description(description_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_count_characters_not_bytes() {
        let hundred_cyrillic: String = std::iter::repeat('ж').take(100).collect();
        assert!(name(&hundred_cyrillic).is_ok());
        assert!(name(&format!("{hundred_cyrillic}ж")).is_err());
    }

    #[test]
    fn content_requires_both_fields() {
        assert!(content("a", "b").is_ok());
        assert_eq!(
            content("", "b"),
            Err(LifecycleError::Validation("name required".into()))
        );
        assert!(content("a", &"x".repeat(501)).is_err());
    }
}
