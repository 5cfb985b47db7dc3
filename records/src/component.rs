//! Component records: independent named entries with a free-text description.

use serde::{Deserialize, Serialize};

use crate::messages;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ComponentInputError {
    #[error("{}", messages::EMPTY_COMPONENT_NAME)]
    EmptyName,
}

/// Trim a new component's fields. The name is required, the description is not.
///
/// # Errors
///
/// Returns [`ComponentInputError::EmptyName`] if the trimmed name is empty.
pub fn normalize_component_input(name: &str, description: Option<&str>) -> Result<(String, String), ComponentInputError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ComponentInputError::EmptyName);
    }
    let description = description.map(str::trim).unwrap_or_default();
    Ok((name.to_owned(), description.to_owned()))
}

/// Case-insensitive substring filter on component name, order preserved.
#[must_use]
pub fn filter_components(items: &[Component], term: &str) -> Vec<Component> {
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
