use serde::{Deserialize, Serialize};

/// How `DataProvider::set_cell` treats input that does not validate as typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPolicy {
    /// Apply the column type's auto-correction (case transform, snapping to
    /// a dropdown option) first; reject only if the corrected value still
    /// fails validation.
    #[default]
    AutoCorrect,
    /// Store exactly what was parsed or reject it.
    Strict,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub edit_policy: EditPolicy,
}

impl ProviderConfig {
    pub fn strict() -> Self {
        Self {
            edit_policy: EditPolicy::Strict,
        }
    }
}
