use serde::{Deserialize, Serialize};

/// Contents of the `config/features` document.
///
/// Passed explicitly into whatever needs it instead of being read from shared
/// global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    /// Shows and permits the destructive "delete all videos" action.
    pub is_delete_all_enabled: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self { is_delete_all_enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let flags: FeatureFlags = serde_json::from_str("{}").unwrap();
        assert!(flags.is_delete_all_enabled);
    }

    #[test]
    fn reads_document_field_name() {
        let flags: FeatureFlags =
            serde_json::from_str(r#"{"isDeleteAllEnabled": false}"#).unwrap();
        assert!(!flags.is_delete_all_enabled);
    }
}
