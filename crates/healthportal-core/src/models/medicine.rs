use serde::{Deserialize, Serialize};

use super::HasId;
use crate::utils::split_list;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub side_effect: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl HasId for Medicine {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub usage: String,
    pub side_effect: Vec<String>,
    pub category: String,
    pub tags: Vec<String>,
}

impl MedicineInput {
    /// Build a payload from form-style input where side effects and tags
    /// are comma separated.
    pub fn from_form(
        title: &str,
        usage: &str,
        category: &str,
        side_effects: &str,
        tags: &str,
        image_url: Option<&str>,
    ) -> Self {
        Self {
            title: title.trim().to_string(),
            image_url: image_url
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            usage: usage.trim().to_string(),
            side_effect: split_list(side_effects),
            category: category.trim().to_string(),
            tags: split_list(tags),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_empty() || self.usage.is_empty() || self.category.is_empty() {
            return Err("Title, usage and category are required".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_form_splits_lists() {
        let input = MedicineInput::from_form(
            " Ibuprofen ",
            "Pain relief",
            "Analgesic",
            "nausea, , heartburn",
            "nsaid,otc",
            Some("  "),
        );
        assert_eq!(input.title, "Ibuprofen");
        assert_eq!(input.side_effect, vec!["nausea", "heartburn"]);
        assert_eq!(input.tags, vec!["nsaid", "otc"]);
        assert!(input.image_url.is_none());
        assert!(input.validate().is_ok());

        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("imageUrl").is_none());
        assert_eq!(json["sideEffect"][1], "heartburn");
    }

    #[test]
    fn test_validate_requires_core_fields() {
        let input = MedicineInput::from_form("Aspirin", "", "Analgesic", "", "", None);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_medicine_defaults_missing_lists() {
        let med: Medicine = serde_json::from_str(r#"{"_id":"m1","title":"Metformin","category":"Diabetes"}"#).unwrap();
        assert!(med.side_effect.is_empty());
        assert!(med.tags.is_empty());
    }
}
