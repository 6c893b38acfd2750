use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::HasId;

/// Categories offered on the public articles page
pub const ARTICLE_CATEGORIES: &[(&str, &str)] = &[
    ("Cancer", "Oncology research, treatments, and patient care"),
    ("Neurology", "Brain, nervous system, and neurological conditions"),
    ("Cardiology", "Heart health, cardiovascular diseases, and treatments"),
    ("Diabetes", "Blood sugar management and diabetes care"),
    ("Nutrition", "Diet, nutrition science, and healthy eating"),
    ("Clinical Trials", "Medical research and clinical study findings"),
    ("Psychology", "Mental health, behavior, and psychological well-being"),
    ("Physiology", "Body functions, systems, and biological processes"),
];

// Articles are stored by the backend with either camelCase or PascalCase
// keys depending on how they were imported, so accept both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(alias = "Title", default)]
    pub title: String,
    #[serde(alias = "Category", default)]
    pub category: String,
    #[serde(rename = "shortDescription", alias = "ShortDescription", default)]
    pub short_description: Option<String>,
    #[serde(alias = "Content", default)]
    pub content: Option<String>,
    #[serde(rename = "imageUrl", alias = "ImageURL", alias = "ImageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "sourceLink", alias = "SourceLink", default)]
    pub source_link: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl HasId for Article {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Create/update payload for the admin article editor
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArticleInput {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "ShortDescription")]
    pub short_description: String,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "ImageURL")]
    pub image_url: String,
    #[serde(rename = "SourceLink")]
    pub source_link: String,
}

impl ArticleInput {
    /// Title and category are the only fields the editor insists on
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() || self.category.trim().is_empty() {
            return Err("Title and category are required".to_string());
        }
        Ok(())
    }
}

impl From<&Article> for ArticleInput {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            category: article.category.clone(),
            short_description: article.short_description.clone().unwrap_or_default(),
            content: article.content.clone().unwrap_or_default(),
            image_url: article.image_url.clone().unwrap_or_default(),
            source_link: article.source_link.clone().unwrap_or_default(),
        }
    }
}
