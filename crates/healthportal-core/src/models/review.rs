use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HasId, User, UserRef};

/// Highest star rating a review can carry
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub medicine_name: Option<String>,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub review_title: Option<String>,
    #[serde(default)]
    pub review_text: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    pub fn author(&self) -> Option<&User> {
        self.user.as_ref().and_then(UserRef::user)
    }
}

impl HasId for Review {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub medicine_name: String,
    pub rating: u8,
    pub review_title: String,
    pub review_text: String,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), String> {
        if self.medicine_name.trim().is_empty()
            || self.review_title.trim().is_empty()
            || self.review_text.trim().is_empty()
            || self.rating == 0
        {
            return Err("Please fill all fields and select a rating.".to_string());
        }
        if self.rating > MAX_RATING {
            return Err(format!("Rating must be between 1 and {}", MAX_RATING));
        }
        Ok(())
    }
}

/// Admin moderation edit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub rating: u8,
    pub review_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: u8) -> NewReview {
        NewReview {
            medicine_name: "Metformin".to_string(),
            rating,
            review_title: "Works".to_string(),
            review_text: "Stable sugar levels".to_string(),
        }
    }

    #[test]
    fn test_new_review_validation() {
        assert!(review(4).validate().is_ok());
        assert_eq!(
            review(0).validate().unwrap_err(),
            "Please fill all fields and select a rating."
        );
        assert!(review(6).validate().is_err());

        let mut blank = review(3);
        blank.review_text = "   ".to_string();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_review_with_populated_user() {
        let json = r#"{"_id":"r1","medicineName":"Insulin","rating":5,"user":{"_id":"u1","firstName":"Sam"}}"#;
        let review: Review = serde_json::from_str(json).unwrap();
        assert_eq!(review.author().unwrap().first_name.as_deref(), Some("Sam"));
    }
}
