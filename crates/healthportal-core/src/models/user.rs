use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::HasId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    // Unrecognised roles get the least privilege
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.pad("user"),
            Role::Admin => f.pad("admin"),
        }
    }
}

/// A portal account as returned by the backend.
///
/// Every field is optional on the wire: the session identity is cached
/// exactly as the backend sent it, and profile fields this client does not
/// know about are kept in `extra` so they survive a save/load cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// "First Last", falling back to the email, then the id
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if !name.is_empty() {
            name.to_string()
        } else if let Some(ref email) = self.email {
            email.clone()
        } else {
            self.id.clone()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl HasId for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A reference to a user that the backend may or may not have populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated(User),
    Id(String),
}

impl UserRef {
    pub fn user(&self) -> Option<&User> {
        match self {
            UserRef::Populated(user) => Some(user),
            UserRef::Id(_) => None,
        }
    }
}

/// Signup form payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub gender: String,
}

/// Admin edit of a user account
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Profile returned by the identity provider's userinfo endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_accepts_minimal_identity() {
        let user: User = serde_json::from_str(r#"{"id":"u1","role":"user"}"#).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.role, Role::User);
        assert!(user.email.is_none());
    }

    #[test]
    fn test_user_mongo_id_and_unknown_fields() {
        let json = r#"{"_id":"abc","firstName":"Ada","role":"admin","isVerified":true}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "abc");
        assert!(user.is_admin());
        assert_eq!(user.extra.get("isVerified"), Some(&Value::Bool(true)));

        let saved = serde_json::to_string(&user).unwrap();
        assert!(saved.contains("isVerified"));
    }

    #[test]
    fn test_unknown_role_is_user() {
        let user: User = serde_json::from_str(r#"{"id":"x","role":"doctor"}"#).unwrap();
        assert_eq!(user.role, Role::User);

        let admin: User = serde_json::from_str(r#"{"id":"x","role":"admin"}"#).unwrap();
        assert!(admin.is_admin());
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");
        assert_eq!(serde_json::to_value(Role::User).unwrap(), "user");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut user = User {
            id: "u1".to_string(),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "u1");

        user.email = Some("ada@example.com".to_string());
        assert_eq!(user.display_name(), "ada@example.com");

        user.first_name = Some("Ada".to_string());
        user.last_name = Some("Lovelace".to_string());
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_user_update_skips_unset_fields() {
        let update = UserUpdate {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"role":"admin"}"#);
    }
}
