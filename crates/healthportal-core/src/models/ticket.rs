use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HasId, User, UserRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => f.pad("High"),
            Priority::Medium => f.pad("Medium"),
            Priority::Low => f.pad("Low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Resolved,
    #[default]
    #[serde(other)]
    Open,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "Priority", alias = "priority", default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub user_id: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        self.status != TicketStatus::Resolved
    }

    pub fn author(&self) -> Option<&User> {
        self.user_id.as_ref().and_then(UserRef::user)
    }

    pub fn author_display(&self) -> String {
        match self.author() {
            Some(user) => user.display_name(),
            None => "No User Data".to_string(),
        }
    }
}

impl HasId for Ticket {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    #[serde(rename = "Priority")]
    pub priority: Priority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_with_populated_owner() {
        let json = r#"{
            "_id": "t1",
            "subject": "Cannot log in",
            "Priority": "High",
            "status": "resolved",
            "userId": {"_id": "u1", "firstName": "Ada", "email": "ada@example.com"}
        }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.priority, Priority::High);
        assert!(!ticket.is_open());
        assert_eq!(ticket.author_display(), "Ada");
    }

    #[test]
    fn test_ticket_with_bare_owner_and_defaults() {
        let json = r#"{"_id":"t2","subject":"Billing","userId":"u9","status":"pending"}"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.priority, Priority::Medium);
        assert!(ticket.is_open());
        assert_eq!(ticket.user_id, Some(UserRef::Id("u9".to_string())));
        assert_eq!(ticket.author_display(), "No User Data");
    }

    #[test]
    fn test_status_fallback_and_resolved() {
        let resolved: Ticket = serde_json::from_str(r#"{"_id":"t1","status":"resolved"}"#).unwrap();
        assert!(!resolved.is_open());

        let pending: Ticket = serde_json::from_str(r#"{"_id":"t2","status":"pending"}"#).unwrap();
        assert_eq!(pending.status, TicketStatus::Open);
    }

    #[test]
    fn test_priority_display_pads() {
        assert_eq!(format!("[{:<6}]", Priority::High), "[High  ]");
        assert_eq!(format!("[{:>4}]", Priority::Low), "[ Low]");
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("LOW".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_new_ticket_serializes_capitalized_priority() {
        let ticket = NewTicket {
            subject: "s".to_string(),
            description: "d".to_string(),
            priority: Priority::Low,
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["Priority"], "Low");
    }
}
