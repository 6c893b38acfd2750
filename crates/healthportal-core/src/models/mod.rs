//! Data models for portal entities.
//!
//! - `User`, `Role`: identities, including the cached session identity
//! - `Article`: health articles grouped by category
//! - `Medicine`: medicine catalogue entries
//! - `Review`: community medicine reviews
//! - `Ticket`: support tickets raised by users

pub mod article;
pub mod medicine;
pub mod review;
pub mod ticket;
pub mod user;

pub use article::{Article, ArticleInput, ARTICLE_CATEGORIES};
pub use medicine::{Medicine, MedicineInput};
pub use review::{NewReview, Review, ReviewUpdate, MAX_RATING};
pub use ticket::{NewTicket, Priority, Ticket, TicketStatus};
pub use user::{GoogleProfile, NewAccount, Role, User, UserRef, UserUpdate};

/// Anything the backend identifies by its `_id`
pub trait HasId {
    fn id(&self) -> &str;
}
