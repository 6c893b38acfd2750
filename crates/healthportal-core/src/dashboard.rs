//! Dashboard state for the user and admin screens.
//!
//! Each dashboard owns the lists it shows plus a search query. Writes go to
//! the backend first; on success the local list is patched with `ListExt`
//! so the screen updates without a reload.

use anyhow::Result;
use tracing::{debug, info};

use crate::api::{ApiClient, DashboardStats};
use crate::models::{
    Article, ArticleInput, Medicine, MedicineInput, NewReview, NewTicket, Review, ReviewUpdate,
    Ticket, User, UserRef, UserUpdate,
};
use crate::search::{admin_review_matches, filter, filter_with, ListExt};

// ============================================================================
// Admin
// ============================================================================

pub struct AdminDashboard {
    api: ApiClient,
    pub users: Vec<User>,
    pub articles: Vec<Article>,
    pub medicines: Vec<Medicine>,
    pub reviews: Vec<Review>,
    pub tickets: Vec<Ticket>,
    pub query: String,
}

impl AdminDashboard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            users: Vec::new(),
            articles: Vec::new(),
            medicines: Vec::new(),
            reviews: Vec::new(),
            tickets: Vec::new(),
            query: String::new(),
        }
    }

    /// Load every admin listing concurrently
    pub async fn refresh(&mut self) -> Result<()> {
        let (users, articles, medicines, reviews, tickets) = futures::join!(
            self.api.list_users(),
            self.api.list_articles(None, None),
            self.api.list_medicines(),
            self.api.list_reviews(),
            self.api.list_tickets(),
        );
        self.users = users?;
        self.articles = articles?;
        self.medicines = medicines?;
        self.reviews = reviews?;
        self.tickets = tickets?;
        debug!(
            users = self.users.len(),
            articles = self.articles.len(),
            tickets = self.tickets.len(),
            "Admin dashboard loaded"
        );
        Ok(())
    }

    /// Counts from the loaded lists
    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            users: self.users.len(),
            articles: self.articles.len(),
            reviews: self.reviews.len(),
            open_tickets: self.tickets.iter().filter(|t| t.is_open()).count(),
        }
    }

    pub fn visible_users(&self) -> Vec<&User> {
        filter(&self.users, &self.query)
    }

    pub fn visible_articles(&self) -> Vec<&Article> {
        filter(&self.articles, &self.query)
    }

    pub fn visible_medicines(&self) -> Vec<&Medicine> {
        filter(&self.medicines, &self.query)
    }

    pub fn visible_reviews(&self) -> Vec<&Review> {
        filter_with(&self.reviews, &self.query, admin_review_matches)
    }

    pub fn visible_tickets(&self) -> Vec<&Ticket> {
        filter(&self.tickets, &self.query)
    }

    pub async fn update_user(&mut self, id: &str, update: &UserUpdate) -> Result<()> {
        let user = self.api.update_user(id, update).await?;
        self.users.replace_by_id(user);
        Ok(())
    }

    pub async fn delete_user(&mut self, id: &str) -> Result<()> {
        self.api.delete_user(id).await?;
        self.users.remove_by_id(id);
        info!(id, "User deleted");
        Ok(())
    }

    pub async fn create_article(&mut self, input: &ArticleInput) -> Result<()> {
        input.validate().map_err(anyhow::Error::msg)?;
        let article = self.api.create_article(input).await?;
        self.articles.prepend(article);
        Ok(())
    }

    pub async fn update_article(&mut self, id: &str, input: &ArticleInput) -> Result<()> {
        input.validate().map_err(anyhow::Error::msg)?;
        let article = self.api.update_article(id, input).await?;
        self.articles.replace_by_id(article);
        Ok(())
    }

    pub async fn delete_article(&mut self, id: &str) -> Result<()> {
        self.api.delete_article(id).await?;
        self.articles.remove_by_id(id);
        Ok(())
    }

    pub async fn create_medicine(&mut self, input: &MedicineInput) -> Result<()> {
        input.validate().map_err(anyhow::Error::msg)?;
        let medicine = self.api.create_medicine(input).await?;
        self.medicines.prepend(medicine);
        Ok(())
    }

    pub async fn update_medicine(&mut self, id: &str, input: &MedicineInput) -> Result<()> {
        input.validate().map_err(anyhow::Error::msg)?;
        let medicine = self.api.update_medicine(id, input).await?;
        self.medicines.replace_by_id(medicine);
        Ok(())
    }

    pub async fn delete_medicine(&mut self, id: &str) -> Result<()> {
        self.api.delete_medicine(id).await?;
        self.medicines.remove_by_id(id);
        Ok(())
    }

    pub async fn update_review(&mut self, id: &str, update: &ReviewUpdate) -> Result<()> {
        let review = self.api.update_review(id, update).await?;
        self.reviews.replace_by_id(review);
        Ok(())
    }

    pub async fn delete_review(&mut self, id: &str) -> Result<()> {
        self.api.delete_review(id).await?;
        self.reviews.remove_by_id(id);
        Ok(())
    }

    /// Resolve a ticket, optionally replying to its author. The ticket list
    /// is reloaded afterwards since the backend fills in the resolution.
    pub async fn resolve_ticket(&mut self, id: &str, reply: Option<&str>) -> Result<()> {
        match reply.map(str::trim).filter(|r| !r.is_empty()) {
            Some(message) => self.api.reply_to_ticket(id, message).await?,
            None => self.api.resolve_ticket(id).await?,
        }
        self.tickets = self.api.list_tickets().await?;
        Ok(())
    }
}

// ============================================================================
// User
// ============================================================================

pub struct UserDashboard {
    api: ApiClient,
    pub reviews: Vec<Review>,
    pub my_reviews: Vec<Review>,
    pub tickets: Vec<Ticket>,
    pub query: String,
}

impl UserDashboard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            reviews: Vec::new(),
            my_reviews: Vec::new(),
            tickets: Vec::new(),
            query: String::new(),
        }
    }

    pub async fn refresh(&mut self) -> Result<()> {
        let (reviews, mine, tickets) = futures::join!(
            self.api.list_reviews(),
            self.api.my_reviews(),
            self.api.my_tickets(),
        );
        self.reviews = reviews?;
        self.my_reviews = mine?;
        self.tickets = tickets?;
        Ok(())
    }

    pub fn visible_reviews(&self) -> Vec<&Review> {
        filter(&self.reviews, &self.query)
    }

    /// Post a review and show it at the top of both lists, attributed to
    /// the signed-in user.
    pub async fn submit_review(&mut self, review: &NewReview) -> Result<Review> {
        review.validate().map_err(anyhow::Error::msg)?;
        let mut created = self.api.create_review(review).await?;
        if created.author().is_none() {
            if let Some(user) = self.api.session().identity() {
                created.user = Some(UserRef::Populated(user));
            }
        }
        self.reviews.prepend(created.clone());
        self.my_reviews.prepend(created.clone());
        Ok(created)
    }

    pub async fn submit_ticket(&mut self, ticket: &NewTicket) -> Result<Ticket> {
        if ticket.subject.trim().is_empty() || ticket.description.trim().is_empty() {
            anyhow::bail!("Please fill in both subject and description");
        }
        let created = self.api.create_ticket(ticket).await?;
        self.tickets = self.api.my_tickets().await?;
        Ok(created)
    }
}
