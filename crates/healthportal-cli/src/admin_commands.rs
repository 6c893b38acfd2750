use clap::Subcommand;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Users, articles, reviews and open tickets at a glance
    Stats,
    /// List users
    Users {
        /// Filter by name or email
        #[arg(long)]
        search: Option<String>,
    },
    /// Edit a user
    UserUpdate {
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        /// user or admin
        #[arg(long)]
        role: Option<String>,
    },
    /// Delete a user
    UserDelete { id: String },
    /// Publish an article
    ArticleAdd {
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        short_description: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value = "")]
        image_url: String,
        #[arg(long, default_value = "")]
        source_link: String,
    },
    /// Delete an article
    ArticleDelete { id: String },
    /// Add a medicine
    MedicineAdd {
        #[arg(long)]
        title: String,
        #[arg(long)]
        usage: String,
        #[arg(long)]
        category: String,
        /// Comma separated
        #[arg(long, default_value = "")]
        side_effects: String,
        /// Comma separated
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Delete a medicine
    MedicineDelete { id: String },
    /// Delete a review
    ReviewDelete { id: String },
    /// List support tickets
    Tickets {
        /// Filter by subject or author
        #[arg(long)]
        search: Option<String>,
        /// Only unresolved tickets
        #[arg(long)]
        open: bool,
    },
    /// Resolve a ticket, optionally emailing a reply to its author
    TicketResolve {
        id: String,
        #[arg(long)]
        reply: Option<String>,
    },
}
