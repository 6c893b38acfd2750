use crate::{
    admin_commands::AdminCommands, review_commands::ReviewCommands,
    ticket_commands::TicketCommands,
};

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create an account and verify it with the emailed code
    Signup,

    /// Verify an account created earlier
    VerifySignup {
        /// Email the account was registered with
        #[arg(long)]
        email: String,
    },

    /// Sign in with email, password and an emailed code
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Sign in to the admin dashboard
        #[arg(long)]
        admin: bool,
    },

    /// Sign in with a Google access token
    Google {
        /// Access token issued by Google
        access_token: String,
    },

    /// Reset a forgotten password
    ForgotPassword {
        #[arg(long)]
        email: Option<String>,
    },

    /// Sign out everywhere this session is shared
    Logout,

    /// Show who is signed in
    Whoami {
        /// Ask the backend instead of trusting the cached identity
        #[arg(long)]
        remote: bool,
    },

    /// List health articles
    Articles {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        /// Filter by title or category
        #[arg(long)]
        search: Option<String>,
        /// List the article categories instead
        #[arg(long)]
        categories: bool,
    },

    /// Show one article
    Article { id: String },

    /// List medicines
    Medicines {
        /// Filter by title or category
        #[arg(long)]
        search: Option<String>,
    },

    /// Medicine reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewCommands,
    },

    /// Support tickets
    Tickets {
        #[command(subcommand)]
        action: TicketCommands,
    },

    /// Admin dashboard operations
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },

    /// Print session changes made by other processes until interrupted
    Watch,
}
