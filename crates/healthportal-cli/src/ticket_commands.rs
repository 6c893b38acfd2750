use clap::Subcommand;

#[derive(Subcommand)]
pub enum TicketCommands {
    /// List your tickets
    Mine,
    /// Open a ticket
    New {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        description: String,
        /// High, Medium or Low
        #[arg(long, default_value = "Medium")]
        priority: String,
    },
}
