use clap::Subcommand;

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// List community reviews
    List {
        /// Filter by medicine name
        #[arg(long)]
        search: Option<String>,
    },
    /// Review a medicine
    Add {
        #[arg(long)]
        medicine: String,
        /// Stars, 1 to 5
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
    },
    /// List your own reviews
    Mine,
}
