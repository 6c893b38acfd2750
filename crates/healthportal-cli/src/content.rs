//! Public content, reviews and the user's support tickets.

use anyhow::Result;
use healthportal_core::dashboard::UserDashboard;
use healthportal_core::models::{NewReview, NewTicket, Priority, Review, Ticket, ARTICLE_CATEGORIES};
use healthportal_core::search;
use healthportal_core::utils::{format_date, truncate_string};

use crate::context::Context;
use crate::review_commands::ReviewCommands;
use crate::ticket_commands::TicketCommands;

/// Width of the description column in listings
const SUMMARY_WIDTH: usize = 60;

pub(crate) async fn articles(
    ctx: &Context,
    category: Option<&str>,
    limit: Option<usize>,
    query: Option<&str>,
    categories: bool,
) -> Result<()> {
    if categories {
        for (name, description) in ARTICLE_CATEGORIES {
            println!("{:<16} {}", name, description);
        }
        return Ok(());
    }

    let articles = ctx.api.list_articles(category, limit).await?;
    let visible = search::filter(&articles, query.unwrap_or(""));
    if visible.is_empty() {
        println!("No articles found");
    }
    for article in visible {
        println!(
            "{}  {:<16} {}",
            article.id,
            article.category,
            truncate_string(&article.title, SUMMARY_WIDTH)
        );
    }
    Ok(())
}

pub(crate) async fn article(ctx: &Context, id: &str) -> Result<()> {
    let article = ctx.api.get_article(id).await?;
    println!("{}", article.title);
    println!("{} | {}", article.category, format_date(article.created_at.as_ref()));
    if let Some(ref summary) = article.short_description {
        println!("\n{}", summary);
    }
    if let Some(ref content) = article.content {
        println!("\n{}", content);
    }
    if let Some(ref link) = article.source_link {
        println!("\nSource: {}", link);
    }
    Ok(())
}

pub(crate) async fn medicines(ctx: &Context, query: Option<&str>) -> Result<()> {
    let medicines = ctx.api.list_medicines().await?;
    let visible = search::filter(&medicines, query.unwrap_or(""));
    if visible.is_empty() {
        println!("No medicines found");
    }
    for medicine in visible {
        println!("{}  {:<16} {}", medicine.id, medicine.category, medicine.title);
        if let Some(ref usage) = medicine.usage {
            println!("    Usage: {}", truncate_string(usage, SUMMARY_WIDTH));
        }
        if !medicine.side_effect.is_empty() {
            println!("    Side effects: {}", medicine.side_effect.join(", "));
        }
    }
    Ok(())
}

pub(crate) async fn reviews(ctx: &Context, action: ReviewCommands) -> Result<()> {
    let mut dash = UserDashboard::new(ctx.api.clone());
    match action {
        ReviewCommands::List { search } => {
            dash.reviews = ctx.api.list_reviews().await?;
            dash.query = search.unwrap_or_default();
            print_reviews(&dash.visible_reviews());
        }
        ReviewCommands::Add {
            medicine,
            rating,
            title,
            text,
        } => {
            ctx.require_session()?;
            let review = NewReview {
                medicine_name: medicine,
                rating,
                review_title: title,
                review_text: text,
            };
            let created = dash.submit_review(&review).await?;
            println!("Review posted ({})", created.id);
        }
        ReviewCommands::Mine => {
            ctx.require_session()?;
            let mine = ctx.api.my_reviews().await?;
            print_reviews(&mine.iter().collect::<Vec<_>>());
        }
    }
    Ok(())
}

fn print_reviews(reviews: &[&Review]) {
    if reviews.is_empty() {
        println!("No reviews found");
    }
    for review in reviews {
        let author = review
            .author()
            .map(|u| u.display_name())
            .unwrap_or_else(|| "Anonymous".to_string());
        println!(
            "{}  {} {}/5  {}  by {} on {}",
            review.id,
            review.medicine_name.as_deref().unwrap_or("-"),
            review.rating,
            review.review_title.as_deref().unwrap_or(""),
            author,
            format_date(review.created_at.as_ref())
        );
        if let Some(ref text) = review.review_text {
            println!("    {}", truncate_string(text, SUMMARY_WIDTH));
        }
    }
}

pub(crate) async fn tickets(ctx: &Context, action: TicketCommands) -> Result<()> {
    ctx.require_session()?;
    let mut dash = UserDashboard::new(ctx.api.clone());
    match action {
        TicketCommands::Mine => {
            dash.tickets = ctx.api.my_tickets().await?;
        }
        TicketCommands::New {
            subject,
            description,
            priority,
        } => {
            let priority: Priority = priority.parse().map_err(anyhow::Error::msg)?;
            let ticket = NewTicket {
                subject,
                description,
                priority,
            };
            let created = dash.submit_ticket(&ticket).await?;
            println!("Ticket opened ({})", created.id);
        }
    }
    print_tickets(&dash.tickets.iter().collect::<Vec<_>>());
    Ok(())
}

pub(crate) fn print_tickets(tickets: &[&Ticket]) {
    if tickets.is_empty() {
        println!("No tickets found");
    }
    for ticket in tickets {
        println!(
            "{}  [{:?}] {:<6} {}  ({}, {})",
            ticket.id,
            ticket.status,
            ticket.priority,
            ticket.subject.as_deref().unwrap_or("-"),
            ticket.author_display(),
            format_date(ticket.created_at.as_ref())
        );
    }
}
