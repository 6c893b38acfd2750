//! Admin dashboard commands. Every command checks the cached role first;
//! the backend enforces it again.

use anyhow::Result;
use healthportal_core::dashboard::AdminDashboard;
use healthportal_core::models::{ArticleInput, MedicineInput, Role, UserUpdate};

use crate::admin_commands::AdminCommands;
use crate::content::print_tickets;
use crate::context::Context;

fn parse_role(role: &str) -> Result<Role> {
    match role.to_lowercase().as_str() {
        "user" => Ok(Role::User),
        "admin" => Ok(Role::Admin),
        other => anyhow::bail!("Unknown role: {} (expected user or admin)", other),
    }
}

pub(crate) async fn run(ctx: &Context, action: AdminCommands) -> Result<()> {
    ctx.require_admin()?;
    let mut dash = AdminDashboard::new(ctx.api.clone());

    match action {
        AdminCommands::Stats => {
            let stats = ctx.api.dashboard_stats().await;
            println!("Users:        {}", stats.users);
            println!("Articles:     {}", stats.articles);
            println!("Reviews:      {}", stats.reviews);
            println!("Open tickets: {}", stats.open_tickets);
        }
        AdminCommands::Users { search } => {
            dash.users = ctx.api.list_users().await?;
            dash.query = search.unwrap_or_default();
            for user in dash.visible_users() {
                println!(
                    "{}  {:<24} {:<32} {}",
                    user.id,
                    user.display_name(),
                    user.email.as_deref().unwrap_or("-"),
                    user.role
                );
            }
        }
        AdminCommands::UserUpdate {
            id,
            first_name,
            last_name,
            email,
            phone,
            gender,
            role,
        } => {
            let update = UserUpdate {
                first_name,
                last_name,
                email,
                phone,
                gender,
                role: role.as_deref().map(parse_role).transpose()?,
            };
            dash.update_user(&id, &update).await?;
            println!("User {} updated", id);
        }
        AdminCommands::UserDelete { id } => {
            dash.delete_user(&id).await?;
            println!("User {} deleted", id);
        }
        AdminCommands::ArticleAdd {
            title,
            category,
            short_description,
            content,
            image_url,
            source_link,
        } => {
            let input = ArticleInput {
                title,
                category,
                short_description,
                content,
                image_url,
                source_link,
            };
            dash.create_article(&input).await?;
            if let Some(article) = dash.articles.first() {
                println!("Article published ({})", article.id);
            }
        }
        AdminCommands::ArticleDelete { id } => {
            dash.delete_article(&id).await?;
            println!("Article {} deleted", id);
        }
        AdminCommands::MedicineAdd {
            title,
            usage,
            category,
            side_effects,
            tags,
            image_url,
        } => {
            let input = MedicineInput::from_form(
                &title,
                &usage,
                &category,
                &side_effects,
                &tags,
                image_url.as_deref(),
            );
            dash.create_medicine(&input).await?;
            if let Some(medicine) = dash.medicines.first() {
                println!("Medicine added ({})", medicine.id);
            }
        }
        AdminCommands::MedicineDelete { id } => {
            dash.delete_medicine(&id).await?;
            println!("Medicine {} deleted", id);
        }
        AdminCommands::ReviewDelete { id } => {
            dash.delete_review(&id).await?;
            println!("Review {} deleted", id);
        }
        AdminCommands::Tickets { search, open } => {
            dash.tickets = ctx.api.list_tickets().await?;
            dash.query = search.unwrap_or_default();
            let visible: Vec<_> = dash
                .visible_tickets()
                .into_iter()
                .filter(|t| !open || t.is_open())
                .collect();
            print_tickets(&visible);
        }
        AdminCommands::TicketResolve { id, reply } => {
            dash.resolve_ticket(&id, reply.as_deref()).await?;
            println!("Ticket {} resolved", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("Admin").unwrap(), Role::Admin);
        assert_eq!(parse_role("user").unwrap(), Role::User);
        assert!(parse_role("superuser").is_err());
    }
}
