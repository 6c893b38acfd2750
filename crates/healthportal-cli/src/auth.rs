//! Sign-in, sign-up and session commands.

use anyhow::Result;
use healthportal_core::auth::{
    LoginFlow, SessionState, SignedIn, SignupFlow, SignupOutcome, StorageWatcher,
};
use healthportal_core::models::NewAccount;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::context::Context;
use crate::prompt;

pub(crate) async fn signup(ctx: &mut Context) -> Result<()> {
    let account = NewAccount {
        first_name: prompt::line("First name")?,
        last_name: prompt::line("Last name")?,
        email: prompt::line("Email")?,
        phone: prompt::line("Phone")?,
        gender: prompt::line("Gender")?,
        password: prompt::password("Password")?,
    };

    let mut flow = SignupFlow::new(ctx.api.clone());
    println!("{}", flow.signup(&account).await?);
    ctx.remember_email(&account.email);

    finish_signup(&mut flow).await
}

pub(crate) async fn verify_signup(ctx: &mut Context, email: &str) -> Result<()> {
    let mut flow = SignupFlow::resume(ctx.api.clone(), email);
    finish_signup(&mut flow).await
}

async fn finish_signup(flow: &mut SignupFlow) -> Result<()> {
    match flow.verify(&prompt::otp()?).await? {
        SignupOutcome::SignedIn(user) => println!("Signed in as {}", user.display_name()),
        SignupOutcome::Verified(message) => {
            println!("{}", message);
            println!("Run `healthportal login` to sign in.");
        }
    }
    Ok(())
}

pub(crate) async fn login(ctx: &mut Context, email: Option<String>, admin: bool) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt::line_or("Email", ctx.config.last_email.as_deref())?,
    };
    let password = prompt::password("Password")?;

    let mut flow = LoginFlow::new(ctx.api.clone());
    println!("{}", flow.login(&email, &password, admin).await?);
    ctx.remember_email(&email);

    let signed_in = flow.verify_otp(&prompt::otp()?).await?;
    print_signed_in(&signed_in);
    Ok(())
}

pub(crate) async fn google(ctx: &mut Context, access_token: &str) -> Result<()> {
    let mut flow = LoginFlow::new(ctx.api.clone());
    println!("{}", flow.google(access_token).await?);
    let email = flow.email().to_string();
    ctx.remember_email(&email);

    let signed_in = flow.verify_otp(&prompt::otp()?).await?;
    print_signed_in(&signed_in);
    Ok(())
}

fn print_signed_in(signed_in: &SignedIn) {
    println!(
        "Signed in as {} ({})",
        signed_in.user.display_name(),
        signed_in.role
    );
}

pub(crate) async fn forgot_password(ctx: &mut Context, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt::line_or("Email", ctx.config.last_email.as_deref())?,
    };

    let mut flow = LoginFlow::new(ctx.api.clone());
    flow.forgot_password();
    println!("{}", flow.request_reset(&email).await?);

    let otp = prompt::otp()?;
    let new_password = prompt::password("New password")?;
    let confirm = prompt::password("Confirm password")?;
    println!("{}", flow.reset_password(&otp, &new_password, &confirm).await?);
    Ok(())
}

pub(crate) fn logout(ctx: &Context) {
    let was_signed_in = ctx.store.is_authenticated();
    ctx.store.logout();
    if was_signed_in {
        println!("Signed out");
    } else {
        println!("Not signed in");
    }
}

pub(crate) async fn whoami(ctx: &Context, remote: bool) -> Result<()> {
    ctx.require_session()?;
    let user = if remote {
        let user = ctx.api.me().await?;
        ctx.store.set_identity(Some(user.clone()));
        Some(user)
    } else {
        ctx.store.identity()
    };

    match user {
        Some(user) => {
            println!("{}", user.display_name());
            if let Some(ref email) = user.email {
                println!("  Email: {}", email);
            }
            println!("  Role:  {}", user.role);
        }
        None => println!("Signed in (no profile cached)"),
    }
    Ok(())
}

/// Follow the session until Ctrl-C, printing every sign-in and sign-out
/// another process makes to the same storage directory.
pub(crate) async fn watch(ctx: &Context) -> Result<()> {
    let signal = ctx.store.signal().clone();
    let mut rx = signal.subscribe();
    let watcher = StorageWatcher::new(ctx.storage.clone(), signal).spawn();

    let mut last = ctx.store.state();
    println!("{}", describe_state(ctx, last));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => {
                match event {
                    Ok(event) => debug!(origin = ?event.origin, "Storage changed"),
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
                let state = ctx.store.rehydrate().state();
                if state != last {
                    println!("{}", describe_state(ctx, state));
                    last = state;
                }
            }
        }
    }

    watcher.abort();
    Ok(())
}

fn describe_state(ctx: &Context, state: SessionState) -> String {
    match state {
        SessionState::Anonymous => "Signed out".to_string(),
        SessionState::Authenticated => match ctx.store.identity() {
            Some(user) => format!("Signed in as {} ({})", user.display_name(), user.role),
            None => "Signed in".to_string(),
        },
    }
}
