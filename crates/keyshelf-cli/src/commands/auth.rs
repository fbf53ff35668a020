use anyhow::{Result, bail};
use colored::Colorize;
use keyshelf_core::AppConfig;
use keyshelf_core::auth::{
    IdentityProvider, Session, SessionContext, SignUpOutcome, SupabaseAuth, clear_session,
    save_session,
};
use keyshelf_core::paths;
use serde_json::json;
use std::path::Path;
use tracing::warn;

use crate::cli::AuthCommands;
use crate::output::{OutputFormat, json::print_json};

pub async fn run(
    config: &AppConfig,
    session: SessionContext,
    command: AuthCommands,
    format: OutputFormat,
) -> Result<()> {
    let session_path = paths::session_path()?;

    match command {
        AuthCommands::Whoami => whoami(&session, format),
        AuthCommands::Logout => logout(config, &session, &session_path, format).await,
        AuthCommands::Login { email, password } => {
            let provider = SupabaseAuth::new(config.supabase_config()?);
            let password = read_password(password, false)?;
            login(&provider, &session, &session_path, &email, &password, format).await
        }
        AuthCommands::Signup { email, password } => {
            let provider = SupabaseAuth::new(config.supabase_config()?);
            let password = read_password(password, true)?;
            signup(&provider, &session, &session_path, &email, &password, format).await
        }
        AuthCommands::Oauth {
            provider,
            redirect_to,
        } => {
            let auth = SupabaseAuth::new(config.supabase_config()?);
            let url = auth.authorize_url(&provider, redirect_to.as_deref())?;
            if format.is_json() {
                return print_json(&json!({ "provider": provider, "url": url.as_str() }));
            }
            println!("Open this URL to sign in with {provider}:");
            println!("  {url}");
            Ok(())
        }
    }
}

async fn login(
    provider: &dyn IdentityProvider,
    session: &SessionContext,
    session_path: &Path,
    email: &str,
    password: &str,
    format: OutputFormat,
) -> Result<()> {
    let signed_in = provider.sign_in_with_password(email, password).await?;
    store_session(session, session_path, signed_in)?;

    if format.is_json() {
        return print_json(&json!({ "signed_in": true, "user": session.user() }));
    }

    println!("{} Signed in as {}", "✓".green().bold(), email);
    Ok(())
}

async fn signup(
    provider: &dyn IdentityProvider,
    session: &SessionContext,
    session_path: &Path,
    email: &str,
    password: &str,
    format: OutputFormat,
) -> Result<()> {
    match provider.sign_up(email, password).await? {
        SignUpOutcome::SignedIn(signed_in) => {
            store_session(session, session_path, signed_in)?;
            if format.is_json() {
                return print_json(&json!({ "signed_in": true, "user": session.user() }));
            }
            println!("{} Account created, signed in as {}", "✓".green().bold(), email);
        }
        SignUpOutcome::ConfirmationRequired { email } => {
            if format.is_json() {
                return print_json(&json!({ "signed_in": false, "confirmation_sent_to": email }));
            }
            println!("Check {email} for a confirmation link, then run `keyshelf auth login`.");
        }
    }
    Ok(())
}

async fn logout(
    config: &AppConfig,
    session: &SessionContext,
    session_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let was_signed_in = match session.current() {
        Some(current) => {
            // The local session is dropped even when the provider call fails.
            match config.supabase_config() {
                Ok(supabase) => {
                    if let Err(err) = SupabaseAuth::new(supabase).sign_out(&current).await {
                        warn!(error = %err, "Provider sign-out failed");
                    }
                }
                Err(err) => warn!(error = %err, "Skipping provider sign-out"),
            }
            true
        }
        None => false,
    };

    session.clear();
    clear_session(session_path)?;

    if format.is_json() {
        return print_json(&json!({ "signed_out": was_signed_in }));
    }

    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

fn whoami(session: &SessionContext, format: OutputFormat) -> Result<()> {
    let current = session.current();

    if format.is_json() {
        return print_json(&json!({
            "signed_in": current.is_some(),
            "user": current.as_ref().map(|s| &s.user),
            "expires_at": current.as_ref().and_then(|s| s.expires_at),
            "expired": current.as_ref().map(Session::is_expired).unwrap_or(false),
        }));
    }

    let Some(current) = current else {
        println!("Not signed in.");
        return Ok(());
    };

    println!("User ID:      {}", current.user.id);
    println!(
        "Email:        {}",
        current.user.email.as_deref().unwrap_or("-")
    );
    match current.expires_at {
        Some(expires_at) if current.is_expired() => {
            println!("Expires:      {} {}", expires_at, "(expired)".red());
        }
        Some(expires_at) => println!("Expires:      {}", expires_at),
        None => println!("Expires:      never"),
    }
    Ok(())
}

fn store_session(context: &SessionContext, path: &Path, session: Session) -> Result<()> {
    save_session(path, &session)?;
    context.set(Some(session));
    Ok(())
}

fn read_password(password: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        bail!("Password is required");
    }
    if confirm && rpassword::prompt_password("Confirm password: ")? != password {
        bail!("Passwords do not match");
    }
    Ok(password)
}
