//! Account commands: auth, profile, settings, theme, support and data export.
//!
//! Each command takes the store it talks to and the local [`Preferences`];
//! the caller persists preferences afterwards.

use crate::baas::{BaasStore, NewSupportTicket, ProfileUpdate, SettingsUpdate};
use crate::config::OutputFormat;
use crate::format::Formatter;
use crate::preferences::Preferences;
use crate::theme::ThemeMode;
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{info, warn};

const MIN_PASSWORD_LEN: usize = 6;

/// Signs in and adopts the account's remote theme.
pub async fn login(
    store: &impl BaasStore,
    prefs: &mut Preferences,
    email: &str,
    password: &str,
) -> Result<String> {
    let session = store.sign_in(email.trim(), password).await?;
    let user_id = session.user_id.clone();
    prefs.session = Some(session);

    let mut message = format!("Signed in as {}", email.trim());

    match store.get_settings(&user_id).await {
        Ok(Some(settings)) => {
            if prefs.sync_from_settings(&settings) {
                message.push_str(&format!(" (theme: {})", prefs.theme));
            }
        }
        Ok(None) => info!("No remote settings for this account"),
        Err(e) => warn!("Failed to sync settings: {:#}", e),
    }

    Ok(message)
}

/// Registers a new account and signs in.
pub async fn register(
    store: &impl BaasStore,
    prefs: &mut Preferences,
    email: &str,
    password: &str,
) -> Result<String> {
    check_password(password)?;

    let session = store.sign_up(email.trim(), password).await?;
    prefs.session = Some(session);
    Ok(format!("Account created. Signed in as {}", email.trim()))
}

/// Changes the password of the signed-in account.
pub async fn change_password(
    store: &impl BaasStore,
    prefs: &Preferences,
    new_password: &str,
) -> Result<String> {
    let session = prefs.require_session()?;
    check_password(new_password)?;

    store.update_password(session, new_password).await?;
    Ok("Password updated.".to_string())
}

fn check_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
    }
    Ok(())
}

/// Signs out and forgets the local session, even if the server call fails.
pub async fn logout(store: &impl BaasStore, prefs: &mut Preferences) -> Result<String> {
    let Some(session) = prefs.session.take() else {
        return Ok("Not signed in.".to_string());
    };

    if let Err(e) = store.sign_out(&session).await {
        warn!("Server sign-out failed: {:#}", e);
    }

    Ok("Signed out.".to_string())
}

pub async fn show_profile(
    store: &impl BaasStore,
    prefs: &Preferences,
    format: OutputFormat,
) -> Result<String> {
    let session = prefs.require_session()?;
    match store.get_profile(&session.user_id).await? {
        Some(profile) => Ok(Formatter::new(format).format_profile(&profile)),
        None => bail!("No profile found for this account"),
    }
}

pub async fn update_profile(
    store: &impl BaasStore,
    prefs: &Preferences,
    update: &ProfileUpdate,
) -> Result<String> {
    let session = prefs.require_session()?;
    if update.is_empty() {
        bail!("Nothing to update. Use --name or --avatar-url");
    }

    store.update_profile(&session.user_id, update).await?;
    Ok("Profile updated.".to_string())
}

/// Shows remote settings, adopting the stored theme locally.
pub async fn show_settings(
    store: &impl BaasStore,
    prefs: &mut Preferences,
    format: OutputFormat,
) -> Result<String> {
    let user_id = prefs.require_session()?.user_id.clone();
    match store.get_settings(&user_id).await? {
        Some(settings) => {
            prefs.sync_from_settings(&settings);
            Ok(Formatter::new(format).format_settings(&settings))
        }
        None => Ok("No settings stored for this account yet.".to_string()),
    }
}

/// Applies `key=value` pairs to the remote settings row.
pub async fn update_settings(
    store: &impl BaasStore,
    prefs: &mut Preferences,
    pairs: &[(String, String)],
) -> Result<String> {
    let user_id = prefs.require_session()?.user_id.clone();

    let mut update = SettingsUpdate::default();
    for (key, value) in pairs {
        update.set(key.trim(), value)?;
    }
    if update.is_empty() {
        bail!("Nothing to update. Use KEY=VALUE ({})", SettingsUpdate::KEYS.join(", "));
    }

    store.update_settings(&user_id, &update).await?;

    if let Some(theme) = update.theme {
        prefs.theme = theme;
    }

    Ok("Settings updated.".to_string())
}

/// Shows or changes the theme. A change is pushed to the account when a
/// store is available and the user is signed in; failures there only warn.
pub async fn theme(
    store: Option<&dyn BaasStore>,
    prefs: &mut Preferences,
    mode: Option<ThemeMode>,
    system_dark: bool,
    format: OutputFormat,
) -> Result<String> {
    if let Some(mode) = mode {
        prefs.theme = mode;

        if let (Some(store), Some(session)) = (store, prefs.session.as_ref()) {
            let update = SettingsUpdate { theme: Some(mode), ..SettingsUpdate::default() };
            if let Err(e) = store.update_settings(&session.user_id, &update).await {
                warn!("Failed to save theme to account: {:#}", e);
            }
        }
    }

    let palette = prefs.theme.resolve(system_dark);
    Ok(Formatter::new(format).format_theme(prefs.theme, palette))
}

/// Opens a support ticket.
pub async fn support(
    store: &impl BaasStore,
    prefs: &Preferences,
    subject: &str,
    message: &str,
) -> Result<String> {
    let session = prefs.require_session()?;
    if subject.trim().is_empty() || message.trim().is_empty() {
        bail!("Subject and message must not be empty");
    }

    let ticket = NewSupportTicket {
        user_id: session.user_id.clone(),
        subject: subject.trim().to_string(),
        message: message.trim().to_string(),
    };
    store.create_support_ticket(&ticket).await?;

    Ok("Support ticket submitted. We'll get back to you by email.".to_string())
}

/// Exports all account data as JSON, to stdout or a file.
pub async fn export(
    store: &impl BaasStore,
    prefs: &Preferences,
    output: Option<&Path>,
) -> Result<String> {
    let session = prefs.require_session()?;
    let data = store.export_user_data(&session.user_id).await?;
    let json = serde_json::to_string_pretty(&data).context("Failed to serialize export")?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            Ok(format!("Exported {} scans to {}", data.scans.len(), path.display()))
        }
        None => Ok(json),
    }
}

/// Deletes the account's data and signs out.
pub async fn delete_account(
    store: &impl BaasStore,
    prefs: &mut Preferences,
    confirmed: bool,
) -> Result<String> {
    if !confirmed {
        bail!("This permanently deletes your profile and scan history. Re-run with --yes to confirm");
    }

    let session = prefs.require_session()?.clone();
    store.delete_account(&session.user_id).await?;

    if let Err(e) = store.sign_out(&session).await {
        warn!("Server sign-out failed: {:#}", e);
    }
    prefs.session = None;

    Ok("Account data deleted. You have been signed out.".to_string())
}
