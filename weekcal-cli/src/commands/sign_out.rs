use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::print_notifications;
use crate::session::SavedSession;

pub async fn run() -> Result<()> {
    let path = SavedSession::path()?;
    let Some(session) = SavedSession::load_from(&path)? else {
        println!("{}", "Not signed in".dimmed());
        return Ok(());
    };

    let client = super::connect().await?.with_token(&session.token);

    // The server may have dropped the session already; forget it either way.
    let result = client.sign_out().await;
    SavedSession::remove_at(&path)?;

    match result {
        Ok(result) => print_notifications(&result.notifications),
        Err(e) => println!("{}", format!("Signed out locally ({})", e).yellow()),
    }

    Ok(())
}
