use anyhow::Result;
use dialoguer::Password;
use owo_colors::OwoColorize;

use crate::render::{Render, print_notifications};
use crate::session::SavedSession;
use crate::utils::tui;

pub async fn run(id_token: Option<String>) -> Result<()> {
    let id_token = match id_token {
        Some(token) => token,
        None => Password::new()
            .with_prompt("  Google ID token")
            .interact()?,
    };

    let client = super::connect().await?;

    let spinner = tui::create_spinner("Signing in");
    let result = client.sign_in(&id_token).await;
    spinner.finish_and_clear();
    let result = result?;

    let session = SavedSession {
        token: result.token,
        uid: result.user.uid,
        display_name: result.user.display_name,
    };
    session.save_to(&SavedSession::path()?)?;

    print_notifications(&result.state.notifications);
    println!("{}\n", format!("Signed in as {}", session.label()).dimmed());
    println!("{}", result.state.render());

    Ok(())
}
