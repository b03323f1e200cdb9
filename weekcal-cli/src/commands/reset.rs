use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::{Render, pluralize, print_notifications};
use crate::utils::tui;

pub async fn run(yes: bool) -> Result<()> {
    let (client, session) = super::connect_signed_in().await?;

    // Confirm unless --yes
    if !yes {
        let state = client.week().await?;
        let count = state.week.task_count();
        let confirmed = tui::confirm(format!(
            "Delete all {} {} of {}?",
            count,
            pluralize("task", count),
            session.label()
        ))?;

        if !confirmed {
            println!("{}", "Nothing deleted".dimmed());
            return Ok(());
        }
    }

    let spinner = tui::create_spinner("Deleting all tasks");
    let result = client.reset().await;
    spinner.finish_and_clear();
    let result = result?;

    print_notifications(&result.state.notifications);
    println!("{}", result.state.render());

    Ok(())
}
