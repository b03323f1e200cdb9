use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::{Render, pluralize, print_notifications};

/// Delete one task by id.
pub async fn run(id: &str) -> Result<()> {
    let (client, _) = super::connect_signed_in().await?;
    let result = client.delete_task(id).await?;

    print_notifications(&result.state.notifications);
    println!("{}", result.state.render());

    Ok(())
}

/// Delete several tasks at once through selection mode.
pub async fn run_many(ids: &[String]) -> Result<()> {
    let (client, _) = super::connect_signed_in().await?;

    client.enter_selection().await?;
    for id in ids {
        if !client.toggle_selection(id).await?.selected {
            println!("{}", format!("Skipping unknown task {}", id).yellow());
        }
    }

    let result = client.delete_selected().await?;
    if result.count == 0 {
        println!("{}", "Nothing to delete".dimmed());
        client.exit_selection().await?;
        return Ok(());
    }

    print_notifications(&result.state.notifications);
    if result.outcome == "degraded" {
        println!(
            "{}",
            format!(
                "{} {} removed here but not on the server",
                result.count,
                pluralize("task", result.count)
            )
            .yellow()
        );
    }
    println!("{}", result.state.render());

    Ok(())
}
