use anyhow::Result;

use crate::render::{Render, print_notifications};
use crate::utils::tui;

pub async fn run() -> Result<()> {
    let (client, _) = super::connect_signed_in().await?;

    let spinner = tui::create_spinner("Loading tasks");
    let result = client.refresh().await;
    spinner.finish_and_clear();
    let state = result?;

    print_notifications(&state.notifications);
    println!("{}", state.render());

    Ok(())
}
