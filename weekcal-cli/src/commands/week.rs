use anyhow::Result;

use crate::render::Render;

pub async fn run() -> Result<()> {
    let (client, _) = super::connect_signed_in().await?;
    let state = client.week().await?;

    println!("{}", state.render());

    Ok(())
}
