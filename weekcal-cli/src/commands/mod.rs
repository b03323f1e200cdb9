pub mod add;
pub mod delete;
pub mod refresh;
pub mod reset;
pub mod sign_in;
pub mod sign_out;
pub mod week;

use anyhow::Result;
use weekcal_core::config::WeekcalConfig;

use crate::client::Client;
use crate::session::SavedSession;

/// Connect to the configured server, starting it if needed.
pub async fn connect() -> Result<Client> {
    let config = WeekcalConfig::load()?;
    Client::connect(config.server.port).await
}

/// Connect with the saved session token.
pub async fn connect_signed_in() -> Result<(Client, SavedSession)> {
    let session = SavedSession::require()?;
    let client = connect().await?.with_token(&session.token);
    Ok((client, session))
}
