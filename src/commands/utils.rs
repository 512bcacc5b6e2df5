use crate::{Config, Console, LastFmApiClientImpl, Result, TokenStore};
use std::io::{BufRead, Write};

/// Build the Last.fm client and attach a session token.
///
/// The token comes from the cache when one is present; otherwise the user is
/// asked to log in and the new token is cached for the next run.
pub async fn load_or_create_client<R: BufRead, W: Write>(
    config: &Config,
    store: &TokenStore,
    console: &mut Console<R, W>,
) -> Result<LastFmApiClientImpl> {
    let http_client = http_client::native::NativeClient::new();
    let mut client = LastFmApiClientImpl::with_base_url(
        Box::new(http_client),
        config.credentials.clone(),
        config.api_url.clone(),
    );

    let token = store.get_token(&client, console).await?;
    client.set_session_key(token);
    log::debug!("Client ready");

    Ok(client)
}
