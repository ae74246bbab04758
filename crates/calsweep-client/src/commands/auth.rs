//! Authentication command.

use std::io::Write;

use calsweep_providers::CalendarProvider;
use calsweep_providers::google::{AuthOutcome, GoogleProvider, TokenStorage};
use tracing::info;

use crate::config::GoogleSettings;
use crate::error::ClientResult;

/// Obtains (or drops) Google credentials without touching the calendar.
///
/// With `logout` the token file is removed. Otherwise stored tokens are
/// reused or refreshed, and the browser flow runs when they are missing,
/// unusable, or `force` is set.
pub async fn run(settings: &GoogleSettings, force: bool, logout: bool) -> ClientResult<()> {
    let mut out = std::io::stdout();
    if logout {
        return remove_tokens(settings, &mut out);
    }

    let provider = GoogleProvider::new(settings.to_provider_config()?)?;

    if force || !provider.is_authenticated() {
        println!("A browser window will open for you to authorize calendar access.");
        println!("If it doesn't, open the URL printed below.");
        println!();
    }

    let outcome = provider.authorize(force).await?;
    info!("google: {}", outcome);

    match outcome {
        AuthOutcome::Cached => {
            println!("Already authorized with Google Calendar.");
            println!("Use --force to authorize again.");
        }
        AuthOutcome::Refreshed => println!("Access token refreshed."),
        AuthOutcome::Authorized => println!("Authorization successful!"),
    }
    println!("Tokens: {}", settings.token_file.display());
    Ok(())
}

/// Deletes the token file. The OAuth client file is not needed for this.
pub fn remove_tokens<W: Write + ?Sized>(
    settings: &GoogleSettings,
    out: &mut W,
) -> ClientResult<()> {
    let storage = TokenStorage::new(&settings.token_file);
    if !storage.path().exists() {
        writeln!(out, "No stored tokens at {}.", settings.token_file.display())?;
        return Ok(());
    }

    storage.clear()?;
    writeln!(out, "Removed stored tokens at {}.", settings.token_file.display())?;
    Ok(())
}
