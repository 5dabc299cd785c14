//! Google authorization command.

use calsync_google::{CodeAcquirer, ConsolePrompt, GoogleCalendar, LoopbackListener};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Runs (or re-runs) the Google authorization flow.
///
/// With tokens already persisted and `force` unset, this is a no-op.
/// `console` selects the stdin code prompt over the localhost callback
/// listener.
pub async fn run(config: &ClientConfig, force: bool, console: bool) -> ClientResult<()> {
    let google_config = config.google_config()?;
    let port_range = google_config.loopback_port_range;
    let calendar = GoogleCalendar::new(google_config)?;

    if calendar.is_authenticated() && !force {
        println!("Already authenticated with Google Calendar.");
        println!("Use --force to re-authenticate.");
        return Ok(());
    }

    println!("Starting Google Calendar authorization...");
    println!();
    println!("A browser window will open for you to authorize access.");
    println!("If the browser doesn't open, copy the URL from the terminal.");
    println!();

    let acquirer: Box<dyn CodeAcquirer> = if console {
        Box::new(ConsolePrompt)
    } else {
        Box::new(LoopbackListener::new(port_range))
    };

    calendar.authenticate(acquirer.as_ref()).await?;
    info!("authorization flow finished");

    println!("Authentication successful. Tokens saved.");
    Ok(())
}
