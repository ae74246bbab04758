//! Dry run: show how events would be grouped without deleting anything.

use std::io::Write;

use calsweep_providers::{CalendarProvider, PageProgress};

use crate::commands::{connect, fetch_groups};
use crate::config::{GoogleSettings, SweepTarget};
use crate::error::{ClientError, ClientResult};

/// Prints the grouping of the target window to stdout.
pub async fn run(settings: &GoogleSettings, json: bool) -> ClientResult<()> {
    let provider = connect(settings).await?;
    let mut out = std::io::stdout();
    print_groups(&provider, &SweepTarget::default(), json, &mut out).await
}

/// Fetches and groups events, then writes the grouping as a table or JSON.
///
/// The JSON form is a list of `{ "key": ..., "events": [...] }` objects in
/// review order.
pub async fn print_groups<W: Write + ?Sized>(
    provider: &dyn CalendarProvider,
    target: &SweepTarget,
    json: bool,
    out: &mut W,
) -> ClientResult<()> {
    // stdout may be JSON, so page counts stay in the debug log
    let fetched = fetch_groups(provider, target, &mut |_: PageProgress| {}).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&fetched.groups)
            .map_err(|e| ClientError::Output(format!("failed to serialize groups: {}", e)))?;
        writeln!(out, "{}", rendered)?;
        return Ok(());
    }

    if fetched.groups.is_empty() {
        writeln!(out, "No events found in {}.", target.year)?;
        return Ok(());
    }

    writeln!(
        out,
        "{} events in {} groups ({}):",
        fetched.total_events,
        fetched.groups.len(),
        target.year
    )?;
    for group in &fetched.groups {
        writeln!(
            out,
            "{:>6}  {}  (e.g. '{}')",
            group.len(),
            group.key().as_str().to_uppercase(),
            group.example_title().unwrap_or_default()
        )?;
    }
    Ok(())
}
