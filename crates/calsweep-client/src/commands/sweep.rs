//! The default command: fetch, group, review, delete.

use std::io::{self, Write};

use calsweep_providers::{CalendarProvider, PageProgress};

use crate::commands::{connect, fetch_groups};
use crate::config::{GoogleSettings, SweepTarget};
use crate::error::ClientResult;
use crate::prompt::{ConsolePrompt, DecisionSource};
use crate::review::{ReviewSummary, review_groups};

/// How a sweep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The window held no events.
    NoEvents,
    /// The review loop ran.
    Reviewed(ReviewSummary),
}

/// Runs a full interactive sweep against Google Calendar.
pub async fn run(settings: &GoogleSettings) -> ClientResult<()> {
    let provider = connect(settings).await?;
    let mut prompt = ConsolePrompt::stdio();
    let mut out = std::io::stdout();

    run_sweep(&provider, &SweepTarget::default(), &mut prompt, &mut out).await?;
    Ok(())
}

/// Fetches the target window, prints the grouping totals and reviews every
/// group with `decisions`.
pub async fn run_sweep<D, W>(
    provider: &dyn CalendarProvider,
    target: &SweepTarget,
    decisions: &mut D,
    out: &mut W,
) -> ClientResult<SweepOutcome>
where
    D: DecisionSource + ?Sized,
    W: Write + Send + ?Sized,
{
    writeln!(
        out,
        "--- FETCHING ALL {} EVENTS (PAGING THROUGH RESULTS) ---",
        target.year
    )?;
    out.flush()?;

    let mut console: io::Result<()> = Ok(());
    let mut on_page = |progress: PageProgress| {
        if console.is_ok() {
            console = writeln!(out, "   ...Fetched {} events so far...", progress.events)
                .and_then(|()| out.flush());
        }
    };
    let fetched = fetch_groups(provider, target, &mut on_page).await?;
    console?;

    writeln!(
        out,
        "   ...Fetched {} events across {} pages...",
        fetched.total_events, fetched.pages
    )?;

    if fetched.groups.is_empty() {
        writeln!(out, "No events found in {}.", target.year)?;
        return Ok(SweepOutcome::NoEvents);
    }

    writeln!(out)?;
    writeln!(out, "Total fetched: {} events.", fetched.total_events)?;
    writeln!(out, "Grouped into {} categories.", fetched.groups.len())?;
    writeln!(out)?;
    writeln!(out, "--- STARTING REVIEW ---")?;

    let summary = review_groups(
        provider,
        &target.calendar_id,
        &fetched.groups,
        decisions,
        out,
    )
    .await?;

    writeln!(out)?;
    writeln!(out, "{}.", summary)?;
    Ok(SweepOutcome::Reviewed(summary))
}
