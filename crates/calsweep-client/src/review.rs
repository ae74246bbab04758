//! Interactive per-group review and bulk deletion.
//!
//! Each group is shown with its key, size and an example title, then the
//! operator decides: delete the whole group, skip it, or stop. Deletes run
//! one event at a time; a failed delete prints `x` and the loop carries on.

use std::fmt;
use std::io::{self, Write};

use calsweep_core::{EventGroup, GroupedEvents};
use calsweep_providers::CalendarProvider;
use tracing::{debug, info, warn};

use crate::error::ClientResult;
use crate::prompt::{Decision, DecisionSource};

/// Tally of one review session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    /// Groups available for review.
    pub groups_total: usize,
    /// Groups the operator answered for (deleted or skipped).
    pub groups_reviewed: usize,
    /// Groups approved for deletion.
    pub groups_deleted: usize,
    /// Groups skipped.
    pub groups_skipped: usize,
    /// Events deleted successfully.
    pub events_deleted: usize,
    /// Delete calls that failed.
    pub delete_failures: usize,
    /// Failures where the event had already been removed elsewhere.
    pub already_gone: usize,
    /// Whether the operator stopped before the last group.
    pub halted: bool,
}

impl fmt::Display for ReviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reviewed {}/{} groups: {} deleted ({} events removed, {} failed), {} skipped",
            self.groups_reviewed,
            self.groups_total,
            self.groups_deleted,
            self.events_deleted,
            self.delete_failures,
            self.groups_skipped
        )?;
        if self.already_gone > 0 {
            write!(f, ", {} already gone", self.already_gone)?;
        }
        if self.halted {
            write!(f, ", stopped early")?;
        }
        Ok(())
    }
}

/// Walks the groups in order, asking `decisions` about each one.
///
/// Stops at the first [`Decision::Quit`]; later groups are never shown or
/// touched. Only console I/O errors end the loop with an error, and a group
/// whose deletion has started is finished first.
pub async fn review_groups<D, W>(
    provider: &dyn CalendarProvider,
    calendar_id: &str,
    groups: &GroupedEvents,
    decisions: &mut D,
    out: &mut W,
) -> ClientResult<ReviewSummary>
where
    D: DecisionSource + ?Sized,
    W: Write + ?Sized,
{
    let mut summary = ReviewSummary {
        groups_total: groups.len(),
        ..Default::default()
    };

    for group in groups {
        present_group(group, out)?;

        let prompt = format!(
            "   >>> Delete ALL {} events in this group? (y/n/q): ",
            group.len()
        );
        let decision = decisions.decide(&prompt)?;
        debug!(key = %group.key(), ?decision, "group decision");

        match decision {
            Decision::Delete => {
                let (tally, console) = delete_group(provider, calendar_id, group, out).await;
                summary.groups_reviewed += 1;
                summary.groups_deleted += 1;
                summary.events_deleted += tally.deleted;
                summary.delete_failures += tally.failed;
                summary.already_gone += tally.gone;
                if let Err(e) = console {
                    warn!(%summary, "console output failed during deletion");
                    return Err(e.into());
                }
            }
            Decision::Skip => {
                writeln!(out, "   Skipped.")?;
                summary.groups_reviewed += 1;
                summary.groups_skipped += 1;
            }
            Decision::Quit => {
                summary.halted = summary.groups_reviewed < summary.groups_total;
                break;
            }
        }
    }

    info!(
        reviewed = summary.groups_reviewed,
        deleted = summary.events_deleted,
        failures = summary.delete_failures,
        halted = summary.halted,
        "review finished"
    );
    Ok(summary)
}

fn present_group<W: Write + ?Sized>(group: &EventGroup, out: &mut W) -> ClientResult<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Group: '{}' (found {} items)",
        group.key().as_str().to_uppercase(),
        group.len()
    )?;
    writeln!(
        out,
        "   Example: '{}'",
        group.example_title().unwrap_or_default()
    )?;
    Ok(())
}

#[derive(Debug, Default)]
struct GroupTally {
    deleted: usize,
    failed: usize,
    gone: usize,
}

/// Progress output that keeps the first write error instead of returning it.
struct Progress<'a, W: ?Sized> {
    out: &'a mut W,
    error: Option<io::Error>,
}

impl<W: Write + ?Sized> Progress<'_, W> {
    fn emit(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            self.error = Some(e);
        }
    }

    fn finish(self) -> io::Result<()> {
        self.error.map_or(Ok(()), Err)
    }
}

/// Deletes every member of `group`.
///
/// Console errors never cut the group short; the first one is handed back
/// next to the tally.
async fn delete_group<W: Write + ?Sized>(
    provider: &dyn CalendarProvider,
    calendar_id: &str,
    group: &EventGroup,
    out: &mut W,
) -> (GroupTally, io::Result<()>) {
    let mut progress = Progress { out, error: None };
    let mut tally = GroupTally::default();

    progress.emit("   Deleting group...");
    for event in group.events() {
        match provider.delete_event(calendar_id, &event.id).await {
            Ok(()) => {
                tally.deleted += 1;
                progress.emit(".");
            }
            Err(e) => {
                tally.failed += 1;
                if e.is_gone() {
                    tally.gone += 1;
                    warn!(event_id = %event.id, "event was already deleted");
                } else {
                    warn!(event_id = %event.id, kind = %e.kind(), "failed to delete event: {}", e);
                }
                progress.emit("x");
            }
        }
    }
    progress.emit(" Done.\n");

    (tally, progress.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedDecisions, StubProvider};
    use crate::error::ClientError;
    use calsweep_core::{CalendarEvent, group_events};

    async fn run(
        provider: &StubProvider,
        answers: &[Decision],
    ) -> (ReviewSummary, String, ScriptedDecisions) {
        let groups = group_events(provider.events_snapshot());

        let mut decisions = ScriptedDecisions::new(answers.iter().copied());
        let mut out = Vec::new();
        let summary = review_groups(provider, "primary", &groups, &mut decisions, &mut out)
            .await
            .unwrap();
        (summary, String::from_utf8(out).unwrap(), decisions)
    }

    #[tokio::test]
    async fn presents_group_in_original_layout() {
        let provider = StubProvider::with_titles(&["Standup", "Standup #2", "standup!!"]);
        let (_, out, decisions) = run(&provider, &[Decision::Skip]).await;

        assert_eq!(
            out,
            "\nGroup: 'STANDUP' (found 3 items)\n   Example: 'Standup'\n   Skipped.\n"
        );
        assert_eq!(
            decisions.prompts(),
            ["   >>> Delete ALL 3 events in this group? (y/n/q): ".to_string()]
        );
    }

    #[tokio::test]
    async fn untitled_example_shows_placeholder() {
        let provider = StubProvider::with_events(vec![CalendarEvent::new("a", "primary")]);
        let (_, out, _) = run(&provider, &[Decision::Skip]).await;

        assert!(out.contains("Group: 'NO TITLE' (found 1 items)"));
        assert!(out.contains("Example: 'No Title'"));
    }

    #[tokio::test]
    async fn delete_removes_every_member_in_order() {
        let provider = StubProvider::with_titles(&["Standup", "Lunch", "Standup #2"]);
        let (summary, out, _) = run(&provider, &[Decision::Delete, Decision::Skip]).await;

        assert_eq!(provider.deleted_ids(), vec!["evt-1", "evt-3"]);
        assert!(provider.delete_calls().iter().all(|(cal, _)| cal == "primary"));
        assert!(out.contains("   Deleting group..... Done.\n"));
        assert_eq!(summary.groups_deleted, 1);
        assert_eq!(summary.groups_skipped, 1);
        assert_eq!(summary.events_deleted, 2);
        assert!(!summary.halted);
    }

    #[tokio::test]
    async fn failed_delete_marks_and_continues() {
        let provider =
            StubProvider::with_titles(&["Sync 1", "Sync 2", "Sync 3"]).failing("evt-2");
        let (summary, out, _) = run(&provider, &[Decision::Delete]).await;

        assert_eq!(provider.deleted_ids(), vec!["evt-1", "evt-2", "evt-3"]);
        assert!(out.contains("   Deleting group....x. Done.\n"));
        assert_eq!(summary.events_deleted, 2);
        assert_eq!(summary.delete_failures, 1);
        assert_eq!(summary.groups_reviewed, 1);
    }

    #[tokio::test]
    async fn quit_leaves_later_groups_untouched() {
        let provider = StubProvider::with_titles(&["Alpha", "Beta", "Gamma", "Delta", "Epsilon"]);
        let (summary, out, decisions) =
            run(&provider, &[Decision::Delete, Decision::Quit, Decision::Delete]).await;

        assert_eq!(provider.deleted_ids(), vec!["evt-1"]);
        assert_eq!(decisions.prompts().len(), 2);
        assert!(out.contains("'BETA'"));
        assert!(!out.contains("'GAMMA'"));
        assert!(summary.halted);
        assert_eq!(summary.groups_reviewed, 1);
        assert_eq!(summary.groups_total, 5);
    }

    #[tokio::test]
    async fn answering_every_group_is_not_halted() {
        let provider = StubProvider::with_titles(&["Alpha", "Beta"]);
        let (summary, _, _) = run(&provider, &[Decision::Skip, Decision::Skip]).await;

        assert!(!summary.halted);
        assert_eq!(summary.groups_reviewed, 2);
        assert!(provider.deleted_ids().is_empty());
    }

    #[tokio::test]
    async fn already_deleted_events_are_counted_apart() {
        let provider = StubProvider::with_titles(&["Sync 1", "Sync 2", "Sync 3"]).gone("evt-1");
        let (summary, out, _) = run(&provider, &[Decision::Delete]).await;

        assert!(out.contains("   Deleting group...x.. Done.\n"));
        assert_eq!(summary.delete_failures, 1);
        assert_eq!(summary.already_gone, 1);
        assert!(summary.to_string().ends_with("0 skipped, 1 already gone"));
    }

    /// Accepts `limit` bytes, then fails every write like a closed pipe.
    struct ClosesAfter {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for ClosesAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit - self.written.len();
            if room == 0 {
                return Err(io::ErrorKind::BrokenPipe.into());
            }
            let n = buf.len().min(room);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn closed_console_still_finishes_the_group() {
        let provider = StubProvider::with_titles(&["Sync 1", "Sync 2", "Sync 3", "Lunch"]);
        let groups = group_events(provider.events_snapshot());
        let shown = "\nGroup: 'SYNC' (found 3 items)\n   Example: 'Sync 1'\n   Deleting group...";

        let mut out = ClosesAfter {
            written: Vec::new(),
            limit: shown.len(),
        };
        let mut decisions = ScriptedDecisions::new([Decision::Delete, Decision::Delete]);
        let err = review_groups(&provider, "primary", &groups, &mut decisions, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(provider.deleted_ids(), vec!["evt-1", "evt-2", "evt-3"]);
        assert_eq!(decisions.prompts().len(), 1);
        assert_eq!(String::from_utf8(out.written).unwrap(), shown);
    }

    #[test]
    fn summary_display() {
        let summary = ReviewSummary {
            groups_total: 5,
            groups_reviewed: 2,
            groups_deleted: 1,
            groups_skipped: 1,
            events_deleted: 12,
            delete_failures: 1,
            already_gone: 0,
            halted: true,
        };
        assert_eq!(
            summary.to_string(),
            "Reviewed 2/5 groups: 1 deleted (12 events removed, 1 failed), 1 skipped, stopped early"
        );
    }
}
