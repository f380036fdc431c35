//! Run orchestration: one navigation run per postal code, extraction,
//! deduplication, and delivery to the sink.
//!
//! Task failures are isolated. A task that cannot open a page, fails
//! navigation, or hits a sink error is reported in the [`RunSummary`] and the
//! remaining tasks continue.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bioladen_core::{DedupMode, RunInput, SearchTask};
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::dedup::{DedupIndex, RecordDeduplicator};
use crate::error::TaskError;
use crate::extract::Extractor;
use crate::navigate::{BrowserPage, NavSettings, NavState, NavigationController, PageFactory};
use crate::sink::RecordSink;

/// Result of one search task.
#[derive(Debug)]
pub struct TaskOutcome {
    pub postal_code: String,
    /// `Done` on success, `Failed` otherwise.
    pub final_state: NavState,
    pub kept: usize,
    pub dropped: usize,
    pub scroll_steps: u32,
    pub elapsed: Duration,
    pub error: Option<TaskError>,
}

impl TaskOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Per-task outcomes in input order.
    pub tasks: Vec<TaskOutcome>,
    pub kept: usize,
    pub dropped: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    /// `true` when there was at least one task and none succeeded.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.tasks.is_empty() && self.succeeded == 0
    }
}

#[derive(Default)]
struct Tally {
    kept: usize,
    dropped: usize,
    scroll_steps: u32,
}

pub struct Orchestrator<'a> {
    factory: &'a dyn PageFactory,
    sink: &'a dyn RecordSink,
    settings: NavSettings,
    extractor: Extractor,
    index: Arc<DedupIndex>,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub fn new(
        factory: &'a dyn PageFactory,
        sink: &'a dyn RecordSink,
        settings: NavSettings,
        index: Arc<DedupIndex>,
    ) -> Self {
        Self {
            factory,
            sink,
            settings,
            extractor: Extractor::new(),
            index,
        }
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Runs one task per postal code in `input`, at most
    /// `input.max_concurrency` at a time.
    pub async fn run(&self, input: &RunInput) -> RunSummary {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let tasks = input.search_tasks();
        let mode = input.deduplicate_by;
        let max_concurrency = input.max_concurrency.max(1);

        tracing::info!(
            %run_id,
            tasks = tasks.len(),
            postal_codes = ?input.postal_codes,
            radius_km = input.radius_km,
            filters = ?input.filters,
            deduplicate_by = %mode,
            max_concurrency,
            start_url = %self.settings.start_url,
            seeded_keys = self.index.len(),
            "run started"
        );

        let mut outcomes: Vec<(usize, TaskOutcome)> = stream::iter(tasks.into_iter().enumerate())
            .map(|(position, task)| async move { (position, self.run_task(&task, mode).await) })
            .buffer_unordered(max_concurrency)
            .collect()
            .await;
        outcomes.sort_by_key(|(position, _)| *position);
        let tasks: Vec<TaskOutcome> = outcomes.into_iter().map(|(_, outcome)| outcome).collect();

        let succeeded = tasks.iter().filter(|t| t.succeeded()).count();
        let summary = RunSummary {
            run_id,
            kept: tasks.iter().map(|t| t.kept).sum(),
            dropped: tasks.iter().map(|t| t.dropped).sum(),
            succeeded,
            failed: tasks.len() - succeeded,
            elapsed: started.elapsed(),
            tasks,
        };

        if summary.failed > 0 {
            tracing::warn!(
                %run_id,
                failed = summary.failed,
                total = summary.tasks.len(),
                "some search tasks failed"
            );
        }
        tracing::info!(
            %run_id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            kept = summary.kept,
            dropped = summary.dropped,
            elapsed_ms = u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
            "run finished"
        );
        summary
    }

    /// Runs a single task and always releases its page.
    pub async fn run_task(&self, task: &SearchTask, mode: DedupMode) -> TaskOutcome {
        let postal_code = task.postal_code();
        let started = Instant::now();
        tracing::info!(postal_code, radius_km = task.radius_km(), ">> search task started");

        let mut tally = Tally::default();
        let result = match self.factory.open_page().await {
            Ok(page) => {
                let result = self.drive(page.as_ref(), task, mode, &mut tally).await;
                if let Err(e) = page.close().await {
                    tracing::warn!(postal_code, error = %e, "failed to close browser page");
                }
                result
            }
            Err(e) => Err(TaskError::OpenPage(e)),
        };

        let elapsed = started.elapsed();
        match &result {
            Ok(()) => tracing::info!(
                postal_code,
                kept = tally.kept,
                dropped = tally.dropped,
                scroll_steps = tally.scroll_steps,
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "<< search task finished"
            ),
            Err(e) => tracing::warn!(
                postal_code,
                kept = tally.kept,
                dropped = tally.dropped,
                error = %e,
                "<< search task failed"
            ),
        }

        TaskOutcome {
            postal_code: postal_code.to_string(),
            final_state: if result.is_ok() {
                NavState::Done
            } else {
                NavState::Failed
            },
            kept: tally.kept,
            dropped: tally.dropped,
            scroll_steps: tally.scroll_steps,
            elapsed,
            error: result.err(),
        }
    }

    async fn drive(
        &self,
        page: &dyn BrowserPage,
        task: &SearchTask,
        mode: DedupMode,
        tally: &mut Tally,
    ) -> Result<(), TaskError> {
        let mut controller = NavigationController::new(page, &self.settings);
        let report = controller.run(task).await?;
        tally.scroll_steps = report.scroll_steps;

        let extraction = self.extractor.extract(&report.html, &report.page_url);
        tracing::debug!(
            postal_code = task.postal_code(),
            blocks = extraction.stats.blocks,
            records = extraction.records.len(),
            "results extracted"
        );

        let dedup = RecordDeduplicator::new(mode, &self.index);
        for record in &extraction.records {
            if dedup.is_duplicate(record) {
                tally.dropped += 1;
                continue;
            }
            if let Err(err) = self.sink.push(record).await {
                dedup.release(record);
                return Err(err.into());
            }
            tally.kept += 1;
        }

        controller.finish();
        Ok(())
    }
}
