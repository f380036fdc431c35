//! End-to-end runs of the orchestrator over scripted browser pages.
//!
//! Each page serves a fixed results document; no browser or network is
//! involved.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bioladen_core::{CategoryFilters, DedupMode, RunInput, StoreRecord};
use bioladen_scraper::navigate::Locator;
use bioladen_scraper::{
    BrowserPage, DedupIndex, MemorySink, NavSettings, NavState, NavigationError, Orchestrator,
    PageError, PageFactory, RecordSink, SinkError, TaskError,
};

const RESULTS_PAGE: &str = r#"
<html><body>
  <div class="results">
    <article>
      <h3>Bioladen Am Hafen</h3>
      <p>Hafenstraße 1<br>20095 Hamburg</p>
      <span>(0,8 km)</span>
      <a href="/haendler/am-hafen">DETAILS</a>
    </article>
    <article>
      <h3>Bioladen Am Hafen (Markt)</h3>
      <p>Großer Markt 3<br>20095 Hamburg</p>
      <span>(1,1 km)</span>
      <a href="/haendler/am-hafen">DETAILS</a>
    </article>
    <article>
      <h3>Kornkammer</h3>
      <p>Lange Reihe 7<br>20099 Hamburg</p>
      <span>(2,3 km)</span>
      <a href="/haendler/kornkammer">DETAILS</a>
    </article>
  </div>
</body></html>"#;

#[derive(Clone)]
struct Script {
    html: &'static str,
    fail_goto: bool,
    has_search_button: bool,
}

impl Script {
    fn results(html: &'static str) -> Self {
        Self {
            html,
            fail_goto: false,
            has_search_button: true,
        }
    }
}

struct ScriptedPage {
    script: Script,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserPage for ScriptedPage {
    async fn goto(&self, _url: &str) -> Result<(), PageError> {
        if self.script.fail_goto {
            return Err(PageError::Driver {
                op: "goto",
                message: "net::ERR_CONNECTION_RESET".into(),
            });
        }
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> Result<usize, PageError> {
        let (Locator::Css(expr) | Locator::XPath(expr)) = locator;
        let found = expr.contains("Postleitzahl")
            || (self.script.has_search_button && expr.contains("BIO-H"));
        Ok(usize::from(found))
    }

    async fn click(&self, _locator: &Locator) -> Result<(), PageError> {
        Ok(())
    }

    async fn clear_and_type(&self, _: &Locator, _: &str, _: Duration) -> Result<(), PageError> {
        Ok(())
    }

    async fn option_texts(&self, _locator: &Locator) -> Result<Vec<String>, PageError> {
        Ok(Vec::new())
    }

    async fn select_option(&self, _locator: &Locator, _index: usize) -> Result<(), PageError> {
        Ok(())
    }

    async fn scroll_by(&self, _pixels: u32) -> Result<(), PageError> {
        Ok(())
    }

    async fn scroll_height(&self) -> Result<u64, PageError> {
        Ok(1200)
    }

    async fn resource_count(&self) -> Result<u64, PageError> {
        Ok(42)
    }

    async fn content(&self) -> Result<String, PageError> {
        Ok(self.script.html.to_string())
    }

    async fn url(&self) -> Result<String, PageError> {
        Ok("https://www.bioladen.de/bio-haendler-suche".into())
    }

    async fn close(&self) -> Result<(), PageError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out pages in script order; falls back to the last script.
struct ScriptedFactory {
    scripts: Mutex<VecDeque<Script>>,
    fallback: Script,
    closed: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    fn new(scripts: Vec<Script>) -> Self {
        let fallback = scripts
            .last()
            .cloned()
            .unwrap_or_else(|| Script::results(RESULTS_PAGE));
        Self {
            scripts: Mutex::new(scripts.into()),
            fallback,
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFactory for ScriptedFactory {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>, PageError> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        Ok(Box::new(ScriptedPage {
            script,
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct RefusingSink;

#[async_trait]
impl RecordSink for RefusingSink {
    async fn push(&self, _record: &StoreRecord) -> Result<(), SinkError> {
        Err(SinkError::Io(std::io::Error::other("disk full")))
    }
}

/// Rejects exactly one push, the `fail_at`-th (1-based), and stores the rest.
struct FlakySink {
    inner: MemorySink,
    pushes: AtomicUsize,
    fail_at: usize,
}

impl FlakySink {
    fn failing_at(fail_at: usize) -> Self {
        Self {
            inner: MemorySink::new(),
            pushes: AtomicUsize::new(0),
            fail_at,
        }
    }
}

#[async_trait]
impl RecordSink for FlakySink {
    async fn push(&self, record: &StoreRecord) -> Result<(), SinkError> {
        if self.pushes.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_at {
            return Err(SinkError::Io(std::io::Error::other("write interrupted")));
        }
        self.inner.push(record).await
    }
}

fn quick_settings() -> NavSettings {
    NavSettings {
        consent_timeout: Duration::from_millis(100),
        type_delay: Duration::ZERO,
        toggle_pause: Duration::ZERO,
        settle_delay: Duration::ZERO,
        network_idle: Duration::from_millis(20),
        scroll_pause: Duration::ZERO,
        ..NavSettings::default()
    }
}

fn input(postal_codes: &[&str]) -> RunInput {
    RunInput {
        postal_codes: postal_codes.iter().map(ToString::to_string).collect(),
        radius_km: 25.0,
        filters: CategoryFilters::default(),
        deduplicate_by: DedupMode::DetailUrl,
        max_concurrency: 1,
    }
}

#[tokio::test]
async fn shared_detail_link_is_kept_once() {
    let factory = ScriptedFactory::new(vec![Script::results(RESULTS_PAGE)]);
    let sink = MemorySink::new();
    let orchestrator = Orchestrator::new(
        &factory,
        &sink,
        quick_settings(),
        Arc::new(DedupIndex::new()),
    );

    let summary = orchestrator.run(&input(&["20095"])).await;

    assert_eq!(summary.kept, 2);
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.succeeded, 1);
    assert!(!summary.all_failed());
    assert_eq!(summary.tasks[0].final_state, NavState::Done);

    let names: Vec<_> = sink
        .records()
        .into_iter()
        .filter_map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Bioladen Am Hafen", "Kornkammer"]);
    assert_eq!(factory.closed(), 1);
}

#[tokio::test]
async fn composite_mode_keeps_distinct_addresses() {
    let factory = ScriptedFactory::new(vec![Script::results(RESULTS_PAGE)]);
    let sink = MemorySink::new();
    let orchestrator = Orchestrator::new(
        &factory,
        &sink,
        quick_settings(),
        Arc::new(DedupIndex::new()),
    );
    let run_input = RunInput {
        deduplicate_by: DedupMode::Composite,
        ..input(&["20095"])
    };

    let summary = orchestrator.run(&run_input).await;

    assert_eq!(summary.kept, 3);
    assert_eq!(summary.dropped, 0);
}

#[tokio::test]
async fn repeated_postal_code_results_are_dropped_across_tasks() {
    let factory = ScriptedFactory::new(vec![Script::results(RESULTS_PAGE)]);
    let sink = MemorySink::new();
    let orchestrator = Orchestrator::new(
        &factory,
        &sink,
        quick_settings(),
        Arc::new(DedupIndex::new()),
    );

    let summary = orchestrator.run(&input(&["20095", "20097"])).await;

    assert_eq!(summary.tasks[0].kept, 2);
    assert_eq!(summary.tasks[1].kept, 0);
    assert_eq!(summary.tasks[1].dropped, 3);
    assert_eq!(sink.records().len(), 2);
}

#[tokio::test]
async fn seeded_index_suppresses_known_stores() {
    let factory = ScriptedFactory::new(vec![Script::results(RESULTS_PAGE)]);
    let sink = MemorySink::new();
    let index = DedupIndex::with_keys(["https://www.bioladen.de/haendler/kornkammer"]);
    let orchestrator = Orchestrator::new(&factory, &sink, quick_settings(), Arc::new(index));

    let summary = orchestrator.run(&input(&["20095"])).await;

    assert_eq!(summary.kept, 1);
    assert_eq!(summary.dropped, 2);
}

#[tokio::test]
async fn failed_task_does_not_stop_siblings() {
    let factory = ScriptedFactory::new(vec![
        Script {
            fail_goto: true,
            ..Script::results(RESULTS_PAGE)
        },
        Script {
            has_search_button: false,
            ..Script::results(RESULTS_PAGE)
        },
        Script::results(RESULTS_PAGE),
    ]);
    let sink = MemorySink::new();
    let orchestrator = Orchestrator::new(
        &factory,
        &sink,
        quick_settings(),
        Arc::new(DedupIndex::new()),
    );

    let summary = orchestrator.run(&input(&["10115", "20095", "80331"])).await;

    assert_eq!(summary.failed, 2);
    assert_eq!(summary.succeeded, 1);
    assert!(!summary.all_failed());

    let first = &summary.tasks[0];
    assert_eq!(first.postal_code, "10115");
    assert_eq!(first.final_state, NavState::Failed);
    assert!(matches!(
        first.error,
        Some(TaskError::Navigation(NavigationError::Page {
            phase: NavState::ConsentDismissed,
            ..
        }))
    ));

    let second = &summary.tasks[1];
    assert!(matches!(
        second.error,
        Some(TaskError::Navigation(NavigationError::ElementNotFound {
            phase: NavState::SearchSubmitted,
            ..
        }))
    ));

    assert_eq!(summary.tasks[2].kept, 2);
    assert_eq!(factory.closed(), 3, "every page is closed");
}

#[tokio::test]
async fn all_tasks_failing_is_reported() {
    let factory = ScriptedFactory::new(vec![Script {
        fail_goto: true,
        ..Script::results(RESULTS_PAGE)
    }]);
    let sink = MemorySink::new();
    let orchestrator = Orchestrator::new(
        &factory,
        &sink,
        quick_settings(),
        Arc::new(DedupIndex::new()),
    );

    let summary = orchestrator.run(&input(&["20095", "22767"])).await;

    assert!(summary.all_failed());
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn sink_error_fails_only_that_task() {
    let factory = ScriptedFactory::new(vec![Script::results(RESULTS_PAGE)]);
    let orchestrator = Orchestrator::new(
        &factory,
        &RefusingSink,
        quick_settings(),
        Arc::new(DedupIndex::new()),
    );

    let summary = orchestrator.run(&input(&["20095"])).await;

    let task = &summary.tasks[0];
    assert_eq!(task.final_state, NavState::Failed);
    assert!(matches!(task.error, Some(TaskError::Sink(_))));
    assert_eq!(task.kept, 0);
    assert_eq!(factory.closed(), 1);
}

#[tokio::test]
async fn record_lost_to_sink_error_is_kept_by_a_later_task() {
    let factory = ScriptedFactory::new(vec![Script::results(RESULTS_PAGE)]);
    let sink = FlakySink::failing_at(2);
    let orchestrator = Orchestrator::new(
        &factory,
        &sink,
        quick_settings(),
        Arc::new(DedupIndex::new()),
    );

    let summary = orchestrator.run(&input(&["20095", "20097"])).await;

    let first = &summary.tasks[0];
    assert_eq!(first.final_state, NavState::Failed);
    assert!(matches!(first.error, Some(TaskError::Sink(_))));
    assert_eq!(first.kept, 1);

    let second = &summary.tasks[1];
    assert_eq!(second.final_state, NavState::Done);
    assert_eq!(second.kept, 1);
    assert_eq!(second.dropped, 2);

    let names: Vec<_> = sink
        .inner
        .records()
        .into_iter()
        .filter_map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Bioladen Am Hafen", "Kornkammer"]);
}

#[tokio::test]
async fn concurrent_tasks_share_one_index() {
    let factory = ScriptedFactory::new(vec![Script::results(RESULTS_PAGE)]);
    let sink = MemorySink::new();
    let orchestrator = Orchestrator::new(
        &factory,
        &sink,
        quick_settings(),
        Arc::new(DedupIndex::new()),
    );
    let run_input = RunInput {
        max_concurrency: 4,
        ..input(&["20095", "20097", "20099", "22767"])
    };

    let summary = orchestrator.run(&run_input).await;

    assert_eq!(summary.kept, 2, "each detail link is kept exactly once");
    assert_eq!(summary.dropped, 10);
    let codes: Vec<_> = summary.tasks.iter().map(|t| t.postal_code.as_str()).collect();
    assert_eq!(codes, vec!["20095", "20097", "20099", "22767"]);
}
