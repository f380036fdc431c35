//! Per-postal-code state machine driving the search form.

use std::future::Future;
use std::time::Duration;

use bioladen_core::{Category, SearchTask};
use tokio::time::Instant;

use super::locator::{self, Locator, LocatorChain};
use super::page::BrowserPage;
use super::settings::NavSettings;
use super::state::{Interaction, NavState};
use crate::error::{NavigationError, PageError};

/// What a successful run observed, including the captured DOM.
#[derive(Debug, Clone)]
pub struct NavReport {
    pub consent: Interaction,
    pub radius: Interaction,
    pub filters: Vec<(Category, Interaction)>,
    /// Scroll steps taken before the page stopped growing.
    pub scroll_steps: u32,
    pub page_url: String,
    pub html: String,
}

/// Drives one page from `Init` to `Extracted`.
///
/// Each phase runs under its own time budget; optional controls produce an
/// [`Interaction`] and never stop the run. There are no retries.
pub struct NavigationController<'a> {
    page: &'a dyn BrowserPage,
    settings: &'a NavSettings,
    state: NavState,
}

impl<'a> NavigationController<'a> {
    #[must_use]
    pub fn new(page: &'a dyn BrowserPage, settings: &'a NavSettings) -> Self {
        Self {
            page,
            settings,
            state: NavState::Init,
        }
    }

    #[must_use]
    pub fn state(&self) -> NavState {
        self.state
    }

    /// Runs every phase up to `Extracted` and returns the captured page.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] when the start page does not load, the
    /// postal code input or search button is missing, or a phase exceeds its
    /// budget. The controller is then in `Failed`.
    pub async fn run(&mut self, task: &SearchTask) -> Result<NavReport, NavigationError> {
        let postal_code = task.postal_code();
        let load_budget = self.settings.navigation_timeout;
        let budget = self.settings.phase_timeout;

        let result = within(NavState::ConsentDismissed, load_budget, self.open_search_page()).await;
        let consent = self.advance(postal_code, NavState::ConsentDismissed, result)?;
        consent.log(postal_code, "consent");

        let result = within(NavState::InputsFilled, budget, self.fill_inputs(task)).await;
        let radius = self.advance(postal_code, NavState::InputsFilled, result)?;
        radius.log(postal_code, "radius");

        let result = within(NavState::FiltersApplied, budget, self.apply_filters(task)).await;
        let filters = self.advance(postal_code, NavState::FiltersApplied, result)?;

        let result = within(NavState::SearchSubmitted, budget, self.submit_search()).await;
        self.advance(postal_code, NavState::SearchSubmitted, result)?;

        let result = within(NavState::ResultsSettled, budget, self.settle()).await;
        self.advance(postal_code, NavState::ResultsSettled, result)?;

        let result = within(NavState::Extracted, budget, self.scroll_and_capture()).await;
        let (scroll_steps, page_url, html) = self.advance(postal_code, NavState::Extracted, result)?;

        Ok(NavReport {
            consent,
            radius,
            filters,
            scroll_steps,
            page_url,
            html,
        })
    }

    /// Marks the run `Done` once the captured page has been processed.
    /// Returns `false` unless the run had reached `Extracted`.
    pub fn finish(&mut self) -> bool {
        if self.state == NavState::Extracted {
            self.state = NavState::Done;
            true
        } else {
            false
        }
    }

    fn advance<T>(
        &mut self,
        postal_code: &str,
        target: NavState,
        result: Result<T, NavigationError>,
    ) -> Result<T, NavigationError> {
        match result {
            Ok(value) => {
                tracing::debug!(postal_code, from = %self.state, to = %target, "navigation advanced");
                self.state = target;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(postal_code, from = %self.state, error = %err, "navigation failed");
                self.state = NavState::Failed;
                Err(err)
            }
        }
    }

    async fn open_search_page(&self) -> Result<Interaction, NavigationError> {
        self.page
            .goto(&self.settings.start_url)
            .await
            .map_err(page_error(NavState::ConsentDismissed))?;

        let consent = locator::consent_button();
        let outcome =
            match tokio::time::timeout(self.settings.consent_timeout, self.click_optional(&consent))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Interaction::Failed(format!(
                    "no response within {:?}",
                    self.settings.consent_timeout
                )),
            };
        Ok(outcome)
    }

    async fn fill_inputs(&self, task: &SearchTask) -> Result<Interaction, NavigationError> {
        let phase = NavState::InputsFilled;
        let input = locator::postal_code_input();
        let target = self.require(&input, phase).await?;
        self.page
            .clear_and_type(target, task.postal_code(), self.settings.type_delay)
            .await
            .map_err(page_error(phase))?;
        Ok(self.select_radius(task.radius_km()).await)
    }

    async fn select_radius(&self, radius_km: f64) -> Interaction {
        let native = locator::radius_select();
        match native.resolve(self.page).await {
            Ok(Some(target)) => return self.select_native_radius(target, radius_km).await,
            Ok(None) => {}
            Err(err) => return Interaction::Failed(err.to_string()),
        }

        let combobox = locator::radius_combobox();
        match combobox.resolve(self.page).await {
            Ok(Some(target)) => {
                if let Err(err) = self.page.click(target).await {
                    return Interaction::Failed(err.to_string());
                }
                match self.click_optional(&locator::radius_option(radius_km)).await {
                    Interaction::Skipped => {
                        Interaction::Failed(format!("combobox has no \"{radius_km} km\" option"))
                    }
                    outcome => outcome,
                }
            }
            Ok(None) => Interaction::Skipped,
            Err(err) => Interaction::Failed(err.to_string()),
        }
    }

    async fn select_native_radius(&self, target: &Locator, radius_km: f64) -> Interaction {
        let options = match self.page.option_texts(target).await {
            Ok(options) => options,
            Err(err) => return Interaction::Failed(err.to_string()),
        };
        let Some(index) = radius_option_index(&options, radius_km) else {
            return Interaction::Failed("radius select has no options".to_string());
        };
        match self.page.select_option(target, index).await {
            Ok(()) => Interaction::Ok,
            Err(err) => Interaction::Failed(err.to_string()),
        }
    }

    async fn apply_filters(
        &self,
        task: &SearchTask,
    ) -> Result<Vec<(Category, Interaction)>, NavigationError> {
        let mut outcomes = Vec::new();
        for category in task.filters().enabled() {
            let outcome = self.toggle_category(category).await;
            outcome.log(task.postal_code(), category.label());
            outcomes.push((category, outcome));
        }
        Ok(outcomes)
    }

    async fn toggle_category(&self, category: Category) -> Interaction {
        let label = category.label();
        match locator::category_label(label).resolve(self.page).await {
            Ok(Some(_)) => {}
            Ok(None) => return Interaction::Skipped,
            Err(err) => return Interaction::Failed(err.to_string()),
        }
        let outcome = self.click_optional(&locator::category_toggle(label)).await;
        if outcome.is_ok() {
            tokio::time::sleep(self.settings.toggle_pause).await;
        }
        outcome
    }

    async fn submit_search(&self) -> Result<(), NavigationError> {
        let phase = NavState::SearchSubmitted;
        let button = locator::search_button();
        let target = self.require(&button, phase).await?;
        self.page.click(target).await.map_err(page_error(phase))
    }

    async fn settle(&self) -> Result<(), NavigationError> {
        tokio::time::sleep(self.settings.settle_delay).await;
        self.wait_for_network_idle()
            .await
            .map_err(page_error(NavState::ResultsSettled))
    }

    /// Returns once the resource count has not changed for the idle window.
    /// Unbounded on its own; the phase budget caps it.
    async fn wait_for_network_idle(&self) -> Result<(), PageError> {
        let idle = self.settings.network_idle;
        let poll = (idle / 5).max(Duration::from_millis(10));
        let mut last = self.page.resource_count().await?;
        let mut quiet_since = Instant::now();
        loop {
            tokio::time::sleep(poll).await;
            let current = self.page.resource_count().await?;
            if current != last {
                last = current;
                quiet_since = Instant::now();
            } else if quiet_since.elapsed() >= idle {
                return Ok(());
            }
        }
    }

    async fn scroll_and_capture(&self) -> Result<(u32, String, String), NavigationError> {
        let to_error = page_error(NavState::Extracted);
        let mut steps = 0;
        while steps < self.settings.scroll_max_steps {
            let before = self.page.scroll_height().await.map_err(&to_error)?;
            self.page
                .scroll_by(self.settings.scroll_step_px)
                .await
                .map_err(&to_error)?;
            steps += 1;
            tokio::time::sleep(self.settings.scroll_pause).await;
            let after = self.page.scroll_height().await.map_err(&to_error)?;
            if after <= before {
                break;
            }
        }
        let html = self.page.content().await.map_err(&to_error)?;
        let page_url = self.page.url().await.map_err(&to_error)?;
        Ok((steps, page_url, html))
    }

    async fn click_optional(&self, chain: &LocatorChain) -> Interaction {
        match chain.resolve(self.page).await {
            Ok(Some(target)) => match self.page.click(target).await {
                Ok(()) => Interaction::Ok,
                Err(err) => Interaction::Failed(err.to_string()),
            },
            Ok(None) => Interaction::Skipped,
            Err(err) => Interaction::Failed(err.to_string()),
        }
    }

    async fn require<'c>(
        &self,
        chain: &'c LocatorChain,
        phase: NavState,
    ) -> Result<&'c Locator, NavigationError> {
        chain
            .resolve(self.page)
            .await
            .map_err(page_error(phase))?
            .ok_or(NavigationError::ElementNotFound {
                phase,
                what: chain.what(),
            })
    }
}

/// Index of the option naming `radius_km`: an exact number token first, then
/// any option containing the digits, else the first option.
///
/// Number tokens accept a decimal comma, so `7,5 km` names a radius of 7.5.
fn radius_option_index(options: &[String], radius_km: f64) -> Option<usize> {
    if options.is_empty() {
        return None;
    }
    let wanted = radius_km.to_string();
    let exact = options.iter().position(|text| {
        text.split(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
            .filter_map(|token| token.replace(',', ".").parse::<f64>().ok())
            .any(|value| (value - radius_km).abs() < f64::EPSILON)
    });
    Some(
        exact
            .or_else(|| options.iter().position(|text| text.contains(&wanted)))
            .unwrap_or(0),
    )
}

fn page_error(phase: NavState) -> impl Fn(PageError) -> NavigationError {
    move |source| NavigationError::Page { phase, source }
}

async fn within<T>(
    phase: NavState,
    budget: Duration,
    step: impl Future<Output = Result<T, NavigationError>>,
) -> Result<T, NavigationError> {
    match tokio::time::timeout(budget, step).await {
        Ok(result) => result,
        Err(_) => {
            // Dropping the step does not cancel a browser call already on the
            // blocking pool; it runs to completion against the closing tab.
            tracing::debug!(
                %phase,
                ?budget,
                "phase budget exceeded; abandoned browser call may still finish"
            );
            Err(NavigationError::PhaseTimeout { phase, budget })
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
