use std::cell::RefCell;
use std::rc::Rc;

use gloo_storage::Storage;
use leptos::prelude::*;

use podium_shared::{
    ApplyOutcome, FetchOutcome, LeaderboardState, Period, RankHistory, RequestTicket, Status,
};

use crate::config::RANK_HISTORY_STORAGE_KEY;
use crate::fetcher::fetch_period;
use crate::renderer::Renderer;
use crate::time_format::offline_label;

/// Reactive view of the dashboard for the Leptos markup (tabs, banners).
#[derive(Clone, Copy)]
pub struct DashboardSignals {
    pub period: RwSignal<Period>,
    pub status: RwSignal<Status>,
    pub offline_label: RwSignal<String>,
}

impl DashboardSignals {
    pub fn new(period: Period) -> Self {
        Self {
            period: RwSignal::new(period),
            status: RwSignal::new(Status::Loading),
            offline_label: RwSignal::new(String::new()),
        }
    }
}

struct Dashboard {
    state: LeaderboardState,
    renderer: Option<Renderer>,
    history: RankHistory,
}

impl Dashboard {
    fn render(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        // Movement arrows compare daily ranks, so they only mean something on
        // the weekly and monthly views.
        let history = (self.state.period() != Period::Daily).then_some(&self.history);
        renderer.render(self.state.agents(), history);
    }

    fn record_daily_ranks(&mut self) {
        if self.state.period() != Period::Daily || !self.history.record_daily(self.state.agents()) {
            return;
        }
        if let Err(e) = gloo_storage::LocalStorage::set(RANK_HISTORY_STORAGE_KEY, &self.history) {
            web_sys::console::warn_1(&format!("Failed to persist rank history: {e}").into());
        }
    }
}

/// Owns the leaderboard state and the renderer; every fetch result goes through here.
#[derive(Clone)]
pub struct Controller {
    inner: Rc<RefCell<Dashboard>>,
    signals: DashboardSignals,
}

impl Controller {
    pub fn new(signals: DashboardSignals) -> Self {
        let history: RankHistory =
            gloo_storage::LocalStorage::get(RANK_HISTORY_STORAGE_KEY).unwrap_or_default();
        Self {
            inner: Rc::new(RefCell::new(Dashboard {
                state: LeaderboardState::new(signals.period.get_untracked()),
                renderer: None,
                history,
            })),
            signals,
        }
    }

    /// Hand the controller the mounted DOM. Whatever is already loaded is drawn at once.
    pub fn attach_renderer(&self, renderer: Renderer) {
        let mut dash = self.inner.borrow_mut();
        dash.renderer = Some(renderer);
        dash.render();
    }

    pub fn detach_renderer(&self) {
        self.inner.borrow_mut().renderer = None;
    }

    /// Start one fetch cycle for the current period.
    pub fn poll(&self) {
        let ticket = self.inner.borrow_mut().state.begin_request();
        let controller = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = fetch_period(ticket.period, js_sys::Date::now()).await;
            controller.apply(ticket, outcome);
        });
    }

    /// No-op when `period` is already selected; otherwise re-fetches immediately.
    pub fn switch_period(&self, period: Period) {
        if !self.inner.borrow_mut().state.set_period(period) {
            return;
        }
        self.signals.period.set(period);
        self.poll();
    }

    /// Re-derive the offline banner text; leaves the agent list alone.
    pub fn refresh_offline_label(&self) {
        let label = {
            let dash = self.inner.borrow();
            if dash.state.status() != Status::Offline {
                return;
            }
            offline_label(dash.state.last_success_ms(), js_sys::Date::now())
        };
        self.signals.offline_label.set(label);
    }

    fn apply(&self, ticket: RequestTicket, outcome: FetchOutcome) {
        let now = js_sys::Date::now();
        let status = {
            let mut dash = self.inner.borrow_mut();
            let result = dash.state.apply(ticket, outcome, now);
            match result {
                ApplyOutcome::Stale => return,
                ApplyOutcome::Rendered | ApplyOutcome::Emptied => {
                    dash.record_daily_ranks();
                    dash.render();
                }
                ApplyOutcome::Unchanged | ApplyOutcome::Offline => {}
            }
            dash.state.status()
        };

        // Signals are set after the borrow ends so effects never observe it held.
        self.signals.status.set(status);
        if status == Status::Offline {
            self.refresh_offline_label();
        }
    }
}
