use std::cell::RefCell;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use podium_shared::{Period, Status};

use crate::config::{POLL_INTERVAL_MS, UPDATED_LABEL_REFRESH_MS};
use crate::controller::{Controller, DashboardSignals};
use crate::particles::{CROWN_ANCHOR_ID, ParticleCanvas};
use crate::period;
use crate::renderer::{PodiumElements, Renderer};

struct IntervalBinding {
    window: web_sys::Window,
    interval_id: i32,
    _callback: Closure<dyn Fn()>,
}

struct PageHideBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn()>,
}

thread_local! {
    static POLL_INTERVAL_BINDING: RefCell<Option<IntervalBinding>> = const { RefCell::new(None) };
    static LABEL_INTERVAL_BINDING: RefCell<Option<IntervalBinding>> = const { RefCell::new(None) };
    static PAGEHIDE_BINDING: RefCell<Option<PageHideBinding>> = const { RefCell::new(None) };
    static ACTIVE_CONTROLLER: RefCell<Option<Controller>> = const { RefCell::new(None) };
}

type IntervalSlot = std::thread::LocalKey<RefCell<Option<IntervalBinding>>>;

fn clear_interval(slot: &'static IntervalSlot) {
    slot.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            old.window.clear_interval_with_handle(old.interval_id);
        }
    });
}

/// Install `tick` on a repeating timer, replacing whatever held `slot` before.
fn install_interval(slot: &'static IntervalSlot, period_ms: i32, tick: impl Fn() + 'static) {
    clear_interval(slot);
    let Some(window) = web_sys::window() else {
        return;
    };
    let cb = Closure::<dyn Fn()>::new(tick);
    let Ok(interval_id) = window.set_interval_with_callback_and_timeout_and_arguments_0(
        cb.as_ref().unchecked_ref(),
        period_ms,
    ) else {
        web_sys::console::warn_1(&"Failed to schedule leaderboard timer".into());
        return;
    };
    slot.with(|slot| {
        *slot.borrow_mut() = Some(IntervalBinding {
            window,
            interval_id,
            _callback: cb,
        });
    });
}

/// Stop timers, listeners and the particle loop.
fn stop_background_work() {
    clear_interval(&POLL_INTERVAL_BINDING);
    clear_interval(&LABEL_INTERVAL_BINDING);
    period::unlisten();
    crate::particles::stop();
}

fn unlisten_pagehide() {
    PAGEHIDE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.window.remove_event_listener_with_callback(
                "pagehide",
                old._handler.as_ref().unchecked_ref(),
            );
        }
    });
}

/// Unmount: stop background work and release the renderer's DOM bindings.
fn teardown() {
    stop_background_work();
    unlisten_pagehide();
    if let Some(controller) = ACTIVE_CONTROLLER.with(|slot| slot.borrow_mut().take()) {
        controller.detach_renderer();
    }
}

/// `pagehide` only stops background work; the listener itself lives until unmount.
fn listen_pagehide() {
    let Some(window) = web_sys::window() else {
        return;
    };
    unlisten_pagehide();
    let handler = Closure::<dyn Fn()>::new(stop_background_work);
    if window
        .add_event_listener_with_callback("pagehide", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        PAGEHIDE_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(PageHideBinding {
                window: window.clone(),
                _handler: handler,
            });
        });
    }
}

/// `NodeRef`s for one podium place.
#[derive(Clone, Copy)]
struct PodiumRefs {
    root: NodeRef<leptos::html::Div>,
    avatar: NodeRef<leptos::html::Img>,
    name: NodeRef<leptos::html::Div>,
    team: NodeRef<leptos::html::Div>,
    amount: NodeRef<leptos::html::Div>,
    sales: NodeRef<leptos::html::Div>,
}

impl PodiumRefs {
    fn new() -> Self {
        Self {
            root: NodeRef::new(),
            avatar: NodeRef::new(),
            name: NodeRef::new(),
            team: NodeRef::new(),
            amount: NodeRef::new(),
            sales: NodeRef::new(),
        }
    }

    fn resolve(&self) -> Option<PodiumElements> {
        let root = self.root.get_untracked()?;
        Some(PodiumElements {
            root: (*root).clone(),
            avatar: self.avatar.get_untracked()?,
            name: self.name.get_untracked()?.into(),
            team: self.team.get_untracked()?.into(),
            amount: self.amount.get_untracked()?.into(),
            sales: self.sales.get_untracked()?.into(),
        })
    }
}

fn podium_place(place: usize, refs: PodiumRefs) -> impl IntoView {
    // First place carries the id the particle bursts aim at.
    let id = if place == 1 {
        CROWN_ANCHOR_ID.to_string()
    } else {
        format!("pod-{place}")
    };
    view! {
        <div
            node_ref=refs.root
            id=id
            class=format!("podium-place place-{place} vacant")
        >
            <div class="podium-rank">{place}</div>
            <img node_ref=refs.avatar class="avatar" alt="" />
            <div node_ref=refs.name class="podium-name"></div>
            <div node_ref=refs.team class="podium-team"></div>
            <div node_ref=refs.amount class="podium-amount"></div>
            <div node_ref=refs.sales class="podium-sales"></div>
        </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    let signals = DashboardSignals::new(period::current_period());
    let controller = Controller::new(signals);
    ACTIVE_CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller.clone()));
    let DashboardSignals {
        period: active_period,
        status,
        offline_label,
    } = signals;

    // Index 0 is first place; the view lays them out 2-1-3.
    let podium_refs = [PodiumRefs::new(), PodiumRefs::new(), PodiumRefs::new()];
    let rows_ref = NodeRef::<leptos::html::Div>::new();

    // Bind the renderer once the podium and list are in the DOM.
    Effect::new({
        let controller = controller.clone();
        move || {
            let Some(rows) = rows_ref.get() else {
                return;
            };
            let [first, second, third] = podium_refs.map(|refs| refs.resolve());
            let (Some(first), Some(second), Some(third)) = (first, second, third) else {
                web_sys::console::warn_1(&"Podium markup missing; leaderboard not bound".into());
                return;
            };
            match Renderer::new([first, second, third], (*rows).clone()) {
                Some(renderer) => controller.attach_renderer(renderer),
                None => web_sys::console::warn_1(&"No document; leaderboard not bound".into()),
            }
        }
    });

    // Poll loop: once on mount, then every POLL_INTERVAL_MS.
    Effect::new({
        let controller = controller.clone();
        move || {
            controller.poll();
            let poll_controller = controller.clone();
            install_interval(&POLL_INTERVAL_BINDING, POLL_INTERVAL_MS, move || {
                poll_controller.poll();
            });
            let label_controller = controller.clone();
            install_interval(&LABEL_INTERVAL_BINDING, UPDATED_LABEL_REFRESH_MS, move || {
                label_controller.refresh_offline_label();
            });

            let period_controller = controller.clone();
            period::listen(move |period| period_controller.switch_period(period));
            listen_pagehide();
            on_cleanup(teardown);
        }
    });

    let tabs = Period::ALL
        .into_iter()
        .map(|tab| {
            view! {
                <button
                    type="button"
                    class="tab"
                    role="tab"
                    data-period=tab.as_str()
                    class:active=move || active_period.get() == tab
                    aria-selected=move || (active_period.get() == tab).to_string()
                    on:click=move |_| period::select_period(tab)
                >
                    {tab.label()}
                </button>
            }
        })
        .collect_view();

    view! {
        <ParticleCanvas />
        <main class="page">
            <header class="hero">
                <h1 class="title">"Sales Leaderboard"</h1>
                <p id="period-sub" class="subtitle">
                    {move || active_period.get().subtitle()}
                </p>
                <nav class="period-tabs" role="tablist">{tabs}</nav>
            </header>

            <Show when=move || status.get() == Status::Offline>
                <div class="banner offline" role="status">
                    {move || offline_label.get()}
                </div>
            </Show>
            <Show when=move || status.get() == Status::Empty>
                <div class="banner empty" role="status">
                    "No sales recorded for this period yet."
                </div>
            </Show>
            <Show when=move || status.get() == Status::Loading>
                <div class="banner loading" role="status">"Loading leaderboard\u{2026}"</div>
            </Show>

            <section class="podium" aria-label="Top three">
                {podium_place(2, podium_refs[1])}
                {podium_place(1, podium_refs[0])}
                {podium_place(3, podium_refs[2])}
            </section>

            <section class="list">
                <div class="list-header">
                    <div class="rank">"#"</div>
                    <div class="agent">"Agent"</div>
                    <div class="team-col">"Team"</div>
                    <div class="amount-list">"Amount"</div>
                    <div class="sales-list">"Sales"</div>
                </div>
                <div node_ref=rows_ref id="rowsContainer" class="rows" role="list"></div>
            </section>
        </main>
    }
}
