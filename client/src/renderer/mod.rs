//! DOM side of the leaderboard reconciler.
//!
//! `podium_shared::reconcile` decides what changes; this module applies those
//! plans to the podium slots and list rows that are already on screen.

mod counter;
mod flip;
mod row;

use std::collections::HashMap;

use gloo_timers::callback::Timeout;
use podium_shared::format::team_display_name;
use podium_shared::reconcile::{PODIUM_SLOTS, RowAction, plan_list, plan_podium, split_podium};
use podium_shared::{AgentRecord, RankHistory};

use crate::config::{AMOUNT_TWEEN_MS, BLANK_AVATAR, CROWN_PULSE_MS, SALES_TWEEN_MS};

use counter::{Counter, CounterClock, CounterKind};
use row::RowBinding;

pub(crate) fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub fn prefers_reduced_motion() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok().flatten())
        .is_some_and(|query| query.matches())
}

pub(crate) fn set_text(el: &web_sys::Element, text: &str) {
    if el.text_content().as_deref() != Some(text) {
        el.set_text_content(Some(text));
    }
}

pub(crate) fn set_avatar(img: &web_sys::HtmlImageElement, url: &str, name: &str) {
    let src = if url.is_empty() { BLANK_AVATAR } else { url };
    if img.get_attribute("src").as_deref() != Some(src) {
        img.set_src(src);
    }
    if img.alt() != name {
        img.set_alt(name);
    }
}

/// Elements making up one podium place, resolved once from the view's `NodeRef`s.
pub struct PodiumElements {
    pub root: web_sys::HtmlElement,
    pub avatar: web_sys::HtmlImageElement,
    pub name: web_sys::Element,
    pub team: web_sys::Element,
    pub amount: web_sys::Element,
    pub sales: web_sys::Element,
}

struct PodiumSlot {
    root: web_sys::HtmlElement,
    avatar: web_sys::HtmlImageElement,
    name: web_sys::Element,
    team: web_sys::Element,
    amount: Counter,
    sales: Counter,
    bound_id: Option<String>,
}

impl PodiumSlot {
    fn new(elements: PodiumElements) -> Self {
        Self {
            root: elements.root,
            avatar: elements.avatar,
            name: elements.name,
            team: elements.team,
            amount: Counter::new(elements.amount, CounterKind::Amount),
            sales: Counter::new(elements.sales, CounterKind::Sales),
            bound_id: None,
        }
    }

    fn show(&mut self, record: Option<&AgentRecord>, clock: &CounterClock, reduced_motion: bool) {
        let Some(record) = record else {
            self.clear();
            return;
        };
        if self.bound_id.as_deref() != Some(record.id.as_str()) {
            self.bound_id = Some(record.id.clone());
        }
        let classes = self.root.class_list();
        if classes.contains("vacant") {
            let _ = classes.remove_1("vacant");
        }
        set_text(&self.name, &record.name);
        set_text(&self.team, &team_display_name(&record.team));
        set_avatar(&self.avatar, &record.avatar_url, &record.name);
        clock.animate_to(&self.amount, record.amount, AMOUNT_TWEEN_MS, reduced_motion);
        clock.animate_to(&self.sales, record.sales as f64, SALES_TWEEN_MS, reduced_motion);
    }

    fn clear(&mut self) {
        self.bound_id = None;
        let classes = self.root.class_list();
        if !classes.contains("vacant") {
            let _ = classes.add_1("vacant");
        }
        set_text(&self.name, "");
        set_text(&self.team, "");
        set_avatar(&self.avatar, "", "");
        self.amount.set_immediate(0.0);
        self.sales.set_immediate(0.0);
    }
}

pub struct Renderer {
    document: web_sys::Document,
    podium: [PodiumSlot; PODIUM_SLOTS],
    rows_container: web_sys::HtmlElement,
    /// Bound rows in on-screen order.
    rows: Vec<RowBinding>,
    clock: CounterClock,
    crown_timer: Option<Timeout>,
}

impl Renderer {
    /// `podium[0]` is first place, regardless of where the view lays it out.
    pub fn new(
        podium: [PodiumElements; PODIUM_SLOTS],
        rows_container: web_sys::HtmlElement,
    ) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self {
            document,
            podium: podium.map(PodiumSlot::new),
            rows_container,
            rows: Vec::new(),
            clock: CounterClock::new(),
            crown_timer: None,
        })
    }

    /// Reconcile the screen with `agents` (rank order). `history` is passed when
    /// rank movement indicators should be drawn on the list.
    pub fn render(&mut self, agents: &[AgentRecord], history: Option<&RankHistory>) {
        let reduced_motion = prefers_reduced_motion();
        if reduced_motion {
            self.clock.finish_all();
        }

        let plan = plan_podium(self.podium[0].bound_id.as_deref(), agents);
        for (slot, record) in self.podium.iter_mut().zip(plan.slots) {
            slot.show(record, &self.clock, reduced_motion);
        }
        if plan.crown_changed {
            self.pulse_crown();
        }

        let (_, list) = split_podium(agents);
        self.render_list(list, history, reduced_motion);
    }

    fn render_list(
        &mut self,
        list: &[AgentRecord],
        history: Option<&RankHistory>,
        reduced_motion: bool,
    ) {
        let bound: Vec<String> = self.rows.iter().map(|row| row.id.clone()).collect();
        let plan = plan_list(&bound, list);
        let restructure = !plan.is_noop();

        // First: where surviving rows sit before anything moves.
        let before: HashMap<String, (f64, f64)> = if restructure && !reduced_motion {
            self.rows
                .iter()
                .map(|row| (row.id.clone(), flip::measure(&row.root)))
                .collect()
        } else {
            HashMap::new()
        };

        let mut old: HashMap<String, RowBinding> = self
            .rows
            .drain(..)
            .map(|row| (row.id.clone(), row))
            .collect();

        let mut next = Vec::with_capacity(plan.rows.len());
        let mut created_any = false;
        for step in &plan.rows {
            let (row, fresh) = match (step.action, old.remove(&step.record.id)) {
                (RowAction::Reuse, Some(row)) => (row, false),
                _ => match RowBinding::create(&self.document, &step.record.id) {
                    Ok(row) => {
                        created_any = true;
                        (row, true)
                    }
                    Err(e) => {
                        web_sys::console::warn_1(
                            &format!("Failed to create leaderboard row: {e:?}").into(),
                        );
                        continue;
                    }
                },
            };
            let movement = history.map(|h| h.movement(&step.record.id));
            row.update(step.record, movement, &self.clock, fresh, reduced_motion);
            next.push(row);
        }

        for id in &plan.removed {
            if let Some(row) = old.remove(id) {
                row.root.remove();
            }
        }
        // Anything left over was bound twice or failed to match; drop it too.
        for (_, row) in old.drain() {
            row.root.remove();
        }

        if plan.reordered || created_any {
            for row in &next {
                if let Err(e) = self.rows_container.append_child(&row.root) {
                    web_sys::console::warn_1(&format!("Failed to place leaderboard row: {e:?}").into());
                }
            }
        }

        // Last, invert, play.
        for row in &next {
            match before.get(&row.id) {
                Some(&pos) => flip::play_from(&row.root, pos),
                None if reduced_motion => flip::reset(&row.root),
                None => {}
            }
        }

        self.rows = next;
    }

    /// One-shot emphasis on first place after the crown changes hands.
    fn pulse_crown(&mut self) {
        let root = self.podium[0].root.clone();
        let classes = root.class_list();
        let _ = classes.remove_1("crowned");
        // Reflow so re-adding the class restarts the CSS animation.
        let _ = root.offset_width();
        let _ = classes.add_1("crowned");

        // Replacing the handle cancels a pulse that is still pending.
        self.crown_timer = Some(Timeout::new(CROWN_PULSE_MS as u32, move || {
            let _ = root.class_list().remove_1("crowned");
        }));
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.clock.finish_all();
        for row in self.rows.drain(..) {
            row.root.remove();
        }
    }
}
