use wasm_bindgen::JsCast;

use podium_shared::format::team_display_name;
use podium_shared::{AgentRecord, RankMovement};

use crate::config::{AMOUNT_TWEEN_MS, SALES_TWEEN_MS};

use super::counter::{Counter, CounterClock, CounterKind};
use super::{set_avatar, set_text};

/// One rank-4+ row on screen, bound to the agent id it was created for.
pub struct RowBinding {
    pub id: String,
    pub root: web_sys::HtmlElement,
    rank: web_sys::Element,
    avatar: web_sys::HtmlImageElement,
    name: web_sys::Element,
    movement: web_sys::Element,
    team: web_sys::Element,
    amount: Counter,
    sales: Counter,
}

fn child(
    document: &web_sys::Document,
    parent: &web_sys::Element,
    tag: &str,
    class: &str,
) -> Result<web_sys::Element, wasm_bindgen::JsValue> {
    let el = document.create_element(tag)?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    parent.append_child(&el)?;
    Ok(el)
}

impl RowBinding {
    /// Build the row markup. The caller inserts `root` into the list container.
    pub fn create(document: &web_sys::Document, id: &str) -> Result<Self, wasm_bindgen::JsValue> {
        let root: web_sys::HtmlElement = document.create_element("div")?.dyn_into()?;
        root.set_class_name("row");
        root.set_attribute("role", "listitem")?;

        let rank = child(document, &root, "div", "rank")?;
        let agent = child(document, &root, "div", "agent")?;
        let avatar: web_sys::HtmlImageElement = child(document, &agent, "img", "avatar")?.dyn_into()?;
        avatar.set_attribute("loading", "lazy")?;
        let name_wrap = child(document, &agent, "div", "")?;
        let name = child(document, &name_wrap, "div", "agent-name")?;
        let movement = child(document, &name_wrap, "span", "movement")?;
        let team = child(document, &root, "div", "team-col")?;
        let amount = child(document, &root, "div", "amount-list")?;
        let sales = child(document, &root, "div", "sales-list")?;

        Ok(Self {
            id: id.to_string(),
            root,
            rank,
            avatar,
            name,
            movement,
            team,
            amount: Counter::new(amount, CounterKind::Amount),
            sales: Counter::new(sales, CounterKind::Sales),
        })
    }

    /// Write the record into the row. Unchanged fields are left alone; a fresh
    /// row starts its counters at the target instead of easing up from zero.
    pub fn update(
        &self,
        record: &AgentRecord,
        movement: Option<RankMovement>,
        clock: &CounterClock,
        fresh: bool,
        reduced_motion: bool,
    ) {
        set_text(&self.rank, &record.rank.to_string());
        set_avatar(&self.avatar, &record.avatar_url, &record.name);
        set_text(&self.name, &record.name);
        set_text(&self.team, &team_display_name(&record.team));
        if fresh {
            self.amount.set_immediate(record.amount);
            self.sales.set_immediate(record.sales as f64);
        } else {
            clock.animate_to(&self.amount, record.amount, AMOUNT_TWEEN_MS, reduced_motion);
            clock.animate_to(&self.sales, record.sales as f64, SALES_TWEEN_MS, reduced_motion);
        }

        let movement = movement.unwrap_or(RankMovement::Steady);
        set_text(&self.movement, &movement.indicator());
        if self.movement.class_name() != movement.css_class() {
            self.movement.set_class_name(movement.css_class());
        }
    }
}
