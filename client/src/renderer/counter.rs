use std::cell::RefCell;
use std::rc::Rc;

use podium_shared::format::{format_sales, write_amount};

use crate::animation::CounterTween;
use crate::render_loop::FrameScheduler;

use super::{now_ms, set_text};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterKind {
    Amount,
    Sales,
}

/// What a retarget asked of the counter.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Retarget {
    /// Already heading to that value; nothing to write.
    Unchanged,
    /// Show the value now, no frames needed.
    Immediate(f64),
    /// A tween started under this generation.
    Animate(u64),
}

/// Displayed value, target and running tween of one counter, kept apart from
/// the element it writes to.
#[derive(Debug, Default)]
struct CounterTrack {
    shown: f64,
    target: f64,
    /// Bumped on every retarget; frames carrying an older value are dropped.
    generation: u64,
    tween: Option<CounterTween>,
}

impl CounterTrack {
    fn jump(&mut self, value: f64) {
        self.generation = self.generation.wrapping_add(1);
        self.tween = None;
        self.target = value;
        self.shown = value;
    }

    fn retarget(&mut self, target: f64, now: f64, duration_ms: f64, reduced_motion: bool) -> Retarget {
        if self.target == target {
            return Retarget::Unchanged;
        }
        if reduced_motion || self.shown == target {
            self.jump(target);
            return Retarget::Immediate(target);
        }
        self.generation = self.generation.wrapping_add(1);
        self.target = target;
        self.tween = Some(CounterTween::new(self.shown, target, now, duration_ms));
        Retarget::Animate(self.generation)
    }

    /// Value to show for a frame scheduled under `generation`, and whether the
    /// tween wants another frame. `None` when that frame is stale.
    fn step(&mut self, generation: u64, now: f64) -> Option<(f64, bool)> {
        if generation != self.generation {
            return None;
        }
        let tween = self.tween?;
        match tween.current_value(now) {
            Some(value) => {
                // Whole units while in flight; the exact target lands on the last frame.
                self.shown = value.round();
                Some((self.shown, true))
            }
            None => {
                self.tween = None;
                self.shown = tween.to;
                Some((tween.to, false))
            }
        }
    }

    /// Snap a tween started under `generation` to its target.
    fn finish(&mut self, generation: u64) -> Option<f64> {
        if generation != self.generation {
            return None;
        }
        self.tween = None;
        self.shown = self.target;
        Some(self.target)
    }
}

/// A numeric text element (amount or sales) that can ease between values.
#[derive(Clone)]
pub struct Counter {
    cell: Rc<CounterCell>,
}

struct CounterCell {
    el: web_sys::Element,
    kind: CounterKind,
    track: RefCell<CounterTrack>,
    text: RefCell<String>,
}

impl CounterCell {
    fn show(&self, value: f64) {
        let mut text = self.text.borrow_mut();
        match self.kind {
            CounterKind::Amount => write_amount(&mut text, value),
            CounterKind::Sales => {
                text.clear();
                text.push_str(&format_sales(value.round().max(0.0) as u64));
            }
        }
        set_text(&self.el, &text);
    }

    /// Advance one frame. Returns whether the tween is still running.
    fn step(&self, generation: u64, now: f64) -> bool {
        let frame = self.track.borrow_mut().step(generation, now);
        match frame {
            Some((value, running)) => {
                self.show(value);
                running
            }
            None => false,
        }
    }
}

impl Counter {
    pub fn new(el: web_sys::Element, kind: CounterKind) -> Self {
        Self {
            cell: Rc::new(CounterCell {
                el,
                kind,
                track: RefCell::new(CounterTrack::default()),
                text: RefCell::new(String::new()),
            }),
        }
    }

    /// Jump straight to `value`, cancelling any running tween.
    pub fn set_immediate(&self, value: f64) {
        self.cell.track.borrow_mut().jump(value);
        self.cell.show(value);
    }
}

/// Steps every running counter from a single animation frame loop.
pub struct CounterClock {
    active: Rc<RefCell<Vec<(Rc<CounterCell>, u64)>>>,
    scheduler: FrameScheduler,
}

impl CounterClock {
    pub fn new() -> Self {
        let active: Rc<RefCell<Vec<(Rc<CounterCell>, u64)>>> = Rc::new(RefCell::new(Vec::new()));
        let frame_active = Rc::clone(&active);
        let scheduler = FrameScheduler::new(move |now| {
            let mut active = frame_active.borrow_mut();
            active.retain(|(cell, generation)| cell.step(*generation, now));
            !active.is_empty()
        });
        Self { active, scheduler }
    }

    /// Ease `counter` from what it currently shows to `target`. A call with the
    /// same target as the running one is ignored; a new target supersedes it.
    pub fn animate_to(&self, counter: &Counter, target: f64, duration_ms: f64, reduced_motion: bool) {
        let cell = &counter.cell;
        let retarget = cell
            .track
            .borrow_mut()
            .retarget(target, now_ms(), duration_ms, reduced_motion);
        match retarget {
            Retarget::Unchanged => {}
            Retarget::Immediate(value) => cell.show(value),
            Retarget::Animate(generation) => {
                self.active.borrow_mut().push((Rc::clone(cell), generation));
                self.scheduler.wake();
            }
        }
    }

    /// Snap every running counter to its target and stop the frame loop.
    pub fn finish_all(&self) {
        self.scheduler.cancel();
        for (cell, generation) in self.active.borrow_mut().drain(..) {
            let finished = cell.track.borrow_mut().finish(generation);
            if let Some(value) = finished {
                cell.show(value);
            }
        }
    }
}

impl Default for CounterClock {
    fn default() -> Self {
        Self::new()
    }
}
