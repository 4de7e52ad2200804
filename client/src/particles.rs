//! Gold particle background drawn on a full-window canvas.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::render_loop::FrameScheduler;
use crate::renderer::prefers_reduced_motion;

/// Ambient pool: one particle per this many square pixels, never fewer than `MIN_PARTICLES`.
const AREA_PER_PARTICLE: f64 = 60_000.0;
const MIN_PARTICLES: usize = 30;
/// Podium bursts stop adding particles once the pool reaches this size.
pub const BURST_CAP: usize = 300;
const ELITE_INTERVAL_MS: u32 = 450;
const SPARKLE_INTERVAL_MS: u32 = 220;
const RESIZE_SETTLE_MS: u32 = 300;
/// How far past the viewport edge a particle may drift before it is recycled.
const EDGE_MARGIN: f64 = 40.0;

pub const CROWN_ANCHOR_ID: &str = "pod-1";

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub life: f64,
    pub ttl: f64,
    pub rot: f64,
    pub rot_speed: f64,
    pub hue: f64,
    pub alpha: f64,
}

/// Rectangle particles burst from, in viewport coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

fn rand(rng: &mut impl FnMut() -> f64, min: f64, max: f64) -> f64 {
    rng() * (max - min) + min
}

/// Particle simulation, independent of the canvas. `rng` yields values in `[0, 1)`.
#[derive(Debug, Default)]
pub struct ParticleField {
    width: f64,
    height: f64,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new(width: f64, height: f64, rng: &mut impl FnMut() -> f64) -> Self {
        let mut field = Self::default();
        field.rebuild(width, height, rng);
        field
    }

    pub fn base_count(width: f64, height: f64) -> usize {
        let scaled = (width.max(0.0) * height.max(0.0) / AREA_PER_PARTICLE).round() as usize;
        scaled.max(MIN_PARTICLES)
    }

    /// Replace the pool with a fresh one sized for the viewport.
    pub fn rebuild(&mut self, width: f64, height: f64, rng: &mut impl FnMut() -> f64) {
        self.width = width;
        self.height = height;
        let count = Self::base_count(width, height);
        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            self.particles.push(Particle {
                x: rand(rng, 0.0, width),
                y: rand(rng, 0.0, height),
                vx: rand(rng, -0.25, 0.25),
                vy: rand(rng, -0.6, -0.15),
                size: rand(rng, 1.8, 6.5),
                life: rand(rng, 8.0, 20.0),
                ttl: 0.0,
                rot: rand(rng, 0.0, TAU),
                rot_speed: rand(rng, -0.02, 0.02),
                hue: rand(rng, 40.0, 48.0),
                alpha: rand(rng, 0.08, 0.22),
            });
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Brighter, faster particles rising from first place.
    pub fn emit_elite(&mut self, anchor: Anchor, count: usize, rng: &mut impl FnMut() -> f64) {
        for _ in 0..count {
            if self.particles.len() >= BURST_CAP {
                return;
            }
            self.particles.push(Particle {
                x: anchor.cx + rand(rng, -anchor.width * 0.25, anchor.width * 0.25),
                y: anchor.cy + rand(rng, -anchor.height * 0.1, anchor.height * 0.1),
                vx: rand(rng, -0.6, 0.6),
                vy: rand(rng, -1.25, -0.6),
                size: rand(rng, 2.5, 6.5),
                life: rand(rng, 4.0, 10.0),
                ttl: 0.0,
                rot: rand(rng, 0.0, TAU),
                rot_speed: rand(rng, -0.04, 0.04),
                hue: rand(rng, 38.0, 50.0),
                alpha: rand(rng, 0.22, 0.7),
            });
        }
    }

    /// Small short-lived sparkles around first place.
    pub fn emit_sparkles(&mut self, anchor: Anchor, count: usize, rng: &mut impl FnMut() -> f64) {
        for _ in 0..count {
            if self.particles.len() >= BURST_CAP {
                return;
            }
            self.particles.push(Particle {
                x: anchor.cx + rand(rng, -anchor.width * 0.35, anchor.width * 0.35),
                y: anchor.cy + rand(rng, -anchor.height * 0.2, anchor.height * 0.2),
                vx: rand(rng, -0.4, 0.4),
                vy: rand(rng, -0.9, -0.4),
                size: rand(rng, 0.9, 2.4),
                life: rand(rng, 2.5, 6.0),
                ttl: 0.0,
                rot: rand(rng, 0.0, TAU),
                rot_speed: rand(rng, -0.06, 0.06),
                hue: rand(rng, 40.0, 50.0),
                alpha: rand(rng, 0.25, 0.7),
            });
        }
    }

    /// Advance one frame. Particles that leave the screen or outlive their
    /// life are respawned below the bottom edge as ambient ones.
    pub fn step(&mut self, rng: &mut impl FnMut() -> f64) {
        let (width, height) = (self.width, self.height);
        for (i, p) in self.particles.iter_mut().enumerate() {
            p.x += p.vx;
            p.y += p.vy;
            p.rot += p.rot_speed;
            p.ttl += 0.01;
            p.vx += (p.ttl + i as f64).sin() * 0.0008;

            let off_screen = p.y < -EDGE_MARGIN || p.x < -EDGE_MARGIN || p.x > width + EDGE_MARGIN;
            if off_screen || p.ttl > p.life {
                p.x = rand(rng, -20.0, width + 20.0);
                p.y = height + rand(rng, 10.0, 80.0);
                p.vx = rand(rng, -0.25, 0.25);
                p.vy = rand(rng, -0.6, -0.15);
                p.ttl = 0.0;
                p.life = rand(rng, 8.0, 20.0);
                p.size = rand(rng, 1.8, 6.5);
                p.alpha = rand(rng, 0.06, 0.22);
            }
        }
    }
}

fn js_rng() -> f64 {
    js_sys::Math::random()
}

fn burst_count(rng: &mut impl FnMut() -> f64) -> usize {
    rand(rng, 1.0, 3.0).round() as usize
}

fn viewport_size(window: &web_sys::Window) -> (f64, f64) {
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

fn crown_anchor(document: &web_sys::Document) -> Option<Anchor> {
    let rect = document
        .get_element_by_id(CROWN_ANCHOR_ID)?
        .get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    Some(Anchor {
        cx: rect.left() + rect.width() / 2.0,
        cy: rect.top() + rect.height() / 2.0,
        width: rect.width(),
        height: rect.height(),
    })
}

fn draw(ctx: &CanvasRenderingContext2d, field: &ParticleField) {
    let (width, height) = field.size();
    ctx.clear_rect(0.0, 0.0, width, height);
    for p in field.particles() {
        ctx.save();
        ctx.set_global_alpha(p.alpha);
        let _ = ctx.translate(p.x, p.y);
        let _ = ctx.rotate(p.rot);
        if let Ok(gradient) = ctx.create_radial_gradient(0.0, 0.0, 0.0, 0.0, 0.0, p.size * 2.0) {
            let hue = p.hue.round();
            let _ = gradient.add_color_stop(0.0, &format!("hsla({hue}, 80%, 65%, 1)"));
            let _ = gradient.add_color_stop(0.5, &format!("hsla({hue}, 70%, 55%, 0.6)"));
            let _ = gradient.add_color_stop(1.0, "rgba(0,0,0,0)");
            ctx.set_fill_style_canvas_gradient(&gradient);
        }
        ctx.begin_path();
        let _ = ctx.arc(0.0, 0.0, p.size, 0.0, TAU);
        ctx.fill();
        ctx.restore();
    }
}

struct ParticleBinding {
    window: web_sys::Window,
    _scheduler: Rc<FrameScheduler>,
    _elite: Option<Interval>,
    _sparkles: Option<Interval>,
    _resize_debounce: Rc<RefCell<Option<Timeout>>>,
    on_resize: Closure<dyn Fn()>,
}

thread_local! {
    static PARTICLE_BINDING: RefCell<Option<ParticleBinding>> = const { RefCell::new(None) };
}

/// Tear down the frame loop, burst intervals and resize listener.
pub fn stop() {
    PARTICLE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.window.remove_event_listener_with_callback(
                "resize",
                old.on_resize.as_ref().unchecked_ref(),
            );
            // Dropping the intervals, pending timeout and scheduler cancels them.
        }
    });
}

fn start(canvas: HtmlCanvasElement) {
    stop();
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let Some(ctx) = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
    else {
        web_sys::console::warn_1(&"Particle canvas has no 2d context".into());
        return;
    };

    let (width, height) = viewport_size(&window);
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);
    let mut rng = js_rng;
    let field = Rc::new(RefCell::new(ParticleField::new(width, height, &mut rng)));

    let reduced_motion = prefers_reduced_motion();
    let scheduler = Rc::new({
        let field = Rc::clone(&field);
        let ctx = ctx.clone();
        FrameScheduler::new(move |_| {
            let mut field = field.borrow_mut();
            if !reduced_motion {
                field.step(&mut js_rng);
            }
            draw(&ctx, &field);
            !reduced_motion
        })
    });

    // Under reduced motion there is a single static frame and no podium bursts.
    let (elite, sparkles) = if reduced_motion {
        (None, None)
    } else {
        let elite = {
            let field = Rc::clone(&field);
            let document = document.clone();
            Interval::new(ELITE_INTERVAL_MS, move || {
                if let Some(anchor) = crown_anchor(&document) {
                    let mut rng = js_rng;
                    let count = burst_count(&mut rng);
                    field.borrow_mut().emit_elite(anchor, count, &mut rng);
                }
            })
        };
        let sparkles = {
            let field = Rc::clone(&field);
            let document = document.clone();
            Interval::new(SPARKLE_INTERVAL_MS, move || {
                if let Some(anchor) = crown_anchor(&document) {
                    let mut rng = js_rng;
                    let count = burst_count(&mut rng);
                    field.borrow_mut().emit_sparkles(anchor, count, &mut rng);
                }
            })
        };
        (Some(elite), Some(sparkles))
    };

    // Canvas size follows the window at once; the pool is rebuilt once resizing settles.
    let resize_debounce: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
    let on_resize = {
        let window = window.clone();
        let field = Rc::clone(&field);
        let scheduler = Rc::downgrade(&scheduler);
        let resize_debounce = Rc::clone(&resize_debounce);
        Closure::<dyn Fn()>::new(move || {
            let (width, height) = viewport_size(&window);
            canvas.set_width(width as u32);
            canvas.set_height(height as u32);

            let field = Rc::clone(&field);
            let scheduler = scheduler.clone();
            let timeout = Timeout::new(RESIZE_SETTLE_MS, move || {
                field.borrow_mut().rebuild(width, height, &mut js_rng);
                if let Some(scheduler) = scheduler.upgrade() {
                    scheduler.wake();
                }
            });
            // Replacing the handle cancels the previous pending rebuild.
            *resize_debounce.borrow_mut() = Some(timeout);
        })
    };
    if let Err(e) =
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
    {
        web_sys::console::warn_1(&format!("Failed to listen for resize: {e:?}").into());
    }

    scheduler.wake();
    PARTICLE_BINDING.with(|slot| {
        *slot.borrow_mut() = Some(ParticleBinding {
            window,
            _scheduler: scheduler,
            _elite: elite,
            _sparkles: sparkles,
            _resize_debounce: resize_debounce,
            on_resize,
        });
    });
}

#[component]
pub fn ParticleCanvas() -> impl IntoView {
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    Effect::new(move || {
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        let canvas: HtmlCanvasElement = canvas.clone();
        start(canvas);
        on_cleanup(stop);
    });

    view! {
        <canvas
            node_ref=canvas_ref
            id="particles"
            aria-hidden="true"
            style="position: fixed; inset: 0; width: 100%; height: 100%; pointer-events: none; z-index: 0;"
        />
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stand-in for `Math.random`.
    fn lcg(seed: u64) -> impl FnMut() -> f64 {
        let mut state = seed;
        move || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        }
    }

    fn anchor() -> Anchor {
        Anchor {
            cx: 500.0,
            cy: 300.0,
            width: 200.0,
            height: 240.0,
        }
    }

    #[test]
    fn pool_scales_with_area_with_a_floor() {
        assert_eq!(ParticleField::base_count(320.0, 480.0), 30);
        assert_eq!(ParticleField::base_count(1920.0, 1080.0), 35);
        assert_eq!(ParticleField::base_count(3840.0, 2160.0), 138);
        assert_eq!(ParticleField::base_count(0.0, 0.0), 30);
    }

    #[test]
    fn fresh_pool_starts_on_screen_and_rising() {
        let mut rng = lcg(7);
        let field = ParticleField::new(800.0, 600.0, &mut rng);
        assert_eq!(field.particles().len(), 30);
        for p in field.particles() {
            assert!((0.0..800.0).contains(&p.x));
            assert!((0.0..600.0).contains(&p.y));
            assert!(p.vy < 0.0);
            assert!(p.alpha > 0.0 && p.alpha < 0.25);
        }
    }

    #[test]
    fn bursts_stop_at_the_cap() {
        let mut rng = lcg(11);
        let mut field = ParticleField::new(800.0, 600.0, &mut rng);
        for _ in 0..200 {
            field.emit_elite(anchor(), 3, &mut rng);
            field.emit_sparkles(anchor(), 3, &mut rng);
        }
        assert_eq!(field.particles().len(), BURST_CAP);
    }

    #[test]
    fn elite_particles_spawn_near_the_anchor() {
        let mut rng = lcg(3);
        let mut field = ParticleField::new(800.0, 600.0, &mut rng);
        field.emit_elite(anchor(), 3, &mut rng);
        for p in &field.particles()[30..] {
            assert!((p.x - 500.0).abs() <= 50.0);
            assert!((p.y - 300.0).abs() <= 24.0);
            assert!(p.vy <= -0.6);
        }
    }

    #[test]
    fn escaped_particles_respawn_below_the_viewport() {
        let mut rng = lcg(5);
        let mut field = ParticleField::new(800.0, 600.0, &mut rng);
        field.particles[0].y = -100.0;
        field.particles[1].ttl = 1_000.0;
        field.step(&mut rng);
        for p in &field.particles[..2] {
            assert!(p.y > 600.0);
            assert_eq!(p.ttl, 0.0);
        }
    }

    #[test]
    fn rebuild_resizes_the_pool() {
        let mut rng = lcg(9);
        let mut field = ParticleField::new(800.0, 600.0, &mut rng);
        field.emit_elite(anchor(), 3, &mut rng);
        field.rebuild(3840.0, 2160.0, &mut rng);
        assert_eq!(field.particles().len(), 138);
        assert_eq!(field.size(), (3840.0, 2160.0));
    }
}
