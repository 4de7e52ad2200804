/// A numeric counter animation, e.g. an amount ticking up from $1,200 to $1,450.
#[derive(Debug, Clone, Copy)]
pub struct CounterTween {
    pub from: f64,
    pub to: f64,
    pub start_time: f64,
    pub duration: f64, // milliseconds
}

impl CounterTween {
    pub fn new(from: f64, to: f64, start_time: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            start_time,
            duration,
        }
    }

    /// Returns the interpolated value, or None once the animation is complete.
    pub fn current_value(&self, now: f64) -> Option<f64> {
        let elapsed = now - self.start_time;
        if self.duration <= 0.0 || elapsed >= self.duration {
            return None;
        }

        let t = cubic_ease_out((elapsed / self.duration).max(0.0));
        Some(self.from + (self.to - self.from) * t)
    }
}

/// Cubic ease-out: decelerating to zero velocity.
pub fn cubic_ease_out(t: f64) -> f64 {
    let t = t - 1.0;
    t * t * t + 1.0
}
