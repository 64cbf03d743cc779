//! Cancellable one-shot timers driven by the simulation tick

/// A deferred task that fires once after its delay elapses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeferredTimer {
    remaining: Option<f32>,
}

impl DeferredTimer {
    pub fn new() -> Self {
        Self { remaining: None }
    }

    /// (Re)arm the timer; any pending deadline is replaced
    pub fn schedule(&mut self, delay_secs: f32) {
        self.remaining = Some(delay_secs.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advance by `dt`. Returns true exactly once, on the tick the delay runs out.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.remaining else {
            return false;
        };
        let left = remaining - dt;
        if left <= 0.0 {
            self.remaining = None;
            true
        } else {
            self.remaining = Some(left);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once() {
        let mut timer = DeferredTimer::new();
        timer.schedule(0.5);
        assert!(!timer.tick(0.3));
        assert!(timer.tick(0.3));
        assert!(!timer.tick(0.3));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_cancel_suppresses_fire() {
        let mut timer = DeferredTimer::new();
        timer.schedule(0.1);
        timer.cancel();
        assert!(!timer.tick(1.0));
    }

    #[test]
    fn test_reschedule_replaces_deadline() {
        let mut timer = DeferredTimer::new();
        timer.schedule(0.2);
        timer.tick(0.15);
        timer.schedule(0.2);
        assert!(!timer.tick(0.1));
        assert!(timer.tick(0.15));
    }

    #[test]
    fn test_zero_delay_fires_next_tick() {
        let mut timer = DeferredTimer::new();
        timer.schedule(0.0);
        assert!(timer.tick(0.0));
    }
}
