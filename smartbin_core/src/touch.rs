//! Touch latch: absorbs capacitive chatter by holding a touch for a fixed window.

/// Holds `true` for `hold_ms` after the last raw touch.
#[derive(Debug, Clone)]
pub struct TouchLatch {
    hold_ms: u32,
    latched: bool,
    last_touch_at: Option<u32>,
}

impl TouchLatch {
    pub fn new(hold_ms: u32) -> Self {
        Self {
            hold_ms,
            latched: false,
            last_touch_at: None,
        }
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn last_touch_at(&self) -> Option<u32> {
        self.last_touch_at
    }

    /// Feed one raw sample taken at `now` and return the latched output.
    pub fn update(&mut self, raw: bool, now: u32) -> bool {
        if raw {
            self.last_touch_at = Some(now);
            self.latched = true;
        } else if let Some(at) = self.last_touch_at
            && now.wrapping_sub(at) >= self.hold_ms
        {
            self.latched = false;
        }
        self.latched
    }
}
