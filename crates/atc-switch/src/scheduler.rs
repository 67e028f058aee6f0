//! Every-Nth-tick scheduling

/// Fires on every `every`-th call to [`TickScheduler::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickScheduler {
    every: u32,
    count: u32,
}

impl TickScheduler {
    /// `every` of 0 is treated as 1 (fire on every tick)
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            count: 0,
        }
    }

    /// Count a tick; returns whether this tick is due
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.every {
            self.count = 0;
            true
        } else {
            false
        }
    }

    /// Change the period, keeping progress if still below it
    pub fn set_every(&mut self, every: u32) {
        self.every = every.max(1);
        if self.count >= self.every {
            self.count = 0;
        }
    }

    pub fn every(&self) -> u32 {
        self.every
    }

    /// Make the next tick due
    pub fn force_next(&mut self) {
        self.count = self.every - 1;
    }
}
