use std::time::{Duration, Instant};

use crate::constants::{
    DEFAULT_INSTRUCTION_RATE, DEFAULT_REFRESH_RATE, DEFAULT_SCALE, DEFAULT_TICK_RATE,
};
use crate::error::CoreError;

/// Timing parameters supplied by the host.
///
/// These configure the scheduler and the presentation scale; they are not
/// part of the core's behavioral contract beyond being positive.
#[derive(Copy, Clone, Debug)]
pub struct Config {
    /// Instruction cycles per second.
    pub instruction_rate: u32,
    /// Timer decrements per second, independent of the instruction rate.
    pub tick_rate: u32,
    /// Presentation flushes per second.
    pub refresh_rate: u32,
    /// Display scale factor (logical pixel -> screen pixels).
    pub scale: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instruction_rate: DEFAULT_INSTRUCTION_RATE,
            tick_rate: DEFAULT_TICK_RATE,
            refresh_rate: DEFAULT_REFRESH_RATE,
            scale: DEFAULT_SCALE,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.instruction_rate == 0 {
            return Err(CoreError::InvalidConfig("instruction rate"));
        }
        if self.tick_rate == 0 {
            return Err(CoreError::InvalidConfig("tick rate"));
        }
        if self.refresh_rate == 0 {
            return Err(CoreError::InvalidConfig("refresh rate"));
        }
        if self.scale == 0 {
            return Err(CoreError::InvalidConfig("display scale"));
        }
        Ok(())
    }
}

/// Three fixed-rate deadline lanes sharing one monotonic clock.
///
/// Each lane fires at most once per poll and reschedules relative to the
/// poll time, so a stalled host loop never produces a burst of catch-up
/// cycles; the loop iteration rate itself approximates the target
/// frequency. The timer lane deliberately does not scale with the
/// instruction lane.
pub struct Scheduler {
    cycle_interval: Duration,
    tick_interval: Duration,
    refresh_interval: Duration,
    next_cycle: Instant,
    next_tick: Instant,
    next_refresh: Instant,
}

impl Scheduler {
    pub fn new(config: &Config) -> Result<Self, CoreError> {
        config.validate()?;
        let now = Instant::now();
        let cycle_interval = Duration::from_secs(1) / config.instruction_rate;
        let tick_interval = Duration::from_secs(1) / config.tick_rate;
        let refresh_interval = Duration::from_secs(1) / config.refresh_rate;
        Ok(Scheduler {
            cycle_interval,
            tick_interval,
            refresh_interval,
            next_cycle: now,
            next_tick: now,
            next_refresh: now,
        })
    }

    /// True when an instruction cycle is due; reschedules the lane.
    pub fn cycle_due(&mut self, now: Instant) -> bool {
        if now >= self.next_cycle {
            self.next_cycle = now + self.cycle_interval;
            true
        } else {
            false
        }
    }

    /// True when a timer tick is due; reschedules the lane.
    pub fn tick_due(&mut self, now: Instant) -> bool {
        if now >= self.next_tick {
            self.next_tick = now + self.tick_interval;
            true
        } else {
            false
        }
    }

    /// True when a presentation flush is due; reschedules the lane.
    pub fn refresh_due(&mut self, now: Instant) -> bool {
        if now >= self.next_refresh {
            self.next_refresh = now + self.refresh_interval;
            true
        } else {
            false
        }
    }

    /// The nearest pending deadline, for the host to sleep until.
    pub fn idle_until(&self) -> Instant {
        self.next_cycle.min(self.next_tick).min(self.next_refresh)
    }
}
