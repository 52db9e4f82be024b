/*
 *  pacer.rs
 *
 *  levelmeter - meters, meters, meters
 *	(c) 2020-26 Stuart Hunter
 *
 *	Periodic tick drivers for the meter refresh
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use std::time::{Duration, Instant};

/// Recurring-callback capability the meter consumes. The host owns the
/// clock and asks the driver, on its own loop, whether a tick is due.
pub trait TickDriver {
    /// (Re)start at `rate_hz` ticks per second (> 0).
    fn start(&mut self, rate_hz: u32);

    /// Stop; no tick is due until the next `start`.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Current rate, 0 when stopped
    fn rate_hz(&self) -> u32;

    /// Returns true if a tick is due at `now`; if true, it also schedules
    /// the next deadline. At most one tick is reported per deadline.
    fn tick_due(&mut self, now: Instant) -> bool;
}

#[inline]
fn frame_for(rate_hz: u32) -> Duration {
    Duration::from_micros((1_000_000u32 / rate_hz.max(1)) as u64)
}

/// Deadline based driver. A freshly started pacer ticks on its first poll.
#[derive(Debug, Clone)]
pub struct Pacer {
    rate_hz: u32,
    frame: Duration,
    // None while running means "due immediately"
    next_deadline: Option<Instant>,
}

impl Pacer {
    /// `rate_hz == 0` creates a stopped pacer.
    pub fn new(rate_hz: u32) -> Self {
        Self {
            rate_hz,
            frame: frame_for(rate_hz),
            next_deadline: None,
        }
    }

    /// Length of one tick period
    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// Pending deadline, None when stopped or due immediately
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_deadline
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TickDriver for Pacer {
    fn start(&mut self, rate_hz: u32) {
        if rate_hz == 0 {
            self.stop();
            return;
        }
        let frame = frame_for(rate_hz);
        if self.rate_hz > 0 {
            // re-rate while running: the pending tick keeps its anchor, only
            // the period after the last tick changes
            if let Some(deadline) = self.next_deadline {
                let last = deadline.checked_sub(self.frame).unwrap_or(deadline);
                self.next_deadline = Some(last + frame);
            }
        } else {
            self.next_deadline = None;
        }
        self.rate_hz = rate_hz;
        self.frame = frame;
    }

    fn stop(&mut self) {
        self.rate_hz = 0;
        self.next_deadline = None;
    }

    fn is_running(&self) -> bool {
        self.rate_hz > 0
    }

    fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    #[inline]
    fn tick_due(&mut self, now: Instant) -> bool {
        if self.rate_hz == 0 {
            return false;
        }
        match self.next_deadline {
            Some(deadline) if now < deadline => false,
            _ => {
                self.next_deadline = Some(now + self.frame);
                true
            }
        }
    }
}
