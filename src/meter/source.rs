/*
 *  meter/source.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Level data sources and the weak handle the meter reads them through
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use atomic_float::AtomicF32;

/// Per-channel level readings. Gains are linear (1.0 = 0 dBFS).
///
/// Implementations are written by an audio producer on another thread and
/// read by the UI; every read is a best-effort snapshot. Out-of-range
/// channels read as silence and clear requests for them are ignored.
pub trait LevelSource: Send + Sync {
    fn num_channels(&self) -> usize;

    /// Instantaneous peak
    fn level(&self, channel: usize) -> f32;

    fn rms_level(&self, channel: usize) -> f32;

    /// Highest peak since the last clear
    fn max_level(&self, channel: usize) -> f32;

    fn clip_flag(&self, channel: usize) -> bool;

    /// Gain reduction as a linear factor, 1.0 = none
    fn reduction_level(&self, channel: usize) -> f32;

    fn clear_clip_flag(&self, channel: usize);

    fn clear_max_level(&self, channel: usize);

    fn max_overall_level(&self) -> f32 {
        (0..self.num_channels())
            .map(|ch| self.max_level(ch))
            .fold(0.0, f32::max)
    }

    fn clear_all_clip_flags(&self) {
        for ch in 0..self.num_channels() {
            self.clear_clip_flag(ch);
        }
    }

    fn clear_all_max_levels(&self) {
        for ch in 0..self.num_channels() {
            self.clear_max_level(ch);
        }
    }
}

/// Non-owning reference to a [`LevelSource`]. The source can be dropped
/// elsewhere at any time; [`SourceHandle::upgrade`] reports that as `None`.
#[derive(Clone)]
pub struct SourceHandle(Weak<dyn LevelSource>);

impl SourceHandle {
    pub fn new<T: LevelSource + 'static>(source: &Arc<T>) -> Self {
        let weak: Weak<T> = Arc::downgrade(source);
        Self(weak)
    }

    pub fn upgrade(&self) -> Option<Arc<dyn LevelSource>> {
        self.0.upgrade()
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Same target (identity, not value)
    pub fn ptr_eq(&self, other: &SourceHandle) -> bool {
        Weak::as_ptr(&self.0).cast::<()>() == Weak::as_ptr(&other.0).cast::<()>()
    }
}

impl<T: LevelSource + 'static> From<&Arc<T>> for SourceHandle {
    fn from(source: &Arc<T>) -> Self {
        SourceHandle::new(source)
    }
}

impl std::fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[derive(Debug)]
struct ChannelLevel {
    peak: AtomicF32,
    rms: AtomicF32,
    max: AtomicF32,
    clip: AtomicBool,
    reduction: AtomicF32,
}

impl Default for ChannelLevel {
    fn default() -> Self {
        Self {
            peak: AtomicF32::new(0.0),
            rms: AtomicF32::new(0.0),
            max: AtomicF32::new(0.0),
            clip: AtomicBool::new(false),
            reduction: AtomicF32::new(1.0),
        }
    }
}

/// Lock-free (per value) level store fed by an audio producer.
///
/// The producer pushes already measured peak/RMS values; this type only keeps
/// the max hold and clip flag bookkeeping. The channel vector itself sits
/// behind a lock that is only taken for writing on [`MeterSource::resize`].
#[derive(Debug, Default)]
pub struct MeterSource {
    channels: RwLock<Vec<ChannelLevel>>,
}

impl MeterSource {
    pub fn new(num_channels: usize) -> Self {
        let channels = (0..num_channels).map(|_| ChannelLevel::default()).collect();
        Self {
            channels: RwLock::new(channels),
        }
    }

    /// Convenience constructor returning the shared form the meter binds to
    pub fn shared(num_channels: usize) -> Arc<Self> {
        Arc::new(Self::new(num_channels))
    }

    /// Change the channel count. Existing channels keep their readings.
    pub fn resize(&self, num_channels: usize) {
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        channels.resize_with(num_channels, ChannelLevel::default);
    }

    /// Push one measurement. Updates the max hold, and sets the clip flag
    /// when the peak exceeds full scale.
    pub fn set_levels(&self, channel: usize, peak: f32, rms: f32) {
        self.with_channel(channel, |c| {
            c.peak.store(peak, Ordering::Relaxed);
            c.rms.store(rms, Ordering::Relaxed);
            if peak > c.max.load(Ordering::Relaxed) {
                c.max.store(peak, Ordering::Relaxed);
            }
            if peak > 1.0 {
                c.clip.store(true, Ordering::Relaxed);
            }
        });
    }

    pub fn set_reduction_level(&self, channel: usize, reduction: f32) {
        self.with_channel(channel, |c| c.reduction.store(reduction, Ordering::Relaxed));
    }

    fn with_channel<R>(&self, channel: usize, f: impl FnOnce(&ChannelLevel) -> R) -> Option<R> {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels.get(channel).map(f)
    }
}

impl LevelSource for MeterSource {
    fn num_channels(&self) -> usize {
        self.channels.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn level(&self, channel: usize) -> f32 {
        self.with_channel(channel, |c| c.peak.load(Ordering::Relaxed)).unwrap_or(0.0)
    }

    fn rms_level(&self, channel: usize) -> f32 {
        self.with_channel(channel, |c| c.rms.load(Ordering::Relaxed)).unwrap_or(0.0)
    }

    fn max_level(&self, channel: usize) -> f32 {
        self.with_channel(channel, |c| c.max.load(Ordering::Relaxed)).unwrap_or(0.0)
    }

    fn clip_flag(&self, channel: usize) -> bool {
        self.with_channel(channel, |c| c.clip.load(Ordering::Relaxed)).unwrap_or(false)
    }

    fn reduction_level(&self, channel: usize) -> f32 {
        self.with_channel(channel, |c| c.reduction.load(Ordering::Relaxed)).unwrap_or(1.0)
    }

    fn clear_clip_flag(&self, channel: usize) {
        self.with_channel(channel, |c| c.clip.store(false, Ordering::Relaxed));
    }

    fn clear_max_level(&self, channel: usize) {
        self.with_channel(channel, |c| c.max.store(0.0, Ordering::Relaxed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_and_max_hold() {
        let src = MeterSource::new(2);
        src.set_levels(0, 0.5, 0.25);
        src.set_levels(0, 0.3, 0.2);
        assert_eq!(src.level(0), 0.3);
        assert_eq!(src.rms_level(0), 0.2);
        assert_eq!(src.max_level(0), 0.5);
        assert!(!src.clip_flag(0));

        src.set_levels(1, 1.2, 0.9);
        assert!(src.clip_flag(1));
        assert_eq!(src.max_overall_level(), 1.2);
    }

    #[test]
    fn test_clear() {
        let src = MeterSource::new(2);
        src.set_levels(0, 1.5, 0.9);
        src.set_levels(1, 1.5, 0.9);
        src.clear_clip_flag(0);
        assert!(!src.clip_flag(0));
        assert!(src.clip_flag(1));
        src.clear_all_clip_flags();
        assert!(!src.clip_flag(1));

        src.clear_max_level(1);
        assert_eq!(src.max_level(1), 0.0);
        assert_eq!(src.max_level(0), 1.5);
        src.clear_all_max_levels();
        assert_eq!(src.max_overall_level(), 0.0);
    }

    #[test]
    fn test_out_of_range_is_silent() {
        let src = MeterSource::new(1);
        src.set_levels(5, 2.0, 2.0);
        src.clear_clip_flag(5);
        assert_eq!(src.level(5), 0.0);
        assert!(!src.clip_flag(5));
        assert_eq!(src.reduction_level(5), 1.0);
    }

    #[test]
    fn test_resize_keeps_readings() {
        let src = MeterSource::new(1);
        src.set_levels(0, 0.7, 0.5);
        src.resize(3);
        assert_eq!(src.num_channels(), 3);
        assert_eq!(src.level(0), 0.7);
        assert_eq!(src.level(2), 0.0);
        src.resize(0);
        assert_eq!(src.num_channels(), 0);
    }

    #[test]
    fn test_handle_liveness() {
        let src = MeterSource::shared(2);
        let handle = SourceHandle::from(&src);
        assert!(handle.is_alive());
        assert_eq!(handle.upgrade().map(|s| s.num_channels()), Some(2));
        assert!(handle.ptr_eq(&SourceHandle::new(&src)));

        drop(src);
        assert!(!handle.is_alive());
        assert!(handle.upgrade().is_none());
    }

    #[test]
    fn test_concurrent_producer() {
        let src = MeterSource::shared(2);
        let producer = {
            let src = Arc::clone(&src);
            std::thread::spawn(move || {
                for i in 0..1000 {
                    let g = (i % 100) as f32 / 100.0;
                    src.set_levels(i % 2, g, g * 0.7);
                }
            })
        };
        for _ in 0..1000 {
            let _ = src.level(0) + src.rms_level(1);
        }
        producer.join().unwrap();
        assert!(src.max_level(0) <= 0.99);
    }
}
