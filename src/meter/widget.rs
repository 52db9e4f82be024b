/*
 *  meter/widget.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  The level meter widget: tick driven refresh over a cached background
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

use core::convert::Infallible;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{debug, info, warn};

use crate::meter::colour::ColourRole;
use crate::meter::flags::MeterFlags;
use crate::meter::listener::{ListenerRegistry, MeterEvent, MeterListener};
use crate::meter::source::{LevelSource, SourceHandle};
use crate::meter::style::{ChannelLayout, MeterStyle, displayed_channels, is_empty};
use crate::pacer::{Pacer, TickDriver};
use crate::vframebuf::VarFrameBuf;

pub const DEFAULT_REFRESH_RATE_HZ: u32 = 30;

/// Whether periodic refresh is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Dormant,
    Active,
}

/// Whether a live level source is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Unbound,
    Bound,
}

/// Cached result of the style's layout queries, in widget-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterLayout {
    pub inner: Rectangle,
    pub channels: Vec<ChannelLayout>,
}

impl MeterLayout {
    fn empty() -> Self {
        Self {
            inner: Rectangle::zero(),
            channels: Vec::new(),
        }
    }

    pub fn channel(&self, channel: usize) -> Option<&ChannelLayout> {
        self.channels.iter().find(|l| l.channel == channel)
    }
}

/// Multi-channel level meter.
///
/// The widget never pulls on its own: a host loop calls [`LevelMeter::poll`]
/// (or [`LevelMeter::on_tick`]) and [`LevelMeter::paint`]. Static parts are
/// rendered once into a cached background and only redrawn after a resize,
/// a channel count change or an explicit invalidation. With the cache turned
/// off ([`LevelMeter::set_use_background_image`]) they are drawn straight
/// onto the target every frame instead.
pub struct LevelMeter<S: MeterStyle> {
    style: S,
    flags: MeterFlags,
    source: Option<SourceHandle>,
    // channel count the layout was built for
    num_channels: usize,
    selected_channel: Option<usize>,
    refresh_rate: u32,
    driver: Box<dyn TickDriver>,
    bounds: Rectangle,
    layout: MeterLayout,
    background: VarFrameBuf<S::Color>,
    use_background_image: bool,
    background_needs_repaint: bool,
    repaint_pending: bool,
    background_renders: u64,
    listeners: ListenerRegistry,
}

impl<S: MeterStyle> LevelMeter<S> {
    pub fn new(style: S, flags: MeterFlags) -> Self {
        Self::with_driver(style, flags, Box::new(Pacer::default()))
    }

    /// Construct with a host supplied tick driver. The driver is started at
    /// [`DEFAULT_REFRESH_RATE_HZ`].
    pub fn with_driver(style: S, flags: MeterFlags, mut driver: Box<dyn TickDriver>) -> Self {
        driver.start(DEFAULT_REFRESH_RATE_HZ);
        let background = VarFrameBuf::new(0, 0, style.colour(ColourRole::Background));
        info!("level meter created, flags {}", flags);
        Self {
            style,
            flags,
            source: None,
            num_channels: 0,
            selected_channel: None,
            refresh_rate: DEFAULT_REFRESH_RATE_HZ,
            driver,
            bounds: Rectangle::zero(),
            layout: MeterLayout::empty(),
            background,
            use_background_image: true,
            background_needs_repaint: true,
            repaint_pending: false,
            background_renders: 0,
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn style(&self) -> &S {
        &self.style
    }

    pub fn flags(&self) -> MeterFlags {
        self.flags
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn layout(&self) -> &MeterLayout {
        &self.layout
    }

    pub fn selected_channel(&self) -> Option<usize> {
        self.selected_channel
    }

    pub fn refresh_rate_hz(&self) -> u32 {
        self.refresh_rate
    }

    pub fn activity(&self) -> Activity {
        if self.driver.is_running() {
            Activity::Active
        } else {
            Activity::Dormant
        }
    }

    pub fn binding(&self) -> Binding {
        if self.live_source().is_some() {
            Binding::Bound
        } else {
            Binding::Unbound
        }
    }

    /// A frame is waiting to be painted
    pub fn needs_repaint(&self) -> bool {
        self.repaint_pending
    }

    pub fn uses_background_image(&self) -> bool {
        self.use_background_image
    }

    pub fn background_needs_repaint(&self) -> bool {
        self.background_needs_repaint
    }

    /// Number of times the cached background has been regenerated
    pub fn background_renders(&self) -> u64 {
        self.background_renders
    }

    /// Number of channels the current layout shows data for
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    // -- configuration --

    /// Attach (`Some`) or detach (`None`) the level source. A handle whose
    /// source is already gone counts as detached.
    pub fn set_meter_source(&mut self, source: Option<SourceHandle>) {
        match source {
            Some(handle) if handle.is_alive() => {
                info!("meter source attached");
                self.source = Some(handle);
            }
            Some(_) => {
                warn!("meter source already dropped, treated as detached");
                self.source = None;
            }
            None => {
                if self.source.take().is_some() {
                    info!("meter source detached");
                }
            }
        }
        self.sync_channels();
        self.repaint_pending = true;
    }

    /// `None` shows all channels. An index the attached source does not have
    /// is ignored.
    pub fn set_selected_channel(&mut self, channel: Option<usize>) {
        if let (Some(ch), Some(src)) = (channel, self.live_source()) {
            if ch >= src.num_channels() {
                warn!("selected channel {} out of range ({} channels), ignored", ch, src.num_channels());
                return;
            }
        }
        self.selected_channel = channel;
        if self.flags.contains(MeterFlags::SINGLE_CHANNEL) {
            // same geometry, only the channel index of the slot moves
            self.relayout();
        }
        self.repaint_pending = true;
    }

    /// Cache the static layer in an offscreen image (the default) or redraw
    /// it onto the target on every paint. Turning the cache off frees it.
    pub fn set_use_background_image(&mut self, on: bool) {
        if on == self.use_background_image {
            return;
        }
        self.use_background_image = on;
        if !on {
            self.background = VarFrameBuf::new(0, 0, self.style.colour(ColourRole::Background));
        }
        debug!("background image {}", if on { "cached" } else { "direct" });
        self.invalidate_background();
    }

    /// 0 stops periodic refresh, anything else (re)starts it at that rate.
    pub fn set_refresh_rate_hz(&mut self, rate_hz: u32) {
        self.refresh_rate = rate_hz;
        if rate_hz == 0 {
            self.driver.stop();
            info!("meter refresh stopped");
        } else {
            self.driver.start(rate_hz);
            info!("meter refresh at {} Hz", rate_hz);
        }
    }

    // -- timing --

    /// Periodic refresh body.
    pub fn on_tick(&mut self) {
        self.sync_channels();
        if self.use_background_image && self.background_needs_repaint {
            self.render_background();
        }
        self.repaint_pending = true;
    }

    /// Run a tick if the driver says one is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.driver.tick_due(now) {
            self.on_tick();
            true
        } else {
            false
        }
    }

    // -- geometry and painting --

    /// New outer bounds in the host's coordinates.
    pub fn resized(&mut self, bounds: Rectangle) {
        debug!("meter resized to {:?}", bounds);
        self.bounds = bounds;
        self.relayout();
        self.invalidate_background();
    }

    /// Force the static layer to be rebuilt on the next tick or paint.
    pub fn invalidate_background(&mut self) {
        self.background_needs_repaint = true;
        self.repaint_pending = true;
    }

    /// Static layer (cached or direct) then the live readings onto `target`.
    pub fn paint<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = S::Color>,
    {
        let mut area = target.cropped(&self.bounds);
        if self.use_background_image {
            if self.background_needs_repaint {
                self.render_background();
            }
            self.background.blit(&mut area, Point::zero())?;
        } else {
            draw_static(&self.style, &mut area, self.flags, self.bounds.size, &self.layout)?;
        }

        if let Some(src) = self.live_source() {
            let highlight = if self.flags.contains(MeterFlags::SINGLE_CHANNEL) {
                None
            } else {
                self.selected_channel
            };
            self.style
                .draw_meter_bars(&mut area, self.flags, &self.layout.channels, src.as_ref(), highlight)?;
        }
        self.repaint_pending = false;
        Ok(())
    }

    /// Absolute clip light rectangle of a displayed channel
    pub fn clip_indicator_bounds(&self, channel: usize) -> Option<Rectangle> {
        self.layout
            .channel(channel)
            .map(|l| l.clip_indicator)
            .filter(|r| !is_empty(r))
            .map(|r| r.translate(self.bounds.top_left))
    }

    /// Absolute max readout rectangle of a displayed channel
    pub fn max_number_bounds(&self, channel: usize) -> Option<Rectangle> {
        self.layout
            .channel(channel)
            .map(|l| l.max_number)
            .filter(|r| !is_empty(r))
            .map(|r| r.translate(self.bounds.top_left))
    }

    // -- clears --

    /// Reset the clip flag of one channel, or all with `None`.
    pub fn clear_clip_indicator(&mut self, channel: Option<usize>) {
        if let Some(src) = self.live_source() {
            match channel {
                Some(ch) => src.clear_clip_flag(ch),
                None => src.clear_all_clip_flags(),
            }
        }
        self.repaint_pending = true;
    }

    /// Reset the max hold of one channel, or all with `None`.
    pub fn clear_max_level_display(&mut self, channel: Option<usize>) {
        if let Some(src) = self.live_source() {
            match channel {
                Some(ch) => src.clear_max_level(ch),
                None => src.clear_all_max_levels(),
            }
        }
        self.repaint_pending = true;
    }

    // -- input --

    /// Primary click at `position` (host coordinates). Clip lights and max
    /// readouts are tested independently; each hit is delivered to every
    /// listener before this returns, clip light first.
    pub fn on_pointer_down(&mut self, position: Point) -> Vec<MeterEvent> {
        if !self.bounds.contains(position) {
            return Vec::new();
        }
        let local = position - self.bounds.top_left;
        let channels = &self.layout.channels;
        let events: Vec<MeterEvent> = [
            self.style
                .hit_test_clip_indicator(local, channels)
                .map(MeterEvent::ClipLightClicked),
            self.style
                .hit_test_max_number(local, channels)
                .map(MeterEvent::MaxLevelClicked),
        ]
        .into_iter()
        .flatten()
        .collect();
        for &event in &events {
            debug!("pointer {:?} hit {:?}", position, event);
            self.listeners.notify(event);
        }
        events
    }

    /// Secondary click: reset every clip light and max readout. Returns
    /// false when `position` is outside the meter.
    pub fn on_context_click(&mut self, position: Point) -> bool {
        if !self.bounds.contains(position) {
            return false;
        }
        if let Some(src) = self.live_source() {
            src.clear_all_clip_flags();
            src.clear_all_max_levels();
        }
        debug!("context click, clip and max cleared");
        self.invalidate_background();
        true
    }

    // -- listeners --

    pub fn add_listener(&mut self, listener: Rc<dyn MeterListener>) -> bool {
        self.listeners.add(listener)
    }

    pub fn remove_listener<L: MeterListener + ?Sized>(&mut self, listener: &Rc<L>) -> bool {
        self.listeners.remove(listener)
    }

    /// Shared handle to the registry, for listeners that manage themselves
    pub fn listeners(&self) -> ListenerRegistry {
        self.listeners.clone()
    }

    // -- internals --

    fn live_source(&self) -> Option<Arc<dyn LevelSource>> {
        self.source.as_ref().and_then(SourceHandle::upgrade)
    }

    /// Follow the source: drop a dead handle, relayout on a channel count
    /// change.
    fn sync_channels(&mut self) {
        let n = match self.live_source() {
            Some(src) => src.num_channels(),
            None => {
                if self.source.take().is_some() {
                    info!("meter source dropped, showing placeholder");
                }
                0
            }
        };
        if n == self.num_channels {
            return;
        }
        debug!("channel count {} -> {}", self.num_channels, n);
        self.num_channels = n;
        if n > 0 && self.selected_channel.is_some_and(|ch| ch >= n) {
            warn!("selected channel no longer exists, showing all channels");
            self.selected_channel = None;
        }
        self.relayout();
        self.background_needs_repaint = true;
    }

    fn relayout(&mut self) {
        let local = Rectangle::new(Point::zero(), self.bounds.size);
        let inner = self.style.meter_inner_bounds(local, self.flags);
        let shown = displayed_channels(self.flags, self.num_channels, self.selected_channel);
        self.layout = MeterLayout {
            inner,
            channels: self.style.layout_channels(self.flags, inner, &shown),
        };
    }

    fn render_background(&mut self) {
        let fill = self.style.colour(ColourRole::Background);
        if self.background.reset(self.bounds.size, fill) {
            debug!("background buffer now {}x{}", self.background.width(), self.background.height());
        }
        let size = self.bounds.size;
        let drawn: Result<(), Infallible> = draw_static(&self.style, &mut self.background, self.flags, size, &self.layout);
        if let Err(e) = drawn {
            match e {}
        }
        self.background_needs_repaint = false;
        self.background_renders += 1;
    }
}

/// Static layer in widget-local coordinates
fn draw_static<S, D>(style: &S, target: &mut D, flags: MeterFlags, size: Size, layout: &MeterLayout) -> Result<(), D::Error>
where
    S: MeterStyle,
    D: DrawTarget<Color = S::Color>,
{
    style.draw_background(target, flags, Rectangle::new(Point::zero(), size))?;
    style.draw_meter_bars_background(target, flags, &layout.channels)
}

impl<S: MeterStyle> Drop for LevelMeter<S> {
    fn drop(&mut self) {
        self.driver.stop();
        self.listeners.close();
        debug!("level meter dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::classic::ClassicStyle;
    use crate::meter::colour::MonoScheme;
    use crate::meter::source::MeterSource;
    use embedded_graphics::pixelcolor::BinaryColor;
    use std::time::Duration;

    fn meter(flags: MeterFlags) -> LevelMeter<ClassicStyle<MonoScheme>> {
        let mut m = LevelMeter::new(ClassicStyle::new(MonoScheme::new()), flags);
        m.resized(Rectangle::new(Point::zero(), Size::new(64, 48)));
        m
    }

    #[test]
    fn test_defaults() {
        let m = meter(MeterFlags::default());
        assert_eq!(m.refresh_rate_hz(), DEFAULT_REFRESH_RATE_HZ);
        assert_eq!(m.activity(), Activity::Active);
        assert_eq!(m.binding(), Binding::Unbound);
        assert_eq!(m.selected_channel(), None);
        assert!(m.background_needs_repaint());
        assert!(m.layout().channels.is_empty());
    }

    #[test]
    fn test_source_binding_relayouts() {
        let mut m = meter(MeterFlags::default());
        let src = MeterSource::shared(2);
        m.on_tick();
        let renders = m.background_renders();

        m.set_meter_source(Some(SourceHandle::from(&src)));
        assert_eq!(m.binding(), Binding::Bound);
        assert_eq!(m.layout().channels.len(), 2);
        assert!(m.background_needs_repaint());
        m.on_tick();
        assert_eq!(m.background_renders(), renders + 1);

        // same channel count, background untouched
        let other = MeterSource::shared(2);
        m.set_meter_source(Some(SourceHandle::from(&other)));
        assert!(!m.background_needs_repaint());
    }

    #[test]
    fn test_source_death_unbinds_on_tick() {
        let mut m = meter(MeterFlags::default());
        let src = MeterSource::shared(3);
        m.set_meter_source(Some(SourceHandle::from(&src)));
        m.on_tick();
        drop(src);
        assert_eq!(m.binding(), Binding::Unbound);
        m.on_tick();
        assert_eq!(m.num_channels(), 0);
        assert!(m.layout().channels.is_empty());
    }

    #[test]
    fn test_selected_channel_out_of_range_ignored() {
        let mut m = meter(MeterFlags::default());
        let src = MeterSource::shared(2);
        m.set_meter_source(Some(SourceHandle::from(&src)));
        m.set_selected_channel(Some(1));
        m.set_selected_channel(Some(5));
        assert_eq!(m.selected_channel(), Some(1));
    }

    #[test]
    fn test_single_channel_follows_selection() {
        let mut m = meter(MeterFlags::SINGLE_CHANNEL | MeterFlags::HAS_BORDER);
        let src = MeterSource::shared(4);
        m.set_meter_source(Some(SourceHandle::from(&src)));
        m.on_tick();
        assert_eq!(m.layout().channels[0].channel, 0);

        m.set_selected_channel(Some(3));
        assert_eq!(m.layout().channels.len(), 1);
        assert_eq!(m.layout().channels[0].channel, 3);
        assert!(!m.background_needs_repaint());
    }

    #[test]
    fn test_poll_follows_rate() {
        let mut m = meter(MeterFlags::default());
        let t0 = Instant::now();
        assert!(m.poll(t0));
        assert!(!m.poll(t0 + Duration::from_millis(10)));
        m.set_refresh_rate_hz(0);
        assert_eq!(m.activity(), Activity::Dormant);
        assert!(!m.poll(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_paint_clears_pending() {
        let mut m = meter(MeterFlags::default());
        let src = MeterSource::shared(2);
        src.set_levels(0, 0.5, 0.4);
        m.set_meter_source(Some(SourceHandle::from(&src)));
        m.on_tick();
        assert!(m.needs_repaint());
        let mut fb = VarFrameBuf::new(64, 48, BinaryColor::Off);
        m.paint(&mut fb).unwrap();
        assert!(!m.needs_repaint());
    }

    #[test]
    fn test_clears_forward_to_source() {
        let mut m = meter(MeterFlags::default());
        let src = MeterSource::shared(2);
        src.set_levels(0, 1.5, 1.0);
        src.set_levels(1, 1.5, 1.0);
        m.set_meter_source(Some(SourceHandle::from(&src)));

        m.clear_clip_indicator(Some(0));
        assert!(!src.clip_flag(0));
        assert!(src.clip_flag(1));
        m.clear_max_level_display(None);
        assert_eq!(src.max_overall_level(), 0.0);
        // out of range is a no-op
        m.clear_clip_indicator(Some(9));
        assert!(src.clip_flag(1));
    }

    #[test]
    fn test_direct_background_matches_cached() {
        let src = MeterSource::shared(2);
        src.set_levels(0, 0.7, 0.5);
        src.set_levels(1, 1.2, 0.3);

        let mut cached = meter(MeterFlags::default());
        cached.resized(Rectangle::new(Point::new(8, 4), Size::new(64, 48)));
        cached.set_meter_source(Some(SourceHandle::from(&src)));
        cached.on_tick();
        let mut want = VarFrameBuf::new(80, 60, BinaryColor::On);
        cached.paint(&mut want).unwrap();
        assert_eq!(cached.background_renders(), 1);

        let mut direct = meter(MeterFlags::default());
        direct.set_use_background_image(false);
        direct.resized(Rectangle::new(Point::new(8, 4), Size::new(64, 48)));
        direct.set_meter_source(Some(SourceHandle::from(&src)));
        direct.on_tick();
        let mut got = VarFrameBuf::new(80, 60, BinaryColor::On);
        direct.paint(&mut got).unwrap();
        direct.paint(&mut got).unwrap();

        assert!(!direct.uses_background_image());
        assert_eq!(direct.background_renders(), 0);
        assert_eq!(got.as_slice(), want.as_slice());
    }

    #[test]
    fn test_background_image_toggle() {
        let mut m = meter(MeterFlags::default());
        assert!(m.uses_background_image());
        m.on_tick();
        assert!(!m.background_needs_repaint());

        m.set_use_background_image(false);
        m.on_tick();
        assert_eq!(m.background_renders(), 1);

        // back on: cache is rebuilt once
        m.set_use_background_image(true);
        assert!(m.background_needs_repaint());
        m.on_tick();
        assert_eq!(m.background_renders(), 2);
        m.set_use_background_image(true);
        assert!(!m.background_needs_repaint());
    }

    #[test]
    fn test_context_click_resets_and_invalidates() {
        let mut m = meter(MeterFlags::default());
        let src = MeterSource::shared(2);
        src.set_levels(1, 2.0, 1.0);
        m.set_meter_source(Some(SourceHandle::from(&src)));
        m.on_tick();
        assert!(!m.background_needs_repaint());

        assert!(!m.on_context_click(Point::new(100, 100)));
        assert!(m.on_context_click(Point::new(10, 10)));
        assert!(!src.clip_flag(1));
        assert_eq!(src.max_level(1), 0.0);
        assert!(m.background_needs_repaint());
    }
}
