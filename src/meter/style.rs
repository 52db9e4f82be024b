/*
 *  meter/style.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  The style delegate: layout, drawing and hit testing for one visual skin
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

use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use crate::meter::colour::ColourRole;
use crate::meter::flags::MeterFlags;
use crate::meter::source::LevelSource;

/// True when a layout rectangle marks a disabled feature.
#[inline]
pub fn is_empty(rect: &Rectangle) -> bool {
    rect.size.width == 0 || rect.size.height == 0
}

/// Channel indices shown, one per slot. SINGLE_CHANNEL shows one slot with
/// the selected channel (channel 0 when all are selected).
pub fn displayed_channels(flags: MeterFlags, num_channels: usize, selected: Option<usize>) -> Vec<usize> {
    if num_channels == 0 {
        return Vec::new();
    }
    if flags.contains(MeterFlags::SINGLE_CHANNEL) {
        let ch = selected.filter(|&c| c < num_channels).unwrap_or(0);
        return vec![ch];
    }
    (0..num_channels).collect()
}

/// Resolved rectangles of one displayed channel, relative to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    pub channel: usize,
    pub meter: Rectangle,
    pub bar: Rectangle,
    pub tickmarks: Rectangle,
    pub clip_indicator: Rectangle,
    pub max_number: Rectangle,
}

/// Everything a skin supplies. Layout queries return an empty rectangle to
/// switch a feature off; such a feature is never drawn and never hit.
///
/// Background methods paint into the cached static layer, dynamic methods
/// paint over it on every frame.
pub trait MeterStyle {
    type Color: PixelColor;

    fn colour(&self, role: ColourRole) -> Self::Color;

    // -- layout --

    /// Area left for the channels inside the outer bounds
    fn meter_inner_bounds(&self, bounds: Rectangle, flags: MeterFlags) -> Rectangle;

    /// Area of display slot `slot` out of `slots`
    fn meter_bounds(&self, inner: Rectangle, flags: MeterFlags, slots: usize, slot: usize) -> Rectangle;

    fn meter_bar_bounds(&self, meter: Rectangle, flags: MeterFlags) -> Rectangle;

    fn meter_tickmarks_bounds(&self, meter: Rectangle, flags: MeterFlags) -> Rectangle;

    fn meter_clip_indicator_bounds(&self, meter: Rectangle, flags: MeterFlags) -> Rectangle;

    fn meter_max_number_bounds(&self, meter: Rectangle, flags: MeterFlags) -> Rectangle;

    // -- background --

    /// Frame and fill of the whole widget
    fn draw_background<D>(&self, target: &mut D, flags: MeterFlags, bounds: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>;

    fn draw_meter_bar_background<D>(&self, target: &mut D, flags: MeterFlags, bar: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>;

    fn draw_tick_marks<D>(&self, target: &mut D, flags: MeterFlags, ticks: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>;

    fn draw_clip_indicator_background<D>(&self, target: &mut D, flags: MeterFlags, rect: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>;

    fn draw_max_number_background<D>(&self, target: &mut D, flags: MeterFlags, rect: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>;

    // -- dynamic --

    /// Level bar, gains linear
    fn draw_meter_bar<D>(&self, target: &mut D, flags: MeterFlags, bar: Rectangle, rms: f32, peak: f32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>;

    fn draw_clip_indicator<D>(&self, target: &mut D, flags: MeterFlags, rect: Rectangle, clipped: bool) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>;

    fn draw_max_number<D>(&self, target: &mut D, flags: MeterFlags, rect: Rectangle, max_gain: f32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>;

    /// Gain reduction overlay, only called with REDUCTION set
    fn draw_meter_reduction<D>(&self, _target: &mut D, _flags: MeterFlags, _bar: Rectangle, _reduction: f32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        Ok(())
    }

    // -- provided --

    /// Resolve every rectangle of the displayed channels.
    fn layout_channels(&self, flags: MeterFlags, inner: Rectangle, channels: &[usize]) -> Vec<ChannelLayout> {
        let slots = channels.len();
        channels
            .iter()
            .enumerate()
            .map(|(slot, &channel)| {
                let meter = self.meter_bounds(inner, flags, slots, slot);
                ChannelLayout {
                    channel,
                    meter,
                    bar: self.meter_bar_bounds(meter, flags),
                    tickmarks: self.meter_tickmarks_bounds(meter, flags),
                    clip_indicator: self.meter_clip_indicator_bounds(meter, flags),
                    max_number: self.meter_max_number_bounds(meter, flags),
                }
            })
            .collect()
    }

    fn draw_meter_bars_background<D>(&self, target: &mut D, flags: MeterFlags, channels: &[ChannelLayout]) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        for layout in channels {
            self.draw_meter_channel_background(target, flags, layout)?;
        }
        Ok(())
    }

    fn draw_meter_channel_background<D>(&self, target: &mut D, flags: MeterFlags, layout: &ChannelLayout) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        if !is_empty(&layout.bar) {
            self.draw_meter_bar_background(target, flags, layout.bar)?;
        }
        if !is_empty(&layout.tickmarks) {
            self.draw_tick_marks(target, flags, layout.tickmarks)?;
        }
        if !is_empty(&layout.clip_indicator) {
            self.draw_clip_indicator_background(target, flags, layout.clip_indicator)?;
        }
        if !is_empty(&layout.max_number) {
            self.draw_max_number_background(target, flags, layout.max_number)?;
        }
        Ok(())
    }

    /// Dynamic layer of every displayed channel. `highlighted` marks the
    /// selected channel when all channels are shown.
    fn draw_meter_bars<D>(
        &self,
        target: &mut D,
        flags: MeterFlags,
        channels: &[ChannelLayout],
        source: &dyn LevelSource,
        highlighted: Option<usize>,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        for layout in channels {
            let hl = highlighted == Some(layout.channel) && channels.len() > 1;
            self.draw_meter_channel(target, flags, layout, source, hl)?;
        }
        Ok(())
    }

    fn draw_meter_channel<D>(
        &self,
        target: &mut D,
        flags: MeterFlags,
        layout: &ChannelLayout,
        source: &dyn LevelSource,
        highlighted: bool,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        let ch = layout.channel;
        if !is_empty(&layout.bar) {
            self.draw_meter_bar(target, flags, layout.bar, source.rms_level(ch), source.level(ch))?;
            if flags.contains(MeterFlags::REDUCTION) {
                self.draw_meter_reduction(target, flags, layout.bar, source.reduction_level(ch))?;
            }
        }
        if !is_empty(&layout.clip_indicator) {
            self.draw_clip_indicator(target, flags, layout.clip_indicator, source.clip_flag(ch))?;
        }
        if !is_empty(&layout.max_number) {
            self.draw_max_number(target, flags, layout.max_number, source.max_level(ch))?;
        }
        if highlighted && !is_empty(&layout.meter) {
            layout
                .meter
                .into_styled(PrimitiveStyle::with_stroke(self.colour(ColourRole::Outline), 1))
                .draw(target)?;
        }
        Ok(())
    }

    /// Channel whose clip indicator contains `position`
    fn hit_test_clip_indicator(&self, position: Point, channels: &[ChannelLayout]) -> Option<usize> {
        channels
            .iter()
            .find(|l| !is_empty(&l.clip_indicator) && l.clip_indicator.contains(position))
            .map(|l| l.channel)
    }

    /// Channel whose max number readout contains `position`
    fn hit_test_max_number(&self, position: Point, channels: &[ChannelLayout]) -> Option<usize> {
        channels
            .iter()
            .find(|l| !is_empty(&l.max_number) && l.max_number.contains(position))
            .map(|l| l.channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displayed_channels() {
        let all = MeterFlags::HAS_BORDER;
        let single = MeterFlags::SINGLE_CHANNEL;
        assert!(displayed_channels(all, 0, None).is_empty());
        assert_eq!(displayed_channels(all, 3, Some(1)), vec![0, 1, 2]);
        assert_eq!(displayed_channels(single, 3, Some(2)), vec![2]);
        assert_eq!(displayed_channels(single, 3, None), vec![0]);
        assert_eq!(displayed_channels(single, 3, Some(9)), vec![0]);
        assert!(displayed_channels(single, 0, Some(0)).is_empty());
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty(&Rectangle::zero()));
        assert!(is_empty(&Rectangle::new(Point::new(3, 3), Size::new(0, 10))));
        assert!(!is_empty(&Rectangle::new(Point::zero(), Size::new(1, 1))));
    }
}
