/*
 *  meter/classic.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Stock meter skin: bars with zone colours, ticks, clip light, max readout
 *  and the vintage needle face
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

use core::fmt::Write;

use arrayvec::ArrayString;
use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_4X6},
    prelude::*,
    primitives::{Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use embedded_text::alignment::{HorizontalAlignment, VerticalAlignment};
use embedded_text::{TextBox, style::TextBoxStyleBuilder};

use crate::dbfs::{DB_FLOOR, WARN_DBFS, db_fraction, dbfs_to_vudb, gain_to_db, level_fraction};
use crate::meter::colour::{ColourRole, ColourScheme, Gray4Scheme, MonoScheme};
use crate::meter::flags::MeterFlags;
use crate::meter::style::{MeterStyle, is_empty};
use crate::vuneedle::{NeedleGeometry, draw_vu_face, draw_vu_needle};

const BORDER: u32 = 2;
const GAP: u32 = 1;
const CLIP_LEN: u32 = 3;
const VINTAGE_CLIP: u32 = 3;
// FONT_4X6 plus a row
const MAX_V_HEIGHT: u32 = 7;
const MAX_H_WIDTH: u32 = 20;
// scale length needed before tick labels stop colliding
const LABEL_MIN_LEN: u32 = 96;

const ZONE_MID_DB: f32 = -18.0;
const ZONE_MAX_DB: f32 = -6.0;

/// (dBFS, major)
const TICKS: [(f32, bool); 10] = [
    (0.0, true),
    (-3.0, false),
    (-6.0, true),
    (-12.0, false),
    (-18.0, true),
    (-30.0, false),
    (-40.0, true),
    (-50.0, false),
    (-60.0, true),
    (-70.0, false),
];

#[derive(Debug, Clone, Copy)]
struct Regions {
    bar: Rectangle,
    ticks: Rectangle,
    clip: Rectangle,
    max: Rectangle,
}

impl Regions {
    fn bar_only(bar: Rectangle) -> Self {
        Self {
            bar,
            ticks: Rectangle::zero(),
            clip: Rectangle::zero(),
            max: Rectangle::zero(),
        }
    }
}

#[inline]
fn inset(r: Rectangle, d: u32) -> Rectangle {
    Rectangle::new(
        r.top_left + Point::new_equal(d as i32),
        r.size.saturating_sub(Size::new_equal(d * 2)),
    )
}

/// Split one meter slot into its parts.
fn regions(meter: Rectangle, flags: MeterFlags) -> Regions {
    if is_empty(&meter) {
        return Regions::bar_only(Rectangle::zero());
    }
    if flags.is_minimal() {
        return Regions::bar_only(meter);
    }
    let Size { width: w, height: h } = meter.size;
    let tl = meter.top_left;

    if flags.contains(MeterFlags::VINTAGE) {
        // needle face fills the slot, clip light tucked in the top right
        let side = VINTAGE_CLIP.min(w).min(h);
        return Regions {
            bar: meter,
            ticks: Rectangle::zero(),
            clip: Rectangle::new(tl + Point::new((w - side) as i32, 0), Size::new_equal(side)),
            max: Rectangle::zero(),
        };
    }

    if flags.is_horizontal() {
        // [max | bar over ticks | clip]
        if w < MAX_H_WIDTH + CLIP_LEN + 4 {
            return Regions::bar_only(meter);
        }
        let mid_w = w - MAX_H_WIDTH - CLIP_LEN - 2;
        let mid_x = tl.x + MAX_H_WIDTH as i32 + 1;
        let bar_h = (h + 1) / 2;
        Regions {
            bar: Rectangle::new(Point::new(mid_x, tl.y), Size::new(mid_w, bar_h)),
            ticks: Rectangle::new(Point::new(mid_x, tl.y + bar_h as i32), Size::new(mid_w, h - bar_h)),
            clip: Rectangle::new(tl + Point::new((w - CLIP_LEN) as i32, 0), Size::new(CLIP_LEN, h)),
            max: Rectangle::new(tl, Size::new(MAX_H_WIDTH, h)),
        }
    } else {
        // clip on top, max at the bottom, bar left of ticks in between
        if h < MAX_V_HEIGHT + CLIP_LEN + 4 {
            return Regions::bar_only(meter);
        }
        let mid_h = h - CLIP_LEN - MAX_V_HEIGHT - 2;
        let mid_y = tl.y + CLIP_LEN as i32 + 1;
        let bar_w = (w + 1) / 2;
        Regions {
            bar: Rectangle::new(Point::new(tl.x, mid_y), Size::new(bar_w, mid_h)),
            ticks: Rectangle::new(Point::new(tl.x + bar_w as i32, mid_y), Size::new(w - bar_w, mid_h)),
            clip: Rectangle::new(tl, Size::new(w, CLIP_LEN)),
            max: Rectangle::new(tl + Point::new(0, (h - MAX_V_HEIGHT) as i32), Size::new(w, MAX_V_HEIGHT)),
        }
    }
}

/// Part of `bar` between scale fractions `f0..f1`. Vertical bars grow
/// upwards, horizontal ones to the right.
fn span(bar: Rectangle, horizontal: bool, f0: f32, f1: f32) -> Rectangle {
    let len = if horizontal { bar.size.width } else { bar.size.height };
    let a = (f0.clamp(0.0, 1.0) * len as f32).round() as u32;
    let b = (f1.clamp(0.0, 1.0) * len as f32).round() as u32;
    if b <= a {
        return Rectangle::zero();
    }
    if horizontal {
        Rectangle::new(bar.top_left + Point::new(a as i32, 0), Size::new(b - a, bar.size.height))
    } else {
        let bottom = bar.top_left.y + bar.size.height as i32;
        Rectangle::new(Point::new(bar.top_left.x, bottom - b as i32), Size::new(bar.size.width, b - a))
    }
}

/// Pixel offset of a scale fraction along a run of `len` pixels
#[inline]
fn scale_pos(len: u32, f: f32) -> i32 {
    (f.clamp(0.0, 1.0) * len.saturating_sub(1) as f32).round() as i32
}

fn zone_role(db: f32) -> ColourRole {
    if db >= ZONE_MAX_DB {
        ColourRole::GradientMax
    } else if db >= ZONE_MID_DB {
        ColourRole::GradientMid
    } else {
        ColourRole::GradientLow
    }
}

fn max_role(db: f32) -> ColourRole {
    if db > 0.0 {
        ColourRole::MaxOver
    } else if db > WARN_DBFS {
        ColourRole::MaxWarn
    } else {
        ColourRole::MaxNormal
    }
}

/// Readout text for a max level; one decimal when there is room for it.
fn max_text(max_gain: f32, width: u32) -> ArrayString<12> {
    let mut s = ArrayString::<12>::new();
    let db = gain_to_db(max_gain);
    if db <= DB_FLOOR {
        s.push_str("-inf");
    } else if width >= 24 {
        let _ = write!(s, "{:.1}", db);
    } else {
        let _ = write!(s, "{:.0}", db);
    }
    s
}

/// The stock skin, parameterised by the colour scheme of the surface.
#[derive(Debug, Clone, Default)]
pub struct ClassicStyle<K: ColourScheme> {
    scheme: K,
}

pub type MonoClassic = ClassicStyle<MonoScheme>;
pub type Gray4Classic = ClassicStyle<Gray4Scheme>;

impl<K: ColourScheme> ClassicStyle<K> {
    pub fn new(scheme: K) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &K {
        &self.scheme
    }

    fn fill(&self, role: ColourRole) -> PrimitiveStyle<K::Color> {
        PrimitiveStyle::with_fill(self.scheme.colour(role))
    }

    fn stroke(&self, role: ColourRole) -> PrimitiveStyle<K::Color> {
        PrimitiveStyle::with_stroke(self.scheme.colour(role), 1)
    }

    fn draw_tick_labels<D>(&self, target: &mut D, horizontal: bool, ticks: Rectangle, major_len: i32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = K::Color>,
    {
        let style = MonoTextStyle::new(&FONT_4X6, self.scheme.colour(ColourRole::Text));
        for &(db, _) in TICKS.iter().filter(|t| t.1) {
            let mut label = ArrayString::<4>::new();
            let _ = write!(label, "{}", -(db as i32));
            if horizontal {
                let x = ticks.top_left.x + scale_pos(ticks.size.width, db_fraction(db));
                let p = Point::new(x, ticks.top_left.y + major_len + 1);
                let ts = TextStyleBuilder::new().alignment(Alignment::Center).baseline(Baseline::Top).build();
                Text::with_text_style(&label, p, style, ts).draw(target)?;
            } else {
                let bottom = ticks.top_left.y + ticks.size.height as i32 - 1;
                let y = bottom - scale_pos(ticks.size.height, db_fraction(db));
                let p = Point::new(ticks.top_left.x + major_len + 1, y);
                Text::with_baseline(&label, p, style, Baseline::Middle).draw(target)?;
            }
        }
        Ok(())
    }
}

impl<K: ColourScheme> MeterStyle for ClassicStyle<K> {
    type Color = K::Color;

    fn colour(&self, role: ColourRole) -> K::Color {
        self.scheme.colour(role)
    }

    fn meter_inner_bounds(&self, bounds: Rectangle, flags: MeterFlags) -> Rectangle {
        if flags.contains(MeterFlags::HAS_BORDER) {
            inset(bounds, BORDER)
        } else {
            bounds
        }
    }

    fn meter_bounds(&self, inner: Rectangle, flags: MeterFlags, slots: usize, slot: usize) -> Rectangle {
        if slots == 0 || slot >= slots {
            return Rectangle::zero();
        }
        let n = slots as u32;
        let gaps = GAP * (n - 1);
        let offset = |each: u32| (slot as u32 * (each + GAP)) as i32;
        if flags.is_horizontal() {
            // channels stacked top to bottom
            let each = inner.size.height.saturating_sub(gaps) / n;
            if each == 0 {
                return Rectangle::zero();
            }
            Rectangle::new(
                inner.top_left + Point::new(0, offset(each)),
                Size::new(inner.size.width, each),
            )
        } else {
            let each = inner.size.width.saturating_sub(gaps) / n;
            if each == 0 {
                return Rectangle::zero();
            }
            Rectangle::new(
                inner.top_left + Point::new(offset(each), 0),
                Size::new(each, inner.size.height),
            )
        }
    }

    fn meter_bar_bounds(&self, meter: Rectangle, flags: MeterFlags) -> Rectangle {
        regions(meter, flags).bar
    }

    fn meter_tickmarks_bounds(&self, meter: Rectangle, flags: MeterFlags) -> Rectangle {
        regions(meter, flags).ticks
    }

    fn meter_clip_indicator_bounds(&self, meter: Rectangle, flags: MeterFlags) -> Rectangle {
        regions(meter, flags).clip
    }

    fn meter_max_number_bounds(&self, meter: Rectangle, flags: MeterFlags) -> Rectangle {
        regions(meter, flags).max
    }

    fn draw_background<D>(&self, target: &mut D, flags: MeterFlags, bounds: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = K::Color>,
    {
        bounds.into_styled(self.fill(ColourRole::Background)).draw(target)?;
        if flags.contains(MeterFlags::HAS_BORDER) && !is_empty(&bounds) {
            bounds.into_styled(self.stroke(ColourRole::Outline)).draw(target)?;
        }
        Ok(())
    }

    fn draw_meter_bar_background<D>(&self, target: &mut D, flags: MeterFlags, bar: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = K::Color>,
    {
        bar.into_styled(self.fill(ColourRole::MeterBackground)).draw(target)?;
        if flags.contains(MeterFlags::VINTAGE) {
            if let Some(geo) = NeedleGeometry::fit(bar) {
                draw_vu_face(
                    target,
                    &geo,
                    self.scheme.colour(ColourRole::MeterOutline),
                    self.scheme.colour(ColourRole::Ticks),
                )?;
            }
        }
        Ok(())
    }

    fn draw_tick_marks<D>(&self, target: &mut D, flags: MeterFlags, ticks: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = K::Color>,
    {
        let style = self.stroke(ColourRole::Ticks);
        let horizontal = flags.is_horizontal();
        let Size { width: w, height: h } = ticks.size;
        let across = (if horizontal { h } else { w }) as i32;
        let major_len = (across / 2).max(1);
        let minor_len = (across / 4).max(1);
        let tl = ticks.top_left;

        for &(db, major) in &TICKS {
            let len = if major { major_len } else { minor_len };
            let line = if horizontal {
                let x = tl.x + scale_pos(w, db_fraction(db));
                Line::new(Point::new(x, tl.y), Point::new(x, tl.y + len - 1))
            } else {
                let y = tl.y + h as i32 - 1 - scale_pos(h, db_fraction(db));
                Line::new(Point::new(tl.x, y), Point::new(tl.x + len - 1, y))
            };
            line.into_styled(style).draw(target)?;
        }

        let (along, room) = if horizontal { (w, h as i32 - major_len) } else { (h, w as i32 - major_len) };
        let needed = if horizontal { 7 } else { 10 };
        if along >= LABEL_MIN_LEN && room >= needed {
            self.draw_tick_labels(target, horizontal, ticks, major_len)?;
        }
        Ok(())
    }

    fn draw_clip_indicator_background<D>(&self, target: &mut D, _flags: MeterFlags, rect: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = K::Color>,
    {
        let style = PrimitiveStyleBuilder::new()
            .fill_color(self.scheme.colour(ColourRole::MeterBackground))
            .stroke_color(self.scheme.colour(ColourRole::MeterOutline))
            .stroke_width(1)
            .build();
        rect.into_styled(style).draw(target)
    }

    fn draw_max_number_background<D>(&self, target: &mut D, _flags: MeterFlags, rect: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = K::Color>,
    {
        rect.into_styled(self.fill(ColourRole::Background)).draw(target)
    }

    fn draw_meter_bar<D>(&self, target: &mut D, flags: MeterFlags, bar: Rectangle, rms: f32, peak: f32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = K::Color>,
    {
        if flags.contains(MeterFlags::VINTAGE) {
            if let Some(geo) = NeedleGeometry::fit(bar) {
                let vu = dbfs_to_vudb(gain_to_db(rms));
                draw_vu_needle(target, &geo, vu, self.scheme.colour(ColourRole::MeterForeground))?;
            }
            return Ok(());
        }

        let horizontal = flags.is_horizontal();
        let level = level_fraction(rms);
        let mid = db_fraction(ZONE_MID_DB);
        let max = db_fraction(ZONE_MAX_DB);
        let zones = [
            (0.0, mid, ColourRole::GradientLow),
            (mid, max, ColourRole::GradientMid),
            (max, 1.0, ColourRole::GradientMax),
        ];
        for (lo, hi, role) in zones {
            if level <= lo {
                break;
            }
            let part = span(bar, horizontal, lo, level.min(hi));
            if !is_empty(&part) {
                part.into_styled(self.fill(role)).draw(target)?;
            }
        }

        let p = level_fraction(peak);
        if p > 0.0 {
            let style = self.stroke(zone_role(gain_to_db(peak)));
            let Size { width: w, height: h } = bar.size;
            let tl = bar.top_left;
            let line = if horizontal {
                let x = tl.x + scale_pos(w, p);
                Line::new(Point::new(x, tl.y), Point::new(x, tl.y + h as i32 - 1))
            } else {
                let y = tl.y + h as i32 - 1 - scale_pos(h, p);
                Line::new(Point::new(tl.x, y), Point::new(tl.x + w as i32 - 1, y))
            };
            line.into_styled(style).draw(target)?;
        }
        Ok(())
    }

    fn draw_clip_indicator<D>(&self, target: &mut D, _flags: MeterFlags, rect: Rectangle, clipped: bool) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = K::Color>,
    {
        if clipped {
            rect.into_styled(self.fill(ColourRole::BackgroundClip)).draw(target)?;
        }
        Ok(())
    }

    fn draw_max_number<D>(&self, target: &mut D, _flags: MeterFlags, rect: Rectangle, max_gain: f32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = K::Color>,
    {
        let text = max_text(max_gain, rect.size.width);
        let colour = self.scheme.colour(max_role(gain_to_db(max_gain)));
        let character_style = MonoTextStyle::new(&FONT_4X6, colour);
        let textbox_style = TextBoxStyleBuilder::new()
            .alignment(HorizontalAlignment::Center)
            .vertical_alignment(VerticalAlignment::Middle)
            .build();

        // keep long readouts inside their box
        let mut clipped = target.cropped(&rect);
        let local = Rectangle::new(Point::zero(), rect.size);
        TextBox::with_textbox_style(&text, local, character_style, textbox_style).draw(&mut clipped)?;
        Ok(())
    }

    fn draw_meter_reduction<D>(&self, target: &mut D, flags: MeterFlags, bar: Rectangle, reduction: f32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = K::Color>,
    {
        if flags.contains(MeterFlags::VINTAGE) {
            return Ok(());
        }
        let amount = 1.0 - level_fraction(reduction);
        if amount <= 0.0 {
            return Ok(());
        }
        // thin strip along the far edge, growing from full scale down
        let horizontal = flags.is_horizontal();
        let Size { width: w, height: h } = bar.size;
        let strip = if horizontal {
            let s = (h / 3).max(1);
            Rectangle::new(bar.top_left + Point::new(0, (h - s) as i32), Size::new(w, s))
        } else {
            let s = (w / 3).max(1);
            Rectangle::new(bar.top_left + Point::new((w - s) as i32, 0), Size::new(s, h))
        };
        let part = span(strip, horizontal, 1.0 - amount, 1.0);
        if !is_empty(&part) {
            part.into_styled(self.fill(ColourRole::Reduction)).draw(target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vframebuf::VarFrameBuf;
    use embedded_graphics::pixelcolor::BinaryColor;

    fn style() -> MonoClassic {
        ClassicStyle::new(MonoScheme::new())
    }

    fn area(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_border_inset() {
        let s = style();
        let b = area(0, 0, 64, 32);
        assert_eq!(s.meter_inner_bounds(b, MeterFlags::HAS_BORDER), area(2, 2, 60, 28));
        assert_eq!(s.meter_inner_bounds(b, MeterFlags::empty()), b);
        assert!(is_empty(&s.meter_inner_bounds(area(0, 0, 3, 3), MeterFlags::HAS_BORDER)));
    }

    #[test]
    fn test_channel_split() {
        let s = style();
        let inner = area(0, 0, 61, 40);
        let v = MeterFlags::empty();
        assert_eq!(s.meter_bounds(inner, v, 2, 0), area(0, 0, 30, 40));
        assert_eq!(s.meter_bounds(inner, v, 2, 1), area(31, 0, 30, 40));
        assert!(is_empty(&s.meter_bounds(inner, v, 2, 2)));
        assert!(is_empty(&s.meter_bounds(inner, v, 0, 0)));

        let h = MeterFlags::HORIZONTAL;
        assert_eq!(s.meter_bounds(area(0, 0, 100, 21), h, 2, 1), area(0, 11, 100, 10));
    }

    #[test]
    fn test_vertical_regions() {
        let r = regions(area(0, 0, 30, 40), MeterFlags::empty());
        assert_eq!(r.clip, area(0, 0, 30, 3));
        assert_eq!(r.max, area(0, 33, 30, 7));
        assert_eq!(r.bar, area(0, 4, 15, 28));
        assert_eq!(r.ticks, area(15, 4, 15, 28));
    }

    #[test]
    fn test_horizontal_regions() {
        let r = regions(area(0, 0, 100, 10), MeterFlags::HORIZONTAL);
        assert_eq!(r.max, area(0, 0, 20, 10));
        assert_eq!(r.clip, area(97, 0, 3, 10));
        assert_eq!(r.bar, area(21, 0, 75, 5));
        assert_eq!(r.ticks, area(21, 5, 75, 5));
    }

    #[test]
    fn test_minimal_and_vintage_disable_parts() {
        let m = area(0, 0, 30, 40);
        let r = regions(m, MeterFlags::MINIMAL);
        assert_eq!(r.bar, m);
        assert!(is_empty(&r.clip) && is_empty(&r.max) && is_empty(&r.ticks));

        let r = regions(m, MeterFlags::VINTAGE);
        assert_eq!(r.bar, m);
        assert_eq!(r.clip, area(27, 0, 3, 3));
        assert!(is_empty(&r.max) && is_empty(&r.ticks));
    }

    #[test]
    fn test_span() {
        let bar = area(0, 0, 4, 100);
        assert_eq!(span(bar, false, 0.0, 0.5), area(0, 50, 4, 50));
        assert_eq!(span(bar, false, 0.5, 1.0), area(0, 0, 4, 50));
        assert!(is_empty(&span(bar, false, 0.5, 0.5)));
        assert_eq!(span(area(10, 0, 100, 4), true, 0.25, 0.5), area(35, 0, 25, 4));
    }

    #[test]
    fn test_roles() {
        assert_eq!(zone_role(-30.0), ColourRole::GradientLow);
        assert_eq!(zone_role(-10.0), ColourRole::GradientMid);
        assert_eq!(zone_role(-1.0), ColourRole::GradientMax);
        assert_eq!(max_role(1.0), ColourRole::MaxOver);
        assert_eq!(max_role(-1.0), ColourRole::MaxWarn);
        assert_eq!(max_role(-12.0), ColourRole::MaxNormal);
    }

    #[test]
    fn test_max_text() {
        assert_eq!(max_text(0.0, 30).as_str(), "-inf");
        assert_eq!(max_text(0.5, 30).as_str(), "-6.0");
        assert_eq!(max_text(0.5, 12).as_str(), "-6");
        assert_eq!(max_text(f32::INFINITY, 30).as_str(), "-inf");
    }

    #[test]
    fn test_bar_fills_from_bottom() {
        let s = style();
        let mut fb = VarFrameBuf::new(4, 80, BinaryColor::Off);
        let bar = area(0, 0, 4, 80);
        // -40 dBFS = half scale
        s.draw_meter_bar(&mut fb, MeterFlags::empty(), bar, 0.01, 0.0).unwrap();
        assert_eq!(fb.pixel(Point::new(0, 79)), Some(BinaryColor::On));
        assert_eq!(fb.pixel(Point::new(0, 40)), Some(BinaryColor::On));
        assert_eq!(fb.pixel(Point::new(0, 39)), Some(BinaryColor::Off));
    }

    #[test]
    fn test_clip_light() {
        let s = style();
        let rect = area(0, 0, 5, 3);
        let mut fb = VarFrameBuf::new(5, 3, BinaryColor::Off);
        s.draw_clip_indicator(&mut fb, MeterFlags::empty(), rect, false).unwrap();
        assert!(fb.as_slice().iter().all(|&p| p == BinaryColor::Off));
        s.draw_clip_indicator(&mut fb, MeterFlags::empty(), rect, true).unwrap();
        assert!(fb.as_slice().iter().all(|&p| p == BinaryColor::On));
    }

    #[test]
    fn test_reduction_strip() {
        let s = style();
        let mut fb = VarFrameBuf::new(6, 80, BinaryColor::Off);
        let bar = area(0, 0, 6, 80);
        s.draw_meter_reduction(&mut fb, MeterFlags::REDUCTION, bar, 1.0).unwrap();
        assert!(fb.as_slice().iter().all(|&p| p == BinaryColor::Off));
        // 40 dB of reduction covers half the strip from the top
        s.draw_meter_reduction(&mut fb, MeterFlags::REDUCTION, bar, 0.01).unwrap();
        assert_eq!(fb.pixel(Point::new(5, 0)), Some(BinaryColor::On));
        assert_eq!(fb.pixel(Point::new(5, 39)), Some(BinaryColor::On));
        assert_eq!(fb.pixel(Point::new(5, 40)), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(BinaryColor::Off));
    }

    /// Two-tone ink with no conversions from other colour types
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Ink(bool);

    impl PixelColor for Ink {
        type Raw = ();
    }

    struct InkScheme;

    impl ColourScheme for InkScheme {
        type Color = Ink;

        fn colour(&self, role: ColourRole) -> Ink {
            Ink(!matches!(role, ColourRole::Background | ColourRole::MeterBackground))
        }
    }

    #[test]
    fn test_custom_colour_type() {
        let s = ClassicStyle::new(InkScheme);
        let flags = MeterFlags::HAS_BORDER;
        let inner = s.meter_inner_bounds(area(0, 0, 40, 60), flags);
        let meter = s.meter_bounds(inner, flags, 1, 0);
        let max = s.meter_max_number_bounds(meter, flags);
        let mut fb = VarFrameBuf::new(40, 60, Ink(false));
        s.draw_background(&mut fb, flags, area(0, 0, 40, 60)).unwrap();
        s.draw_max_number(&mut fb, flags, max, 0.5).unwrap();
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(Ink(true)));
        assert!(!is_empty(&max));
        assert!(max.points().any(|p| fb.pixel(p) == Some(Ink(true))));
    }

    #[test]
    fn test_background_frame() {
        let s = style();
        let mut fb = VarFrameBuf::new(20, 10, BinaryColor::On);
        s.draw_background(&mut fb, MeterFlags::HAS_BORDER, area(0, 0, 20, 10)).unwrap();
        assert_eq!(s.meter_inner_bounds(area(0, 0, 20, 10), MeterFlags::HAS_BORDER), area(2, 2, 16, 6));
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(BinaryColor::On));
        assert_eq!(fb.pixel(Point::new(5, 5)), Some(BinaryColor::Off));
    }
}
