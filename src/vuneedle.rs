/*
 *  vuneedle.rs
 *
 *  levelmeter - meters, meters, meters
 *	(c) 2020-26 Stuart Hunter
 *
 *	Needle face geometry for the vintage meter look
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

use embedded_graphics::{
    geometry::{Point, Size},
    pixelcolor::PixelColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
};

/// Needle travel either side of centre, degrees
pub const SWEEP_DEG: f32 = 48.0;

/// Lowest and highest VU dB printed on the face
pub const VU_MIN_DB: f32 = -20.0;
pub const VU_MAX_DB: f32 = 3.0;

// Major: sparse, longer lines. Minor: the intermediates.
const DB_MAJOR: [f32; 5] = [-20.0, -10.0, -3.0, 0.0, 3.0];
const DB_MINOR: [f32; 8] = [-7.0, -6.0, -5.0, -4.0, -2.0, -1.0, 1.0, 2.0];

/// Pivot and radii of a needle face fitted into a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeedleGeometry {
    pub pivot: Point,
    pub r_arc: i32,
    pub r_hub: i32,
}

impl NeedleGeometry {
    /// Fit a face into `panel`, None when the panel is too small to read.
    pub fn fit(panel: Rectangle) -> Option<Self> {
        let Size { width, height } = panel.size;
        if width < 12 || height < 8 {
            return None;
        }
        let (w, h) = (width as i32, height as i32);
        // pivot a pixel above the panel bottom; the arc must fit both ways
        let pivot = Point::new(panel.top_left.x + w / 2, panel.top_left.y + h - 2);
        let r_arc = (h - 3).min(w / 2 - 1).max(4);
        Some(Self {
            pivot,
            r_arc,
            r_hub: (r_arc / 4).max(1),
        })
    }
}

/// Map VU dB to the meter angle in degrees with exponential spacing,
/// shifted so -3 dB sits at the top. Clamped to the sweep.
#[inline]
pub fn vu_db_to_meter_angle(db: f32) -> f32 {
    let theta = 90.0 / 2.0_f32.sqrt();
    let db = db.clamp(VU_MIN_DB, VU_MAX_DB);
    let a_db = theta * 10f32.powf(db / 20.0);
    let a_m3db = theta * 10f32.powf(-3.0 / 20.0);
    (a_db - a_m3db).clamp(-SWEEP_DEG, SWEEP_DEG)
}

/// Simple polar helper (degrees, 0 = straight up, positive = right).
#[inline]
pub fn polar_point(centre: Point, r: i32, deg: f32) -> Point {
    let rad = deg.to_radians();
    let (s, c) = (rad.sin(), rad.cos());
    Point::new(
        centre.x + (s * r as f32).round() as i32,
        centre.y - (c * r as f32).round() as i32,
    )
}

/// Static part of the face: arc plus major and minor ticks.
pub fn draw_vu_face<D, C>(
    target: &mut D,
    geo: &NeedleGeometry,
    scale: C,
    ticks: C,
) -> Result<(), D::Error>
where
    C: PixelColor,
    D: DrawTarget<Color = C>,
{
    let arc = PrimitiveStyle::with_stroke(scale, 1);
    let left = vu_db_to_meter_angle(VU_MIN_DB) as i32;
    let right = vu_db_to_meter_angle(VU_MAX_DB) as i32;

    // polyline at r_arc in 1 degree steps
    let mut prev: Option<Point> = None;
    for deg in left..=right {
        let p = polar_point(geo.pivot, geo.r_arc, deg as f32);
        if let Some(pp) = prev {
            Line::new(pp, p).into_styled(arc).draw(target)?;
        }
        prev = Some(p);
    }

    let tick = PrimitiveStyle::with_stroke(ticks, 1);
    let major_len = (geo.r_arc / 4).max(2);
    for &db in &DB_MAJOR {
        let ang = vu_db_to_meter_angle(db);
        let p_out = polar_point(geo.pivot, geo.r_arc, ang);
        let p_in = polar_point(geo.pivot, geo.r_arc - major_len, ang);
        Line::new(p_in, p_out).into_styled(tick).draw(target)?;
    }
    let minor_len = (major_len / 2).max(1);
    for &db in &DB_MINOR {
        let ang = vu_db_to_meter_angle(db);
        let p_out = polar_point(geo.pivot, geo.r_arc, ang);
        let p_in = polar_point(geo.pivot, geo.r_arc - minor_len, ang);
        Line::new(p_in, p_out).into_styled(tick).draw(target)?;
    }
    Ok(())
}

/// Needle from the hub out to just short of the arc, at `vu_db`.
pub fn draw_vu_needle<D, C>(
    target: &mut D,
    geo: &NeedleGeometry,
    vu_db: f32,
    colour: C,
) -> Result<(), D::Error>
where
    C: PixelColor,
    D: DrawTarget<Color = C>,
{
    let ang = vu_db_to_meter_angle(vu_db);
    let p_in = polar_point(geo.pivot, geo.r_hub, ang);
    let p_out = polar_point(geo.pivot, geo.r_arc - 1, ang);
    Line::new(p_in, p_out)
        .into_styled(PrimitiveStyle::with_stroke(colour, 1))
        .draw(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_reference_and_clamp() {
        assert!(vu_db_to_meter_angle(-3.0).abs() < 1e-4);
        assert!(vu_db_to_meter_angle(0.0) > 0.0);
        assert!(vu_db_to_meter_angle(-10.0) < 0.0);
        assert_eq!(vu_db_to_meter_angle(-200.0), vu_db_to_meter_angle(VU_MIN_DB));
        assert!(vu_db_to_meter_angle(40.0) <= SWEEP_DEG);
    }

    #[test]
    fn test_polar_point() {
        let c = Point::new(10, 10);
        assert_eq!(polar_point(c, 5, 0.0), Point::new(10, 5));
        assert_eq!(polar_point(c, 5, 90.0), Point::new(15, 10));
        assert_eq!(polar_point(c, 5, -90.0), Point::new(5, 10));
    }

    #[test]
    fn test_fit() {
        assert!(NeedleGeometry::fit(Rectangle::new(Point::zero(), Size::new(8, 40))).is_none());
        let geo = NeedleGeometry::fit(Rectangle::new(Point::new(4, 0), Size::new(40, 20))).unwrap();
        assert_eq!(geo.pivot, Point::new(24, 18));
        assert_eq!(geo.r_arc, 17);
        // arc apex stays inside the panel
        assert!(geo.pivot.y - geo.r_arc >= 0);
    }
}
