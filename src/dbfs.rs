/*
 *  dbfs.rs
 *
 *  levelmeter - meters, meters, meters
 *	(c) 2020-26 Stuart Hunter
 *
 *	Gain <-> decibel helpers shared by the meter styles
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

/// Anything quieter than this is drawn as silence.
pub const DB_FLOOR: f32 = -80.0;

/// 0 VU calibration in dBFS (EBU = -18, SMPTE = -20).
pub const VU_0VU_DBFS: f32 = -18.0;

/// Max-number readout turns "warn" above this level.
pub const WARN_DBFS: f32 = -3.0;

/// Linear gain to dBFS, clamped at [`DB_FLOOR`].
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    if gain > 0.0 && gain.is_finite() {
        (20.0 * gain.log10()).max(DB_FLOOR)
    } else {
        DB_FLOOR
    }
}

#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    if db <= DB_FLOOR {
        0.0
    } else {
        10f32.powf(db / 20.0)
    }
}

/// Position of a gain on the bar scale: 0.0 at the floor, 1.0 at 0 dBFS.
#[inline]
pub fn level_fraction(gain: f32) -> f32 {
    db_fraction(gain_to_db(gain))
}

/// Position of a dB value on the bar scale.
#[inline]
pub fn db_fraction(db: f32) -> f32 {
    ((db - DB_FLOOR) / -DB_FLOOR).clamp(0.0, 1.0)
}

/// Convert a channel's dBFS to "VU dB" (where 0.0 is the 0 VU mark on the scale).
#[inline]
pub fn dbfs_to_vudb(dbfs: f32) -> f32 {
    dbfs - VU_0VU_DBFS
}
