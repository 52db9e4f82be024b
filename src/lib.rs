/*
 *  lib.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Periodic multi-channel audio level meter for embedded-graphics surfaces
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

pub mod config;
pub mod dbfs;
pub mod display;
pub mod meter;
pub mod pacer;
pub mod vframebuf;
pub mod vuneedle;

pub use meter::{
    ClassicStyle, LevelMeter, LevelSource, MeterError, MeterFlags, MeterListener, MeterSource,
    MeterStyle, SourceHandle,
};
pub use pacer::{Pacer, TickDriver};
pub use vframebuf::VarFrameBuf;
