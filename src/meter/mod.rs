/*
 *  meter/mod.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Level meter widget, its style delegate and collaborators
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

pub mod classic;
pub mod colour;
pub mod error;
pub mod flags;
pub mod listener;
pub mod source;
pub mod style;
pub mod widget;

pub use classic::{ClassicStyle, Gray4Classic, MonoClassic};
pub use colour::{ColourRole, ColourScheme, Gray4Scheme, MonoScheme, PaletteScheme};
pub use error::{MeterError, parse_channel};
pub use flags::MeterFlags;
pub use listener::{ChannelListener, ListenerRegistry, MeterEvent, MeterListener};
pub use source::{LevelSource, MeterSource, SourceHandle};
pub use style::{ChannelLayout, MeterStyle};
pub use widget::{Activity, Binding, DEFAULT_REFRESH_RATE_HZ, LevelMeter, MeterLayout};
