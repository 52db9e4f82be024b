/*
 *  display/color_proxy.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Color proxy pattern - simple color depth abstraction
 *  "color in -> if mono then white else color out"
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

use embedded_graphics::pixelcolor::{BinaryColor, Gray4, GrayColor, PixelColor};
use serde::{Deserialize, Serialize};

/// 16-color palette for 4bpp grayscale - it's like 1990 baby!
/// Meter colour roles are expressed in this palette and proxied down to
/// whatever the surface can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Pal16 {
    Black = 0x0,
    Blue = 0x1,
    Green = 0x2,
    Cyan = 0x3,
    Red = 0x4,
    Magenta = 0x5,
    Brown = 0x6,
    Gray = 0x7,
    DarkGray = 0x8,
    LightBlue = 0x9,
    LightGreen = 0xA,
    LightCyan = 0xB,
    LightRed = 0xC,
    LightMagenta = 0xD,
    Yellow = 0xE,
    White = 0xF,
}

impl Pal16 {
    /// Palette index used as 4-bit luma
    pub fn to_gray4(self) -> Gray4 {
        Gray4::new(self as u8)
    }

    /// Threshold at mid-gray
    pub fn to_binary(self) -> BinaryColor {
        if (self as u8) >= 0x8 {
            BinaryColor::On
        } else {
            BinaryColor::Off
        }
    }
}

/// Color proxy trait - maps palette entries onto a concrete pixel type.
pub trait ColorProxy {
    type Output: PixelColor;

    /// Convert a palette color based on display capabilities
    fn proxy(color: Pal16) -> Self::Output;

    /// The "on" color (white/max brightness)
    fn on() -> Self::Output;

    /// The "off" color (black/min brightness)
    fn off() -> Self::Output;
}

/// Color proxy for monochrome surfaces
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoProxy;

impl ColorProxy for MonoProxy {
    type Output = BinaryColor;

    fn proxy(color: Pal16) -> BinaryColor {
        color.to_binary()
    }

    fn on() -> BinaryColor {
        BinaryColor::On
    }

    fn off() -> BinaryColor {
        BinaryColor::Off
    }
}

/// Color proxy for 4-bit grayscale surfaces
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray4Proxy;

impl ColorProxy for Gray4Proxy {
    type Output = Gray4;

    fn proxy(color: Pal16) -> Gray4 {
        color.to_gray4()
    }

    fn on() -> Gray4 {
        Gray4::WHITE
    }

    fn off() -> Gray4 {
        Gray4::BLACK
    }
}
