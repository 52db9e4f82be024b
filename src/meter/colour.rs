/*
 *  meter/colour.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Logical colour roles and their resolution to pixel colours
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

use std::collections::HashMap;
use std::marker::PhantomData;

use embedded_graphics::pixelcolor::PixelColor;
use serde::{Deserialize, Serialize};

use crate::display::color_proxy::{ColorProxy, Gray4Proxy, MonoProxy, Pal16};

/// Named colour slots a meter style paints with. The meter core only ever
/// refers to roles; a [`ColourScheme`] decides the actual pixel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColourRole {
    Text,
    TextDeactivated,
    TextClip,
    Ticks,
    Outline,
    Background,
    BackgroundClip,
    MeterForeground,
    MeterOutline,
    MeterBackground,
    MaxNormal,
    MaxWarn,
    MaxOver,
    GradientLow,
    GradientMid,
    GradientMax,
    Reduction,
}

impl ColourRole {
    pub const ALL: [ColourRole; 17] = [
        ColourRole::Text,
        ColourRole::TextDeactivated,
        ColourRole::TextClip,
        ColourRole::Ticks,
        ColourRole::Outline,
        ColourRole::Background,
        ColourRole::BackgroundClip,
        ColourRole::MeterForeground,
        ColourRole::MeterOutline,
        ColourRole::MeterBackground,
        ColourRole::MaxNormal,
        ColourRole::MaxWarn,
        ColourRole::MaxOver,
        ColourRole::GradientLow,
        ColourRole::GradientMid,
        ColourRole::GradientMax,
        ColourRole::Reduction,
    ];

    /// Stock palette entry. Everything drawn on top of the background lands
    /// at or above mid-gray so it survives the mono threshold.
    pub fn default_pal16(self) -> Pal16 {
        match self {
            ColourRole::Text => Pal16::White,
            ColourRole::TextDeactivated => Pal16::DarkGray,
            ColourRole::TextClip => Pal16::LightRed,
            ColourRole::Ticks => Pal16::DarkGray,
            ColourRole::Outline => Pal16::White,
            ColourRole::Background => Pal16::Black,
            ColourRole::BackgroundClip => Pal16::LightRed,
            ColourRole::MeterForeground => Pal16::LightGreen,
            ColourRole::MeterOutline => Pal16::DarkGray,
            ColourRole::MeterBackground => Pal16::Black,
            ColourRole::MaxNormal => Pal16::White,
            ColourRole::MaxWarn => Pal16::Yellow,
            ColourRole::MaxOver => Pal16::LightRed,
            ColourRole::GradientLow => Pal16::LightGreen,
            ColourRole::GradientMid => Pal16::Yellow,
            ColourRole::GradientMax => Pal16::LightRed,
            ColourRole::Reduction => Pal16::LightBlue,
        }
    }
}

/// Resolves colour roles for one surface type.
pub trait ColourScheme {
    type Color: PixelColor;

    fn colour(&self, role: ColourRole) -> Self::Color;
}

/// Palette backed scheme: role -> [`Pal16`] (stock or overridden) -> proxy.
#[derive(Debug, Clone)]
pub struct PaletteScheme<P: ColorProxy> {
    overrides: HashMap<ColourRole, Pal16>,
    _proxy: PhantomData<P>,
}

/// Scheme for 1-bit surfaces
pub type MonoScheme = PaletteScheme<MonoProxy>;

/// Scheme for 4-bit grayscale surfaces
pub type Gray4Scheme = PaletteScheme<Gray4Proxy>;

impl<P: ColorProxy> Default for PaletteScheme<P> {
    fn default() -> Self {
        Self {
            overrides: HashMap::new(),
            _proxy: PhantomData,
        }
    }
}

impl<P: ColorProxy> PaletteScheme<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: HashMap<ColourRole, Pal16>) -> Self {
        Self {
            overrides,
            _proxy: PhantomData,
        }
    }

    /// Override a single role
    pub fn set(&mut self, role: ColourRole, colour: Pal16) {
        self.overrides.insert(role, colour);
    }

    /// Palette entry a role currently resolves to
    pub fn pal16(&self, role: ColourRole) -> Pal16 {
        self.overrides
            .get(&role)
            .copied()
            .unwrap_or_else(|| role.default_pal16())
    }
}

impl<P: ColorProxy> ColourScheme for PaletteScheme<P> {
    type Color = P::Output;

    fn colour(&self, role: ColourRole) -> P::Output {
        P::proxy(self.pal16(role))
    }
}
