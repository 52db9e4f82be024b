/*
 *  meter/flags.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Meter display options
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

use std::fmt;

use bitflags::bitflags;

use crate::meter::error::MeterError;

bitflags! {
    /// Independent display options of a meter. A meter is built with one
    /// combination and keeps it for its whole life; every layout and draw
    /// query of the style receives it.
    pub struct MeterFlags: u32 {
        const HORIZONTAL     = 0x0001;
        const VINTAGE        = 0x0002;
        const SINGLE_CHANNEL = 0x0004;
        const HAS_BORDER     = 0x0008;
        const REDUCTION      = 0x0010;
        const MINIMAL        = 0x0020;
    }
}

/// Config names, in bit order.
const FLAG_NAMES: [(&str, MeterFlags); 6] = [
    ("horizontal", MeterFlags::HORIZONTAL),
    ("vintage", MeterFlags::VINTAGE),
    ("single_channel", MeterFlags::SINGLE_CHANNEL),
    ("has_border", MeterFlags::HAS_BORDER),
    ("reduction", MeterFlags::REDUCTION),
    ("minimal", MeterFlags::MINIMAL),
];

impl Default for MeterFlags {
    fn default() -> Self {
        MeterFlags::HAS_BORDER
    }
}

impl MeterFlags {
    /// Parse one flag name as used in YAML/CLI (`"has_border"`, `"vintage"`, ...).
    /// `"none"` yields the empty set, `"default"` the stock set.
    pub fn from_name(name: &str) -> Result<MeterFlags, MeterError> {
        let wanted = name.trim().to_ascii_lowercase().replace('-', "_");
        match wanted.as_str() {
            "none" => return Ok(MeterFlags::empty()),
            "default" => return Ok(MeterFlags::default()),
            _ => {}
        }
        FLAG_NAMES
            .iter()
            .find(|(n, _)| *n == wanted)
            .map(|(_, f)| *f)
            .ok_or_else(|| MeterError::UnknownFlag(name.to_string()))
    }

    /// OR together a list of flag names.
    pub fn from_names<I, S>(names: I) -> Result<MeterFlags, MeterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .try_fold(MeterFlags::empty(), |acc, n| Ok(acc | MeterFlags::from_name(n.as_ref())?))
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.contains(MeterFlags::HORIZONTAL)
    }

    #[inline]
    pub fn is_minimal(&self) -> bool {
        self.contains(MeterFlags::MINIMAL)
    }
}

impl fmt::Display for MeterFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut first = true;
        for (name, flag) in FLAG_NAMES.iter() {
            if self.contains(*flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_bordered() {
        assert_eq!(MeterFlags::default(), MeterFlags::HAS_BORDER);
    }

    #[test]
    fn test_combination() {
        let f = MeterFlags::HORIZONTAL | MeterFlags::MINIMAL;
        assert!(f.is_horizontal());
        assert!(f.is_minimal());
        assert!(!f.contains(MeterFlags::VINTAGE));
        assert_eq!(f.bits(), 0x0021);
    }

    #[test]
    fn test_from_names() {
        let f = MeterFlags::from_names(["horizontal", "has-border", "Reduction"]).unwrap();
        assert_eq!(f, MeterFlags::HORIZONTAL | MeterFlags::HAS_BORDER | MeterFlags::REDUCTION);
        assert_eq!(MeterFlags::from_name("none").unwrap(), MeterFlags::empty());
        assert_eq!(MeterFlags::from_name("default").unwrap(), MeterFlags::HAS_BORDER);
        assert!(matches!(MeterFlags::from_name("sparkly"), Err(MeterError::UnknownFlag(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(MeterFlags::empty().to_string(), "none");
        let f = MeterFlags::VINTAGE | MeterFlags::HAS_BORDER;
        assert_eq!(f.to_string(), "vintage|has_border");
    }
}
