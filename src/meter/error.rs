/*
 *  meter/error.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the meter widget
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

use thiserror::Error;

/// Errors surfaced by the meter API. Rendering never fails with these; an
/// absent source or a disabled sub-feature is not an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeterError {
    /// Raw channel argument below the `-1` "all channels" sentinel
    #[error("invalid channel {0} (use -1 for all channels)")]
    InvalidChannel(i32),

    /// Flag name not known to [`MeterFlags`](crate::meter::MeterFlags)
    #[error("unknown meter flag '{0}'")]
    UnknownFlag(String),
}

/// Convert a host channel argument into the widget's channel selector.
///
/// `-1` addresses every channel (`None`), a non-negative value addresses one
/// channel. Any other negative value is rejected rather than clamped.
pub fn parse_channel(raw: i32) -> Result<Option<usize>, MeterError> {
    match raw {
        -1 => Ok(None),
        c if c >= 0 => Ok(Some(c as usize)),
        c => Err(MeterError::InvalidChannel(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel() {
        assert_eq!(parse_channel(-1), Ok(None));
        assert_eq!(parse_channel(0), Ok(Some(0)));
        assert_eq!(parse_channel(7), Ok(Some(7)));
        assert_eq!(parse_channel(-2), Err(MeterError::InvalidChannel(-2)));
        assert_eq!(parse_channel(i32::MIN), Err(MeterError::InvalidChannel(i32::MIN)));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            MeterError::InvalidChannel(-3).to_string(),
            "invalid channel -3 (use -1 for all channels)"
        );
        assert_eq!(MeterError::UnknownFlag("x".into()).to_string(), "unknown meter flag 'x'");
    }
}
