/*
 *  display/snapshot.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Plain PBM/PGM dumps of a framebuffer, handy without a panel attached
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

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use embedded_graphics::pixelcolor::{BinaryColor, Gray4, GrayColor};

use crate::vframebuf::VarFrameBuf;

/// Framebuffers that can be written out as a netpbm image.
pub trait Snapshot {
    fn write_snapshot<W: Write>(&self, out: &mut W) -> io::Result<()>;

    fn save_snapshot(&self, path: &Path) -> io::Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        self.write_snapshot(&mut file)?;
        file.flush()
    }
}

fn write_rows<W, T, F>(out: &mut W, pixels: &[T], width: usize, mut cell: F) -> io::Result<()>
where
    W: Write,
    T: Copy,
    F: FnMut(T) -> u8,
{
    if width == 0 {
        return Ok(());
    }
    for row in pixels.chunks(width) {
        for (i, &pixel) in row.iter().enumerate() {
            if i > 0 {
                write!(out, " ")?;
            }
            write!(out, "{}", cell(pixel))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Plain PBM (P1), 1 = ink
impl Snapshot for VarFrameBuf<BinaryColor> {
    fn write_snapshot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P1")?;
        writeln!(out, "{} {}", self.width(), self.height())?;
        write_rows(out, self.as_slice(), self.width(), |p| u8::from(p == BinaryColor::On))
    }
}

/// Plain PGM (P2), maxval 15
impl Snapshot for VarFrameBuf<Gray4> {
    fn write_snapshot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P2")?;
        writeln!(out, "{} {}", self.width(), self.height())?;
        writeln!(out, "15")?;
        write_rows(out, self.as_slice(), self.width(), |p| p.luma())
    }
}
