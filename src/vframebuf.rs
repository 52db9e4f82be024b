/*
 *  vframebuf.rs
 *
 *  levelmeter - meters, meters, meters
 *	(c) 2020-26 Stuart Hunter
 *
 *	Runtime sized framebuffer, used for the meter's cached static layer
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access, row-major
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    /// Reallocate to `size` when it differs, then fill. Returns true when
    /// the buffer was reallocated.
    pub fn reset(&mut self, size: Size, fill: C) -> bool {
        let (w, h) = (size.width as usize, size.height as usize);
        if w == self.w && h == self.h {
            self.clear_color(fill);
            return false;
        }
        self.buf = vec![fill; w * h];
        self.w = w;
        self.h = h;
        true
    }

    /// Pixel at (x,y); None outside the buffer
    pub fn pixel(&self, p: Point) -> Option<C> {
        self.idx(p).map(|i| self.buf[i])
    }

    /// Copy the whole buffer onto `target` with its origin at `top_left`.
    pub fn blit<D>(&self, target: &mut D, top_left: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = C>,
    {
        let area = Rectangle::new(top_left, self.size());
        target.fill_contiguous(&area, self.buf.iter().copied())
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // row-major walk of `area`; pixels outside the buffer are consumed and dropped
        let Size { width, height } = area.size;
        if width == 0 || height == 0 { return Ok(()); }

        let mut it = colors.into_iter();
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let Some(c) = it.next() else { return Ok(()) };
                let p = Point::new(area.top_left.x + col, area.top_left.y + row);
                if let Some(i) = self.idx(p) {
                    self.buf[i] = c;
                }
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let bounds = Rectangle::new(Point::zero(), self.size());
        let clipped = area.intersection(&bounds);
        let Size { width, height } = clipped.size;
        if width == 0 || height == 0 { return Ok(()); }

        let x0 = clipped.top_left.x as usize;
        let y0 = clipped.top_left.y as usize;
        for row in y0..y0 + height as usize {
            let base = row * self.w + x0;
            self.buf[base..base + width as usize].fill(color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::primitives::PrimitiveStyle;

    #[test]
    fn test_reset_reallocates_only_on_size_change() {
        let mut fb = VarFrameBuf::new(4, 4, BinaryColor::On);
        assert!(!fb.reset(Size::new(4, 4), BinaryColor::Off));
        assert!(fb.as_slice().iter().all(|&p| p == BinaryColor::Off));
        assert!(fb.reset(Size::new(8, 2), BinaryColor::On));
        assert_eq!(fb.size(), Size::new(8, 2));
        assert_eq!(fb.as_slice().len(), 16);
    }

    #[test]
    fn test_fill_solid_clips() {
        let mut fb = VarFrameBuf::new(10, 10, BinaryColor::Off);
        Rectangle::new(Point::new(-5, 8), Size::new(8, 8))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        let on = fb.as_slice().iter().filter(|&&p| p == BinaryColor::On).count();
        assert_eq!(on, 3 * 2);
        assert_eq!(fb.pixel(Point::new(0, 9)), Some(BinaryColor::On));
        assert_eq!(fb.pixel(Point::new(3, 9)), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(Point::new(10, 0)), None);
    }

    #[test]
    fn test_blit_offsets_and_clips() {
        let mut src = VarFrameBuf::new(3, 3, BinaryColor::On);
        src.draw_iter([Pixel(Point::new(1, 1), BinaryColor::Off)]).unwrap();

        let mut dst = VarFrameBuf::new(4, 4, BinaryColor::Off);
        src.blit(&mut dst, Point::new(2, 2)).unwrap();

        assert_eq!(dst.pixel(Point::new(2, 2)), Some(BinaryColor::On));
        assert_eq!(dst.pixel(Point::new(3, 3)), Some(BinaryColor::Off));
        assert_eq!(dst.pixel(Point::new(3, 2)), Some(BinaryColor::On));
        assert_eq!(dst.pixel(Point::new(1, 1)), Some(BinaryColor::Off));
    }
}
