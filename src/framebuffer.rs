//! The in-memory packed-pixel raster.
//!
//! Pixels are stored row-major, `8 / bits` pixels to a byte. Within a byte the leftmost pixel
//! occupies the most significant bits, which matches the SSD1322 with nibble remapping set to
//! `NibbleRemap::Forward`. The byte layout is exactly what `Display::flush` puts on the wire.

use itertools::iproduct;

use crate::error::GeometryError;

/// The number of bits used to store one pixel. Only depths that evenly divide a byte can be
/// represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelDepth {
    Mono,
    Gray2,
    Gray4,
    Gray8,
}

impl PixelDepth {
    pub fn bits(self) -> u8 {
        match self {
            PixelDepth::Mono => 1,
            PixelDepth::Gray2 => 2,
            PixelDepth::Gray4 => 4,
            PixelDepth::Gray8 => 8,
        }
    }

    pub fn pixels_per_byte(self) -> u8 {
        8 / self.bits()
    }

    /// The brightest native level, `2^bits - 1`.
    pub fn max_level(self) -> u8 {
        (0xFFu16 >> (8 - self.bits())) as u8
    }
}

/// Scale an 8-bit intensity down to the native level range of `depth`, rounding down. 0 maps to
/// 0 and 255 maps to `depth.max_level()` at every depth.
pub fn quantize(intensity: u8, depth: PixelDepth) -> u8 {
    let max = depth.max_level();
    (intensity as u16 * max as u16 / 255) as u8 & max
}

/// Number of bytes needed to hold a `width` by `height` raster at `depth`.
pub const fn buffer_len(width: u16, height: u16, depth: PixelDepth) -> usize {
    let bits = match depth {
        PixelDepth::Mono => 1,
        PixelDepth::Gray2 => 2,
        PixelDepth::Gray4 => 4,
        PixelDepth::Gray8 => 8,
    };
    height as usize * width as usize * bits / 8
}

/// A fixed-size packed-pixel raster over caller-provided storage.
///
/// All mutation goes through pixel-level operations, so the packing invariant holds for any
/// sequence of calls.
pub struct Framebuffer<S> {
    storage: S,
    width: u16,
    height: u16,
    depth: PixelDepth,
}

impl<S> Framebuffer<S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Wrap `storage` as a `width` by `height` raster of `depth`-bit pixels. The storage must be
    /// exactly `buffer_len(width, height, depth)` bytes, and each row must fill whole bytes. The
    /// storage is zeroed, so every pixel starts at level 0.
    pub fn new(
        mut storage: S,
        width: u16,
        height: u16,
        depth: PixelDepth,
    ) -> Result<Self, GeometryError> {
        if width % depth.pixels_per_byte() as u16 != 0 {
            return Err(GeometryError::UnpackedWidth);
        }
        let expected = buffer_len(width, height, depth);
        let actual = storage.as_ref().len();
        if actual != expected {
            return Err(GeometryError::StorageLength { expected, actual });
        }
        for b in storage.as_mut().iter_mut() {
            *b = 0;
        }
        Ok(Framebuffer {
            storage,
            width,
            height,
            depth,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    /// Length of the packed raster in bytes.
    pub fn len(&self) -> usize {
        self.storage.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize / self.depth.pixels_per_byte() as usize
    }

    /// Read-only view of the packed raster, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.storage.as_ref()
    }

    /// Give back the underlying storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Byte index and bit shift of the field holding pixel (x, y), or `None` when the coordinate
    /// lies outside the raster.
    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let ppb = self.depth.pixels_per_byte() as usize;
        let (x, y) = (x as usize, y as usize);
        let index = y * self.stride() + x / ppb;
        let shift = (ppb - 1 - x % ppb) as u8 * self.depth.bits();
        Some((index, shift))
    }

    /// Set pixel (x, y) to the native level nearest below `intensity` (see `quantize`). Pixels
    /// outside the raster, including negative coordinates, are silently ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, intensity: u8) {
        if let Some((index, shift)) = self.locate(x, y) {
            let level = quantize(intensity, self.depth);
            let mask = self.depth.max_level() << shift;
            let byte = &mut self.storage.as_mut()[index];
            *byte = (*byte & !mask) | (level << shift);
        }
    }

    /// Native level of pixel (x, y), or `None` outside the raster.
    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        self.locate(x, y).map(|(index, shift)| {
            (self.storage.as_ref()[index] >> shift) & self.depth.max_level()
        })
    }

    /// Set every pixel to `intensity`.
    pub fn fill(&mut self, intensity: u8) {
        let level = quantize(intensity, self.depth);
        // Replicate the level into every field of one byte; all bytes are then identical.
        let pattern = (0..self.depth.pixels_per_byte())
            .fold(0u8, |acc, i| acc | level << (i * self.depth.bits()));
        for b in self.storage.as_mut().iter_mut() {
            *b = pattern;
        }
    }

    /// Set every pixel to level 0.
    pub fn clear(&mut self) {
        self.fill(0)
    }

    /// Set every pixel in the `width` by `height` rectangle with upper left corner (x, y) to
    /// `intensity`. Parts of the rectangle outside the raster are dropped.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u16, height: u16, intensity: u8) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(width as i32).min(self.width as i32);
        let y1 = y.saturating_add(height as i32).min(self.height as i32);
        for (py, px) in iproduct!(y0..y1, x0..x1) {
            self.set_pixel(px, py, intensity);
        }
    }

    /// Every pixel with its native level, left to right and top to bottom.
    pub fn pixels<'a>(&'a self) -> impl Iterator<Item = (u16, u16, u8)> + 'a {
        iproduct!(0..self.height, 0..self.width).map(move |(y, x)| {
            let level = self.pixel(x as i32, y as i32).unwrap_or(0);
            (x, y, level)
        })
    }
}

#[cfg(feature = "std")]
impl Framebuffer<std::vec::Vec<u8>> {
    /// Allocate zeroed heap storage for a `width` by `height` raster.
    pub fn allocate(width: u16, height: u16, depth: PixelDepth) -> Result<Self, GeometryError> {
        Framebuffer::new(
            std::vec![0u8; buffer_len(width, height, depth)],
            width,
            height,
            depth,
        )
    }
}

#[cfg(feature = "graphics")]
mod graphics {
    use core::convert::Infallible;

    use embedded_graphics_core::draw_target::DrawTarget;
    use embedded_graphics_core::geometry::{OriginDimensions, Size};
    use embedded_graphics_core::pixelcolor::{Gray8, GrayColor};
    use embedded_graphics_core::Pixel;

    use super::Framebuffer;

    /// Drawing with `Gray8` colors; each luma is quantized like any other intensity. Colors of
    /// other gray depths can be drawn with `DrawTargetExt::color_converted`.
    impl<S> DrawTarget for Framebuffer<S>
    where
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        type Color = Gray8;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                self.set_pixel(point.x, point.y, color.luma());
            }
            Ok(())
        }

        fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
            self.fill(color.luma());
            Ok(())
        }
    }

    impl<S> OriginDimensions for Framebuffer<S>
    where
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        fn size(&self) -> Size {
            Size::new(self.width.into(), self.height.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn panel() -> Framebuffer<Vec<u8>> {
        Framebuffer::allocate(256, 64, PixelDepth::Gray4).unwrap()
    }

    #[test]
    fn depths() {
        assert_eq!(PixelDepth::Mono.max_level(), 1);
        assert_eq!(PixelDepth::Gray2.max_level(), 3);
        assert_eq!(PixelDepth::Gray4.max_level(), 15);
        assert_eq!(PixelDepth::Gray8.max_level(), 255);
        assert_eq!(PixelDepth::Gray2.pixels_per_byte(), 4);
    }

    #[test]
    fn quantize_endpoints_and_rounding() {
        for &depth in [
            PixelDepth::Mono,
            PixelDepth::Gray2,
            PixelDepth::Gray4,
            PixelDepth::Gray8,
        ]
        .iter()
        {
            assert_eq!(quantize(0, depth), 0);
            assert_eq!(quantize(255, depth), depth.max_level());
        }
        assert_eq!(quantize(128, PixelDepth::Gray4), 7);
        assert_eq!(quantize(17, PixelDepth::Gray4), 1);
        assert_eq!(quantize(16, PixelDepth::Gray4), 0);
        assert_eq!(quantize(254, PixelDepth::Mono), 0);
        assert_eq!(quantize(100, PixelDepth::Gray8), 100);
    }

    #[test]
    fn quantize_is_monotonic() {
        for i in 0..255u8 {
            assert!(quantize(i, PixelDepth::Gray4) <= quantize(i + 1, PixelDepth::Gray4));
        }
    }

    #[test]
    fn new_checks_geometry() {
        assert_eq!(buffer_len(256, 64, PixelDepth::Gray4), 8192);
        assert_eq!(
            Framebuffer::new([0u8; 8], 3, 4, PixelDepth::Gray4).err(),
            Some(GeometryError::UnpackedWidth)
        );
        assert_eq!(
            Framebuffer::new([0u8; 7], 4, 4, PixelDepth::Gray4).err(),
            Some(GeometryError::StorageLength {
                expected: 8,
                actual: 7
            })
        );
        assert!(Framebuffer::new([0u8; 8], 4, 4, PixelDepth::Gray4).is_ok());
    }

    #[test]
    fn new_zeroes_storage() {
        let fb = Framebuffer::new([0xAAu8; 8], 16, 4, PixelDepth::Mono).unwrap();
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(fb.stride(), 2);
    }

    #[test]
    fn borrowed_storage() {
        let mut frame = [0xFFu8; 4];
        {
            let mut fb = Framebuffer::new(&mut frame[..], 4, 2, PixelDepth::Gray4).unwrap();
            fb.set_pixel(2, 1, 255);
        }
        assert_eq!(frame, [0, 0, 0, 0xF0]);
    }

    #[test]
    fn set_pixel_touches_one_field_only() {
        let mut fb = panel();
        fb.fill(0x55);
        let before = fb.as_bytes().to_vec();
        fb.set_pixel(37, 12, 200);
        let after = fb.as_bytes();
        let index = 12 * 128 + 37 / 2;
        for (i, (b, a)) in before.iter().zip(after.iter()).enumerate() {
            if i != index {
                assert_eq!(b, a, "byte {} changed", i);
            }
        }
        // x = 37 is the second pixel of its byte: the low nibble.
        assert_eq!(after[index], 0x50 | quantize(200, PixelDepth::Gray4));
        assert_eq!(fb.pixel(37, 12), Some(11));
        assert_eq!(fb.pixel(36, 12), Some(5));
    }

    #[test]
    fn set_pixel_reads_back_quantized() {
        let mut fb = panel();
        for &(x, y, v) in [(0, 0, 255u8), (1, 0, 128), (255, 63, 1), (100, 31, 34)].iter() {
            fb.set_pixel(x, y, v);
            assert_eq!(fb.pixel(x, y), Some(quantize(v, PixelDepth::Gray4)));
        }
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut fb = panel();
        fb.fill(0x80);
        let before = fb.as_bytes().to_vec();
        for &(x, y) in [(-1, 0), (0, -1), (256, 0), (0, 64), (-300, 900), (i32::MAX, 0)].iter() {
            fb.set_pixel(x, y, 255);
            assert_eq!(fb.pixel(x, y), None);
        }
        assert_eq!(fb.as_bytes(), &before[..]);
    }

    #[test]
    fn set_pixel_is_idempotent() {
        let mut once = panel();
        once.set_pixel(9, 9, 99);
        let mut twice = panel();
        twice.set_pixel(9, 9, 99);
        twice.set_pixel(9, 9, 99);
        assert_eq!(once.as_bytes(), twice.as_bytes());
    }

    #[test]
    fn packing_order_is_commutative() {
        let mut a = panel();
        a.set_pixel(0, 5, 255);
        a.set_pixel(1, 5, 0);
        let mut b = panel();
        b.set_pixel(1, 5, 0);
        b.set_pixel(0, 5, 255);
        assert_eq!(a.as_bytes()[5 * 128], 0xF0);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn packing_at_other_depths() {
        let mut fb = Framebuffer::new([0u8; 2], 8, 2, PixelDepth::Mono).unwrap();
        fb.set_pixel(0, 0, 255);
        fb.set_pixel(7, 1, 255);
        assert_eq!(fb.as_bytes(), &[0x80, 0x01]);

        let mut fb = Framebuffer::new([0u8; 1], 4, 1, PixelDepth::Gray2).unwrap();
        fb.set_pixel(1, 0, 255);
        fb.set_pixel(2, 0, 128);
        assert_eq!(fb.as_bytes(), &[0b0011_0100]);

        let mut fb = Framebuffer::new([0u8; 2], 2, 1, PixelDepth::Gray8).unwrap();
        fb.set_pixel(1, 0, 42);
        assert_eq!(fb.as_bytes(), &[0, 42]);
    }

    #[test]
    fn fill_matches_per_pixel() {
        let mut bulk = panel();
        bulk.fill(200);
        let mut each = panel();
        for (y, x) in iproduct!(0..64, 0..256) {
            each.set_pixel(x, y, 200);
        }
        assert_eq!(bulk.as_bytes(), each.as_bytes());
        assert!(bulk.as_bytes().iter().all(|&b| b == 0xBB));
        bulk.clear();
        assert!(bulk.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn fill_rect_clips() {
        let mut fb = Framebuffer::new([0u8; 8], 8, 2, PixelDepth::Gray4).unwrap();
        fb.fill_rect(-2, 1, 5, 4, 255);
        assert_eq!(fb.as_bytes(), &[0, 0, 0, 0, 0xFF, 0xF0, 0, 0]);
    }

    #[test]
    fn pixels_iterates_row_major() {
        let mut fb = Framebuffer::new([0u8; 2], 2, 2, PixelDepth::Gray4).unwrap();
        fb.set_pixel(1, 0, 255);
        fb.set_pixel(0, 1, 17);
        let all = fb.pixels().collect::<Vec<_>>();
        assert_eq!(all, vec![(0, 0, 0), (1, 0, 15), (0, 1, 1), (1, 1, 0)]);
    }

    #[cfg(feature = "graphics")]
    #[test]
    fn draw_target() {
        use embedded_graphics_core::draw_target::DrawTarget;
        use embedded_graphics_core::geometry::{OriginDimensions, Point, Size};
        use embedded_graphics_core::pixelcolor::Gray8;
        use embedded_graphics_core::Pixel;

        let mut fb = Framebuffer::new([0u8; 8], 8, 2, PixelDepth::Gray4).unwrap();
        assert_eq!(fb.size(), Size::new(8, 2));
        fb.draw_iter(vec![
            Pixel(Point::new(0, 0), Gray8::new(255)),
            Pixel(Point::new(3, 1), Gray8::new(128)),
            Pixel(Point::new(-1, 1), Gray8::new(255)),
        ])
        .unwrap();
        assert_eq!(fb.as_bytes(), &[0xF0, 0, 0, 0, 0, 0x07, 0, 0]);
        DrawTarget::clear(&mut fb, Gray8::new(255)).unwrap();
        assert!(fb.as_bytes().iter().all(|&b| b == 0xFF));
    }
}
