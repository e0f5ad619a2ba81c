//! The main API to the display driver. It owns the interface and the framebuffer, brings the
//! controller up, and flushes the framebuffer to the controller RAM.

use crate::command::consts::*;
use crate::command::*;
use crate::config::Config;
use crate::error::{Error, GeometryError};
use crate::framebuffer::{Framebuffer, PixelDepth};
use crate::interface;

/// A pixel coordinate pair of `column` and `row`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelCoord(pub i16, pub i16);

/// The controller RAM range written by a flush, in controller units: columns of 4 pixels and
/// rows of 1 pixel, both inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressWindow {
    pub columns: (u8, u8),
    pub rows: (u8, u8),
}

/// A driver for an SSD1322 display.
///
/// The framebuffer is held in memory and drawn into with `set_pixel` and `fill`. Nothing reaches
/// the panel until `flush`, which always rewrites the whole frame.
pub struct Display<DI, S> {
    iface: DI,
    framebuffer: Framebuffer<S>,
    config: Config,
    window: AddressWindow,
}

impl<DI, S> Display<DI, S>
where
    DI: interface::DisplayInterface,
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Construct a new display driver drawing `framebuffer` onto the display connected to
    /// `iface`. The framebuffer dimensions are the viewable size of the panel, and must be in the
    /// controller's native 4 bits per pixel. Together with `config.offset()`, the panel must fit
    /// the controller RAM and be aligned to whole columns of 4 pixels.
    ///
    /// No commands are sent until `init`.
    pub fn new(
        iface: DI,
        framebuffer: Framebuffer<S>,
        config: Config,
    ) -> Result<Self, GeometryError> {
        if framebuffer.depth() != PixelDepth::Gray4 {
            return Err(GeometryError::UnsupportedDepth);
        }
        let window = address_window(framebuffer.width(), framebuffer.height(), config.offset())
            .ok_or(GeometryError::OutOfRange)?;
        Ok(Display {
            iface,
            framebuffer,
            config,
            window,
        })
    }

    /// Bring the controller up: send the configured init sequence, then clear the framebuffer
    /// and flush it so the panel starts all dark.
    pub fn init(&mut self) -> Result<(), Error<DI::Error>> {
        debug!(
            "ssd1322: init, {=u16}x{=u16} panel",
            self.framebuffer.width(),
            self.framebuffer.height()
        );
        self.config.send(&mut self.iface)?;
        self.framebuffer.clear();
        self.flush()
    }

    /// Transfer the entire framebuffer to the controller: set the column window, set the row
    /// window, then write the packed raster in one bulk data transfer. The controller advances
    /// its write pointer by itself, row by row.
    ///
    /// If the interface fails partway, the framebuffer is untouched but the panel may show a
    /// partial frame until the next successful flush. No retry is attempted.
    pub fn flush(&mut self) -> Result<(), Error<DI::Error>> {
        let AddressWindow { columns, rows } = self.window;
        debug!(
            "ssd1322: flush {=usize} bytes to columns {=u8:#x}..={=u8:#x}",
            self.framebuffer.len(),
            columns.0,
            columns.1
        );
        Command::SetColumnAddress(columns.0, columns.1).send(&mut self.iface)?;
        Command::SetRowAddress(rows.0, rows.1).send(&mut self.iface)?;
        BufCommand::WriteImageData(self.framebuffer.as_bytes()).send(&mut self.iface)
    }

    /// The controller RAM window every flush writes to.
    pub fn address_window(&self) -> AddressWindow {
        self.window
    }

    /// Set one pixel of the framebuffer. Out of range coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, intensity: u8) {
        self.framebuffer.set_pixel(x, y, intensity)
    }

    /// Native level (0-15) of a framebuffer pixel, or `None` out of range.
    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        self.framebuffer.pixel(x, y)
    }

    /// Set every pixel of the framebuffer to `intensity`.
    pub fn fill(&mut self, intensity: u8) {
        self.framebuffer.fill(intensity)
    }

    pub fn clear(&mut self) {
        self.framebuffer.clear()
    }

    pub fn framebuffer(&self) -> &Framebuffer<S> {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer<S> {
        &mut self.framebuffer
    }

    /// Control sleep mode.
    pub fn sleep(&mut self, enabled: bool) -> Result<(), Error<DI::Error>> {
        Command::SetSleepMode(enabled).send(&mut self.iface)
    }

    /// Control the master contrast.
    pub fn contrast(&mut self, contrast: u8) -> Result<(), Error<DI::Error>> {
        Command::SetMasterContrast(contrast).send(&mut self.iface)
    }

    /// Set the vertical pan.
    ///
    /// This uses the `Command::SetStartLine` feature to shift the display RAM row addresses
    /// relative to the active set of COM lines. Flushes always write rows starting at 0, so
    /// panning scrolls the last flushed frame with wrap-around.
    pub fn vertical_pan(&mut self, offset: u8) -> Result<(), Error<DI::Error>> {
        Command::SetStartLine(offset).send(&mut self.iface)
    }

    /// Switch between normal, inverted and blanked output. The framebuffer is not affected.
    pub fn display_mode(&mut self, mode: DisplayMode) -> Result<(), Error<DI::Error>> {
        Command::SetDisplayMode(mode).send(&mut self.iface)
    }

    /// Tear down the driver, giving back the interface and the framebuffer.
    pub fn release(self) -> (DI, Framebuffer<S>) {
        (self.iface, self.framebuffer)
    }
}

/// Controller RAM window covering a `width` by `height` panel at `offset`, or `None` when it
/// does not fit or is not column aligned.
fn address_window(width: u16, height: u16, offset: PixelCoord) -> Option<AddressWindow> {
    let cols = PIXELS_PER_BUF_COL as i32;
    let (width, height) = (width as i32, height as i32);
    let (off_x, off_y) = (offset.0 as i32, offset.1 as i32);
    if false
        || width == 0
        || height == 0
        || off_x < 0
        || off_y < 0
        || off_x + width > NUM_PIXEL_COLS as i32
        || off_y + height > NUM_PIXEL_ROWS as i32
        || width.rem_euclid(cols) != 0
        || off_x.rem_euclid(cols) != 0
    {
        return None;
    }
    // The row offset is applied by the controller itself (`SetDisplayOffset`), so RAM rows
    // always start at 0.
    Some(AddressWindow {
        columns: ((off_x / cols) as u8, ((off_x + width) / cols - 1) as u8),
        rows: (0, (height - 1) as u8),
    })
}

#[cfg(feature = "graphics")]
mod graphics {
    use embedded_graphics_core::draw_target::DrawTarget;
    use embedded_graphics_core::geometry::{OriginDimensions, Size};
    use embedded_graphics_core::pixelcolor::Gray8;
    use embedded_graphics_core::Pixel;

    use super::Display;
    use crate::interface;

    /// Draws into the framebuffer; call `Display::flush` to show the result.
    impl<DI, S> DrawTarget for Display<DI, S>
    where
        DI: interface::DisplayInterface,
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        type Color = Gray8;
        type Error = core::convert::Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            self.framebuffer.draw_iter(pixels)
        }

        fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
            DrawTarget::clear(&mut self.framebuffer, color)
        }
    }

    impl<DI, S> OriginDimensions for Display<DI, S>
    where
        DI: interface::DisplayInterface,
        S: AsRef<[u8]> + AsMut<[u8]>,
    {
        fn size(&self) -> Size {
            self.framebuffer.size()
        }
    }
}
