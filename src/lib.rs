//! Framebuffer driver for the Solomon Systech SSD1322 dot matrix OLED display driver.
//!
//! Drawing happens in two phases: pixels are written into an in-memory packed [`Framebuffer`],
//! and [`Display::flush`] transfers the whole buffer to the controller in a single write.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate embedded_hal as hal;

#[macro_use]
mod fmt;

// This has to be here in order to be usable by mods declared afterwards.
#[cfg(test)]
#[macro_use]
mod testing {
    macro_rules! send {
        ([$($d:tt),*]) => {Sent::Data(vec![$($d,)*])};
        ($c:tt) => {Sent::Cmd($c)};
    }
    macro_rules! sends {
        ($($e:tt),*) => {&[$(send!($e),)*]};
    }
}

pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod interface;

// Re-exports for primary API.
pub use crate::command::{consts, ComLayout, ComScanDirection, Command, DisplayMode};
pub use crate::config::Config;
pub use crate::display::{AddressWindow, Display, PixelCoord};
pub use crate::error::{Error, GeometryError};
pub use crate::framebuffer::{quantize, Framebuffer, PixelDepth};
pub use crate::interface::callback::CallbackInterface;
pub use crate::interface::spi::SpiInterface;
pub use crate::interface::DisplayInterface;
