//! Bring-up configuration for a particular display module: the register sequence sent at init,
//! and where the module's pixels sit inside the controller RAM.
//!
//! Init sequences are plain static lists of `Command`s, sent verbatim and in order, so a new
//! module variant only needs a new list.

use crate::command::*;
use crate::display::PixelCoord;
use crate::error::Error;
use crate::interface;

/// Register sequence for the Newhaven NHD-3.12-25664 (256x64, dual COM, external VSL) module,
/// ending with the panel switched on.
#[cfg_attr(rustfmt, rustfmt_skip)]
pub const NHD_3_12_25664_INIT: &[Command] = &[
    Command::SetCommandLock(false),
    Command::SetSleepMode(true),
    Command::SetClockFoscDivset(9, 1),
    Command::SetMuxRatio(64),
    Command::SetDisplayOffset(0),
    Command::SetStartLine(0),
    Command::SetRemapping(
        IncrementAxis::Horizontal,
        ColumnRemap::Forward,
        NibbleRemap::Forward,
        ComScanDirection::RowZeroLast,
        ComLayout::DualProgressive,
    ),
    Command::SetGpio(0),
    Command::SetInternalVdd(true),
    Command::SetDisplayEnhancements(true, true),
    Command::SetContrastCurrent(0xFF),
    Command::SetMasterContrast(15),
    Command::SetDefaultGrayScaleTable,
    Command::SetPhaseLengths(5, 14),
    Command::SetDisplayEnhancementB(true),
    Command::SetPreChargeVoltage(31),
    Command::SetSecondPrechargePeriod(8),
    Command::SetComDeselectVoltage(4),
    Command::SetDisplayMode(DisplayMode::Normal),
    Command::DisablePartialDisplay,
    Command::SetSleepMode(false),
];

/// A configuration for the display module. The init sequence is mandatory; the display offset
/// defaults to (0, 0) and can be changed with the builder method.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    init_sequence: &'static [Command],
    display_offset: PixelCoord,
}

impl Config {
    /// Create a configuration which brings the controller up by sending `init_sequence`.
    pub fn new(init_sequence: &'static [Command]) -> Self {
        Config {
            init_sequence,
            display_offset: PixelCoord(0, 0),
        }
    }

    /// The Newhaven NHD-3.12-25664 module. Its 256 pixel columns are wired to the middle of the
    /// 480 controller segments, starting at segment 112 (controller column 0x1C).
    pub fn nhd_3_12_25664() -> Self {
        Config::new(NHD_3_12_25664_INIT).display_offset(PixelCoord(112, 0))
    }

    /// Extend this `Config` with the module's display offset.
    ///
    /// Some display modules with resolution lower than the maximum supported by the chip will
    /// connect column driver or COM lines starting in the middle rather than from 0 for
    /// mechanical PCB layout reasons. `display_offset.0` is the driver segment which corresponds
    /// to pixel column 0 of the display and must be a multiple of 4. `display_offset.1` is the
    /// COM line corresponding to pixel row 0; it is the init sequence's job to program it (see
    /// `Command::SetDisplayOffset`), and it only takes part in the RAM bounds check here.
    pub fn display_offset(self, display_offset: PixelCoord) -> Self {
        Self {
            display_offset,
            ..self
        }
    }

    pub fn init_sequence(&self) -> &'static [Command] {
        self.init_sequence
    }

    pub fn offset(&self) -> PixelCoord {
        self.display_offset
    }

    /// Transmit the init sequence to the display at `iface`, stopping at the first failure.
    pub(crate) fn send<DI>(&self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: interface::DisplayInterface,
    {
        self.init_sequence
            .iter()
            .try_for_each(|cmd| cmd.send(&mut *iface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::{Sent, TestSpyInterface};

    #[test]
    fn nhd_init_bytes() {
        let mut di = TestSpyInterface::new();
        Config::nhd_3_12_25664().send(&mut di).unwrap();
        #[cfg_attr(rustfmt, rustfmt_skip)]
        di.check_multi(sends!(
            0xFD, [0x12], // unlock
            0xAE, // sleep enable
            0xB3, [0x91], // clock
            0xCA, [0x3F], // mux ratio 64 lines
            0xA2, [0x00], // display offset 0
            0xA1, [0x00], // start line 0
            0xA0, [0x14, 0x11], // remapping
            0xB5, [0x00], // GPIO disabled
            0xAB, [0x01], // internal VDD
            0xB4, [0xA0, 0xFD], // display enhancements
            0xC1, [0xFF], // contrast current
            0xC7, [0x0F], // master contrast
            0xB9, // default gray scale table
            0xB1, [0xE2], // phase lengths
            0xD1, [0x82, 0x20], // display enhancement B
            0xBB, [0x1F], // precharge voltage
            0xB6, [0x08], // second precharge
            0xBE, [0x04], // com deselect voltage
            0xA6, // display normal
            0xA9, // exit partial display
            0xAF // sleep disable
        ));
    }

    #[test]
    fn nhd_offset() {
        let cfg = Config::nhd_3_12_25664();
        assert_eq!(cfg.offset(), PixelCoord(112, 0));
        assert_eq!(cfg.init_sequence().len(), 21);
    }

    #[test]
    fn send_stops_at_invalid_command() {
        static BAD: &[Command] = &[
            Command::SetSleepMode(true),
            Command::SetMuxRatio(4),
            Command::SetSleepMode(false),
        ];
        let mut di = TestSpyInterface::new();
        assert_eq!(Config::new(BAD).send(&mut di), Err(Error::InvalidArgument));
        di.check_multi(&[Sent::Cmd(0xAE)]);
    }
}
