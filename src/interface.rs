//! The byte-level channel to the controller. The driver only ever needs to send command bytes
//! and data bytes; how they physically reach the chip is up to the implementation.

pub trait DisplayInterface {
    type Error;

    /// Send a single command byte.
    fn send_command(&mut self, cmd: u8) -> Result<(), Self::Error>;

    /// Send a contiguous run of data bytes.
    fn send_data(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Send a single data byte.
    fn send_data_byte(&mut self, data: u8) -> Result<(), Self::Error> {
        self.send_data(&[data])
    }
}

impl<'a, DI> DisplayInterface for &'a mut DI
where
    DI: DisplayInterface,
{
    type Error = DI::Error;

    fn send_command(&mut self, cmd: u8) -> Result<(), Self::Error> {
        (**self).send_command(cmd)
    }

    fn send_data(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        (**self).send_data(buf)
    }
}

pub mod spi {
    //! The SPI interface supports the "4-wire" interface of the driver, such that each word on the
    //! SPI bus is 8 bits. The "3-wire" mode replaces the D/C GPIO with a 9th bit on each word,
    //! which seems really awkward to implement with embedded_hal SPI.

    use crate::hal;

    use super::DisplayInterface;

    /// Failure of either the SPI bus or the D/C pin.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum SpiInterfaceError<SE, PE> {
        Spi(SE),
        Pin(PE),
    }

    pub struct SpiInterface<SPI, DC> {
        /// The SPI master device connected to the SSD1322.
        spi: SPI,
        /// A GPIO output pin connected to the D/C (data/command) pin of the SSD1322 (the fourth
        /// "wire" of "4-wire" mode).
        dc: DC,
    }

    impl<SPI, DC> SpiInterface<SPI, DC>
    where
        SPI: hal::blocking::spi::Write<u8>,
        DC: hal::digital::v2::OutputPin,
    {
        /// Create a new SPI interface to communicate with the display driver. `spi` is the SPI
        /// master device, and `dc` is the GPIO output pin connected to the D/C pin of the SSD1322.
        pub fn new(spi: SPI, dc: DC) -> Self {
            Self { spi, dc }
        }

        /// Give back the SPI device and D/C pin.
        pub fn release(self) -> (SPI, DC) {
            (self.spi, self.dc)
        }
    }

    impl<SPI, DC> DisplayInterface for SpiInterface<SPI, DC>
    where
        SPI: hal::blocking::spi::Write<u8>,
        DC: hal::digital::v2::OutputPin,
    {
        type Error = SpiInterfaceError<SPI::Error, DC::Error>;

        fn send_command(&mut self, cmd: u8) -> Result<(), Self::Error> {
            self.dc.set_low().map_err(SpiInterfaceError::Pin)?;
            self.spi.write(&[cmd]).map_err(SpiInterfaceError::Spi)?;
            self.dc.set_high().map_err(SpiInterfaceError::Pin)
        }

        fn send_data(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            self.dc.set_high().map_err(SpiInterfaceError::Pin)?;
            self.spi.write(buf).map_err(SpiInterfaceError::Spi)
        }
    }
}

pub mod callback {
    //! An interface built from caller-supplied functions, for transports that are easier to
    //! express as a pair of closures than as a type (bit-banged buses, C shims, simulators).

    use core::convert::Infallible;

    use super::DisplayInterface;

    pub struct CallbackInterface<C, D> {
        command: C,
        data: D,
    }

    impl<C, D> CallbackInterface<C, D>
    where
        C: FnMut(u8),
        D: FnMut(&[u8]),
    {
        /// `command` is called once per command byte, `data` once per run of data bytes. Both
        /// are assumed to always succeed.
        pub fn new(command: C, data: D) -> Self {
            Self { command, data }
        }
    }

    impl<C, D> DisplayInterface for CallbackInterface<C, D>
    where
        C: FnMut(u8),
        D: FnMut(&[u8]),
    {
        type Error = Infallible;

        fn send_command(&mut self, cmd: u8) -> Result<(), Infallible> {
            (self.command)(cmd);
            Ok(())
        }

        fn send_data(&mut self, buf: &[u8]) -> Result<(), Infallible> {
            (self.data)(buf);
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::cell::RefCell;
        use std::vec::Vec;

        #[test]
        fn forwards_bytes() {
            let cmds = RefCell::new(Vec::new());
            let data = RefCell::new(Vec::new());
            let mut di = CallbackInterface::new(
                |c| cmds.borrow_mut().push(c),
                |d: &[u8]| data.borrow_mut().push(d.to_vec()),
            );
            di.send_command(0x5C).unwrap();
            di.send_data(&[1, 2, 3]).unwrap();
            di.send_data_byte(4).unwrap();
            drop(di);
            assert_eq!(cmds.into_inner(), vec![0x5C]);
            assert_eq!(data.into_inner(), vec![vec![1, 2, 3], vec![4]]);
        }
    }
}

#[cfg(test)]
pub mod test_spy {
    //! An interface for use in unit tests to spy on whatever was sent to it.

    use super::DisplayInterface;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Sent {
        Cmd(u8),
        Data(Vec<u8>),
    }

    /// The error returned once an armed spy runs out of allowed calls.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct SpyFault;

    #[derive(Default)]
    struct Log {
        sent: Vec<Sent>,
        calls_left: Option<usize>,
    }

    #[derive(Clone)]
    pub struct TestSpyInterface {
        log: Rc<RefCell<Log>>,
    }

    impl TestSpyInterface {
        pub fn new() -> Self {
            TestSpyInterface {
                log: Rc::new(RefCell::new(Log::default())),
            }
        }

        /// A second handle onto the same log, to be moved into the driver under test.
        pub fn split(&self) -> Self {
            self.clone()
        }

        /// Allow `calls` more successful calls, then fail every call after that.
        pub fn fail_after(&self, calls: usize) {
            self.log.borrow_mut().calls_left = Some(calls);
        }

        pub fn sent(&self) -> Vec<Sent> {
            self.log.borrow().sent.clone()
        }

        pub fn check_multi(&self, expect: &[Sent]) {
            assert_eq!(self.log.borrow().sent, expect);
        }

        pub fn clear(&mut self) {
            self.log.borrow_mut().sent.clear()
        }

        fn record(&mut self, sent: Sent) -> Result<(), SpyFault> {
            let mut log = self.log.borrow_mut();
            match log.calls_left {
                Some(0) => return Err(SpyFault),
                Some(ref mut n) => *n -= 1,
                None => {}
            }
            log.sent.push(sent);
            Ok(())
        }
    }

    impl DisplayInterface for TestSpyInterface {
        type Error = SpyFault;

        fn send_command(&mut self, cmd: u8) -> Result<(), SpyFault> {
            self.record(Sent::Cmd(cmd))
        }
        fn send_data(&mut self, data: &[u8]) -> Result<(), SpyFault> {
            self.record(Sent::Data(data.to_vec()))
        }
    }
}
