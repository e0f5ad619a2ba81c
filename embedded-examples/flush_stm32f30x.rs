//! Full example code for driving an SSD1322 display through the framebuffer. This runs on an
//! STM32F303RE, using a Newhaven Displays NHD-3.12-25664UCY2 connected to SPI1, PA8 for D/C, and
//! PA9 for /RESET.

#![deny(unsafe_code)]
#![no_main]
#![no_std]

extern crate cortex_m;
extern crate embedded_hal as hal_api;
extern crate stm32f30x;
extern crate stm32f30x_hal as hal;
#[macro_use]
extern crate cortex_m_rt;
extern crate panic_abort;
extern crate ssd1322_framebuffer;

use cortex_m::asm;
use cortex_m_rt::ExceptionFrame;
use hal::prelude::*;
use hal::spi;
use ssd1322_framebuffer as oled;

entry!(main);

exception!(*, default_handler);
exception!(HardFault, hard_fault);

fn hard_fault(_ef: &ExceptionFrame) -> ! {
    asm::bkpt();
    loop {}
}

fn default_handler(_irqn: i16) {
    loop {}
}

// The whole 256x64 raster at 4 bits per pixel.
static mut FRAME: [u8; 8192] = [0; 8192];

fn main() -> ! {
    // Get peripherals and set up RCC.
    let cp = cortex_m::Peripherals::take().unwrap();
    let dp = stm32f30x::Peripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze(&mut flash.acr);
    let mut delay = hal::delay::Delay::new(cp.SYST, clocks);

    let mut gpioa = dp.GPIOA.split(&mut rcc.ahb);

    // Set up SPI1, which is Alternate Function 5 for GPIOs PA5,6,7.
    let disp_sck = gpioa.pa5.into_af5(&mut gpioa.moder, &mut gpioa.afrl);
    let disp_miso = gpioa.pa6.into_af5(&mut gpioa.moder, &mut gpioa.afrl);
    let disp_mosi = gpioa.pa7.into_af5(&mut gpioa.moder, &mut gpioa.afrl);

    let disp_spi = spi::Spi::spi1(
        dp.SPI1,
        (disp_sck, disp_miso, disp_mosi),
        hal_api::spi::Mode {
            polarity: hal_api::spi::Polarity::IdleLow,
            phase: hal_api::spi::Phase::CaptureOnFirstTransition,
        },
        8.mhz(),
        clocks,
        &mut rcc.apb2,
    );

    // PA8 will be the D/C push-pull output for the 4th wire.
    let disp_dc = gpioa
        .pa8
        .into_push_pull_output(&mut gpioa.moder, &mut gpioa.otyper);

    // PA9 is the display's /RESET pin, which the driver does not control.
    let mut disp_rst = gpioa
        .pa9
        .into_push_pull_output(&mut gpioa.moder, &mut gpioa.otyper);

    #[allow(unsafe_code)]
    let frame = unsafe { &mut FRAME };
    let framebuffer = oled::Framebuffer::new(&mut frame[..], 256, 64, oled::PixelDepth::Gray4)
        .unwrap();
    let mut disp = oled::Display::new(
        oled::SpiInterface::new(disp_spi, disp_dc),
        framebuffer,
        oled::Config::nhd_3_12_25664(),
    )
    .unwrap();

    // Assert the display's /RESET for 10ms.
    disp_rst.set_low();
    delay.delay_ms(10_u16);
    disp_rst.set_high();

    // Send the NHD register sequence and flush a blank frame.
    disp.init().unwrap();

    // Draw a horizontal gradient and show it.
    for x in 0..256 {
        for y in 0..64 {
            disp.set_pixel(x, y, x as u8);
        }
    }
    disp.flush().unwrap();

    loop {
        asm::wfi();
    }
}
