//! The SSD1306 OLED status display.

use embassy_stm32::{
    i2c::{I2c, Master},
    mode::Blocking,
};
use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_6X8},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use solenoise_lib::io::{Fill, Screen};
use ssd1306::{Ssd1306, mode::BufferedGraphicsMode, prelude::*};

type OledDisplay = Ssd1306<
    I2CInterface<I2c<'static, Blocking, Master>>,
    DisplaySize128x32,
    BufferedGraphicsMode<DisplaySize128x32>,
>;

/// Error reported by the display driver, usually a failed bus transfer.
pub type OledError = <OledDisplay as DrawTarget>::Error;

/// A 128x32 panel on I2C, drawn into a frame buffer which is only sent on [`present`][Screen::present].
pub struct Oled {
    display: OledDisplay,
    cursor: Point,
}

impl Oled {
    pub fn new(display: OledDisplay) -> Self {
        Self {
            display,
            cursor: Point::zero(),
        }
    }
}

impl Screen for Oled {
    type Error = OledError;

    fn clear(&mut self) -> Result<(), OledError> {
        self.display.clear_buffer();
        self.cursor = Point::zero();
        Ok(())
    }

    fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = Point::new(x, y);
    }

    fn print(&mut self, text: &str) -> Result<(), OledError> {
        let style = MonoTextStyle::new(&FONT_6X8, BinaryColor::On);
        self.cursor =
            Text::with_baseline(text, self.cursor, style, Baseline::Top).draw(&mut self.display)?;
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rectangle, fill: Fill) -> Result<(), OledError> {
        let style = match fill {
            Fill::Outline => PrimitiveStyle::with_stroke(BinaryColor::On, 1),
            Fill::Solid => PrimitiveStyle::with_fill(BinaryColor::On),
        };
        rect.into_styled(style).draw(&mut self.display)
    }

    fn present(&mut self) -> Result<(), OledError> {
        self.display.flush()
    }
}
