//! Solenoise is [Embassy](https://embassy.dev)-based firmware for a trigger generator aimed at modular synthesizers
//! and solenoid-driven percussion. The firmware runs on the [Nucleo-F767ZI development
//! board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html), which is powered by an F7-series
//! STM32 microcontroller.
//!
//! Twelve outputs each fire a short pulse when the matching note (C2 through B2) arrives on the serial MIDI input, or
//! when the gate input goes active while the CV input selects that output. A rotary encoder with a push switch and a
//! 128x32 OLED round out the panel; the display shows the encoder, the CV, the last note and which outputs are firing.
//!
//! All of the timing logic lives in `solenoise_lib`; this crate wires it up to the peripherals.

#![no_std]
#![no_main]

mod board;
mod display;

use crate::{
    board::{Encoder, Nucleo},
    display::Oled,
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::{
    Config, bind_interrupts,
    adc::{Adc, AdcChannel, Resolution},
    gpio::{Input, Level, Output, Pull, Speed},
    i2c::{self, I2c},
    peripherals,
    time::Hertz,
    timer::qei::{Qei, QeiPin},
    usart::{self, BufferedUartRx},
};
use embassy_time::Instant;
use solenoise_lib::{configuration::Config as DeviceConfig, scheduler::Scheduler};
use ssd1306::{I2CDisplayInterface, Ssd1306, prelude::*};
use static_cell::StaticCell;

#[cfg(feature = "defmt-rtt")]
use defmt_rtt as _;
#[cfg(not(feature = "panic-probe"))]
use panic_halt as _;
#[cfg(feature = "panic-probe")]
use panic_probe as _;

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        USART2 => usart::BufferedInterruptHandler<peripherals::USART2>;
    }
);

/// Standard MIDI baud rate.
const MIDI_BAUD_RATE: u32 = 31_250;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Initializing Solenoise");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            divq: None,
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
    }
    let p = embassy_stm32::init(config);

    // every output starts low, before anything can trigger it
    let outputs = [
        Output::new(p.PE2, Level::Low, Speed::Low),
        Output::new(p.PE3, Level::Low, Speed::Low),
        Output::new(p.PE4, Level::Low, Speed::Low),
        Output::new(p.PE5, Level::Low, Speed::Low),
        Output::new(p.PE6, Level::Low, Speed::Low),
        Output::new(p.PE7, Level::Low, Speed::Low),
        Output::new(p.PE8, Level::Low, Speed::Low),
        Output::new(p.PE9, Level::Low, Speed::Low),
        Output::new(p.PE10, Level::Low, Speed::Low),
        Output::new(p.PE11, Level::Low, Speed::Low),
        Output::new(p.PE12, Level::Low, Speed::Low),
        Output::new(p.PE13, Level::Low, Speed::Low),
    ];

    // MIDI in is receive-only; nothing is ever sent back, so the TX pin is left free
    static MIDI_RX_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = MIDI_BAUD_RATE;
    let midi_rx = unwrap!(BufferedUartRx::new(
        p.USART2,
        Irqs,
        p.PD6,
        MIDI_RX_BUFFER.init([0; 64]),
        uart_config,
    ));

    // TIM3 counts the encoder's quadrature signal in hardware, so no step is lost between ticks
    let encoder = Encoder::new(Qei::new(p.TIM3, QeiPin::new(p.PC6), QeiPin::new(p.PC7)));
    let switch = Input::new(p.PF14, Pull::Up);

    let gate = Input::new(p.PF13, Pull::Up);
    let mut adc = Adc::new(p.ADC1);
    adc.set_resolution(Resolution::BITS10);
    let cv = p.PA3.degrade_adc();

    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = Hertz(400_000);
    let i2c = I2c::new_blocking(p.I2C1, p.PB8, p.PB9, i2c_config);
    let mut display = Ssd1306::new(
        I2CDisplayInterface::new(i2c),
        DisplaySize128x32,
        DisplayRotation::Rotate0,
    )
    .into_buffered_graphics_mode();
    unwrap!(display.init().map_err(|_| "Display should initialize"));

    let mut board = Nucleo::new(
        midi_rx,
        encoder,
        switch,
        gate,
        adc,
        cv,
        outputs,
        Oled::new(display),
    );

    let device_config = DeviceConfig::default();
    info!("Configuration: {}", device_config.timing);
    Scheduler::new(device_config, Instant::now()).run(&mut board)
}
