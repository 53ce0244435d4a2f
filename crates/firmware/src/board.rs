//! The Nucleo-F767ZI's peripherals, behind the library's [`Board`] trait.

use crate::display::Oled;
use defmt::*;
use embassy_stm32::{
    adc::{Adc, AnyAdcChannel},
    gpio::{self, Input, Output},
    peripherals::{ADC1, TIM3},
    timer::qei::Qei,
    usart::BufferedUartRx,
};
use embassy_time::Instant;
use embedded_io::{Read, ReadReady};
use solenoise_lib::{
    io::{Board, InputFrame, Level},
    midi::{MidiStream, NoteEvent},
    pulse::CHANNEL_COUNT,
};

/// Quadrature encoder counted by a timer in encoder mode.
///
/// The timer's counter is only 16 bits wide, so the count is widened here by accumulating the (wrapping) difference
/// between reads.
pub struct Encoder {
    qei: Qei<'static, TIM3>,
    last_count: u16,
    position: i32,
}

impl Encoder {
    pub fn new(qei: Qei<'static, TIM3>) -> Self {
        let last_count = qei.count();
        Self {
            qei,
            last_count,
            position: 0,
        }
    }

    /// Returns the accumulated count since construction.
    ///
    /// Must be called at least once every 32,767 counts to keep the direction unambiguous, which the scheduler does
    /// many times over.
    pub fn position(&mut self) -> i32 {
        let count = self.qei.count();
        let delta = count.wrapping_sub(self.last_count) as i16;
        self.last_count = count;
        self.position = self.position.wrapping_add(i32::from(delta));
        self.position
    }
}

/// The development board and everything wired to it.
pub struct Nucleo {
    midi_rx: BufferedUartRx<'static>,
    midi: MidiStream,
    encoder: Encoder,
    switch: Input<'static>,
    gate: Input<'static>,
    adc: Adc<'static, ADC1>,
    cv: AnyAdcChannel<ADC1>,
    outputs: [Output<'static>; CHANNEL_COUNT],
    screen: Oled,
}

impl Nucleo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        midi_rx: BufferedUartRx<'static>,
        encoder: Encoder,
        switch: Input<'static>,
        gate: Input<'static>,
        adc: Adc<'static, ADC1>,
        cv: AnyAdcChannel<ADC1>,
        outputs: [Output<'static>; CHANNEL_COUNT],
        screen: Oled,
    ) -> Self {
        Self {
            midi_rx,
            midi: MidiStream::new(),
            encoder,
            switch,
            gate,
            adc,
            cv,
            outputs,
            screen,
        }
    }
}

impl Board for Nucleo {
    type Screen = Oled;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn poll_midi(&mut self) -> Option<NoteEvent> {
        let mut byte = [0; 1];
        loop {
            // never block: only read what the interrupt handler has already buffered
            match self.midi_rx.read_ready() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    warn!("MIDI receive error: {}", e);
                    return None;
                }
            }
            match self.midi_rx.read(&mut byte) {
                Ok(0) => return None,
                Ok(_) => {
                    if let Some(event) = self.midi.push(byte[0]) {
                        return Some(event);
                    }
                }
                Err(e) => {
                    warn!("MIDI receive error: {}", e);
                    return None;
                }
            }
        }
    }

    fn sample_inputs(&mut self) -> InputFrame {
        InputFrame {
            encoder_position: self.encoder.position(),
            switch: level(self.switch.get_level()),
            gate: level(self.gate.get_level()),
            cv_raw: self.adc.blocking_read(&mut self.cv),
        }
    }

    fn set_output(&mut self, channel: usize, level: Level) {
        let Some(output) = self.outputs.get_mut(channel) else {
            warn!("No output line for channel {}", channel);
            return;
        };
        output.set_level(match level {
            Level::High => gpio::Level::High,
            Level::Low => gpio::Level::Low,
        });
    }

    fn screen(&mut self) -> &mut Oled {
        &mut self.screen
    }
}

fn level(level: gpio::Level) -> Level {
    Level::from(level == gpio::Level::High)
}
