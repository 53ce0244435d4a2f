//! Provides [`Scheduler`], the cooperative loop that ties the device together.
//!
//! Each [`tick`][Scheduler::tick] runs the same steps in the same order, and none of them ever waits:
//!
//! 1. drain MIDI, so that note-triggered pulses start as soon as possible;
//! 2. end the pulses which have run their course;
//! 3. sample the encoder, switch, gate and CV, and let a gate edge fire a channel;
//! 4. refresh the display if anything changed, or if it hasn't been refreshed in a while;
//! 5. drain MIDI again, as the refresh is by far the slowest step.
//!
//! All mutable state lives here and is lent to the components one call at a time, so the two producers of triggers
//! (MIDI and gate/CV) can never interleave within a tick.

use crate::{
    Change,
    configuration::Config,
    display::DisplayModel,
    elapsed,
    gate_cv::GateCvRouter,
    input::InputSampler,
    io::{Board, Level},
    midi::MidiEventRouter,
    pulse::{CHANNEL_COUNT, PulseTimerBank},
};
use embassy_time::{Duration, Instant};

/// Owner of all device state and driver of the main loop.
#[derive(Clone, Debug, PartialEq)]
pub struct Scheduler {
    pulses: PulseTimerBank,
    inputs: InputSampler,
    midi: MidiEventRouter,
    gate_cv: GateCvRouter,
    /// Changes not yet shown on the display; the "dirty flag".
    pending: Change,
    last_render: Option<Instant>,
    refresh_interval: Duration,
    /// Levels last written to the output lines, so that only changes are written.
    driven: [Level; CHANNEL_COUNT],
}

impl Scheduler {
    /// Constructs a [`Scheduler`] with every output low and the display due for its first refresh.
    ///
    /// The caller is expected to have driven every output low during bring-up.
    pub fn new(config: Config, now: Instant) -> Self {
        Self {
            pulses: PulseTimerBank::new(config.timing.pulse_duration()),
            inputs: InputSampler::new(config.encoder, config.timing.debounce_window(), now),
            midi: MidiEventRouter::new(config.note_window),
            gate_cv: config.gate_cv,
            pending: Change::none(),
            last_render: None,
            refresh_interval: config.timing.refresh_interval(),
            driven: [Level::Low; CHANNEL_COUNT],
        }
    }

    /// Runs the loop forever.
    pub fn run<B: Board>(&mut self, board: &mut B) -> ! {
        info!("Entering main loop");
        loop {
            self.tick(board);
        }
    }

    /// Runs one iteration of the loop.
    pub fn tick<B: Board>(&mut self, board: &mut B) {
        self.drain_midi(board);
        self.expire_pulses(board);
        self.sample_inputs(board);
        self.refresh_display(board);
        self.drain_midi(board);
    }

    fn drain_midi<B: Board>(&mut self, board: &mut B) {
        while let Some(event) = board.poll_midi() {
            let now = board.now();
            self.pending |= self.midi.handle(event, &mut self.pulses, now);
        }
        self.drive_outputs(board);
    }

    fn expire_pulses<B: Board>(&mut self, board: &mut B) {
        let now = board.now();
        self.pending |= self.pulses.tick(now);
        self.drive_outputs(board);
    }

    fn sample_inputs<B: Board>(&mut self, board: &mut B) {
        let frame = board.sample_inputs();
        let now = board.now();
        self.pending |= self.inputs.sample(&frame, now);
        self.pending |= self.gate_cv.route(self.inputs.gate_cv(), &mut self.pulses, now);
        self.drive_outputs(board);
    }

    fn refresh_display<B: Board>(&mut self, board: &mut B) {
        let now = board.now();
        let due = match self.last_render {
            Some(last) => elapsed(last, now) >= self.refresh_interval,
            None => true,
        };
        if self.pending.is_none() && !due {
            return;
        }

        let model = DisplayModel::snapshot(&self.inputs, self.midi.last(), &self.pulses);
        if model.render(board.screen()).is_err() {
            // retried at the next refresh
            warn!("Display refresh failed");
        }
        self.pending = Change::none();
        self.last_render = Some(now);
    }

    fn drive_outputs<B: Board>(&mut self, board: &mut B) {
        for (channel, driven) in self.driven.iter_mut().enumerate() {
            let level = Level::from(self.pulses.is_active(channel));
            if level != *driven {
                board.set_output(channel, level);
                *driven = level;
            }
        }
    }

    /// Returns `true` when the display is stale and will be refreshed on the next tick regardless of the interval.
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_none()
    }

    /// Getter.
    pub fn pulses(&self) -> &PulseTimerBank {
        &self.pulses
    }

    /// Getter.
    pub fn inputs(&self) -> &InputSampler {
        &self.inputs
    }

    /// Getter.
    pub fn midi(&self) -> &MidiEventRouter {
        &self.midi
    }

    /// Returns when the display was last refreshed, if ever.
    pub fn last_render(&self) -> Option<Instant> {
        self.last_render
    }
}
