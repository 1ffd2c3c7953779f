//! The beacon node: a single-threaded cooperative loop tying console
//! bring-up, controller bring-up, payload authentication, frame
//! transmission and the inter-frame delay together. There is no exit
//! condition; the node runs until external reset or power-cycle.

use crate::auth::FrameAuthenticator;
use crate::console::{Console, ConsoleConfig};
use crate::controller::{CanController, ControllerConfig};
use crate::error::{BeaconError, Result};
use crate::types::{CanId, Config, Delay, Frame, RegisterBus, MAX_STANDARD_ID};

/// Identifier broadcast by the beacon
pub const BEACON_FRAME_ID: CanId = 0x123;

/// Compiled-in 128-bit CMAC key
pub const BEACON_KEY: [u8; 16] = [
    0xAB, 0xAD, 0x1D, 0xEA, 0xAB, 0xAD, 0x1D, 0xEA, 0xAB, 0xAD, 0x1D, 0xEA, 0xAB, 0xAD, 0x1D,
    0xEA,
];

/// Busy-wait cycles between frames
pub const INTER_FRAME_DELAY_CYCLES: u32 = 5_000_000;

/// Diagnostic line echoed after each queued frame
pub const STATUS_LINE: &str = "Sent frame with signature\n";

/// Beacon configuration
#[derive(Debug, Clone)]
pub struct BeaconConfig {
    pub frame_id: CanId,
    pub key: [u8; 16],
    pub delay_cycles: u32,
}

impl Config for BeaconConfig {
    fn validate(&self) -> Result<()> {
        if self.frame_id > MAX_STANDARD_ID {
            return Err(BeaconError::InvalidParameter);
        }
        Ok(())
    }
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            frame_id: BEACON_FRAME_ID,
            key: BEACON_KEY,
            delay_cycles: INTER_FRAME_DELAY_CYCLES,
        }
    }
}

/// Busy-wait delay
pub struct SpinDelay;

impl Delay for SpinDelay {
    fn delay(&mut self, cycles: u32) {
        for _ in 0..cycles {
            std::hint::spin_loop();
        }
    }
}

/// Periodic authenticated-frame broadcaster
pub struct BeaconNode<B: RegisterBus, D: Delay> {
    config: BeaconConfig,
    controller: CanController<B>,
    console: Console<B>,
    authenticator: FrameAuthenticator,
    delay: D,
    counter: u32,
}

impl<B, D> BeaconNode<B, D>
where
    B: RegisterBus,
    D: Delay,
{
    pub fn new(config: BeaconConfig, controller_bus: B, console_bus: B, delay: D) -> Result<Self> {
        config.validate()?;
        let authenticator = FrameAuthenticator::new(&config.key)?;
        Ok(Self {
            controller: CanController::with_bus(ControllerConfig::default(), controller_bus),
            console: Console::with_bus(ConsoleConfig::default(), console_bus),
            authenticator,
            delay,
            counter: 0,
            config,
        })
    }

    /// Brings up the console, then drives the controller through its
    /// reset-mode configuration into normal operation
    pub fn open(&mut self) -> Result<()> {
        self.console.open()?;
        self.controller.open()
    }

    /// One pass: authenticate the current counter, queue the frame, echo
    /// the status line, advance the counter, burn the inter-frame delay
    pub fn run_once(&mut self) -> Result<()> {
        let payload = self.authenticator.build_payload(self.counter);
        let frame = Frame::new(self.config.frame_id, payload.to_vec());
        self.controller.send_frame(&frame)?;
        self.console.write_str(STATUS_LINE)?;

        // Wraps silently after 2^32 frames
        self.counter = self.counter.wrapping_add(1);
        self.delay.delay(self.config.delay_cycles);
        Ok(())
    }

    /// Runs forever. Returns only on error; the service has no exit
    /// condition of its own.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.run_once()?;
        }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn controller(&self) -> &CanController<B> {
        &self.controller
    }

    pub fn console(&self) -> &Console<B> {
        &self.console
    }
}
