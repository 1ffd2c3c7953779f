//! CAN controller driver for an SJA1000-compatible part.
//!
//! The controller exposes one byte-wide register window whose upper half
//! changes meaning with the operating mode: in reset mode it holds the
//! acceptance filter, in normal operation the transmit buffer. The driver
//! owns that mode state machine. All configuration happens in reset mode;
//! leaving reset is a one-way gate, after which only the transmit handshake
//! is exercised.

use bitflags::bitflags;

use crate::error::{BeaconError, Result};
use crate::types::{CanId, Config, Frame, RegisterBus, MAX_STANDARD_ID};

// Register offsets
pub const REG_MODE: u8 = 0x00;
pub const REG_COMMAND: u8 = 0x01;
pub const REG_STATUS: u8 = 0x02;
pub const REG_INTERRUPT: u8 = 0x03;
pub const REG_INTERRUPT_ENABLE: u8 = 0x04;
pub const REG_BUS_TIMING_0: u8 = 0x06;
pub const REG_BUS_TIMING_1: u8 = 0x07;
pub const REG_OUTPUT_CONTROL: u8 = 0x08;
pub const REG_CLOCK_DIVIDER: u8 = 0x1F;

// Acceptance filter window, addressable in reset mode
pub const REG_ACCEPTANCE_CODE: [u8; 4] = [0x10, 0x11, 0x12, 0x13];
pub const REG_ACCEPTANCE_MASK: [u8; 4] = [0x14, 0x15, 0x16, 0x17];

// Transmit buffer window, addressable in normal operation (overlays the
// acceptance filter offsets)
pub const REG_TX_FRAME_INFO: u8 = 0x10;
pub const REG_TX_ID_1: u8 = 0x11;
pub const REG_TX_ID_2: u8 = 0x12;
pub const REG_TX_DATA: u8 = 0x13; // first of eight data registers

bitflags! {
    /// Mode register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModeFlags: u8 {
        const RESET = 0x01;
    }
}

bitflags! {
    /// Command register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommandFlags: u8 {
        const TRANSMIT_REQUEST = 0x01;
    }
}

bitflags! {
    /// Status register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const TRANSMIT_BUFFER_FREE = 0x04;
    }
}

/// Clock divider value selecting the enhanced (PeliCAN) register layout
pub const CLOCK_DIVIDER_PELICAN: u8 = 0x80;

/// Transmit buffer capacity in bytes
pub const MAX_FRAME_DATA: usize = 8;

/// Controller configuration, applied in reset mode during bring-up
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub clock_divider: u8,
    pub acceptance_code: [u8; 4],
    pub acceptance_mask: [u8; 4],
    pub bus_timing_0: u8,
    pub bus_timing_1: u8,
    pub interrupt_enable: u8,
}

impl Config for ControllerConfig {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Default for ControllerConfig {
    /// PeliCAN layout, accept-all filter, all interrupts masked.
    ///
    /// The zeroed bus timing matches the simulated peripheral only. Real
    /// silicon needs BTR values computed from the target bit rate and the
    /// peripheral clock; inject them through this config.
    fn default() -> Self {
        Self {
            clock_divider: CLOCK_DIVIDER_PELICAN,
            acceptance_code: [0x00; 4],
            acceptance_mask: [0xFF; 4],
            bus_timing_0: 0x00,
            bus_timing_1: 0x00,
            interrupt_enable: 0x00,
        }
    }
}

/// Controller operating mode
///
/// The part wakes in reset mode. Configuration registers are writable only
/// in `Reset`; the transition to `Operational` happens once and is never
/// reversed in this design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerMode {
    Reset,
    Operational,
}

/// CAN controller driver over an injected register bus
pub struct CanController<B: RegisterBus> {
    config: ControllerConfig,
    bus: B,
    mode: ControllerMode,
}

impl<B: RegisterBus> CanController<B> {
    pub fn with_bus(config: ControllerConfig, bus: B) -> Self {
        Self {
            config,
            bus,
            mode: ControllerMode::Reset,
        }
    }

    /// Full bring-up: reset entry, configuration in the required order,
    /// reset exit into normal operation
    pub fn open(&mut self) -> Result<()> {
        if self.mode == ControllerMode::Operational {
            return Ok(());
        }

        self.config.validate()?;
        self.enter_reset()?;
        self.set_clock_divider()?;
        self.set_acceptance_filter()?;
        self.set_bus_timing()?;
        self.set_interrupt_enable()?;
        self.leave_reset()
    }

    /// Commands reset mode. Rejected once operational: leaving reset is a
    /// one-way gate in this design.
    pub fn enter_reset(&mut self) -> Result<()> {
        if self.mode == ControllerMode::Operational {
            return Err(BeaconError::InvalidMode);
        }
        self.bus.write(REG_MODE, ModeFlags::RESET.bits());
        Ok(())
    }

    pub fn set_clock_divider(&mut self) -> Result<()> {
        self.check_reset()?;
        self.bus.write(REG_CLOCK_DIVIDER, self.config.clock_divider);
        Ok(())
    }

    /// Writes the acceptance code and mask bytes. The default configuration
    /// (code 0x00, mask 0xFF) accepts every identifier.
    pub fn set_acceptance_filter(&mut self) -> Result<()> {
        self.check_reset()?;
        for (offset, value) in REG_ACCEPTANCE_CODE.iter().zip(self.config.acceptance_code) {
            self.bus.write(*offset, value);
        }
        for (offset, value) in REG_ACCEPTANCE_MASK.iter().zip(self.config.acceptance_mask) {
            self.bus.write(*offset, value);
        }
        Ok(())
    }

    pub fn set_bus_timing(&mut self) -> Result<()> {
        self.check_reset()?;
        self.bus.write(REG_BUS_TIMING_0, self.config.bus_timing_0);
        self.bus.write(REG_BUS_TIMING_1, self.config.bus_timing_1);
        Ok(())
    }

    pub fn set_interrupt_enable(&mut self) -> Result<()> {
        self.check_reset()?;
        self.bus
            .write(REG_INTERRUPT_ENABLE, self.config.interrupt_enable);
        Ok(())
    }

    /// Clears the reset bit, entering normal operation
    pub fn leave_reset(&mut self) -> Result<()> {
        if self.mode == ControllerMode::Operational {
            return Ok(());
        }
        self.bus.write(REG_MODE, 0x00);
        self.mode = ControllerMode::Operational;
        Ok(())
    }

    /// Queues one frame for transmission.
    ///
    /// Spin-waits until the controller releases the transmit buffer, loads
    /// the frame registers and pulses the transmit request. Fire and forget:
    /// transmit completion is never awaited, so arbitration loss or a
    /// missing acknowledgement is invisible to this layer.
    pub fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.mode != ControllerMode::Operational {
            return Err(BeaconError::NotInitialized);
        }
        if frame.id > MAX_STANDARD_ID || frame.data.len() > MAX_FRAME_DATA {
            return Err(BeaconError::InvalidParameter);
        }

        // Unbounded wait: a stalled controller hangs the node rather than
        // dropping the frame
        while !StatusFlags::from_bits_truncate(self.bus.read(REG_STATUS))
            .contains(StatusFlags::TRANSMIT_BUFFER_FREE)
        {}

        self.bus.write(REG_TX_FRAME_INFO, frame.frame_info());
        let (id1, id2) = encode_standard_id(frame.id);
        self.bus.write(REG_TX_ID_1, id1);
        self.bus.write(REG_TX_ID_2, id2);
        for (i, byte) in frame.data.iter().enumerate() {
            self.bus.write(REG_TX_DATA + i as u8, *byte);
        }

        self.bus
            .write(REG_COMMAND, CommandFlags::TRANSMIT_REQUEST.bits());
        Ok(())
    }

    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    fn check_reset(&self) -> Result<()> {
        if self.mode != ControllerMode::Reset {
            return Err(BeaconError::InvalidMode);
        }
        Ok(())
    }
}

// Helper functions

/// Splits an 11-bit identifier across the two ID registers: bits 10..3 into
/// ID1, bits 2..0 into the top three bits of ID2
pub fn encode_standard_id(id: CanId) -> (u8, u8) {
    (((id >> 3) & 0xFF) as u8, ((id << 5) & 0xE0) as u8)
}
