use bitflags::bitflags;

use crate::error::{BeaconError, Result};
use crate::types::{Config, RegisterBus};

// NS16550-compatible register offsets
pub const REG_RECEIVE_BUFFER: u8 = 0x00; // read
pub const REG_TRANSMIT_HOLDING: u8 = 0x00; // write
pub const REG_INTERRUPT_ENABLE: u8 = 0x04;
pub const REG_INTERRUPT_IDENTITY: u8 = 0x08; // read
pub const REG_FIFO_CONTROL: u8 = 0x08; // write
pub const REG_LINE_CONTROL: u8 = 0x0C;
pub const REG_MODEM_CONTROL: u8 = 0x10;
pub const REG_LINE_STATUS: u8 = 0x14;
pub const REG_MODEM_STATUS: u8 = 0x18;
pub const REG_SCRATCH: u8 = 0x1C;

// Line control: 8 data bits, no parity, 1 stop bit
pub const LINE_CONTROL_8N1: u8 = 0x03;

// FIFO control: enable FIFOs
pub const FIFO_CONTROL_ENABLE: u8 = 0x01;

bitflags! {
    /// Line status register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineStatus: u8 {
        const TRANSMIT_HOLDING_EMPTY = 0x20;
    }
}

bitflags! {
    /// Modem control register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModemControl: u8 {
        const DTR = 0x01;
        const RTS = 0x02;
    }
}

/// Console configuration
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub interrupt_enable: u8,
    pub fifo_control: u8,
    pub line_control: u8,
    pub modem_control: u8,
}

impl Config for ConsoleConfig {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            interrupt_enable: 0x00, // all interrupts masked, output is polled
            fifo_control: FIFO_CONTROL_ENABLE,
            line_control: LINE_CONTROL_8N1,
            modem_control: (ModemControl::DTR | ModemControl::RTS).bits(),
        }
    }
}

/// Blocking diagnostic console over an injected register bus
pub struct Console<B: RegisterBus> {
    config: ConsoleConfig,
    bus: B,
    is_open: bool,
}

impl<B: RegisterBus> Console<B> {
    pub fn with_bus(config: ConsoleConfig, bus: B) -> Self {
        Self {
            config,
            bus,
            is_open: false,
        }
    }

    /// Brings the console up: interrupt mask, FIFO control, line parameters,
    /// modem control lines, in that order
    pub fn open(&mut self) -> Result<()> {
        if self.is_open {
            return Ok(());
        }

        self.config.validate()?;
        self.bus
            .write(REG_INTERRUPT_ENABLE, self.config.interrupt_enable);
        self.bus.write(REG_FIFO_CONTROL, self.config.fifo_control);
        self.bus.write(REG_LINE_CONTROL, self.config.line_control);
        self.bus.write(REG_MODEM_CONTROL, self.config.modem_control);
        self.is_open = true;
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        self.is_open = false;
        Ok(())
    }

    /// Writes one byte, polling until the transmitter holding register is
    /// empty. The poll is unbounded: a stalled transmitter hangs the caller.
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        if !self.is_open {
            return Err(BeaconError::NotInitialized);
        }

        while !LineStatus::from_bits_truncate(self.bus.read(REG_LINE_STATUS))
            .contains(LineStatus::TRANSMIT_HOLDING_EMPTY)
        {}
        self.bus.write(REG_TRANSMIT_HOLDING, byte);
        Ok(())
    }

    /// Writes a string byte by byte
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        for byte in s.bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mock::{BusAccess, MockBus};

    fn ready_bus() -> MockBus {
        let mut bus = MockBus::new();
        bus.set_register(REG_LINE_STATUS, LineStatus::TRANSMIT_HOLDING_EMPTY.bits());
        bus
    }

    #[test]
    fn test_open_writes_configuration_in_order() {
        let mut console = Console::with_bus(ConsoleConfig::default(), MockBus::new());
        console.open().unwrap();

        assert_eq!(
            console.bus().log(),
            &[
                BusAccess::Write {
                    offset: REG_INTERRUPT_ENABLE,
                    value: 0x00
                },
                BusAccess::Write {
                    offset: REG_FIFO_CONTROL,
                    value: 0x01
                },
                BusAccess::Write {
                    offset: REG_LINE_CONTROL,
                    value: 0x03
                },
                BusAccess::Write {
                    offset: REG_MODEM_CONTROL,
                    value: 0x03
                },
            ]
        );
    }

    #[test]
    fn test_write_before_open_fails() {
        let mut console = Console::with_bus(ConsoleConfig::default(), ready_bus());
        let result = console.write_byte(b'x');
        assert!(matches!(result, Err(BeaconError::NotInitialized)));
    }

    #[test]
    fn test_write_byte_polls_line_status_first() {
        let mut console = Console::with_bus(ConsoleConfig::default(), ready_bus());
        console.open().unwrap();
        console.write_byte(b'A').unwrap();

        let log = console.bus().log();
        let n = log.len();
        assert_eq!(
            log[n - 2],
            BusAccess::Read {
                offset: REG_LINE_STATUS,
                value: 0x20
            }
        );
        assert_eq!(
            log[n - 1],
            BusAccess::Write {
                offset: REG_TRANSMIT_HOLDING,
                value: b'A'
            }
        );
    }

    #[test]
    fn test_write_byte_spins_until_holding_register_empty() {
        let mut bus = ready_bus();
        bus.hold_busy(REG_LINE_STATUS, LineStatus::TRANSMIT_HOLDING_EMPTY.bits(), 3);
        let mut console = Console::with_bus(ConsoleConfig::default(), bus);
        console.open().unwrap();
        console.write_byte(b'A').unwrap();

        let status_reads = console
            .bus()
            .log()
            .iter()
            .filter(|access| matches!(access, BusAccess::Read { offset, .. } if *offset == REG_LINE_STATUS))
            .count();
        assert_eq!(status_reads, 4); // three busy polls, then ready
    }

    #[test]
    fn test_write_str_emits_bytes_in_order() {
        let mut console = Console::with_bus(ConsoleConfig::default(), ready_bus());
        console.open().unwrap();
        console.write_str("ok\n").unwrap();

        assert_eq!(
            console.bus().writes_to(REG_TRANSMIT_HOLDING),
            vec![b'o', b'k', b'\n']
        );
    }
}
