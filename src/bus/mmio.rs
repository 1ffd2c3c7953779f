use core::ptr::{read_volatile, write_volatile};

use crate::types::RegisterBus;

/// Memory-mapped register bus over a fixed base address
pub struct MmioBus {
    base: usize,
}

impl MmioBus {
    /// Creates a register bus for the device window at `base`
    ///
    /// # Safety
    /// The caller must ensure that `base` points to a valid device register
    /// window for the whole lifetime of the bus, and that no other code
    /// accesses the same window concurrently.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Physical base address of the register window
    pub fn base(&self) -> usize {
        self.base
    }
}

impl RegisterBus for MmioBus {
    fn read(&mut self, offset: u8) -> u8 {
        // Volatile: one load per call, never elided or reordered
        unsafe { read_volatile((self.base + offset as usize) as *const u8) }
    }

    fn write(&mut self, offset: u8, value: u8) {
        unsafe { write_volatile((self.base + offset as usize) as *mut u8, value) }
    }
}
