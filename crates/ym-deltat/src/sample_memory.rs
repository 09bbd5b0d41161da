//! Byte-array sample memory with a status latch
//!
//! A complete [`DeltaTBus`] for hosts that just need somewhere to keep
//! ADPCM data: tests, tools, or chips whose status register is a plain byte.

use crate::bus::DeltaTBus;

/// External sample memory backed by a `Vec<u8>`
#[derive(Debug, Clone, Default)]
pub struct SampleMemory {
    data: Vec<u8>,
    read_only: bool,
    status: u8,
}

impl SampleMemory {
    /// Writable memory of `size` zeroed bytes
    pub fn ram(size: usize) -> Self {
        Self {
            data: vec![0; size],
            read_only: false,
            status: 0,
        }
    }

    /// Read-only memory holding `data`
    pub fn rom(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            read_only: true,
            status: 0,
        }
    }

    /// Memory contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when no bytes are mapped
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current status latch
    pub fn status(&self) -> u8 {
        self.status
    }

    /// True when every bit of `mask` is set in the status latch
    pub fn status_set(&self, mask: u8) -> bool {
        mask != 0 && self.status & mask == mask
    }

    /// Acknowledge status bits, as a host IRQ handler would
    pub fn clear_status(&mut self, mask: u8) {
        self.status &= !mask;
    }
}

impl DeltaTBus for SampleMemory {
    fn read_byte(&mut self, address: u32) -> u8 {
        self.data.get(address as usize).copied().unwrap_or(0)
    }

    fn write_byte(&mut self, _chip: u8, address: u32, value: u8) {
        if self.read_only {
            return;
        }
        if let Some(slot) = self.data.get_mut(address as usize) {
            *slot = value;
        }
    }

    fn set_status(&mut self, _chip: u8, mask: u8) {
        self.status |= mask;
    }

    fn reset_status(&mut self, _chip: u8, mask: u8) {
        self.status &= !mask;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_past_end_return_zero() {
        let mut mem = SampleMemory::rom(vec![0x12, 0x34]);
        assert_eq!(mem.read_byte(1), 0x34);
        assert_eq!(mem.read_byte(2), 0);
        assert_eq!(mem.read_byte(u32::MAX), 0);
    }

    #[test]
    fn test_rom_ignores_writes() {
        let mut mem = SampleMemory::rom(vec![0xAA]);
        mem.write_byte(0, 0, 0x55);
        assert_eq!(mem.data(), &[0xAA]);
    }

    #[test]
    fn test_ram_writes_within_bounds() {
        let mut mem = SampleMemory::ram(2);
        mem.write_byte(0, 1, 0x77);
        mem.write_byte(0, 2, 0x99);
        assert_eq!(mem.data(), &[0x00, 0x77]);
        assert_eq!(mem.len(), 2);
        assert!(!mem.is_empty());
    }

    #[test]
    fn test_status_latch() {
        let mut mem = SampleMemory::ram(0);
        mem.set_status(0, 0x08);
        mem.set_status(0, 0x04);
        assert!(mem.status_set(0x0C));
        mem.reset_status(0, 0x08);
        assert_eq!(mem.status(), 0x04);
        assert!(!mem.status_set(0));
        mem.clear_status(0x04);
        assert_eq!(mem.status(), 0);
    }
}
