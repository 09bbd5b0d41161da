//! Memory access path
//!
//! Two data sources feed the unit: external sample memory reached through
//! the host bus, and the single CPU data register ($08). This module holds
//! the cursor state for both and the register $08 transfer rules.

use crate::bus::DeltaTBus;
use crate::decoder::{AdpcmDecoder, Cursor, NibbleSource};
use crate::status::StatusLine;
use crate::tables::ADDRESS_MASK;

/// Dummy accesses the hardware needs before external memory data is valid
pub const DUMMY_READS: u8 = 2;

/// Byte address window into external memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressMap {
    /// First byte of the sample
    pub start: u32,
    /// Last byte of the sample (inclusive)
    pub end: u32,
    /// Cursor wraps to 0 here
    pub limit: u32,
}

impl Default for AddressMap {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            limit: u32::MAX,
        }
    }
}

/// Cursor and staging state shared by both data sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryPath {
    /// External memory window
    pub map: AddressMap,
    /// Nibble cursor and the byte in flight
    pub cursor: Cursor,
    /// Byte written by the CPU, waiting to be decoded
    pub cpu_data: u8,
    /// Dummy reads still owed after entering external memory mode
    pub dummy_reads: u8,
}

impl MemoryPath {
    /// Read one byte of external memory
    #[inline]
    pub fn read_external<B: DeltaTBus + ?Sized>(bus: &mut B, offset: u32) -> u8 {
        bus.read_byte(offset)
    }

    /// Write one byte of external memory
    #[inline]
    pub fn write_external<B: DeltaTBus + ?Sized>(bus: &mut B, chip: u8, offset: u32, value: u8) {
        bus.write_byte(chip, offset, value);
    }

    /// Point the cursor at the sample start and owe two dummy reads
    pub fn arm_external(&mut self) {
        self.cursor.address = self.map.start << 1;
        self.dummy_reads = DUMMY_READS;
    }

    /// CPU-fed data has no address; only the nibble phase matters
    pub fn arm_cpu(&mut self) {
        self.cursor.address = 0;
    }

    /// True once the cursor sits on the stop address
    #[inline]
    fn at_end(&self) -> bool {
        self.cursor.address == self.map.end << 1
    }

    #[inline]
    fn advance_byte(&mut self) {
        self.cursor.address = (self.cursor.address + 2) & ADDRESS_MASK;
    }

    /// Register $08 read in external memory read mode.
    ///
    /// The first two reads return 0 and park the cursor on the start address.
    pub fn read_data<B: DeltaTBus + ?Sized>(&mut self, bus: &mut B, status: &StatusLine) -> u8 {
        if self.dummy_reads > 0 {
            self.cursor.address = self.map.start << 1;
            self.dummy_reads -= 1;
            log::trace!("Delta-T dummy read, {} left", self.dummy_reads);
            return 0;
        }

        if self.at_end() {
            status.set_eos(bus);
            return 0;
        }

        let address = self.cursor.byte_address();
        let value = Self::read_external(bus, address);
        log::trace!("Delta-T memory read ${:06X} = ${:02X}", address, value);
        self.advance_byte();
        status.pulse_brdy(bus);
        value
    }

    /// Register $08 write in external memory write mode
    pub fn write_data<B: DeltaTBus + ?Sized>(
        &mut self,
        bus: &mut B,
        status: &StatusLine,
        value: u8,
    ) {
        if self.dummy_reads > 0 {
            self.cursor.address = self.map.start << 1;
            self.dummy_reads = 0;
        }

        if self.at_end() {
            status.set_eos(bus);
            return;
        }

        let address = self.cursor.byte_address();
        log::trace!("Delta-T memory write ${:06X} = ${:02X}", address, value);
        Self::write_external(bus, status.chip(), address, value);
        self.advance_byte();
        status.pulse_brdy(bus);
    }

    /// Register $08 write in CPU synthesis mode: the unit is now full
    pub fn latch_cpu<B: DeltaTBus + ?Sized>(
        &mut self,
        bus: &mut B,
        status: &StatusLine,
        value: u8,
    ) {
        self.cpu_data = value;
        status.clear_brdy(bus);
    }

    /// Split into the cursor and a source reading external memory
    pub fn external_source<'a, B: DeltaTBus>(
        &'a mut self,
        bus: &'a mut B,
        repeat: bool,
    ) -> (&'a mut Cursor, ExternalSource<'a, B>) {
        let source = ExternalSource {
            map: self.map,
            bus,
            repeat,
        };
        (&mut self.cursor, source)
    }

    /// Split into the cursor and a source fed from the CPU data register
    pub fn cpu_source<'a, B: DeltaTBus>(
        &'a mut self,
        bus: &'a mut B,
        status: StatusLine,
    ) -> (&'a mut Cursor, CpuSource<'a, B>) {
        let source = CpuSource {
            cpu_data: self.cpu_data,
            bus,
            status,
        };
        (&mut self.cursor, source)
    }
}

/// Nibbles from external memory, honouring limit, stop and repeat
pub struct ExternalSource<'a, B: DeltaTBus> {
    map: AddressMap,
    bus: &'a mut B,
    repeat: bool,
}

impl<B: DeltaTBus> NibbleSource for ExternalSource<'_, B> {
    fn start_byte(&mut self, cursor: &mut Cursor, decoder: &mut AdpcmDecoder) -> bool {
        if cursor.address == self.map.limit << 1 {
            cursor.address = 0;
        }

        if cursor.address == self.map.end << 1 {
            if !self.repeat {
                return false;
            }
            log::debug!("Delta-T repeat from ${:06X}", self.map.start);
            cursor.address = self.map.start << 1;
            decoder.restart();
        }

        cursor.current = MemoryPath::read_external(&mut *self.bus, cursor.byte_address());
        true
    }
}

/// Nibbles from the CPU data register; each consumed byte raises BRDY
pub struct CpuSource<'a, B: DeltaTBus> {
    cpu_data: u8,
    bus: &'a mut B,
    status: StatusLine,
}

impl<B: DeltaTBus> NibbleSource for CpuSource<'_, B> {
    fn start_byte(&mut self, _cursor: &mut Cursor, _decoder: &mut AdpcmDecoder) -> bool {
        // The byte was pulled in when the previous one finished
        true
    }

    fn finish_byte(&mut self, cursor: &mut Cursor) {
        cursor.current = self.cpu_data;
        self.status.set_brdy(&mut *self.bus);
    }
}
