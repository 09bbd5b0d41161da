//! Delta-T Register Definitions
//!
//! Defines the 16 registers ($00-$0F) of the ADPCM-B unit and the bit layout
//! of the two control registers. Register indices are relative to the unit;
//! the host chip maps them into its own address space.

use bitflags::bitflags;
use std::fmt;

/// Number of addressable Delta-T registers
pub const REGISTER_COUNT: usize = 16;

/// Delta-T Register Address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// START, REC, MEMDATA, REPEAT, SPOFF, -, -, RESET - $00
    Control1 = 0x00,
    /// L, R, -, -, SAMPLE, DA/AD, RAMTYPE, ROM - $01
    Control2 = 0x01,
    /// Start address (low byte) - $02
    StartLo = 0x02,
    /// Start address (high byte) - $03
    StartHi = 0x03,
    /// Stop address (low byte) - $04
    StopLo = 0x04,
    /// Stop address (high byte) - $05
    StopHi = 0x05,
    /// Prescaler (low byte), record sample rate - $06
    PrescaleLo = 0x06,
    /// Prescaler (high byte) - $07
    PrescaleHi = 0x07,
    /// ADPCM data - $08
    Data = 0x08,
    /// DELTA-N playback rate (low byte) - $09
    DeltaNLo = 0x09,
    /// DELTA-N playback rate (high byte) - $0A
    DeltaNHi = 0x0A,
    /// Output level (linear volume) - $0B
    Level = 0x0B,
    /// Limit address (low byte) - $0C
    LimitLo = 0x0C,
    /// Limit address (high byte) - $0D
    LimitHi = 0x0D,
    /// DAC data, stored only - $0E
    DacData = 0x0E,
    /// PCM data, stored only - $0F
    PcmData = 0x0F,
}

impl Register {
    /// Convert a raw register number to Register enum.
    ///
    /// Unlike the PSG port, indices past $0F do not wrap; they are rejected.
    pub fn from_addr(addr: u8) -> Option<Self> {
        match addr {
            0x00 => Some(Register::Control1),
            0x01 => Some(Register::Control2),
            0x02 => Some(Register::StartLo),
            0x03 => Some(Register::StartHi),
            0x04 => Some(Register::StopLo),
            0x05 => Some(Register::StopHi),
            0x06 => Some(Register::PrescaleLo),
            0x07 => Some(Register::PrescaleHi),
            0x08 => Some(Register::Data),
            0x09 => Some(Register::DeltaNLo),
            0x0A => Some(Register::DeltaNHi),
            0x0B => Some(Register::Level),
            0x0C => Some(Register::LimitLo),
            0x0D => Some(Register::LimitHi),
            0x0E => Some(Register::DacData),
            0x0F => Some(Register::PcmData),
            _ => None,
        }
    }

    /// Get the register address value
    pub fn addr(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Control1 => write!(f, "$00 (Control 1)"),
            Register::Control2 => write!(f, "$01 (Control 2)"),
            Register::StartLo => write!(f, "$02 (Start Address Low)"),
            Register::StartHi => write!(f, "$03 (Start Address High)"),
            Register::StopLo => write!(f, "$04 (Stop Address Low)"),
            Register::StopHi => write!(f, "$05 (Stop Address High)"),
            Register::PrescaleLo => write!(f, "$06 (Prescale Low)"),
            Register::PrescaleHi => write!(f, "$07 (Prescale High)"),
            Register::Data => write!(f, "$08 (ADPCM Data)"),
            Register::DeltaNLo => write!(f, "$09 (Delta-N Low)"),
            Register::DeltaNHi => write!(f, "$0A (Delta-N High)"),
            Register::Level => write!(f, "$0B (Output Level)"),
            Register::LimitLo => write!(f, "$0C (Limit Address Low)"),
            Register::LimitHi => write!(f, "$0D (Limit Address High)"),
            Register::DacData => write!(f, "$0E (DAC Data)"),
            Register::PcmData => write!(f, "$0F (PCM Data)"),
        }
    }
}

/// Raw register bank (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterBank {
    /// Register values $00-$0F
    pub registers: [u8; REGISTER_COUNT],
}

impl RegisterBank {
    /// Create a new register bank with all values set to 0
    pub fn new() -> Self {
        RegisterBank {
            registers: [0; REGISTER_COUNT],
        }
    }

    /// Read a register value, 0 for indices past $0F
    pub fn read(&self, addr: u8) -> u8 {
        self.registers.get(addr as usize).copied().unwrap_or(0)
    }

    /// Write a register value; indices past $0F are ignored
    pub fn write(&mut self, addr: u8, value: u8) {
        if let Some(slot) = self.registers.get_mut(addr as usize) {
            *slot = value;
        }
    }

    /// Combine a low/high register pair into a 16-bit value
    #[inline]
    pub fn word(&self, lo: Register, hi: Register) -> u32 {
        (self.read(hi.addr()) as u32) << 8 | self.read(lo.addr()) as u32
    }

    /// Get all registers as a slice
    pub fn as_slice(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}

bitflags! {
    /// Control register 1 ($00) bitflags
    ///
    /// | value | meaning                                              |
    /// |-------|------------------------------------------------------|
    /// | $80   | synthesis from CPU (register $08) to audio, DELTA-N rate |
    /// | $A0   | synthesis from external memory to audio, DELTA-N rate |
    /// | $C8   | analysis from audio to CPU, PRESCALE rate            |
    /// | $E8   | analysis from audio to external memory               |
    /// | $60   | external memory write through register $08           |
    /// | $20   | external memory read through register $08            |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlFlags: u8 {
        /// Start playback / recording
        const START = 0x80;
        /// 0 = synthesis, 1 = analysis
        const REC = 0x40;
        /// 0 = CPU-managed memory (register $08), 1 = external memory
        const MEMDATA = 0x20;
        /// Restart at the start address when the stop address is reached
        const REPEAT = 0x10;
        /// Speaker off while recording
        const SPOFF = 0x08;
        /// Stop everything and raise BRDY
        const RESET = 0x01;
    }
}

/// What the unit does with its data path, from control bits 5-7
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// No transfer in progress
    Idle,
    /// Register $08 reads walk external memory
    MemoryRead,
    /// Register $08 writes fill external memory
    MemoryWrite,
    /// Nibbles come from bytes the CPU writes to register $08
    SynthesisFromCpu,
    /// Nibbles come from external memory
    SynthesisFromMemory,
    /// Recording into register $08 (not emulated)
    AnalysisToCpu,
    /// Recording into external memory (not emulated)
    AnalysisToMemory,
}

impl ControlFlags {
    /// Keep only the bits the unit latches (SPOFF drives a pin, not state)
    pub fn from_register(value: u8) -> Self {
        ControlFlags::from_bits_truncate(value) - ControlFlags::SPOFF
    }

    /// Decode START/REC/MEMDATA into the active data path
    pub fn mode(&self) -> AccessMode {
        match self.bits() & 0xE0 {
            0x20 => AccessMode::MemoryRead,
            0x60 => AccessMode::MemoryWrite,
            0x80 => AccessMode::SynthesisFromCpu,
            0xA0 => AccessMode::SynthesisFromMemory,
            0xC0 => AccessMode::AnalysisToCpu,
            0xE0 => AccessMode::AnalysisToMemory,
            _ => AccessMode::Idle,
        }
    }

    /// True when the external memory path is selected
    pub fn uses_external_memory(&self) -> bool {
        self.contains(ControlFlags::MEMDATA)
    }
}

bitflags! {
    /// Control register 2 ($01) bitflags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Control2Flags: u8 {
        /// Left output enable
        const LEFT = 0x80;
        /// Right output enable
        const RIGHT = 0x40;
        /// Sample rate conversion
        const SAMPLE = 0x08;
        /// DA/AD conversion
        const DA_AD = 0x04;
        /// RAM type: 0 = x1 bit, 1 = x8 bit
        const RAMTYPE = 0x02;
        /// 1 = ROM, 0 = RAM
        const ROM = 0x01;
    }
}

impl Control2Flags {
    /// Create flags from a raw register value
    pub fn from_register(value: u8) -> Self {
        Control2Flags::from_bits_truncate(value)
    }

    /// Memory type selector: 0 DRAM x1, 1 ROM, 2 DRAM x8, 3 ROM
    pub fn memory_type(&self) -> u8 {
        self.bits() & 0x03
    }

    /// Output accumulator index selected by L/R
    pub fn pan(&self) -> usize {
        ((self.bits() >> 6) & 0x03) as usize
    }
}
