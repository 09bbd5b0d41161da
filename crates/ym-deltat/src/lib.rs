//! Yamaha Delta-T (ADPCM-B) Playback Unit
//!
//! An emulation of the ADPCM-B block shared by the YM2608 (OPNA), YM2610
//! (OPNB) and Y8950 (MSX-AUDIO). The unit decodes 4-bit adaptive
//! differential PCM from external sample memory or from bytes fed through
//! its data register, at a rate set by DELTA-N, and adds the result into the
//! host's output accumulators.
//!
//! # Features
//! - Register-exact control of start/stop/limit addresses, rate and level
//! - External memory playback with repeat and limit wrap-around
//! - CPU-fed playback with BRDY handshaking
//! - External memory read/write through the data register
//! - Per-chip presets for address granularity, output scale and status bits
//! - Save states in a compact binary format
//!
//! # Host boundary
//! The unit owns no memory and no status register. Sample reads and writes
//! and BRDY/EOS changes go through the [`DeltaTBus`] trait, passed to every
//! operation that needs it. [`SampleMemory`] is a ready-made host for tools
//! and tests.
//!
//! # Quick start
//! ```
//! use ym_deltat::{DeltaT, SampleMemory};
//!
//! let mut memory = SampleMemory::rom(vec![0x77; 64]);
//! let mut unit = DeltaT::new();
//!
//! unit.write(0x01, 0xC1, &mut memory); // L+R, ROM
//! unit.write(0x04, 0x01, &mut memory); // Stop address
//! unit.write(0x0A, 0x80, &mut memory); // DELTA-N: half the native rate
//! unit.write(0x0B, 0xFF, &mut memory); // Full level
//! unit.write(0x00, 0xA0, &mut memory); // Start from external memory
//!
//! let mut outputs = [0i32; 4];
//! for _ in 0..8 {
//!     unit.calc(&mut memory, &mut outputs);
//! }
//! assert!(outputs[3] > 0);
//! ```

#![warn(missing_docs)]

pub mod bus;
pub mod config;
pub mod decoder;
pub mod memory;
pub mod registers;
pub mod sample_memory;
pub mod state;
pub mod status;
pub mod tables;
pub mod unit;

/// Error types for Delta-T unit operations
#[derive(thiserror::Error, Debug)]
pub enum DeltaTError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Save state shorter than its format requires
    #[error("Save state truncated: expected {expected} bytes, got {actual}")]
    StateTruncated {
        /// Bytes the format needs
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Save state does not start with the expected magic
    #[error("Not a Delta-T save state")]
    BadStateMagic,

    /// Save state written by an unknown format version
    #[error("Unsupported save state version {0}")]
    UnsupportedStateVersion(u8),

    /// IO error while reading or writing a save state
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Delta-T operations
pub type Result<T> = std::result::Result<T, DeltaTError>;

pub use bus::DeltaTBus;
pub use config::{ChipVariant, DeltaTConfig, EmulationMode, StatusBits};
pub use decoder::decode_nibble;
pub use memory::AddressMap;
pub use registers::{AccessMode, Control2Flags, ControlFlags, Register, REGISTER_COUNT};
pub use sample_memory::SampleMemory;
pub use state::DeltaTState;
pub use unit::{DeltaT, OutputAccumulators};
