//! Save state snapshot
//!
//! Binary format (little-endian):
//!   [0..4]   Magic: "YMDT"
//!   [4]      Version: u8
//!   [5..21]  Register image $00-$0F
//!   [21..]   Runtime fields in declaration order
//!
//! The snapshot derives serde as well, so hosts that already serialize their
//! machine state can embed it directly.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::registers::REGISTER_COUNT;
use crate::{DeltaTError, Result};

const MAGIC: &[u8; 4] = b"YMDT";
const VERSION: u8 = 1;

/// Encoded size of a version 1 snapshot
pub const STATE_SIZE: usize = 4 + 1 + REGISTER_COUNT + 1 + 4 + 1 + 1 + 1 + 4 * 5 + 1;

/// Everything needed to resume a unit mid-sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeltaTState {
    /// Raw register image
    pub registers: [u8; REGISTER_COUNT],
    /// Latched control register 1 bits
    pub control: u8,
    /// Nibble cursor
    pub address: u32,
    /// Byte being decoded
    pub current_byte: u8,
    /// Byte waiting in the CPU data register
    pub cpu_data: u8,
    /// Dummy reads still owed
    pub dummy_reads: u8,
    /// Phase accumulator
    pub phase: u32,
    /// Current forecast
    pub predictor: i32,
    /// Forecast before the last step
    pub previous: i32,
    /// Adaptive step size
    pub step_size: i32,
    /// Last output sample
    pub output: i32,
    /// PCM BSY
    pub pcm_busy: bool,
}

struct StateWriter {
    buf: Vec<u8>,
}

impl StateWriter {
    fn new() -> Self {
        Self {
            buf: Vec::with_capacity(STATE_SIZE),
        }
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }
    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
    fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }
    fn write_bool(&mut self, v: bool) {
        self.buf.push(if v { 1 } else { 0 });
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

struct StateReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StateReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn read_u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }
    fn read_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }
    fn read_i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }
    fn read_bool(&mut self) -> bool {
        self.read_u8() != 0
    }
}

impl DeltaTState {
    /// Encode into the binary snapshot format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = StateWriter::new();
        w.write_bytes(MAGIC);
        w.write_u8(VERSION);
        w.write_bytes(&self.registers);
        w.write_u8(self.control);
        w.write_u32(self.address);
        w.write_u8(self.current_byte);
        w.write_u8(self.cpu_data);
        w.write_u8(self.dummy_reads);
        w.write_u32(self.phase);
        w.write_i32(self.predictor);
        w.write_i32(self.previous);
        w.write_i32(self.step_size);
        w.write_i32(self.output);
        w.write_bool(self.pcm_busy);
        w.into_bytes()
    }

    /// Decode a binary snapshot; trailing bytes are ignored
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < MAGIC.len() + 1 {
            return Err(DeltaTError::StateTruncated {
                expected: STATE_SIZE,
                actual: data.len(),
            });
        }
        if &data[..MAGIC.len()] != MAGIC {
            return Err(DeltaTError::BadStateMagic);
        }
        if data[MAGIC.len()] != VERSION {
            return Err(DeltaTError::UnsupportedStateVersion(data[MAGIC.len()]));
        }
        if data.len() < STATE_SIZE {
            return Err(DeltaTError::StateTruncated {
                expected: STATE_SIZE,
                actual: data.len(),
            });
        }

        let mut r = StateReader::new(&data[MAGIC.len() + 1..]);
        Ok(Self {
            registers: r.take(),
            control: r.read_u8(),
            address: r.read_u32(),
            current_byte: r.read_u8(),
            cpu_data: r.read_u8(),
            dummy_reads: r.read_u8(),
            phase: r.read_u32(),
            predictor: r.read_i32(),
            previous: r.read_i32(),
            step_size: r.read_i32(),
            output: r.read_i32(),
            pcm_busy: r.read_bool(),
        })
    }

    /// Write the binary snapshot to a stream
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read one binary snapshot from a stream
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut buf = Vec::with_capacity(STATE_SIZE);
        reader.take(STATE_SIZE as u64).read_to_end(&mut buf)?;
        Self::from_bytes(&buf)
    }
}
