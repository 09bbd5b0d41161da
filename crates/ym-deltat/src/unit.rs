//! Delta-T ADPCM-B unit
//!
//! The register-driven playback block found in the YM2608, YM2610 and Y8950.
//! The host chip forwards register writes, calls [`DeltaT::calc`] once per
//! output sample and receives status changes through its [`DeltaTBus`].

use crate::bus::DeltaTBus;
use crate::config::{DeltaTConfig, EmulationMode};
use crate::decoder::{AdpcmDecoder, Tick};
use crate::memory::{AddressMap, MemoryPath, DUMMY_READS};
use crate::registers::{
    AccessMode, Control2Flags, ControlFlags, Register, RegisterBank, REGISTER_COUNT,
};
use crate::state::DeltaTState;
use crate::status::StatusLine;
use crate::tables::{
    dram_shift, ADDRESS_MASK, DECODE_MAX, DECODE_MIN, DECODE_RANGE, DELTA_MAX, DELTA_MIN,
    STEP_UNIT,
};
use crate::Result;

/// Host accumulators indexed by pan: 0 none, 1 right, 2 left, 3 centre
pub type OutputAccumulators = [i32; 4];

/// Control 2 value after reset: ROM selected
const CONTROL2_DEFAULT: u8 = 0x01;

/// Delta-T ADPCM-B playback unit
#[derive(Debug, Clone)]
pub struct DeltaT {
    config: DeltaTConfig,
    status: StatusLine,
    regs: RegisterBank,
    control: ControlFlags,
    control2: u8,
    dram_shift: u8,
    memory: MemoryPath,
    decoder: AdpcmDecoder,
    delta_n: u32,
    volume: i32,
    pan: usize,
    pcm_busy: bool,
}

impl DeltaT {
    /// Create a unit with the default (YM2608 native rate) configuration
    pub fn new() -> Self {
        Self::build(DeltaTConfig::default())
    }

    /// Create a unit for a specific host chip configuration
    pub fn with_config(config: DeltaTConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: DeltaTConfig) -> Self {
        let mut unit = Self {
            status: StatusLine::new(config.status_bits, config.chip_index),
            config,
            regs: RegisterBank::new(),
            control: ControlFlags::empty(),
            control2: 0,
            dram_shift: 0,
            memory: MemoryPath::default(),
            decoder: AdpcmDecoder::new(),
            delta_n: 0,
            volume: 0,
            pan: 0,
            pcm_busy: false,
        };
        unit.reset(0, &mut ());
        unit
    }

    /// Configuration the unit was built with
    pub fn config(&self) -> &DeltaTConfig {
        &self.config
    }

    /// Return to the idle power-on state and raise BRDY.
    ///
    /// The flag mask register hides BRDY after reset, but as soon as the host
    /// unmasks it the flag has to be there.
    pub fn reset<B: DeltaTBus + ?Sized>(&mut self, pan: usize, bus: &mut B) {
        self.memory = MemoryPath::default();
        self.decoder = AdpcmDecoder::new();
        self.delta_n = 0;
        self.volume = 0;
        self.pan = pan & 0x03;
        self.control = ControlFlags::MEMDATA;
        self.control2 = CONTROL2_DEFAULT;
        self.dram_shift = dram_shift(self.control2);
        self.pcm_busy = false;

        self.status.set_brdy(bus);
    }

    /// Write a Delta-T register ($00-$0F); other indices are ignored
    pub fn write<B: DeltaTBus + ?Sized>(&mut self, reg: u8, value: u8, bus: &mut B) {
        let Some(register) = Register::from_addr(reg) else {
            log::trace!("Delta-T write to ${:02X} out of range", reg);
            return;
        };
        log::trace!("Delta-T {} <- ${:02X}", register, value);

        self.regs.write(reg, value);

        match register {
            Register::Control1 => self.write_control1(value, bus),
            Register::Control2 => self.write_control2(value),
            Register::StartLo | Register::StartHi => self.update_start(),
            Register::StopLo | Register::StopHi => self.update_end(),
            // Record sample rate; analysis is not emulated
            Register::PrescaleLo | Register::PrescaleHi => {}
            Register::Data => self.write_data(value, bus),
            Register::DeltaNLo | Register::DeltaNHi => self.update_rate(),
            Register::Level => self.update_volume(value),
            Register::LimitLo | Register::LimitHi => self.update_limit(),
            Register::DacData | Register::PcmData => {}
        }
    }

    fn write_control1<B: DeltaTBus + ?Sized>(&mut self, value: u8, bus: &mut B) {
        let mut value = value;
        if self.config.emulation_mode == EmulationMode::Ym2610 {
            // External ROM only, no record bit
            value |= ControlFlags::MEMDATA.bits();
            value &= !ControlFlags::REC.bits();
        }
        self.control = ControlFlags::from_register(value);

        if self.control.contains(ControlFlags::START) {
            self.pcm_busy = true;
            self.decoder.start();
            self.memory.cursor.current = 0;
            self.memory.cpu_data = 0;
        }

        if self.control.uses_external_memory() {
            self.memory.arm_external();
        } else {
            self.memory.arm_cpu();
        }

        if self.control.contains(ControlFlags::START) {
            log::debug!(
                "Delta-T start {:?}: ${:06X}-${:06X}, rate {}",
                self.control.mode(),
                self.memory.map.start,
                self.memory.map.end,
                self.decoder.rate
            );
        }

        if self.control.contains(ControlFlags::RESET) {
            log::debug!("Delta-T reset bit");
            self.control = ControlFlags::empty();
            self.pcm_busy = false;
            self.status.set_brdy(bus);
        }
    }

    fn write_control2(&mut self, value: u8) {
        let mut value = value;
        if self.config.emulation_mode == EmulationMode::Ym2610 {
            value |= Control2Flags::ROM.bits();
        }

        let flags = Control2Flags::from_register(value);
        self.pan = flags.pan();

        if self.control2 & 0x03 != flags.memory_type() {
            let shift = dram_shift(flags.memory_type());
            if self.dram_shift != shift {
                log::debug!(
                    "Delta-T memory type {} (address shift {} -> {})",
                    flags.memory_type(),
                    self.address_shift(),
                    self.config.port_shift.saturating_sub(shift)
                );
                self.dram_shift = shift;
                self.update_start();
                self.update_end();
                self.update_limit();
            }
        }
        self.control2 = value;
    }

    fn write_data<B: DeltaTBus + ?Sized>(&mut self, value: u8, bus: &mut B) {
        match self.control.mode() {
            AccessMode::MemoryWrite => self.memory.write_data(bus, &self.status, value),
            AccessMode::SynthesisFromCpu => self.memory.latch_cpu(bus, &self.status, value),
            _ => {}
        }
    }

    /// Bits between a register address unit and a byte address
    #[inline]
    fn address_shift(&self) -> u32 {
        self.config.port_shift.saturating_sub(self.dram_shift) as u32
    }

    fn update_start(&mut self) {
        self.memory.map.start =
            self.regs.word(Register::StartLo, Register::StartHi) << self.address_shift();
    }

    fn update_end(&mut self) {
        let shift = self.address_shift();
        self.memory.map.end =
            (self.regs.word(Register::StopLo, Register::StopHi) << shift) + ((1 << shift) - 1);
    }

    fn update_limit(&mut self) {
        self.memory.map.limit =
            self.regs.word(Register::LimitLo, Register::LimitHi) << self.address_shift();
    }

    fn update_rate(&mut self) {
        self.delta_n = self.regs.word(Register::DeltaNLo, Register::DeltaNHi);
        self.decoder.rate = (self.delta_n as f64 * self.config.freq_base) as u32;
    }

    fn update_volume(&mut self, level: u8) {
        let old = self.volume;
        self.volume =
            (level as i64 * (self.config.output_range / 256) as i64 / DECODE_RANGE as i64) as i32;

        if old != 0 {
            // Keep the held sample continuous across the level change
            self.decoder.output =
                (self.decoder.output as f64 / old as f64 * self.volume as f64) as i32;
        }
    }

    /// Read the ADPCM data register ($08).
    ///
    /// Only external memory read mode ($20) returns data; the first two reads
    /// after entering it are dummies.
    pub fn read<B: DeltaTBus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        if self.control.mode() == AccessMode::MemoryRead {
            self.memory.read_data(bus, &self.status)
        } else {
            0
        }
    }

    /// Produce one output sample and add it to `outputs[pan]`
    pub fn calc<B: DeltaTBus>(&mut self, bus: &mut B, outputs: &mut OutputAccumulators) {
        match self.control.mode() {
            AccessMode::SynthesisFromMemory => {
                let repeat = self.control.contains(ControlFlags::REPEAT);
                let (cursor, mut source) = self.memory.external_source(bus, repeat);
                if self.decoder.advance(cursor, &mut source) == Tick::Ended {
                    self.end_of_sample(bus);
                    return;
                }
            }
            AccessMode::SynthesisFromCpu => {
                let (cursor, mut source) = self.memory.cpu_source(bus, self.status);
                // The CPU source never ends on its own
                self.decoder.advance(cursor, &mut source);
            }
            // Analysis (recording) is not emulated
            _ => return,
        }

        let sample = self.decoder.interpolate(self.volume);
        outputs[self.pan] = outputs[self.pan].wrapping_add(sample);
    }

    fn end_of_sample<B: DeltaTBus + ?Sized>(&mut self, bus: &mut B) {
        log::debug!("Delta-T end of sample at ${:06X}", self.memory.map.end);
        self.status.set_eos(bus);
        self.pcm_busy = false;
        self.control = ControlFlags::empty();
        self.decoder.stop();
    }

    /// Capture everything needed to resume playback later
    pub fn save_state(&self) -> DeltaTState {
        DeltaTState {
            registers: self.regs.registers,
            control: self.control.bits(),
            address: self.memory.cursor.address,
            current_byte: self.memory.cursor.current,
            cpu_data: self.memory.cpu_data,
            dummy_reads: self.memory.dummy_reads,
            phase: self.decoder.phase,
            predictor: self.decoder.predictor,
            previous: self.decoder.previous,
            step_size: self.decoder.step_size,
            output: self.decoder.output,
            pcm_busy: self.pcm_busy,
        }
    }

    /// Resume from a saved state.
    ///
    /// Runtime fields are taken as saved, clamped to their valid ranges;
    /// everything derived from registers is rebuilt by
    /// [`DeltaT::reload_registers`].
    pub fn restore_state<B: DeltaTBus + ?Sized>(&mut self, state: &DeltaTState, bus: &mut B) {
        log::debug!("Delta-T restore, control ${:02X}", state.control);

        self.control = ControlFlags::from_bits_truncate(state.control);
        self.memory.cursor.address = state.address & ADDRESS_MASK;
        self.memory.cursor.current = state.current_byte;
        self.memory.cpu_data = state.cpu_data;
        self.memory.dummy_reads = state.dummy_reads.min(DUMMY_READS);
        self.decoder.phase = state.phase & (STEP_UNIT - 1);
        self.decoder.predictor = state.predictor.clamp(DECODE_MIN, DECODE_MAX);
        self.decoder.previous = state.previous.clamp(DECODE_MIN, DECODE_MAX);
        self.decoder.step_size = state.step_size.clamp(DELTA_MIN, DELTA_MAX);
        self.decoder.output = state.output;
        self.pcm_busy = state.pcm_busy;

        self.reload_registers(&state.registers, bus);
    }

    /// Rebuild register-derived state from a raw register image.
    ///
    /// Registers $01-$0F are replayed through the normal write path with the
    /// control state parked, so $08 cannot start a transfer. Register $00 is
    /// stored without side effects. The held output sample survives because
    /// the volume is cleared before the level register is replayed.
    pub fn reload_registers<B: DeltaTBus + ?Sized>(
        &mut self,
        registers: &[u8; REGISTER_COUNT],
        bus: &mut B,
    ) {
        let control = self.control;
        self.control = ControlFlags::empty();
        self.volume = 0;

        for (reg, &value) in registers.iter().enumerate().skip(1) {
            self.write(reg as u8, value, bus);
        }

        self.control = control;
        self.regs.write(Register::Control1.addr(), registers[0]);

        if self.control.uses_external_memory() {
            self.memory.cursor.current =
                MemoryPath::read_external(bus, self.memory.cursor.byte_address());
        }
    }

    /// Read back a raw register value, 0 for indices past $0F
    pub fn read_register(&self, reg: u8) -> u8 {
        self.regs.read(reg)
    }

    /// Raw register image
    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        self.regs.as_slice()
    }

    /// PCM BSY: playback in progress
    pub fn pcm_busy(&self) -> bool {
        self.pcm_busy
    }

    /// Latched control register 1 bits
    pub fn control(&self) -> ControlFlags {
        self.control
    }

    /// Control register 2 as applied (after emulation mode filtering)
    pub fn control2(&self) -> u8 {
        self.control2
    }

    /// External memory window in byte addresses
    pub fn address_map(&self) -> AddressMap {
        self.memory.map
    }

    /// First byte of the sample
    pub fn start_address(&self) -> u32 {
        self.memory.map.start
    }

    /// Last byte of the sample (inclusive)
    pub fn end_address(&self) -> u32 {
        self.memory.map.end
    }

    /// Address at which the cursor wraps to 0
    pub fn limit_address(&self) -> u32 {
        self.memory.map.limit
    }

    /// Cursor in nibbles (byte address << 1 | low-nibble bit)
    pub fn current_address(&self) -> u32 {
        self.memory.cursor.address
    }

    /// Byte whose nibbles are being decoded
    pub fn current_byte(&self) -> u8 {
        self.memory.cursor.current
    }

    /// Byte waiting in the CPU data register
    pub fn cpu_data(&self) -> u8 {
        self.memory.cpu_data
    }

    /// Dummy reads still owed before external memory data is valid
    pub fn dummy_reads(&self) -> u8 {
        self.memory.dummy_reads
    }

    /// Raw DELTA-N value
    pub fn delta_n(&self) -> u32 {
        self.delta_n
    }

    /// Phase increment per output sample (16 fractional bits)
    pub fn step(&self) -> u32 {
        self.decoder.rate
    }

    /// Phase accumulator
    pub fn phase(&self) -> u32 {
        self.decoder.phase
    }

    /// Linear output multiplier
    pub fn volume(&self) -> i32 {
        self.volume
    }

    /// Index of the output accumulator the unit adds into
    pub fn pan(&self) -> usize {
        self.pan
    }

    /// Current decoded forecast
    pub fn predictor(&self) -> i32 {
        self.decoder.predictor
    }

    /// Forecast before the last decode step
    pub fn previous_predictor(&self) -> i32 {
        self.decoder.previous
    }

    /// Adaptive step size
    pub fn step_size(&self) -> i32 {
        self.decoder.step_size
    }

    /// Last sample added to the output
    pub fn output(&self) -> i32 {
        self.decoder.output
    }
}

impl Default for DeltaT {
    fn default() -> Self {
        Self::new()
    }
}
