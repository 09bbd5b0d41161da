//! Offline rendering of ADPCM-B data to 16-bit PCM and WAV export

use std::path::Path;

use anyhow::{bail, Context, Result};
use ym_deltat::{ChipVariant, DeltaT, DeltaTConfig, SampleMemory};

/// Pan index for L+R, where the renderer reads its mono mix
const CENTRE: usize = 3;

/// Control 2: L+R output, ROM memory type
const CONTROL2_ROM: u8 = 0xC1;

/// Status mask the YM2608 and Y8950 presets use for BRDY
const BRDY: u8 = 0x08;

/// What to render and how
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Host chip preset
    pub chip: ChipVariant,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Playback rate register value
    pub delta_n: u16,
    /// Output level register value
    pub volume: u8,
    /// Feed bytes through the data register
    pub cpu_feed: bool,
    /// Play twice through the REPEAT bit
    pub repeat_once: bool,
}

/// Master clock the chip presets are rendered with
pub fn chip_clock(chip: ChipVariant) -> u32 {
    match chip {
        ChipVariant::Ym2608 => 7_987_200,
        ChipVariant::Ym2610 => 8_000_000,
        ChipVariant::Y8950 => 3_579_545,
    }
}

/// Render `data` to signed 16-bit mono samples
pub fn render(data: &[u8], config: &RenderConfig) -> Result<Vec<i16>> {
    if data.is_empty() {
        bail!("input contains no ADPCM data");
    }

    let unit_config =
        DeltaTConfig::for_chip(config.chip, chip_clock(config.chip), config.sample_rate)
            .context("Failed to configure the Delta-T unit")?;
    let scale = unit_config.output_range as i64;
    let step = ((config.delta_n as f64 * unit_config.freq_base) as u64).max(1);
    let mut unit = DeltaT::with_config(unit_config)?;

    let mut pcm = Vec::new();
    let mut emit = |unit: &mut DeltaT, bus: &mut SampleMemory| {
        let mut outputs = [0i32; 4];
        unit.calc(bus, &mut outputs);
        let sample = outputs[CENTRE] as i64 * 32768 / scale;
        pcm.push(sample.clamp(i16::MIN as i64, i16::MAX as i64) as i16);
    };

    // Upper bound on ticks: every nibble at the programmed rate, twice over
    let max_ticks = (data.len() as u64 * 2 + 4) * 65536 / step * 2 + 16;

    if config.cpu_feed {
        if config.chip == ChipVariant::Ym2610 {
            bail!("the YM2610 has no CPU data path; drop --cpu");
        }

        let mut bus = SampleMemory::ram(0);
        unit.reset(CENTRE, &mut bus);
        // L+R; the memory type is irrelevant without external memory
        program_common(&mut unit, &mut bus, config, 0xC0);
        unit.write(0x00, 0x80, &mut bus);

        let mut bytes = data.iter();
        let mut tail: Option<u32> = None;
        for _ in 0..max_ticks {
            if bus.status_set(BRDY) {
                match bytes.next() {
                    Some(&byte) => unit.write(0x08, byte, &mut bus),
                    // Last byte is now being decoded: play its two nibbles
                    None if tail.is_none() => tail = Some(unit.current_address() + 2),
                    None => {}
                }
            }
            if tail.is_some_and(|end| unit.current_address() >= end) {
                break;
            }
            emit(&mut unit, &mut bus);
        }
        unit.write(0x00, 0x01, &mut bus);
    } else {
        let mut bus = SampleMemory::rom(data.to_vec());
        unit.reset(CENTRE, &mut bus);

        let shift = unit.config().port_shift;
        let stop = (data.len() - 1) >> shift;
        if stop > 0xFFFF {
            bail!(
                "input of {} bytes exceeds the {} byte address space",
                data.len(),
                0x10000usize << shift
            );
        }

        program_common(&mut unit, &mut bus, config, CONTROL2_ROM);
        unit.write(0x02, 0x00, &mut bus);
        unit.write(0x03, 0x00, &mut bus);
        unit.write(0x04, stop as u8, &mut bus);
        unit.write(0x05, (stop >> 8) as u8, &mut bus);
        unit.write(0x00, if config.repeat_once { 0xB0 } else { 0xA0 }, &mut bus);

        let mut passes = 0;
        let mut previous = unit.current_address();
        for _ in 0..max_ticks {
            if !unit.pcm_busy() {
                break;
            }
            emit(&mut unit, &mut bus);

            let address = unit.current_address();
            if address < previous {
                passes += 1;
                if passes == 2 {
                    break;
                }
            }
            previous = address;
        }
    }

    Ok(pcm)
}

fn program_common(unit: &mut DeltaT, bus: &mut SampleMemory, config: &RenderConfig, control2: u8) {
    unit.write(0x01, control2, bus);
    unit.write(0x09, config.delta_n as u8, bus);
    unit.write(0x0A, (config.delta_n >> 8) as u8, bus);
    unit.write(0x0B, config.volume, bus);
}

/// Write samples to a mono 16-bit WAV file
pub fn write_wav_file(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file {}", path.display()))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .context("Failed to write sample")?;
    }

    writer.finalize().context("Failed to finalize WAV file")?;

    Ok(())
}
