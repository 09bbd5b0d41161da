//! Unit configuration and host chip presets
//!
//! The same Delta-T block sits in several chips that differ in address
//! granularity, output scale, prescaler and which status bits they expose.

use serde::{Deserialize, Serialize};

use crate::tables::DRAM_RIGHT_SHIFT;
use crate::{DeltaTError, Result};

/// Host chips that carry a Delta-T unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChipVariant {
    /// OPNA
    Ym2608,
    /// OPNB (ADPCM-B channel)
    Ym2610,
    /// MSX-AUDIO
    Y8950,
}

impl ChipVariant {
    /// Master clock divider between chip clock and native output rate
    pub fn prescaler(&self) -> u32 {
        match self {
            ChipVariant::Ym2608 | ChipVariant::Ym2610 => 144,
            ChipVariant::Y8950 => 72,
        }
    }

    /// Parse a chip name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ym2608" | "opna" => Some(ChipVariant::Ym2608),
            "ym2610" | "ym2610b" | "opnb" => Some(ChipVariant::Ym2610),
            "y8950" | "msx-audio" => Some(ChipVariant::Y8950),
            _ => None,
        }
    }
}

/// How register writes are filtered before decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EmulationMode {
    /// All control bits behave as written
    #[default]
    Normal,
    /// ROM-only chip: MEMDATA and ROM are forced on, REC is forced off
    Ym2610,
}

/// Status register bits the host assigns to the unit's flags.
///
/// A zero mask means the host has no such bit and the notification is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatusBits {
    /// Buffer ready
    pub brdy: u8,
    /// End of sample
    pub eos: u8,
}

/// Delta-T unit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaTConfig {
    /// Register filtering mode
    pub emulation_mode: EmulationMode,
    /// Address register granularity in bits (8 for YM2610, 5 for YM2608/Y8950)
    pub port_shift: u8,
    /// Host clock / (output rate * prescaler)
    pub freq_base: f64,
    /// Full-scale output range used to derive the volume multiplier
    pub output_range: i32,
    /// Status bits reported through the bus
    pub status_bits: StatusBits,
    /// Chip index passed back with every bus callback
    pub chip_index: u8,
}

impl DeltaTConfig {
    /// Preset for a host chip running at `clock` Hz, rendered at `sample_rate` Hz
    pub fn for_chip(variant: ChipVariant, clock: u32, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(DeltaTError::InvalidConfig(
                "sample rate must be non-zero".to_string(),
            ));
        }
        let freq_base = clock as f64 / sample_rate as f64 / variant.prescaler() as f64;

        let config = match variant {
            ChipVariant::Ym2608 => Self {
                emulation_mode: EmulationMode::Normal,
                port_shift: 5,
                freq_base,
                output_range: 1 << 23,
                status_bits: StatusBits {
                    brdy: 0x08,
                    eos: 0x04,
                },
                chip_index: 0,
            },
            ChipVariant::Ym2610 => Self {
                emulation_mode: EmulationMode::Ym2610,
                port_shift: 8,
                freq_base,
                output_range: 1 << 23,
                status_bits: StatusBits { brdy: 0, eos: 0x80 },
                chip_index: 0,
            },
            ChipVariant::Y8950 => Self {
                emulation_mode: EmulationMode::Normal,
                port_shift: 5,
                freq_base,
                output_range: 1 << 18,
                status_bits: StatusBits {
                    brdy: 0x08,
                    eos: 0x10,
                },
                chip_index: 0,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Same configuration, reporting as another chip index
    pub fn with_chip_index(mut self, chip_index: u8) -> Self {
        self.chip_index = chip_index;
        self
    }

    /// Check that the configuration can drive the unit
    pub fn validate(&self) -> Result<()> {
        let max_dram_shift = DRAM_RIGHT_SHIFT.iter().copied().max().unwrap_or(0);
        if self.port_shift < max_dram_shift || self.port_shift > 16 {
            return Err(DeltaTError::InvalidConfig(format!(
                "port shift {} outside {}..=16",
                self.port_shift, max_dram_shift
            )));
        }
        if !self.freq_base.is_finite() || self.freq_base < 0.0 {
            return Err(DeltaTError::InvalidConfig(format!(
                "frequency base {} is not a usable ratio",
                self.freq_base
            )));
        }
        if self.output_range < 256 {
            return Err(DeltaTError::InvalidConfig(format!(
                "output range {} below 256",
                self.output_range
            )));
        }
        Ok(())
    }
}

impl Default for DeltaTConfig {
    /// YM2608 rendered at its native rate (one DELTA-N unit per output sample)
    fn default() -> Self {
        Self {
            emulation_mode: EmulationMode::Normal,
            port_shift: 5,
            freq_base: 1.0,
            output_range: 1 << 23,
            status_bits: StatusBits {
                brdy: 0x08,
                eos: 0x04,
            },
            chip_index: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_valid() {
        assert!(DeltaTConfig::default().validate().is_ok());
    }

    #[test]
    fn test_native_rate_gives_unit_freq_base() {
        let cfg = DeltaTConfig::for_chip(ChipVariant::Ym2608, 7_987_200, 55_466).unwrap();
        assert_relative_eq!(cfg.freq_base, 1.0, epsilon = 1e-4);

        let cfg = DeltaTConfig::for_chip(ChipVariant::Y8950, 3_579_545, 49_716).unwrap();
        assert_relative_eq!(cfg.freq_base, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_ym2610_preset() {
        let cfg = DeltaTConfig::for_chip(ChipVariant::Ym2610, 8_000_000, 44_100).unwrap();
        assert_eq!(cfg.emulation_mode, EmulationMode::Ym2610);
        assert_eq!(cfg.port_shift, 8);
        assert_eq!(cfg.status_bits.brdy, 0);
        assert_eq!(cfg.status_bits.eos, 0x80);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let err = DeltaTConfig::for_chip(ChipVariant::Ym2608, 8_000_000, 0).unwrap_err();
        assert!(matches!(err, DeltaTError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut cfg = DeltaTConfig::default();
        cfg.port_shift = 2;
        assert!(cfg.validate().is_err());

        let mut cfg = DeltaTConfig::default();
        cfg.freq_base = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = DeltaTConfig::default();
        cfg.output_range = 255;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_chip_names() {
        assert_eq!(ChipVariant::from_name("YM2608"), Some(ChipVariant::Ym2608));
        assert_eq!(ChipVariant::from_name("opnb"), Some(ChipVariant::Ym2610));
        assert_eq!(ChipVariant::from_name("y8950"), Some(ChipVariant::Y8950));
        assert_eq!(ChipVariant::from_name("sn76489"), None);
    }

    #[test]
    fn test_config_json_round_trip() {
        let mut cfg = DeltaTConfig::for_chip(ChipVariant::Y8950, 3_579_545, 44_100)
            .unwrap()
            .with_chip_index(1);
        cfg.freq_base = 0.75;
        let json = serde_json::to_string(&cfg).unwrap();
        let back: DeltaTConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
