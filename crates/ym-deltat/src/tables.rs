//! Delta-T Hardware Constants
//!
//! Fixed-point widths, saturation limits and the lookup tables shared by the
//! register file and the ADPCM decoder. Everything here is immutable.

/// Fractional bits of the playback phase accumulator
pub const DELTAT_SHIFT: u32 = 16;

/// One whole decode step in phase accumulator units
pub const STEP_UNIT: u32 = 1 << DELTAT_SHIFT;

/// Largest adaptive step size
pub const DELTA_MAX: i32 = 24576;
/// Smallest adaptive step size
pub const DELTA_MIN: i32 = 127;
/// Step size after start, repeat and reset
pub const DELTA_DEFAULT: i32 = 127;

/// Symmetric decode range of the predictor
pub const DECODE_RANGE: i32 = 32768;
/// Lowest predictor value
pub const DECODE_MIN: i32 = -DECODE_RANGE;
/// Highest predictor value
pub const DECODE_MAX: i32 = DECODE_RANGE - 1;

/// The address counter is 24 bits wide, plus one bit for the nibble select
pub const ADDRESS_MASK: u32 = (1 << (24 + 1)) - 1;

/// Forecast multiplier per nibble, in eighths (1/8, 3/8 ... 15/8, sign in bit 3)
pub const DECODE_TABLE_B1: [i32; 16] = [
    1, 3, 5, 7, 9, 11, 13, 15, //
    -1, -3, -5, -7, -9, -11, -13, -15,
];

/// Step size multiplier per nibble, in 64ths (0.9, 0.9, 0.9, 0.9, 1.2, 1.6, 2.0, 2.4)
pub const DECODE_TABLE_B2: [i32; 16] = [
    57, 57, 57, 57, 77, 102, 128, 153, //
    57, 57, 57, 57, 77, 102, 128, 153,
];

/// Address shift removed per memory type (control 2 bits 0-1).
///
/// 0: DRAM x1, 1: ROM, 2: DRAM x8, 3: ROM (not allowed by the manual)
pub const DRAM_RIGHT_SHIFT: [u8; 4] = [3, 0, 0, 0];

/// Shift removed from the chip's address granularity for a memory type
#[inline]
pub fn dram_shift(memory_type: u8) -> u8 {
    DRAM_RIGHT_SHIFT[(memory_type & 0x03) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_table_is_antisymmetric() {
        for i in 0..8 {
            assert_eq!(DECODE_TABLE_B1[i], -DECODE_TABLE_B1[i + 8]);
            assert_eq!(DECODE_TABLE_B1[i], 2 * i as i32 + 1);
        }
    }

    #[test]
    fn test_step_table_ignores_sign_bit() {
        for i in 0..8 {
            assert_eq!(DECODE_TABLE_B2[i], DECODE_TABLE_B2[i + 8]);
        }
        // Small magnitudes shrink the step, large ones grow it
        assert!(DECODE_TABLE_B2[..4].iter().all(|&m| m < 64));
        assert!(DECODE_TABLE_B2[5..8].iter().all(|&m| m > 64));
    }

    #[test]
    fn test_dram_shift_masks_memory_type() {
        assert_eq!(dram_shift(0), 3);
        assert_eq!(dram_shift(1), 0);
        assert_eq!(dram_shift(2), 0);
        assert_eq!(dram_shift(3), 0);
        assert_eq!(dram_shift(0xFC), 3);
    }

    #[test]
    fn test_limits_are_ordered() {
        assert!(DELTA_MIN <= DELTA_DEFAULT && DELTA_DEFAULT <= DELTA_MAX);
        assert_eq!(DECODE_MIN, i16::MIN as i32);
        assert_eq!(DECODE_MAX, i16::MAX as i32);
    }
}
