//! ADPCM-B decode engine
//!
//! One adaptive differential decoder shared by both playback sources. The
//! source only decides where the next byte comes from; the forecast,
//! step adaptation, saturation and interpolation are defined here once.

use crate::tables::{
    ADDRESS_MASK, DECODE_MAX, DECODE_MIN, DECODE_TABLE_B1, DECODE_TABLE_B2, DELTAT_SHIFT,
    DELTA_DEFAULT, DELTA_MAX, DELTA_MIN, STEP_UNIT,
};

/// Apply one nibble to a predictor/step pair.
///
/// Inputs outside the decoder ranges are clamped first. Returns the new
/// `(predictor, step_size)`, each clamped to its range.
///
/// # Example
///
/// ```
/// use ym_deltat::decode_nibble;
///
/// let (predictor, step) = decode_nibble(0x7, 0, 127);
/// assert_eq!(predictor, 15 * 127 / 8);
/// assert_eq!(step, 127 * 153 / 64);
/// ```
#[inline]
pub fn decode_nibble(nibble: u8, predictor: i32, step_size: i32) -> (i32, i32) {
    let index = (nibble & 0x0F) as usize;
    let predictor = predictor.clamp(DECODE_MIN, DECODE_MAX);
    let step_size = step_size.clamp(DELTA_MIN, DELTA_MAX);

    // Forecast to next forecast
    let predictor =
        (predictor + DECODE_TABLE_B1[index] * step_size / 8).clamp(DECODE_MIN, DECODE_MAX);

    // Delta to next delta
    let step_size = (step_size * DECODE_TABLE_B2[index] / 64).clamp(DELTA_MIN, DELTA_MAX);

    (predictor, step_size)
}

/// Position in the nibble stream and the byte being consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Nibble address: byte address << 1, bit 0 selects the low nibble
    pub address: u32,
    /// Byte whose two nibbles are being decoded
    pub current: u8,
}

impl Cursor {
    /// Byte address of the cursor
    #[inline]
    pub fn byte_address(&self) -> u32 {
        self.address >> 1
    }

    /// Take the next nibble, high nibble first.
    ///
    /// Returns `None` when the source ended playback.
    #[inline]
    pub fn next_nibble<S: NibbleSource>(
        &mut self,
        source: &mut S,
        decoder: &mut AdpcmDecoder,
    ) -> Option<u8> {
        let nibble = if self.address & 1 == 0 {
            if !source.start_byte(self, decoder) {
                return None;
            }
            self.current >> 4
        } else {
            let nibble = self.current & 0x0F;
            source.finish_byte(self);
            nibble
        };

        self.address = (self.address + 1) & ADDRESS_MASK;
        Some(nibble)
    }
}

/// Where encoded bytes come from during playback
pub trait NibbleSource {
    /// Called before the high nibble of a new byte is taken.
    ///
    /// The source may move the cursor and must leave the byte to decode in
    /// `cursor.current`. Returning `false` ends playback.
    fn start_byte(&mut self, cursor: &mut Cursor, decoder: &mut AdpcmDecoder) -> bool;

    /// Called after the low nibble of `cursor.current` was taken
    fn finish_byte(&mut self, cursor: &mut Cursor) {
        let _ = cursor;
    }
}

/// Result of advancing the decoder by one output tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// All due steps were decoded
    Running,
    /// The source stopped playback part way
    Ended,
}

/// Predictor, step size and playback phase of one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdpcmDecoder {
    /// Phase accumulator, 16 fractional bits
    pub phase: u32,
    /// Phase increment per output tick
    pub rate: u32,
    /// Current forecast
    pub predictor: i32,
    /// Forecast before the last step
    pub previous: i32,
    /// Adaptive step size
    pub step_size: i32,
    /// Last interpolated, volume-scaled output
    pub output: i32,
}

impl AdpcmDecoder {
    /// Idle decoder with default step size
    pub fn new() -> Self {
        Self {
            phase: 0,
            rate: 0,
            predictor: 0,
            previous: 0,
            step_size: DELTA_DEFAULT,
            output: 0,
        }
    }

    /// State after START: phase, forecasts and output cleared
    pub fn start(&mut self) {
        self.phase = 0;
        self.predictor = 0;
        self.previous = 0;
        self.output = 0;
        self.step_size = DELTA_DEFAULT;
    }

    /// State after a repeat jump: forecasts and step size cleared, phase kept
    pub fn restart(&mut self) {
        self.predictor = 0;
        self.previous = 0;
        self.step_size = DELTA_DEFAULT;
    }

    /// Silence after end of sample
    pub fn stop(&mut self) {
        self.output = 0;
        self.previous = 0;
    }

    /// Decode one nibble into the forecast
    #[inline]
    pub fn step(&mut self, nibble: u8) {
        self.previous = self.predictor;
        let (predictor, step_size) = decode_nibble(nibble, self.predictor, self.step_size);
        self.predictor = predictor;
        self.step_size = step_size;
    }

    /// Add one tick of phase and decode every whole step that became due
    #[inline]
    pub fn advance<S: NibbleSource>(&mut self, cursor: &mut Cursor, source: &mut S) -> Tick {
        self.phase = self.phase.wrapping_add(self.rate);
        if self.phase >= STEP_UNIT {
            let mut steps = self.phase >> DELTAT_SHIFT;
            self.phase &= STEP_UNIT - 1;

            while steps > 0 {
                match cursor.next_nibble(source, self) {
                    Some(nibble) => self.step(nibble),
                    None => return Tick::Ended,
                }
                steps -= 1;
            }
        }
        Tick::Running
    }

    /// Blend previous and current forecast by the leftover phase, then scale
    #[inline]
    pub fn interpolate(&mut self, volume: i32) -> i32 {
        let phase = self.phase as i64;
        let blended =
            self.previous as i64 * (STEP_UNIT as i64 - phase) + self.predictor as i64 * phase;
        self.output = ((blended >> DELTAT_SHIFT) as i32).wrapping_mul(volume);
        self.output
    }
}

impl Default for AdpcmDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plays a fixed byte slice, ending when it runs out
    struct SliceSource<'a> {
        bytes: &'a [u8],
    }

    impl NibbleSource for SliceSource<'_> {
        fn start_byte(&mut self, cursor: &mut Cursor, _decoder: &mut AdpcmDecoder) -> bool {
            match self.bytes.get(cursor.byte_address() as usize) {
                Some(&b) => {
                    cursor.current = b;
                    true
                }
                None => false,
            }
        }
    }

    #[test]
    fn test_decode_nibble_examples() {
        assert_eq!(decode_nibble(0x0, 0, 127), (15, 127));
        assert_eq!(decode_nibble(0x8, 0, 127), (-15, 127));
        assert_eq!(decode_nibble(0x7, 0, 127), (238, 303));
        assert_eq!(decode_nibble(0xF, 0, 127), (-238, 303));
        assert_eq!(decode_nibble(0x4, 100, 1000), (100 + 9000 / 8, 1203));
    }

    #[test]
    fn test_decode_nibble_truncates_toward_zero() {
        // -1 * 127 / 8 = -15.875 -> -15
        assert_eq!(decode_nibble(0x8, 0, 127).0, -15);
        // -3 * 130 / 8 = -48.75 -> -48
        assert_eq!(decode_nibble(0x9, 0, 130).0, -48);
    }

    #[test]
    fn test_decode_nibble_saturates() {
        assert_eq!(decode_nibble(0x7, 32000, DELTA_MAX).0, DECODE_MAX);
        assert_eq!(decode_nibble(0xF, -32000, DELTA_MAX).0, DECODE_MIN);
        assert_eq!(decode_nibble(0x7, 0, DELTA_MAX).1, DELTA_MAX);
        assert_eq!(decode_nibble(0x0, 0, DELTA_MIN).1, DELTA_MIN);
    }

    #[test]
    fn test_decode_nibble_clamps_inputs() {
        assert_eq!(decode_nibble(0x7, i32::MAX, i32::MAX), (DECODE_MAX, DELTA_MAX));
        assert_eq!(decode_nibble(0xF, i32::MIN, i32::MAX), (DECODE_MIN, DELTA_MAX));
        assert_eq!(decode_nibble(0x0, 0, -100), decode_nibble(0x0, 0, DELTA_MIN));
    }

    #[test]
    fn test_ranges_hold_for_every_nibble_sequence() {
        let mut decoder = AdpcmDecoder::new();
        let mut seed = 0x1234_5678u32;
        for _ in 0..100_000 {
            seed = seed.wrapping_mul(214013).wrapping_add(2531011);
            decoder.step((seed >> 16) as u8 & 0x0F);
            assert!((DECODE_MIN..=DECODE_MAX).contains(&decoder.predictor));
            assert!((DELTA_MIN..=DELTA_MAX).contains(&decoder.step_size));
        }
    }

    #[test]
    fn test_cursor_takes_high_nibble_first() {
        let bytes = [0x7F, 0x08];
        let mut source = SliceSource { bytes: &bytes };
        let mut decoder = AdpcmDecoder::new();
        let mut cursor = Cursor::default();

        let nibbles: Vec<_> =
            std::iter::from_fn(|| cursor.next_nibble(&mut source, &mut decoder)).collect();
        assert_eq!(nibbles, vec![0x7, 0xF, 0x0, 0x8]);
        assert_eq!(cursor.address, 4);
    }

    #[test]
    fn test_advance_steps_once_per_unit() {
        let bytes = [0x77; 2];
        let mut source = SliceSource { bytes: &bytes };
        let mut decoder = AdpcmDecoder::new();
        let mut cursor = Cursor::default();

        decoder.rate = STEP_UNIT / 2;
        assert_eq!(decoder.advance(&mut cursor, &mut source), Tick::Running);
        assert_eq!(cursor.address, 0);
        assert_eq!(decoder.advance(&mut cursor, &mut source), Tick::Running);
        assert_eq!(cursor.address, 1);
        assert_eq!(decoder.phase, 0);

        decoder.rate = STEP_UNIT * 3;
        assert_eq!(decoder.advance(&mut cursor, &mut source), Tick::Running);
        assert_eq!(cursor.address, 4);

        assert_eq!(decoder.advance(&mut cursor, &mut source), Tick::Ended);
    }

    #[test]
    fn test_interpolation_blends_by_phase() {
        let mut decoder = AdpcmDecoder::new();
        decoder.previous = 100;
        decoder.predictor = 300;

        decoder.phase = 0;
        assert_eq!(decoder.interpolate(1), 100);
        decoder.phase = STEP_UNIT / 2;
        assert_eq!(decoder.interpolate(1), 200);
        decoder.phase = STEP_UNIT / 4;
        assert_eq!(decoder.interpolate(2), 300);
        assert_eq!(decoder.output, 300);
    }

    #[test]
    fn test_interpolation_of_negative_values_floors() {
        let mut decoder = AdpcmDecoder::new();
        decoder.previous = -1;
        decoder.predictor = 0;
        decoder.phase = 1;
        // (-65535) >> 16 == -1
        assert_eq!(decoder.interpolate(1), -1);
    }

    #[test]
    fn test_start_and_restart() {
        let mut decoder = AdpcmDecoder::new();
        decoder.phase = 99;
        decoder.predictor = 5;
        decoder.previous = 4;
        decoder.step_size = 900;
        decoder.output = 7;

        decoder.restart();
        assert_eq!((decoder.predictor, decoder.previous, decoder.step_size), (0, 0, DELTA_DEFAULT));
        assert_eq!(decoder.phase, 99);
        assert_eq!(decoder.output, 7);

        decoder.start();
        assert_eq!(decoder.phase, 0);
        assert_eq!(decoder.output, 0);
    }
}
