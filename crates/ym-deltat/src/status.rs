//! Status flag signalling
//!
//! BRDY and EOS live in the host chip's status register, whose layout differs
//! per chip. The unit only announces transitions through the bus, using the
//! bit masks the host assigned in [`StatusBits`].

use crate::bus::DeltaTBus;
use crate::config::StatusBits;

/// Routes flag transitions to the host status register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusLine {
    bits: StatusBits,
    chip: u8,
}

impl StatusLine {
    /// Status line reporting `bits` for chip `chip`
    pub fn new(bits: StatusBits, chip: u8) -> Self {
        Self { bits, chip }
    }

    /// Chip index forwarded with each callback
    pub fn chip(&self) -> u8 {
        self.chip
    }

    /// Unit is ready for (or has) the next data byte
    #[inline]
    pub fn set_brdy<B: DeltaTBus + ?Sized>(&self, bus: &mut B) {
        if self.bits.brdy != 0 {
            bus.set_status(self.chip, self.bits.brdy);
        }
    }

    /// Unit is busy with the current data byte
    #[inline]
    pub fn clear_brdy<B: DeltaTBus + ?Sized>(&self, bus: &mut B) {
        if self.bits.brdy != 0 {
            bus.reset_status(self.chip, self.bits.brdy);
        }
    }

    /// BRDY drops and rises again: the access completed.
    ///
    /// Hardware raises BRDY again some master clocks later; this happens at once.
    #[inline]
    pub fn pulse_brdy<B: DeltaTBus + ?Sized>(&self, bus: &mut B) {
        self.clear_brdy(bus);
        self.set_brdy(bus);
    }

    /// Cursor reached the stop address
    #[inline]
    pub fn set_eos<B: DeltaTBus + ?Sized>(&self, bus: &mut B) {
        if self.bits.eos != 0 {
            bus.set_status(self.chip, self.bits.eos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<(bool, u8, u8)>);

    impl DeltaTBus for Log {
        fn set_status(&mut self, chip: u8, mask: u8) {
            self.0.push((true, chip, mask));
        }

        fn reset_status(&mut self, chip: u8, mask: u8) {
            self.0.push((false, chip, mask));
        }
    }

    #[test]
    fn test_pulse_clears_then_sets() {
        let line = StatusLine::new(StatusBits { brdy: 0x08, eos: 0x04 }, 2);
        let mut log = Log::default();
        line.pulse_brdy(&mut log);
        line.set_eos(&mut log);
        assert_eq!(log.0, vec![(false, 2, 0x08), (true, 2, 0x08), (true, 2, 0x04)]);
    }

    #[test]
    fn test_unassigned_bits_are_skipped() {
        let line = StatusLine::new(StatusBits { brdy: 0, eos: 0x80 }, 0);
        let mut log = Log::default();
        line.pulse_brdy(&mut log);
        line.set_brdy(&mut log);
        assert!(log.0.is_empty());
        line.set_eos(&mut log);
        assert_eq!(log.0, vec![(true, 0, 0x80)]);
    }
}
