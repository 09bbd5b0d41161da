//! Host bus abstraction for the Delta-T unit
//!
//! The unit never owns sample memory or the host chip's status register.
//! Every operation that touches them takes a `&mut impl DeltaTBus`, so the
//! host can hand in whatever currently backs the chip.

/// Services the host chip provides to its Delta-T unit
///
/// All methods have a default body. Leaving one out is the same as the host
/// not wiring that callback: reads return 0, writes and status changes are
/// dropped.
///
/// # Example
///
/// ```
/// use ym_deltat::DeltaTBus;
///
/// struct Opna {
///     rom: Vec<u8>,
///     status: u8,
/// }
///
/// impl DeltaTBus for Opna {
///     fn read_byte(&mut self, address: u32) -> u8 {
///         self.rom.get(address as usize).copied().unwrap_or(0)
///     }
///
///     fn set_status(&mut self, _chip: u8, mask: u8) {
///         self.status |= mask;
///     }
///
///     fn reset_status(&mut self, _chip: u8, mask: u8) {
///         self.status &= !mask;
///     }
/// }
/// ```
pub trait DeltaTBus {
    /// Read one byte of external sample memory
    ///
    /// # Arguments
    ///
    /// * `address` - Byte address (up to 24 bits)
    fn read_byte(&mut self, address: u32) -> u8 {
        let _ = address;
        0
    }

    /// Write one byte of external sample memory
    ///
    /// # Arguments
    ///
    /// * `chip` - Chip index from the unit's configuration
    /// * `address` - Byte address (up to 24 bits)
    /// * `value` - Byte to store
    fn write_byte(&mut self, chip: u8, address: u32, value: u8) {
        let _ = (chip, address, value);
    }

    /// Set status register bits
    ///
    /// # Arguments
    ///
    /// * `chip` - Chip index from the unit's configuration
    /// * `mask` - Bits to set (BRDY or EOS as assigned by the host)
    fn set_status(&mut self, chip: u8, mask: u8) {
        let _ = (chip, mask);
    }

    /// Clear status register bits
    fn reset_status(&mut self, chip: u8, mask: u8) {
        let _ = (chip, mask);
    }
}

/// A host with no sample memory and no status register
impl DeltaTBus for () {}

impl<B: DeltaTBus + ?Sized> DeltaTBus for &mut B {
    fn read_byte(&mut self, address: u32) -> u8 {
        (**self).read_byte(address)
    }

    fn write_byte(&mut self, chip: u8, address: u32, value: u8) {
        (**self).write_byte(chip, address, value)
    }

    fn set_status(&mut self, chip: u8, mask: u8) {
        (**self).set_status(chip, mask)
    }

    fn reset_status(&mut self, chip: u8, mask: u8) {
        (**self).reset_status(chip, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(&'static str, u8)>,
    }

    impl DeltaTBus for Recorder {
        fn set_status(&mut self, _chip: u8, mask: u8) {
            self.calls.push(("set", mask));
        }
    }

    #[test]
    fn test_unit_bus_is_inert() {
        let mut bus = ();
        assert_eq!(bus.read_byte(0x1234), 0);
        bus.write_byte(0, 0, 0xFF);
        bus.set_status(0, 0x08);
        bus.reset_status(0, 0x08);
    }

    #[test]
    fn test_partial_bus_uses_defaults() {
        let mut rec = Recorder::default();
        rec.set_status(0, 0x04);
        rec.reset_status(0, 0x04);
        assert_eq!(rec.read_byte(7), 0);
        assert_eq!(rec.calls, vec![("set", 0x04)]);
    }

    #[test]
    fn test_mut_reference_forwards() {
        fn notify<B: DeltaTBus>(mut bus: B) {
            bus.set_status(1, 0x80);
        }

        let mut rec = Recorder::default();
        notify(&mut rec);
        assert_eq!(rec.calls, vec![("set", 0x80)]);
    }
}
