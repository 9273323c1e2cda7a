//! # Checksum Dispatch
//!
//! MLB frames are protected by one of two one-byte checksums, picked by frame
//! address:
//!
//! - **XOR** seeded with a per-address starting value, for the ACC frames (and
//!   LDW_02 in the extended table)
//! - **CRC8-H2F** (AUTOSAR CRC-8 0x2F) for everything else
//!
//! The arithmetic itself belongs to a [`ChecksumBackend`]; this module only
//! owns the address to seed tables and the dispatch.

use std::fmt;

use super::protocol::{
    ACC_01_ADDRESS, ACC_02_ADDRESS, ACC_04_ADDRESS, ACC_05_ADDRESS, LDW_02_ADDRESS,
};

/// Address to XOR seed table entry
pub type XorSeed = (u32, u8);

/// Seed table without lane departure warning coverage
pub const XOR_SEEDS_LEGACY: [XorSeed; 4] = [
    (ACC_01_ADDRESS, 0x08),
    (ACC_02_ADDRESS, 0x0F),
    (ACC_04_ADDRESS, 0x27),
    (ACC_05_ADDRESS, 0x0C),
];

/// Current seed table: the legacy entries plus LDW_02
pub const XOR_SEEDS: [XorSeed; 5] = [
    (ACC_01_ADDRESS, 0x08),
    (ACC_02_ADDRESS, 0x0F),
    (ACC_04_ADDRESS, 0x27),
    (ACC_05_ADDRESS, 0x0C),
    (LDW_02_ADDRESS, 0x1F),
];

/// Checksum algorithm selected for a frame address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    /// XOR over the frame with the given starting value
    Xor { seed: u8 },
    /// CRC8 with the H2F (0x2F) polynomial
    Crc8H2f,
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xor { seed } => write!(f, "xor(0x{:02X})", seed),
            Self::Crc8H2f => write!(f, "crc8h2f"),
        }
    }
}

/// Where the checksum and counter live inside a frame.
///
/// Opaque to the dispatcher; only the backend interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalDescriptor {
    /// First bit of the checksum signal
    pub start_bit: u16,
    /// Width of the checksum signal in bits
    pub size: u8,
}

/// Checksum arithmetic supplied by the frame packer
#[cfg_attr(test, mockall::automock)]
pub trait ChecksumBackend {
    fn xor_checksum(&self, address: u32, signal: &SignalDescriptor, data: &[u8], seed: u8) -> u8;

    fn crc8h2f_checksum(&self, address: u32, signal: &SignalDescriptor, data: &[u8]) -> u8;
}

/// Static view over one of the seed tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorSeedTable(&'static [XorSeed]);

impl Default for XorSeedTable {
    fn default() -> Self {
        Self::extended()
    }
}

impl XorSeedTable {
    /// The five-entry table including LDW_02
    pub const fn extended() -> Self {
        Self(&XOR_SEEDS)
    }

    /// The four-entry table without LDW_02
    pub const fn legacy() -> Self {
        Self(&XOR_SEEDS_LEGACY)
    }

    pub fn entries(&self) -> &'static [XorSeed] {
        self.0
    }

    /// XOR seed for `address`, if the address is XOR-protected
    pub fn seed(&self, address: u32) -> Option<u8> {
        self.0
            .iter()
            .find(|&&(entry, _)| entry == address)
            .map(|&(_, seed)| seed)
    }

    /// Pick the algorithm for `address`.
    ///
    /// Addresses absent from the table use CRC8-H2F.
    ///
    /// # Examples
    ///
    /// ```
    /// use mlb_can::mlb::checksum::{ChecksumAlgorithm, XorSeedTable};
    ///
    /// let table = XorSeedTable::extended();
    /// assert_eq!(table.select(0x109), ChecksumAlgorithm::Xor { seed: 0x08 });
    /// assert_eq!(table.select(0x126), ChecksumAlgorithm::Crc8H2f);
    /// ```
    pub fn select(&self, address: u32) -> ChecksumAlgorithm {
        match self.seed(address) {
            Some(seed) => ChecksumAlgorithm::Xor { seed },
            None => ChecksumAlgorithm::Crc8H2f,
        }
    }
}

/// Address-driven checksum for MLB frames.
///
/// Exposes `checksum(address, signal, data)` so a frame packer can call it
/// without knowing anything about the platform.
#[derive(Debug, Clone)]
pub struct ChecksumDispatcher<B> {
    table: XorSeedTable,
    backend: B,
}

impl<B: ChecksumBackend> ChecksumDispatcher<B> {
    /// Dispatcher over the extended seed table
    pub fn new(backend: B) -> Self {
        Self::with_table(backend, XorSeedTable::extended())
    }

    pub fn with_table(backend: B, table: XorSeedTable) -> Self {
        Self { table, backend }
    }

    pub fn table(&self) -> XorSeedTable {
        self.table
    }

    /// Compute the checksum byte for a frame.
    ///
    /// Backend failures are the backend's to report; nothing is retried or
    /// substituted here.
    pub fn checksum(&self, address: u32, signal: &SignalDescriptor, data: &[u8]) -> u8 {
        match self.table.select(address) {
            ChecksumAlgorithm::Xor { seed } => self.backend.xor_checksum(address, signal, data, seed),
            ChecksumAlgorithm::Crc8H2f => self.backend.crc8h2f_checksum(address, signal, data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlb::protocol::{HCA_01_ADDRESS, LS_01_ADDRESS};

    const SIGNAL: SignalDescriptor = SignalDescriptor { start_bit: 0, size: 8 };

    #[test]
    fn test_extended_table_seeds() {
        let table = XorSeedTable::extended();
        assert_eq!(table.select(ACC_01_ADDRESS), ChecksumAlgorithm::Xor { seed: 0x08 });
        assert_eq!(table.select(ACC_02_ADDRESS), ChecksumAlgorithm::Xor { seed: 0x0F });
        assert_eq!(table.select(ACC_04_ADDRESS), ChecksumAlgorithm::Xor { seed: 0x27 });
        assert_eq!(table.select(ACC_05_ADDRESS), ChecksumAlgorithm::Xor { seed: 0x0C });
        assert_eq!(table.select(LDW_02_ADDRESS), ChecksumAlgorithm::Xor { seed: 0x1F });
    }

    #[test]
    fn test_legacy_table_has_no_ldw() {
        let table = XorSeedTable::legacy();
        assert_eq!(table.entries().len(), 4);
        assert_eq!(table.select(LDW_02_ADDRESS), ChecksumAlgorithm::Crc8H2f);
        assert_eq!(table.select(ACC_01_ADDRESS), ChecksumAlgorithm::Xor { seed: 0x08 });
    }

    #[test]
    fn test_extended_table_extends_legacy() {
        for entry in XOR_SEEDS_LEGACY.iter() {
            assert!(XOR_SEEDS.contains(entry), "legacy entry {:?} missing", entry);
        }
    }

    #[test]
    fn test_unlisted_addresses_use_crc() {
        let table = XorSeedTable::default();
        for address in [HCA_01_ADDRESS, LS_01_ADDRESS, 0x000, 0x7FF] {
            assert_eq!(table.select(address), ChecksumAlgorithm::Crc8H2f);
        }
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(ChecksumAlgorithm::Xor { seed: 0x0F }.to_string(), "xor(0x0F)");
        assert_eq!(ChecksumAlgorithm::Crc8H2f.to_string(), "crc8h2f");
    }

    #[test]
    fn test_dispatch_xor_with_seed() {
        let mut backend = MockChecksumBackend::new();
        backend
            .expect_xor_checksum()
            .withf(|address, _, data, seed| *address == ACC_02_ADDRESS && data == [1u8, 2, 3] && *seed == 0x0F)
            .times(1)
            .return_const(0xAAu8);
        backend.expect_crc8h2f_checksum().never();

        let dispatcher = ChecksumDispatcher::new(backend);
        assert_eq!(dispatcher.checksum(ACC_02_ADDRESS, &SIGNAL, &[1, 2, 3]), 0xAA);
    }

    #[test]
    fn test_dispatch_crc_for_steering() {
        let mut backend = MockChecksumBackend::new();
        backend.expect_xor_checksum().never();
        backend
            .expect_crc8h2f_checksum()
            .withf(|address, signal, data| {
                *address == HCA_01_ADDRESS && *signal == SIGNAL && data == [0u8; 8]
            })
            .times(1)
            .return_const(0x55u8);

        let dispatcher = ChecksumDispatcher::new(backend);
        assert_eq!(dispatcher.checksum(HCA_01_ADDRESS, &SIGNAL, &[0u8; 8]), 0x55);
    }

    #[test]
    fn test_dispatch_ldw_depends_on_table() {
        let mut legacy = MockChecksumBackend::new();
        legacy.expect_xor_checksum().never();
        legacy.expect_crc8h2f_checksum().times(1).return_const(0x01u8);
        let dispatcher = ChecksumDispatcher::with_table(legacy, XorSeedTable::legacy());
        assert_eq!(dispatcher.checksum(LDW_02_ADDRESS, &SIGNAL, &[0u8; 8]), 0x01);

        let mut extended = MockChecksumBackend::new();
        extended.expect_crc8h2f_checksum().never();
        extended
            .expect_xor_checksum()
            .withf(|_, _, _, seed| *seed == 0x1F)
            .times(1)
            .return_const(0x02u8);
        let dispatcher = ChecksumDispatcher::new(extended);
        assert_eq!(dispatcher.checksum(LDW_02_ADDRESS, &SIGNAL, &[0u8; 8]), 0x02);
    }
}
