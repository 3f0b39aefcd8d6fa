// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use socgen_ir::{BusFabric, BusSlaveInfo};

/// Word-address bit range compared by the default memory decoder.
pub const DECODER_START_BIT: u32 = 26;
pub const DECODER_END_BIT: u32 = 29;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusStandard {
    Wishbone,
    Csr,
}

/// An opaque bus endpoint owned by a CPU or peripheral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusInterface {
    pub name: String,
    pub standard: BusStandard,
    pub data_width: u32,
}

impl BusInterface {
    pub fn wishbone(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            standard: BusStandard::Wishbone,
            data_width: 32,
        }
    }

    pub fn csr(name: impl Into<String>, data_width: u32) -> Self {
        Self {
            name: name.into(),
            standard: BusStandard::Csr,
            data_width,
        }
    }
}

/// Matches byte addresses whose word-address bits `[start, end)` equal those of `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDecoder {
    pub base: u64,
    pub start: u32,
    pub end: u32,
}

impl AddressDecoder {
    fn field(&self, addr: u64) -> u64 {
        let mask = (1u64 << (self.end - self.start)) - 1;
        ((addr >> 2) >> self.start) & mask
    }

    pub fn matches(&self, addr: u64) -> bool {
        self.field(addr) == self.field(self.base)
    }
}

/// The default decoder: one slave per 512 MiB window (bits 28..31 of the byte address).
pub fn mem_decoder(address: u64) -> AddressDecoder {
    AddressDecoder {
        base: address,
        start: DECODER_START_BIT,
        end: DECODER_END_BIT,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusSlave {
    pub decoder: AddressDecoder,
    pub interface: BusInterface,
}

/// A single arbitrated bus shared by every master and slave.
#[derive(Debug, Clone)]
pub struct Interconnect {
    pub masters: Vec<BusInterface>,
    pub slaves: Vec<BusSlave>,
    /// Cycles a slave may stay silent before the bus-error signal fires.
    pub timeout_cycles: Option<u64>,
}

impl Interconnect {
    pub fn shared(masters: Vec<BusInterface>, slaves: Vec<BusSlave>, timeout_cycles: Option<u64>) -> Self {
        Self {
            masters,
            slaves,
            timeout_cycles,
        }
    }

    /// Whether a slave that never answers is turned into a bus error.
    pub fn has_timeout(&self) -> bool {
        self.timeout_cycles.is_some()
    }

    /// First slave whose decoder accepts `addr`, in registration order.
    pub fn decode(&self, addr: u64) -> Option<&BusSlave> {
        self.slaves.iter().find(|s| s.decoder.matches(addr))
    }

    pub fn to_ir(&self) -> BusFabric {
        BusFabric {
            masters: self.masters.iter().map(|m| m.name.clone()).collect(),
            slaves: self
                .slaves
                .iter()
                .map(|s| BusSlaveInfo {
                    name: s.interface.name.clone(),
                    base: s.decoder.base,
                })
                .collect(),
            timeout_cycles: self.timeout_cycles,
        }
    }
}

/// CSR bus: unarbitrated masters driving every bank.
#[derive(Debug, Clone)]
pub struct CsrInterconnect {
    pub masters: Vec<BusInterface>,
    pub banks: Vec<String>,
}
