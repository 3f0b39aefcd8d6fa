// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! CSR declarations and the bank array built from them at finalize time.

use crate::peripherals::Peripheral;
use crate::{ResourceKind, SocError, SocResult};
use bitflags::bitflags;
use socgen_config::SUPPORTED_CSR_DATA_WIDTHS;
use socgen_ir::{ConstantValue, CsrMemory, CsrRegister};

/// Byte distance between consecutive CSR bus words.
pub const CSR_WORD_BYTES: u64 = 4;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CsrAccess: u8 {
        const READ = 0b01;
        const WRITE = 0b10;
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

/// A register as declared by a peripheral, before placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrRegisterDef {
    pub name: String,
    pub size: u32,
    pub access: CsrAccess,
    pub reset: u64,
}

impl CsrRegisterDef {
    /// Software-writable storage.
    pub fn storage(name: &str, size: u32, reset: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            access: CsrAccess::READ_WRITE,
            reset,
        }
    }

    /// Hardware-driven, read-only status.
    pub fn status(name: &str, size: u32) -> Self {
        Self {
            name: name.to_string(),
            size,
            access: CsrAccess::READ,
            reset: 0,
        }
    }

    /// Write strobe without storage.
    pub fn trigger(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: 1,
            access: CsrAccess::WRITE,
            reset: 0,
        }
    }

    /// Bus words needed at the given CSR data width.
    pub fn words(&self, data_width: u32) -> u32 {
        self.size.max(1).div_ceil(data_width.max(1))
    }
}

/// A memory exposed through the CSR bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrMemoryDef {
    pub name: String,
    pub width: u32,
    pub depth: u32,
    pub read_only: bool,
    pub init: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrConstantDef {
    pub name: String,
    pub value: ConstantValue,
}

/// CSR address-space geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsrLayout {
    pub data_width: u32,
    pub address_width: u32,
    pub bank_stride: u64,
}

impl CsrLayout {
    pub const MAX_ADDRESS_WIDTH: u32 = 30;

    /// Checked geometry: supported data width, `1..=30` address bits and a power-of-two
    /// stride no larger than the CSR window.
    pub fn new(data_width: u32, address_width: u32, bank_stride: u64) -> SocResult<Self> {
        if !SUPPORTED_CSR_DATA_WIDTHS.contains(&data_width) {
            return Err(SocError::InvalidConfiguration(format!(
                "Unsupported CSR data width {}. Supported widths: {:?}",
                data_width,
                SUPPORTED_CSR_DATA_WIDTHS
            )));
        }
        if address_width == 0 || address_width > Self::MAX_ADDRESS_WIDTH {
            return Err(SocError::InvalidConfiguration(format!(
                "CSR address width must be between 1 and {} (got {})",
                Self::MAX_ADDRESS_WIDTH,
                address_width
            )));
        }
        let layout = Self {
            data_width,
            address_width,
            bank_stride,
        };
        if !bank_stride.is_power_of_two() || bank_stride > layout.window_size() {
            return Err(SocError::InvalidConfiguration(format!(
                "CSR bank stride {:#x} must be a power of two no larger than the CSR window ({:#x})",
                bank_stride,
                layout.window_size()
            )));
        }
        Ok(layout)
    }

    /// Bytes addressable through the CSR bus: `2^(address_width + 2)`.
    pub fn window_size(&self) -> u64 {
        self.address_width
            .checked_add(2)
            .and_then(|bits| 1u64.checked_shl(bits))
            .unwrap_or(u64::MAX)
    }

    /// Byte offset of bank `id` inside the CSR window.
    pub fn bank_offset(&self, name: &str, id: u32) -> SocResult<u64> {
        let offset = self
            .bank_stride
            .checked_mul(u64::from(id))
            .ok_or_else(|| self.out_of_range(name, u64::MAX))?;
        self.check_range(name, offset)?;
        Ok(offset)
    }

    /// Offsets must stay below `2^(address_width + 2)`.
    pub fn check_range(&self, name: &str, offset: u64) -> SocResult<()> {
        if offset >= self.window_size() {
            return Err(self.out_of_range(name, offset));
        }
        Ok(())
    }

    fn out_of_range(&self, name: &str, offset: u64) -> SocError {
        SocError::OutOfRange {
            kind: ResourceKind::Csr,
            name: name.to_string(),
            value: offset,
            max: self.window_size() - 1,
            hint: Some("increase csr_address_width".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrBank {
    pub name: String,
    pub id: u32,
    pub registers: Vec<CsrRegister>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrSram {
    /// `<owner>_<memory>`
    pub name: String,
    pub id: u32,
    pub memory: CsrMemory,
}

/// All banks, CSR memories and CSR constants of a SoC.
#[derive(Debug, Clone, Default)]
pub struct CsrBankArray {
    pub banks: Vec<CsrBank>,
    pub srams: Vec<CsrSram>,
    /// `(owner, constant)` pairs.
    pub constants: Vec<(String, CsrConstantDef)>,
}

impl CsrBankArray {
    /// Build banks for every peripheral, in the iteration order given.
    ///
    /// `address_map` resolves a bank name (or `<owner>_<memory>`) to its CSR id.
    pub fn build<'a, I, F>(peripherals: I, layout: &CsrLayout, address_map: F) -> SocResult<Self>
    where
        I: IntoIterator<Item = &'a Peripheral>,
        F: Fn(&str) -> SocResult<u32>,
    {
        let mut array = Self::default();
        for p in peripherals {
            for memory in &p.csr_memories {
                let name = format!("{}_{}", p.name, memory.name);
                let id = address_map(&name)?;
                array.srams.push(CsrSram {
                    name,
                    id,
                    memory: CsrMemory {
                        name: memory.name.clone(),
                        width: memory.width,
                        depth: memory.depth,
                        read_only: memory.read_only,
                    },
                });
            }

            for constant in &p.csr_constants {
                array.constants.push((p.name.clone(), constant.clone()));
            }

            if p.csrs.is_empty() {
                continue;
            }
            let id = address_map(&p.name)?;
            let registers = place_registers(&p.name, &p.csrs, layout)?;
            array.banks.push(CsrBank {
                name: p.name.clone(),
                id,
                registers,
            });
        }
        Ok(array)
    }

    pub fn bank_names(&self) -> Vec<String> {
        self.banks.iter().map(|b| b.name.clone()).collect()
    }
}

fn place_registers(bank: &str, defs: &[CsrRegisterDef], layout: &CsrLayout) -> SocResult<Vec<CsrRegister>> {
    let mut offset = 0u64;
    let mut placed = Vec::with_capacity(defs.len());
    for def in defs {
        let words = def.words(layout.data_width);
        placed.push(CsrRegister {
            name: def.name.clone(),
            offset,
            size: def.size,
            words,
            readable: def.access.contains(CsrAccess::READ),
            writable: def.access.contains(CsrAccess::WRITE),
            reset: def.reset,
        });
        offset += u64::from(words) * CSR_WORD_BYTES;
    }
    if offset > layout.bank_stride {
        return Err(SocError::OutOfRange {
            kind: ResourceKind::Csr,
            name: bank.to_string(),
            value: offset,
            max: layout.bank_stride,
            hint: Some("registers do not fit in one bank".to_string()),
        });
    }
    Ok(placed)
}
