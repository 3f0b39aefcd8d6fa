// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod allocator;
pub mod bus;
pub mod cpu;
pub mod csr;
pub mod peripherals;
pub mod region;
pub mod soc;
pub mod variant;

pub use allocator::IdentifierAllocator;
pub use region::{CsrRegionTable, RegionTracker};
pub use soc::{MemoryInit, SocCore};
pub use variant::CpuVariant;

use std::fmt;

/// The address/identifier space an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Interrupt,
    Csr,
    MemoryRegion,
    CsrRegion,
    Cpu,
    Peripheral,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Interrupt => "Interrupt",
            ResourceKind::Csr => "CSR",
            ResourceKind::MemoryRegion => "Memory region",
            ResourceKind::CsrRegion => "CSR region",
            ResourceKind::Cpu => "CPU",
            ResourceKind::Peripheral => "Peripheral",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SocError {
    #[error("{kind} conflict between '{existing}' and '{requested}'{}", detail_suffix(.detail))]
    Conflict {
        kind: ResourceKind,
        existing: String,
        requested: String,
        detail: Option<String>,
    },
    #[error("{kind} '{name}' out of range ({value:#x}, max={max:#x}){}", detail_suffix(.hint))]
    OutOfRange {
        kind: ResourceKind,
        name: String,
        value: u64,
        max: u64,
        hint: Option<String>,
    },
    #[error("No more space to allocate {kind} '{name}' ({capacity} ids in use)")]
    Exhausted {
        kind: ResourceKind,
        name: String,
        capacity: u64,
    },
    #[error("Invalid cpu_variant value: {variant}\n\nPossible Values:\n{choices}")]
    InvalidVariant { variant: String, choices: String },
    #[error("Invalid extension in cpu_variant value: {variant}\n\nPossible Values:\n{choices}")]
    InvalidExtension { variant: String, choices: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("SoC is finalized: {0}")]
    FinalizeViolation(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default()
}

pub type SocResult<T> = Result<T, SocError>;
