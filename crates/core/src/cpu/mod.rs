// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::BusInterface;
use crate::variant::CpuVariant;
use crate::{SocError, SocResult};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of CPU interrupt inputs.
pub const INTERRUPT_LINES: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuKind {
    Lm32,
    Mor1kx,
    PicoRv32,
    VexRiscv,
    Minerva,
    Rocket,
}

impl CpuKind {
    pub const ALL: [CpuKind; 6] = [
        CpuKind::Lm32,
        CpuKind::Mor1kx,
        CpuKind::PicoRv32,
        CpuKind::VexRiscv,
        CpuKind::Minerva,
        CpuKind::Rocket,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CpuKind::Lm32 => "lm32",
            CpuKind::Mor1kx => "mor1kx",
            CpuKind::PicoRv32 => "picorv32",
            CpuKind::VexRiscv => "vexriscv",
            CpuKind::Minerva => "minerva",
            CpuKind::Rocket => "rocket",
        }
    }

    pub fn endianness(self) -> Endianness {
        match self {
            CpuKind::Lm32 | CpuKind::Mor1kx => Endianness::Big,
            _ => Endianness::Little,
        }
    }

    /// Interrupt lines the core wires internally.
    pub fn reserved_interrupts(self) -> &'static [(&'static str, u32)] {
        match self {
            CpuKind::PicoRv32 => &[("timer", 0), ("ebreak_ecall_illegal", 1), ("bus_error", 2)],
            CpuKind::Mor1kx => &[("nmi", 0)],
            _ => &[],
        }
    }

    /// ROM/SRAM bases forced by the core, if any.
    pub fn mem_map_override(self) -> Option<(u64, u64)> {
        match self {
            // Rocket keeps the first 256 MiB for itself.
            CpuKind::Rocket => Some((0x1000_0000, 0x2000_0000)),
            _ => None,
        }
    }

    pub fn data_width(self) -> u32 {
        match self {
            CpuKind::Rocket => 64,
            _ => 32,
        }
    }
}

impl fmt::Display for CpuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CpuKind {
    type Err = SocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "or1k" {
            tracing::warn!("CPU type \"or1k\" is deprecated, use \"mor1kx\"");
            return Ok(CpuKind::Mor1kx);
        }
        CpuKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                let supported: Vec<&str> = CpuKind::ALL.iter().map(|k| k.name()).collect();
                SocError::InvalidConfiguration(format!(
                    "Unsupported CPU type: {} (supported: {}, none)",
                    s,
                    supported.join(", ")
                ))
            })
    }
}

/// An opaque CPU core: a reset address input, bus masters and interrupt inputs.
#[derive(Debug, Clone)]
pub struct Cpu {
    pub kind: CpuKind,
    pub variant: CpuVariant,
    pub reset_address: u64,
    pub ibus: BusInterface,
    pub dbus: BusInterface,
    /// Number of interrupt inputs; zero when the core has none.
    pub interrupt_lines: u32,
}

impl Cpu {
    pub fn new(kind: CpuKind, variant: CpuVariant, reset_address: u64) -> Self {
        Self {
            kind,
            variant,
            reset_address,
            ibus: BusInterface {
                data_width: kind.data_width(),
                ..BusInterface::wishbone("cpu_ibus")
            },
            dbus: BusInterface {
                data_width: kind.data_width(),
                ..BusInterface::wishbone("cpu_dbus")
            },
            interrupt_lines: INTERRUPT_LINES,
        }
    }

    pub fn reserved_interrupts(&self) -> BTreeMap<String, u32> {
        self.kind
            .reserved_interrupts()
            .iter()
            .map(|(n, id)| (n.to_string(), *id))
            .collect()
    }

    pub fn has_interrupt(&self) -> bool {
        self.interrupt_lines > 0
    }

    pub fn endianness(&self) -> Endianness {
        self.kind.endianness()
    }

    /// Resolve an optional CPU type; `None` means the SoC has no CPU.
    pub fn resolve_kind(kind: Option<&str>) -> SocResult<Option<CpuKind>> {
        kind.map(CpuKind::from_str).transpose()
    }
}
