//! SocGen Intermediate Representation (IR)
//!
//! This crate defines the portable, serializable description of a finalized SoC. It is the
//! contract between:
//!
//! 1. **The Assembler** (`socgen-core`): which allocates addresses, interrupt lines and CSR
//!    banks and publishes a [`SocDescription`] exactly once, at finalize time.
//! 2. **Generator Tools** (`socgen-codegen`): which emit C headers, linker scripts and Rust
//!    constant modules from it.
//! 3. **Build scripts**: which read the JSON/YAML serialization directly.
//!
//! Nothing in here is mutable after publication; consumers only ever receive shared references
//! or their own clones.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The top-level root of a finalized SoC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocDescription {
    /// The CPU type (e.g., "vexriscv"), or `None` for CPU-less designs.
    pub cpu_type: Option<String>,

    /// Canonical CPU variant string (e.g., "lite+debug").
    pub cpu_variant: String,

    /// Directly mapped memory regions, in registration order.
    pub memory_regions: Vec<MemoryRegion>,

    /// Base of the CSR window as seen by the CPU (shadow base applied).
    #[serde(default)]
    pub csr_base: u64,

    /// CSR banks and CSR memories, in bank order.
    pub csr_regions: Vec<CsrRegion>,

    /// The exported constant table, in its deterministic order.
    pub constants: Vec<Constant>,

    /// Interrupt name to interrupt line.
    pub interrupts: BTreeMap<String, u32>,

    /// CSR name to CSR bank id.
    pub csrs: BTreeMap<String, u32>,

    /// Integrated memories and their initialization words.
    #[serde(default)]
    pub memories: Vec<Memory>,

    /// The shared bus fabric, if any bus master was registered.
    #[serde(default)]
    pub bus: Option<BusFabric>,

    /// Point-to-point signal connections made at finalize time.
    #[serde(default)]
    pub wiring: Vec<Connection>,
}

/// A named, half-open address range `[origin, origin + length)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegion {
    /// Unique region name (e.g., "rom").
    pub name: String,
    /// First byte of the region.
    pub origin: u64,
    /// Length in bytes.
    pub length: u64,
}

impl MemoryRegion {
    /// First address past the end of the region.
    pub fn end(&self) -> u64 {
        self.origin.saturating_add(self.length)
    }

    /// Whether two half-open regions share at least one address.
    pub fn overlaps(&self, other: &MemoryRegion) -> bool {
        self.origin < other.end() && other.origin < self.end()
    }
}

/// A CSR bank or CSR-mapped memory placed in the CSR window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrRegion {
    /// Unique region name (bank name, or `<bank>_<memory>` for memories).
    pub name: String,
    /// Absolute (shadowed) base address.
    pub origin: u64,
    /// CSR bus data width in bits.
    pub busword: u32,
    /// What lives in the region.
    pub payload: CsrPayload,
}

/// Contents of a CSR region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CsrPayload {
    /// A bank of individual registers.
    Registers {
        /// Registers in address order.
        registers: Vec<CsrRegister>,
    },
    /// A raw memory block exposed through the CSR bus.
    Memory(CsrMemory),
}

/// A single control/status register inside a bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrRegister {
    /// Register name, local to its bank (e.g., "rxtx").
    pub name: String,
    /// Byte offset from the bank origin.
    pub offset: u64,
    /// Register width in bits.
    pub size: u32,
    /// Number of CSR bus words the register spans.
    pub words: u32,
    /// Whether software may write the register.
    pub writable: bool,
    /// Whether software may read the register.
    pub readable: bool,
    /// Value after reset.
    pub reset: u64,
}

/// A memory block mapped through the CSR bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrMemory {
    /// Memory name, local to its owner (e.g., "mem").
    pub name: String,
    /// Word width in bits.
    pub width: u32,
    /// Number of words.
    pub depth: u32,
    /// Whether the bus side is read-only.
    pub read_only: bool,
}

/// Value of an exported constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    /// Numeric value.
    Int(u64),
    /// String value.
    Str(String),
}

impl From<u64> for ConstantValue {
    fn from(v: u64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for ConstantValue {
    fn from(v: u32) -> Self {
        Self::Int(u64::from(v))
    }
}

impl From<&str> for ConstantValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ConstantValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// A named symbolic constant, `value: None` is a bare flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constant {
    /// Constant name (already upper-cased where required).
    pub name: String,
    /// Optional value.
    pub value: Option<ConstantValue>,
}

impl Constant {
    /// Build a constant from anything convertible to a value.
    pub fn new(name: impl Into<String>, value: impl Into<ConstantValue>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Build a valueless flag constant.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// An integrated memory block (ROM/SRAM/main RAM).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    /// Memory name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Whether bus writes are ignored.
    pub read_only: bool,
    /// Initialization words (32-bit, already in bus endianness).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init: Vec<u32>,
}

/// Summary of the shared, arbitrated bus fabric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusFabric {
    /// Masters in arbitration order.
    pub masters: Vec<String>,
    /// Slaves in decode priority order.
    pub slaves: Vec<BusSlaveInfo>,
    /// Inactivity timeout before a bus error is raised.
    pub timeout_cycles: Option<u64>,
}

/// A bus slave and the base address its decoder matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusSlaveInfo {
    /// Interface name.
    pub name: String,
    /// Base address fed to the address decoder.
    pub base: u64,
}

/// A signal connection established at finalize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Connection {
    /// Bus timeout error feeds the controller's error counter.
    BusErrorCounter,
    /// Controller reset drives the CPU reset.
    CpuReset,
    /// A peripheral's event manager IRQ drives a CPU interrupt input.
    Interrupt {
        /// CPU interrupt line.
        line: u32,
        /// Peripheral name.
        source: String,
    },
}

impl SocDescription {
    /// Look up a memory region by name.
    pub fn memory_region(&self, name: &str) -> Option<&MemoryRegion> {
        self.memory_regions.iter().find(|r| r.name == name)
    }

    /// Look up a CSR region by name.
    pub fn csr_region(&self, name: &str) -> Option<&CsrRegion> {
        self.csr_regions.iter().find(|r| r.name == name)
    }

    /// Look up a constant by name.
    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|c| c.name == name)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Parse a JSON description.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read a previously written description; the format follows the file extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
            serde_yaml::from_str(&content)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        } else {
            Self::from_json(&content).map_err(std::io::Error::from)
        }
    }
}
