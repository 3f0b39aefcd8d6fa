// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use socgen_ir::ConstantValue;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SUPPORTED_CSR_DATA_WIDTHS: [u32; 3] = [8, 16, 32];

fn default_true() -> bool {
    true
}

/// Top-level SoC configuration, immutable once handed to the assembler.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SocConfig {
    pub ident: String,
    pub ident_version: bool,
    pub clk_freq: u64,
    pub cpu: CpuConfig,
    pub memory: MemoryConfig,
    pub mem_map: MemMap,
    pub shadow_base: u64,
    pub csr: CsrConfig,
    pub bus: BusConfig,
    #[serde(default = "default_true")]
    pub with_ctrl: bool,
    #[serde(default = "default_true")]
    pub with_timer: bool,
    pub uart: UartConfig,
    /// Explicit CSR bank ids reserved before any built-in peripheral.
    pub csr_map: BTreeMap<String, u32>,
    /// Explicit interrupt lines reserved after the CPU's own.
    pub interrupt_map: BTreeMap<String, u32>,
    pub constants: Vec<UserConstant>,
}

impl Default for SocConfig {
    fn default() -> Self {
        Self {
            ident: String::new(),
            ident_version: false,
            clk_freq: 100_000_000,
            cpu: CpuConfig::default(),
            memory: MemoryConfig::default(),
            mem_map: MemMap::default(),
            shadow_base: 0x8000_0000,
            csr: CsrConfig::default(),
            bus: BusConfig::default(),
            with_ctrl: true,
            with_timer: true,
            uart: UartConfig::default(),
            csr_map: BTreeMap::new(),
            interrupt_map: BTreeMap::new(),
            constants: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CpuConfig {
    /// CPU type name, `none` for a CPU-less SoC.
    #[serde(rename = "type")]
    pub kind: String,
    pub variant: Option<String>,
    pub reset_address: u64,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            kind: "vexriscv".to_string(),
            variant: None,
            reset_address: 0,
        }
    }
}

impl CpuConfig {
    /// `None` when the configuration asks for no CPU at all.
    pub fn kind(&self) -> Option<&str> {
        let kind = self.kind.trim();
        if kind.is_empty() || kind.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(kind)
        }
    }
}

/// A size given either as a byte count or a human string ("32KB").
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum SizeSpec {
    Bytes(u64),
    Human(String),
}

impl SizeSpec {
    pub fn bytes(&self) -> Result<u64> {
        match self {
            SizeSpec::Bytes(b) => Ok(*b),
            SizeSpec::Human(s) => parse_size(s),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MemorySpec {
    pub size: Option<SizeSpec>,
    /// Initialization image: raw binary, JSON region map or ELF.
    pub init: Option<PathBuf>,
}

impl MemorySpec {
    pub fn sized(bytes: u64) -> Self {
        Self {
            size: Some(SizeSpec::Bytes(bytes)),
            init: None,
        }
    }

    /// Resolved size in bytes; zero means the memory is not integrated.
    pub fn size_bytes(&self) -> Result<u64> {
        self.size.as_ref().map_or(Ok(0), SizeSpec::bytes)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryConfig {
    pub rom: MemorySpec,
    pub sram: MemorySpec,
    pub main_ram: MemorySpec,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            rom: MemorySpec::default(),
            sram: MemorySpec::sized(4096),
            main_ram: MemorySpec::default(),
        }
    }
}

/// Base addresses of the well-known windows (before shadowing).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MemMap {
    pub rom: u64,
    pub sram: u64,
    pub main_ram: u64,
    pub csr: u64,
}

impl Default for MemMap {
    fn default() -> Self {
        Self {
            rom: 0x0000_0000,
            sram: 0x1000_0000,
            main_ram: 0x4000_0000,
            csr: 0x6000_0000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CsrConfig {
    pub data_width: u32,
    pub address_width: u32,
    /// Byte distance between consecutive CSR banks.
    pub bank_stride: u64,
}

impl Default for CsrConfig {
    fn default() -> Self {
        Self {
            data_width: 8,
            address_width: 14,
            bank_stride: 0x800,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    /// `None` disables the inactivity timeout.
    pub timeout_cycles: Option<u64>,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            timeout_cycles: Some(1_000_000),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct UartConfig {
    pub enabled: bool,
    /// Platform pin group the PHY is attached to.
    pub name: String,
    pub baudrate: u32,
    pub stub: bool,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "serial".to_string(),
            baudrate: 115_200,
            stub: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserConstant {
    pub name: String,
    #[serde(default)]
    pub value: Option<ConstantValue>,
}

impl SocConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read SoC config at {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid SoC config {:?}", path))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse SoC config YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that do not need the allocation engine.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_CSR_DATA_WIDTHS.contains(&self.csr.data_width) {
            anyhow::bail!(
                "Unsupported csr.data_width {}. Supported widths: {:?}",
                self.csr.data_width,
                SUPPORTED_CSR_DATA_WIDTHS
            );
        }

        if self.csr.address_width == 0 || self.csr.address_width > 30 {
            anyhow::bail!(
                "csr.address_width must be between 1 and 30 (got {})",
                self.csr.address_width
            );
        }

        if !self.csr.bank_stride.is_power_of_two() {
            anyhow::bail!(
                "csr.bank_stride must be a non-zero power of two (got {:#x})",
                self.csr.bank_stride
            );
        }

        let window = 1u64 << (self.csr.address_width + 2);
        if self.csr.bank_stride > window {
            anyhow::bail!(
                "csr.bank_stride {:#x} exceeds the CSR window of {:#x} bytes",
                self.csr.bank_stride,
                window
            );
        }

        if self.clk_freq == 0 {
            anyhow::bail!("clk_freq must be greater than zero");
        }

        if self.uart.enabled && !self.uart.stub && self.uart.baudrate == 0 {
            anyhow::bail!("uart.baudrate must be greater than zero");
        }

        for (name, spec) in [
            ("rom", &self.memory.rom),
            ("sram", &self.memory.sram),
            ("main_ram", &self.memory.main_ram),
        ] {
            let size = spec
                .size_bytes()
                .with_context(|| format!("Invalid size for memory '{}'", name))?;
            if spec.init.is_some() && size == 0 {
                anyhow::bail!("Memory '{}' has an init image but no size", name);
            }
        }

        if self.ident_version && self.ident.is_empty() {
            tracing::warn!("ident_version is set but ident is empty; ignoring");
        }

        Ok(())
    }
}

pub fn parse_size(size_str: &str) -> Result<u64> {
    use human_size::{Byte, Size, SpecificSize};
    let trimmed = size_str.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .map_err(|e| anyhow::anyhow!("Invalid size format '{}': {}", size_str, e));
    }
    if let Ok(bytes) = trimmed.parse::<u64>() {
        return Ok(bytes);
    }
    let s: Size = trimmed
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid size format: {}", e))?;
    let bytes: SpecificSize<Byte> = s.into();
    Ok(bytes.value() as u64)
}
