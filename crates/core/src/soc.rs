// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The SoC assembler.
//!
//! `SocCore` owns every registry. It accepts registrations while [`Phase::Building`] and turns
//! them into a read-only [`SocDescription`] in a single [`SocCore::finalize`] pass. Any
//! registration after that, or a second finalize, is a [`SocError::FinalizeViolation`].

use crate::allocator::IdentifierAllocator;
use crate::bus::{mem_decoder, AddressDecoder, BusInterface, BusSlave, CsrInterconnect, Interconnect};
use crate::cpu::{Cpu, CpuKind, INTERRUPT_LINES};
use crate::csr::{CsrBankArray, CsrLayout};
use crate::peripherals::{self, Peripheral, PeripheralKind, PeripheralRegistry};
use crate::region::{CsrRegionTable, RegionTracker};
use crate::variant::CpuVariant;
use crate::{ResourceKind, SocError, SocResult};
use socgen_config::{MemMap, MemorySpec, SocConfig};
use socgen_ir::{Connection, Constant, ConstantValue, CsrPayload, Memory, MemoryRegion, SocDescription};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Bus interface of the bus-to-CSR bridge.
pub const CSR_BRIDGE: &str = "wishbone2csr";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Building,
    Finalized,
    /// `finalize` was attempted and failed; nothing was published.
    Failed,
}

/// Initialization images for the integrated memories, as 32-bit words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryInit {
    pub rom: Vec<u32>,
    pub sram: Vec<u32>,
    pub main_ram: Vec<u32>,
}

#[derive(Debug)]
pub struct SocCore {
    phase: Phase,
    mem_map: MemMap,
    layout: CsrLayout,
    shadow_base: u64,
    bus_timeout_cycles: Option<u64>,
    cpu_kind: Option<CpuKind>,
    cpu_variant: CpuVariant,
    cpu_reset_address: u64,
    cpu: Option<Cpu>,
    interrupts: IdentifierAllocator,
    csrs: IdentifierAllocator,
    memory_regions: RegionTracker,
    csr_regions: CsrRegionTable,
    registry: PeripheralRegistry,
    config: BTreeMap<String, ConstantValue>,
    user_constants: Vec<Constant>,
    derived_constants: Vec<Constant>,
    wiring: Vec<Connection>,
    interconnect: Option<Interconnect>,
    csr_interconnect: Option<CsrInterconnect>,
    description: Option<SocDescription>,
}

fn memory_size(spec: &MemorySpec, name: &str) -> SocResult<u64> {
    spec.size_bytes()
        .map_err(|e| SocError::InvalidConfiguration(format!("memory '{}': {:#}", name, e)))
}

impl SocCore {
    /// An empty assembler: no CPU, no peripherals, only the address-space geometry.
    pub fn bare(config: &SocConfig) -> SocResult<Self> {
        let cpu_kind = Cpu::resolve_kind(config.cpu.kind())?;
        let cpu_variant = CpuVariant::resolve(config.cpu.variant.as_deref())?;

        let mut mem_map = config.mem_map;
        if let Some((rom, sram)) = cpu_kind.and_then(CpuKind::mem_map_override) {
            mem_map.rom = rom;
            mem_map.sram = sram;
        }

        let rom_size = memory_size(&config.memory.rom, "rom")?;
        let cpu_reset_address = if rom_size > 0 {
            mem_map.rom
        } else {
            config.cpu.reset_address
        };

        let layout = CsrLayout::new(
            config.csr.data_width,
            config.csr.address_width,
            config.csr.bank_stride,
        )?;

        let mut soc = Self {
            phase: Phase::Building,
            mem_map,
            layout,
            shadow_base: config.shadow_base,
            bus_timeout_cycles: config.bus.timeout_cycles,
            cpu_kind,
            cpu_variant,
            cpu_reset_address,
            cpu: None,
            interrupts: IdentifierAllocator::new(ResourceKind::Interrupt, u64::from(INTERRUPT_LINES)),
            csrs: IdentifierAllocator::with_address_width(ResourceKind::Csr, layout.address_width),
            memory_regions: RegionTracker::new(),
            csr_regions: CsrRegionTable::new(),
            registry: PeripheralRegistry::default(),
            config: BTreeMap::new(),
            user_constants: Vec::new(),
            derived_constants: Vec::new(),
            wiring: Vec::new(),
            interconnect: None,
            csr_interconnect: None,
            description: None,
        };
        soc.add_config("CPU_RESET_ADDR", cpu_reset_address)?;
        Ok(soc)
    }

    /// Build the standard SoC described by `config`, ready for further registrations.
    pub fn new(config: &SocConfig) -> SocResult<Self> {
        let mut soc = Self::bare(config)?;

        for (name, id) in &config.csr_map {
            soc.add_csr(name, Some(*id), false)?;
        }

        if config.with_ctrl {
            soc.add_peripheral(peripherals::ctrl::controller())?;
            soc.add_csr(peripherals::ctrl::NAME, None, true)?;
        }

        if let Some(kind) = soc.cpu_kind {
            let cpu = Cpu::new(kind, soc.cpu_variant.clone(), soc.cpu_reset_address);
            let reserved = cpu.reserved_interrupts();
            let (ibus, dbus) = (cpu.ibus.clone(), cpu.dbus.clone());
            soc.add_cpu(cpu)?;
            soc.add_csr("cpu", None, true)?;
            soc.add_bus_master(ibus)?;
            soc.add_bus_master(dbus)?;
            if config.with_ctrl {
                soc.wiring.push(Connection::CpuReset);
            }
            for (name, id) in &reserved {
                soc.add_interrupt(name, Some(*id), false)?;
            }
        }

        for (name, id) in &config.interrupt_map {
            soc.add_interrupt(name, Some(*id), false)?;
        }

        let cpu_type = soc.cpu_kind.map_or("none", CpuKind::name).to_uppercase();
        soc.add_config("CPU_TYPE", cpu_type)?;
        let variant = soc.cpu_variant.to_string().to_uppercase();
        soc.add_config("CPU_VARIANT", variant)?;

        let rom_size = memory_size(&config.memory.rom, "rom")?;
        if rom_size > 0 {
            let rom = peripherals::sram::integrated("rom", rom_size, true);
            let bus = rom.bus.clone();
            soc.add_peripheral(rom)?;
            if let Some(bus) = bus {
                soc.register_rom(bus, rom_size)?;
            }
        }

        let rams = [
            ("sram", soc.mem_map.sram, &config.memory.sram),
            ("main_ram", soc.mem_map.main_ram, &config.memory.main_ram),
        ];
        for (name, base, spec) in rams {
            let size = memory_size(spec, name)?;
            if size == 0 {
                continue;
            }
            let mem = peripherals::sram::integrated(name, size, false);
            let bus = mem.bus.clone();
            soc.add_peripheral(mem)?;
            if let Some(bus) = bus {
                soc.register_mem(name, base, bus, Some(size))?;
            }
        }

        soc.add_csr_master(BusInterface::csr(CSR_BRIDGE, config.csr.data_width))?;
        soc.add_config("CSR_DATA_WIDTH", config.csr.data_width)?;
        soc.add_constant("CSR_DATA_WIDTH", Some(config.csr.data_width.into()))?;
        let csr_base = soc.mem_map.csr;
        soc.register_mem(
            "csr",
            csr_base,
            BusInterface::wishbone(format!("{}_wishbone", CSR_BRIDGE)),
            None,
        )?;

        if config.uart.enabled {
            if config.uart.stub {
                soc.add_peripheral(peripherals::uart::stub())?;
            } else {
                debug!("UART PHY on pads '{}'", config.uart.name);
                soc.add_peripheral(peripherals::uart::phy(config.uart.baudrate, config.clk_freq))?;
                soc.add_peripheral(peripherals::uart::uart())?;
            }
            soc.add_csr(peripherals::uart::PHY_NAME, None, true)?;
            soc.add_csr(peripherals::uart::NAME, None, true)?;
            soc.add_interrupt(peripherals::uart::NAME, None, true)?;
        }

        if !config.ident.is_empty() {
            let ident = if config.ident_version {
                format!("{} {}", config.ident, env!("CARGO_PKG_VERSION"))
            } else {
                config.ident.clone()
            };
            soc.add_peripheral(peripherals::identifier::identifier(&ident))?;
            let mem_name = format!(
                "{}_{}",
                peripherals::identifier::NAME,
                peripherals::identifier::MEMORY
            );
            soc.add_csr(&mem_name, None, true)?;
        }

        soc.add_config("CLOCK_FREQUENCY", config.clk_freq)?;
        soc.add_constant("SYSTEM_CLOCK_FREQUENCY", Some(config.clk_freq.into()))?;

        if config.with_timer {
            soc.add_peripheral(peripherals::timer::timer("timer0"))?;
            soc.add_csr("timer0", None, true)?;
            soc.add_interrupt("timer0", None, true)?;
        }

        for c in &config.constants {
            soc.add_constant(&c.name, c.value.clone())?;
        }

        info!(
            "SoC assembled: cpu={} variant={} peripherals={}",
            soc.cpu_kind.map_or("none", CpuKind::name),
            soc.cpu_variant,
            soc.registry.len()
        );
        Ok(soc)
    }

    /// Like [`SocCore::new`], then loads the given memory images.
    pub fn with_init(config: &SocConfig, init: MemoryInit) -> SocResult<Self> {
        let mut soc = Self::new(config)?;
        for (name, words) in [("rom", init.rom), ("sram", init.sram), ("main_ram", init.main_ram)] {
            if !words.is_empty() {
                soc.initialize_mem(name, words)?;
            }
        }
        Ok(soc)
    }

    fn ensure_building(&self, operation: &str) -> SocResult<()> {
        match self.phase {
            Phase::Building => Ok(()),
            Phase::Finalized | Phase::Failed => Err(SocError::FinalizeViolation(format!(
                "cannot {} after finalize",
                operation
            ))),
        }
    }

    pub fn add_cpu(&mut self, cpu: Cpu) -> SocResult<()> {
        self.ensure_building("add a CPU")?;
        if let Some(existing) = &self.cpu {
            return Err(SocError::Conflict {
                kind: ResourceKind::Cpu,
                existing: existing.kind.to_string(),
                requested: cpu.kind.to_string(),
                detail: Some("more than one CPU is not supported".to_string()),
            });
        }
        self.cpu = Some(cpu);
        Ok(())
    }

    pub fn add_bus_master(&mut self, bus: BusInterface) -> SocResult<()> {
        self.ensure_building("add a bus master")?;
        self.registry.bus_masters.push(bus);
        Ok(())
    }

    pub fn add_bus_slave(&mut self, decoder: AddressDecoder, bus: BusInterface) -> SocResult<()> {
        self.ensure_building("add a bus slave")?;
        self.registry.bus_slaves.push(BusSlave {
            decoder,
            interface: bus,
        });
        Ok(())
    }

    /// CSR masters are not arbitrated against each other; use with caution.
    pub fn add_csr_master(&mut self, bus: BusInterface) -> SocResult<()> {
        self.ensure_building("add a CSR master")?;
        self.registry.csr_masters.push(bus);
        Ok(())
    }

    pub fn add_peripheral(&mut self, peripheral: Peripheral) -> SocResult<()> {
        self.ensure_building("add a peripheral")?;
        self.registry.add(peripheral)
    }

    /// The interrupt space is fixed at [`INTERRUPT_LINES`] lines.
    pub fn add_interrupt(&mut self, name: &str, id: Option<u32>, allow_existing: bool) -> SocResult<u32> {
        self.ensure_building("add an interrupt")?;
        self.interrupts.register(name, id, allow_existing)
    }

    pub fn add_csr(&mut self, name: &str, id: Option<u32>, allow_existing: bool) -> SocResult<u32> {
        self.ensure_building("add a CSR")?;
        self.csrs.register(name, id, allow_existing)
    }

    pub fn add_memory_region(&mut self, name: &str, origin: u64, length: u64) -> SocResult<()> {
        self.ensure_building("add a memory region")?;
        self.memory_regions.add(name, origin, length)
    }

    /// Map `interface` at `address`; also record a memory region when `size` is known.
    pub fn register_mem(
        &mut self,
        name: &str,
        address: u64,
        interface: BusInterface,
        size: Option<u64>,
    ) -> SocResult<()> {
        self.add_bus_slave(mem_decoder(address), interface)?;
        if let Some(size) = size {
            self.add_memory_region(name, address, size)?;
        }
        Ok(())
    }

    /// Map the boot ROM. The decoder uses the ROM window while the region starts at the CPU
    /// reset address, which some cores place outside that window.
    pub fn register_rom(&mut self, interface: BusInterface, size: u64) -> SocResult<()> {
        self.add_bus_slave(mem_decoder(self.mem_map.rom), interface)?;
        self.add_memory_region("rom", self.cpu_reset_address, size)
    }

    pub fn add_constant(&mut self, name: &str, value: Option<ConstantValue>) -> SocResult<()> {
        self.ensure_building("add a constant")?;
        self.user_constants.push(Constant {
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    /// Record a configuration entry, exported as `CONFIG_<KEY>` at finalize.
    pub fn add_config(&mut self, key: &str, value: impl Into<ConstantValue>) -> SocResult<()> {
        self.ensure_building("add a configuration entry")?;
        self.config.insert(key.to_uppercase(), value.into());
        Ok(())
    }

    /// Load initialization words into an integrated memory.
    pub fn initialize_mem(&mut self, name: &str, words: Vec<u32>) -> SocResult<()> {
        self.ensure_building("initialize a memory")?;
        let block = self
            .registry
            .get_mut(name)
            .and_then(|p| p.memory.as_mut())
            .ok_or_else(|| {
                SocError::InvalidConfiguration(format!("no integrated memory named '{}'", name))
            })?;
        let bytes = words.len() as u64 * 4;
        if bytes > block.size {
            return Err(SocError::OutOfRange {
                kind: ResourceKind::MemoryRegion,
                name: name.to_string(),
                value: bytes,
                max: block.size,
                hint: Some("init image is larger than the memory".to_string()),
            });
        }
        debug!("Initializing '{}' with {} words", name, words.len());
        block.init = words;
        Ok(())
    }

    pub fn initialize_rom(&mut self, words: Vec<u32>) -> SocResult<()> {
        self.initialize_mem("rom", words)
    }

    /// CSR id of a bank (`name`) or CSR memory (`<owner>_<memory>`).
    pub fn get_csr_dev_address(&self, name: &str) -> SocResult<u32> {
        self.csrs.get(name).ok_or_else(|| {
            let available: Vec<String> = self.csrs.iter().map(|(n, _)| format!("- {}", n)).collect();
            SocError::InvalidConfiguration(format!(
                "Undefined \"{}\" CSR.\nAvailable CSRs:\n{}",
                name,
                available.join("\n")
            ))
        })
    }

    /// One-shot transition to the finalized state.
    ///
    /// Only the first call does any work. On failure nothing is published and the assembler
    /// moves to [`Phase::Failed`], which rejects every later call.
    pub fn finalize(&mut self) -> SocResult<()> {
        if self.phase != Phase::Building {
            return Err(SocError::FinalizeViolation(
                "finalize() may only be called once".to_string(),
            ));
        }

        let result = self.try_finalize();
        if result.is_err() {
            self.phase = Phase::Failed;
        }
        result
    }

    fn csr_origin(&self, name: &str, id: u32) -> SocResult<u64> {
        let offset = self.layout.bank_offset(name, id)?;
        let origin = self.mem_map.csr.checked_add(offset).ok_or_else(|| SocError::OutOfRange {
            kind: ResourceKind::Csr,
            name: name.to_string(),
            value: offset,
            max: u64::MAX - self.mem_map.csr,
            hint: Some("lower mem_map.csr".to_string()),
        })?;
        Ok(origin | self.shadow_base)
    }

    fn try_finalize(&mut self) -> SocResult<()> {
        if self.cpu.is_some() {
            for mem in ["rom", "sram"] {
                if !self.memory_regions.contains(mem) {
                    return Err(SocError::InvalidConfiguration(format!(
                        "CPU needs a {} to be registered with register_mem()",
                        mem
                    )));
                }
            }
        }

        let mut wiring = self.wiring.clone();

        let interconnect = if self.registry.bus_masters.is_empty() {
            None
        } else {
            let bus = Interconnect::shared(
                self.registry.bus_masters.clone(),
                self.registry.bus_slaves.clone(),
                self.bus_timeout_cycles,
            );
            let has_ctrl = self
                .registry
                .get(peripherals::ctrl::NAME)
                .is_some_and(|p| p.kind == PeripheralKind::Controller);
            if has_ctrl && bus.has_timeout() {
                wiring.push(Connection::BusErrorCounter);
            }
            Some(bus)
        };

        let array = CsrBankArray::build(self.registry.iter(), &self.layout, |name| {
            self.get_csr_dev_address(name)
        })?;
        let csr_interconnect = CsrInterconnect {
            masters: self.registry.csr_masters.clone(),
            banks: array.bank_names(),
        };

        let mut csr_regions = self.csr_regions.clone();
        for bank in &array.banks {
            csr_regions.add(
                &bank.name,
                self.csr_origin(&bank.name, bank.id)?,
                self.layout.data_width,
                CsrPayload::Registers {
                    registers: bank.registers.clone(),
                },
            )?;
        }
        for sram in &array.srams {
            csr_regions.add(
                &sram.name,
                self.csr_origin(&sram.name, sram.id)?,
                self.layout.data_width,
                CsrPayload::Memory(sram.memory.clone()),
            )?;
        }

        let mut csr_constants: Vec<Constant> = array
            .constants
            .iter()
            .map(|(owner, c)| Constant {
                name: format!("{}_{}", owner, c.name).to_uppercase(),
                value: Some(c.value.clone()),
            })
            .collect();
        csr_constants.sort_by(|a, b| a.name.cmp(&b.name));
        let mut derived = csr_constants;
        derived.extend(self.config.iter().map(|(key, value)| Constant {
            name: format!("CONFIG_{}", key),
            value: Some(value.clone()),
        }));

        if let Some(cpu) = self.cpu.as_ref().filter(|c| c.has_interrupt()) {
            let reserved = cpu.reserved_interrupts();
            for (name, id) in self.interrupts.iter() {
                if reserved.contains_key(name) {
                    continue;
                }
                let Some(module) = self.registry.get(name) else {
                    continue;
                };
                if !module.is_interrupt_source() {
                    return Err(SocError::InvalidConfiguration(format!(
                        "Submodule {} does not have an event manager",
                        name
                    )));
                }
                wiring.push(Connection::Interrupt {
                    line: id,
                    source: name.to_string(),
                });
            }
        }

        self.csr_regions = csr_regions;
        self.derived_constants = derived;
        self.wiring = wiring;
        self.interconnect = interconnect;
        self.csr_interconnect = Some(csr_interconnect);
        self.phase = Phase::Finalized;
        self.description = Some(self.build_description());

        info!(
            "SoC finalized: {} memory regions, {} CSR regions, {} interrupts",
            self.memory_regions.regions().len(),
            self.csr_regions.regions().len(),
            self.interrupts.len()
        );
        Ok(())
    }

    fn build_description(&self) -> SocDescription {
        SocDescription {
            cpu_type: self.cpu_kind.map(|k| k.name().to_string()),
            cpu_variant: self.cpu_variant.to_string(),
            memory_regions: self.memory_regions.regions().to_vec(),
            csr_base: self.mem_map.csr | self.shadow_base,
            csr_regions: self.csr_regions.regions().to_vec(),
            constants: self.get_constants(),
            interrupts: self.interrupts.to_map(),
            csrs: self.csrs.to_map(),
            memories: self
                .registry
                .iter()
                .filter_map(|p| {
                    p.memory.as_ref().map(|m| Memory {
                        name: p.name.clone(),
                        size: m.size,
                        read_only: m.read_only,
                        init: m.init.clone(),
                    })
                })
                .collect(),
            bus: self.interconnect.as_ref().map(Interconnect::to_ir),
            wiring: self.wiring.clone(),
        }
    }

    /// Interrupts, then user constants (by name), then CSR and `CONFIG_*` constants once
    /// finalized.
    pub fn get_constants(&self) -> Vec<Constant> {
        let mut constants: Vec<Constant> = self
            .interrupts
            .iter()
            .map(|(name, id)| Constant::new(format!("{}_INTERRUPT", name.to_uppercase()), id))
            .collect();
        let mut user = self.user_constants.clone();
        user.sort_by(|a, b| a.name.cmp(&b.name));
        constants.extend(user);
        constants.extend(self.derived_constants.iter().cloned());
        constants
    }

    pub fn memory_regions(&self) -> &[MemoryRegion] {
        self.memory_regions.regions()
    }

    pub fn csr_regions(&self) -> &[socgen_ir::CsrRegion] {
        self.csr_regions.regions()
    }

    pub fn interrupt_map(&self) -> BTreeMap<String, u32> {
        self.interrupts.to_map()
    }

    pub fn csr_map(&self) -> BTreeMap<String, u32> {
        self.csrs.to_map()
    }

    pub fn cpu(&self) -> Option<&Cpu> {
        self.cpu.as_ref()
    }

    pub fn cpu_variant(&self) -> &CpuVariant {
        &self.cpu_variant
    }

    pub fn cpu_reset_address(&self) -> u64 {
        self.cpu_reset_address
    }

    pub fn mem_map(&self) -> &MemMap {
        &self.mem_map
    }

    pub fn peripherals(&self) -> &PeripheralRegistry {
        &self.registry
    }

    pub fn interconnect(&self) -> Option<&Interconnect> {
        self.interconnect.as_ref()
    }

    pub fn csr_interconnect(&self) -> Option<&CsrInterconnect> {
        self.csr_interconnect.as_ref()
    }

    pub fn wiring(&self) -> &[Connection] {
        &self.wiring
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finalized(&self) -> bool {
        self.phase == Phase::Finalized
    }

    /// The published description; `None` until finalized.
    pub fn description(&self) -> Option<&SocDescription> {
        self.description.as_ref()
    }
}
