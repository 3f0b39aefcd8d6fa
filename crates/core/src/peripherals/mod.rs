// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Explicit peripheral registry.
//!
//! Every submodule the assembler knows about is declared here by name, together with the
//! capabilities finalize needs: CSR registers, CSR-mapped memories, CSR constants, an optional
//! event manager (interrupt source) and an optional integrated memory block.

pub mod ctrl;
pub mod identifier;
pub mod sram;
pub mod timer;
pub mod uart;

use crate::bus::{BusInterface, BusSlave};
use crate::csr::{CsrConstantDef, CsrMemoryDef, CsrRegisterDef};
use crate::{ResourceKind, SocError, SocResult};
use socgen_ir::ConstantValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeripheralKind {
    Controller,
    UartPhy,
    Uart,
    UartStub,
    Timer,
    Identifier,
    Memory,
    Custom(String),
}

/// Interrupt-request aggregation: one IRQ output fed by named event sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventManager {
    pub sources: Vec<String>,
}

impl EventManager {
    pub fn new(sources: &[&str]) -> Self {
        Self {
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The `ev_status` / `ev_pending` / `ev_enable` registers it adds to its owner.
    pub fn csrs(&self) -> Vec<CsrRegisterDef> {
        let width = self.sources.len().max(1) as u32;
        vec![
            CsrRegisterDef::status("ev_status", width),
            CsrRegisterDef::storage("ev_pending", width, 0),
            CsrRegisterDef::storage("ev_enable", width, 0),
        ]
    }
}

/// A directly bus-mapped memory (ROM/SRAM/main RAM).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBlock {
    pub size: u64,
    pub read_only: bool,
    /// 32-bit words, already in CPU endianness.
    pub init: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peripheral {
    pub name: String,
    pub kind: PeripheralKind,
    pub csrs: Vec<CsrRegisterDef>,
    pub csr_memories: Vec<CsrMemoryDef>,
    pub csr_constants: Vec<CsrConstantDef>,
    pub event_manager: Option<EventManager>,
    pub bus: Option<BusInterface>,
    pub memory: Option<MemoryBlock>,
}

impl Peripheral {
    pub fn new(name: &str, kind: PeripheralKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            csrs: Vec::new(),
            csr_memories: Vec::new(),
            csr_constants: Vec::new(),
            event_manager: None,
            bus: None,
            memory: None,
        }
    }

    pub fn custom(name: &str) -> Self {
        Self::new(name, PeripheralKind::Custom(name.to_string()))
    }

    pub fn with_csr(mut self, csr: CsrRegisterDef) -> Self {
        self.csrs.push(csr);
        self
    }

    pub fn with_csr_memory(mut self, memory: CsrMemoryDef) -> Self {
        self.csr_memories.push(memory);
        self
    }

    pub fn with_constant(mut self, name: &str, value: impl Into<ConstantValue>) -> Self {
        self.csr_constants.push(CsrConstantDef {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    /// Attach an event manager; its registers are appended to the bank.
    pub fn with_event_manager(mut self, ev: EventManager) -> Self {
        self.csrs.extend(ev.csrs());
        self.event_manager = Some(ev);
        self
    }

    pub fn with_bus(mut self, bus: BusInterface) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn is_interrupt_source(&self) -> bool {
        self.event_manager.is_some()
    }
}

/// Everything registered during the building phase, consumed at finalize.
#[derive(Debug, Default)]
pub struct PeripheralRegistry {
    submodules: BTreeMap<String, Peripheral>,
    pub bus_masters: Vec<BusInterface>,
    pub bus_slaves: Vec<BusSlave>,
    /// Not arbitrated against each other.
    pub csr_masters: Vec<BusInterface>,
}

impl PeripheralRegistry {
    pub fn add(&mut self, peripheral: Peripheral) -> SocResult<()> {
        if self.submodules.contains_key(&peripheral.name) {
            return Err(SocError::Conflict {
                kind: ResourceKind::Peripheral,
                existing: peripheral.name.clone(),
                requested: peripheral.name,
                detail: Some("submodule already declared".to_string()),
            });
        }
        tracing::debug!("Peripheral '{}' ({:?})", peripheral.name, peripheral.kind);
        self.submodules.insert(peripheral.name.clone(), peripheral);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Peripheral> {
        self.submodules.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Peripheral> {
        self.submodules.get_mut(name)
    }

    /// Peripherals sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Peripheral> {
        self.submodules.values()
    }

    pub fn len(&self) -> usize {
        self.submodules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submodules.is_empty()
    }
}
