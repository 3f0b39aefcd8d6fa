// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{ResourceKind, SocError, SocResult};
use socgen_ir::{CsrPayload, CsrRegion, MemoryRegion};

/// Append-only set of named, pairwise disjoint address ranges.
#[derive(Debug, Clone, Default)]
pub struct RegionTracker {
    regions: Vec<MemoryRegion>,
}

impl RegionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `[origin, origin + length)`. Regions that merely touch do not conflict.
    pub fn add(&mut self, name: &str, origin: u64, length: u64) -> SocResult<()> {
        if length == 0 {
            return Err(SocError::InvalidConfiguration(format!(
                "memory region '{}' at {:#x} has zero length",
                name, origin
            )));
        }
        if origin.checked_add(length).is_none() {
            return Err(SocError::OutOfRange {
                kind: ResourceKind::MemoryRegion,
                name: name.to_string(),
                value: origin,
                max: u64::MAX - length,
                hint: Some(format!("length {:#x} wraps the address space", length)),
            });
        }

        let region = MemoryRegion {
            name: name.to_string(),
            origin,
            length,
        };
        if let Some(other) = self
            .regions
            .iter()
            .find(|r| r.name == region.name || r.overlaps(&region))
        {
            return Err(SocError::Conflict {
                kind: ResourceKind::MemoryRegion,
                existing: other.name.clone(),
                requested: name.to_string(),
                detail: Some(format!(
                    "[{:#x}, {:#x}) vs [{:#x}, {:#x})",
                    other.origin,
                    other.end(),
                    region.origin,
                    region.end()
                )),
            });
        }

        tracing::debug!(
            "Memory region '{}': {:#010x}..{:#010x}",
            name,
            origin,
            region.end()
        );
        self.regions.push(region);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Regions in registration order.
    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }
}

/// CSR regions, unique by name and by exact origin.
#[derive(Debug, Clone, Default)]
pub struct CsrRegionTable {
    regions: Vec<CsrRegion>,
}

impl CsrRegionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, origin: u64, busword: u32, payload: CsrPayload) -> SocResult<()> {
        if let Some(other) = self
            .regions
            .iter()
            .find(|r| r.name == name || r.origin == origin)
        {
            return Err(SocError::Conflict {
                kind: ResourceKind::CsrRegion,
                existing: other.name.clone(),
                requested: name.to_string(),
                detail: Some(format!("origin {:#x}", origin)),
            });
        }
        tracing::debug!("CSR region '{}' @ {:#010x}", name, origin);
        self.regions.push(CsrRegion {
            name: name.to_string(),
            origin,
            busword,
            payload,
        });
        Ok(())
    }

    pub fn regions(&self) -> &[CsrRegion] {
        &self.regions
    }
}
