// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{Peripheral, PeripheralKind};
use crate::csr::CsrMemoryDef;

pub const NAME: &str = "identifier";
pub const MEMORY: &str = "mem";

/// Read-only, NUL-terminated identification string exposed as a CSR memory.
pub fn identifier(ident: &str) -> Peripheral {
    let init: Vec<u64> = ident
        .bytes()
        .chain(std::iter::once(0))
        .map(u64::from)
        .collect();
    Peripheral::new(NAME, PeripheralKind::Identifier).with_csr_memory(CsrMemoryDef {
        name: MEMORY.to_string(),
        width: 8,
        depth: init.len() as u32,
        read_only: true,
        init,
    })
}
