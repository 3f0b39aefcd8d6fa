// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{MemoryBlock, Peripheral, PeripheralKind};
use crate::bus::BusInterface;

/// Integrated on-chip memory with a bus slave port named `<name>_bus`.
pub fn integrated(name: &str, size: u64, read_only: bool) -> Peripheral {
    let mut p = Peripheral::new(name, PeripheralKind::Memory)
        .with_bus(BusInterface::wishbone(format!("{}_bus", name)));
    p.memory = Some(MemoryBlock {
        size,
        read_only,
        init: Vec::new(),
    });
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrated_rom() {
        let rom = integrated("rom", 0x8000, true);
        assert_eq!(rom.bus.as_ref().unwrap().name, "rom_bus");
        let block = rom.memory.unwrap();
        assert!(block.read_only);
        assert_eq!(block.size, 0x8000);
    }
}
