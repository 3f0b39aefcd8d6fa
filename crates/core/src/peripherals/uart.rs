// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{EventManager, Peripheral, PeripheralKind};
use crate::csr::CsrRegisterDef;

pub const PHY_NAME: &str = "uart_phy";
pub const NAME: &str = "uart";

/// Phase-accumulator increment for the RS232 PHY: `baudrate / clk_freq * 2^32`.
pub fn tuning_word(baudrate: u32, clk_freq: u64) -> u64 {
    ((u128::from(baudrate) << 32) / u128::from(clk_freq.max(1))) as u64
}

/// RS232 PHY clocked at `clk_freq`.
pub fn phy(baudrate: u32, clk_freq: u64) -> Peripheral {
    Peripheral::new(PHY_NAME, PeripheralKind::UartPhy).with_csr(CsrRegisterDef::storage(
        "tuning_word",
        32,
        tuning_word(baudrate, clk_freq),
    ))
}

fn with_uart_registers(p: Peripheral) -> Peripheral {
    p.with_csr(CsrRegisterDef::storage("rxtx", 8, 0))
        .with_csr(CsrRegisterDef::status("txfull", 1))
        .with_csr(CsrRegisterDef::status("rxempty", 1))
        .with_event_manager(EventManager::new(&["tx", "rx"]))
}

pub fn uart() -> Peripheral {
    with_uart_registers(Peripheral::new(NAME, PeripheralKind::Uart))
}

/// Register-compatible UART that never transmits; used for simulation builds.
pub fn stub() -> Peripheral {
    with_uart_registers(Peripheral::new(NAME, PeripheralKind::UartStub))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuning_word() {
        // 115200 baud at 100 MHz
        assert_eq!(tuning_word(115_200, 100_000_000), 4_947_802);
        assert_eq!(tuning_word(1, 1), 1 << 32);
    }

    #[test]
    fn test_stub_matches_uart_layout() {
        let real = uart();
        let stub = stub();
        assert_eq!(real.csrs, stub.csrs);
        assert!(stub.is_interrupt_source());
        assert_eq!(stub.kind, PeripheralKind::UartStub);
    }
}
