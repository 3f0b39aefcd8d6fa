// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{Peripheral, PeripheralKind};
use crate::csr::CsrRegisterDef;

pub const NAME: &str = "ctrl";
pub const SCRATCH_RESET: u64 = 0x1234_5678;

/// SoC controller: software reset, a scratch register and a saturating bus-error counter.
pub fn controller() -> Peripheral {
    Peripheral::new(NAME, PeripheralKind::Controller)
        .with_csr(CsrRegisterDef::trigger("reset"))
        .with_csr(CsrRegisterDef::storage("scratch", 32, SCRATCH_RESET))
        .with_csr(CsrRegisterDef::status("bus_errors", 32))
}
