// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{EventManager, Peripheral, PeripheralKind};
use crate::csr::CsrRegisterDef;

/// Periodic down-counting timer raising a `zero` event.
pub fn timer(name: &str) -> Peripheral {
    Peripheral::new(name, PeripheralKind::Timer)
        .with_csr(CsrRegisterDef::storage("load", 32, 0))
        .with_csr(CsrRegisterDef::storage("reload", 32, 0))
        .with_csr(CsrRegisterDef::storage("en", 1, 0))
        .with_csr(CsrRegisterDef::trigger("update_value"))
        .with_csr(CsrRegisterDef::status("value", 32))
        .with_event_manager(EventManager::new(&["zero"]))
}
