use socgen_config::{MemorySpec, SocConfig};
use socgen_core::bus::BusInterface;
use socgen_core::cpu::{Cpu, CpuKind};
use socgen_core::csr::CsrRegisterDef;
use socgen_core::peripherals::{EventManager, Peripheral};
use socgen_core::{CpuVariant, MemoryInit, SocCore, SocError};
use socgen_ir::{Connection, ConstantValue, CsrPayload};

fn bare_config(cpu: &str) -> SocConfig {
    let mut config = SocConfig::default();
    config.cpu.kind = cpu.to_string();
    config.memory.sram = MemorySpec::default();
    config.with_ctrl = false;
    config.with_timer = false;
    config.uart.enabled = false;
    config
}

fn default_with_rom() -> SocConfig {
    let mut config = SocConfig::default();
    config.memory.rom = MemorySpec::sized(0x8000);
    config
}

fn names(soc: &SocCore) -> Vec<String> {
    soc.get_constants().into_iter().map(|c| c.name).collect()
}

#[test]
fn test_cpu_with_rom_and_sram_finalizes() {
    let mut config = bare_config("vexriscv");
    config.shadow_base = 0;
    let mut soc = SocCore::bare(&config).unwrap();
    soc.add_cpu(Cpu::new(CpuKind::VexRiscv, CpuVariant::default(), 0))
        .unwrap();
    soc.add_memory_region("rom", 0, 0x2000).unwrap();
    soc.add_memory_region("sram", 0x1000_0000, 0x1000).unwrap();

    soc.add_peripheral(Peripheral::custom("leds").with_csr(CsrRegisterDef::storage("out", 8, 0)))
        .unwrap();
    soc.add_peripheral(Peripheral::custom("buttons").with_csr(CsrRegisterDef::status("in", 4)))
        .unwrap();
    assert_eq!(soc.add_csr("leds", None, false).unwrap(), 0);
    assert_eq!(soc.add_csr("buttons", None, false).unwrap(), 1);

    soc.finalize().unwrap();

    let desc = soc.description().unwrap();
    let csr_base = config.mem_map.csr;
    assert_eq!(desc.csr_region("leds").unwrap().origin, csr_base);
    assert_eq!(desc.csr_region("buttons").unwrap().origin, csr_base + 0x800);
    assert_eq!(desc.memory_region("rom").unwrap().length, 0x2000);
}

#[test]
fn test_shadow_base_applied_to_csr_regions() {
    let mut config = bare_config("none");
    config.with_ctrl = true;
    let mut soc = SocCore::new(&config).unwrap();
    soc.add_peripheral(Peripheral::custom("leds").with_csr(CsrRegisterDef::storage("out", 8, 0)))
        .unwrap();
    assert_eq!(soc.add_csr("leds", None, false).unwrap(), 1);
    soc.finalize().unwrap();

    let regions = soc.csr_regions();
    assert_eq!(regions[0].name, "ctrl");
    assert_eq!(regions[0].origin, 0xe000_0000);
    assert_eq!(regions[1].name, "leds");
    assert_eq!(regions[1].origin, 0xe000_0800);
}

#[test]
fn test_cpu_without_sram_is_rejected() {
    let mut soc = SocCore::bare(&bare_config("vexriscv")).unwrap();
    soc.add_cpu(Cpu::new(CpuKind::VexRiscv, CpuVariant::default(), 0))
        .unwrap();
    soc.add_memory_region("rom", 0, 0x2000).unwrap();

    let err = soc.finalize().unwrap_err();
    assert!(matches!(err, SocError::InvalidConfiguration(_)));
    assert!(err.to_string().contains("sram"));
    assert!(!soc.is_finalized());

    // No second chance: the build must be restarted from scratch.
    assert!(matches!(
        soc.add_memory_region("sram", 0x1000_0000, 0x1000).unwrap_err(),
        SocError::FinalizeViolation(_)
    ));
    assert!(matches!(
        soc.finalize().unwrap_err(),
        SocError::FinalizeViolation(_)
    ));
    assert!(soc.description().is_none());
}

#[test]
fn test_oversized_bank_stride_is_rejected() {
    let mut config = default_with_rom();
    config.csr.bank_stride = 0x4000_0000_0000_0000;
    let err = SocCore::new(&config).unwrap_err();
    assert!(matches!(err, SocError::InvalidConfiguration(_)));
    assert!(err.to_string().contains("stride"));
}

#[test]
fn test_frozen_after_finalize() {
    let mut soc = SocCore::new(&bare_config("none")).unwrap();
    soc.finalize().unwrap();

    assert!(matches!(
        soc.finalize().unwrap_err(),
        SocError::FinalizeViolation(_)
    ));
    assert!(matches!(
        soc.add_interrupt("late", None, false).unwrap_err(),
        SocError::FinalizeViolation(_)
    ));
    assert!(matches!(
        soc.add_csr("late", None, false).unwrap_err(),
        SocError::FinalizeViolation(_)
    ));
    assert!(matches!(
        soc.add_memory_region("late", 0x9000_0000, 0x100).unwrap_err(),
        SocError::FinalizeViolation(_)
    ));
    assert!(matches!(
        soc.add_bus_master(BusInterface::wishbone("dma")).unwrap_err(),
        SocError::FinalizeViolation(_)
    ));
    assert!(matches!(
        soc.add_constant("LATE", None).unwrap_err(),
        SocError::FinalizeViolation(_)
    ));
}

#[test]
fn test_default_soc_layout() {
    let mut soc = SocCore::new(&default_with_rom()).unwrap();

    let csrs = soc.csr_map();
    assert_eq!(csrs["ctrl"], 0);
    assert_eq!(csrs["cpu"], 1);
    assert_eq!(csrs["uart_phy"], 2);
    assert_eq!(csrs["uart"], 3);
    assert_eq!(csrs["timer0"], 4);

    let irqs = soc.interrupt_map();
    assert_eq!(irqs["uart"], 0);
    assert_eq!(irqs["timer0"], 1);

    soc.finalize().unwrap();

    assert_eq!(
        names(&soc),
        vec![
            "TIMER0_INTERRUPT",
            "UART_INTERRUPT",
            "CSR_DATA_WIDTH",
            "SYSTEM_CLOCK_FREQUENCY",
            "CONFIG_CLOCK_FREQUENCY",
            "CONFIG_CPU_RESET_ADDR",
            "CONFIG_CPU_TYPE",
            "CONFIG_CPU_VARIANT",
            "CONFIG_CSR_DATA_WIDTH",
        ]
    );

    let desc = soc.description().unwrap();
    assert_eq!(
        desc.constant("CONFIG_CPU_TYPE").unwrap().value,
        Some(ConstantValue::Str("VEXRISCV".to_string()))
    );
    assert_eq!(
        desc.constant("CONFIG_CPU_VARIANT").unwrap().value,
        Some(ConstantValue::Str("STANDARD".to_string()))
    );

    let regions: Vec<(&str, u64)> = desc
        .memory_regions
        .iter()
        .map(|r| (r.name.as_str(), r.origin))
        .collect();
    assert_eq!(regions, vec![("rom", 0x0), ("sram", 0x1000_0000)]);

    assert_eq!(desc.csr_region("uart_phy").unwrap().origin, 0xe000_1000);
    assert_eq!(desc.csr_region("timer0").unwrap().origin, 0xe000_2000);

    assert_eq!(
        soc.wiring(),
        &[
            Connection::CpuReset,
            Connection::BusErrorCounter,
            Connection::Interrupt {
                line: 1,
                source: "timer0".to_string()
            },
            Connection::Interrupt {
                line: 0,
                source: "uart".to_string()
            },
        ]
    );

    let bus = desc.bus.as_ref().unwrap();
    assert_eq!(bus.masters, vec!["cpu_ibus", "cpu_dbus"]);
    assert_eq!(bus.timeout_cycles, Some(1_000_000));
}

#[test]
fn test_no_bus_error_wiring_without_timeout() {
    let mut config = default_with_rom();
    config.bus.timeout_cycles = None;
    let mut soc = SocCore::new(&config).unwrap();
    soc.finalize().unwrap();
    assert!(!soc.wiring().contains(&Connection::BusErrorCounter));
    assert!(soc.interconnect().is_some());
}

#[test]
fn test_interrupt_source_needs_event_manager() {
    let mut soc = SocCore::bare(&bare_config("picorv32")).unwrap();
    soc.add_cpu(Cpu::new(CpuKind::PicoRv32, CpuVariant::default(), 0))
        .unwrap();
    soc.add_memory_region("rom", 0, 0x2000).unwrap();
    soc.add_memory_region("sram", 0x1000_0000, 0x1000).unwrap();
    soc.add_peripheral(Peripheral::custom("gpio").with_csr(CsrRegisterDef::status("in", 8)))
        .unwrap();
    soc.add_csr("gpio", None, false).unwrap();
    soc.add_interrupt("gpio", None, false).unwrap();

    let err = soc.finalize().unwrap_err();
    assert!(err.to_string().contains("gpio"));
    assert!(err.to_string().contains("event manager"));
}

#[test]
fn test_interrupt_without_submodule_is_not_wired() {
    let mut soc = SocCore::bare(&bare_config("vexriscv")).unwrap();
    soc.add_cpu(Cpu::new(CpuKind::VexRiscv, CpuVariant::default(), 0))
        .unwrap();
    soc.add_memory_region("rom", 0, 0x2000).unwrap();
    soc.add_memory_region("sram", 0x1000_0000, 0x1000).unwrap();
    soc.add_peripheral(
        Peripheral::custom("gpio")
            .with_csr(CsrRegisterDef::status("in", 8))
            .with_event_manager(EventManager::new(&["change"])),
    )
    .unwrap();
    soc.add_csr("gpio", None, false).unwrap();
    soc.add_interrupt("external", Some(5), false).unwrap();
    soc.add_interrupt("gpio", None, false).unwrap();

    soc.finalize().unwrap();
    assert_eq!(
        soc.wiring(),
        &[Connection::Interrupt {
            line: 0,
            source: "gpio".to_string()
        }]
    );
}

#[test]
fn test_picorv32_reserves_low_interrupts() {
    let mut config = default_with_rom();
    config.cpu.kind = "picorv32".to_string();
    let mut soc = SocCore::new(&config).unwrap();
    let irqs = soc.interrupt_map();
    assert_eq!(irqs["timer"], 0);
    assert_eq!(irqs["ebreak_ecall_illegal"], 1);
    assert_eq!(irqs["bus_error"], 2);
    assert_eq!(irqs["uart"], 3);
    assert_eq!(irqs["timer0"], 4);
    soc.finalize().unwrap();
}

#[test]
fn test_rocket_moves_rom_and_sram() {
    let mut config = default_with_rom();
    config.cpu.kind = "rocket".to_string();
    let soc = SocCore::new(&config).unwrap();
    assert_eq!(soc.cpu_reset_address(), 0x1000_0000);
    let rom = &soc.memory_regions()[0];
    assert_eq!((rom.name.as_str(), rom.origin), ("rom", 0x1000_0000));
    let sram = &soc.memory_regions()[1];
    assert_eq!((sram.name.as_str(), sram.origin), ("sram", 0x2000_0000));
}

#[test]
fn test_user_maps_reserve_ids_first() {
    let mut config = default_with_rom();
    config.csr_map.insert("ctrl".to_string(), 7);
    config.csr_map.insert("dma".to_string(), 0);
    config.interrupt_map.insert("uart".to_string(), 4);
    let soc = SocCore::new(&config).unwrap();

    let csrs = soc.csr_map();
    assert_eq!(csrs["dma"], 0);
    assert_eq!(csrs["ctrl"], 7);
    assert_eq!(csrs["cpu"], 1);
    assert_eq!(soc.interrupt_map()["uart"], 4);
    assert_eq!(soc.interrupt_map()["timer0"], 0);
}

#[test]
fn test_bad_variant_lists_choices() {
    let mut config = default_with_rom();
    config.cpu.variant = Some("bogus".to_string());
    let err = SocCore::new(&config).err().unwrap();
    assert!(matches!(err, SocError::InvalidVariant { .. }));
    let msg = err.to_string();
    for base in ["minimal", "lite", "standard", "full", "linux"] {
        assert!(msg.contains(base), "missing {} in {}", base, msg);
    }
}

#[test]
fn test_variant_is_canonicalized_in_config() {
    let mut config = default_with_rom();
    config.cpu.variant = Some("lite_debug".to_string());
    let mut soc = SocCore::new(&config).unwrap();
    assert_eq!(soc.cpu_variant().to_string(), "lite+debug");
    soc.finalize().unwrap();
    assert_eq!(
        soc.description().unwrap().constant("CONFIG_CPU_VARIANT").unwrap().value,
        Some(ConstantValue::Str("LITE+DEBUG".to_string()))
    );
}

#[test]
fn test_identifier_is_csr_memory() {
    let mut config = default_with_rom();
    config.ident = "SocGen test".to_string();
    let mut soc = SocCore::new(&config).unwrap();
    assert_eq!(soc.get_csr_dev_address("identifier_mem").unwrap(), 4);
    soc.finalize().unwrap();

    let region = soc.description().unwrap().csr_region("identifier_mem").unwrap();
    match &region.payload {
        CsrPayload::Memory(mem) => {
            assert_eq!(mem.depth, 12);
            assert!(mem.read_only);
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_identifier_version_suffix_is_reproducible() {
    let mut config = default_with_rom();
    config.ident = "SocGen test".to_string();
    config.ident_version = true;
    let expected = format!("SocGen test {}", env!("CARGO_PKG_VERSION"));

    let build = || {
        let mut soc = SocCore::new(&config).unwrap();
        soc.finalize().unwrap();
        soc.description().unwrap().clone()
    };
    let first = build();
    match &first.csr_region("identifier_mem").unwrap().payload {
        CsrPayload::Memory(mem) => assert_eq!(mem.depth as usize, expected.len() + 1),
        other => panic!("unexpected payload {:?}", other),
    }
    assert_eq!(first, build());
}

#[test]
fn test_unknown_csr_lists_available() {
    let soc = SocCore::new(&default_with_rom()).unwrap();
    let err = soc.get_csr_dev_address("spi").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Undefined \"spi\" CSR"));
    assert!(msg.contains("- ctrl"));
    assert!(msg.contains("- timer0"));
}

#[test]
fn test_memory_init_lands_in_description() {
    let init = MemoryInit {
        rom: vec![0x0000_006f, 0xdead_beef],
        ..MemoryInit::default()
    };
    let mut soc = SocCore::with_init(&default_with_rom(), init).unwrap();
    soc.finalize().unwrap();
    let rom = soc
        .description()
        .unwrap()
        .memories
        .iter()
        .find(|m| m.name == "rom")
        .unwrap();
    assert!(rom.read_only);
    assert_eq!(rom.init, vec![0x0000_006f, 0xdead_beef]);
}

#[test]
fn test_repeated_builds_are_identical() {
    let build = || {
        let mut soc = SocCore::new(&default_with_rom()).unwrap();
        soc.finalize().unwrap();
        soc.description().unwrap().to_json().unwrap()
    };
    assert_eq!(build(), build());
}

#[test]
fn test_overlapping_main_ram_rejected() {
    let mut config = default_with_rom();
    config.memory.main_ram = MemorySpec::sized(0x1000);
    config.mem_map.main_ram = 0x1000_0800;
    let err = SocCore::new(&config).err().unwrap();
    assert!(matches!(err, SocError::Conflict { .. }));
}
