// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use socgen_config::{MemorySpec, SocConfig};
use socgen_core::{IdentifierAllocator, ResourceKind, SocCore};

fn bench_first_fit(c: &mut Criterion) {
    let names: Vec<String> = (0..512).map(|i| format!("bank{}", i)).collect();

    c.bench_function("first_fit_512_csrs", |b| {
        b.iter(|| {
            let mut csrs = IdentifierAllocator::with_address_width(ResourceKind::Csr, 14);
            for name in &names {
                black_box(csrs.register(name, None, false).ok());
            }
        })
    });

    c.bench_function("first_fit_after_fragmentation", |b| {
        let mut base = IdentifierAllocator::with_address_width(ResourceKind::Csr, 14);
        for id in (0..1024).step_by(2) {
            let _ = base.register(&format!("even{}", id), Some(id), false);
        }
        b.iter(|| {
            let mut csrs = base.clone();
            for name in names.iter().take(64) {
                black_box(csrs.register(name, None, false).ok());
            }
        })
    });
}

fn bench_finalize(c: &mut Criterion) {
    let mut config = SocConfig::default();
    config.memory.rom = MemorySpec::sized(0x8000);
    c.bench_function("build_and_finalize_default_soc", |b| {
        b.iter(|| {
            let mut soc = SocCore::new(black_box(&config)).ok();
            if let Some(soc) = soc.as_mut() {
                black_box(soc.finalize().ok());
            }
        })
    });
}

criterion_group!(benches, bench_first_fit, bench_finalize);
criterion_main!(benches);
