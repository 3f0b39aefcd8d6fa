// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use socgen_config::{MemorySpec, SocConfig};
use socgen_core::cpu::{CpuKind, Endianness};
use socgen_core::variant::{BaseVariant, Extension};
use socgen_core::SocCore;

mod manifest;

const EXIT_PASS: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

fn parse_size_arg(s: &str) -> Result<u64, String> {
    socgen_config::parse_size(s).map_err(|e| format!("{:#}", e))
}

#[derive(Parser, Debug)]
#[command(author, version, about = "SocGen SoC integration generator", long_about = None)]
struct Cli {
    /// Enable debug-level logging of every allocation
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble, finalize and write the generated artifacts.
    Build(BuildArgs),

    /// List CPU types, canonical variants, their aliases and extensions.
    Variants,
}

/// Overrides applied on top of the configuration file. Unset flags leave it untouched.
#[derive(Args, Debug, Default)]
struct SocCoreArgs {
    /// CPU type (lm32, mor1kx, picorv32, vexriscv, minerva, rocket, none)
    #[arg(long)]
    cpu_type: Option<String>,

    /// CPU variant, e.g. "lite+debug"
    #[arg(long)]
    cpu_variant: Option<String>,

    /// Size of the integrated (boot) ROM; 0 disables it
    #[arg(long, value_parser = parse_size_arg)]
    integrated_rom_size: Option<u64>,

    /// Size of the integrated main RAM; 0 disables it
    #[arg(long, value_parser = parse_size_arg)]
    integrated_main_ram_size: Option<u64>,

    /// Replace the UART with a register-compatible stub
    #[arg(long)]
    uart_stub: bool,
}

impl SocCoreArgs {
    fn apply(&self, config: &mut SocConfig) {
        if let Some(cpu_type) = &self.cpu_type {
            config.cpu.kind = cpu_type.clone();
        }
        if let Some(variant) = &self.cpu_variant {
            config.cpu.variant = Some(variant.clone());
        }
        if let Some(size) = self.integrated_rom_size {
            config.memory.rom = MemorySpec {
                init: config.memory.rom.init.take(),
                ..MemorySpec::sized(size)
            };
        }
        if let Some(size) = self.integrated_main_ram_size {
            config.memory.main_ram = MemorySpec {
                init: config.memory.main_ram.init.take(),
                ..MemorySpec::sized(size)
            };
        }
        if self.uart_stub {
            config.uart.stub = true;
        }
    }
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Path to the SoC configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    soc: SocCoreArgs,

    /// Initialization image for the ROM (raw binary, JSON region map or ELF)
    #[arg(long)]
    rom_init: Option<PathBuf>,

    /// Directory to write the generated artifacts into
    #[arg(short, long)]
    output_dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    match cli.command {
        Commands::Build(args) => run_build(args),
        Commands::Variants => {
            print_variants();
            ExitCode::from(EXIT_PASS)
        }
    }
}

fn load_config(args: &BuildArgs) -> anyhow::Result<SocConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = SocConfig::from_file(path)?;
            // Init images are relative to the configuration file.
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            for spec in [
                &mut config.memory.rom,
                &mut config.memory.sram,
                &mut config.memory.main_ram,
            ] {
                if let Some(init) = spec.init.as_mut() {
                    if init.is_relative() {
                        *init = base.join(&*init);
                    }
                }
            }
            config
        }
        None => SocConfig::default(),
    };

    args.soc.apply(&mut config);
    if let Some(rom_init) = &args.rom_init {
        config.memory.rom.init = Some(rom_init.clone());
    }
    config.validate().context("Invalid SoC configuration")?;
    Ok(config)
}

fn load_images(soc: &mut SocCore, config: &SocConfig) -> anyhow::Result<()> {
    let endianness = soc
        .cpu()
        .map(|cpu| cpu.endianness())
        .unwrap_or(Endianness::Little);

    for (name, spec) in [
        ("rom", &config.memory.rom),
        ("sram", &config.memory.sram),
        ("main_ram", &config.memory.main_ram),
    ] {
        let Some(path) = &spec.init else {
            continue;
        };
        let region = soc
            .memory_regions()
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .with_context(|| format!("Memory '{}' is not integrated", name))?;
        info!("Loading {} image: {:?}", name, path);
        let words = socgen_loader::get_mem_data_at(path, region.origin, endianness, Some(region.length))
            .with_context(|| format!("Failed to load {} image {:?}", name, path))?;
        soc.initialize_mem(name, words)?;
    }
    Ok(())
}

fn run_build(args: BuildArgs) -> ExitCode {
    info!("Starting SocGen");

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let mut soc = match SocCore::new(&config) {
        Ok(soc) => soc,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    if let Err(e) = load_images(&mut soc, &config) {
        error!("{:#}", e);
        return ExitCode::from(EXIT_RUNTIME_ERROR);
    }

    if let Err(e) = soc.finalize() {
        error!("{}", e);
        return ExitCode::from(EXIT_CONFIG_ERROR);
    }

    let Some(desc) = soc.description() else {
        error!("SoC description missing after finalize");
        return ExitCode::from(EXIT_RUNTIME_ERROR);
    };

    let artifacts = match socgen_codegen::generate_all(desc) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    match manifest::write_artifacts(&args.output_dir, &config, &artifacts) {
        Ok(manifest) => {
            for entry in &manifest.artifacts {
                info!("Wrote {} ({})", entry.file, entry.sha256);
            }
            info!(
                "Build complete: {} memory regions, {} CSR regions, {} constants",
                desc.memory_regions.len(),
                desc.csr_regions.len(),
                desc.constants.len()
            );
            ExitCode::from(EXIT_PASS)
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

fn print_variants() {
    let cpus: Vec<&str> = CpuKind::ALL.iter().map(|k| k.name()).collect();
    println!("CPU types: {}, none", cpus.join(", "));
    println!("Variants:");
    for variant in BaseVariant::ALL {
        println!("  {:<10} aliases: {}", variant.name(), variant.aliases().join(", "));
    }
    println!("Extensions:");
    for ext in Extension::ALL {
        println!("  +{}", ext.name());
    }
}
