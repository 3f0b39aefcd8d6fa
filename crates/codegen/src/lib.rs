//! Emitters for the artifacts firmware builds consume from a finalized SoC.

use anyhow::{Context, Result};
use socgen_ir::SocDescription;
use std::fmt::Write;

mod c_header;
mod rust;

pub use c_header::CHeaderGenerator;
pub use rust::RustGenerator;

/// A generated file, named relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: &'static str,
    pub contents: String,
}

pub struct LinkerGenerator;

impl LinkerGenerator {
    /// GNU ld `MEMORY` block, one line per memory region.
    pub fn regions(desc: &SocDescription) -> String {
        let mut out = String::from("MEMORY {\n");
        for region in &desc.memory_regions {
            let _ = writeln!(
                out,
                "\t{} : ORIGIN = 0x{:08x}, LENGTH = 0x{:08x}",
                region.name, region.origin, region.length
            );
        }
        out.push_str("}\n");
        out
    }
}

/// Every artifact, in a fixed order.
pub fn generate_all(desc: &SocDescription) -> Result<Vec<Artifact>> {
    let json = desc.to_json().context("Failed to serialize SoC description")?;
    Ok(vec![
        Artifact {
            file_name: "csr.h",
            contents: CHeaderGenerator::csr_header(desc),
        },
        Artifact {
            file_name: "mem.h",
            contents: CHeaderGenerator::mem_header(desc),
        },
        Artifact {
            file_name: "soc.h",
            contents: CHeaderGenerator::soc_header(desc),
        },
        Artifact {
            file_name: "regions.ld",
            contents: LinkerGenerator::regions(desc),
        },
        Artifact {
            file_name: "generated.rs",
            contents: RustGenerator::generate(desc)?,
        },
        Artifact {
            file_name: "soc.json",
            contents: json,
        },
    ])
}
