// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Memory initialization images.
//!
//! An image is a set of byte segments placed at offsets inside a memory. It can come from a
//! raw binary (placed at offset 0), a JSON region map `{"file.bin": "0x100"}` or an ELF file
//! (`PT_LOAD` segments, placed relative to the memory origin). The result is packed into
//! 32-bit words in the CPU's byte order, with the final short word zero padded.

use anyhow::{anyhow, bail, Context, Result};
use goblin::elf::program_header::PT_LOAD;
use goblin::elf::Elf;
use socgen_core::cpu::Endianness;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// Largest image packed when the target memory size is unknown.
pub const MAX_UNSIZED_IMAGE: u64 = 256 * 1024 * 1024;

/// Bytes to place at `offset` from the start of the memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub offset: u64,
    pub data: Vec<u8>,
}

/// A loaded image, not yet packed into words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemImage {
    pub segments: Vec<Segment>,
}

impl MemImage {
    pub fn add_segment(&mut self, offset: u64, data: Vec<u8>) {
        self.segments.push(Segment { offset, data });
    }

    /// Highest byte offset written by any segment.
    pub fn data_size(&self) -> Result<u64> {
        let mut size = 0;
        for segment in &self.segments {
            let end = u64::try_from(segment.data.len())
                .ok()
                .and_then(|len| segment.offset.checked_add(len))
                .ok_or_else(|| {
                    anyhow!(
                        "Segment at {:#x} ({} bytes) overflows the address space",
                        segment.offset,
                        segment.data.len()
                    )
                })?;
            size = size.max(end);
        }
        Ok(size)
    }

    /// Pack into `ceil(data_size / 4)` words. Later segments overwrite earlier ones.
    pub fn to_words(&self, endianness: Endianness, mem_size: Option<u64>) -> Result<Vec<u32>> {
        let data_size = self.data_size()?;
        if data_size == 0 {
            bail!("Memory image is empty");
        }
        match mem_size {
            Some(mem_size) if data_size > mem_size => {
                bail!("file is too big: {}/{} bytes", data_size, mem_size);
            }
            None if data_size > MAX_UNSIZED_IMAGE => {
                bail!(
                    "file is too big: {}/{} bytes (no memory size given)",
                    data_size,
                    MAX_UNSIZED_IMAGE
                );
            }
            _ => {}
        }

        let word_count = usize::try_from(data_size.div_ceil(4))
            .map_err(|_| anyhow!("image of {} bytes does not fit in memory", data_size))?;
        let mut bytes = vec![0u8; word_count * 4];
        for segment in &self.segments {
            // In bounds: every segment ends at or below data_size.
            let start = usize::try_from(segment.offset)?;
            bytes[start..start + segment.data.len()].copy_from_slice(&segment.data);
        }

        let words = bytes
            .chunks_exact(4)
            .map(|w| {
                let w = [w[0], w[1], w[2], w[3]];
                match endianness {
                    Endianness::Big => u32::from_be_bytes(w),
                    Endianness::Little => u32::from_le_bytes(w),
                }
            })
            .collect();
        Ok(words)
    }
}

/// Load `path` and pack it for a memory of `mem_size` bytes.
///
/// ELF segments are placed relative to the lowest loadable address.
pub fn get_mem_data(path: &Path, endianness: Endianness, mem_size: Option<u64>) -> Result<Vec<u32>> {
    load_image(path, None)?.to_words(endianness, mem_size)
}

/// Like [`get_mem_data`], with ELF segments placed relative to the memory at `origin`.
pub fn get_mem_data_at(
    path: &Path,
    origin: u64,
    endianness: Endianness,
    mem_size: Option<u64>,
) -> Result<Vec<u32>> {
    load_image(path, Some(origin))?.to_words(endianness, mem_size)
}

pub fn load_image(path: &Path, origin: Option<u64>) -> Result<MemImage> {
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        return load_region_map(path);
    }
    let buffer = fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;
    if buffer.starts_with(ELF_MAGIC) {
        load_elf_bytes(&buffer, origin)
    } else {
        info!("Raw image {:?}: {} bytes", path, buffer.len());
        let mut image = MemImage::default();
        image.add_segment(0, buffer);
        Ok(image)
    }
}

/// A JSON object mapping file names (relative to the map) to hexadecimal offsets.
pub fn load_region_map(path: &Path) -> Result<MemImage> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read region map: {:?}", path))?;
    let regions: BTreeMap<String, String> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse region map: {:?}", path))?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut image = MemImage::default();
    for (file, base) in &regions {
        let offset = parse_hex(base)
            .with_context(|| format!("Invalid base for '{}' in {:?}", file, path))?;
        let file_path: PathBuf = dir.join(file);
        let data = fs::read(&file_path)
            .with_context(|| format!("Failed to read region file: {:?}", file_path))?;
        debug!("Region {:?} at {:#x}: {} bytes", file_path, offset, data.len());
        image.add_segment(offset, data);
    }
    Ok(image)
}

pub fn load_elf_bytes(buffer: &[u8], origin: Option<u64>) -> Result<MemImage> {
    let elf = Elf::parse(buffer).context("Failed to parse ELF binary")?;
    info!("ELF Entry Point: {:#x}", elf.entry);

    let loadable: Vec<_> = elf
        .program_headers
        .iter()
        .filter(|ph| ph.p_type == PT_LOAD && ph.p_filesz > 0)
        .collect();
    if loadable.is_empty() {
        warn!("No loadable segments found in ELF file");
        return Ok(MemImage::default());
    }

    let origin = match origin {
        Some(origin) => origin,
        None => loadable.iter().map(|ph| ph.p_paddr).min().unwrap_or(0),
    };

    let mut image = MemImage::default();
    for ph in loadable {
        let start_addr = ph.p_paddr;
        let offset = usize::try_from(ph.p_offset).context("Segment offset out of range")?;
        let size = usize::try_from(ph.p_filesz).context("Segment size out of range")?;
        if start_addr < origin {
            bail!(
                "Segment at {:#x} lies below the memory origin {:#x}",
                start_addr,
                origin
            );
        }
        let end = offset
            .checked_add(size)
            .filter(|end| *end <= buffer.len())
            .ok_or_else(|| {
                anyhow!(
                    "Segment out of bounds in ELF file: offset {:#x}, {} bytes, file is {} bytes",
                    offset,
                    size,
                    buffer.len()
                )
            })?;
        debug!(
            "Found Loadable Segment: Addr={:#x}, Size={} bytes, Offset={:#x}",
            start_addr, size, offset
        );
        image.add_segment(start_addr - origin, buffer[offset..end].to_vec());
    }
    Ok(image)
}

fn parse_hex(s: &str) -> Result<u64> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| anyhow!("'{}': {}", s, e))
}
