use socgen_core::cpu::Endianness;
use socgen_loader::{get_mem_data, get_mem_data_at, load_elf_bytes};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(tag: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("socgen_loader_{}_{}", tag, nonce));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Minimal ELF32 little-endian executable with one `PT_LOAD` per segment.
fn tiny_elf(segments: &[(u32, [u8; 4])]) -> Vec<u8> {
    let phoff = 52u32;
    let data_start = phoff + 32 * segments.len() as u32;

    let mut out = Vec::new();
    out.extend_from_slice(b"\x7fELF");
    out.extend_from_slice(&[1, 1, 1, 0]);
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
    out.extend_from_slice(&0xf3u16.to_le_bytes()); // EM_RISCV
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&segments[0].0.to_le_bytes());
    out.extend_from_slice(&phoff.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&52u16.to_le_bytes());
    out.extend_from_slice(&32u16.to_le_bytes());
    out.extend_from_slice(&(segments.len() as u16).to_le_bytes());
    out.extend_from_slice(&40u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());

    let mut offset = data_start;
    for (addr, data) in segments {
        out.extend_from_slice(&1u32.to_le_bytes()); // PT_LOAD
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&addr.to_le_bytes());
        out.extend_from_slice(&addr.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&5u32.to_le_bytes());
        out.extend_from_slice(&4u32.to_le_bytes());
        offset += data.len() as u32;
    }
    for (_, data) in segments {
        out.extend_from_slice(&data[..]);
    }
    out
}

#[test]
fn test_raw_binary_big_endian() {
    let dir = temp_dir("raw");
    let path = dir.join("boot.bin");
    fs::write(&path, [0xde, 0xad, 0xbe, 0xef, 0x01, 0x02]).unwrap();

    let words = get_mem_data(&path, Endianness::Big, Some(0x100)).unwrap();
    assert_eq!(words, vec![0xdead_beef, 0x0102_0000]);
}

#[test]
fn test_region_map_places_files() {
    let dir = temp_dir("json");
    fs::write(dir.join("boot.bin"), [0x13, 0x00, 0x00, 0x00]).unwrap();
    fs::write(dir.join("data.bin"), [0xff, 0xee]).unwrap();
    fs::write(
        dir.join("regions.json"),
        r#"{ "boot.bin": "0x00000000", "data.bin": "0x00000010" }"#,
    )
    .unwrap();

    let words = get_mem_data(&dir.join("regions.json"), Endianness::Little, None).unwrap();
    assert_eq!(words, vec![0x0000_0013, 0, 0, 0, 0x0000_eeff]);
}

#[test]
fn test_region_map_missing_file() {
    let dir = temp_dir("json_missing");
    fs::write(dir.join("regions.json"), r#"{ "nope.bin": "0x0" }"#).unwrap();
    let err = get_mem_data(&dir.join("regions.json"), Endianness::Little, None).unwrap_err();
    assert!(format!("{:#}", err).contains("nope.bin"));
}

#[test]
fn test_region_map_base_past_address_space() {
    let dir = temp_dir("json_overflow");
    fs::write(dir.join("a.bin"), [0x01, 0x02]).unwrap();
    fs::write(dir.join("regions.json"), r#"{ "a.bin": "0xffffffffffffffff" }"#).unwrap();
    let err = get_mem_data(&dir.join("regions.json"), Endianness::Little, Some(0x1000)).unwrap_err();
    assert!(format!("{:#}", err).contains("overflows the address space"));
}

#[test]
fn test_region_map_far_base_without_memory_size() {
    let dir = temp_dir("json_far");
    fs::write(dir.join("a.bin"), [0x01, 0x02]).unwrap();
    fs::write(dir.join("regions.json"), r#"{ "a.bin": "0x100000000000" }"#).unwrap();
    let err = get_mem_data(&dir.join("regions.json"), Endianness::Little, None).unwrap_err();
    assert!(err.to_string().contains("too big"));
}

#[test]
fn test_image_larger_than_memory() {
    let dir = temp_dir("big");
    let path = dir.join("big.bin");
    fs::write(&path, vec![0u8; 64]).unwrap();
    let err = get_mem_data(&path, Endianness::Little, Some(32)).unwrap_err();
    assert!(err.to_string().contains("too big"));
}

#[test]
fn test_elf_segments_relative_to_origin() {
    let elf = tiny_elf(&[
        (0x1000_0000, [0x6f, 0x00, 0x00, 0x00]),
        (0x1000_0008, [0x01, 0x02, 0x03, 0x04]),
    ]);
    let image = load_elf_bytes(&elf, None).unwrap();
    assert_eq!(image.segments[0].offset, 0);
    assert_eq!(image.segments[1].offset, 8);
    assert_eq!(
        image.to_words(Endianness::Little, None).unwrap(),
        vec![0x0000_006f, 0, 0x0403_0201]
    );

    let dir = temp_dir("elf");
    let path = dir.join("firmware.elf");
    fs::write(&path, &elf).unwrap();
    let words = get_mem_data_at(&path, 0x0fff_fff8, Endianness::Little, None).unwrap();
    assert_eq!(words.len(), 5);
    assert_eq!(words[2], 0x0000_006f);
}

#[test]
fn test_elf_segment_below_origin_rejected() {
    let elf = tiny_elf(&[(0x100, [0u8; 4])]);
    let err = load_elf_bytes(&elf, Some(0x200)).unwrap_err();
    assert!(err.to_string().contains("below the memory origin"));
}

#[test]
fn test_elf_truncated_segment_rejected() {
    let mut elf = tiny_elf(&[(0x100, [0x11, 0x22, 0x33, 0x44])]);
    elf.truncate(elf.len() - 2);
    let err = load_elf_bytes(&elf, None).unwrap_err();
    assert!(err.to_string().contains("out of bounds"));
}
