use socgen_ir::{ConstantValue, CsrPayload, SocDescription};
use std::fmt::Write;

const BANNER: &str = "/* Generated by socgen. Do not edit. */\n";

/// C macro name for an arbitrary identifier.
pub(crate) fn macro_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn open_guard(out: &mut String, guard: &str) {
    out.push_str(BANNER);
    let _ = writeln!(out, "#ifndef __GENERATED_{}_H", guard);
    let _ = writeln!(out, "#define __GENERATED_{}_H", guard);
    out.push('\n');
}

fn close_guard(out: &mut String) {
    out.push_str("\n#endif\n");
}

pub struct CHeaderGenerator;

impl CHeaderGenerator {
    /// `csr.h`: bank bases plus per-register address and word count.
    pub fn csr_header(desc: &SocDescription) -> String {
        let mut out = String::new();
        open_guard(&mut out, "CSR");
        let _ = writeln!(out, "#define CSR_BASE 0x{:08x}L", desc.csr_base);

        for region in &desc.csr_regions {
            let bank = macro_name(&region.name);
            let offset = region.origin.wrapping_sub(desc.csr_base);
            let _ = writeln!(out, "\n/* {} */", region.name);
            let _ = writeln!(out, "#define CSR_{}_BASE (CSR_BASE + 0x{:x}L)", bank, offset);
            match &region.payload {
                CsrPayload::Registers { registers } => {
                    for reg in registers {
                        let name = macro_name(&reg.name);
                        let _ = writeln!(
                            out,
                            "#define CSR_{}_{}_ADDR (CSR_BASE + 0x{:x}L)",
                            bank,
                            name,
                            offset + reg.offset
                        );
                        let _ = writeln!(out, "#define CSR_{}_{}_SIZE {}", bank, name, reg.words);
                    }
                }
                CsrPayload::Memory(mem) => {
                    let _ = writeln!(out, "#define CSR_{}_SIZE {}", bank, mem.depth);
                }
            }
        }
        close_guard(&mut out);
        out
    }

    /// `mem.h`: one base/size pair per memory region.
    pub fn mem_header(desc: &SocDescription) -> String {
        let mut out = String::new();
        open_guard(&mut out, "MEM");
        for region in &desc.memory_regions {
            let name = macro_name(&region.name);
            let _ = writeln!(out, "#define {}_BASE 0x{:08x}L", name, region.origin);
            let _ = writeln!(out, "#define {}_SIZE 0x{:08x}", name, region.length);
        }
        close_guard(&mut out);
        out
    }

    /// `soc.h`: the constant table, in order.
    pub fn soc_header(desc: &SocDescription) -> String {
        let mut out = String::new();
        open_guard(&mut out, "SOC");
        for constant in &desc.constants {
            let name = macro_name(&constant.name);
            match &constant.value {
                None => {
                    let _ = writeln!(out, "#define {}", name);
                }
                Some(ConstantValue::Int(v)) => {
                    let _ = writeln!(out, "#define {} {}", name, v);
                }
                Some(ConstantValue::Str(s)) => {
                    let _ = writeln!(out, "#define {} {:?}", name, s);
                }
            }
        }
        close_guard(&mut out);
        out
    }
}
