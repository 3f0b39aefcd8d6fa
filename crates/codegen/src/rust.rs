use anyhow::{Context, Result};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use socgen_ir::{ConstantValue, CsrPayload, CsrRegion, SocDescription};

use crate::c_header::macro_name;

pub struct RustGenerator;

impl RustGenerator {
    /// A `soc` module of `pub const` items mirroring the C headers.
    ///
    /// The output is checked with `syn` before it is returned.
    pub fn generate(desc: &SocDescription) -> Result<String> {
        let csr_base = desc.csr_base;
        let banks: Vec<TokenStream> = desc
            .csr_regions
            .iter()
            .map(|r| Self::generate_bank(r, csr_base))
            .collect();

        let mems = desc.memory_regions.iter().map(|r| {
            let base = format_ident!("{}_BASE", macro_name(&r.name));
            let size = format_ident!("{}_SIZE", macro_name(&r.name));
            let (origin, length) = (r.origin, r.length);
            quote! {
                pub const #base: u64 = #origin;
                pub const #size: u64 = #length;
            }
        });

        let constants = desc.constants.iter().map(|c| {
            let name = format_ident!("{}", macro_name(&c.name));
            match &c.value {
                None => quote! { pub const #name: bool = true; },
                Some(ConstantValue::Int(v)) => quote! { pub const #name: u64 = #v; },
                Some(ConstantValue::Str(s)) => quote! { pub const #name: &str = #s; },
            }
        });

        let expanded = quote! {
            pub mod soc {
                pub const CSR_BASE: u64 = #csr_base;

                pub mod csr {
                    #(#banks)*
                }

                pub mod mem {
                    #(#mems)*
                }

                pub mod constants {
                    #(#constants)*
                }
            }
        };

        let code = expanded.to_string();
        syn::parse_file(&code).context("Generated Rust module does not parse")?;
        Ok(code)
    }

    fn generate_bank(region: &CsrRegion, csr_base: u64) -> TokenStream {
        let mod_name = format_ident!("{}", Self::sanitize_name(&region.name.to_lowercase()));
        let base = region.origin;
        let offset = base.wrapping_sub(csr_base);

        let items = match &region.payload {
            CsrPayload::Registers { registers } => {
                let regs = registers.iter().map(|reg| {
                    let mut name = macro_name(&reg.name);
                    // Avoid collision with the bank-level items
                    if ["BASE", "OFFSET"].contains(&name.as_str()) {
                        name.push_str("_REG");
                    }
                    let addr = format_ident!("{}", name);
                    let size = format_ident!("{}_SIZE", name);
                    let value = base + reg.offset;
                    let words = reg.words;
                    quote! {
                        pub const #addr: u64 = #value;
                        pub const #size: u32 = #words;
                    }
                });
                quote! { #(#regs)* }
            }
            CsrPayload::Memory(mem) => {
                let depth = mem.depth;
                quote! { pub const DEPTH: u32 = #depth; }
            }
        };

        quote! {
            pub mod #mod_name {
                pub const BASE: u64 = #base;
                pub const OFFSET: u64 = #offset;
                #items
            }
        }
    }

    fn sanitize_name(name: &str) -> String {
        let mut name: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert(0, '_');
        }
        // These cannot be raw identifiers.
        if ["self", "super", "crate", "Self"].contains(&name.as_str()) {
            return format!("{}_", name);
        }
        let keywords = [
            "as", "break", "const", "continue", "else", "enum", "extern", "false", "fn", "for",
            "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
            "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where",
            "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final", "macro",
            "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
        ];
        if keywords.contains(&name.as_str()) {
            format!("r#{}", name)
        } else {
            name
        }
    }
}
