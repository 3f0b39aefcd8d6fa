// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! CPU variant resolution.
//!
//! A variant string is a base variant followed by optional `+extension` suffixes, e.g.
//! `lite+debug`. The legacy `_` separator is accepted. Resolution yields a canonical form in
//! which the extensions are sorted and deduplicated, so equivalent requests always produce the
//! same string in generated artifacts and file names.

use crate::{SocError, SocResult};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Alias meaning "no variant requested".
pub const UNSPECIFIED: &str = "unspecified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseVariant {
    Minimal,
    Lite,
    Standard,
    Full,
    Linux,
}

impl BaseVariant {
    /// Registry order; the first entry whose name or alias matches wins.
    pub const ALL: [BaseVariant; 5] = [
        BaseVariant::Minimal,
        BaseVariant::Lite,
        BaseVariant::Standard,
        BaseVariant::Full,
        BaseVariant::Linux,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BaseVariant::Minimal => "minimal",
            BaseVariant::Lite => "lite",
            BaseVariant::Standard => "standard",
            BaseVariant::Full => "full",
            BaseVariant::Linux => "linux",
        }
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            BaseVariant::Minimal => &["min"],
            BaseVariant::Lite => &["light", "zephyr", "nuttx"],
            BaseVariant::Standard => &[UNSPECIFIED, "std"],
            BaseVariant::Full => &[],
            BaseVariant::Linux => &[],
        }
    }

    fn matches(self, token: &str) -> bool {
        self.name() == token || self.aliases().contains(&token)
    }

    pub fn lookup(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.matches(token))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Extension {
    Debug,
}

impl Extension {
    pub const ALL: [Extension; 1] = [Extension::Debug];

    pub fn name(self) -> &'static str {
        match self {
            Extension::Debug => "debug",
        }
    }

    pub fn lookup(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == token)
    }
}

/// A validated CPU variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CpuVariant {
    pub base: BaseVariant,
    // Keyed by name so iteration is the canonical (sorted) order.
    extensions: BTreeSet<&'static str>,
}

impl Default for CpuVariant {
    fn default() -> Self {
        Self {
            base: BaseVariant::Standard,
            extensions: BTreeSet::new(),
        }
    }
}

impl CpuVariant {
    /// Resolve an optional variant request; `None` yields `standard`.
    pub fn resolve(variant: Option<&str>) -> SocResult<Self> {
        let Some(raw) = variant else {
            return Ok(Self::default());
        };
        let normalized = raw.replace('_', "+");
        let mut tokens = normalized.split('+');
        let base_token = tokens.next().unwrap_or_default();

        let base = BaseVariant::lookup(base_token).ok_or_else(|| SocError::InvalidVariant {
            variant: normalized.clone(),
            choices: variant_choices(),
        })?;

        let mut extensions = BTreeSet::new();
        for token in tokens {
            let ext = Extension::lookup(token).ok_or_else(|| SocError::InvalidExtension {
                variant: normalized.clone(),
                choices: extension_choices(),
            })?;
            extensions.insert(ext.name());
        }

        Ok(Self { base, extensions })
    }

    pub fn extensions(&self) -> impl Iterator<Item = Extension> + '_ {
        self.extensions.iter().filter_map(|e| Extension::lookup(e))
    }

    pub fn has_extension(&self, ext: Extension) -> bool {
        self.extensions.contains(ext.name())
    }
}

impl fmt::Display for CpuVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.name())?;
        for ext in &self.extensions {
            write!(f, "+{}", ext)?;
        }
        Ok(())
    }
}

impl FromStr for CpuVariant {
    type Err = SocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(Some(s))
    }
}

/// One line per canonical variant with its aliases, for diagnostics.
pub fn variant_choices() -> String {
    BaseVariant::ALL
        .iter()
        .map(|v| format!(" - {} (aliases: {})\n", v.name(), v.aliases().join(", ")))
        .collect()
}

pub fn extension_choices() -> String {
    Extension::ALL
        .iter()
        .map(|e| format!(" - {}\n", e.name()))
        .collect()
}
