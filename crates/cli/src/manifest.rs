// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use socgen_codegen::Artifact;
use socgen_config::SocConfig;
use std::path::Path;

pub const MANIFEST_FILE: &str = "build.json";
const MANIFEST_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Serialize, Deserialize)]
pub struct BuildManifest {
    pub schema_version: String,
    pub generator_version: String,
    /// SHA-256 of the effective configuration, serialized as YAML.
    pub config_hash: String,
    pub artifacts: Vec<ArtifactEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub file: String,
    pub bytes: usize,
    pub sha256: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Write every artifact plus `build.json` into `output_dir`.
pub fn write_artifacts(output_dir: &Path, config: &SocConfig, artifacts: &[Artifact]) -> Result<BuildManifest> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let effective = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    let mut manifest = BuildManifest {
        schema_version: MANIFEST_SCHEMA_VERSION.to_string(),
        generator_version: env!("CARGO_PKG_VERSION").to_string(),
        config_hash: sha256_hex(effective.as_bytes()),
        artifacts: Vec::with_capacity(artifacts.len()),
    };

    for artifact in artifacts {
        let path = output_dir.join(artifact.file_name);
        std::fs::write(&path, &artifact.contents)
            .with_context(|| format!("Failed to write {:?}", path))?;
        manifest.artifacts.push(ArtifactEntry {
            file: artifact.file_name.to_string(),
            bytes: artifact.contents.len(),
            sha256: sha256_hex(artifact.contents.as_bytes()),
        });
    }

    let path = output_dir.join(MANIFEST_FILE);
    let file = std::fs::File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    serde_json::to_writer_pretty(file, &manifest).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(manifest)
}
