//! `site collect-static`: gather built assets into the directory served in
//! production, next to content-hashed and gzipped copies.

use anyhow::{anyhow, Context, Result};
use async_compression::tokio::write::GzipEncoder;
use log::{debug, info};
use serde::Serialize;
use sha2::{Digest, Sha256};
use soilcast_core::{copy_file, ensure_dir_exists, list_files};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt, task};

pub const MANIFEST_NAME: &str = "staticfiles.json";
const HASH_LEN: usize = 12;
const COMPRESSIBLE: [&str; 9] = ["css", "js", "json", "svg", "html", "txt", "wasm", "map", "xml"];

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct Manifest {
    /// Source-relative path to its hashed name, `/` separated
    pub paths: BTreeMap<String, String>,
    pub version: &'static str,
}

pub async fn collect_static(source: &Path, root: &Path, clear: bool) -> Result<Manifest> {
    if !source.is_dir() {
        return Err(anyhow!("static directory {} does not exist", source.display()));
    }
    if clear && root.exists() {
        info!("clearing {}", root.display());
        fs::remove_dir_all(root)
            .await
            .with_context(|| format!("failed to clear {}", root.display()))?;
    }
    let (source_dir, root_dir) = (source.to_path_buf(), root.to_path_buf());
    let files = task::spawn_blocking(move || -> Result<Vec<PathBuf>> {
        if !ensure_dir_exists(&root_dir) {
            return Err(anyhow!("could not create {}", root_dir.display()));
        }
        list_files(&source_dir).with_context(|| format!("failed to list {}", source_dir.display()))
    })
    .await??;

    let mut manifest = Manifest {
        paths: BTreeMap::new(),
        version: "1.0",
    };

    for rel in files.into_iter().filter(|f| is_collectable(f)) {
        let from = source.join(&rel);
        let bytes = fs::read(&from)
            .await
            .with_context(|| format!("failed to read {}", from.display()))?;
        let hashed = hashed_name(&rel, &bytes);

        let plain_target = root.join(&rel);
        let (copy_from, copy_to) = (from.clone(), plain_target.clone());
        task::spawn_blocking(move || copy_file(&copy_from, &copy_to))
            .await?
            .with_context(|| format!("failed to copy {}", from.display()))?;
        let hashed_target = root.join(&hashed);
        fs::write(&hashed_target, &bytes).await?;

        if is_compressible(&rel) {
            write_gzip(&plain_target, &bytes).await?;
            write_gzip(&hashed_target, &bytes).await?;
        }
        debug!("collected {} -> {}", rel.display(), hashed.display());
        manifest
            .paths
            .insert(slash_path(&rel), slash_path(&hashed));
    }

    let manifest_json = serde_json::to_vec_pretty(&manifest)?;
    fs::write(root.join(MANIFEST_NAME), manifest_json).await?;
    info!(
        "collected {} static files into {}",
        manifest.paths.len(),
        root.display()
    );
    Ok(manifest)
}

/// Skips outputs of an earlier collection that ended up in the source.
fn is_collectable(rel: &Path) -> bool {
    let name = rel.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name != MANIFEST_NAME && !name.ends_with(".gz")
}

fn is_compressible(rel: &Path) -> bool {
    rel.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| COMPRESSIBLE.contains(&ext))
}

/// `css/app.css` becomes `css/app.{hash}.css`
pub fn hashed_name(rel: &Path, contents: &[u8]) -> PathBuf {
    let digest = hex::encode(Sha256::digest(contents));
    let hash = &digest[..HASH_LEN];
    let stem = rel.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let name = match rel.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}.{}", stem, hash, ext),
        None => format!("{}.{}", stem, hash),
    };
    rel.with_file_name(name)
}

async fn write_gzip(target: &Path, contents: &[u8]) -> Result<()> {
    let mut gz_name = target.as_os_str().to_owned();
    gz_name.push(".gz");
    let file = fs::File::create(PathBuf::from(gz_name)).await?;
    let mut encoder = GzipEncoder::new(file);
    encoder.write_all(contents).await?;
    encoder.shutdown().await?;
    Ok(())
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
