use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Name -> path tables for the loadable asset kinds. `BTreeMap` keeps
/// load order deterministic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub images: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub sounds: BTreeMap<String, PathBuf>,
}

impl AssetManifest {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Decoded RGBA8 image, row-major, 4 bytes per pixel.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Name-keyed image table. A slot that failed to decode stays unready:
/// lookups return `None` and drawing code no-ops. No retries.
#[derive(Debug, Default)]
pub struct ImageStore {
    entries: HashMap<String, Option<ImageData>>,
    warned: HashSet<String>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, name: impl Into<String>, path: impl AsRef<Path>) {
        let name = name.into();
        let path = path.as_ref();
        match decode_rgba(path) {
            Ok(data) => {
                debug!(
                    name = name.as_str(),
                    width = data.width,
                    height = data.height,
                    "image_loaded"
                );
                self.entries.insert(name, Some(data));
            }
            Err(error) => {
                self.warn_once(&name, path, &error);
                self.entries.insert(name, None);
            }
        }
    }

    pub fn load_all(&mut self, images: &BTreeMap<String, PathBuf>) {
        for (name, path) in images {
            self.load(name.clone(), path);
        }
    }

    /// Registers an already-decoded image, used for procedural sprites.
    pub fn insert(&mut self, name: impl Into<String>, data: ImageData) {
        self.entries.insert(name.into(), Some(data));
    }

    /// `None` for unknown names and for slots whose decode failed.
    pub fn get(&self, name: &str) -> Option<&ImageData> {
        self.entries.get(name).and_then(|slot| slot.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn warn_once(&mut self, name: &str, path: &Path, error: &image::ImageError) {
        if self.warned.insert(name.to_string()) {
            warn!(
                name,
                path = %path.display(),
                error = %error,
                "image_load_failed_slot_unready"
            );
        }
    }
}

fn decode_rgba(path: &Path) -> Result<ImageData, image::ImageError> {
    let decoded = ImageReader::open(path)?.decode()?.to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(ImageData {
        width,
        height,
        rgba: decoded.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let mut img = image::RgbaImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgba([255, 0, 0, 255]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn loads_png_as_rgba8() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(dir.path(), "dot.png", 3, 2);
        let mut store = ImageStore::new();
        store.load("dot", &path);
        let data = store.get("dot").unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.rgba.len(), 3 * 2 * 4);
        assert_eq!(&data.rgba[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn failed_decode_leaves_slot_unready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"not a png").unwrap();
        let mut store = ImageStore::new();
        store.load("broken", &path);
        assert!(store.get("broken").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_name_is_none() {
        let store = ImageStore::new();
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn manifest_parses_images_and_sounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");
        fs::write(
            &path,
            r#"{"images":{"hero":"sprites/hero.png"},"sounds":{"pop":"audio/pop.ogg"}}"#,
        )
        .unwrap();
        let manifest = AssetManifest::from_path(&path).unwrap();
        assert_eq!(
            manifest.images.get("hero"),
            Some(&PathBuf::from("sprites/hero.png"))
        );
        assert_eq!(
            manifest.sounds.get("pop"),
            Some(&PathBuf::from("audio/pop.ogg"))
        );
    }

    #[test]
    fn manifest_sections_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");
        fs::write(&path, "{}").unwrap();
        let manifest = AssetManifest::from_path(&path).unwrap();
        assert!(manifest.images.is_empty());
        assert!(manifest.sounds.is_empty());
    }

    #[test]
    fn missing_manifest_is_io_error() {
        let result = AssetManifest::from_path("/definitely/not/here.json");
        assert!(matches!(result, Err(AssetError::Io(_))));
    }
}
