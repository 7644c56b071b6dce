// src/media.rs
//! Locating media files and decoding them into the raw forms the scene needs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, SceneError};

/// How many parent directories of the working directory are searched.
const ANCESTOR_DEPTH: usize = 4;

/// Decoded image: tightly packed 8-bit RGBA rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl LoadedImage {
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width * height) as usize;
        Self {
            width,
            height,
            rgba: rgba.iter().copied().cycle().take(pixels * 4).collect(),
        }
    }
}

/// Anything that can hand out images, heightmaps and shader sources by logical name.
pub trait AssetSource {
    fn load_image(&self, name: &str) -> Result<LoadedImage>;
    fn load_heightmap(&self, name: &str, expected_samples: usize) -> Result<Vec<u16>>;
    /// Returns `Ok(None)` when no override file exists.
    fn load_text(&self, name: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct MediaResolver {
    search_dirs: Vec<PathBuf>,
    roots: Vec<PathBuf>,
}

impl MediaResolver {
    pub fn new<I, S>(search_dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathBuf>,
    {
        let mut roots = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            roots.extend(cwd.ancestors().take(ANCESTOR_DEPTH + 1).map(Path::to_path_buf));
        }
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            roots.push(exe_dir);
        }
        Self::with_roots(search_dirs, roots)
    }

    pub fn with_roots<I, S>(search_dirs: I, roots: Vec<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathBuf>,
    {
        Self {
            search_dirs: search_dirs.into_iter().map(Into::into).collect(),
            roots,
        }
    }

    /// First existing `<root>/<dir>/<name>`, roots in order, then dirs in order.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        self.roots
            .iter()
            .flat_map(|root| self.search_dirs.iter().map(move |dir| root.join(dir).join(name)))
            .find(|candidate| candidate.is_file())
    }

    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        self.find(name)
            .ok_or_else(|| SceneError::MediaNotFound(name.to_string()))
    }
}

/// Reads media from disk through a [`MediaResolver`].
#[derive(Debug, Clone)]
pub struct FsAssets {
    resolver: MediaResolver,
}

impl FsAssets {
    pub fn new(resolver: MediaResolver) -> Self {
        Self { resolver }
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolver.resolve(name)?;
        log::debug!("Reading media {}", path.display());
        std::fs::read(&path).map_err(|source| SceneError::Io { path, source })
    }
}

impl AssetSource for FsAssets {
    fn load_image(&self, name: &str) -> Result<LoadedImage> {
        let bytes = self.read(name)?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| SceneError::Image {
            name: name.to_string(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        Ok(LoadedImage {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }

    fn load_heightmap(&self, name: &str, expected_samples: usize) -> Result<Vec<u16>> {
        let bytes = self.read(name)?;
        parse_heightmap(name, &bytes, expected_samples)
    }

    fn load_text(&self, name: &str) -> Result<Option<String>> {
        let Some(path) = self.resolver.find(name) else {
            return Ok(None);
        };
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| SceneError::Io { path, source })
    }
}

/// Little-endian 16-bit samples; extra trailing bytes are ignored.
pub fn parse_heightmap(name: &str, bytes: &[u8], expected_samples: usize) -> Result<Vec<u16>> {
    let found = bytes.len() / 2;
    if found < expected_samples {
        return Err(SceneError::Heightmap {
            name: name.to_string(),
            expected: expected_samples,
            found,
        });
    }
    Ok(bytes
        .chunks_exact(2)
        .take(expected_samples)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// In-memory asset store. Unknown images resolve to a 1x1 white pixel so scenes
/// can be assembled without media on disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssets {
    images: HashMap<String, LoadedImage>,
    heightmaps: HashMap<String, Vec<u16>>,
    texts: HashMap<String, String>,
    pub strict: bool,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, name: &str, image: LoadedImage) -> Self {
        self.images.insert(name.to_string(), image);
        self
    }

    pub fn with_heightmap(mut self, name: &str, samples: Vec<u16>) -> Self {
        self.heightmaps.insert(name.to_string(), samples);
        self
    }

    pub fn with_text(mut self, name: &str, text: &str) -> Self {
        self.texts.insert(name.to_string(), text.to_string());
        self
    }
}

impl AssetSource for MemoryAssets {
    fn load_image(&self, name: &str) -> Result<LoadedImage> {
        match self.images.get(name) {
            Some(image) => Ok(image.clone()),
            None if self.strict => Err(SceneError::MediaNotFound(name.to_string())),
            None => Ok(LoadedImage::solid(1, 1, [255; 4])),
        }
    }

    fn load_heightmap(&self, name: &str, expected_samples: usize) -> Result<Vec<u16>> {
        match self.heightmaps.get(name) {
            Some(samples) if samples.len() >= expected_samples => {
                Ok(samples[..expected_samples].to_vec())
            }
            Some(samples) => Err(SceneError::Heightmap {
                name: name.to_string(),
                expected: expected_samples,
                found: samples.len(),
            }),
            None if self.strict => Err(SceneError::MediaNotFound(name.to_string())),
            None => Ok(vec![0; expected_samples]),
        }
    }

    fn load_text(&self, name: &str) -> Result<Option<String>> {
        Ok(self.texts.get(name).cloned())
    }
}
