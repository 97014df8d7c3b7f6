//! Asset registration, preloading and lookup.
//!
//! RULES:
//!   - Each distinct id is fetched at most once per preload pass, however
//!     many times it was registered. A spritesheet costs two fetches:
//!     the image and its frame map (same id, `.json` extension).
//!   - Assets are fetched in registration order, one at a time.
//!   - A fatal fetch failure aborts the pass. A non-fatal fetch failure or
//!     a decode failure is logged and leaves that asset absent.
//!   - Lookups never fail; unknown or failed ids are simply absent.

use crate::{
    error::{EngineError, EngineResult},
    fetch::DataFetcher,
    platform::{Platform, TextureHandle},
    types::AssetId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Spritesheet,
    StaticImage,
    Sound,
}

/// One line of an asset manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub id: AssetId,
    pub kind: AssetKind,
}

/// A named sub-region of a spritesheet, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spritesheet {
    pub id: AssetId,
    pub texture: TextureHandle,
    frames: BTreeMap<String, FrameRect>,
}

impl Spritesheet {
    pub fn frame(&self, name: &str) -> Option<&FrameRect> {
        self.frames.get(name)
    }

    pub fn frame_names(&self) -> impl Iterator<Item = &str> {
        self.frames.keys().map(String::as_str)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticImage {
    pub id: AssetId,
    pub texture: TextureHandle,
}

// Frame maps come in the two layouts common sprite packers emit:
//   {"frames": {"name": {"frame": {...}}}}
//   {"frames": [{"filename": "name", "frame": {...}}]}
#[derive(Deserialize)]
struct FrameMapFile {
    frames: FrameList,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FrameList {
    Hash(BTreeMap<String, FrameEntry>),
    Array(Vec<NamedFrameEntry>),
}

#[derive(Deserialize)]
struct FrameEntry {
    frame: FrameRect,
}

#[derive(Deserialize)]
struct NamedFrameEntry {
    filename: String,
    frame: FrameRect,
}

/// Parse a frame map. Empty input means a sheet with no named frames.
pub fn parse_frame_map(data: &[u8]) -> Result<BTreeMap<String, FrameRect>, String> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    let file: FrameMapFile = serde_json::from_slice(data).map_err(|e| e.to_string())?;
    Ok(match file.frames {
        FrameList::Hash(map) => map.into_iter().map(|(name, f)| (name, f.frame)).collect(),
        FrameList::Array(list) => list.into_iter().map(|f| (f.filename, f.frame)).collect(),
    })
}

/// Id of the frame map that accompanies a spritesheet image.
pub fn frame_map_id(image_id: &str) -> String {
    match image_id.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') && !stem.is_empty() => format!("{stem}.json"),
        _ => format!("{image_id}.json"),
    }
}

/// Outcome of one preload pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub total: usize,
    pub loaded: usize,
    /// Ids left absent after the pass, in fetch order.
    pub failed: Vec<AssetId>,
}

enum Loaded {
    Sheet(Spritesheet),
    Image(StaticImage),
    Sound,
}

#[derive(Debug, Default)]
pub struct AssetLoader {
    registered: Vec<AssetEntry>,
    spritesheets: HashMap<AssetId, Spritesheet>,
    images: HashMap<AssetId, StaticImage>,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` for the next preload pass. Registering an id again
    /// keeps its position; the latest kind wins. Returns true if `id`
    /// was new.
    pub fn register(&mut self, id: impl Into<AssetId>, kind: AssetKind) -> bool {
        let id = id.into();
        if let Some(entry) = self.registered.iter_mut().find(|e| e.id == id) {
            if entry.kind != kind {
                log::debug!("assets: '{id}' re-registered as {kind:?} (was {:?})", entry.kind);
                entry.kind = kind;
            }
            return false;
        }
        self.registered.push(AssetEntry { id, kind });
        true
    }

    pub fn registered(&self) -> &[AssetEntry] {
        &self.registered
    }

    pub fn get_spritesheet(&self, id: &str) -> Option<&Spritesheet> {
        self.spritesheets.get(id)
    }

    pub fn get_static_image(&self, id: &str) -> Option<&StaticImage> {
        self.images.get(id)
    }

    /// Fetch and decode every registered asset.
    ///
    /// `on_progress(loaded, total)` fires once per asset, success or not.
    ///
    /// # Errors
    /// - `EngineError::Fetch` on the first fatal fetch failure; assets
    ///   after it are not fetched.
    pub async fn preload_assets<F>(
        &mut self,
        fetcher: &dyn DataFetcher,
        platform: &mut dyn Platform,
        mut on_progress: F,
    ) -> EngineResult<PreloadReport>
    where
        F: FnMut(usize, usize),
    {
        let entries = self.registered.clone();
        let mut report = PreloadReport {
            total: entries.len(),
            ..PreloadReport::default()
        };

        for (index, entry) in entries.iter().enumerate() {
            match Self::load_one(entry, fetcher, platform).await {
                Ok(loaded) => {
                    self.store(&entry.id, loaded);
                    report.loaded += 1;
                    log::debug!("assets: loaded '{}' ({:?})", entry.id, entry.kind);
                }
                Err(EngineError::Fetch { id, source }) if source.fatal => {
                    log::warn!("assets: aborting preload, fetch of '{id}' failed: {source}");
                    return Err(EngineError::Fetch { id, source });
                }
                Err(e) => {
                    log::warn!("assets: '{}' left unloaded: {e}", entry.id);
                    self.evict(&entry.id);
                    report.failed.push(entry.id.clone());
                }
            }
            on_progress(index + 1, report.total);
        }

        log::info!(
            "assets: preload finished, {}/{} loaded",
            report.loaded,
            report.total
        );
        Ok(report)
    }

    async fn fetch(fetcher: &dyn DataFetcher, id: &str) -> EngineResult<Vec<u8>> {
        fetcher
            .fetch_data(id)
            .await
            .map_err(|source| EngineError::Fetch {
                id: id.to_string(),
                source,
            })
    }

    async fn load_one(
        entry: &AssetEntry,
        fetcher: &dyn DataFetcher,
        platform: &mut dyn Platform,
    ) -> EngineResult<Loaded> {
        let id = entry.id.as_str();
        let decode_error = |reason: String| EngineError::Decode {
            id: id.to_string(),
            reason,
        };

        match entry.kind {
            AssetKind::Spritesheet => {
                let image = Self::fetch(fetcher, id).await?;
                let meta = Self::fetch(fetcher, &frame_map_id(id)).await?;
                let frames = parse_frame_map(&meta).map_err(decode_error)?;
                let texture = platform
                    .renderer()
                    .create_texture(id, &image)
                    .map_err(|e| decode_error(e.to_string()))?;
                Ok(Loaded::Sheet(Spritesheet {
                    id: id.to_string(),
                    texture,
                    frames,
                }))
            }
            AssetKind::StaticImage => {
                let image = Self::fetch(fetcher, id).await?;
                let texture = platform
                    .renderer()
                    .create_texture(id, &image)
                    .map_err(|e| decode_error(e.to_string()))?;
                Ok(Loaded::Image(StaticImage {
                    id: id.to_string(),
                    texture,
                }))
            }
            AssetKind::Sound => {
                let data = Self::fetch(fetcher, id).await?;
                platform
                    .audio()
                    .load_sound(id, &data)
                    .map_err(|e| decode_error(e.to_string()))?;
                Ok(Loaded::Sound)
            }
        }
    }

    fn store(&mut self, id: &str, loaded: Loaded) {
        self.evict(id);
        match loaded {
            Loaded::Sheet(sheet) => {
                self.spritesheets.insert(id.to_string(), sheet);
            }
            Loaded::Image(image) => {
                self.images.insert(id.to_string(), image);
            }
            Loaded::Sound => {}
        }
    }

    fn evict(&mut self, id: &str) {
        self.spritesheets.remove(id);
        self.images.remove(id);
    }
}
