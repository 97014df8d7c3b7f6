//! Platform collaborator contracts.
//!
//! RULE: The engine never touches a GPU, a sound card or a window.
//! It talks to these traits; platform crates implement them.
//! Input is not part of this facade: a platform's input adapter holds an
//! `InputSender` and pushes into a `LiveEventSource`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque handle to an uploaded texture, minted by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u64);

/// Turns decoded image bytes into something drawable.
pub trait Renderer: Send {
    /// Upload one image. An error means the bytes were not a usable image.
    fn create_texture(&mut self, id: &str, image: &[u8]) -> anyhow::Result<TextureHandle>;
}

/// Buffers sounds for later playback.
pub trait AudioSink: Send {
    /// Decode and keep `data` under `id`. An error means the bytes were
    /// not a usable sound.
    fn load_sound(&mut self, id: &str, data: &[u8]) -> anyhow::Result<()>;
}

/// Groups the rendering and audio collaborators of one platform.
pub trait Platform: Send {
    fn renderer(&mut self) -> &mut dyn Renderer;

    fn audio(&mut self) -> &mut dyn AudioSink;

    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }
}

// ── Headless ───────────────────────────────────────────────────

/// Renderer that only hands out sequential handles.
#[derive(Debug, Default)]
pub struct NullRenderer {
    next_handle: u64,
    /// Texture ids in upload order.
    pub uploads: Vec<String>,
    /// Ids for which `create_texture` fails.
    pub reject: Vec<String>,
}

impl Renderer for NullRenderer {
    fn create_texture(&mut self, id: &str, _image: &[u8]) -> anyhow::Result<TextureHandle> {
        if self.reject.iter().any(|r| r == id) {
            anyhow::bail!("unsupported image format");
        }
        self.next_handle += 1;
        self.uploads.push(id.to_string());
        Ok(TextureHandle(self.next_handle))
    }
}

/// Audio sink that keeps the raw bytes it was given.
#[derive(Debug, Default)]
pub struct NullAudio {
    pub sounds: BTreeMap<String, Vec<u8>>,
}

impl AudioSink for NullAudio {
    fn load_sound(&mut self, id: &str, data: &[u8]) -> anyhow::Result<()> {
        self.sounds.insert(id.to_string(), data.to_vec());
        Ok(())
    }
}

/// A platform with no window and no sound, for tests and the headless runner.
#[derive(Debug)]
pub struct HeadlessPlatform {
    pub renderer: NullRenderer,
    pub audio: NullAudio,
    pub pixel_ratio: f64,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self {
            renderer: NullRenderer::default(),
            audio: NullAudio::default(),
            pixel_ratio: 1.0,
        }
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn renderer(&mut self) -> &mut dyn Renderer {
        &mut self.renderer
    }

    fn audio(&mut self) -> &mut dyn AudioSink {
        &mut self.audio
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}
