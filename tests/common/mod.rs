#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dpi::PhysicalSize;
use parking_lot::Mutex;

use native_render::engine::config::RenderConfig;
use native_render::engine::error::{RenderError, RenderResult};
use native_render::engine::frame::{ImageFrame, RenderedImage};
use native_render::engine::offscreen::{HeadlessBackend, HeadlessFactory};
use native_render::engine::slot::ChannelIndex;
use native_render::engine::surface::{CompositeFrame, SurfaceRenderer};

/// Shared counters so tests can observe a renderer after it moved into a context.
#[derive(Default)]
pub struct RendererLog {
    pub live_handles: AtomicUsize,
    pub creates: AtomicUsize,
    pub fail_next_create: Mutex<bool>,
    pub fail_uploads_for: Mutex<Option<ChannelIndex>>,
    pub uploads: Mutex<Vec<(ChannelIndex, Vec<u8>)>>,
    pub last_frame: Mutex<Option<CompositeFrame>>,
    pub viewport: Mutex<Option<PhysicalSize<u32>>>,
}

impl RendererLog {
    pub fn uploads_for(&self, channel: ChannelIndex) -> Vec<Vec<u8>> {
        self.uploads
            .lock()
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, bytes)| bytes.clone())
            .collect()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().len()
    }

    pub fn last_frame(&self) -> CompositeFrame {
        self.last_frame.lock().clone().expect("no frame composited")
    }
}

/// Fake GPU backend: a "handle" is one program plus one texture per uploaded channel.
pub struct RecordingRenderer {
    log: Arc<RendererLog>,
    resources: bool,
    textures: HashMap<ChannelIndex, usize>,
}

impl RecordingRenderer {
    pub fn new() -> (Self, Arc<RendererLog>) {
        let log = Arc::new(RendererLog::default());
        (
            Self {
                log: log.clone(),
                resources: false,
                textures: HashMap::new(),
            },
            log,
        )
    }
}

impl SurfaceRenderer for RecordingRenderer {
    fn create_resources(&mut self) -> RenderResult<()> {
        self.log.creates.fetch_add(1, Ordering::SeqCst);
        if std::mem::take(&mut *self.log.fail_next_create.lock()) {
            return Err(RenderError::allocation("program link failed"));
        }
        assert!(!self.resources, "resources created twice without release");
        self.resources = true;
        self.log.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release_resources(&mut self) {
        if std::mem::take(&mut self.resources) {
            self.log.live_handles.fetch_sub(1, Ordering::SeqCst);
        }
        let textures = self.textures.drain().count();
        self.log.live_handles.fetch_sub(textures, Ordering::SeqCst);
    }

    fn resize(&mut self, viewport: PhysicalSize<u32>) {
        *self.log.viewport.lock() = Some(viewport);
    }

    fn upload(&mut self, channel: ChannelIndex, frame: &ImageFrame) -> RenderResult<()> {
        assert!(self.resources, "upload without resources");
        if *self.log.fail_uploads_for.lock() == Some(channel) {
            return Err(RenderError::draw("texture upload failed"));
        }
        if self.textures.insert(channel, 1).is_none() {
            self.log.live_handles.fetch_add(1, Ordering::SeqCst);
        }
        self.log.uploads.lock().push((channel, frame.data().to_vec()));
        Ok(())
    }

    fn composite(&mut self, frame: &CompositeFrame) -> RenderResult<()> {
        assert!(self.resources, "composite without resources");
        *self.log.last_frame.lock() = Some(frame.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct HeadlessLog {
    pub live_backends: AtomicUsize,
    pub fail_next_create: Mutex<bool>,
    pub uploads: AtomicUsize,
    pub last_frame: Mutex<Option<CompositeFrame>>,
}

/// Fake headless backend that "renders" by returning the uploaded RGBA bytes unchanged.
pub struct FakeBackend {
    log: Arc<HeadlessLog>,
    live: bool,
    image: Option<ImageFrame>,
}

impl HeadlessBackend for FakeBackend {
    fn make_current(&mut self) -> RenderResult<()> {
        assert!(self.live, "make_current after release");
        Ok(())
    }

    fn upload(&mut self, frame: &ImageFrame) -> RenderResult<()> {
        self.log.uploads.fetch_add(1, Ordering::SeqCst);
        self.image = Some(frame.clone());
        Ok(())
    }

    fn render(&mut self, frame: &CompositeFrame) -> RenderResult<RenderedImage> {
        *self.log.last_frame.lock() = Some(frame.clone());
        let Some(image) = &self.image else {
            return Err(RenderError::NotInitialized("texture"));
        };
        Ok(RenderedImage {
            size: frame.viewport,
            pixels: image.data().to_vec(),
        })
    }

    fn release(&mut self) {
        if std::mem::take(&mut self.live) {
            self.log.live_backends.fetch_sub(1, Ordering::SeqCst);
        }
        self.image = None;
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.release();
    }
}

pub struct FakeFactory {
    log: Arc<HeadlessLog>,
}

impl FakeFactory {
    pub fn new() -> (Self, Arc<HeadlessLog>) {
        let log = Arc::new(HeadlessLog::default());
        (
            Self {
                log: log.clone(),
            },
            log,
        )
    }
}

impl HeadlessFactory for FakeFactory {
    type Backend = FakeBackend;

    fn create(&mut self, _config: &RenderConfig) -> RenderResult<FakeBackend> {
        if std::mem::take(&mut *self.log.fail_next_create.lock()) {
            return Err(RenderError::allocation("eglCreateContext failed"));
        }
        self.log.live_backends.fetch_add(1, Ordering::SeqCst);
        Ok(FakeBackend {
            log: self.log.clone(),
            live: true,
            image: None,
        })
    }
}

pub fn rgba(width: u32, height: u32, fill: u8) -> Vec<u8> {
    vec![fill; (width * height * 4) as usize]
}

pub fn size(width: u32, height: u32) -> PhysicalSize<u32> {
    PhysicalSize::new(width, height)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
