//! ### English
//! Offscreen ("headless") render context: single image slot, narrow parameter surface, explicit
//! init/uninit lifecycle and RGBA readback.
//!
//! ### 中文
//! 离屏（headless）渲染上下文：单图像槽位、精简参数接口、显式 init/uninit 生命周期以及 RGBA 读回。
mod backend;

use std::sync::Arc;

use crossbeam_channel as channel;
use dpi::PhysicalSize;
use parking_lot::Mutex;

use crate::engine::config::RenderConfig;
use crate::engine::effect::Effect;
use crate::engine::error::{RenderError, RenderResult};
use crate::engine::format::ImageFormat;
use crate::engine::frame::{ImageFrame, RenderedImage};
use crate::engine::params::{ParamType, ParameterStore};
use crate::engine::slot::{BufferSlot, ChannelIndex};
use crate::engine::surface::{CompositeFrame, CompositeLayer};

pub use backend::{HeadlessBackend, HeadlessFactory};

/// ### English
/// Capacity of each readback subscription. A full subscription drops new images.
///
/// ### 中文
/// 每个读回订阅的容量；订阅已满时丢弃新的图像。
pub const SUBSCRIPTION_CAPACITY: usize = 2;

/// ### English
/// Lifecycle state of an [`OffscreenRenderContext`].
///
/// ### 中文
/// [`OffscreenRenderContext`] 的生命周期状态。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OffscreenState {
    Uninitialized,
    Initialized,
    /// ### English
    /// Initialized and an image has been supplied.
    ///
    /// ### 中文
    /// 已初始化且已提供图像。
    Ready,
}

/// ### English
/// Producer-side inputs of the offscreen path.
///
/// ### 中文
/// 离屏路径的生产者侧输入。
#[derive(Default)]
pub struct OffscreenInputs {
    image: BufferSlot<ImageFrame>,
    params: ParameterStore,
}

impl OffscreenInputs {
    /// ### English
    /// Copies an RGBA image into the single slot. Returns the new version.
    ///
    /// ### 中文
    /// 把 RGBA 图像复制到唯一槽位，返回新版本号。
    pub fn set_image_data(&self, size: PhysicalSize<u32>, bytes: &[u8]) -> RenderResult<u64> {
        let frame = match self.image.take_spare() {
            Some(mut spare) => spare.refill(ImageFormat::Rgba, size, bytes).map(|()| spare),
            None => ImageFrame::copy_from(ImageFormat::Rgba, size, bytes),
        }
        .inspect_err(|err| tracing::warn!(%err, "offscreen image write rejected"))?;
        Ok(self.image.publish(frame))
    }

    pub fn set_int_params(&self, ty: ParamType, value: i32) {
        self.params.set_int(ty, value, 0);
    }

    pub fn image(&self) -> &BufferSlot<ImageFrame> {
        &self.image
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }
}

struct OffscreenStage<F: HeadlessFactory> {
    factory: F,
    backend: Option<F::Backend>,
    uploaded: Option<(u64, PhysicalSize<u32>)>,
    subscribers: Vec<channel::Sender<RenderedImage>>,
    config: RenderConfig,
}

/// ### English
/// Explicitly owned offscreen render context.
///
/// `init`, `draw` and `uninit` must run on one consumer thread (the EGL context is made current
/// there). Unlike the on-screen path there is no auto-reconstruction: after `uninit`, `draw`
/// reports `NotInitialized` until `init` is called again.
///
/// ### 中文
/// 显式持有的离屏渲染上下文。
///
/// `init`、`draw` 与 `uninit` 必须在同一个消费者线程上运行（EGL 上下文在该线程 current）。
/// 与屏幕路径不同，这里不会自动重建：`uninit` 之后，在再次调用 `init` 之前 `draw` 都会返回
/// `NotInitialized`。
pub struct OffscreenRenderContext<F: HeadlessFactory> {
    inputs: Arc<OffscreenInputs>,
    stage: Mutex<OffscreenStage<F>>,
}

impl<F: HeadlessFactory> OffscreenRenderContext<F> {
    pub fn new(factory: F, config: RenderConfig) -> Self {
        Self {
            inputs: Arc::new(OffscreenInputs::default()),
            stage: Mutex::new(OffscreenStage {
                factory,
                backend: None,
                uploaded: None,
                subscribers: Vec::new(),
                config,
            }),
        }
    }

    pub fn inputs(&self) -> Arc<OffscreenInputs> {
        self.inputs.clone()
    }

    pub fn state(&self) -> OffscreenState {
        if self.stage.lock().backend.is_none() {
            OffscreenState::Uninitialized
        } else if self.inputs.image.version() > 0 {
            OffscreenState::Ready
        } else {
            OffscreenState::Initialized
        }
    }

    /// ### English
    /// Creates the EGL display/context/surface and GPU programs. A second `init` without `uninit`
    /// replaces the previous backend.
    ///
    /// ### 中文
    /// 创建 EGL display/context/surface 与 GPU 程序。未 `uninit` 时再次 `init` 会替换旧后端。
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn init(&self) -> RenderResult<()> {
        let mut stage = self.stage.lock();
        if let Some(mut previous) = stage.backend.take() {
            tracing::debug!("offscreen context re-initialized, releasing previous backend");
            previous.release();
        }
        stage.uploaded = None;

        let config = stage.config;
        let backend = stage
            .factory
            .create(&config)
            .inspect_err(|err| tracing::warn!(%err, "offscreen backend creation failed"))?;
        stage.backend = Some(backend);
        Ok(())
    }

    pub fn set_image_data(&self, size: PhysicalSize<u32>, bytes: &[u8]) -> RenderResult<u64> {
        self.inputs.set_image_data(size, bytes)
    }

    pub fn set_int_params(&self, ty: ParamType, value: i32) {
        self.inputs.set_int_params(ty, value);
    }

    /// ### English
    /// Changes the background color used by the next `draw`.
    ///
    /// ### 中文
    /// 修改下一次 `draw` 使用的背景清屏颜色。
    pub fn set_clear_color(&self, rgba: [f32; 4]) {
        let mut stage = self.stage.lock();
        stage.config = stage.config.with_clear_color(rgba);
    }

    /// ### English
    /// Renders the current image with the selected effect and reads the result back.
    ///
    /// Returns `Ok(None)` when no image has been supplied yet. Completed images are also
    /// delivered to every live subscription.
    ///
    /// ### 中文
    /// 使用所选效果渲染当前图像并读回结果。
    ///
    /// 尚未提供图像时返回 `Ok(None)`。完成的图像也会投递给所有存活的订阅。
    pub fn draw(&self) -> RenderResult<Option<RenderedImage>> {
        let mut guard = self.stage.lock();
        let stage = &mut *guard;
        let Some(backend) = stage.backend.as_mut() else {
            return Err(RenderError::NotInitialized("draw"));
        };
        backend.make_current()?;

        let seen = stage.uploaded.map_or(0, |(version, _)| version);
        if let Some(snapshot) = self.inputs.image.snapshot_if_newer(seen) {
            backend.upload(&snapshot.payload)?;
            stage.uploaded = Some((snapshot.version, snapshot.payload.size()));
        }
        let Some((_, size)) = stage.uploaded else {
            tracing::trace!("offscreen draw without image");
            return Ok(None);
        };

        let params = self.inputs.params.snapshot();
        let frame = CompositeFrame {
            viewport: size,
            layers: vec![CompositeLayer {
                channel: ChannelIndex::PRIMARY,
                format: ImageFormat::Rgba,
                size,
                mvp: params.transform().mvp(),
            }],
            effect: Effect::from_index(params.int(ParamType::EFFECT)),
            touch: params
                .float_pair(ParamType::TOUCH_LOCATION)
                .unwrap_or((0.5, 0.5)),
            audio_level: 0.0,
            config: stage.config,
        };
        let image = backend.render(&frame)?;

        stage.subscribers.retain(|tx| match tx.try_send(image.clone()) {
            Ok(()) | Err(channel::TrySendError::Full(_)) => true,
            Err(channel::TrySendError::Disconnected(_)) => false,
        });
        Ok(Some(image))
    }

    /// ### English
    /// Releases the EGL objects and GPU resources and drops the pending image. Idempotent; a
    /// no-op before `init`.
    ///
    /// ### 中文
    /// 释放 EGL 对象与 GPU 资源并丢弃待处理图像。幂等；在 `init` 之前调用为空操作。
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn uninit(&self) {
        let mut stage = self.stage.lock();
        let Some(mut backend) = stage.backend.take() else {
            return;
        };
        backend.release();
        stage.uploaded = None;
        self.inputs.image.clear();
    }

    /// ### English
    /// Subscribes to completed readbacks. Dropping the receiver ends the subscription.
    ///
    /// ### 中文
    /// 订阅完成的读回图像；丢弃接收端即结束订阅。
    pub fn subscribe(&self) -> channel::Receiver<RenderedImage> {
        let (tx, rx) = channel::bounded(SUBSCRIPTION_CAPACITY);
        self.stage.lock().subscribers.push(tx);
        rx
    }
}

impl<F: HeadlessFactory> Drop for OffscreenRenderContext<F> {
    fn drop(&mut self) {
        if let Some(mut backend) = self.stage.get_mut().backend.take() {
            backend.release();
        }
    }
}
