//! ### English
//! On-screen render context: producer-facing inputs plus the consumer-owned surface lifecycle.
//!
//! Producers only ever touch [`RenderInputs`] (slot table, parameters, audio). GPU work runs on the
//! thread that owns the host surface and goes through a [`SurfaceRenderer`].
//!
//! ### 中文
//! 屏幕渲染上下文：面向生产者的输入，以及由消费者持有的 surface 生命周期。
//!
//! 生产者只接触 [`RenderInputs`]（槽位表、参数、音频）。GPU 工作在持有宿主 surface 的线程上
//! 通过 [`SurfaceRenderer`] 完成。
mod draw;
mod lifecycle;

use std::collections::BTreeMap;
use std::sync::Arc;

use dpi::PhysicalSize;
use glam::Mat4;
use parking_lot::Mutex;

use crate::engine::audio::AudioLevel;
use crate::engine::config::RenderConfig;
use crate::engine::effect::Effect;
use crate::engine::error::{RenderError, RenderResult};
use crate::engine::format::ImageFormat;
use crate::engine::frame::{AudioFrame, ImageFrame};
use crate::engine::params::{ParamType, ParameterStore, Transform};
use crate::engine::slot::{BufferSlot, ChannelIndex, SlottedBufferTable};

pub use draw::FrameStats;

/// ### English
/// Surface lifecycle state of a [`RenderContext`].
///
/// ### 中文
/// [`RenderContext`] 的 surface 生命周期状态。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    SurfaceReady,
    Sized,
    Drawing,
}

/// ### English
/// One layer handed to [`SurfaceRenderer::composite`], already uploaded to its texture.
///
/// ### 中文
/// 交给 [`SurfaceRenderer::composite`] 的一个图层，其纹理已上传。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeLayer {
    pub channel: ChannelIndex,
    pub format: ImageFormat,
    pub size: PhysicalSize<u32>,
    /// ### English
    /// Model-view-projection matrix for this layer's quad.
    ///
    /// ### 中文
    /// 该图层四边形的模型-视图-投影矩阵。
    pub mvp: Mat4,
}

/// ### English
/// Everything the renderer needs to draw one frame. Layers are in ascending channel order
/// (channel 0 at the bottom).
///
/// ### 中文
/// 渲染器绘制一帧所需的全部信息。图层按通道升序排列（通道 0 在最底层）。
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeFrame {
    pub viewport: PhysicalSize<u32>,
    pub layers: Vec<CompositeLayer>,
    pub effect: Effect,
    pub touch: (f32, f32),
    pub audio_level: f32,
    pub config: RenderConfig,
}

/// ### English
/// GPU backend driven by the consumer thread.
///
/// Implementations own every GPU handle; the context only decides *when* to create, release,
/// upload and composite. All methods are called with the host's GL context current.
///
/// ### 中文
/// 由消费者线程驱动的 GPU 后端。
///
/// 实现者持有所有 GPU 句柄；上下文只决定何时创建、释放、上传与合成。调用所有方法时宿主的
/// GL 上下文均已 current。
pub trait SurfaceRenderer {
    /// ### English
    /// Allocates programs and shared GPU objects. Called after `release_resources` on re-creation.
    ///
    /// ### 中文
    /// 分配着色器程序与共享 GPU 对象；重新创建时会先调用 `release_resources`。
    fn create_resources(&mut self) -> RenderResult<()>;

    /// ### English
    /// Deletes every GPU handle this renderer owns (idempotent).
    ///
    /// ### 中文
    /// 删除该渲染器持有的所有 GPU 句柄（幂等）。
    fn release_resources(&mut self);

    fn resize(&mut self, viewport: PhysicalSize<u32>);

    /// ### English
    /// Uploads `frame` into the texture(s) backing `channel`, allocating them on first use.
    ///
    /// ### 中文
    /// 把 `frame` 上传到 `channel` 对应的纹理，首次使用时分配纹理。
    fn upload(&mut self, channel: ChannelIndex, frame: &ImageFrame) -> RenderResult<()>;

    fn composite(&mut self, frame: &CompositeFrame) -> RenderResult<()>;
}

/// ### English
/// Producer-side state shared between ingestion threads and the consumer.
///
/// Every method is non-blocking with respect to drawing: locks are per-slot or on the parameter
/// map and only cover the pointer/value swap.
///
/// ### 中文
/// 在写入线程与消费者之间共享的生产者侧状态。
///
/// 所有方法都不会被绘制阻塞：锁是每槽位的或参数表上的，只覆盖指针/值交换。
#[derive(Default)]
pub struct RenderInputs {
    images: SlottedBufferTable,
    params: ParameterStore,
    audio: BufferSlot<AudioFrame>,
}

impl RenderInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Writes the primary image (channel 0). Returns the new slot version.
    ///
    /// ### 中文
    /// 写入主图像（通道 0），返回新的槽位版本号。
    pub fn set_image_data(
        &self,
        format: ImageFormat,
        size: PhysicalSize<u32>,
        bytes: &[u8],
    ) -> RenderResult<u64> {
        self.set_image_data_with_index(ChannelIndex::PRIMARY, format, size, bytes)
    }

    pub fn set_image_data_with_index(
        &self,
        index: ChannelIndex,
        format: ImageFormat,
        size: PhysicalSize<u32>,
        bytes: &[u8],
    ) -> RenderResult<u64> {
        self.images
            .write(index, format, size, bytes)
            .inspect_err(|err| tracing::warn!(channel = index.0, %err, "image write rejected"))
    }

    pub fn set_params_int(&self, ty: ParamType, v0: i32, v1: i32) {
        self.params.set_int(ty, v0, v1);
    }

    pub fn set_params_float(&self, ty: ParamType, v0: f32, v1: f32) {
        self.params.set_float(ty, v0, v1);
    }

    /// ### English
    /// Replaces the most recent audio block. Returns the new audio version.
    ///
    /// ### 中文
    /// 替换最近的音频数据块，返回新的音频版本号。
    pub fn set_audio_data(&self, samples: &[i16]) -> RenderResult<u64> {
        let frame = match self.audio.take_spare() {
            Some(mut spare) => spare.refill(samples).map(|()| spare),
            None => AudioFrame::copy_from(samples),
        }
        .inspect_err(|err| tracing::warn!(%err, "audio write rejected"))?;
        Ok(self.audio.publish(frame))
    }

    pub fn update_transform_matrix(
        &self,
        rotate_x: f32,
        rotate_y: f32,
        scale_x: f32,
        scale_y: f32,
    ) {
        self.params
            .set_transform(Transform::new(rotate_x, rotate_y, scale_x, scale_y));
    }

    pub fn images(&self) -> &SlottedBufferTable {
        &self.images
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn audio(&self) -> &BufferSlot<AudioFrame> {
        &self.audio
    }

    fn reset(&self) {
        self.images.reset();
        self.params.reset();
        self.audio.clear();
    }
}

/// ### English
/// What the consumer last uploaded for one channel.
///
/// ### 中文
/// 消费者为某通道最近一次上传的内容。
#[derive(Clone, Copy, Debug, PartialEq)]
struct UploadedLayer {
    version: u64,
    format: ImageFormat,
    size: PhysicalSize<u32>,
}

/// ### English
/// Consumer-only state: never locked by producers.
///
/// ### 中文
/// 仅消费者使用的状态：生产者从不获取这把锁。
struct SurfaceStage<R> {
    renderer: R,
    state: SurfaceState,
    viewport: PhysicalSize<u32>,
    uploaded: BTreeMap<ChannelIndex, UploadedLayer>,
    audio: AudioLevel,
    frames: u64,
    config: RenderConfig,
}

/// ### English
/// Explicitly owned on-screen render context.
///
/// Ingestion methods may be called from any thread. Lifecycle and draw methods must be called
/// from the single thread that owns the host GL context. Tearing down while another thread is
/// inside `on_draw_frame` is a caller error and is not synchronized here.
///
/// ### 中文
/// 显式持有的屏幕渲染上下文。
///
/// 写入方法可在任意线程调用；生命周期与绘制方法必须在持有宿主 GL 上下文的唯一线程调用。
/// 在另一线程处于 `on_draw_frame` 中时执行 teardown 属于调用方错误，此处不做同步。
pub struct RenderContext<R: SurfaceRenderer> {
    inputs: Arc<RenderInputs>,
    stage: Mutex<SurfaceStage<R>>,
}

impl<R: SurfaceRenderer> RenderContext<R> {
    pub fn new(renderer: R, config: RenderConfig) -> Self {
        Self {
            inputs: Arc::new(RenderInputs::new()),
            stage: Mutex::new(SurfaceStage {
                renderer,
                state: SurfaceState::Uninitialized,
                viewport: PhysicalSize::new(0, 0),
                uploaded: BTreeMap::new(),
                audio: AudioLevel::default(),
                frames: 0,
                config,
            }),
        }
    }

    /// ### English
    /// Returns a shareable handle for producer threads.
    ///
    /// ### 中文
    /// 返回可供生产者线程共享的句柄。
    pub fn inputs(&self) -> Arc<RenderInputs> {
        self.inputs.clone()
    }

    pub fn config(&self) -> RenderConfig {
        self.stage.lock().config
    }

    /// ### English
    /// Changes the background color used from the next frame on.
    ///
    /// ### 中文
    /// 修改背景清屏颜色，从下一帧开始生效。
    pub fn set_clear_color(&self, rgba: [f32; 4]) {
        let mut stage = self.stage.lock();
        stage.config = stage.config.with_clear_color(rgba);
    }

    pub fn state(&self) -> SurfaceState {
        self.stage.lock().state
    }

    pub fn viewport(&self) -> PhysicalSize<u32> {
        self.stage.lock().viewport
    }

    /// ### English
    /// Number of frames composited since the context was created or last torn down.
    ///
    /// ### 中文
    /// 自上下文创建或上次 teardown 以来已合成的帧数。
    pub fn frame_count(&self) -> u64 {
        self.stage.lock().frames
    }

    /// ### English
    /// Runs `f` with the renderer (tests and host integrations inspect backend state this way).
    ///
    /// ### 中文
    /// 以渲染器为参数运行 `f`（测试与宿主集成借此查看后端状态）。
    pub fn with_renderer<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.stage.lock().renderer)
    }

    pub fn set_image_data(
        &self,
        format: ImageFormat,
        size: PhysicalSize<u32>,
        bytes: &[u8],
    ) -> RenderResult<u64> {
        self.inputs.set_image_data(format, size, bytes)
    }

    pub fn set_image_data_with_index(
        &self,
        index: ChannelIndex,
        format: ImageFormat,
        size: PhysicalSize<u32>,
        bytes: &[u8],
    ) -> RenderResult<u64> {
        self.inputs
            .set_image_data_with_index(index, format, size, bytes)
    }

    pub fn set_params_int(&self, ty: ParamType, v0: i32, v1: i32) {
        self.inputs.set_params_int(ty, v0, v1);
    }

    pub fn set_params_float(&self, ty: ParamType, v0: f32, v1: f32) {
        self.inputs.set_params_float(ty, v0, v1);
    }

    pub fn set_audio_data(&self, samples: &[i16]) -> RenderResult<u64> {
        self.inputs.set_audio_data(samples)
    }

    pub fn update_transform_matrix(
        &self,
        rotate_x: f32,
        rotate_y: f32,
        scale_x: f32,
        scale_y: f32,
    ) {
        self.inputs
            .update_transform_matrix(rotate_x, rotate_y, scale_x, scale_y);
    }

    pub fn transform(&self) -> Transform {
        self.inputs.params().transform()
    }
}

fn require_surface(state: SurfaceState, op: &'static str) -> RenderResult<()> {
    if state == SurfaceState::Uninitialized {
        return Err(RenderError::NotInitialized(op));
    }
    Ok(())
}
