//! ### English
//! Per-frame step for `RenderContext`: upload advanced channels, then composite.
//!
//! ### 中文
//! `RenderContext` 的逐帧步骤：上传版本前进的通道，然后合成。

use dpi::PhysicalSize;
use glam::{Mat4, Vec3};

use super::{
    CompositeFrame, CompositeLayer, RenderContext, SurfaceRenderer, SurfaceState, UploadedLayer,
    require_surface,
};
use crate::engine::config::RenderConfig;
use crate::engine::effect::Effect;
use crate::engine::error::RenderResult;
use crate::engine::params::{ParamType, Transform, aspect_fit};

/// ### English
/// Counters describing one `on_draw_frame` call.
///
/// ### 中文
/// 描述一次 `on_draw_frame` 调用的计数。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// ### English
    /// Channels whose version advanced and were uploaded this frame.
    ///
    /// ### 中文
    /// 本帧版本前进并完成上传的通道数。
    pub uploaded: usize,
    /// ### English
    /// Channels whose upload failed (they keep their previous texture, if any).
    ///
    /// ### 中文
    /// 上传失败的通道数（若有旧纹理则继续使用）。
    pub failed: usize,
    pub layers: usize,
}

impl<R: SurfaceRenderer> RenderContext<R> {
    /// ### English
    /// Draws one frame with whatever data is currently published. Never waits for producers.
    ///
    /// Channels with no data are skipped; with no channels at all only the background is drawn.
    /// Presentation (buffer swap) is left to the host.
    ///
    /// ### 中文
    /// 使用当前已发布的数据绘制一帧，从不等待生产者。
    ///
    /// 没有数据的通道会被跳过；完全没有通道时只绘制背景。呈现（交换缓冲）由宿主负责。
    pub fn on_draw_frame(&self) -> RenderResult<FrameStats> {
        let mut guard = self.stage.lock();
        require_surface(guard.state, "on_draw_frame")?;
        let stage = &mut *guard;
        let mut stats = FrameStats::default();

        for (channel, slot) in self.inputs.images().channels() {
            let seen = stage.uploaded.get(&channel).map_or(0, |layer| layer.version);
            let Some(snapshot) = slot.snapshot_if_newer(seen) else {
                continue;
            };
            let frame = &snapshot.payload;
            match stage.renderer.upload(channel, frame) {
                Ok(()) => {
                    stage.uploaded.insert(
                        channel,
                        UploadedLayer {
                            version: snapshot.version,
                            format: frame.format(),
                            size: frame.size(),
                        },
                    );
                    stats.uploaded += 1;
                }
                Err(err) => {
                    tracing::warn!(channel = channel.0, version = snapshot.version, %err, "upload failed, channel skipped");
                    stats.failed += 1;
                }
            }
        }

        let audio_version = self.inputs.audio().version();
        if audio_version != stage.audio.version() {
            match self.inputs.audio().snapshot() {
                Some(snapshot) => stage
                    .audio
                    .update(snapshot.version, snapshot.payload.samples()),
                None => stage.audio.reset(),
            }
        }

        let params = self.inputs.params().snapshot();
        let transform = params.transform();
        let layers: Vec<CompositeLayer> = stage
            .uploaded
            .iter()
            .map(|(&channel, layer)| CompositeLayer {
                channel,
                format: layer.format,
                size: layer.size,
                mvp: layer_mvp(&transform, layer.size, stage.viewport, &stage.config),
            })
            .collect();
        stats.layers = layers.len();

        let frame = CompositeFrame {
            viewport: stage.viewport,
            layers,
            effect: Effect::from_index(params.int(ParamType::EFFECT)),
            touch: params
                .float_pair(ParamType::TOUCH_LOCATION)
                .unwrap_or((0.5, 0.5)),
            audio_level: stage.audio.level(),
            config: stage.config,
        };
        stage.renderer.composite(&frame)?;

        stage.state = SurfaceState::Drawing;
        stage.frames += 1;
        tracing::trace!(frame = stage.frames, ?stats, "frame composited");
        Ok(stats)
    }
}

/// ### English
/// Full matrix for one layer: aspect fit (in clip space), then the shared transform, then an
/// optional vertical flip for bottom-up input rows.
///
/// ### 中文
/// 单个图层的完整矩阵：先（在裁剪空间）做宽高比适配，再应用共享变换，最后对自下而上的输入行
/// 做可选的垂直翻转。
pub(crate) fn layer_mvp(
    transform: &Transform,
    image: PhysicalSize<u32>,
    viewport: PhysicalSize<u32>,
    config: &RenderConfig,
) -> Mat4 {
    let (fit_x, fit_y) = if config.aspect_fit {
        aspect_fit(image, viewport)
    } else {
        (1.0, 1.0)
    };
    let flip = if config.flip_y { -1.0 } else { 1.0 };
    Mat4::from_scale(Vec3::new(fit_x, fit_y, 1.0))
        * transform.mvp()
        * Mat4::from_scale(Vec3::new(1.0, flip, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn stretch_config_ignores_aspect() {
        let config = RenderConfig::from_flags(crate::engine::config::NATIVE_RENDER_FLAG_NO_ASPECT_FIT);
        let m = layer_mvp(
            &Transform::IDENTITY,
            PhysicalSize::new(400, 100),
            PhysicalSize::new(100, 100),
            &config,
        );
        assert!(m.abs_diff_eq(Transform::IDENTITY.mvp(), 1e-6));
    }

    #[test]
    fn flip_y_mirrors_vertically() {
        let config = RenderConfig::from_flags(crate::engine::config::NATIVE_RENDER_FLAG_FLIP_Y);
        let m = layer_mvp(
            &Transform::IDENTITY,
            PhysicalSize::new(1, 1),
            PhysicalSize::new(1, 1),
            &config,
        );
        let p = m * Vec4::new(0.0, 1.0, 0.0, 1.0);
        assert!((p.y + 1.0).abs() < 1e-5);
    }
}
