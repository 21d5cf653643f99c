//! ### English
//! GL compositor shared by the on-screen renderer and the headless backend.
//!
//! ### 中文
//! 屏幕渲染器与 headless 后端共用的 GL 合成器。

use std::collections::BTreeMap;

use glow::HasContext as _;

use super::info::GlInfo;
use super::program::CompositeProgram;
use super::quad::Quad;
use super::texture::LayerTextures;
use crate::engine::effect::Effect;
use crate::engine::error::{RenderError, RenderResult};
use crate::engine::frame::ImageFrame;
use crate::engine::slot::ChannelIndex;
use crate::engine::surface::CompositeFrame;

pub(crate) struct GlCompositor {
    program: CompositeProgram,
    quad: Quad,
    layers: BTreeMap<ChannelIndex, LayerTextures>,
}

impl GlCompositor {
    pub unsafe fn new(gl: &glow::Context) -> RenderResult<Self> {
        let info = GlInfo::query(gl);
        if !info.is_supported() {
            return Err(RenderError::allocation(format!(
                "GL {}.{} (es: {}) is too old for the compositor",
                info.major, info.minor, info.is_gles
            )));
        }
        tracing::debug!(?info, "creating GL compositor");

        let program = unsafe { CompositeProgram::new(gl, &info)? };
        let quad = match unsafe { Quad::new(gl) } {
            Ok(quad) => quad,
            Err(err) => {
                unsafe { program.destroy(gl) };
                return Err(err);
            }
        };
        Ok(Self {
            program,
            quad,
            layers: BTreeMap::new(),
        })
    }

    pub unsafe fn upload(
        &mut self,
        gl: &glow::Context,
        channel: ChannelIndex,
        frame: &ImageFrame,
    ) -> RenderResult<()> {
        let textures = self.layers.entry(channel).or_insert_with(LayerTextures::new);
        unsafe { textures.upload(gl, frame) }
    }

    /// ### English
    /// Clears to the configured color and draws every layer in order. The effect only applies to
    /// the primary channel; auxiliary layers are alpha-blended on top unless disabled.
    ///
    /// ### 中文
    /// 以配置的颜色清屏并按顺序绘制所有图层。效果只作用于主通道；除非禁用，辅助图层以 alpha
    /// 混合叠加在上方。
    pub unsafe fn composite(&self, gl: &glow::Context, frame: &CompositeFrame) -> RenderResult<()> {
        let [r, g, b, a] = frame.config.clear_color;
        unsafe {
            gl.viewport(0, 0, frame.viewport.width as i32, frame.viewport.height as i32);
            gl.clear_color(r, g, b, a);
            gl.clear(glow::COLOR_BUFFER_BIT);
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);

            self.program.bind(gl);
            let p = &self.program;
            gl.uniform_2_f32(p.touch.as_ref(), frame.touch.0, frame.touch.1);
            gl.uniform_1_f32(p.audio_level.as_ref(), frame.audio_level);

            for layer in &frame.layers {
                let Some(textures) = self.layers.get(&layer.channel) else {
                    continue;
                };
                let primary = layer.channel == ChannelIndex::PRIMARY;
                if !primary && frame.config.blend_layers {
                    gl.enable(glow::BLEND);
                } else {
                    gl.disable(glow::BLEND);
                }
                let effect = if primary { frame.effect } else { Effect::Passthrough };

                textures.bind(gl);
                gl.uniform_matrix_4_f32_slice(p.mvp.as_ref(), false, &layer.mvp.to_cols_array());
                gl.uniform_1_i32(p.format.as_ref(), layer.format.code());
                gl.uniform_1_i32(p.effect.as_ref(), effect.index());
                gl.uniform_2_f32(
                    p.image_size.as_ref(),
                    layer.size.width as f32,
                    layer.size.height as f32,
                );
                self.quad.draw(gl);
            }

            gl.disable(glow::BLEND);
            gl.use_program(None);
            match gl.get_error() {
                glow::NO_ERROR => Ok(()),
                code => Err(RenderError::draw(format!("GL error 0x{code:x} while compositing"))),
            }
        }
    }

    /// ### English
    /// Deletes every GL object owned by the compositor.
    ///
    /// ### 中文
    /// 删除合成器持有的所有 GL 对象。
    pub unsafe fn destroy(&mut self, gl: &glow::Context) {
        unsafe {
            for textures in self.layers.values_mut() {
                textures.delete(gl);
            }
            self.layers.clear();
            self.quad.destroy(gl);
            self.program.destroy(gl);
        }
    }
}
