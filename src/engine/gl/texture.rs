//! ### English
//! Per-channel textures, one per image plane.
//!
//! ### 中文
//! 每通道纹理，每个图像平面一张。

use dpi::PhysicalSize;
use glow::HasContext as _;

use crate::engine::error::{RenderError, RenderResult};
use crate::engine::format::{ImageFormat, PlaneLayout};
use crate::engine::frame::ImageFrame;

fn plane_formats(components: u32) -> (u32, u32) {
    match components {
        1 => (glow::R8, glow::RED),
        2 => (glow::RG8, glow::RG),
        _ => (glow::RGBA8, glow::RGBA),
    }
}

/// ### English
/// Textures backing one channel. Storage is reallocated only when format or size changes.
///
/// ### 中文
/// 支撑一个通道的纹理。仅在格式或尺寸变化时重新分配存储。
pub(crate) struct LayerTextures {
    planes: Vec<glow::NativeTexture>,
    format: Option<ImageFormat>,
    size: PhysicalSize<u32>,
}

impl LayerTextures {
    pub fn new() -> Self {
        Self {
            planes: Vec::new(),
            format: None,
            size: PhysicalSize::new(0, 0),
        }
    }

    pub unsafe fn upload(&mut self, gl: &glow::Context, frame: &ImageFrame) -> RenderResult<()> {
        let layouts = frame.format().planes(frame.size())?;
        unsafe { self.ensure_planes(gl, layouts.len())? };

        let realloc = self.format != Some(frame.format()) || self.size != frame.size();
        unsafe {
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            for (index, (layout, texture)) in layouts.iter().zip(&self.planes).enumerate() {
                let bytes = frame
                    .plane(index)
                    .ok_or_else(|| RenderError::draw(format!("missing plane {index}")))?;
                gl.bind_texture(glow::TEXTURE_2D, Some(*texture));
                upload_plane(gl, layout, bytes, realloc);
            }
            gl.bind_texture(glow::TEXTURE_2D, None);
        }

        self.format = Some(frame.format());
        self.size = frame.size();
        Ok(())
    }

    unsafe fn ensure_planes(&mut self, gl: &glow::Context, count: usize) -> RenderResult<()> {
        while self.planes.len() < count {
            let texture = unsafe { gl.create_texture() }
                .map_err(|err| RenderError::draw(format!("create_texture failed: {err:?}")))?;
            unsafe {
                gl.bind_texture(glow::TEXTURE_2D, Some(texture));
                for (pname, value) in [
                    (glow::TEXTURE_MIN_FILTER, glow::LINEAR),
                    (glow::TEXTURE_MAG_FILTER, glow::LINEAR),
                    (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE),
                    (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE),
                ] {
                    gl.tex_parameter_i32(glow::TEXTURE_2D, pname, value as i32);
                }
            }
            self.planes.push(texture);
            // Force storage allocation for the new plane.
            self.format = None;
        }
        Ok(())
    }

    /// ### English
    /// Binds plane textures to units 0.. (extra units are left untouched).
    ///
    /// ### 中文
    /// 把平面纹理绑定到纹理单元 0..（多余的单元保持不变）。
    pub unsafe fn bind(&self, gl: &glow::Context) {
        for (unit, texture) in self.planes.iter().enumerate() {
            unsafe {
                gl.active_texture(glow::TEXTURE0 + unit as u32);
                gl.bind_texture(glow::TEXTURE_2D, Some(*texture));
            }
        }
        unsafe { gl.active_texture(glow::TEXTURE0) };
    }

    pub unsafe fn delete(&mut self, gl: &glow::Context) {
        for texture in self.planes.drain(..) {
            unsafe { gl.delete_texture(texture) };
        }
        self.format = None;
    }
}

unsafe fn upload_plane(gl: &glow::Context, layout: &PlaneLayout, bytes: &[u8], realloc: bool) {
    let (internal_format, format) = plane_formats(layout.components);
    let (width, height) = (layout.width as i32, layout.height as i32);
    unsafe {
        if realloc {
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format as i32,
                width,
                height,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(bytes)),
            );
        } else {
            gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                0,
                0,
                width,
                height,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(bytes)),
            );
        }
    }
}
