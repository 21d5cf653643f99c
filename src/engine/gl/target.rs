//! ### English
//! Offscreen render target (FBO + RGBA texture) with CPU readback.
//!
//! ### 中文
//! 离屏渲染目标（FBO + RGBA 纹理）及 CPU 读回。

use dpi::PhysicalSize;
use glow::HasContext as _;

use crate::engine::error::{RenderError, RenderResult};
use crate::engine::frame::{RenderedImage, flip_rows};

pub(crate) struct RenderTarget {
    framebuffer: glow::NativeFramebuffer,
    texture: glow::NativeTexture,
    size: PhysicalSize<u32>,
}

impl RenderTarget {
    pub unsafe fn new(gl: &glow::Context, size: PhysicalSize<u32>) -> RenderResult<Self> {
        unsafe {
            let framebuffer = gl
                .create_framebuffer()
                .map_err(|err| RenderError::allocation(format!("create_framebuffer failed: {err:?}")))?;
            let texture = match gl.create_texture() {
                Ok(texture) => texture,
                Err(err) => {
                    gl.delete_framebuffer(framebuffer);
                    return Err(RenderError::allocation(format!(
                        "create_texture failed: {err:?}"
                    )));
                }
            };
            let mut target = Self {
                framebuffer,
                texture,
                size: PhysicalSize::new(0, 0),
            };

            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.bind_texture(glow::TEXTURE_2D, None);
            target.resize(gl, size);

            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(texture),
                0,
            );
            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            if status != glow::FRAMEBUFFER_COMPLETE {
                target.delete(gl);
                return Err(RenderError::allocation(format!(
                    "framebuffer incomplete: 0x{status:x}"
                )));
            }
            Ok(target)
        }
    }

    /// ### English
    /// Resizes the color texture storage if the size changed.
    ///
    /// ### 中文
    /// 当尺寸变化时，调整颜色纹理的存储大小。
    pub unsafe fn resize(&mut self, gl: &glow::Context, new_size: PhysicalSize<u32>) {
        let new_size = PhysicalSize::new(new_size.width.max(1), new_size.height.max(1));
        if self.size == new_size {
            return;
        }
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                new_size.width as i32,
                new_size.height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(None),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
        self.size = new_size;
    }

    pub unsafe fn bind(&self, gl: &glow::Context) {
        unsafe { gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.framebuffer)) };
    }

    /// ### English
    /// Reads the whole target back as RGBA, flipped so the first row is the top of the image.
    ///
    /// ### 中文
    /// 以 RGBA 读回整个目标，并翻转使第一行对应图像顶部。
    pub unsafe fn read_to_image(&self, gl: &glow::Context) -> RenderedImage {
        let (width, height) = (self.size.width as usize, self.size.height as usize);
        let stride = width * 4;
        let mut pixels = vec![0u8; stride * height];
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.framebuffer));
            gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
            gl.read_pixels(
                0,
                0,
                self.size.width as i32,
                self.size.height as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(Some(&mut pixels)),
            );
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
        flip_rows(&mut pixels, stride, height);
        RenderedImage {
            size: self.size,
            pixels,
        }
    }

    pub unsafe fn delete(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_texture(self.texture);
            gl.delete_framebuffer(self.framebuffer);
        }
    }
}
