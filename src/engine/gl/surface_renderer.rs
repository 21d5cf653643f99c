//! ### English
//! `SurfaceRenderer` backed by the host's current GL(ES) context, loaded through `glow`.
//!
//! ### 中文
//! 基于宿主当前 GL(ES) 上下文、通过 `glow` 加载的 `SurfaceRenderer`。

use std::ffi::{CString, c_char, c_void};
use std::sync::Arc;

use dpi::PhysicalSize;
use glow::HasContext as _;

use super::compositor::GlCompositor;
use crate::engine::error::{RenderError, RenderResult};
use crate::engine::frame::ImageFrame;
use crate::engine::slot::ChannelIndex;
use crate::engine::surface::{CompositeFrame, SurfaceRenderer};

/// ### English
/// Host-provided GL symbol loader (`eglGetProcAddress`-compatible).
///
/// ### 中文
/// 宿主提供的 GL 符号加载函数（与 `eglGetProcAddress` 兼容）。
pub type GetProcAddressFn = unsafe extern "C" fn(name: *const c_char) -> *const c_void;

pub struct GlowSurfaceRenderer {
    get_proc_address: Option<GetProcAddressFn>,
    gl: Option<Arc<glow::Context>>,
    compositor: Option<GlCompositor>,
}

impl GlowSurfaceRenderer {
    /// ### English
    /// Function pointers are loaded lazily on the first `create_resources`, when the host context
    /// is current on the render thread.
    ///
    /// ### 中文
    /// 函数指针在首次 `create_resources` 时延迟加载，此时宿主上下文已在渲染线程 current。
    pub fn new(get_proc_address: GetProcAddressFn) -> Self {
        Self {
            get_proc_address: Some(get_proc_address),
            gl: None,
            compositor: None,
        }
    }

    fn gl(&mut self) -> RenderResult<Arc<glow::Context>> {
        if let Some(gl) = &self.gl {
            return Ok(gl.clone());
        }
        let Some(get_proc_address) = self.get_proc_address else {
            return Err(RenderError::allocation("no GL loader available"));
        };
        let gl = unsafe {
            glow::Context::from_loader_function(|name| match CString::new(name) {
                Ok(name) => get_proc_address(name.as_ptr()),
                Err(_) => std::ptr::null(),
            })
        };
        let gl = Arc::new(gl);
        self.gl = Some(gl.clone());
        Ok(gl)
    }
}

impl SurfaceRenderer for GlowSurfaceRenderer {
    fn create_resources(&mut self) -> RenderResult<()> {
        let gl = self.gl()?;
        let compositor = unsafe { GlCompositor::new(&gl)? };
        self.compositor = Some(compositor);
        Ok(())
    }

    fn release_resources(&mut self) {
        let Some(mut compositor) = self.compositor.take() else {
            return;
        };
        if let Some(gl) = &self.gl {
            unsafe { compositor.destroy(gl) };
        }
    }

    fn resize(&mut self, viewport: PhysicalSize<u32>) {
        if let Some(gl) = &self.gl {
            unsafe { gl.viewport(0, 0, viewport.width as i32, viewport.height as i32) };
        }
    }

    fn upload(&mut self, channel: ChannelIndex, frame: &ImageFrame) -> RenderResult<()> {
        let (Some(gl), Some(compositor)) = (&self.gl, self.compositor.as_mut()) else {
            return Err(RenderError::NotInitialized("upload"));
        };
        unsafe { compositor.upload(gl, channel, frame) }
    }

    fn composite(&mut self, frame: &CompositeFrame) -> RenderResult<()> {
        let (Some(gl), Some(compositor)) = (&self.gl, self.compositor.as_ref()) else {
            return Err(RenderError::NotInitialized("composite"));
        };
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            compositor.composite(gl, frame)
        }
    }
}
