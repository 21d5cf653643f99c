//! ### English
//! Headless backend on top of `surfman`: a private device/context bound to a 1x1 generic surface,
//! with all composition going into an FBO that is read back on every draw.
//!
//! ### 中文
//! 基于 `surfman` 的 headless 后端：私有 device/context 绑定到 1x1 的通用 surface，
//! 所有合成都绘制到 FBO 中，并在每次绘制时读回。

use dpi::PhysicalSize;
use euclid::default::Size2D;
use glow::HasContext as _;
use surfman::{
    Connection, Context, ContextAttributeFlags, ContextAttributes, Device, GLVersion,
    SurfaceAccess, SurfaceType,
};

use super::compositor::GlCompositor;
use super::target::RenderTarget;
use crate::engine::config::RenderConfig;
use crate::engine::error::{RenderError, RenderResult};
use crate::engine::frame::{ImageFrame, RenderedImage};
use crate::engine::offscreen::{HeadlessBackend, HeadlessFactory};
use crate::engine::slot::ChannelIndex;
use crate::engine::surface::CompositeFrame;

/// ### English
/// GLES 3.0 on Android, GL 3.3 core elsewhere (matches the compositor's GLSL dialects).
///
/// ### 中文
/// Android 上为 GLES 3.0，其他平台为 GL 3.3 core（与合成器的 GLSL 方言一致）。
#[cfg(target_os = "android")]
const CONTEXT_VERSION: GLVersion = GLVersion { major: 3, minor: 0 };
#[cfg(not(target_os = "android"))]
const CONTEXT_VERSION: GLVersion = GLVersion { major: 3, minor: 3 };

/// ### English
/// Creates surfman-backed headless contexts (EGL on Android/Linux).
///
/// ### 中文
/// 创建基于 surfman 的 headless 上下文（Android/Linux 上为 EGL）。
#[derive(Default)]
pub struct SurfmanHeadlessFactory {
    _private: (),
}

impl SurfmanHeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HeadlessFactory for SurfmanHeadlessFactory {
    type Backend = SurfmanHeadlessBackend;

    fn create(&mut self, _config: &RenderConfig) -> RenderResult<Self::Backend> {
        SurfmanHeadlessBackend::new()
    }
}

pub struct SurfmanHeadlessBackend {
    device: Device,
    context: Option<Context>,
    gl: glow::Context,
    compositor: Option<GlCompositor>,
    target: Option<RenderTarget>,
}

impl SurfmanHeadlessBackend {
    fn new() -> RenderResult<Self> {
        let connection = Connection::new()
            .map_err(|err| RenderError::allocation(format!("surfman Connection::new failed: {err:?}")))?;
        let adapter = connection
            .create_adapter()
            .map_err(|err| RenderError::allocation(format!("create_adapter failed: {err:?}")))?;
        let mut device = connection
            .create_device(&adapter)
            .map_err(|err| RenderError::allocation(format!("create_device failed: {err:?}")))?;

        let attributes = ContextAttributes {
            version: CONTEXT_VERSION,
            flags: ContextAttributeFlags::ALPHA,
        };
        let descriptor = device
            .create_context_descriptor(&attributes)
            .map_err(|err| RenderError::allocation(format!("create_context_descriptor failed: {err:?}")))?;
        let mut context = device
            .create_context(&descriptor, None)
            .map_err(|err| RenderError::allocation(format!("create_context failed: {err:?}")))?;

        let surface = match device.create_surface(
            &context,
            SurfaceAccess::GPUOnly,
            SurfaceType::Generic {
                size: Size2D::new(1, 1),
            },
        ) {
            Ok(surface) => surface,
            Err(err) => {
                let _ = device.destroy_context(&mut context);
                return Err(RenderError::allocation(format!(
                    "create_surface failed: {err:?}"
                )));
            }
        };
        if let Err((err, mut surface)) = device.bind_surface_to_context(&mut context, surface) {
            let _ = device.destroy_surface(&mut context, &mut surface);
            let _ = device.destroy_context(&mut context);
            return Err(RenderError::allocation(format!(
                "bind_surface_to_context failed: {err:?}"
            )));
        }
        if let Err(err) = device.make_context_current(&context) {
            release_context(&mut device, context);
            return Err(RenderError::allocation(format!(
                "make_context_current failed: {err:?}"
            )));
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|name| device.get_proc_address(&context, name))
        };
        let compositor = match unsafe { GlCompositor::new(&gl) } {
            Ok(compositor) => compositor,
            Err(err) => {
                release_context(&mut device, context);
                return Err(err);
            }
        };
        tracing::debug!("headless surfman context created");

        Ok(Self {
            device,
            context: Some(context),
            gl,
            compositor: Some(compositor),
            target: None,
        })
    }
}

fn release_context(device: &mut Device, mut context: Context) {
    match device.unbind_surface_from_context(&mut context) {
        Ok(Some(mut surface)) => {
            if let Err(err) = device.destroy_surface(&mut context, &mut surface) {
                tracing::warn!(?err, "destroy_surface failed");
            }
        }
        Ok(None) => {}
        Err(err) => tracing::warn!(?err, "unbind_surface_from_context failed"),
    }
    if let Err(err) = device.destroy_context(&mut context) {
        tracing::warn!(?err, "destroy_context failed");
    }
}

impl HeadlessBackend for SurfmanHeadlessBackend {
    fn make_current(&mut self) -> RenderResult<()> {
        let Some(context) = &self.context else {
            return Err(RenderError::NotInitialized("make_current"));
        };
        self.device
            .make_context_current(context)
            .map_err(|err| RenderError::draw(format!("make_context_current failed: {err:?}")))
    }

    fn upload(&mut self, frame: &ImageFrame) -> RenderResult<()> {
        let Some(compositor) = self.compositor.as_mut() else {
            return Err(RenderError::NotInitialized("upload"));
        };
        unsafe { compositor.upload(&self.gl, ChannelIndex::PRIMARY, frame) }
    }

    fn render(&mut self, frame: &CompositeFrame) -> RenderResult<RenderedImage> {
        let Some(compositor) = self.compositor.as_ref() else {
            return Err(RenderError::NotInitialized("render"));
        };
        let size = PhysicalSize::new(frame.viewport.width.max(1), frame.viewport.height.max(1));
        unsafe {
            match self.target.as_mut() {
                Some(target) => target.resize(&self.gl, size),
                None => {
                    let target = RenderTarget::new(&self.gl, size)
                        .map_err(|err| RenderError::draw(err.to_string()))?;
                    self.target = Some(target);
                }
            }
            let Some(target) = self.target.as_ref() else {
                return Err(RenderError::NotInitialized("render target"));
            };
            target.bind(&self.gl);
            compositor.composite(&self.gl, frame)?;
            self.gl.finish();
            Ok(target.read_to_image(&self.gl))
        }
    }

    fn release(&mut self) {
        let Some(context) = self.context.take() else {
            return;
        };
        if self.device.make_context_current(&context).is_ok() {
            unsafe {
                if let Some(mut compositor) = self.compositor.take() {
                    compositor.destroy(&self.gl);
                }
                if let Some(target) = self.target.take() {
                    target.delete(&self.gl);
                }
            }
        }
        self.compositor = None;
        self.target = None;
        release_context(&mut self.device, context);
        tracing::debug!("headless surfman context released");
    }
}

impl Drop for SurfmanHeadlessBackend {
    fn drop(&mut self) {
        self.release();
    }
}
