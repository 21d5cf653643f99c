//! ### English
//! C ABI bindings for the offscreen (EGL) render context.
//!
//! ### 中文
//! 离屏（EGL）渲染上下文的 C ABI 绑定。

use crate::engine::config::RenderConfig;
use crate::engine::error::RenderError;
use crate::engine::frame::RenderedImage;
use crate::engine::gl::SurfmanHeadlessFactory;
use crate::engine::offscreen::OffscreenRenderContext;
use crate::engine::params::ParamType;

use super::{
    NATIVE_RENDER_ERR_NULL_HANDLE, NATIVE_RENDER_OK, NativeEglRender, borrow_slice, size_from_raw,
    status,
};

macro_rules! handle {
    ($ptr:expr) => {{
        if $ptr.is_null() {
            return NATIVE_RENDER_ERR_NULL_HANDLE;
        }
        unsafe { &(*$ptr).context }
    }};
}

#[unsafe(no_mangle)]
/// ### English
/// Creates an offscreen render handle. No EGL object exists until `native_egl_render_init`.
///
/// ### 中文
/// 创建离屏渲染句柄。在 `native_egl_render_init` 之前不会创建任何 EGL 对象。
pub extern "C" fn native_egl_render_create(flags: u32) -> *mut NativeEglRender {
    let context =
        OffscreenRenderContext::new(SurfmanHeadlessFactory::new(), RenderConfig::from_flags(flags));
    Box::into_raw(Box::new(NativeEglRender { context }))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a handle created by `native_egl_render_create` (implies `uninit`).
///
/// ### 中文
/// 销毁由 `native_egl_render_create` 创建的句柄（隐含 `uninit`）。
pub unsafe extern "C" fn native_egl_render_destroy(render: *mut NativeEglRender) {
    if render.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(render));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn native_egl_render_init(render: *mut NativeEglRender) -> i32 {
    let context = handle!(render);
    status(context.init())
}

#[unsafe(no_mangle)]
/// ### English
/// Copies an RGBA image (`width * height * 4` bytes) into the single offscreen slot.
///
/// ### 中文
/// 将 RGBA 图像（`width * height * 4` 字节）复制到离屏唯一槽位。
pub unsafe extern "C" fn native_egl_render_set_image_data(
    render: *mut NativeEglRender,
    data: *const u8,
    len: usize,
    width: i32,
    height: i32,
) -> i32 {
    let context = handle!(render);
    status((|| {
        let size = size_from_raw(width, height)?;
        let bytes = unsafe { borrow_slice(data, len)? };
        context.set_image_data(size, bytes)
    })())
}

#[unsafe(no_mangle)]
/// ### English
/// Stores `(value, 0)` under `param_type`. Type `-1` is reserved for the transform and ignored.
///
/// ### 中文
/// 以 `param_type` 保存 `(value, 0)`。类型 `-1` 为变换保留，写入会被忽略。
pub unsafe extern "C" fn native_egl_render_set_int_params(
    render: *mut NativeEglRender,
    param_type: i32,
    value: i32,
) -> i32 {
    let context = handle!(render);
    context.set_int_params(ParamType(param_type), value);
    NATIVE_RENDER_OK
}

#[unsafe(no_mangle)]
/// ### English
/// Renders and reads back the composited RGBA image (rows top-down).
///
/// `out_width` / `out_height` (optional) receive the image size, or `0` when no image has been
/// supplied yet. Pixels are copied into `out_pixels` when it is non-NULL and `capacity` is large
/// enough; a too-small buffer returns `NATIVE_RENDER_ERR_INVALID_BUFFER` with the size still
/// reported so the host can grow its buffer.
///
/// ### 中文
/// 渲染并读回合成后的 RGBA 图像（行自上而下）。
///
/// `out_width` / `out_height`（可选）接收图像尺寸；尚未提供图像时为 `0`。当 `out_pixels` 非 NULL
/// 且 `capacity` 足够时复制像素；缓冲区过小时返回 `NATIVE_RENDER_ERR_INVALID_BUFFER`，但仍会
/// 写出尺寸，便于宿主扩大缓冲区。
pub unsafe extern "C" fn native_egl_render_draw(
    render: *mut NativeEglRender,
    out_pixels: *mut u8,
    capacity: usize,
    out_width: *mut u32,
    out_height: *mut u32,
) -> i32 {
    let context = handle!(render);
    match context.draw() {
        Ok(image) => unsafe { write_readback(image, out_pixels, capacity, out_width, out_height) },
        Err(err) => err.status_code(),
    }
}

/// ### English
/// Reports the readback size and copies the pixels into the host buffer.
///
/// # Safety
/// Non-NULL pointers must be valid for writes (`out_pixels` for `capacity` bytes).
///
/// ### 中文
/// 写出读回尺寸并把像素复制到宿主缓冲区。
///
/// # Safety
/// 非 NULL 指针必须可写（`out_pixels` 需可写 `capacity` 字节）。
unsafe fn write_readback(
    image: Option<RenderedImage>,
    out_pixels: *mut u8,
    capacity: usize,
    out_width: *mut u32,
    out_height: *mut u32,
) -> i32 {
    let (width, height) = image
        .as_ref()
        .map_or((0, 0), |image| (image.size.width, image.size.height));
    unsafe {
        if !out_width.is_null() {
            *out_width = width;
        }
        if !out_height.is_null() {
            *out_height = height;
        }
    }

    let Some(image) = image else {
        return NATIVE_RENDER_OK;
    };
    if out_pixels.is_null() {
        return NATIVE_RENDER_OK;
    }
    if capacity < image.pixels.len() {
        return RenderError::invalid_buffer("readback buffer too small").status_code();
    }
    unsafe {
        std::ptr::copy_nonoverlapping(image.pixels.as_ptr(), out_pixels, image.pixels.len());
    }
    NATIVE_RENDER_OK
}

#[unsafe(no_mangle)]
/// ### English
/// Sets the RGBA background color for subsequent draws (default opaque black).
///
/// ### 中文
/// 设置后续绘制使用的 RGBA 背景色（默认不透明黑色）。
pub unsafe extern "C" fn native_egl_render_set_clear_color(
    render: *mut NativeEglRender,
    red: f32,
    green: f32,
    blue: f32,
    alpha: f32,
) -> i32 {
    let context = handle!(render);
    context.set_clear_color([red, green, blue, alpha]);
    NATIVE_RENDER_OK
}

#[unsafe(no_mangle)]
/// ### English
/// Releases the EGL context/surface and GPU resources. Idempotent.
///
/// ### 中文
/// 释放 EGL context/surface 与 GPU 资源。幂等。
pub unsafe extern "C" fn native_egl_render_uninit(render: *mut NativeEglRender) -> i32 {
    let context = handle!(render);
    context.uninit();
    NATIVE_RENDER_OK
}
