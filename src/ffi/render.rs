//! ### English
//! C ABI bindings for the on-screen render context.
//!
//! ### 中文
//! 屏幕渲染上下文的 C ABI 绑定。

use crate::engine::config::RenderConfig;
use crate::engine::format::ImageFormat;
use crate::engine::gl::{GetProcAddressFn, GlowSurfaceRenderer};
use crate::engine::params::ParamType;
use crate::engine::slot::ChannelIndex;
use crate::engine::surface::RenderContext;

use super::{NATIVE_RENDER_ERR_NULL_HANDLE, NativeRender, borrow_slice, size_from_raw, status};

/// ### English
/// Dereferences a handle or returns `NATIVE_RENDER_ERR_NULL_HANDLE` from the caller.
///
/// ### 中文
/// 解引用句柄；为 NULL 时让调用方返回 `NATIVE_RENDER_ERR_NULL_HANDLE`。
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
/// Creates an on-screen render handle.
///
/// `get_proc_address` resolves GL symbols of the host context (e.g. `eglGetProcAddress`); it is
/// first used by `native_render_on_surface_created`. `flags` is a `NATIVE_RENDER_FLAG_*` mask.
/// Returns NULL if `get_proc_address` is NULL.
///
/// ### 中文
/// 创建屏幕渲染句柄。
///
/// `get_proc_address` 用于解析宿主上下文的 GL 符号（如 `eglGetProcAddress`），首次使用在
/// `native_render_on_surface_created` 中。`flags` 为 `NATIVE_RENDER_FLAG_*` 掩码。
/// 若 `get_proc_address` 为 NULL 则返回 NULL。
pub extern "C" fn native_render_create(
    get_proc_address: Option<GetProcAddressFn>,
    flags: u32,
) -> *mut NativeRender {
    let Some(get_proc_address) = get_proc_address else {
        return std::ptr::null_mut();
    };
    let context = RenderContext::new(
        GlowSurfaceRenderer::new(get_proc_address),
        RenderConfig::from_flags(flags),
    );
    Box::into_raw(Box::new(NativeRender { context }))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a handle created by `native_render_create`. Must be called on the GL thread with the
/// host context current so GPU objects can be deleted. No other call may be in flight.
///
/// ### 中文
/// 销毁由 `native_render_create` 创建的句柄。必须在 GL 线程且宿主上下文 current 时调用，以便删除
/// GPU 对象；此时不得有其他调用在进行中。
pub unsafe extern "C" fn native_render_destroy(render: *mut NativeRender) {
    if render.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(render));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Releases GPU resources and clears all inputs; the handle stays valid and behaves like a newly
/// created one. The host must have stopped calling `native_render_on_draw_frame` first.
///
/// ### 中文
/// 释放 GPU 资源并清空所有输入；句柄依然有效，表现与新建句柄一致。宿主必须先停止调用
/// `native_render_on_draw_frame`。
pub unsafe extern "C" fn native_render_uninit(render: *mut NativeRender) -> i32 {
    let context = handle!(render);
    context.teardown();
    super::NATIVE_RENDER_OK
}

#[unsafe(no_mangle)]
/// ### English
/// Copies an image into channel 0. `format` is an `ImageFormat` code; `len` must equal the exact
/// byte length for `format`/`width`/`height`.
///
/// ### 中文
/// 将图像复制到通道 0。`format` 为 `ImageFormat` 编码；`len` 必须等于 `format`/`width`/`height`
/// 对应的精确字节数。
pub unsafe extern "C" fn native_render_set_image_data(
    render: *mut NativeRender,
    format: i32,
    width: i32,
    height: i32,
    data: *const u8,
    len: usize,
) -> i32 {
    unsafe {
        native_render_set_image_data_with_index(render, 0, format, width, height, data, len)
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Copies an image into channel `index` (0 = primary, 1.. = auxiliary layers).
///
/// ### 中文
/// 将图像复制到通道 `index`（0 = 主图像，1.. = 辅助图层）。
pub unsafe extern "C" fn native_render_set_image_data_with_index(
    render: *mut NativeRender,
    index: i32,
    format: i32,
    width: i32,
    height: i32,
    data: *const u8,
    len: usize,
) -> i32 {
    let context = handle!(render);
    status((|| {
        let index = ChannelIndex::from_raw(index)?;
        let format = ImageFormat::from_code(format)?;
        let size = size_from_raw(width, height)?;
        let bytes = unsafe { borrow_slice(data, len)? };
        context.set_image_data_with_index(index, format, size, bytes)
    })())
}

#[unsafe(no_mangle)]
/// ### English
/// Stores an integer pair under `param_type`. Type `-1` is reserved for the transform and ignored.
///
/// ### 中文
/// 以 `param_type` 保存整数对。类型 `-1` 为变换保留，写入会被忽略。
pub unsafe extern "C" fn native_render_set_params_int(
    render: *mut NativeRender,
    param_type: i32,
    value0: i32,
    value1: i32,
) -> i32 {
    let context = handle!(render);
    context.set_params_int(ParamType(param_type), value0, value1);
    super::NATIVE_RENDER_OK
}

#[unsafe(no_mangle)]
/// ### English
/// Float counterpart of `native_render_set_params_int`; the same reserved type applies.
///
/// ### 中文
/// `native_render_set_params_int` 的浮点版本；同样的保留类型规则适用。
pub unsafe extern "C" fn native_render_set_params_float(
    render: *mut NativeRender,
    param_type: i32,
    value0: f32,
    value1: f32,
) -> i32 {
    let context = handle!(render);
    context.set_params_float(ParamType(param_type), value0, value1);
    super::NATIVE_RENDER_OK
}

#[unsafe(no_mangle)]
/// ### English
/// Replaces the most recent audio block with `count` 16-bit PCM samples.
///
/// ### 中文
/// 用 `count` 个 16 位 PCM 采样替换最近的音频数据块。
pub unsafe extern "C" fn native_render_set_audio_data(
    render: *mut NativeRender,
    samples: *const i16,
    count: usize,
) -> i32 {
    let context = handle!(render);
    status(unsafe { borrow_slice(samples, count) }.and_then(|s| context.set_audio_data(s)))
}

#[unsafe(no_mangle)]
/// ### English
/// Sets the model transform: rotation in degrees about X and Y, then scale.
///
/// ### 中文
/// 设置模型变换：绕 X、Y 轴的旋转角（角度制）以及缩放。
pub unsafe extern "C" fn native_render_update_transform_matrix(
    render: *mut NativeRender,
    rotate_x: f32,
    rotate_y: f32,
    scale_x: f32,
    scale_y: f32,
) -> i32 {
    let context = handle!(render);
    context.update_transform_matrix(rotate_x, rotate_y, scale_x, scale_y);
    super::NATIVE_RENDER_OK
}

#[unsafe(no_mangle)]
/// ### English
/// Sets the RGBA background color used from the next frame on (default opaque black).
///
/// ### 中文
/// 设置自下一帧起使用的 RGBA 背景色（默认不透明黑色）。
pub unsafe extern "C" fn native_render_set_clear_color(
    render: *mut NativeRender,
    red: f32,
    green: f32,
    blue: f32,
    alpha: f32,
) -> i32 {
    let context = handle!(render);
    context.set_clear_color([red, green, blue, alpha]);
    super::NATIVE_RENDER_OK
}

#[unsafe(no_mangle)]
/// ### English
/// (Re)creates GPU resources for the current host surface. Safe to call repeatedly.
///
/// ### 中文
/// 为当前宿主 surface（重新）创建 GPU 资源，可重复调用。
pub unsafe extern "C" fn native_render_on_surface_created(render: *mut NativeRender) -> i32 {
    let context = handle!(render);
    status(context.on_surface_created())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn native_render_on_surface_changed(
    render: *mut NativeRender,
    width: i32,
    height: i32,
) -> i32 {
    let context = handle!(render);
    status(size_from_raw(width, height).and_then(|size| context.on_surface_changed(size)))
}

#[unsafe(no_mangle)]
/// ### English
/// Draws one frame into the host's current framebuffer. The host presents (swaps) afterwards.
///
/// ### 中文
/// 向宿主当前 framebuffer 绘制一帧，随后由宿主负责呈现（交换缓冲）。
pub unsafe extern "C" fn native_render_on_draw_frame(render: *mut NativeRender) -> i32 {
    let context = handle!(render);
    status(context.on_draw_frame())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::{
        NATIVE_RENDER_ERR_INVALID_BUFFER, NATIVE_RENDER_ERR_INVALID_CHANNEL,
        NATIVE_RENDER_ERR_NOT_INITIALIZED, NATIVE_RENDER_OK,
    };
    use std::ffi::{c_char, c_void};

    const RGBA: i32 = ImageFormat::CODE_RGBA;

    unsafe extern "C" fn no_symbols(_name: *const c_char) -> *const c_void {
        std::ptr::null()
    }

    fn create() -> *mut NativeRender {
        let render = native_render_create(Some(no_symbols), 0);
        assert!(!render.is_null());
        render
    }

    #[test]
    fn create_without_loader_returns_null() {
        assert!(native_render_create(None, 0).is_null());
    }

    #[test]
    fn null_handle_is_reported() {
        let null = std::ptr::null_mut();
        let pixel = [0u8; 4];
        unsafe {
            assert_eq!(native_render_on_draw_frame(null), NATIVE_RENDER_ERR_NULL_HANDLE);
            assert_eq!(native_render_on_surface_created(null), NATIVE_RENDER_ERR_NULL_HANDLE);
            assert_eq!(native_render_uninit(null), NATIVE_RENDER_ERR_NULL_HANDLE);
            assert_eq!(
                native_render_set_image_data(null, RGBA, 1, 1, pixel.as_ptr(), pixel.len()),
                NATIVE_RENDER_ERR_NULL_HANDLE
            );
            assert_eq!(
                native_render_set_clear_color(null, 0.0, 0.0, 0.0, 1.0),
                NATIVE_RENDER_ERR_NULL_HANDLE
            );
            native_render_destroy(null);
        }
    }

    #[test]
    fn negative_channel_is_rejected() {
        let render = create();
        let pixel = [0u8; 4];
        unsafe {
            assert_eq!(
                native_render_set_image_data_with_index(
                    render,
                    -1,
                    RGBA,
                    1,
                    1,
                    pixel.as_ptr(),
                    pixel.len()
                ),
                NATIVE_RENDER_ERR_INVALID_CHANNEL
            );
            assert!((*render).context.inputs().images().is_empty());
            native_render_destroy(render);
        }
    }

    #[test]
    fn malformed_buffers_are_rejected() {
        let render = create();
        let short = [0u8; 3];
        unsafe {
            assert_eq!(
                native_render_set_image_data(render, RGBA, 1, 1, short.as_ptr(), short.len()),
                NATIVE_RENDER_ERR_INVALID_BUFFER
            );
            assert_eq!(
                native_render_set_image_data(render, 99, 1, 1, short.as_ptr(), short.len()),
                NATIVE_RENDER_ERR_INVALID_BUFFER
            );
            assert_eq!(
                native_render_set_image_data(render, RGBA, 1, 1, std::ptr::null(), 4),
                NATIVE_RENDER_ERR_INVALID_BUFFER
            );
            native_render_destroy(render);
        }
    }

    #[test]
    fn drawing_before_surface_is_not_initialized() {
        let render = create();
        unsafe {
            assert_eq!(native_render_on_draw_frame(render), NATIVE_RENDER_ERR_NOT_INITIALIZED);
            assert_eq!(
                native_render_on_surface_changed(render, 64, 64),
                NATIVE_RENDER_ERR_NOT_INITIALIZED
            );
            assert_eq!(native_render_uninit(render), NATIVE_RENDER_OK);
            assert_eq!(native_render_uninit(render), NATIVE_RENDER_OK);
            native_render_destroy(render);
        }
    }

    #[test]
    fn clear_color_reaches_the_context() {
        let render = create();
        unsafe {
            assert_eq!(
                native_render_set_clear_color(render, 0.25, 0.5, 0.75, 1.0),
                NATIVE_RENDER_OK
            );
            assert_eq!((*render).context.config().clear_color, [0.25, 0.5, 0.75, 1.0]);
            native_render_destroy(render);
        }
    }
}
