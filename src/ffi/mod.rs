//! ### English
//! C ABI surface for `native_render`.
//!
//! All exported symbols are `extern "C"` functions. Handles are opaque boxed pointers created and
//! destroyed by explicit calls. Every buffer-passing call copies the caller's bytes before it
//! returns, so the caller may reuse or free its buffer immediately.
//!
//! Calls that can fail return an `i32` status: `NATIVE_RENDER_OK` (`0`) or a negative
//! `NATIVE_RENDER_ERR_*` code.
//!
//! ### 中文
//! `native_render` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数。句柄是由显式调用创建/销毁的不透明 Box 指针。
//! 所有传入缓冲区的调用都会在返回前复制调用方字节，因此调用方可立即复用或释放其缓冲区。
//!
//! 可能失败的调用返回 `i32` 状态码：`NATIVE_RENDER_OK`（`0`）或负数的 `NATIVE_RENDER_ERR_*`。
mod abi;
mod egl;
mod render;

use dpi::PhysicalSize;

use crate::engine::error::{RenderError, RenderResult};
use crate::engine::gl::{GlowSurfaceRenderer, SurfmanHeadlessFactory};
use crate::engine::offscreen::OffscreenRenderContext;
use crate::engine::surface::RenderContext;

pub const NATIVE_RENDER_OK: i32 = 0;
pub const NATIVE_RENDER_ERR_INVALID_BUFFER: i32 = -1;
pub const NATIVE_RENDER_ERR_INVALID_CHANNEL: i32 = -2;
pub const NATIVE_RENDER_ERR_NOT_INITIALIZED: i32 = -3;
pub const NATIVE_RENDER_ERR_RESOURCE_ALLOCATION: i32 = -4;
pub const NATIVE_RENDER_ERR_DRAW: i32 = -5;
/// ### English
/// The handle pointer was NULL.
///
/// ### 中文
/// 句柄指针为 NULL。
pub const NATIVE_RENDER_ERR_NULL_HANDLE: i32 = -6;

/// ### English
/// C ABI version for `native_render`.
///
/// ### 中文
/// `native_render` 的 C ABI 版本号。
const NATIVE_RENDER_ABI_VERSION: u32 = 1;

#[repr(C)]
/// ### English
/// Opaque on-screen render handle. Ingestion calls may come from any thread; surface lifecycle
/// and draw calls must come from the thread that owns the host GL context.
///
/// ### 中文
/// 不透明的屏幕渲染句柄。写入调用可来自任意线程；surface 生命周期与绘制调用必须来自持有
/// 宿主 GL 上下文的线程。
pub struct NativeRender {
    context: RenderContext<GlowSurfaceRenderer>,
}

#[repr(C)]
/// ### English
/// Opaque offscreen render handle owning its own EGL context.
///
/// ### 中文
/// 不透明的离屏渲染句柄，持有自己的 EGL 上下文。
pub struct NativeEglRender {
    context: OffscreenRenderContext<SurfmanHeadlessFactory>,
}

/// ### English
/// Collapses a result into an ABI status code.
///
/// ### 中文
/// 将结果折叠为 ABI 状态码。
fn status<T>(result: RenderResult<T>) -> i32 {
    match result {
        Ok(_) => NATIVE_RENDER_OK,
        Err(err) => err.status_code(),
    }
}

fn size_from_raw(width: i32, height: i32) -> RenderResult<PhysicalSize<u32>> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(width), Ok(height)) => Ok(PhysicalSize::new(width, height)),
        _ => Err(RenderError::invalid_buffer(format!(
            "non-positive image size {width}x{height}"
        ))),
    }
}

/// ### English
/// Borrows `len` elements at `ptr` for the duration of the call.
///
/// `len == 0` yields an empty slice (rejected later as a zero-length payload); NULL with a
/// non-zero length is an invalid buffer.
///
/// # Safety
/// If non-NULL, `ptr` must be valid for reads of `len` elements during the call.
///
/// ### 中文
/// 在本次调用期间借用 `ptr` 处的 `len` 个元素。
///
/// `len == 0` 得到空切片（随后作为零长度数据被拒绝）；NULL 且长度非零视为无效缓冲区。
///
/// # Safety
/// 若非 NULL，`ptr` 在本次调用期间必须可读取 `len` 个元素。
unsafe fn borrow_slice<'a, T>(ptr: *const T, len: usize) -> RenderResult<&'a [T]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(RenderError::invalid_buffer("NULL data pointer"));
    }
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_exported_constants() {
        assert_eq!(status(Ok::<(), RenderError>(())), NATIVE_RENDER_OK);
        assert_eq!(
            status::<()>(Err(RenderError::invalid_buffer(""))),
            NATIVE_RENDER_ERR_INVALID_BUFFER
        );
        assert_eq!(
            status::<()>(Err(RenderError::InvalidChannel(-1))),
            NATIVE_RENDER_ERR_INVALID_CHANNEL
        );
        assert_eq!(
            status::<()>(Err(RenderError::NotInitialized("x"))),
            NATIVE_RENDER_ERR_NOT_INITIALIZED
        );
        assert_eq!(
            status::<()>(Err(RenderError::allocation(""))),
            NATIVE_RENDER_ERR_RESOURCE_ALLOCATION
        );
        assert_eq!(status::<()>(Err(RenderError::draw(""))), NATIVE_RENDER_ERR_DRAW);
    }

    #[test]
    fn negative_sizes_are_invalid_buffers() {
        assert!(size_from_raw(-1, 4).is_err());
        assert_eq!(size_from_raw(3, 4).unwrap(), PhysicalSize::new(3, 4));
    }

    #[test]
    fn null_pointer_with_length_is_rejected() {
        let empty = unsafe { borrow_slice::<u8>(std::ptr::null(), 0) }.unwrap();
        assert!(empty.is_empty());
        assert!(unsafe { borrow_slice::<u8>(std::ptr::null(), 4) }.is_err());
    }
}
