/// ### English
/// `native_render` cdylib crate root.
/// Exposes the C ABI via `ffi`; core implementation lives under `engine`.
///
/// ### 中文
/// `native_render` 的 cdylib crate 根。
/// 通过 `ffi` 导出 C ABI；核心实现位于 `engine` 模块。
pub mod engine;
mod ffi;

pub use engine::config::RenderConfig;
pub use engine::error::{RenderError, RenderResult};
pub use engine::format::ImageFormat;
pub use engine::offscreen::{OffscreenRenderContext, OffscreenState};
pub use engine::slot::ChannelIndex;
pub use engine::surface::{RenderContext, RenderInputs, SurfaceRenderer, SurfaceState};
pub use ffi::{
    NATIVE_RENDER_ERR_DRAW, NATIVE_RENDER_ERR_INVALID_BUFFER, NATIVE_RENDER_ERR_INVALID_CHANNEL,
    NATIVE_RENDER_ERR_NOT_INITIALIZED, NATIVE_RENDER_ERR_NULL_HANDLE,
    NATIVE_RENDER_ERR_RESOURCE_ALLOCATION, NATIVE_RENDER_OK, NativeEglRender, NativeRender,
};
