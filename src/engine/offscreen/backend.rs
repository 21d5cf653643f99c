//! ### English
//! Seams between the offscreen context and the platform EGL/GL stack.
//!
//! ### 中文
//! 离屏上下文与平台 EGL/GL 栈之间的接口。

use crate::engine::config::RenderConfig;
use crate::engine::error::RenderResult;
use crate::engine::frame::{ImageFrame, RenderedImage};
use crate::engine::surface::CompositeFrame;

/// ### English
/// A live headless GPU context (display + context + offscreen surface + programs).
///
/// ### 中文
/// 一个存活的 headless GPU 上下文（display + context + 离屏 surface + 程序）。
pub trait HeadlessBackend {
    /// ### English
    /// Binds the context and its surface on the calling thread.
    ///
    /// ### 中文
    /// 在调用线程上绑定上下文及其 surface。
    fn make_current(&mut self) -> RenderResult<()>;

    fn upload(&mut self, frame: &ImageFrame) -> RenderResult<()>;

    /// ### English
    /// Composites into an offscreen target of `frame.viewport` size and reads it back top-down.
    ///
    /// ### 中文
    /// 合成到 `frame.viewport` 尺寸的离屏目标，并按自上而下的行顺序读回。
    fn render(&mut self, frame: &CompositeFrame) -> RenderResult<RenderedImage>;

    /// ### English
    /// Releases every GPU/EGL object (idempotent).
    ///
    /// ### 中文
    /// 释放所有 GPU/EGL 对象（幂等）。
    fn release(&mut self);
}

/// ### English
/// Creates [`HeadlessBackend`]s; kept by the context across init/uninit cycles.
///
/// ### 中文
/// 创建 [`HeadlessBackend`]；上下文在多次 init/uninit 之间一直持有它。
pub trait HeadlessFactory {
    type Backend: HeadlessBackend;

    fn create(&mut self, config: &RenderConfig) -> RenderResult<Self::Backend>;
}
