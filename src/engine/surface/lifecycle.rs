//! ### English
//! Surface lifecycle transitions for `RenderContext`.
//!
//! ### 中文
//! `RenderContext` 的 surface 生命周期状态转换。

use dpi::PhysicalSize;

use super::{RenderContext, SurfaceRenderer, SurfaceStage, SurfaceState, require_surface};
use crate::engine::error::RenderResult;

impl<R: SurfaceRenderer> SurfaceStage<R> {
    /// ### English
    /// Drops every GPU handle and forgets what was uploaded, so the next draw re-uploads all
    /// channels that have data.
    ///
    /// ### 中文
    /// 释放所有 GPU 句柄并忘记已上传的内容，下一次绘制会重新上传所有有数据的通道。
    fn release_gpu(&mut self) {
        self.renderer.release_resources();
        self.uploaded.clear();
        self.state = SurfaceState::Uninitialized;
    }
}

impl<R: SurfaceRenderer> RenderContext<R> {
    /// ### English
    /// (Re)allocates GPU resources for a new host surface.
    ///
    /// Prior resources are always released first, so repeated calls never accumulate handles.
    /// On failure the context stays `Uninitialized` and the host may retry.
    ///
    /// ### 中文
    /// 为新的宿主 surface（重新）分配 GPU 资源。
    ///
    /// 总是先释放旧资源，因此重复调用不会累积句柄。失败时上下文保持 `Uninitialized`，
    /// 宿主可以重试。
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn on_surface_created(&self) -> RenderResult<()> {
        let mut stage = self.stage.lock();
        if stage.state != SurfaceState::Uninitialized {
            tracing::debug!(state = ?stage.state, "surface recreated, releasing previous GPU resources");
        }
        stage.release_gpu();

        if let Err(err) = stage.renderer.create_resources() {
            tracing::warn!(%err, "GPU resource allocation failed");
            stage.renderer.release_resources();
            return Err(err);
        }

        let viewport = stage.viewport;
        if viewport.width > 0 && viewport.height > 0 {
            stage.renderer.resize(viewport);
        }
        stage.state = SurfaceState::SurfaceReady;
        Ok(())
    }

    /// ### English
    /// Updates viewport sizing. Does not touch GPU resource identity.
    ///
    /// ### 中文
    /// 更新视口尺寸，不改变 GPU 资源本身。
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn on_surface_changed(&self, size: PhysicalSize<u32>) -> RenderResult<()> {
        let mut stage = self.stage.lock();
        require_surface(stage.state, "on_surface_changed")?;
        stage.viewport = size;
        stage.renderer.resize(size);
        stage.state = SurfaceState::Sized;
        Ok(())
    }

    /// ### English
    /// Releases GPU resources and clears every input, returning to `Uninitialized`.
    ///
    /// The context stays usable afterwards and behaves like a freshly constructed one, so
    /// ingestion after teardown is accepted. Idempotent.
    ///
    /// ### 中文
    /// 释放 GPU 资源并清空所有输入，回到 `Uninitialized`。
    ///
    /// 之后上下文仍可使用，表现与新建实例一致，因此 teardown 之后的写入会被接受。幂等。
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn teardown(&self) {
        let mut stage = self.stage.lock();
        stage.release_gpu();
        stage.viewport = PhysicalSize::new(0, 0);
        stage.audio.reset();
        stage.frames = 0;
        self.inputs.reset();
    }
}

impl<R: SurfaceRenderer> Drop for RenderContext<R> {
    fn drop(&mut self) {
        self.stage.get_mut().renderer.release_resources();
    }
}
