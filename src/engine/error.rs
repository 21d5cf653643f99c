//! ### English
//! Error taxonomy shared by the on-screen and offscreen render paths.
//!
//! ### 中文
//! 屏幕渲染路径与离屏渲染路径共用的错误分类。

/// ### English
/// Result alias used across the engine.
///
/// ### 中文
/// 引擎内统一使用的 Result 别名。
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// ### English
    /// Payload rejected: zero length, non-positive size, unknown format or byte-length mismatch.
    /// The slot keeps its previous content.
    ///
    /// ### 中文
    /// 数据被拒绝：长度为 0、尺寸非正、未知格式或字节长度不匹配。槽位保留原内容。
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),

    /// ### English
    /// Channel index that cannot address the slot table (negative values from the C ABI).
    ///
    /// ### 中文
    /// 无法寻址槽位表的通道索引（C ABI 传入的负数）。
    #[error("invalid channel index: {0}")]
    InvalidChannel(i64),

    /// ### English
    /// Operation requires GPU/EGL resources that have not been created yet.
    ///
    /// ### 中文
    /// 操作需要的 GPU/EGL 资源尚未创建。
    #[error("not initialized: {0}")]
    NotInitialized(&'static str),

    /// ### English
    /// GPU/EGL resource creation failed; the lifecycle attempt is abandoned and may be retried.
    ///
    /// ### 中文
    /// GPU/EGL 资源创建失败；本次生命周期尝试作废，宿主可重试。
    #[error("resource allocation failure: {0}")]
    ResourceAllocation(String),

    /// ### English
    /// GPU failure while drawing a frame (non-fatal for the context).
    ///
    /// ### 中文
    /// 绘制一帧时发生的 GPU 错误（对上下文非致命）。
    #[error("draw failure: {0}")]
    Draw(String),
}

impl RenderError {
    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }

    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::ResourceAllocation(msg.into())
    }

    pub fn draw(msg: impl Into<String>) -> Self {
        Self::Draw(msg.into())
    }

    /// ### English
    /// Stable status code reported through the C ABI (`0` is reserved for success).
    ///
    /// ### 中文
    /// 通过 C ABI 上报的稳定状态码（`0` 保留给成功）。
    pub fn status_code(&self) -> i32 {
        match self {
            Self::InvalidBuffer(_) => -1,
            Self::InvalidChannel(_) => -2,
            Self::NotInitialized(_) => -3,
            Self::ResourceAllocation(_) => -4,
            Self::Draw(_) => -5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            RenderError::invalid_buffer("x")
                .to_string()
                .contains("invalid buffer:")
        );
        assert!(
            RenderError::allocation("x")
                .to_string()
                .contains("resource allocation failure:")
        );
        assert!(RenderError::draw("x").to_string().contains("draw failure:"));
        assert!(
            RenderError::NotInitialized("draw")
                .to_string()
                .contains("not initialized: draw")
        );
    }

    #[test]
    fn status_codes_are_distinct_and_negative() {
        let codes = [
            RenderError::invalid_buffer("").status_code(),
            RenderError::InvalidChannel(-1).status_code(),
            RenderError::NotInitialized("").status_code(),
            RenderError::allocation("").status_code(),
            RenderError::draw("").status_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert!(*a < 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
