//! ### English
//! Render configuration and the bitflags that select it.
//!
//! Flags are passed through the C ABI as a `u32` bitmask when a context is created.
//!
//! ### 中文
//! 渲染配置以及选择配置的位标志（bitflags）。
//!
//! 创建上下文时，标志通过 C ABI 以 `u32` 位掩码传入。

/// ### English
/// Input rows are stored bottom-up (GL convention) instead of top-down.
///
/// ### 中文
/// 输入图像行按自下而上（GL 约定）存储，而不是自上而下。
pub const NATIVE_RENDER_FLAG_FLIP_Y: u32 = 1 << 0;

/// ### English
/// Draw auxiliary layers opaque (no alpha blending over lower channels).
///
/// ### 中文
/// 辅助图层不透明绘制（不与下层通道做 alpha 混合）。
pub const NATIVE_RENDER_FLAG_OPAQUE_LAYERS: u32 = 1 << 1;

/// ### English
/// Stretch the primary image to the viewport instead of fitting its aspect ratio.
///
/// ### 中文
/// 将主图像拉伸铺满视口，而不是保持宽高比适配。
pub const NATIVE_RENDER_FLAG_NO_ASPECT_FIT: u32 = 1 << 2;

/// ### English
/// Configuration shared by both render paths.
///
/// ### 中文
/// 两条渲染路径共用的配置。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    /// ### English
    /// RGBA clear color used before compositing.
    ///
    /// ### 中文
    /// 合成前使用的 RGBA 清屏颜色。
    pub clear_color: [f32; 4],
    pub flip_y: bool,
    pub blend_layers: bool,
    pub aspect_fit: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            flip_y: false,
            blend_layers: true,
            aspect_fit: true,
        }
    }
}

impl RenderConfig {
    /// ### English
    /// Builds a configuration from a `NATIVE_RENDER_FLAG_*` mask. Unknown bits are ignored.
    ///
    /// ### 中文
    /// 从 `NATIVE_RENDER_FLAG_*` 掩码构造配置；未知位会被忽略。
    pub fn from_flags(flags: u32) -> Self {
        Self {
            flip_y: flags & NATIVE_RENDER_FLAG_FLIP_Y != 0,
            blend_layers: flags & NATIVE_RENDER_FLAG_OPAQUE_LAYERS == 0,
            aspect_fit: flags & NATIVE_RENDER_FLAG_NO_ASPECT_FIT == 0,
            ..Self::default()
        }
    }

    pub fn with_clear_color(mut self, rgba: [f32; 4]) -> Self {
        self.clear_color = rgba;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_flags_match_default() {
        assert_eq!(RenderConfig::from_flags(0), RenderConfig::default());
    }

    #[test]
    fn flags_toggle_their_fields() {
        let config = RenderConfig::from_flags(
            NATIVE_RENDER_FLAG_FLIP_Y
                | NATIVE_RENDER_FLAG_OPAQUE_LAYERS
                | NATIVE_RENDER_FLAG_NO_ASPECT_FIT
                | (1 << 31),
        );
        assert!(config.flip_y);
        assert!(!config.blend_layers);
        assert!(!config.aspect_fit);
    }
}
