//! ### English
//! Selectable compositing effects (chosen through `ParamType::EFFECT`).
//!
//! ### 中文
//! 可选的合成效果（通过 `ParamType::EFFECT` 选择）。

/// ### English
/// Effect applied to the primary channel. The discriminant is the shader switch value.
///
/// ### 中文
/// 作用于主通道的效果；判别值即着色器中的分支值。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Effect {
    #[default]
    Passthrough = 0,
    Mosaic = 1,
    Grid = 2,
    Swirl = 3,
    Edge = 4,
    /// ### English
    /// Circular magnifier centered on `ParamType::TOUCH_LOCATION`.
    ///
    /// ### 中文
    /// 以 `ParamType::TOUCH_LOCATION` 为中心的圆形放大镜。
    Magnify = 5,
    /// ### English
    /// Scale/brightness pulse driven by the audio level.
    ///
    /// ### 中文
    /// 由音量驱动的缩放/亮度脉冲。
    AudioPulse = 6,
}

impl Effect {
    pub const ALL: [Self; 7] = [
        Self::Passthrough,
        Self::Mosaic,
        Self::Grid,
        Self::Swirl,
        Self::Edge,
        Self::Magnify,
        Self::AudioPulse,
    ];

    /// ### English
    /// Maps a host index to an effect; unknown indices fall back to `Passthrough`.
    ///
    /// ### 中文
    /// 将宿主索引映射为效果；未知索引回退为 `Passthrough`。
    pub fn from_index(index: i32) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    pub fn index(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_indices_map_back() {
        for effect in Effect::ALL {
            assert_eq!(Effect::from_index(effect.index()), effect);
        }
    }

    #[test]
    fn unknown_indices_fall_back_to_passthrough() {
        assert_eq!(Effect::from_index(-1), Effect::Passthrough);
        assert_eq!(Effect::from_index(7), Effect::Passthrough);
        assert_eq!(Effect::from_index(i32::MAX), Effect::Passthrough);
    }
}
