//! ### English
//! Audio level derived from the latest PCM block (feeds the audio-reactive effect uniform).
//!
//! ### 中文
//! 由最近一段 PCM 数据计算的音量（供音频响应效果的 uniform 使用）。

/// ### English
/// Root-mean-square of 16-bit samples normalized to `[0, 1]`. Empty input yields `0`.
///
/// ### 中文
/// 16 位采样的均方根，归一化到 `[0, 1]`；空输入返回 `0`。
pub fn rms_level(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples
        .iter()
        .map(|&s| {
            let v = f64::from(s) / 32768.0;
            v * v
        })
        .sum();
    ((sum / samples.len() as f64).sqrt() as f32).clamp(0.0, 1.0)
}

/// ### English
/// Caches the level for the audio slot version it was computed from.
///
/// ### 中文
/// 缓存音量值及其对应的音频槽位版本。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioLevel {
    version: u64,
    level: f32,
}

impl AudioLevel {
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn update(&mut self, version: u64, samples: &[i16]) {
        self.version = version;
        self.level = rms_level(samples);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
