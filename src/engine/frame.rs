//! ### English
//! Owned payloads carried by buffer slots and produced by offscreen readback.
//!
//! Every ingestion call copies the caller's bytes into one of these before returning, so the
//! caller's buffer can be reused immediately. `refill` reuses the allocation of a recycled payload.
//!
//! ### 中文
//! 缓冲槽位承载的自有数据，以及离屏读回产生的图像。
//!
//! 每次写入调用都会在返回前把调用方字节复制到这些类型中，因此调用方缓冲区可立即复用。
//! `refill` 会复用回收数据的内存分配。

use dpi::PhysicalSize;

use super::error::{RenderError, RenderResult};
use super::format::ImageFormat;

/// ### English
/// One image payload: pixel bytes plus the format and size they were validated against.
///
/// ### 中文
/// 一份图像数据：像素字节以及校验时使用的格式与尺寸。
#[derive(Clone, Debug, PartialEq)]
pub struct ImageFrame {
    format: ImageFormat,
    size: PhysicalSize<u32>,
    data: Vec<u8>,
}

impl ImageFrame {
    /// ### English
    /// Validates `bytes` against `format`/`size` and copies them into a new frame.
    ///
    /// ### 中文
    /// 按 `format`/`size` 校验 `bytes`，并复制到新的帧中。
    pub fn copy_from(
        format: ImageFormat,
        size: PhysicalSize<u32>,
        bytes: &[u8],
    ) -> RenderResult<Self> {
        let mut frame = Self {
            format,
            size,
            data: Vec::new(),
        };
        frame.refill(format, size, bytes)?;
        Ok(frame)
    }

    /// ### English
    /// Replaces the content in place, reusing the existing allocation.
    /// On error the frame is left unchanged.
    ///
    /// ### 中文
    /// 原地替换内容，复用现有内存分配；出错时帧保持不变。
    pub fn refill(
        &mut self,
        format: ImageFormat,
        size: PhysicalSize<u32>,
        bytes: &[u8],
    ) -> RenderResult<()> {
        validate_image(format, size, bytes)?;
        self.format = format;
        self.size = size;
        self.data.clear();
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// ### English
    /// Returns the bytes of plane `index` (see `ImageFormat::planes`).
    ///
    /// ### 中文
    /// 返回第 `index` 个平面的字节（见 `ImageFormat::planes`）。
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        let layout = *self.format.planes(self.size).ok()?.get(index)?;
        self.data.get(layout.offset..layout.offset + layout.len)
    }
}

fn validate_image(format: ImageFormat, size: PhysicalSize<u32>, bytes: &[u8]) -> RenderResult<()> {
    if bytes.is_empty() {
        return Err(RenderError::invalid_buffer("zero-length image payload"));
    }
    if size.width == 0 || size.height == 0 {
        return Err(RenderError::invalid_buffer(format!(
            "non-positive image size {}x{}",
            size.width, size.height
        )));
    }

    let expected = format.byte_len(size)?;
    if bytes.len() != expected {
        return Err(RenderError::invalid_buffer(format!(
            "{format:?} {}x{} needs {expected} bytes, got {}",
            size.width,
            size.height,
            bytes.len()
        )));
    }
    Ok(())
}

/// ### English
/// Most recent block of 16-bit PCM samples (drives audio-reactive parameters only).
///
/// ### 中文
/// 最近一段 16 位 PCM 采样（仅用于驱动音频响应参数）。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioFrame {
    samples: Vec<i16>,
}

impl AudioFrame {
    pub fn copy_from(samples: &[i16]) -> RenderResult<Self> {
        let mut frame = Self::default();
        frame.refill(samples)?;
        Ok(frame)
    }

    pub fn refill(&mut self, samples: &[i16]) -> RenderResult<()> {
        if samples.is_empty() {
            return Err(RenderError::invalid_buffer("zero-length audio payload"));
        }
        self.samples.clear();
        self.samples.extend_from_slice(samples);
        Ok(())
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// ### English
/// RGBA8 image read back from an offscreen render target, rows top-down.
///
/// ### 中文
/// 从离屏渲染目标读回的 RGBA8 图像，行顺序自上而下。
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedImage {
    pub size: PhysicalSize<u32>,
    pub pixels: Vec<u8>,
}

/// ### English
/// Flips tightly packed rows in place (GL readback is bottom-up).
///
/// ### 中文
/// 原地翻转紧密排列的行（GL 读回为自下而上）。
pub(crate) fn flip_rows(pixels: &mut [u8], stride: usize, height: usize) {
    for y in 0..(height / 2) {
        let top_start = y * stride;
        let bottom_start = (height - y - 1) * stride;
        let (head, tail) = pixels.split_at_mut(bottom_start);
        let top = &mut head[top_start..top_start + stride];
        let bottom = &mut tail[..stride];
        top.swap_with_slice(bottom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(w: u32, h: u32) -> Vec<u8> {
        (0..w * h * 4).map(|v| v as u8).collect()
    }

    #[test]
    fn short_and_long_buffers_are_rejected() {
        let size = PhysicalSize::new(2, 2);
        let short = vec![0u8; 15];
        let long = vec![0u8; 17];
        assert!(ImageFrame::copy_from(ImageFormat::Rgba, size, &short).is_err());
        assert!(ImageFrame::copy_from(ImageFormat::Rgba, size, &long).is_err());
        assert!(ImageFrame::copy_from(ImageFormat::Rgba, size, &rgba(2, 2)).is_ok());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = ImageFrame::copy_from(ImageFormat::Gray, PhysicalSize::new(0, 4), &[1, 2, 3, 4])
            .unwrap_err();
        assert!(err.to_string().contains("non-positive"));
    }

    #[test]
    fn failed_refill_keeps_previous_content() {
        let size = PhysicalSize::new(2, 1);
        let mut frame = ImageFrame::copy_from(ImageFormat::Rgba, size, &rgba(2, 1)).unwrap();
        let before = frame.clone();
        assert!(frame.refill(ImageFormat::Rgba, size, &[1, 2, 3]).is_err());
        assert_eq!(frame, before);
    }

    #[test]
    fn refill_reuses_capacity() {
        let size = PhysicalSize::new(8, 8);
        let mut frame = ImageFrame::copy_from(ImageFormat::Rgba, size, &rgba(8, 8)).unwrap();
        let ptr = frame.data().as_ptr();
        frame
            .refill(ImageFormat::Rgba, PhysicalSize::new(4, 4), &rgba(4, 4))
            .unwrap();
        assert_eq!(frame.data().as_ptr(), ptr);
        assert_eq!(frame.size(), PhysicalSize::new(4, 4));
    }

    #[test]
    fn nv21_planes_split_luma_and_chroma() {
        let size = PhysicalSize::new(2, 2);
        let bytes = [10, 11, 12, 13, 20, 21];
        let frame = ImageFrame::copy_from(ImageFormat::Nv21, size, &bytes).unwrap();
        assert_eq!(frame.plane(0).unwrap(), &[10, 11, 12, 13]);
        assert_eq!(frame.plane(1).unwrap(), &[20, 21]);
        assert!(frame.plane(2).is_none());
    }

    #[test]
    fn empty_audio_is_rejected() {
        assert!(AudioFrame::copy_from(&[]).is_err());
        assert_eq!(AudioFrame::copy_from(&[1, -1]).unwrap().sample_count(), 2);
    }

    #[test]
    fn flip_rows_swaps_top_and_bottom() {
        let mut pixels = vec![1, 1, 2, 2, 3, 3];
        flip_rows(&mut pixels, 2, 3);
        assert_eq!(pixels, vec![3, 3, 2, 2, 1, 1]);
    }
}
