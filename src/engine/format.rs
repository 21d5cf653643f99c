//! ### English
//! Pixel formats accepted by the ingestion API and their plane layouts.
//!
//! Format codes match the host-side constants (`IMAGE_FORMAT_*`).
//!
//! ### 中文
//! 数据写入接口支持的像素格式及其平面布局。
//!
//! 格式编码与宿主侧常量（`IMAGE_FORMAT_*`）一致。

use dpi::PhysicalSize;

use super::error::{RenderError, RenderResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// ### English
    /// Interleaved 8-bit RGBA.
    ///
    /// ### 中文
    /// 交错存储的 8 位 RGBA。
    Rgba,
    /// ### English
    /// Y plane followed by interleaved V/U (Android camera default).
    ///
    /// ### 中文
    /// Y 平面后接交错的 V/U（Android 相机默认格式）。
    Nv21,
    /// ### English
    /// Y plane followed by interleaved U/V.
    ///
    /// ### 中文
    /// Y 平面后接交错的 U/V。
    Nv12,
    /// ### English
    /// Three planes: Y, U, V.
    ///
    /// ### 中文
    /// 三个平面：Y、U、V。
    I420,
    /// ### English
    /// Packed 4:2:2, `Y0 U Y1 V` per pixel pair.
    ///
    /// ### 中文
    /// 打包的 4:2:2，每两个像素为 `Y0 U Y1 V`。
    Yuyv,
    Gray,
}

/// ### English
/// One plane of an image buffer: byte range plus the texture shape it uploads to.
///
/// ### 中文
/// 图像缓冲区中的一个平面：字节范围以及它上传到的纹理形状。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneLayout {
    pub offset: usize,
    pub len: usize,
    /// ### English
    /// Texture width in texels (not pixels: YUYV packs two pixels per texel).
    ///
    /// ### 中文
    /// 纹理宽度（texel，不是像素：YUYV 每个 texel 打包两个像素）。
    pub width: u32,
    pub height: u32,
    /// ### English
    /// Bytes per texel (1, 2 or 4).
    ///
    /// ### 中文
    /// 每个 texel 的字节数（1、2 或 4）。
    pub components: u32,
}

impl ImageFormat {
    pub const CODE_RGBA: i32 = 0x01;
    pub const CODE_NV21: i32 = 0x02;
    pub const CODE_NV12: i32 = 0x03;
    pub const CODE_I420: i32 = 0x04;
    pub const CODE_YUYV: i32 = 0x05;
    pub const CODE_GRAY: i32 = 0x06;

    /// ### English
    /// Maps a host format code to a format, rejecting unknown codes as `InvalidBuffer`.
    ///
    /// ### 中文
    /// 将宿主格式编码映射为格式；未知编码按 `InvalidBuffer` 拒绝。
    pub fn from_code(code: i32) -> RenderResult<Self> {
        match code {
            Self::CODE_RGBA => Ok(Self::Rgba),
            Self::CODE_NV21 => Ok(Self::Nv21),
            Self::CODE_NV12 => Ok(Self::Nv12),
            Self::CODE_I420 => Ok(Self::I420),
            Self::CODE_YUYV => Ok(Self::Yuyv),
            Self::CODE_GRAY => Ok(Self::Gray),
            other => Err(RenderError::invalid_buffer(format!(
                "unsupported image format 0x{other:x}"
            ))),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Rgba => Self::CODE_RGBA,
            Self::Nv21 => Self::CODE_NV21,
            Self::Nv12 => Self::CODE_NV12,
            Self::I420 => Self::CODE_I420,
            Self::Yuyv => Self::CODE_YUYV,
            Self::Gray => Self::CODE_GRAY,
        }
    }

    /// ### English
    /// Returns the plane layouts for an image of `size`. Chroma dimensions round up for odd sizes.
    ///
    /// Sizes whose byte length does not fit in `usize` are rejected as `InvalidBuffer`.
    ///
    /// ### 中文
    /// 返回 `size` 尺寸图像的平面布局；奇数尺寸时色度平面向上取整。
    ///
    /// 字节长度超出 `usize` 范围的尺寸按 `InvalidBuffer` 拒绝。
    pub fn planes(self, size: PhysicalSize<u32>) -> RenderResult<Vec<PlaneLayout>> {
        let (w, h) = (size.width, size.height);
        let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
        let overflow = || {
            RenderError::invalid_buffer(format!(
                "{self:?} {w}x{h} byte length overflows usize"
            ))
        };
        let plane = |offset: usize,
                     width: u32,
                     height: u32,
                     components: u32|
         -> RenderResult<PlaneLayout> {
            let len = (width as usize)
                .checked_mul(height as usize)
                .and_then(|texels| texels.checked_mul(components as usize))
                .ok_or_else(overflow)?;
            offset.checked_add(len).ok_or_else(overflow)?;
            Ok(PlaneLayout {
                offset,
                len,
                width,
                height,
                components,
            })
        };

        match self {
            Self::Rgba => Ok(vec![plane(0, w, h, 4)?]),
            Self::Gray => Ok(vec![plane(0, w, h, 1)?]),
            Self::Nv21 | Self::Nv12 => {
                let luma = plane(0, w, h, 1)?;
                let chroma = plane(luma.len, cw, ch, 2)?;
                Ok(vec![luma, chroma])
            }
            Self::I420 => {
                let luma = plane(0, w, h, 1)?;
                let u = plane(luma.len, cw, ch, 1)?;
                let v = plane(u.offset + u.len, cw, ch, 1)?;
                Ok(vec![luma, u, v])
            }
            Self::Yuyv => Ok(vec![plane(0, cw, h, 4)?]),
        }
    }

    /// ### English
    /// Total byte length of a tightly packed image of `size`.
    ///
    /// ### 中文
    /// 紧密排列时 `size` 尺寸图像的总字节数。
    pub fn byte_len(self, size: PhysicalSize<u32>) -> RenderResult<usize> {
        let planes = self.planes(size)?;
        Ok(planes.last().map_or(0, |p| p.offset + p.len))
    }
}
