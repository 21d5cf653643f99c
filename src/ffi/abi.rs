use crate::engine::config;
use crate::engine::format::ImageFormat;

#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn native_render_abi_version() -> u32 {
    super::NATIVE_RENDER_ABI_VERSION
}

#[unsafe(no_mangle)]
/// ### English
/// Returns `NATIVE_RENDER_FLAG_FLIP_Y`.
/// (Constant getter for hosts that do not consume C headers.)
///
/// ### 中文
/// 返回 `NATIVE_RENDER_FLAG_FLIP_Y`。
/// （供不使用 C 头文件的宿主获取常量。）
pub extern "C" fn native_render_flag_flip_y() -> u32 {
    config::NATIVE_RENDER_FLAG_FLIP_Y
}

#[unsafe(no_mangle)]
/// ### English
/// Returns `NATIVE_RENDER_FLAG_OPAQUE_LAYERS`.
///
/// ### 中文
/// 返回 `NATIVE_RENDER_FLAG_OPAQUE_LAYERS`。
pub extern "C" fn native_render_flag_opaque_layers() -> u32 {
    config::NATIVE_RENDER_FLAG_OPAQUE_LAYERS
}

#[unsafe(no_mangle)]
/// ### English
/// Returns `NATIVE_RENDER_FLAG_NO_ASPECT_FIT`.
///
/// ### 中文
/// 返回 `NATIVE_RENDER_FLAG_NO_ASPECT_FIT`。
pub extern "C" fn native_render_flag_no_aspect_fit() -> u32 {
    config::NATIVE_RENDER_FLAG_NO_ASPECT_FIT
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the byte length a tightly packed image needs, or `0` for an unknown format, a
/// non-positive size or a length that overflows `usize`. Lets hosts size buffers without duplicating plane math.
///
/// ### 中文
/// 返回紧密排列图像所需的字节数；格式未知、尺寸非正或长度超出 `usize` 时返回 `0`。
/// 宿主可借此确定缓冲区大小，无需重复平面计算。
pub extern "C" fn native_render_image_byte_len(format: i32, width: i32, height: i32) -> usize {
    let Ok(format) = ImageFormat::from_code(format) else {
        return 0;
    };
    let Ok(size) = super::size_from_raw(width, height) else {
        return 0;
    };
    format.byte_len(size).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_len_matches_plane_layout() {
        assert_eq!(native_render_image_byte_len(ImageFormat::CODE_RGBA, 2, 2), 16);
        assert_eq!(native_render_image_byte_len(ImageFormat::CODE_I420, 4, 4), 24);
    }

    #[test]
    fn unusable_inputs_report_zero() {
        assert_eq!(native_render_image_byte_len(99, 2, 2), 0);
        assert_eq!(native_render_image_byte_len(ImageFormat::CODE_RGBA, -2, 2), 0);
        assert_eq!(native_render_image_byte_len(ImageFormat::CODE_RGBA, 0, 2), 0);
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn overflowing_length_reports_zero() {
        assert_eq!(native_render_image_byte_len(ImageFormat::CODE_RGBA, 65_535, 65_535), 0);
    }
}
