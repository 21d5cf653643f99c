//! ### English
//! GL driver identification used to pick the GLSL dialect.
//!
//! ### 中文
//! 识别 GL 驱动，用于选择 GLSL 方言。

use glow::HasContext as _;

/// ### English
/// Parses the numeric version out of a `GL_VERSION` string.
///
/// Expected forms: `"4.6.0 ..."` or `"OpenGL ES 3.2 ..."`.
///
/// ### 中文
/// 从 `GL_VERSION` 字符串中解析数字版本。
///
/// 期望的版本字符串形式：`"4.6.0 ..."` 或 `"OpenGL ES 3.2 ..."`。
pub(crate) fn parse_gl_version(version: &str) -> (u32, u32) {
    let Some(token) = version
        .split_whitespace()
        .find(|t| t.chars().next().is_some_and(|c| c.is_ascii_digit()))
    else {
        return (0, 0);
    };
    let mut parts = token.split('.');
    let major = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let minor = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    (major, minor)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct GlInfo {
    pub is_gles: bool,
    pub major: u32,
    pub minor: u32,
}

impl GlInfo {
    pub fn from_version_string(version: &str) -> Self {
        let (major, minor) = parse_gl_version(version);
        Self {
            is_gles: version.starts_with("OpenGL ES"),
            major,
            minor,
        }
    }

    /// ### English
    /// Queries `GL_VERSION` on the current context.
    ///
    /// ### 中文
    /// 在当前上下文上查询 `GL_VERSION`。
    pub fn query(gl: &glow::Context) -> Self {
        let version = unsafe { gl.get_parameter_string(glow::VERSION) };
        Self::from_version_string(&version)
    }

    /// ### English
    /// The compositor needs GLSL 3.00 ES or GLSL 3.30 (desktop GL 3.3).
    ///
    /// ### 中文
    /// 合成器需要 GLSL 3.00 ES 或 GLSL 3.30（桌面 GL 3.3）。
    pub fn is_supported(&self) -> bool {
        if self.is_gles {
            self.major >= 3
        } else {
            self.major > 3 || (self.major == 3 && self.minor >= 3)
        }
    }

    pub fn glsl_header(&self) -> &'static str {
        if self.is_gles {
            "#version 300 es\nprecision highp float;\nprecision highp int;\n"
        } else {
            "#version 330 core\n"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_desktop_and_es_versions() {
        assert_eq!(parse_gl_version("4.6.0 NVIDIA 535.54"), (4, 6));
        assert_eq!(parse_gl_version("OpenGL ES 3.2 Mesa 23.1"), (3, 2));
        assert_eq!(parse_gl_version("garbage"), (0, 0));
    }

    #[test]
    fn es_selects_es_header() {
        let info = GlInfo::from_version_string("OpenGL ES 3.0 V@0502.0");
        assert!(info.is_gles);
        assert!(info.is_supported());
        assert!(info.glsl_header().starts_with("#version 300 es"));
    }

    #[test]
    fn old_desktop_is_rejected() {
        let info = GlInfo::from_version_string("2.1 Mesa");
        assert!(!info.is_gles);
        assert!(!info.is_supported());
        assert!(GlInfo::from_version_string("3.3.0 Core").is_supported());
    }
}
