//! ### English
//! GLSL sources for the compositor. The version header is prepended at compile time
//! (`GlInfo::glsl_header`).
//!
//! ### 中文
//! 合成器的 GLSL 源码。版本头在编译时添加（`GlInfo::glsl_header`）。

pub(crate) const COMPOSITE_VERT: &str = r#"
layout (location = 0) in vec2 a_pos;
layout (location = 1) in vec2 a_uv;
uniform mat4 u_mvp;
out vec2 v_uv;
void main() {
    v_uv = a_uv;
    gl_Position = u_mvp * vec4(a_pos, 0.0, 1.0);
}
"#;

/// ### English
/// `u_format` uses the host format codes (`ImageFormat::code`), `u_effect` the `Effect` index.
///
/// ### 中文
/// `u_format` 使用宿主格式编码（`ImageFormat::code`），`u_effect` 使用 `Effect` 索引。
pub(crate) const COMPOSITE_FRAG: &str = r#"
in vec2 v_uv;
out vec4 o_color;

uniform sampler2D u_plane0;
uniform sampler2D u_plane1;
uniform sampler2D u_plane2;
uniform int u_format;
uniform int u_effect;
uniform vec2 u_image_size;
uniform vec2 u_touch;
uniform float u_audio_level;

vec3 yuv_to_rgb(float y, float u, float v) {
    u -= 0.5;
    v -= 0.5;
    return clamp(vec3(y + 1.402 * v, y - 0.344 * u - 0.714 * v, y + 1.772 * u), 0.0, 1.0);
}

vec4 sample_image(vec2 uv) {
    if (u_format == 2) {
        vec2 vu = texture(u_plane1, uv).rg;
        return vec4(yuv_to_rgb(texture(u_plane0, uv).r, vu.g, vu.r), 1.0);
    }
    if (u_format == 3) {
        vec2 uvc = texture(u_plane1, uv).rg;
        return vec4(yuv_to_rgb(texture(u_plane0, uv).r, uvc.r, uvc.g), 1.0);
    }
    if (u_format == 4) {
        return vec4(yuv_to_rgb(texture(u_plane0, uv).r, texture(u_plane1, uv).r, texture(u_plane2, uv).r), 1.0);
    }
    if (u_format == 5) {
        vec4 t = texture(u_plane0, uv);
        float odd = mod(floor(uv.x * u_image_size.x), 2.0);
        return vec4(yuv_to_rgb(odd < 0.5 ? t.r : t.b, t.g, t.a), 1.0);
    }
    if (u_format == 6) {
        return vec4(vec3(texture(u_plane0, uv).r), 1.0);
    }
    return texture(u_plane0, uv);
}

float luma(vec2 uv) {
    return dot(sample_image(uv).rgb, vec3(0.299, 0.587, 0.114));
}

void main() {
    vec2 uv = v_uv;
    vec2 texel = 1.0 / max(u_image_size, vec2(1.0));

    if (u_effect == 1) {
        vec2 cell = texel * 16.0;
        uv = (floor(uv / cell) + 0.5) * cell;
    } else if (u_effect == 3) {
        vec2 d = uv - vec2(0.5);
        float r = length(d);
        if (r < 0.5) {
            float a = (0.5 - r) * 6.0;
            uv = vec2(0.5) + mat2(cos(a), -sin(a), sin(a), cos(a)) * d;
        }
    } else if (u_effect == 5) {
        vec2 d = uv - u_touch;
        if (length(d) < 0.15) {
            uv = u_touch + d * 0.5;
        }
    } else if (u_effect == 6) {
        uv = vec2(0.5) + (uv - vec2(0.5)) * (1.0 - 0.2 * u_audio_level);
    }

    vec4 color = sample_image(uv);

    if (u_effect == 2) {
        vec2 line = step(vec2(31.0), mod(v_uv * u_image_size, vec2(32.0)));
        color.rgb *= 1.0 - 0.6 * max(line.x, line.y);
    } else if (u_effect == 4) {
        float gx = luma(uv + vec2(texel.x, 0.0)) - luma(uv - vec2(texel.x, 0.0));
        float gy = luma(uv + vec2(0.0, texel.y)) - luma(uv - vec2(0.0, texel.y));
        color.rgb = vec3(clamp(length(vec2(gx, gy)) * 4.0, 0.0, 1.0));
    } else if (u_effect == 6) {
        color.rgb = min(color.rgb * (1.0 + 0.5 * u_audio_level), vec3(1.0));
    }

    o_color = color;
}
"#;

pub(crate) fn with_header(header: &str, body: &str) -> String {
    let mut source = String::with_capacity(header.len() + body.len());
    source.push_str(header);
    source.push_str(body);
    source
}
