//! ### English
//! Unit quad (triangle strip) drawn once per layer.
//!
//! ### 中文
//! 每个图层绘制一次的单位四边形（三角形带）。

use glow::HasContext as _;

use crate::engine::error::{RenderError, RenderResult};

/// ### English
/// `x, y, u, v` per vertex. `v = 0` is the first (top) image row.
///
/// ### 中文
/// 每个顶点为 `x, y, u, v`。`v = 0` 对应图像第一行（顶部）。
const VERTICES: [f32; 16] = [
    -1.0, -1.0, 0.0, 1.0, //
    1.0, -1.0, 1.0, 1.0, //
    -1.0, 1.0, 0.0, 0.0, //
    1.0, 1.0, 1.0, 0.0,
];

pub(crate) struct Quad {
    vao: glow::NativeVertexArray,
    vbo: glow::NativeBuffer,
}

impl Quad {
    pub unsafe fn new(gl: &glow::Context) -> RenderResult<Self> {
        unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|err| RenderError::allocation(format!("create_vertex_array: {err}")))?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(err) => {
                    gl.delete_vertex_array(vao);
                    return Err(RenderError::allocation(format!("create_buffer: {err}")));
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            let bytes: Vec<u8> = VERTICES.iter().flat_map(|v| v.to_ne_bytes()).collect();
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &bytes, glow::STATIC_DRAW);

            let stride = 4 * std::mem::size_of::<f32>() as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, stride, 2 * 4);

            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_vertex_array(None);
            Ok(Self { vao, vbo })
        }
    }

    pub unsafe fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_arrays(glow::TRIANGLE_STRIP, 0, 4);
            gl.bind_vertex_array(None);
        }
    }

    pub unsafe fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
        }
    }
}
