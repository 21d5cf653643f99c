//! ### English
//! Compositor program: compile/link plus cached uniform locations.
//!
//! ### 中文
//! 合成器程序：编译/链接以及缓存的 uniform 位置。

use glow::HasContext as _;

use super::info::GlInfo;
use super::shaders::{COMPOSITE_FRAG, COMPOSITE_VERT, with_header};
use crate::engine::error::{RenderError, RenderResult};

unsafe fn compile_shader(
    gl: &glow::Context,
    kind: u32,
    source: &str,
) -> RenderResult<glow::NativeShader> {
    let shader = unsafe { gl.create_shader(kind) }
        .map_err(|err| RenderError::allocation(format!("create_shader(0x{kind:x}) failed: {err:?}")))?;
    unsafe {
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(RenderError::allocation(format!(
                "shader 0x{kind:x} failed to compile: {log}"
            )));
        }
    }
    Ok(shader)
}

/// ### English
/// Compiles and links a vertex/fragment pair. Shaders are deleted once linked.
///
/// ### 中文
/// 编译并链接一对顶点/片元着色器；链接后删除着色器对象。
pub(crate) unsafe fn compile_program(
    gl: &glow::Context,
    vert_src: &str,
    frag_src: &str,
) -> RenderResult<glow::NativeProgram> {
    let vs = unsafe { compile_shader(gl, glow::VERTEX_SHADER, vert_src)? };
    let fs = match unsafe { compile_shader(gl, glow::FRAGMENT_SHADER, frag_src) } {
        Ok(fs) => fs,
        Err(err) => {
            unsafe { gl.delete_shader(vs) };
            return Err(err);
        }
    };

    unsafe {
        let program = match gl.create_program() {
            Ok(program) => program,
            Err(err) => {
                gl.delete_shader(vs);
                gl.delete_shader(fs);
                return Err(RenderError::allocation(format!(
                    "create_program failed: {err:?}"
                )));
            }
        };
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(RenderError::allocation(format!("program link failed: {log}")));
        }
        Ok(program)
    }
}

pub(crate) struct CompositeProgram {
    pub program: glow::NativeProgram,
    pub mvp: Option<glow::UniformLocation>,
    pub planes: [Option<glow::UniformLocation>; 3],
    pub format: Option<glow::UniformLocation>,
    pub effect: Option<glow::UniformLocation>,
    pub image_size: Option<glow::UniformLocation>,
    pub touch: Option<glow::UniformLocation>,
    pub audio_level: Option<glow::UniformLocation>,
}

impl CompositeProgram {
    pub unsafe fn new(gl: &glow::Context, info: &GlInfo) -> RenderResult<Self> {
        let header = info.glsl_header();
        let program = unsafe {
            compile_program(
                gl,
                &with_header(header, COMPOSITE_VERT),
                &with_header(header, COMPOSITE_FRAG),
            )?
        };
        let uniform = |name: &str| unsafe { gl.get_uniform_location(program, name) };
        Ok(Self {
            program,
            mvp: uniform("u_mvp"),
            planes: [
                uniform("u_plane0"),
                uniform("u_plane1"),
                uniform("u_plane2"),
            ],
            format: uniform("u_format"),
            effect: uniform("u_effect"),
            image_size: uniform("u_image_size"),
            touch: uniform("u_touch"),
            audio_level: uniform("u_audio_level"),
        })
    }

    /// ### English
    /// Binds the program and points the plane samplers at texture units 0..=2.
    ///
    /// ### 中文
    /// 绑定程序，并把各平面采样器指向纹理单元 0..=2。
    pub unsafe fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.use_program(Some(self.program));
            for (unit, location) in self.planes.iter().enumerate() {
                gl.uniform_1_i32(location.as_ref(), unit as i32);
            }
        }
    }

    pub unsafe fn destroy(&self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) };
    }
}
