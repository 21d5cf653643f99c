//! ### English
//! OpenGL (ES) 3 backend: `glow` for GL calls, `surfman` for the headless EGL context.
//!
//! ### 中文
//! OpenGL (ES) 3 后端：`glow` 负责 GL 调用，`surfman` 负责 headless EGL 上下文。
mod compositor;
mod headless;
mod info;
mod program;
mod quad;
mod shaders;
mod surface_renderer;
mod target;
mod texture;

pub use headless::{SurfmanHeadlessBackend, SurfmanHeadlessFactory};
pub use surface_renderer::{GetProcAddressFn, GlowSurfaceRenderer};
