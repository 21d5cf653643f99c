/// ### English
/// Engine modules: latest-wins ingestion, parameters, render contexts and the GL backend.
///
/// ### 中文
/// 引擎模块：latest-wins 写入、参数、渲染上下文与 GL 后端。
pub mod audio;
pub mod config;
pub mod effect;
pub mod error;
pub mod format;
pub mod frame;
pub mod gl;
pub mod offscreen;
pub mod params;
pub mod slot;
pub mod surface;
