//! ### English
//! Parameter store: open-ended map from parameter type to a small fixed-size value.
//!
//! Unknown types are kept as-is; the drawing code decides which ones it understands. The
//! transform is an ordinary entry under the reserved `ParamType::TRANSFORM`.
//!
//! ### 中文
//! 参数存储：从参数类型到小型定长值的开放映射。
//!
//! 未知类型按原样保存，由绘制代码决定识别哪些类型。变换矩阵只是保留类型
//! `ParamType::TRANSFORM` 下的一条普通记录。
mod transform;

use std::collections::HashMap;

use parking_lot::RwLock;

pub use transform::{Transform, aspect_fit};

/// ### English
/// Parameter type identifier (extensible; well-known values are associated constants).
///
/// ### 中文
/// 参数类型标识（可扩展；常用值以关联常量给出）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamType(pub i32);

impl ParamType {
    /// ### English
    /// Reserved entry holding `(rotate_x, rotate_y, scale_x, scale_y)`.
    ///
    /// Only `update_transform_matrix` writes it; int/float writes to id `-1` are ignored.
    ///
    /// ### 中文
    /// 保留类型：保存 `(rotate_x, rotate_y, scale_x, scale_y)`。
    ///
    /// 只能通过 `update_transform_matrix` 写入；对 id `-1` 的整数/浮点写入会被忽略。
    pub const TRANSFORM: Self = Self(-1);
    /// ### English
    /// Effect / shader index selector (`value0`).
    ///
    /// ### 中文
    /// 效果/着色器索引选择（`value0`）。
    pub const EFFECT: Self = Self(200);
    /// ### English
    /// Normalized touch location `(x, y)` in `[0, 1]`, top-left origin.
    ///
    /// ### 中文
    /// 归一化触摸位置 `(x, y)`，范围 `[0, 1]`，原点在左上角。
    pub const TOUCH_LOCATION: Self = Self(1199);
    pub const GRAVITY_XY: Self = Self(1200);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Int(i32, i32),
    Float(f32, f32),
    Transform(Transform),
}

impl ParamValue {
    /// ### English
    /// Value reported for a type that was never written.
    ///
    /// ### 中文
    /// 从未写入的类型所返回的默认值。
    pub fn default_for(ty: ParamType) -> Self {
        if ty == ParamType::TRANSFORM {
            Self::Transform(Transform::IDENTITY)
        } else {
            Self::Int(0, 0)
        }
    }

    pub fn as_int_pair(&self) -> Option<(i32, i32)> {
        match *self {
            Self::Int(a, b) => Some((a, b)),
            _ => None,
        }
    }

    pub fn as_float_pair(&self) -> Option<(f32, f32)> {
        match *self {
            Self::Float(a, b) => Some((a, b)),
            _ => None,
        }
    }
}

/// ### English
/// Thread-safe parameter map. Every write replaces a whole value under a short write lock, so
/// readers never observe half of a pair.
///
/// ### 中文
/// 线程安全的参数表。每次写入都在短写锁内整体替换一个值，读者不会看到只更新一半的数据。
#[derive(Default)]
pub struct ParameterStore {
    values: RwLock<HashMap<ParamType, ParamValue>>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Stores `value` under `ty`. A non-transform value for `ParamType::TRANSFORM` is dropped.
    ///
    /// ### 中文
    /// 以 `ty` 保存 `value`。写入 `ParamType::TRANSFORM` 的非变换值会被丢弃。
    pub fn set(&self, ty: ParamType, value: ParamValue) {
        if ty == ParamType::TRANSFORM && !matches!(value, ParamValue::Transform(_)) {
            tracing::warn!(?value, "write to reserved transform parameter ignored");
            return;
        }
        self.values.write().insert(ty, value);
    }

    pub fn set_int(&self, ty: ParamType, v0: i32, v1: i32) {
        self.set(ty, ParamValue::Int(v0, v1));
    }

    pub fn set_float(&self, ty: ParamType, v0: f32, v1: f32) {
        self.set(ty, ParamValue::Float(v0, v1));
    }

    pub fn set_transform(&self, transform: Transform) {
        self.set(ParamType::TRANSFORM, ParamValue::Transform(transform));
    }

    /// ### English
    /// Last written value for `ty`, or `ParamValue::default_for(ty)`.
    ///
    /// ### 中文
    /// 返回 `ty` 最近一次写入的值，否则返回 `ParamValue::default_for(ty)`。
    pub fn get(&self, ty: ParamType) -> ParamValue {
        self.values
            .read()
            .get(&ty)
            .copied()
            .unwrap_or_else(|| ParamValue::default_for(ty))
    }

    pub fn transform(&self) -> Transform {
        match self.get(ParamType::TRANSFORM) {
            ParamValue::Transform(transform) => transform,
            _ => Transform::IDENTITY,
        }
    }

    pub fn int_pair(&self, ty: ParamType) -> Option<(i32, i32)> {
        self.get(ty).as_int_pair()
    }

    pub fn float_pair(&self, ty: ParamType) -> Option<(f32, f32)> {
        self.get(ty).as_float_pair()
    }

    pub fn int(&self, ty: ParamType) -> i32 {
        self.int_pair(ty).map_or(0, |(v0, _)| v0)
    }

    /// ### English
    /// One consistent copy of every parameter, taken once per frame by the consumer.
    ///
    /// ### 中文
    /// 所有参数的一份一致拷贝，由消费者每帧获取一次。
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            values: self.values.read().clone(),
        }
    }

    pub fn reset(&self) {
        self.values.write().clear();
    }
}

/// ### English
/// Frame-local copy of the parameter store.
///
/// ### 中文
/// 参数存储的帧内拷贝。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamSnapshot {
    values: HashMap<ParamType, ParamValue>,
}

impl ParamSnapshot {
    pub fn get(&self, ty: ParamType) -> ParamValue {
        self.values
            .get(&ty)
            .copied()
            .unwrap_or_else(|| ParamValue::default_for(ty))
    }

    /// ### English
    /// First component of an int entry (offscreen single-value parameters use this).
    ///
    /// ### 中文
    /// 整型记录的第一个分量（离屏单值参数使用）。
    pub fn int(&self, ty: ParamType) -> i32 {
        self.get(ty).as_int_pair().map_or(0, |(v0, _)| v0)
    }

    pub fn float_pair(&self, ty: ParamType) -> Option<(f32, f32)> {
        self.get(ty).as_float_pair()
    }

    pub fn transform(&self) -> Transform {
        match self.get(ParamType::TRANSFORM) {
            ParamValue::Transform(transform) => transform,
            _ => Transform::IDENTITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_types_report_defaults() {
        let store = ParameterStore::new();
        assert_eq!(store.get(ParamType(42)), ParamValue::Int(0, 0));
        assert_eq!(store.transform(), Transform::IDENTITY);
    }

    #[test]
    fn unknown_types_are_stored_opaquely() {
        let store = ParameterStore::new();
        store.set_float(ParamType(123_456), 1.5, -2.5);
        store.set_int(ParamType(-77), 3, 4);
        assert_eq!(store.get(ParamType(123_456)), ParamValue::Float(1.5, -2.5));
        assert_eq!(store.get(ParamType(-77)), ParamValue::Int(3, 4));
    }

    #[test]
    fn later_writes_overwrite_the_whole_pair() {
        let store = ParameterStore::new();
        store.set_int(ParamType::EFFECT, 1, 2);
        store.set_float(ParamType::EFFECT, 0.5, 0.25);
        assert_eq!(store.get(ParamType::EFFECT), ParamValue::Float(0.5, 0.25));
    }

    #[test]
    fn transform_reads_back_exactly() {
        let store = ParameterStore::new();
        store.set_transform(Transform::new(90.0, 0.0, 2.0, 2.0));
        let t = store.transform();
        assert_eq!(
            (t.rotate_x, t.rotate_y, t.scale_x, t.scale_y),
            (90.0, 0.0, 2.0, 2.0)
        );
    }

    #[test]
    fn scalar_writes_cannot_clobber_the_transform() {
        let store = ParameterStore::new();
        let transform = Transform::new(30.0, 60.0, 1.5, 0.5);
        store.set_transform(transform);
        store.set_int(ParamType::TRANSFORM, 7, 8);
        store.set_float(ParamType::TRANSFORM, 1.0, 2.0);
        assert_eq!(store.transform(), transform);
        assert_eq!(store.get(ParamType::TRANSFORM), ParamValue::Transform(transform));
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let store = ParameterStore::new();
        store.set_int(ParamType::EFFECT, 3, 0);
        let snapshot = store.snapshot();
        store.set_int(ParamType::EFFECT, 5, 0);
        assert_eq!(snapshot.int(ParamType::EFFECT), 3);
        assert_eq!(store.snapshot().int(ParamType::EFFECT), 5);
    }

    #[test]
    fn reset_restores_defaults() {
        let store = ParameterStore::new();
        store.set_transform(Transform::new(1.0, 2.0, 3.0, 4.0));
        store.reset();
        assert_eq!(store.transform(), Transform::IDENTITY);
        assert!(store.snapshot().is_empty());
    }
}
