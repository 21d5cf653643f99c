//! ### English
//! Channel-indexed collection of image slots (0 = primary image, 1.. = auxiliary layers).
//!
//! ### 中文
//! 以通道索引组织的图像槽位集合（0 = 主图像，1.. = 辅助图层）。

use std::collections::BTreeMap;
use std::sync::Arc;

use dpi::PhysicalSize;
use parking_lot::RwLock;

use super::{BufferSlot, Snapshot};
use crate::engine::error::{RenderError, RenderResult};
use crate::engine::format::ImageFormat;
use crate::engine::frame::ImageFrame;

/// ### English
/// Producer-assigned logical source channel.
///
/// ### 中文
/// 由生产者指定的逻辑图像源通道。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelIndex(pub u32);

impl ChannelIndex {
    pub const PRIMARY: Self = Self(0);

    /// ### English
    /// Converts a raw index from the C ABI, rejecting negative values.
    ///
    /// ### 中文
    /// 转换来自 C ABI 的原始索引，拒绝负数。
    pub fn from_raw(raw: i32) -> RenderResult<Self> {
        u32::try_from(raw)
            .map(Self)
            .map_err(|_| RenderError::InvalidChannel(raw as i64))
    }
}

/// ### English
/// Growable map of channel slots. Never shrinks while the owning context lives (only `reset`
/// clears it on teardown).
///
/// Writers resolve their slot under a shared read lock, so writes to different channels never
/// wait on each other; the write lock is only taken the first time a channel appears.
///
/// ### 中文
/// 可增长的通道槽位表。所属上下文存活期间不会缩小（仅 teardown 时的 `reset` 会清空）。
///
/// 写入者在共享读锁下定位槽位，因此不同通道的写入互不等待；只有通道首次出现时才会获取写锁。
#[derive(Default)]
pub struct SlottedBufferTable {
    slots: RwLock<BTreeMap<ChannelIndex, Arc<BufferSlot<ImageFrame>>>>,
}

impl SlottedBufferTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Validates and copies `bytes` into channel `index`. Returns the new version.
    ///
    /// Rejected writes leave the slot content and version untouched.
    ///
    /// ### 中文
    /// 校验并把 `bytes` 复制到通道 `index`，返回新版本号。
    ///
    /// 被拒绝的写入不会改变槽位内容与版本号。
    pub fn write(
        &self,
        index: ChannelIndex,
        format: ImageFormat,
        size: PhysicalSize<u32>,
        bytes: &[u8],
    ) -> RenderResult<u64> {
        let Some(slot) = self.slot(index) else {
            let frame = ImageFrame::copy_from(format, size, bytes)?;
            return Ok(self.slot_or_insert(index).publish(frame));
        };

        let frame = match slot.take_spare() {
            Some(mut spare) => {
                spare.refill(format, size, bytes)?;
                spare
            }
            None => ImageFrame::copy_from(format, size, bytes)?,
        };
        Ok(slot.publish(frame))
    }

    /// ### English
    /// Returns the current snapshot of `index`, or `None` ("no data yet").
    ///
    /// ### 中文
    /// 返回通道 `index` 的当前快照；无数据时返回 `None`（“尚无数据”）。
    pub fn snapshot(&self, index: ChannelIndex) -> Option<Snapshot<ImageFrame>> {
        self.slot(index)?.snapshot()
    }

    pub fn version(&self, index: ChannelIndex) -> u64 {
        self.slot(index).map_or(0, |slot| slot.version())
    }

    pub fn slot(&self, index: ChannelIndex) -> Option<Arc<BufferSlot<ImageFrame>>> {
        self.slots.read().get(&index).cloned()
    }

    /// ### English
    /// Returns all known channels with their slots, in ascending channel order.
    ///
    /// ### 中文
    /// 按通道升序返回所有已知通道及其槽位。
    pub fn channels(&self) -> Vec<(ChannelIndex, Arc<BufferSlot<ImageFrame>>)> {
        self.slots
            .read()
            .iter()
            .map(|(index, slot)| (*index, slot.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// ### English
    /// Drops every channel (teardown only).
    ///
    /// ### 中文
    /// 丢弃所有通道（仅用于 teardown）。
    pub fn reset(&self) {
        let slots = std::mem::take(&mut *self.slots.write());
        for slot in slots.values() {
            slot.clear();
        }
    }

    fn slot_or_insert(&self, index: ChannelIndex) -> Arc<BufferSlot<ImageFrame>> {
        if let Some(slot) = self.slot(index) {
            return slot;
        }
        self.slots
            .write()
            .entry(index)
            .or_insert_with(|| Arc::new(BufferSlot::new()))
            .clone()
    }
}
