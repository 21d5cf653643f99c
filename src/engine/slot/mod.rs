//! ### English
//! Latest-wins buffer slots shared between producer threads and the render (consumer) thread.
//!
//! A slot publishes `(payload, version)` as one unit under a short lock that only covers the
//! pointer swap; the GPU upload runs on a cloned `Arc` after the lock is released. An atomic
//! mirror of the version lets the consumer skip unchanged slots without locking at all.
//!
//! ### 中文
//! 生产者线程与渲染（消费者）线程共享的 latest-wins 缓冲槽位。
//!
//! 槽位在一把短锁内以整体方式发布 `(payload, version)`，锁只覆盖指针交换；GPU 上传在释放锁之后
//! 基于克隆的 `Arc` 进行。版本号的原子镜像让消费者无需加锁即可跳过未变化的槽位。
mod table;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

pub use table::{ChannelIndex, SlottedBufferTable};

/// ### English
/// A published payload together with the version it was published under.
///
/// Cloning is cheap (`Arc`). Consumers should drop it once the current frame's draw is done.
///
/// ### 中文
/// 已发布的数据及其发布时的版本号。
///
/// 克隆开销很低（`Arc`）。消费者应在当前帧绘制结束后丢弃它。
#[derive(Debug)]
pub struct Snapshot<T> {
    pub version: u64,
    pub payload: Arc<T>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            payload: self.payload.clone(),
        }
    }
}

/// ### English
/// One reusable storage cell holding the latest payload for a channel.
///
/// Versions start at `0` ("never written") and increase by one per accepted write.
///
/// ### 中文
/// 保存某个通道最新数据的可复用存储单元。
///
/// 版本号从 `0`（从未写入）开始，每次成功写入加一。
pub struct BufferSlot<T> {
    /// ### English
    /// Lock-free mirror of the latest published version (consumer-side change check).
    ///
    /// ### 中文
    /// 最新发布版本号的无锁镜像（消费者侧变化探测）。
    version: AtomicU64,
    /// ### English
    /// Currently published snapshot. The lock only guards the swap/clone.
    ///
    /// ### 中文
    /// 当前发布的快照；锁只保护交换/克隆。
    current: Mutex<Option<Snapshot<T>>>,
    /// ### English
    /// Single recycled payload whose allocation the next writer may reuse.
    ///
    /// ### 中文
    /// 单个回收的数据对象，下一个写入者可复用其内存分配。
    spare: Mutex<Option<T>>,
}

impl<T> Default for BufferSlot<T> {
    fn default() -> Self {
        Self {
            version: AtomicU64::new(0),
            current: Mutex::new(None),
            spare: Mutex::new(None),
        }
    }
}

impl<T> BufferSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Publishes `payload`, replacing the previous one. Returns the new version.
    ///
    /// The replaced payload is recycled as spare storage when no reader still holds it.
    ///
    /// ### 中文
    /// 发布 `payload` 并替换旧数据，返回新版本号。
    ///
    /// 若没有读者仍持有被替换的数据，则将其回收为备用存储。
    pub fn publish(&self, payload: T) -> u64 {
        let payload = Arc::new(payload);
        let (version, previous) = {
            let mut current = self.current.lock();
            let version = self.version.load(Ordering::Relaxed).wrapping_add(1);
            let previous = current.replace(Snapshot { version, payload });
            self.version.store(version, Ordering::Release);
            (version, previous)
        };

        if let Some(previous) = previous {
            if let Ok(storage) = Arc::try_unwrap(previous.payload) {
                *self.spare.lock() = Some(storage);
            }
        }
        version
    }

    /// ### English
    /// Takes the recycled payload (if any) so a writer can refill it instead of allocating.
    ///
    /// ### 中文
    /// 取出回收的数据对象（若有），写入者可直接重新填充而无需分配。
    pub fn take_spare(&self) -> Option<T> {
        self.spare.lock().take()
    }

    /// ### English
    /// Returns the current snapshot, or `None` when nothing has been written yet.
    ///
    /// ### 中文
    /// 返回当前快照；尚未写入任何数据时返回 `None`。
    pub fn snapshot(&self) -> Option<Snapshot<T>> {
        self.current.lock().clone()
    }

    /// ### English
    /// Returns the snapshot only if its version is newer than `seen`.
    ///
    /// ### 中文
    /// 仅当版本号新于 `seen` 时返回快照。
    pub fn snapshot_if_newer(&self, seen: u64) -> Option<Snapshot<T>> {
        if self.version() <= seen {
            return None;
        }
        self.snapshot().filter(|snapshot| snapshot.version > seen)
    }

    /// ### English
    /// Latest published version (Acquire load, no lock).
    ///
    /// ### 中文
    /// 最新发布的版本号（Acquire 读取，无锁）。
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// ### English
    /// Drops the published payload and spare storage and rewinds the version to `0`.
    ///
    /// ### 中文
    /// 丢弃已发布数据与备用存储，并把版本号回退到 `0`。
    pub fn clear(&self) {
        let previous = {
            let mut current = self.current.lock();
            self.version.store(0, Ordering::Release);
            current.take()
        };
        drop(previous);
        self.spare.lock().take();
    }
}
