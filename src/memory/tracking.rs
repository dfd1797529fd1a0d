use std::cell::Cell;
use std::rc::Rc;

use crate::memory::MemorySource;
use crate::{ErrorKind, Result};

/// 確保・解放された領域を計測する`MemorySource`のラッパー.
///
/// 任意の`MemorySource`を包み、現在生存している領域の数とバイト数を記録する.
/// また、生存中の領域の合計バイト数に上限を設けることも可能.
///
/// 主に、リークや二重解放が発生していないことを確認するためのテストでの利用を想定している.
///
/// # 注意
///
/// 計測値は`Rc`で共有されているので、このインスタンスは`Send`ではない.
#[derive(Debug)]
pub struct TrackingMemory<M> {
    inner: M,
    usage: MemoryUsage,
    limit_bytes: Option<u64>,
}
impl<M: MemorySource> TrackingMemory<M> {
    /// 新しい`TrackingMemory`インスタンスを生成する.
    pub fn new(inner: M) -> Self {
        TrackingMemory {
            inner,
            usage: MemoryUsage::default(),
            limit_bytes: None,
        }
    }

    /// 生存中の領域の合計バイト数の上限を指定して`TrackingMemory`インスタンスを生成する.
    ///
    /// 上限を超えるような確保要求は、種類が`ErrorKind::AllocationFailure`のエラーとなる.
    pub fn with_limit(inner: M, limit_bytes: u64) -> Self {
        TrackingMemory {
            inner,
            usage: MemoryUsage::default(),
            limit_bytes: Some(limit_bytes),
        }
    }

    /// 計測値を返す.
    ///
    /// 返り値は、このインスタンスと計測値を共有している.
    pub fn usage(&self) -> MemoryUsage {
        self.usage.clone()
    }

    /// 内部の`MemorySource`への参照を返す.
    pub fn inner(&self) -> &M {
        &self.inner
    }
}
impl<M: MemorySource> MemorySource for TrackingMemory<M> {
    type Region = TrackedRegion<M::Region>;

    fn acquire(&mut self, size: usize) -> Result<Self::Region> {
        if let Some(limit) = self.limit_bytes {
            let requested = track_assert_some!(
                self.usage.live_bytes().checked_add(size as u64),
                ErrorKind::AllocationFailure,
                "Too large request: size={}",
                size
            );
            track_assert!(
                requested <= limit,
                ErrorKind::AllocationFailure,
                "Memory limit exceeded: requested={}, limit={}",
                requested,
                limit
            );
        }
        let region = track!(self.inner.acquire(size))?;
        self.usage.acquired(size);
        Ok(TrackedRegion {
            region,
            size,
            usage: self.usage.clone(),
        })
    }
}

/// `TrackingMemory`によって確保された領域.
///
/// 破棄時に、元の領域を解放した上で、計測値を更新する.
#[derive(Debug)]
pub struct TrackedRegion<R> {
    region: R,
    size: usize,
    usage: MemoryUsage,
}
impl<R: AsRef<[u8]>> AsRef<[u8]> for TrackedRegion<R> {
    fn as_ref(&self) -> &[u8] {
        self.region.as_ref()
    }
}
impl<R: AsMut<[u8]>> AsMut<[u8]> for TrackedRegion<R> {
    fn as_mut(&mut self) -> &mut [u8] {
        self.region.as_mut()
    }
}
impl<R> Drop for TrackedRegion<R> {
    fn drop(&mut self) {
        self.usage.released(self.size);
    }
}

/// `TrackingMemory`の計測値.
#[derive(Debug, Default, Clone)]
pub struct MemoryUsage(Rc<UsageCounters>);
impl MemoryUsage {
    /// これまでに確保された領域の数.
    pub fn acquired_regions(&self) -> u64 {
        self.0.acquired_regions.get()
    }

    /// これまでに解放された領域の数.
    pub fn released_regions(&self) -> u64 {
        self.0.released_regions.get()
    }

    /// 現在生存している領域の数.
    pub fn live_regions(&self) -> u64 {
        self.acquired_regions() - self.released_regions()
    }

    /// 現在生存している領域の合計バイト数.
    pub fn live_bytes(&self) -> u64 {
        self.0.live_bytes.get()
    }

    fn acquired(&self, size: usize) {
        let c = &self.0;
        c.acquired_regions.set(c.acquired_regions.get() + 1);
        c.live_bytes.set(c.live_bytes.get() + size as u64);
    }

    fn released(&self, size: usize) {
        let c = &self.0;
        assert!(
            c.released_regions.get() < c.acquired_regions.get(),
            "More regions released than acquired"
        );
        c.released_regions.set(c.released_regions.get() + 1);
        c.live_bytes.set(c.live_bytes.get() - size as u64);
    }
}

#[derive(Debug, Default)]
struct UsageCounters {
    acquired_regions: Cell<u64>,
    released_regions: Cell<u64>,
    live_bytes: Cell<u64>,
}
