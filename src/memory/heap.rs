use crate::memory::MemorySource;
use crate::{Error, Result};

/// Rustのグローバルアロケータを用いた`MemorySource`の実装.
///
/// 確保は`Vec::try_reserve_exact`経由で行われるので、
/// メモリ不足時にもプロセスがアボートすることはなく、エラーとして報告される.
///
/// 確保された領域はゼロ埋めされている.
#[derive(Debug, Default, Clone)]
pub struct HeapMemory {
    _priv: (),
}
impl HeapMemory {
    /// 新しい`HeapMemory`インスタンスを生成する.
    pub fn new() -> Self {
        HeapMemory { _priv: () }
    }
}
impl MemorySource for HeapMemory {
    type Region = Vec<u8>;

    fn acquire(&mut self, size: usize) -> Result<Self::Region> {
        let mut buf = Vec::new();
        track!(buf.try_reserve_exact(size).map_err(Error::from))?;
        buf.resize(size, 0);
        Ok(buf)
    }
}
