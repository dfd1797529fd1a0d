//! アロケータが管理するブロック関連の構成要素.
use std::mem;

pub use self::handle::BlockHandle;

mod handle;

/// ブロックの状態.
///
/// バックエンドのメモリ(領域)は、使用中(`Live`)の場合にのみ存在する.
#[derive(Debug)]
pub enum BlockState<R> {
    /// 使用中. 領域を保持している.
    Live(R),

    /// 解放済み. 領域は既に下層のアロケータに返却されている.
    Freed,
}

/// 割り当てられた一つの領域を表すレコード.
///
/// レコード自体はアロケータのレジストリが所有しており、
/// 利用者は[`BlockHandle`]経由で参照することになる.
///
/// [`BlockHandle`]: ./struct.BlockHandle.html
#[derive(Debug)]
pub struct MemoryBlock<R> {
    size: usize,
    state: BlockState<R>,
    next: Option<u32>,
}
impl<R> MemoryBlock<R> {
    pub(crate) fn new(size: usize, region: R, next: Option<u32>) -> Self {
        MemoryBlock {
            size,
            state: BlockState::Live(region),
            next,
        }
    }

    /// 割当時に要求されたサイズ(バイト単位).
    ///
    /// 解放後も値は変わらない.
    pub fn size(&self) -> usize {
        self.size
    }

    /// ブロックが使用中かどうか.
    pub fn in_use(&self) -> bool {
        match self.state {
            BlockState::Live(_) => true,
            BlockState::Freed => false,
        }
    }

    /// レコードが初期化済みかどうか.
    ///
    /// レコードは常に全フィールドが設定された状態で生成されるので、この値は常に`true`となる.
    pub fn is_initialized(&self) -> bool {
        true
    }

    /// ブロックの状態を返す.
    pub fn state(&self) -> &BlockState<R> {
        &self.state
    }

    pub(crate) fn next(&self) -> Option<u32> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<u32>) {
        self.next = next;
    }

    /// 領域を解放する.
    ///
    /// 実際に解放が行われた場合には`true`が、既に解放済みの場合には`false`が返される.
    pub(crate) fn release(&mut self) -> bool {
        match mem::replace(&mut self.state, BlockState::Freed) {
            BlockState::Live(region) => {
                mem::drop(region);
                true
            }
            BlockState::Freed => false,
        }
    }
}
impl<R: AsRef<[u8]>> MemoryBlock<R> {
    /// 使用中の場合には、領域全体のバイト列を返す.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self.state {
            BlockState::Live(ref region) => Some(region.as_ref()),
            BlockState::Freed => None,
        }
    }
}
impl<R: AsMut<[u8]>> MemoryBlock<R> {
    pub(crate) fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        match self.state {
            BlockState::Live(ref mut region) => Some(region.as_mut()),
            BlockState::Freed => None,
        }
    }

    /// `data`を領域の先頭に書き込む.
    ///
    /// ブロックが解放済みの場合や、`data`がブロックのサイズを超えている場合には、何も行わない.
    /// 書き込みが行われたかどうかが返り値となる.
    pub(crate) fn write(&mut self, data: &[u8]) -> bool {
        if data.len() > self.size {
            return false;
        }
        match self.bytes_mut().and_then(|bytes| bytes.get_mut(..data.len())) {
            Some(bytes) => {
                bytes.copy_from_slice(data);
                true
            }
            None => false,
        }
    }
}
