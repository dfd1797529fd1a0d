//! ブロックのバックエンドとなるメモリの供給元のインタフェース定義と実装群.
//!
//! このモジュールは[Allocator](../allocator/struct.Allocator.html)が、
//! 個々のブロックの中身を格納するために使用する領域を提供する.
use std::fmt;

pub use self::heap::HeapMemory;
pub use self::system::{LibcMemory, LibcRegion};
pub use self::tracking::{MemoryUsage, TrackedRegion, TrackingMemory};

use crate::Result;

mod heap;
mod system;
mod tracking;

/// ブロック用のメモリの供給元を表すトレイト.
///
/// いわゆる"下層の汎用アロケータ"であり、要求されたサイズのバイト列(領域)を都度新しく確保する.
///
/// 確保された領域は、それを表す値(`Region`)が破棄された時点で解放される.
/// つまり、供給元に対して明示的に領域を返却する操作は存在しない.
///
/// 一度解放された領域が、後続の確保要求で再利用されるかどうかは実装依存であり、
/// [Allocator](../allocator/struct.Allocator.html)側はそれを前提としない.
pub trait MemorySource {
    /// 確保された領域.
    ///
    /// `as_ref().len()`は、確保時に要求されたサイズと等しくなければならない.
    type Region: AsRef<[u8]> + AsMut<[u8]> + fmt::Debug;

    /// `size`バイトの領域を新規に確保する.
    ///
    /// 領域の初期値は実装依存.
    ///
    /// # Errors
    ///
    /// 要求サイズ分のメモリを確保できなかった場合には、
    /// 種類が`ErrorKind::AllocationFailure`のエラーが返される.
    fn acquire(&mut self, size: usize) -> Result<Self::Region>;
}
impl<'a, M: MemorySource> MemorySource for &'a mut M {
    type Region = M::Region;

    fn acquire(&mut self, size: usize) -> Result<Self::Region> {
        (**self).acquire(size)
    }
}
