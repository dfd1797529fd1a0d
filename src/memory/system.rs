use libc::{self, c_void};
use std::cmp;
use std::ptr::NonNull;
use std::slice;

use crate::memory::MemorySource;
use crate::{ErrorKind, Result};

/// Cライブラリのアロケータ(`calloc(3)`/`free(3)`)を用いた`MemorySource`の実装.
///
/// `calloc`が`NULL`を返した場合には、`ErrorKind::AllocationFailure`のエラーとなる.
#[derive(Debug, Default, Clone)]
pub struct LibcMemory {
    _priv: (),
}
impl LibcMemory {
    /// 新しい`LibcMemory`インスタンスを生成する.
    pub fn new() -> Self {
        LibcMemory { _priv: () }
    }
}
impl MemorySource for LibcMemory {
    type Region = LibcRegion;

    fn acquire(&mut self, size: usize) -> Result<Self::Region> {
        // サイズが0の場合の`calloc`の挙動は実装依存なので、最低でも1バイトは確保しておく
        let ptr = unsafe { libc::calloc(cmp::max(size, 1), 1) } as *mut u8;
        let ptr = track_assert_some!(
            NonNull::new(ptr),
            ErrorKind::AllocationFailure,
            "calloc(3) failed: size={}",
            size
        );
        Ok(LibcRegion { ptr, len: size })
    }
}

/// `LibcMemory`によって確保された領域.
///
/// インスタンスの破棄時に`free(3)`が呼び出される.
#[derive(Debug)]
pub struct LibcRegion {
    ptr: NonNull<u8>,
    len: usize,
}
impl AsRef<[u8]> for LibcRegion {
    fn as_ref(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}
impl AsMut<[u8]> for LibcRegion {
    fn as_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}
impl Drop for LibcRegion {
    fn drop(&mut self) {
        unsafe { libc::free(self.ptr.as_ptr() as *mut c_void) }
    }
}
