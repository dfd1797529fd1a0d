use std::fmt;
use uuid::Uuid;

/// アロケータが割り当てたブロックを指し示すためのハンドル.
///
/// ハンドルは「割当元のアロケータのUUID」「レコードのスロット位置」「スロットの世代番号」の組であり、
/// ブロックのデータ自体は保持しない.
///
/// スロットはGCで回収された後に、別のブロック用に再利用されることがあるが、
/// その際には世代番号が更新されるので、古いハンドルが新しいブロックを指してしまうことはない.
/// 同様に、別のアロケータが割り当てたハンドルが解決されることもない.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct BlockHandle {
    allocator: Uuid,
    index: u32,
    generation: u32,
}
impl BlockHandle {
    pub(crate) fn new(allocator: Uuid, index: u32, generation: u32) -> Self {
        BlockHandle {
            allocator,
            index,
            generation,
        }
    }

    /// 割当元のアロケータのUUID.
    pub fn allocator(&self) -> Uuid {
        self.allocator
    }

    /// レジストリ内でのスロット位置.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// 割当時点でのスロットの世代番号.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}
impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "BlockHandle(index={}, gen={}, allocator={})",
            self.index, self.generation, self.allocator
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        let uuid = Uuid::new_v4();
        let h = BlockHandle::new(uuid, 3, 7);
        assert_eq!(h.allocator(), uuid);
        assert_eq!(h.index(), 3);
        assert_eq!(h.generation(), 7);
        assert_ne!(h, BlockHandle::new(uuid, 3, 8));
        assert_ne!(h, BlockHandle::new(Uuid::new_v4(), 3, 7));
    }

    #[test]
    fn display_includes_slot_and_generation() {
        let h = BlockHandle::new(Uuid::nil(), 1, 2);
        assert_eq!(
            h.to_string(),
            "BlockHandle(index=1, gen=2, allocator=00000000-0000-0000-0000-000000000000)"
        );
    }
}
