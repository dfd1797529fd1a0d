//! Block Registry.
use std::mem;
use trackable::error::ErrorKindExt;

use crate::block::MemoryBlock;
use crate::{ErrorKind, Result};

/// ブロックのレコード群を保持するレジストリ.
///
/// レコードはスロットの配列(アリーナ)に格納され、
/// 各レコードの`next`にはスロット位置が格納されている.
/// これによって「最後に割り当てられたものが先頭」となる単方向リストが構成される.
///
/// GCによって空いたスロットは、空きスロットのリスト(これもスロット位置で連結される)に繋がれ、
/// 以後のレコードの格納に再利用される.
/// 再利用の際には世代番号がインクリメントされている.
#[derive(Debug)]
pub struct Registry<R> {
    slots: Vec<Slot<R>>,
    head: Option<u32>,
    vacant_head: Option<u32>,
    len: usize,
    max_len: usize,
}
impl<R> Registry<R> {
    pub fn new(max_len: usize) -> Self {
        Registry {
            slots: Vec::new(),
            head: None,
            vacant_head: None,
            len: 0,
            max_len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub fn head(&self) -> Option<u32> {
        self.head
    }

    /// 新しいレコードを先頭に追加し、そのスロット位置と世代番号を返す.
    ///
    /// レコードを格納できない場合には`ErrorKind::InitializationFailure`のエラーが返される.
    /// その際には`region`は破棄(解放)される.
    pub fn insert(&mut self, size: usize, region: R) -> Result<(u32, u32)> {
        track_assert!(
            self.len < self.max_len,
            ErrorKind::InitializationFailure,
            "Too many blocks: max={}",
            self.max_len
        );

        let index = if let Some(index) = self.vacant_head {
            index
        } else {
            track_assert!(
                self.slots.len() < u32::MAX as usize,
                ErrorKind::InitializationFailure
            );
            track!(self
                .slots
                .try_reserve(1)
                .map_err(|e| ErrorKind::InitializationFailure.cause(e)))?;
            self.slots.push(Slot {
                generation: 0,
                entry: Entry::Vacant { next_vacant: None },
            });
            (self.slots.len() - 1) as u32
        };

        let block = MemoryBlock::new(size, region, self.head);
        let slot = &mut self.slots[index as usize];
        let next_vacant = match mem::replace(&mut slot.entry, Entry::Occupied(block)) {
            Entry::Vacant { next_vacant } => next_vacant,
            Entry::Occupied(_) => unreachable!("Slot {} is already occupied", index),
        };
        let generation = slot.generation;
        if self.vacant_head == Some(index) {
            self.vacant_head = next_vacant;
        }
        self.head = Some(index);
        self.len += 1;
        Ok((index, generation))
    }

    pub fn get(&self, index: u32, generation: u32) -> Option<&MemoryBlock<R>> {
        let slot = self.slots.get(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        match slot.entry {
            Entry::Occupied(ref block) => Some(block),
            Entry::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, index: u32, generation: u32) -> Option<&mut MemoryBlock<R>> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        match slot.entry {
            Entry::Occupied(ref mut block) => Some(block),
            Entry::Vacant { .. } => None,
        }
    }

    /// 先頭から順にレコードを走査するイテレータを返す.
    pub fn iter(&self) -> Iter<R> {
        Iter {
            registry: self,
            current: self.head,
        }
    }

    /// 使用中ではないレコード群を、リストから取り除く.
    ///
    /// 取り除かれたレコードは`f`に渡された上で破棄され、そのスロットは空きスロットとなる.
    /// 使用中のレコード群の相対的な順序は維持される.
    ///
    /// 返り値は、取り除かれたレコードの数.
    pub fn sweep<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(MemoryBlock<R>),
    {
        let mut removed = 0;
        let mut prev = None;
        let mut current = self.head;
        while let Some(index) = current {
            let (in_use, next) = {
                let block = self.occupied(index);
                (block.in_use(), block.next())
            };
            if in_use {
                prev = Some(index);
            } else {
                // `prev`は進めずに、後続のレコードに繋ぎ変える
                match prev {
                    Some(prev) => self.occupied_mut(prev).set_next(next),
                    None => self.head = next,
                }
                f(self.vacate(index));
                removed += 1;
            }
            current = next;
        }
        removed
    }

    /// 全てのレコードを、使用中かどうかに関わらず取り除く.
    ///
    /// 取り除かれたレコードは`f`に渡された上で破棄される.
    ///
    /// 返り値は、取り除かれたレコードの数.
    pub fn drain<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(MemoryBlock<R>),
    {
        let mut removed = 0;
        while let Some(index) = self.head {
            self.head = self.occupied(index).next();
            f(self.vacate(index));
            removed += 1;
        }
        removed
    }

    fn occupied(&self, index: u32) -> &MemoryBlock<R> {
        match self.slots[index as usize].entry {
            Entry::Occupied(ref block) => block,
            Entry::Vacant { .. } => unreachable!("Vacant slot {} is linked from the list", index),
        }
    }

    fn occupied_mut(&mut self, index: u32) -> &mut MemoryBlock<R> {
        match self.slots[index as usize].entry {
            Entry::Occupied(ref mut block) => block,
            Entry::Vacant { .. } => unreachable!("Vacant slot {} is linked from the list", index),
        }
    }

    // スロットを空きスロットのリストに繋ぎ、格納されていたレコードを返す.
    //
    // 世代番号を使い切ったスロットは、空きスロットのリストには繋がずに引退させる.
    //
    // 呼び出し側は、事前に`index`をレコードのリストから外しておく必要がある.
    fn vacate(&mut self, index: u32) -> MemoryBlock<R> {
        let slot = &mut self.slots[index as usize];
        let retired = slot.generation == u32::MAX;
        let vacant = if retired {
            Entry::Vacant { next_vacant: None }
        } else {
            slot.generation += 1;
            Entry::Vacant {
                next_vacant: self.vacant_head,
            }
        };
        let entry = mem::replace(&mut slot.entry, vacant);
        if !retired {
            self.vacant_head = Some(index);
        }
        self.len -= 1;
        match entry {
            Entry::Occupied(block) => block,
            Entry::Vacant { .. } => unreachable!("Slot {} is already vacant", index),
        }
    }
}

/// レジストリの走査用のイテレータ.
///
/// 要素は`(スロット位置, 世代番号, レコード)`の組.
#[derive(Debug)]
pub struct Iter<'a, R: 'a> {
    registry: &'a Registry<R>,
    current: Option<u32>,
}
impl<'a, R: 'a> Iterator for Iter<'a, R> {
    type Item = (u32, u32, &'a MemoryBlock<R>);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        let slot = &self.registry.slots[index as usize];
        let block = self.registry.occupied(index);
        self.current = block.next();
        Some((index, slot.generation, block))
    }
}

#[derive(Debug)]
struct Slot<R> {
    generation: u32,
    entry: Entry<R>,
}

#[derive(Debug)]
enum Entry<R> {
    Occupied(MemoryBlock<R>),
    Vacant { next_vacant: Option<u32> },
}
