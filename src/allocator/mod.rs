//! ブロックアロケータ.
//!
//! [Allocator]は、下層の[MemorySource]から新規に確保した領域をブロックとして払い出し、
//! それらのレコードを単方向リスト状のレジストリで管理する.
//!
//! ブロックの解放とレコードの回収は分離されている:
//!
//! - [Allocator::free]: 領域のみを解放し、レコードは「解放済み」としてレジストリに残す
//! - [Allocator::collect]: 解放済みのレコード群を、レジストリから一括で取り除く(スイープ)
//!
//! [Allocator]: ./struct.Allocator.html
//! [MemorySource]: ../memory/trait.MemorySource.html
//! [Allocator::free]: ./struct.Allocator.html#method.free
//! [Allocator::collect]: ./struct.Allocator.html#method.collect
use slog::Logger;
use uuid::Uuid;

pub use self::builder::AllocatorBuilder;

use self::registry::Registry;
use crate::block::{BlockHandle, MemoryBlock};
use crate::memory::{HeapMemory, MemorySource};
use crate::metrics::AllocatorMetrics;
use crate::{ErrorKind, Result};

mod builder;
mod registry;

/// ブロックアロケータ.
///
/// レジストリ内のレコードの並びは「最後に割り当てられたものが先頭」となる.
///
/// インスタンスの破棄時(`destroy`の呼び出し時ないし`drop`時)には、
/// 残っている全てのブロックの領域およびレコードが解放される.
///
/// # 注意
///
/// スレッドセーフではない.
/// 複数のスレッドから利用する場合には、インスタンス全体を一つのロックで保護する必要がある.
#[derive(Debug)]
pub struct Allocator<M: MemorySource = HeapMemory> {
    source: M,
    registry: Registry<M::Region>,
    initialized: bool,
    instance_uuid: Uuid,
    logger: Logger,
    metrics: AllocatorMetrics,
}
impl<M: MemorySource> Allocator<M> {
    /// デフォルト設定で、未初期化のアロケータを生成する.
    pub fn new(source: M) -> Self {
        AllocatorBuilder::new().finish(source)
    }

    pub(crate) fn new_with(
        source: M,
        registry: Registry<M::Region>,
        instance_uuid: Uuid,
        logger: Logger,
        metrics: AllocatorMetrics,
    ) -> Self {
        Allocator {
            source,
            registry,
            initialized: false,
            instance_uuid,
            logger,
            metrics,
        }
    }

    /// アロケータを初期化する.
    ///
    /// 初期化後のレジストリは空.
    ///
    /// # Errors
    ///
    /// 既に初期化済みの場合には、種類が`ErrorKind::AlreadyInitialized`のエラーが返される.
    /// その場合、アロケータの状態は一切変更されない.
    pub fn init(&mut self) -> Result<()> {
        track_assert!(!self.initialized, ErrorKind::AlreadyInitialized);
        self.initialized = true;
        info!(self.logger, "Allocator initialized");
        Ok(())
    }

    /// 初期化済みかどうかを返す.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// `size`バイトのブロックを割り当てる.
    ///
    /// 領域は下層の`MemorySource`から毎回新規に確保され、解放済みの領域が再利用されることはない.
    /// 割り当てられたブロックは使用中の状態で、レジストリの先頭に追加される.
    ///
    /// # Errors
    ///
    /// - 未初期化の場合: `ErrorKind::NotInitialized`
    /// - 領域を確保できなかった場合: `ErrorKind::AllocationFailure`
    /// - レコードを格納できなかった場合: `ErrorKind::InitializationFailure`
    ///
    /// いずれの場合も、レジストリは変更されず、確保途中の領域は解放済みとなる.
    pub fn allocate(&mut self, size: usize) -> Result<BlockHandle> {
        track_assert!(self.initialized, ErrorKind::NotInitialized);

        let region = match track!(self.acquire_region(size)) {
            Ok(region) => region,
            Err(e) => {
                self.metrics.allocation_failures.increment();
                warn!(self.logger, "Cannot acquire backing memory"; "size" => size);
                return Err(e);
            }
        };

        // レコードを格納できない場合には、`region`は`insert`内で解放される
        let (index, generation) = match track!(self.registry.insert(size, region)) {
            Ok(x) => x,
            Err(e) => {
                self.metrics.initialization_failures.increment();
                warn!(self.logger, "Cannot store block record";
                      "size" => size, "blocks" => self.registry.len());
                return Err(e);
            }
        };
        self.metrics.count_allocation(size);
        debug!(self.logger, "Block allocated";
               "size" => size, "index" => index, "generation" => generation);
        Ok(BlockHandle::new(self.instance_uuid, index, generation))
    }

    // 長さが要求サイズと異なる領域は、確保失敗として扱う
    fn acquire_region(&mut self, size: usize) -> Result<M::Region> {
        let region = track!(self.source.acquire(size))?;
        track_assert_eq!(region.as_ref().len(), size, ErrorKind::AllocationFailure);
        Ok(region)
    }

    /// `size`バイトのブロックを割り当てて、そのハンドルを`slot`に格納する.
    ///
    /// # Errors
    ///
    /// `slot`が既にハンドルを保持している場合には、種類が`ErrorKind::AlreadyAllocated`のエラーが返される.
    /// その場合、新しいブロックは割り当てられず、`slot`もそのまま.
    ///
    /// それ以外のエラーは`allocate`と同様.
    pub fn allocate_into(&mut self, slot: &mut Option<BlockHandle>, size: usize) -> Result<()> {
        if let Some(handle) = *slot {
            track_panic!(
                ErrorKind::AlreadyAllocated,
                "The slot already holds {}",
                handle
            );
        }
        let handle = track!(self.allocate(size))?;
        *slot = Some(handle);
        Ok(())
    }

    /// ブロックの領域を解放する.
    ///
    /// レコードは「解放済み」としてレジストリに残り、`collect`の呼び出し時に取り除かれる.
    ///
    /// 既に解放済みのブロックや、解決できないハンドル(e.g., 回収済み、別アロケータのもの)が
    /// 指定された場合には何も行わない.
    pub fn free(&mut self, handle: BlockHandle) {
        if handle.allocator() != self.instance_uuid {
            return;
        }
        if let Some(block) = self
            .registry
            .get_mut(handle.index(), handle.generation())
        {
            if block.release() {
                self.metrics.count_releasion(block.size());
                debug!(self.logger, "Block freed";
                       "size" => block.size(), "index" => handle.index());
            }
        }
    }

    /// `slot`が保持するブロックを解放した上で、`slot`を空にする.
    ///
    /// 空になった`slot`は、再び`allocate_into`に渡すことが可能.
    pub fn free_slot(&mut self, slot: &mut Option<BlockHandle>) {
        if let Some(handle) = slot.take() {
            self.free(handle);
        }
    }

    /// 解放済みのブロックのレコード群を、レジストリから取り除く.
    ///
    /// レジストリを先頭から一度だけ走査し、使用中のブロックは元の相対順序のまま残される.
    /// 取り除かれたレコードのハンドルは、以後は解決できなくなる.
    ///
    /// 返り値は、取り除かれたレコードの数.
    pub fn collect(&mut self) -> usize {
        let metrics = &self.metrics;
        let removed = self.registry.sweep(|mut block: MemoryBlock<M::Region>| {
            if block.release() {
                metrics.count_releasion(block.size());
            }
        });
        self.metrics.collections.increment();
        self.metrics.collected_blocks.add_u64(removed as u64);
        info!(self.logger, "Registry swept";
              "removed" => removed, "remaining" => self.registry.len());
        removed
    }

    /// `data`をブロックの領域の先頭に書き込む.
    ///
    /// 書き込みは全か無かであり、以下の場合には何も行わずに`false`を返す:
    ///
    /// - ブロックが使用中ではない(ハンドルが解決できない場合も含む)
    /// - `data`の長さがブロックのサイズを超えている
    pub fn write(&mut self, handle: BlockHandle, data: &[u8]) -> bool {
        if handle.allocator() != self.instance_uuid {
            return false;
        }
        match self
            .registry
            .get_mut(handle.index(), handle.generation())
        {
            Some(block) => {
                let written = block.write(data);
                if !written {
                    debug!(self.logger, "Write rejected";
                           "size" => block.size(), "data_len" => data.len(),
                           "in_use" => block.in_use());
                }
                written
            }
            None => false,
        }
    }

    /// ブロックの領域全体への参照を返す.
    ///
    /// ブロックが使用中ではない場合には`None`が返される.
    ///
    /// 返り値の長さはブロックのサイズと等しいが、
    /// 利用者が書き込んだ範囲以外の内容は不定.
    pub fn read(&self, handle: BlockHandle) -> Option<&[u8]> {
        self.block(handle).and_then(|block| block.bytes())
    }

    /// ブロックの領域全体への可変参照を返す.
    ///
    /// ブロックが使用中ではない場合には`None`が返される.
    pub fn read_mut(&mut self, handle: BlockHandle) -> Option<&mut [u8]> {
        if handle.allocator() != self.instance_uuid {
            return None;
        }
        self.registry
            .get_mut(handle.index(), handle.generation())
            .and_then(|block| block.bytes_mut())
    }

    /// ハンドルに対応するレコードを返す.
    ///
    /// 解放済みでも、まだ回収されていないレコードであれば返される.
    pub fn block(&self, handle: BlockHandle) -> Option<&MemoryBlock<M::Region>> {
        if handle.allocator() != self.instance_uuid {
            return None;
        }
        self.registry.get(handle.index(), handle.generation())
    }

    /// レジストリの先頭(i.e., 最後に割り当てられた未回収の)ブロックのハンドルを返す.
    pub fn head(&self) -> Option<BlockHandle> {
        self.iter().next().map(|(handle, _)| handle)
    }

    /// レジストリ内のブロックを先頭から順に走査するイテレータを返す.
    pub fn iter(&self) -> impl Iterator<Item = (BlockHandle, &MemoryBlock<M::Region>)> {
        let instance_uuid = self.instance_uuid;
        self.registry
            .iter()
            .map(move |(index, generation, block)| {
                (BlockHandle::new(instance_uuid, index, generation), block)
            })
    }

    /// レジストリ内のレコードの数を返す.
    ///
    /// 解放済みで未回収のレコードも含まれる.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// レジストリが空かどうかを返す.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// 使用中のブロックの数を返す.
    pub fn live_blocks(&self) -> usize {
        self.iter().filter(|(_, block)| block.in_use()).count()
    }

    /// アロケータインスタンスのUUIDを返す.
    pub fn instance_uuid(&self) -> Uuid {
        self.instance_uuid
    }

    /// アロケータのメトリクスを返す.
    pub fn metrics(&self) -> &AllocatorMetrics {
        &self.metrics
    }

    /// 下層の`MemorySource`への参照を返す.
    pub fn memory(&self) -> &M {
        &self.source
    }

    /// アロケータを破棄する.
    ///
    /// 使用中かどうかに関わらず、レジストリ内の全てのブロックの領域とレコードが解放される.
    ///
    /// `drop`でも同じ解放処理が行われるが、こちらは結果がログに出力される.
    pub fn destroy(mut self) {
        let (records, live) = self.release_all();
        info!(self.logger, "Allocator destroyed";
              "released_records" => records, "released_blocks" => live);
    }

    fn release_all(&mut self) -> (usize, usize) {
        let metrics = &self.metrics;
        let mut live = 0;
        let records = self.registry.drain(|mut block: MemoryBlock<M::Region>| {
            if block.release() {
                metrics.count_releasion(block.size());
                live += 1;
            }
        });
        (records, live)
    }
}
impl<M: MemorySource> Drop for Allocator<M> {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use prometrics::metrics::MetricBuilder;
    use trackable::result::TestResult;

    use super::*;
    use crate::memory::{LibcMemory, TrackingMemory};

    fn allocator() -> Result<Allocator> {
        track!(AllocatorBuilder::new().init(HeapMemory::new()))
    }

    #[test]
    fn init_works() -> TestResult {
        let mut allocator = Allocator::new(HeapMemory::new());
        assert!(!allocator.is_initialized());
        track!(allocator.init())?;
        assert!(allocator.is_initialized());
        assert!(allocator.is_empty());
        assert_eq!(allocator.head(), None);
        allocator.destroy();
        Ok(())
    }

    #[test]
    fn init_twice_fails() -> TestResult {
        let mut allocator = track!(allocator())?;
        assert_eq!(
            allocator.init().err().map(|e| *e.kind()),
            Some(ErrorKind::AlreadyInitialized)
        );
        assert!(allocator.is_initialized());
        assert_eq!(allocator.head(), None);
        Ok(())
    }

    #[test]
    fn allocate_before_init_fails() {
        let mut allocator = Allocator::new(HeapMemory::new());
        assert_eq!(
            allocator.allocate(10).err().map(|e| *e.kind()),
            Some(ErrorKind::NotInitialized)
        );
        assert!(allocator.is_empty());
    }

    #[test]
    fn allocate_works() -> TestResult {
        let mut allocator = track!(allocator())?;
        let mut slot = None;
        track!(allocator.allocate_into(&mut slot, 1024))?;

        let handle = slot.unwrap();
        let block = allocator.block(handle).unwrap();
        assert!(block.in_use());
        assert!(block.is_initialized());
        assert_eq!(block.size(), 1024);

        allocator.free(handle);
        allocator.destroy();
        Ok(())
    }

    #[test]
    fn allocated_blocks_are_linked_to_head() -> TestResult {
        let mut allocator = track!(allocator())?;
        let b1 = track!(allocator.allocate(100))?;
        let b2 = track!(allocator.allocate(200))?;

        let order = allocator.iter().map(|(h, _)| h).collect::<Vec<_>>();
        assert_eq!(order, vec![b2, b1]);
        assert!(allocator.iter().all(|(_, block)| block.in_use()));
        assert_eq!(allocator.head(), Some(b2));
        assert_eq!(allocator.len(), 2);
        Ok(())
    }

    #[test]
    fn allocate_into_occupied_slot_fails() -> TestResult {
        let mut allocator = track!(allocator())?;
        let mut slot = None;
        track!(allocator.allocate_into(&mut slot, 100))?;
        let b1 = slot;

        assert_eq!(
            allocator
                .allocate_into(&mut slot, 100)
                .err()
                .map(|e| *e.kind()),
            Some(ErrorKind::AlreadyAllocated)
        );
        assert_eq!(slot, b1);
        assert_eq!(allocator.len(), 1);
        assert_eq!(allocator.metrics().allocated_blocks(), 1);

        // 解放済みのハンドルが残っていてもエラーとなる
        allocator.free(slot.unwrap());
        assert_eq!(
            allocator
                .allocate_into(&mut slot, 100)
                .err()
                .map(|e| *e.kind()),
            Some(ErrorKind::AlreadyAllocated)
        );

        allocator.free_slot(&mut slot);
        assert_eq!(slot, None);
        track!(allocator.allocate_into(&mut slot, 100))?;
        assert_ne!(slot, b1);
        Ok(())
    }

    #[test]
    fn free_then_collect() -> TestResult {
        let mut allocator = track!(allocator())?;
        let b1 = track!(allocator.allocate(1024))?;
        let b2 = track!(allocator.allocate(2048))?;

        allocator.free(b1);
        assert_eq!(allocator.len(), 2);
        assert_eq!(allocator.block(b1).map(|b| b.in_use()), Some(false));

        assert_eq!(allocator.collect(), 1);
        assert_eq!(allocator.head(), Some(b2));
        assert_eq!(allocator.len(), 1);
        assert!(allocator.block(b1).is_none());
        let remaining = allocator.iter().map(|(h, _)| h).collect::<Vec<_>>();
        assert_eq!(remaining, vec![b2]);

        allocator.free(b2);
        allocator.destroy();
        Ok(())
    }

    #[test]
    fn collect_keeps_live_blocks_in_order() -> TestResult {
        let mut allocator = track!(allocator())?;
        let mut handles = Vec::new();
        for i in 0..10 {
            handles.push(track!(allocator.allocate(i * 8))?);
        }
        for h in handles.iter().step_by(3) {
            allocator.free(*h);
        }

        assert_eq!(allocator.collect(), 4);
        let expected = handles
            .iter()
            .enumerate()
            .rev()
            .filter(|(i, _)| i % 3 != 0)
            .map(|(_, h)| *h)
            .collect::<Vec<_>>();
        let actual = allocator.iter().map(|(h, _)| h).collect::<Vec<_>>();
        assert_eq!(actual, expected);
        assert_eq!(allocator.live_blocks(), 6);

        assert_eq!(allocator.collect(), 0);
        assert_eq!(allocator.metrics().collections(), 2);
        assert_eq!(allocator.metrics().collected_blocks(), 4);
        Ok(())
    }

    #[test]
    fn write_read_works() -> TestResult {
        let mut allocator = track!(allocator())?;
        let block = track!(allocator.allocate(1024))?;

        let data = b"Hello, Allocator!\0";
        assert_eq!(data.len(), 18);
        assert!(allocator.write(block, data));
        let bytes = allocator.read(block).unwrap();
        assert_eq!(bytes.len(), 1024);
        assert_eq!(&bytes[..18], &data[..]);

        let new_data = b"New data!\0";
        assert!(allocator.write(block, new_data));
        let bytes = allocator.read(block).unwrap();
        assert_eq!(&bytes[..new_data.len()], &new_data[..]);

        allocator.free(block);
        assert_eq!(allocator.read(block), None);
        assert!(!allocator.write(block, b"foo"));
        Ok(())
    }

    #[test]
    fn write_larger_than_block_is_ignored() -> TestResult {
        let mut allocator = track!(allocator())?;
        let block = track!(allocator.allocate(4))?;
        assert!(allocator.write(block, b"abcd"));

        assert!(!allocator.write(block, b"vwxyz"));
        assert_eq!(allocator.read(block), Some(&b"abcd"[..]));
        Ok(())
    }

    #[test]
    fn read_mut_works() -> TestResult {
        let mut allocator = track!(allocator())?;
        let block = track!(allocator.allocate(3))?;
        {
            let bytes = allocator.read_mut(block).unwrap();
            bytes.copy_from_slice(b"xyz");
        }
        assert_eq!(allocator.read(block), Some(&b"xyz"[..]));

        allocator.free(block);
        assert!(allocator.read_mut(block).is_none());
        Ok(())
    }

    #[test]
    fn free_is_idempotent() -> TestResult {
        let mut allocator = track!(allocator())?;
        let block = track!(allocator.allocate(16))?;
        allocator.free(block);
        allocator.free(block);
        assert_eq!(allocator.metrics().released_blocks(), 1);

        let mut empty = None;
        allocator.free_slot(&mut empty);
        assert_eq!(allocator.metrics().released_blocks(), 1);

        allocator.collect();
        allocator.free(block);
        assert_eq!(allocator.metrics().released_blocks(), 1);
        Ok(())
    }

    #[test]
    fn stale_handle_does_not_resolve() -> TestResult {
        let mut allocator = track!(allocator())?;
        let old = track!(allocator.allocate(8))?;
        allocator.free(old);
        allocator.collect();

        // 回収済みのスロットが再利用される
        let new = track!(allocator.allocate(8))?;
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());

        assert!(!allocator.write(old, b"x"));
        allocator.free(old);
        assert_eq!(allocator.block(new).map(|b| b.in_use()), Some(true));
        Ok(())
    }

    #[test]
    fn foreign_handle_does_not_resolve() -> TestResult {
        let mut a = track!(allocator())?;
        let mut b = track!(allocator())?;
        let ha = track!(a.allocate(8))?;
        let hb = track!(b.allocate(8))?;
        assert_eq!(ha.index(), hb.index());
        assert_eq!(ha.generation(), hb.generation());

        assert!(b.block(ha).is_none());
        assert!(!b.write(ha, b"x"));
        b.free(ha);
        assert_eq!(b.block(hb).map(|b| b.in_use()), Some(true));
        assert_eq!(a.block(ha).map(|b| b.in_use()), Some(true));
        Ok(())
    }

    #[test]
    fn allocation_failure() -> TestResult {
        let memory = TrackingMemory::with_limit(HeapMemory::new(), 1024);
        let usage = memory.usage();
        let mut allocator = track!(AllocatorBuilder::new().init(memory))?;
        let b1 = track!(allocator.allocate(1000))?;

        assert_eq!(
            allocator.allocate(100).err().map(|e| *e.kind()),
            Some(ErrorKind::AllocationFailure)
        );
        assert_eq!(allocator.len(), 1);
        assert_eq!(allocator.head(), Some(b1));
        assert_eq!(allocator.metrics().allocation_failures(), 1);
        assert_eq!(usage.live_regions(), 1);
        assert_eq!(allocator.memory().usage().live_bytes(), 1000);

        // 要求サイズが極端に大きい場合も、確保失敗として扱われる
        assert_eq!(
            allocator.allocate(usize::MAX).err().map(|e| *e.kind()),
            Some(ErrorKind::AllocationFailure)
        );
        assert_eq!(allocator.metrics().allocation_failures(), 2);

        // 解放すれば再び確保できる
        allocator.free(b1);
        let _b2 = track!(allocator.allocate(100))?;
        Ok(())
    }

    #[derive(Debug)]
    struct ShortMemory;
    impl MemorySource for ShortMemory {
        type Region = Vec<u8>;

        fn acquire(&mut self, _size: usize) -> Result<Self::Region> {
            Ok(vec![0; 2])
        }
    }

    #[test]
    fn short_region_is_rejected() -> TestResult {
        let mut allocator = track!(AllocatorBuilder::new().init(ShortMemory))?;
        assert_eq!(
            allocator.allocate(16).err().map(|e| *e.kind()),
            Some(ErrorKind::AllocationFailure)
        );
        assert!(allocator.is_empty());
        assert_eq!(allocator.metrics().allocation_failures(), 1);

        let block = track!(allocator.allocate(2))?;
        assert!(allocator.write(block, b"ab"));
        assert!(!allocator.write(block, b"0123456789"));
        Ok(())
    }

    #[test]
    fn initialization_failure_releases_memory() -> TestResult {
        let memory = TrackingMemory::new(HeapMemory::new());
        let usage = memory.usage();
        let mut allocator = track!(AllocatorBuilder::new().max_blocks(2).init(memory))?;
        let b1 = track!(allocator.allocate(10))?;
        let _b2 = track!(allocator.allocate(10))?;

        assert_eq!(
            allocator.allocate(10).err().map(|e| *e.kind()),
            Some(ErrorKind::InitializationFailure)
        );
        assert_eq!(usage.acquired_regions(), 3);
        assert_eq!(usage.live_regions(), 2);
        assert_eq!(allocator.len(), 2);
        assert_eq!(allocator.metrics().initialization_failures(), 1);

        // 解放済みのレコードも上限に数えられるので、回収が必要
        allocator.free(b1);
        assert!(allocator.allocate(10).is_err());
        allocator.collect();
        let _b3 = track!(allocator.allocate(10))?;
        Ok(())
    }

    #[test]
    fn destroy_releases_everything() -> TestResult {
        let memory = TrackingMemory::new(HeapMemory::new());
        let usage = memory.usage();
        let mut allocator = track!(AllocatorBuilder::new().init(memory))?;
        let metrics = allocator.metrics().clone();

        let b1 = track!(allocator.allocate(100))?;
        let b2 = track!(allocator.allocate(200))?;
        let b3 = track!(allocator.allocate(300))?;
        let _b4 = track!(allocator.allocate(400))?;
        allocator.free(b1);
        allocator.free(b1);
        allocator.collect();
        allocator.free(b2);
        allocator.free(b3);
        allocator.free(b3);
        assert_eq!(usage.live_regions(), 1);
        assert_eq!(usage.live_bytes(), 400);

        allocator.destroy();
        assert_eq!(usage.acquired_regions(), 4);
        assert_eq!(usage.released_regions(), 4);
        assert_eq!(usage.live_bytes(), 0);
        assert_eq!(metrics.live_blocks(), 0);
        assert_eq!(metrics.usage_bytes(), 0);
        Ok(())
    }

    #[test]
    fn drop_releases_everything() -> TestResult {
        let memory = TrackingMemory::new(HeapMemory::new());
        let usage = memory.usage();
        {
            let mut allocator = track!(AllocatorBuilder::new().init(memory))?;
            let _b1 = track!(allocator.allocate(100))?;
            let _b2 = track!(allocator.allocate(200))?;
            assert_eq!(usage.live_regions(), 2);
        }
        assert_eq!(usage.live_regions(), 0);
        Ok(())
    }

    #[test]
    fn libc_memory_works() -> TestResult {
        let mut allocator = track!(AllocatorBuilder::new().init(LibcMemory::new()))?;
        let b1 = track!(allocator.allocate(32))?;
        let b2 = track!(allocator.allocate(0))?;
        assert!(allocator.write(b1, b"libc"));
        assert_eq!(
            allocator.read(b1).map(|b| &b[..4]),
            Some(&b"libc"[..])
        );
        assert_eq!(allocator.read(b2), Some(&b""[..]));
        assert!(!allocator.write(b2, b"x"));

        allocator.free(b1);
        assert_eq!(allocator.collect(), 1);
        allocator.destroy();
        Ok(())
    }

    #[test]
    fn builder_works() -> TestResult {
        let uuid = Uuid::new_v4();
        let mut allocator = track!(AllocatorBuilder::new()
            .instance_uuid(uuid)
            .metrics(MetricBuilder::new())
            .init(HeapMemory::new()))?;
        assert_eq!(allocator.instance_uuid(), uuid);

        let block = track!(allocator.allocate(64))?;
        assert_eq!(block.allocator(), uuid);
        assert_eq!(allocator.metrics().allocated_bytes(), 64);
        assert_eq!(allocator.metrics().usage_bytes(), 64);
        Ok(())
    }
}
