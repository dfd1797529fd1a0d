//! [Prometheus][prometheus]用のメトリクス.
//!
//! [prometheus]: https://prometheus.io/
use prometrics::metrics::{Counter, MetricBuilder};

/// ブロックアロケータのメトリクス.
///
/// 内部のカウンタは共有されているので、`clone`したインスタンスを保持しておけば、
/// アロケータの破棄後にも値を参照することが可能.
#[derive(Debug, Clone)]
pub struct AllocatorMetrics {
    pub(crate) allocated_blocks: Counter,
    pub(crate) allocated_bytes: Counter,
    pub(crate) released_blocks: Counter,
    pub(crate) released_bytes: Counter,
    pub(crate) collected_blocks: Counter,
    pub(crate) collections: Counter,
    pub(crate) allocation_failures: Counter,
    pub(crate) initialization_failures: Counter,
}
impl AllocatorMetrics {
    /// 割り当てられたブロックの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// heapblock_allocator_allocated_blocks_total <COUNTER>
    /// ```
    pub fn allocated_blocks(&self) -> u64 {
        self.allocated_blocks.value() as u64
    }

    /// 割り当てられたバイト数の合計.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// heapblock_allocator_allocated_bytes_total <COUNTER>
    /// ```
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated_bytes.value() as u64
    }

    /// バックエンドのメモリが解放されたブロックの数.
    ///
    /// `free`による解放と、アロケータの破棄時の解放の両方が含まれる.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// heapblock_allocator_released_blocks_total <COUNTER>
    /// ```
    pub fn released_blocks(&self) -> u64 {
        self.released_blocks.value() as u64
    }

    /// 解放されたバイト数の合計.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// heapblock_allocator_released_bytes_total <COUNTER>
    /// ```
    pub fn released_bytes(&self) -> u64 {
        self.released_bytes.value() as u64
    }

    /// GC(スイープ)によってレジストリから取り除かれたレコードの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// heapblock_allocator_collected_blocks_total <COUNTER>
    /// ```
    pub fn collected_blocks(&self) -> u64 {
        self.collected_blocks.value() as u64
    }

    /// GC(スイープ)の実行回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// heapblock_allocator_collections_total <COUNTER>
    /// ```
    pub fn collections(&self) -> u64 {
        self.collections.value() as u64
    }

    /// 下層のアロケータがメモリを供給できなかった回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// heapblock_allocator_failures_total { reason="allocation" } <COUNTER>
    /// ```
    pub fn allocation_failures(&self) -> u64 {
        self.allocation_failures.value() as u64
    }

    /// ブロックのレコードを確保できなかった回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// heapblock_allocator_failures_total { reason="initialization" } <COUNTER>
    /// ```
    pub fn initialization_failures(&self) -> u64 {
        self.initialization_failures.value() as u64
    }

    /// 現在使用中のブロックの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// heapblock_allocator_allocated_blocks_total - heapblock_allocator_released_blocks_total
    /// ```
    pub fn live_blocks(&self) -> u64 {
        // NOTE: 以下の順番で値を取得しないとアンダーフローする可能性がある
        let dec = self.released_blocks();
        let inc = self.allocated_blocks();
        inc - dec
    }

    /// 現在使用中のバイト数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// heapblock_allocator_allocated_bytes_total - heapblock_allocator_released_bytes_total
    /// ```
    pub fn usage_bytes(&self) -> u64 {
        // NOTE: 以下の順番で値を取得しないとアンダーフローする可能性がある
        let dec = self.released_bytes();
        let inc = self.allocated_bytes();
        inc - dec
    }

    pub(crate) fn new(builder: &MetricBuilder) -> Self {
        let mut builder = builder.clone();
        builder.namespace("heapblock").subsystem("allocator");
        let failures = |reason: &str| {
            builder
                .counter("failures_total")
                .help("Number of failed block allocations")
                .label("reason", reason)
                .finish()
                .expect("Never fails")
        };
        AllocatorMetrics {
            allocated_blocks: builder
                .counter("allocated_blocks_total")
                .help("Number of allocated blocks")
                .finish()
                .expect("Never fails"),
            allocated_bytes: builder
                .counter("allocated_bytes_total")
                .help("Number of bytes requested by allocated blocks")
                .finish()
                .expect("Never fails"),
            released_blocks: builder
                .counter("released_blocks_total")
                .help("Number of blocks whose backing memory was released")
                .finish()
                .expect("Never fails"),
            released_bytes: builder
                .counter("released_bytes_total")
                .help("Number of released bytes")
                .finish()
                .expect("Never fails"),
            collected_blocks: builder
                .counter("collected_blocks_total")
                .help("Number of block records removed by sweeps")
                .finish()
                .expect("Never fails"),
            collections: builder
                .counter("collections_total")
                .help("Number of sweeps")
                .finish()
                .expect("Never fails"),
            allocation_failures: failures("allocation"),
            initialization_failures: failures("initialization"),
        }
    }

    pub(crate) fn count_allocation(&self, size: usize) {
        self.allocated_blocks.increment();
        self.allocated_bytes.add_u64(size as u64);
    }

    pub(crate) fn count_releasion(&self, size: usize) {
        self.released_blocks.increment();
        self.released_bytes.add_u64(size as u64);
    }
}

#[cfg(test)]
mod tests {
    use prometrics::metrics::MetricBuilder;

    use super::*;

    #[test]
    fn it_works() {
        let metrics = AllocatorMetrics::new(&MetricBuilder::new());
        metrics.count_allocation(100);
        metrics.count_allocation(200);
        metrics.count_releasion(100);
        assert_eq!(metrics.allocated_blocks(), 2);
        assert_eq!(metrics.allocated_bytes(), 300);
        assert_eq!(metrics.live_blocks(), 1);
        assert_eq!(metrics.usage_bytes(), 200);

        // 共有されたカウンタを参照する
        let cloned = metrics.clone();
        metrics.count_releasion(200);
        assert_eq!(cloned.live_blocks(), 0);
        assert_eq!(cloned.usage_bytes(), 0);
    }
}
