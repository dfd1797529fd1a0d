use prometrics::metrics::MetricBuilder;
use slog::{Discard, Logger};
use uuid::Uuid;

use crate::allocator::registry::Registry;
use crate::allocator::Allocator;
use crate::memory::MemorySource;
use crate::metrics::AllocatorMetrics;
use crate::Result;

/// `Allocator`のビルダ.
#[derive(Debug, Clone)]
pub struct AllocatorBuilder {
    instance_uuid: Option<Uuid>,
    max_blocks: usize,
    logger: Logger,
    metrics: MetricBuilder,
}
impl AllocatorBuilder {
    /// 新しい`AllocatorBuilder`インスタンスを生成する.
    pub fn new() -> Self {
        AllocatorBuilder {
            instance_uuid: None,
            max_blocks: usize::MAX,
            logger: Logger::root(Discard, o!()),
            metrics: MetricBuilder::new(),
        }
    }

    /// アロケータインスタンスを識別するためのUUIDを設定する.
    ///
    /// このUUIDは、アロケータが発行する全てのハンドルに埋め込まれ、
    /// 他のアロケータが発行したハンドルを判別するために使われる.
    ///
    /// 本メソッドが呼ばれていない場合は、ランダムなUUIDが割り当てられる.
    pub fn instance_uuid(&mut self, uuid: Uuid) -> &mut Self {
        self.instance_uuid = Some(uuid);
        self
    }

    /// レジストリが同時に保持可能なレコードの最大数を設定する.
    ///
    /// 解放済みではあるが、まだGCで回収されていないレコードも、この数に含まれる.
    ///
    /// 上限に達した状態で割当が要求された場合には、`ErrorKind::InitializationFailure`のエラーとなる.
    ///
    /// デフォルト値は`usize::MAX` (i.e., 無制限).
    pub fn max_blocks(&mut self, n: usize) -> &mut Self {
        self.max_blocks = n;
        self
    }

    /// アロケータ用の logger を登録する.
    ///
    /// デフォルトでは、ログは全て破棄される.
    pub fn logger(&mut self, logger: Logger) -> &mut Self {
        self.logger = logger;
        self
    }

    /// メトリクス用の共通設定を登録する.
    ///
    /// デフォルト値は`MetricBuilder::new()`.
    pub fn metrics(&mut self, metrics: MetricBuilder) -> &mut Self {
        self.metrics = metrics;
        self
    }

    /// 未初期化のアロケータを生成する.
    ///
    /// ブロックの割当を行う前に、`Allocator::init`を呼び出す必要がある.
    pub fn finish<M>(&self, source: M) -> Allocator<M>
    where
        M: MemorySource,
    {
        let instance_uuid = self.instance_uuid.unwrap_or_else(Uuid::new_v4);
        let logger = self
            .logger
            .new(o!("allocator" => instance_uuid.to_string()));
        Allocator::new_with(
            source,
            Registry::new(self.max_blocks),
            instance_uuid,
            logger,
            AllocatorMetrics::new(&self.metrics),
        )
    }

    /// アロケータを生成し、初期化まで行う.
    pub fn init<M>(&self, source: M) -> Result<Allocator<M>>
    where
        M: MemorySource,
    {
        let mut allocator = self.finish(source);
        track!(allocator.init())?;
        Ok(allocator)
    }
}
impl Default for AllocatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
