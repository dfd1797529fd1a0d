use std;
use trackable;
use trackable::error::ErrorKindExt;

/// crate固有のエラー型.
#[derive(Debug, Clone, TrackableError)]
pub struct Error(trackable::error::TrackableError<ErrorKind>);
impl From<std::collections::TryReserveError> for Error {
    fn from(e: std::collections::TryReserveError) -> Self {
        ErrorKind::AllocationFailure.cause(e).into()
    }
}

/// 発生し得るエラーの種別.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 初期化済みのアロケータに対して、再度初期化が要求された.
    ///
    /// アロケータの状態は一切変更されていない.
    ///
    /// # 典型的な対応策
    ///
    /// - 利用者側のプログラムを修正して、初期化を一度だけ行うようにする
    /// - 単にこのエラーを無視する (アロケータは既に利用可能な状態である)
    AlreadyInitialized,

    /// 未初期化のアロケータに対して、ブロックの割当が要求された.
    ///
    /// # 典型的な対応策
    ///
    /// - `Allocator::init`を呼び出してから割当を行う
    NotInitialized,

    /// ブロックのレコード(管理情報)を確保できなかった.
    ///
    /// レジストリの容量が上限に達している場合にも、このエラーが返される.
    ///
    /// 直前に確保されていたバックエンドのメモリは、エラーを返す前に解放済み.
    ///
    /// # 典型的な対応策
    ///
    /// - `Allocator::collect`を呼び出して、不要なレコードを回収してからリトライする
    /// - レジストリの上限値(`AllocatorBuilder::max_blocks`)を見直す
    InitializationFailure,

    /// 割当結果の出力先のスロットが、既にブロックを保持している.
    ///
    /// 既存のハンドルを上書きしてしまうことによるリークを防ぐためのエラー.
    ///
    /// # 典型的な対応策
    ///
    /// - 既存のブロックを解放した上で、スロットを空にしてから割当を行う
    /// - 別のスロットを使用する
    AlreadyAllocated,

    /// 下層のアロケータが、要求サイズ分のメモリを供給できなかった.
    ///
    /// レジストリは一切変更されていない.
    ///
    /// # 典型的な対応策
    ///
    /// - 不要なブロックを解放してからリトライする
    /// - より小さいサイズで割当を要求する
    AllocationFailure,
}
impl trackable::error::ErrorKind for ErrorKind {}
