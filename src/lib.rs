//! Heap Block Allocator.
//!
//! `heapblock`は、下層の汎用アロケータから確保した領域を"ブロック"として払い出し、
//! それらをレジストリで管理するための、単純なブロックアロケータ.
//!
//! # 特徴
//!
//! - ブロックの割当毎に、下層のアロケータから新規に領域を確保する
//!   - 解放済みの領域の再利用、結合、デフラグ等は行わない
//! - ブロックの「解放」と、そのレコードの「回収」が分離されている
//!   - 解放([free])では領域のみが返却され、レコードは解放済みとしてレジストリに残る
//!   - 回収([collect])では、解放済みのレコード群がレジストリから一括で取り除かれる
//! - 利用者は[BlockHandle]経由でブロックを操作する
//!   - ハンドルは世代番号付きなので、回収済みのブロックのハンドルが誤って解決されることはない
//! - 単一のスレッドから利用されることを前提としており、内部で排他制御は行わない
//!
//! # モジュールの依存関係
//!
//! ```text
//! allocator => block
//!           => memory
//! ```
//!
//! - [allocator]モジュール:
//!   - 主に[Allocator]構造体を提供
//!   - `heapblock`の利用者が直接触るのはこの構造体
//! - [block]モジュール:
//!   - ブロックのレコード([MemoryBlock])とハンドル([BlockHandle])を提供
//! - [memory]モジュール:
//!   - 主に[MemorySource]トレイトとその実装群を提供
//!   - ブロックの中身を格納する領域を[Allocator]に供給するのが目的
//!
//! # 使用例
//!
//! ```
//! # #[macro_use] extern crate trackable;
//! # extern crate heapblock;
//! use heapblock::allocator::AllocatorBuilder;
//! use heapblock::memory::HeapMemory;
//!
//! # fn main() {
//! let mut allocator = track_try_unwrap!(AllocatorBuilder::new().init(HeapMemory::new()));
//!
//! let block = track_try_unwrap!(allocator.allocate(1024));
//! allocator.write(block, b"Hello, Allocator!\0");
//! assert_eq!(allocator.read(block).map(|b| &b[..5]), Some(&b"Hello"[..]));
//!
//! allocator.free(block);
//! assert_eq!(allocator.collect(), 1);
//! allocator.destroy();
//! # }
//! ```
//!
//! [free]: ./allocator/struct.Allocator.html#method.free
//! [collect]: ./allocator/struct.Allocator.html#method.collect
//! [allocator]: ./allocator/index.html
//! [Allocator]: ./allocator/struct.Allocator.html
//! [block]: ./block/index.html
//! [MemoryBlock]: ./block/struct.MemoryBlock.html
//! [BlockHandle]: ./block/struct.BlockHandle.html
//! [memory]: ./memory/index.html
//! [MemorySource]: ./memory/trait.MemorySource.html
#![warn(missing_docs)]
extern crate libc;
extern crate prometrics;
#[macro_use]
extern crate trackable;
extern crate uuid;
#[macro_use]
extern crate slog;

pub use crate::error::{Error, ErrorKind};

pub mod allocator;
pub mod block;
pub mod memory;
pub mod metrics;

mod error;

/// crate固有の`Result`型.
pub type Result<T> = std::result::Result<T, Error>;
