//! App - アプリケーション層
//!
//! ports を組み合わせてローダー本体を実装します。
//!
//! # 主要コンポーネント
//! - **LoaderBuilder**: ローダーの構築とワイヤリング
//! - **Loader**: define / require パイプライン
//! - delivery: モジュールごとの登録待ち（メモ化）
//! - instantiate: 依存順のインスタンス化
//! - **RegistryCounts**: 状態ごとの集計

pub mod builder;
mod delivery;
mod instantiate;
pub mod loader;
pub mod status;

pub use self::builder::{BuildError, LoaderBuilder};
pub use self::loader::Loader;
pub use self::status::RegistryCounts;
