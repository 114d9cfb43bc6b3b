//! 将棋のルールエンジン
//!
//! 二人対局の進行に必要な局面管理・指し手生成・王手/詰み判定・棋譜
//! 記録を提供するライブラリ。描画・通信・時計・保存先の入出力は
//! 外部の責務で、本体は入出力を行わない。
//!
//! - `types`: 手番・升・駒などの基本型
//! - `position`: 局面本体（駒表・占有表・駒台・対局状態）
//! - `movegen`: 指し手生成・合法性検査・打ち込み生成・再計算サイクル
//! - `record`: 棋譜履歴・表記・保存レコード
//! - `bitboard`: 81升のビット集合
//!
//! 着手を適用したら `Board::recompute` を呼んでから照会する。
//!
//! ```
//! use banmen_core::{Board, Color, Square};
//!
//! let mut board = Board::new_game(Color::White);
//! let pawn = board.piece_id_at(Square::new(0, 2)).unwrap();
//! assert_eq!(board.legal_destinations(pawn), &[Square::new(0, 3)]);
//! board.apply_move(pawn, Square::new(0, 2), Square::new(0, 3), false).unwrap();
//! board.recompute();
//! assert_eq!(board.side_to_move(), Color::Black);
//! ```

pub mod bitboard;
pub mod error;
mod movegen;
pub mod position;
pub mod record;
pub mod types;

pub use bitboard::Bitboard;
pub use error::{MoveError, RecordError};
pub use position::{Board, GameStatus, Hand, KingState};
pub use record::{GameRecord, HistoryEntry, MoveMeta, PackedPiece, PieceRecord};
pub use types::{Color, Piece, PieceId, PieceType, Place, Square};
