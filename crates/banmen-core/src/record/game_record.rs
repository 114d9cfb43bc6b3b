//! 対局レコード（GameRecord）
//!
//! 保存・対局相手との同期に使う直列化契約。駒表・棋譜・占有表・
//! 両駒台・両経過秒・手番を、この順のフィールド列として直列化する。
//! 転送形式（ファイルかソケットか）は外部の責務で、本体は serde の
//! データモデルまでを提供する。
//!
//! 復元時には駒表と占有表の整合を検査し、矛盾があれば局面を作らずに
//! `RecordError` を返す。

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::position::{initial_kind, Board, GameStatus, Hand, KingState};
use crate::types::{Color, Piece, PieceId, PieceType, Place, Square};

use super::history::HistoryEntry;

/// 駒1枚の保存表現
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRecord {
    /// 所有者の符号（先手 = -1 / 後手 = +1）
    pub owner: i8,
    /// 駒種（0-7）
    pub kind: u8,
    /// 成り
    pub promoted: bool,
    /// 升番号。駒台にある場合は -1
    pub square: i8,
}

/// 対局全体の保存レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// 駒表（40枚）
    pub pieces: Vec<PieceRecord>,
    /// 棋譜
    pub history: Vec<HistoryEntry>,
    /// 升→駒IDの占有表（空き升は -1）
    pub squares: Vec<i8>,
    /// 先手の駒台（駒IDの捕獲順）
    pub black_hand: Vec<u8>,
    /// 後手の駒台
    pub white_hand: Vec<u8>,
    /// 先手の経過秒
    pub black_seconds: u32,
    /// 後手の経過秒
    pub white_seconds: u32,
    /// 手番の符号
    pub side_to_move: i8,
}

fn corrupt(msg: impl Into<String>) -> RecordError {
    RecordError::Corrupt(msg.into())
}

impl Board {
    /// 保存レコードを作る
    pub fn to_record(&self) -> GameRecord {
        GameRecord {
            pieces: self
                .pieces
                .iter()
                .map(|p| PieceRecord {
                    owner: p.owner().into(),
                    kind: p.kind().into(),
                    promoted: p.is_promoted(),
                    square: p.square().map_or(-1, |sq| sq.index() as i8),
                })
                .collect(),
            history: self.history.clone(),
            squares: self
                .squares
                .iter()
                .map(|o| o.map_or(-1, |id| id.value() as i8))
                .collect(),
            black_hand: self.hands[0].pieces().iter().map(|id| id.value()).collect(),
            white_hand: self.hands[1].pieces().iter().map(|id| id.value()).collect(),
            black_seconds: self.elapsed[0],
            white_seconds: self.elapsed[1],
            side_to_move: self.side_to_move().into(),
        }
    }

    /// 保存レコードから局面を復元する
    ///
    /// 整合検査を通れば合法手を再生成した局面を返す。失敗しても
    /// 呼び出し側の状態は変わらない。
    pub fn from_record(record: GameRecord) -> Result<Board, RecordError> {
        if record.pieces.len() != PieceId::NUM {
            return Err(corrupt("piece table must have 40 entries"));
        }
        if record.squares.len() != Square::NUM {
            return Err(corrupt("occupancy index must have 81 entries"));
        }
        if record.history.is_empty() {
            return Err(corrupt("history must contain the game-start entry"));
        }
        let side = Color::from_sign(record.side_to_move as i32)
            .ok_or_else(|| corrupt(format!("invalid side to move: {}", record.side_to_move)))?;

        // 駒表の復元。駒種は駒IDごとに固定で、玉は盤上の固定IDにだけ現れる
        let mut pieces_vec: Vec<Piece> = Vec::with_capacity(PieceId::NUM);
        for (i, pr) in record.pieces.iter().enumerate() {
            let kind = PieceType::from_u8(pr.kind)
                .ok_or_else(|| corrupt(format!("piece {i} has invalid kind {}", pr.kind)))?;
            if kind != initial_kind(i) {
                return Err(corrupt(format!("piece {i} cannot be a {kind:?}")));
            }
            let owner = Color::from_sign(pr.owner as i32)
                .ok_or_else(|| corrupt(format!("piece {i} has invalid owner {}", pr.owner)))?;
            if pr.promoted && !kind.can_promote() {
                return Err(corrupt(format!("piece {i} ({kind:?}) cannot be promoted")));
            }
            if i < 2 {
                let expected = if i == 0 { Color::Black } else { Color::White };
                if owner != expected {
                    return Err(corrupt(format!("king {i} has wrong owner")));
                }
                if pr.square < 0 {
                    return Err(corrupt(format!("king {i} cannot be in hand")));
                }
            }
            let place = if pr.square < 0 {
                Place::Hand(owner)
            } else {
                let sq = Square::from_index(pr.square as usize)
                    .ok_or_else(|| corrupt(format!("piece {i} is on invalid square {}", pr.square)))?;
                Place::Board(sq)
            };
            pieces_vec.push(Piece {
                owner,
                kind,
                promoted: pr.promoted,
                place,
                moves: Default::default(),
            });
        }
        let pieces: [Piece; 40] = pieces_vec
            .try_into()
            .map_err(|_| corrupt("piece table must have 40 entries"))?;

        // 占有表の復元と、駒表との双方向の突き合わせ
        let mut squares = [None; 81];
        for (i, &e) in record.squares.iter().enumerate() {
            if e < 0 {
                continue;
            }
            let id = PieceId::new(e as u8)
                .ok_or_else(|| corrupt(format!("square {i} refers to invalid piece {e}")))?;
            squares[i] = Some(id);
        }
        for (i, slot) in squares.iter().enumerate() {
            if let Some(id) = slot {
                if pieces[id.index()].square().map(Square::index) != Some(i) {
                    return Err(corrupt(format!(
                        "occupancy index disagrees with piece table at square {i}"
                    )));
                }
            }
        }
        for (i, p) in pieces.iter().enumerate() {
            if let Some(sq) = p.square() {
                if squares[sq.index()] != PieceId::new(i as u8) {
                    return Err(corrupt(format!(
                        "piece {i} claims square {} but the occupancy index disagrees",
                        sq.index()
                    )));
                }
            }
        }

        // 駒台の復元。駒台にある駒とリストは過不足なく一致する
        let mut hands = [Hand::default(), Hand::default()];
        for (c, list) in [
            (Color::Black, &record.black_hand),
            (Color::White, &record.white_hand),
        ] {
            let mut ids: Vec<PieceId> = Vec::with_capacity(list.len());
            for &v in list {
                let id = PieceId::new(v)
                    .ok_or_else(|| corrupt(format!("hand refers to invalid piece {v}")))?;
                if ids.contains(&id) {
                    return Err(corrupt(format!("piece {v} appears twice in a hand")));
                }
                if pieces[id.index()].place() != Place::Hand(c) {
                    return Err(corrupt(format!("piece {v} is not in the {c:?} hand")));
                }
                ids.push(id);
            }
            let expected = pieces.iter().filter(|p| p.place() == Place::Hand(c)).count();
            if ids.len() != expected {
                return Err(corrupt(format!("{c:?} hand list is incomplete")));
            }
            hands[c.index()].set_pieces(ids);
        }

        let mut board = Board {
            squares,
            pieces,
            hands,
            kings: [KingState::default(), KingState::default()],
            side_to_move: side,
            status: GameStatus::InProgress,
            history: record.history,
            elapsed: [record.black_seconds, record.white_seconds],
        };
        crate::movegen::run_cycle(&mut board, false);
        Ok(board)
    }
}
