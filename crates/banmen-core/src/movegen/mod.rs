//! 指し手生成モジュール
//!
//! 着手が適用されるたびに局面全体の合法手を作り直す。
//!
//! - `generator`: 駒1枚ぶんの擬似合法手の列挙と利きマーク
//! - `legality`: ピン・王手回避・玉の安全による絞り込み
//! - `drops`: 駒台からの打ち込み可否マスク（二歩・打ち歩詰めを含む）
//! - `run_cycle`: 上記を決まった順で回し、対局状態を分類する

mod drops;
mod generator;
mod legality;

use log::debug;

use crate::position::{Board, GameStatus};
use crate::types::{Color, PieceId};

/// 着手後の再計算サイクルを1回ぶん実行する
///
/// 王手情報と危険升マップを捨てて作り直し、全駒の合法手と打ち込み
/// マスクを再生成したうえで、手番側の可動性から対局状態を分類する。
pub(crate) fn run_cycle(board: &mut Board, flip_side: bool) -> GameStatus {
    if flip_side {
        board.side_to_move = board.side_to_move.opponent();
    }

    for c in Color::ALL {
        board.kings[c.index()].reset();
    }
    for p in board.pieces.iter_mut() {
        p.moves.clear();
    }

    // 盤上の駒（玉以外）→ 両玉の順に生成する。玉の合法性は危険升
    // マップが完成してからでないと判定できない
    for i in 2..PieceId::NUM {
        if board.pieces[i].square().is_some() {
            generator::generate_piece(board, PieceId(i as u8));
        }
    }
    for c in Color::ALL {
        generator::generate_piece(board, PieceId::king_of(c));
    }

    for i in 2..PieceId::NUM {
        if board.pieces[i].square().is_some() {
            legality::filter_piece(board, PieceId(i as u8));
        }
    }
    for c in Color::ALL {
        legality::filter_king(board, PieceId::king_of(c));
    }

    for c in Color::ALL {
        drops::generate_drops(board, c);
    }

    // 駒台の駒には打てる升をそのまま移動先として展開する
    for i in 2..PieceId::NUM {
        if board.pieces[i].in_hand() {
            let owner = board.pieces[i].owner();
            let kind = board.pieces[i].kind();
            let squares = board.hands[owner.index()].drop_squares(kind);
            board.pieces[i].moves = squares.into_iter().collect();
        }
    }

    let stm = board.side_to_move;
    let mobile = board
        .pieces
        .iter()
        .any(|p| p.owner() == stm && !p.moves.is_empty());
    let status = if mobile {
        GameStatus::InProgress
    } else if board.kings[stm.index()].in_check() {
        debug!("checkmate: {stm:?} has no legal moves while in check");
        GameStatus::Won(stm.opponent())
    } else {
        debug!("stalemate: {stm:?} has no legal moves");
        GameStatus::Draw
    };
    board.status = status;
    status
}

impl Board {
    /// 再計算サイクルを実行する
    ///
    /// 着手の適用後、照会より前に必ず呼ぶ。手番を相手側へ移してから
    /// 全駒の合法手を作り直し、対局状態を返す。サイクルは途中状態を
    /// 観測されないことを前提とした一塊の処理で、内部で並列化は
    /// しない。終局後は何もせず現在の状態を返す。
    pub fn recompute(&mut self) -> GameStatus {
        if self.status != GameStatus::InProgress {
            return self.status;
        }
        run_cycle(self, true)
    }
}
