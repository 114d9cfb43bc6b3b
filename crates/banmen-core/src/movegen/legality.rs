//! 合法性フィルタ
//!
//! 擬似合法手から自玉を危険に晒す手を取り除く。
//!
//! - ピン: 自玉と直線上にある駒は、その筋から外れる移動で玉を
//!   敵の走り駒に晒すため、筋に沿った移動だけを残す
//! - 王手回避: 王手が1つなら王手元を取るか合い駒になる手だけを残し、
//!   両王手なら玉以外の手をすべて捨てる
//! - 玉: 危険升マップに載った升と相手玉の隣接升を捨てる
//!
//! ピンの判定は玉から外側へ筋を歩き、動かす駒の先にいる敵駒が
//! その筋に利く走り駒かどうかで決める。

use crate::position::Board;
use crate::types::{Color, Piece, PieceId, PieceType, Square};

/// 玉以外の駒1枚ぶんの合法性検査
pub(crate) fn filter_piece(board: &mut Board, id: PieceId) {
    let us = board.pieces[id.index()].owner();
    let Some(from) = board.pieces[id.index()].square() else {
        return;
    };
    let king_sq = board.king_square(us);

    if let Some(dir) = pin_ray(board, us, king_sq, from) {
        let moves = std::mem::take(&mut board.pieces[id.index()].moves);
        board.pieces[id.index()].moves = moves
            .into_iter()
            .filter(|&to| on_line(king_sq, dir, to))
            .collect();
    }

    let check_count = board.kings[us.index()].check_count();
    if check_count == 0 {
        return;
    }
    if check_count >= 2 {
        board.pieces[id.index()].moves.clear();
        return;
    }
    let Some(checker) = board.kings[us.index()].first_check() else {
        return;
    };
    // 桂の王手は合い駒できない。取るしかない
    let unblockable = matches!(
        board.piece_at(checker),
        Some(p) if p.kind() == PieceType::Knight && !p.is_promoted()
    );
    let moves = std::mem::take(&mut board.pieces[id.index()].moves);
    board.pieces[id.index()].moves = moves
        .into_iter()
        .filter(|&to| to == checker || (!unblockable && on_segment(king_sq, checker, to)))
        .collect();
}

/// 玉の合法性検査
///
/// 危険升マップに載った升に加えて、相手玉の隣接升も候補から外す。
pub(crate) fn filter_king(board: &mut Board, id: PieceId) {
    let us = board.pieces[id.index()].owner();
    let them = us.opponent();
    let enemy_king = board.king_square(them);
    let danger = board.kings[us.index()].danger();
    let moves = std::mem::take(&mut board.pieces[id.index()].moves);
    board.pieces[id.index()].moves = moves
        .into_iter()
        .filter(|&to| !danger.contains(to) && !adjacent(to, enemy_king))
        .collect();
}

/// 玉同士の隣接判定（盤端の折り返しは座標差で検査する）
fn adjacent(a: Square, b: Square) -> bool {
    (a.rank() as i32 - b.rank() as i32).abs() <= 1
        && (a.file() as i32 - b.file() as i32).abs() <= 1
}

/// from の駒が自玉に対してピンされていれば、玉→駒方向の単位ベクトル
fn pin_ray(board: &Board, us: Color, king_sq: Square, from: Square) -> Option<(i32, i32)> {
    let dr = from.rank() as i32 - king_sq.rank() as i32;
    let df = from.file() as i32 - king_sq.file() as i32;
    if dr != 0 && df != 0 && dr.abs() != df.abs() {
        return None;
    }
    let dir = (dr.signum(), df.signum());
    let mut passed = false;
    let mut cur = king_sq;
    while let Some(sq) = cur.shift(dir.0, dir.1) {
        cur = sq;
        if sq == from {
            // 動かす駒自身は空けたものとして通過する
            passed = true;
            continue;
        }
        if let Some(p) = board.piece_at(sq) {
            if !passed || p.owner() == us {
                return None;
            }
            return pins_along(p, dir).then_some(dir);
        }
    }
    None
}

/// dir 方向（玉→駒）の先にいる敵駒が、その筋に利く走り駒か
///
/// 竜・馬も素の走りは残るため、成りの有無は飛・角では問わない。
/// 香は不成のまま玉の方を向いている場合だけ。
fn pins_along(p: &Piece, dir: (i32, i32)) -> bool {
    match p.kind() {
        PieceType::Rook => dir.0 == 0 || dir.1 == 0,
        PieceType::Bishop => dir.0 != 0 && dir.1 != 0,
        PieceType::Lance if !p.is_promoted() => dir.1 == 0 && p.owner().forward() == -dir.0,
        _ => false,
    }
}

/// to が玉を通る dir 方向の直線上にあるか
fn on_line(king_sq: Square, dir: (i32, i32), to: Square) -> bool {
    let dr = to.rank() as i32 - king_sq.rank() as i32;
    let df = to.file() as i32 - king_sq.file() as i32;
    dr * dir.1 == df * dir.0
}

/// to が玉と王手元の間（王手元自身は含まない）にあるか
pub(crate) fn on_segment(king_sq: Square, checker: Square, to: Square) -> bool {
    let dr = checker.rank() as i32 - king_sq.rank() as i32;
    let df = checker.file() as i32 - king_sq.file() as i32;
    if dr != 0 && df != 0 && dr.abs() != df.abs() {
        return false;
    }
    let (dr, df) = (dr.signum(), df.signum());
    let mut cur = king_sq;
    while let Some(sq) = cur.shift(dr, df) {
        if sq == checker {
            return false;
        }
        if sq == to {
            return true;
        }
        cur = sq;
    }
    false
}
