//! 打ち込み生成
//!
//! 片方の駒台について、升×駒種の打ち込み可否マスクを作り直す。
//!
//! - 空いている升にはどの駒種も打てるのが基本
//! - 両王手なら打てる升はない。王手1つなら合い駒になる升だけ
//! - 歩・香は最奥の段、桂は最奥の2段に打てない
//! - 二歩: 不成の自歩がいる筋に歩は打てない
//! - 打ち歩詰め: 取り返しの利かない即詰みになる歩打ちは除外する

use crate::position::Board;
use crate::types::{Color, PieceId, PieceType, Square};

use super::legality;

/// 指定した側の打ち込みマスクを作り直す
pub(crate) fn generate_drops(board: &mut Board, side: Color) {
    // 二歩検査: 不成の自歩が既にいる筋
    let mut pawn_files = [false; 9];
    for p in board.pieces.iter() {
        if p.kind() == PieceType::Pawn && !p.is_promoted() && p.owner() == side {
            if let Some(sq) = p.square() {
                pawn_files[sq.file() as usize] = true;
            }
        }
    }

    let king_sq = board.king_square(side);
    let check_count = board.kings[side.index()].check_count();
    let first_check = board.kings[side.index()].first_check();

    match (check_count, first_check) {
        (0, _) => board.hands[side.index()].fill_drop(0xff),
        (1, Some(checker)) => {
            // 王手1つ: 玉と王手元の間に合い駒として打てる升だけ残す。
            // 桂の王手に合い駒は利かない
            let unblockable = matches!(
                board.piece_at(checker),
                Some(p) if p.kind() == PieceType::Knight && !p.is_promoted()
            );
            for i in 0..Square::NUM {
                let sq = Square(i as u8);
                let open = !unblockable
                    && board.squares[i].is_none()
                    && legality::on_segment(king_sq, checker, sq);
                board.hands[side.index()].set_drop(sq, if open { 0xff } else { 0 });
            }
        }
        _ => board.hands[side.index()].fill_drop(0),
    }

    for i in 0..Square::NUM {
        let sq = Square(i as u8);
        if board.squares[i].is_some() {
            board.hands[side.index()].set_drop(sq, 0);
            continue;
        }
        if sq.on_farthest_rank(side) {
            board.hands[side.index()].clear_drop_bit(sq, PieceType::Pawn);
            board.hands[side.index()].clear_drop_bit(sq, PieceType::Lance);
        }
        if sq.on_farthest_two_ranks(side) {
            board.hands[side.index()].clear_drop_bit(sq, PieceType::Knight);
        }
        if pawn_files[sq.file() as usize] {
            board.hands[side.index()].clear_drop_bit(sq, PieceType::Pawn);
        }
    }

    no_pawn_drop_mate(board, side);
}

/// 打ち歩詰めの禁止
///
/// 相手玉に逃げ場がなく、玉方のどの駒も目前の升を取り返せない場合、
/// そこへの歩打ちは受けのない即詰みになるため除外する。判定は
/// 相手玉の合法手が現在ゼロのときだけ行う。
fn no_pawn_drop_mate(board: &mut Board, side: Color) {
    let them = side.opponent();
    let king_sq = board.king_square(them);
    // 打った歩が王手になる、玉の目前の升。盤外なら対象外
    let Some(front) = king_sq.shift(-side.forward(), 0) else {
        return;
    };
    if !board.pieces[PieceId::king_of(them).index()].moves().is_empty() {
        return;
    }
    let defended = board.pieces.iter().any(|p| {
        p.kind() != PieceType::King
            && p.owner() == them
            && !p.in_hand()
            && p.moves().contains(&front)
    });
    if !defended {
        board.hands[side.index()].clear_drop_bit(front, PieceType::Pawn);
    }
}
