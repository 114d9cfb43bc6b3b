//! 擬似合法手の生成と利きマーク
//!
//! 盤上の駒1枚ぶんの擬似合法手（自玉の安全を無視した移動先）を列挙
//! しながら、その駒の利きが及ぶ升を相手玉の危険升マップへ記録する。
//! 利きが相手玉の升に届いた場合は王手元として登録する。
//!
//! 走り駒が相手玉に当たった場合、玉の裏側の升も危険升として記録し
//! 続ける。玉が王手の筋に沿って後退しても利きから出られないため。

use crate::position::Board;
use crate::types::{Color, PieceId, PieceType, Square};

/// 玉の利き（8近傍）
const KING_STEPS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ORTHO_RAYS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAG_RAYS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// 金の利き（前3方向・横2方向・真後ろ）
fn gold_steps(c: Color) -> [(i32, i32); 6] {
    let s = c.forward();
    [(s, -1), (s, 0), (s, 1), (0, -1), (0, 1), (-s, 0)]
}

/// 銀の利き（前3方向・斜め後ろ2方向）
fn silver_steps(c: Color) -> [(i32, i32); 5] {
    let s = c.forward();
    [(s, -1), (s, 0), (s, 1), (-s, -1), (-s, 1)]
}

/// 盤上の駒1枚ぶんの擬似合法手を生成する
pub(crate) fn generate_piece(board: &mut Board, id: PieceId) {
    let p = &board.pieces[id.index()];
    let Some(from) = p.square() else { return };
    let owner = p.owner();
    let promoted = p.is_promoted();

    match p.kind() {
        PieceType::King => step_moves(board, id, from, &KING_STEPS),
        PieceType::Gold => step_moves(board, id, from, &gold_steps(owner)),
        PieceType::Silver => {
            if promoted {
                step_moves(board, id, from, &gold_steps(owner));
            } else {
                step_moves(board, id, from, &silver_steps(owner));
            }
        }
        PieceType::Knight => {
            if promoted {
                step_moves(board, id, from, &gold_steps(owner));
            } else {
                let s = owner.forward();
                step_moves(board, id, from, &[(2 * s, -1), (2 * s, 1)]);
            }
        }
        PieceType::Lance => {
            if promoted {
                step_moves(board, id, from, &gold_steps(owner));
            } else {
                ray_moves(board, id, from, owner.forward(), 0);
            }
        }
        PieceType::Rook => {
            for (dr, df) in ORTHO_RAYS {
                ray_moves(board, id, from, dr, df);
            }
            if promoted {
                // 竜は縦横の走りに8近傍の利きが加わる（金と銀の和集合）
                step_moves(board, id, from, &gold_steps(owner));
                step_moves(board, id, from, &silver_steps(owner));
            }
        }
        PieceType::Bishop => {
            for (dr, df) in DIAG_RAYS {
                ray_moves(board, id, from, dr, df);
            }
            if promoted {
                step_moves(board, id, from, &gold_steps(owner));
                step_moves(board, id, from, &silver_steps(owner));
            }
        }
        PieceType::Pawn => {
            if promoted {
                step_moves(board, id, from, &gold_steps(owner));
            } else {
                step_moves(board, id, from, &[(owner.forward(), 0)]);
            }
        }
    }
}

fn step_moves(board: &mut Board, id: PieceId, from: Square, steps: &[(i32, i32)]) {
    for &(dr, df) in steps {
        if let Some(to) = from.shift(dr, df) {
            try_add(board, id, from, to);
        }
    }
}

/// 1升ぶんの移動先を検査して登録する
///
/// 味方の駒がある升には入れないが、紐の付いた駒として相手玉の
/// 危険升にだけ記録する。
fn try_add(board: &mut Board, id: PieceId, from: Square, to: Square) {
    let us = board.pieces[id.index()].owner();
    let them = us.opponent();
    board.kings[them.index()].mark_danger(to);
    if board.piece_at(to).map(|p| p.owner()) == Some(us) {
        return;
    }
    push_move(board, id, to);
    if to == board.king_square(them) {
        board.kings[them.index()].add_check(from);
    }
}

/// 走り駒の1方向ぶんの走査
///
/// 味方の駒で停止し、敵の駒は取りとして登録してから停止する。
/// 相手玉に当たった場合は玉の裏側も危険升として記録し続け、次に
/// 駒のある升か盤端で止まる。
fn ray_moves(board: &mut Board, id: PieceId, origin: Square, dr: i32, df: i32) {
    let us = board.pieces[id.index()].owner();
    let them = us.opponent();
    let king_sq = board.king_square(them);
    let mut behind_king = false;
    let mut cur = origin;
    while let Some(to) = cur.shift(dr, df) {
        board.kings[them.index()].mark_danger(to);
        match board.squares[to.index()] {
            None => {
                if !behind_king {
                    push_move(board, id, to);
                }
            }
            Some(occ) => {
                if board.pieces[occ.index()].owner() == us || behind_king {
                    break;
                }
                push_move(board, id, to);
                if to == king_sq {
                    board.kings[them.index()].add_check(origin);
                    behind_king = true;
                } else {
                    break;
                }
            }
        }
        cur = to;
    }
}

/// 竜・馬の重複登録を避けるため、移動先は一意に保つ
fn push_move(board: &mut Board, id: PieceId, to: Square) {
    let moves = &mut board.pieces[id.index()].moves;
    if !moves.contains(&to) {
        moves.push(to);
    }
}

#[cfg(test)]
mod tests {
    use crate::position::Board;
    use crate::types::{Color, Square};

    #[test]
    fn test_startpos_pawn_single_step() {
        let board = Board::new_game(Color::White);
        // 後手の歩（2段目）は1升だけ前進できる
        let pawn = board.piece_id_at(Square::new(0, 2)).unwrap();
        assert_eq!(board.legal_destinations(pawn), &[Square::new(0, 3)]);
        // 先手の歩（6段目）は段番号の小さい方向へ
        let pawn = board.piece_id_at(Square::new(0, 6)).unwrap();
        assert_eq!(board.legal_destinations(pawn), &[Square::new(0, 5)]);
    }

    #[test]
    fn test_startpos_lance_blocked_by_own_pawn() {
        let board = Board::new_game(Color::White);
        let lance = board.piece_id_at(Square::new(0, 0)).unwrap();
        assert_eq!(board.legal_destinations(lance), &[Square::new(0, 1)]);
    }

    #[test]
    fn test_startpos_knight_has_no_moves() {
        let board = Board::new_game(Color::White);
        let knight = board.piece_id_at(Square::new(1, 0)).unwrap();
        assert!(board.legal_destinations(knight).is_empty());
    }

    #[test]
    fn test_startpos_rook_mobility() {
        let board = Board::new_game(Color::White);
        let rook = board.piece_id_at(Square::new(1, 1)).unwrap();
        let mut moves: Vec<Square> = board.legal_destinations(rook).to_vec();
        moves.sort();
        let expected: Vec<Square> = [(0, 1), (2, 1), (3, 1), (4, 1), (5, 1), (6, 1)]
            .iter()
            .map(|&(f, r)| Square::new(f, r))
            .collect();
        assert_eq!(moves, expected);
    }

    #[test]
    fn test_startpos_bishop_has_no_moves() {
        let board = Board::new_game(Color::White);
        let bishop = board.piece_id_at(Square::new(7, 1)).unwrap();
        assert!(board.legal_destinations(bishop).is_empty());
    }

    #[test]
    fn test_startpos_total_mobility() {
        // 平手初期局面の合法手は30
        let board = Board::new_game(Color::White);
        let total: usize = (0..40u8)
            .map(|i| {
                let p = board.piece(crate::types::PieceId::new(i).unwrap());
                if p.owner() == Color::White { p.moves().len() } else { 0 }
            })
            .sum();
        assert_eq!(total, 30);
    }

    #[test]
    fn test_startpos_no_checks() {
        let board = Board::new_game(Color::Black);
        assert!(!board.in_check(Color::Black));
        assert!(!board.in_check(Color::White));
    }
}
