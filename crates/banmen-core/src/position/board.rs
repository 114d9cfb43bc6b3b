//! 局面本体（Board）
//!
//! 固定長の駒表と升→駒IDの占有表を持ち、着手の適用と照会を提供する。
//! 合法手の再計算そのものは `movegen` が行う。

use std::fmt;

use log::trace;

use crate::error::MoveError;
use crate::record::{HistoryEntry, MoveMeta};
use crate::types::{Color, Piece, PieceId, PieceType, Place, Square};

use super::hand::Hand;
use super::state::KingState;

/// 対局の進行状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// 対局中
    InProgress,
    /// 詰みによる勝ち
    Won(Color),
    /// 手番側に王手がなく合法手もない引き分け
    Draw,
}

/// 局面本体
///
/// 40枚の駒表・81升の占有表・両駒台・手番・対局状態・棋譜を持つ。
/// 占有表と駒表は常に互いに整合するように `apply_move` / `apply_drop`
/// だけが更新する。
#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) squares: [Option<PieceId>; 81],
    pub(crate) pieces: [Piece; 40],
    pub(crate) hands: [Hand; 2],
    pub(crate) kings: [KingState; 2],
    pub(crate) side_to_move: Color,
    pub(crate) status: GameStatus,
    pub(crate) history: Vec<HistoryEntry>,
    pub(crate) elapsed: [u32; 2],
}

/// 駒IDごとの駒種。対局を通じて変わらない
pub(crate) fn initial_kind(i: usize) -> PieceType {
    match i {
        0 | 1 => PieceType::King,
        2..=5 => PieceType::Gold,
        6..=9 => PieceType::Silver,
        10..=13 => PieceType::Knight,
        14..=17 => PieceType::Lance,
        18..=35 => PieceType::Pawn,
        36 | 37 => PieceType::Rook,
        _ => PieceType::Bishop,
    }
}

/// 駒IDごとの平手初期配置
fn initial_square(i: usize, owner: Color) -> Square {
    let base: i32 = if owner == Color::White { 4 } else { 76 };
    let sq = match i {
        0 | 1 => base,
        // 金銀桂香は玉を挟んで左右対称に置く
        2..=17 => {
            let d = (i / 4) as i32;
            if i % 4 < 2 { base + d } else { base - d - 1 }
        }
        18..=35 => i as i32 / 2 + if owner == Color::White { 9 } else { 45 },
        36 | 37 => {
            if owner == Color::White { 10 } else { 70 }
        }
        _ => {
            if owner == Color::White { 16 } else { 64 }
        }
    };
    Square(sq as u8)
}

impl Board {
    /// 平手初期配置から新規対局を開始する。`starting_side` が最初に指す
    pub fn new_game(starting_side: Color) -> Board {
        let pieces: [Piece; 40] = std::array::from_fn(|i| {
            let owner = if i % 2 == 0 { Color::Black } else { Color::White };
            Piece::new(owner, initial_kind(i), initial_square(i, owner))
        });
        let mut squares = [None; 81];
        for (i, p) in pieces.iter().enumerate() {
            if let Some(sq) = p.square() {
                squares[sq.index()] = PieceId::new(i as u8);
            }
        }
        let mut board = Board {
            squares,
            pieces,
            hands: [Hand::default(), Hand::default()],
            kings: [KingState::default(), KingState::default()],
            side_to_move: starting_side,
            status: GameStatus::InProgress,
            history: Vec::new(),
            elapsed: [0, 0],
        };
        board.history.push(HistoryEntry::snapshot(&board.pieces, None));
        crate::movegen::run_cycle(&mut board, false);
        board
    }

    /// 盤上の駒を動かす
    ///
    /// `promote` は成りの希望。歩・香が最奥の段、桂が最奥の2段に達した
    /// 場合はフラグに関わらず成る。移動先が合法手集合になければ
    /// 局面は変更されない。戻り値は駒台に変化があったか（捕獲）。
    pub fn apply_move(
        &mut self,
        id: PieceId,
        from: Square,
        to: Square,
        promote: bool,
    ) -> Result<bool, MoveError> {
        if self.status != GameStatus::InProgress {
            return Err(MoveError::IllegalMove { piece: id.value(), to });
        }
        let piece = &self.pieces[id.index()];
        let Some(cur) = piece.square() else {
            return Err(MoveError::InvalidPieceReference(format!(
                "piece {} is not on the board",
                id.value()
            )));
        };
        if cur != from {
            return Err(MoveError::InvalidPieceReference(format!(
                "piece {} is on {cur}, not {from}",
                id.value()
            )));
        }
        if piece.owner != self.side_to_move || !piece.moves.contains(&to) {
            return Err(MoveError::IllegalMove { piece: id.value(), to });
        }

        let mover = self.side_to_move;
        let was_promoted = piece.promoted;
        let mut touched = false;
        let mut capture = false;

        // 捕獲: 成りを解除し、取った側の駒として駒台へ移す
        if let Some(victim_id) = self.squares[to.index()] {
            let victim = &mut self.pieces[victim_id.index()];
            victim.promoted = false;
            victim.owner = mover;
            victim.place = Place::Hand(mover);
            self.hands[mover.index()].push(victim_id);
            touched = true;
            capture = true;
        }

        self.squares[to.index()] = Some(id);
        self.squares[from.index()] = None;
        let piece = &mut self.pieces[id.index()];
        piece.place = Place::Board(to);

        // 成り: 希望成りは移動の両端いずれかが敵陣にあれば適用。
        // 行き所のない駒は強制的に成る
        if promote && (piece.promotable_at(to) || piece.promotable_at(from)) {
            piece.promoted = true;
        }
        if piece.kind == PieceType::Knight && to.on_farthest_two_ranks(mover) {
            piece.promoted = true;
        } else if (piece.kind == PieceType::Pawn || piece.kind == PieceType::Lance)
            && to.on_farthest_rank(mover)
        {
            piece.promoted = true;
        }

        let promotes = !was_promoted && piece.promoted;
        let meta = MoveMeta {
            kind: piece.kind,
            was_promoted,
            from: Some(from),
            to,
            promotes,
            capture,
        };
        self.history
            .push(HistoryEntry::snapshot(&self.pieces, Some(meta)));
        trace!("applied move: piece {} {from} -> {to}, capture={capture}", id.value());
        Ok(touched)
    }

    /// 駒台の駒を打つ
    ///
    /// 打った駒は成っていない状態で置かれる。打ち先が打ち込みマスクに
    /// なければ局面は変更されない。
    pub fn apply_drop(&mut self, id: PieceId, to: Square) -> Result<bool, MoveError> {
        if self.status != GameStatus::InProgress {
            return Err(MoveError::IllegalMove { piece: id.value(), to });
        }
        let piece = &self.pieces[id.index()];
        if !piece.in_hand() {
            return Err(MoveError::InvalidPieceReference(format!(
                "piece {} is not in hand",
                id.value()
            )));
        }
        let owner = piece.owner;
        if owner != self.side_to_move
            || self.squares[to.index()].is_some()
            || !self.hands[owner.index()].can_drop(piece.kind, to)
        {
            return Err(MoveError::IllegalMove { piece: id.value(), to });
        }

        let removed = self.hands[owner.index()].remove(id);
        debug_assert!(removed, "hand list out of sync with piece table");
        self.squares[to.index()] = Some(id);
        let piece = &mut self.pieces[id.index()];
        piece.place = Place::Board(to);

        let meta = MoveMeta {
            kind: piece.kind,
            was_promoted: false,
            from: None,
            to,
            promotes: false,
            capture: false,
        };
        self.history
            .push(HistoryEntry::snapshot(&self.pieces, Some(meta)));
        trace!("applied drop: piece {} -> {to}", id.value());
        Ok(true)
    }

    /// 手番
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// 対局の進行状態
    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// 駒表の参照
    #[inline]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.index()]
    }

    /// 升にある駒
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.squares[sq.index()].map(|id| &self.pieces[id.index()])
    }

    /// 升にある駒のID
    #[inline]
    pub fn piece_id_at(&self, sq: Square) -> Option<PieceId> {
        self.squares[sq.index()]
    }

    /// 直近の再計算で得た合法な移動先（駒台の駒は合法な打ち先）
    #[inline]
    pub fn legal_destinations(&self, id: PieceId) -> &[Square] {
        self.pieces[id.index()].moves()
    }

    /// 指定した側が指定した駒種を打てる升の一覧
    pub fn legal_drop_squares(&self, side: Color, kind: PieceType) -> Vec<Square> {
        self.hands[side.index()].drop_squares(kind)
    }

    /// 駒台
    #[inline]
    pub fn hand(&self, side: Color) -> &Hand {
        &self.hands[side.index()]
    }

    /// 玉の王手・危険升情報
    #[inline]
    pub fn king_state(&self, side: Color) -> &KingState {
        &self.kings[side.index()]
    }

    /// 指定した側の玉に王手がかかっているか
    #[inline]
    pub fn in_check(&self, side: Color) -> bool {
        self.kings[side.index()].in_check()
    }

    /// 棋譜（エントリ 0 は対局開始の番兵）
    #[inline]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// 経過秒（計時そのものは外部の責務）
    #[inline]
    pub fn elapsed_seconds(&self, side: Color) -> u32 {
        self.elapsed[side.index()]
    }

    /// 経過秒を設定する
    pub fn set_elapsed_seconds(&mut self, side: Color, seconds: u32) {
        self.elapsed[side.index()] = seconds;
    }

    pub(crate) fn king_square(&self, c: Color) -> Square {
        // 玉は捕獲されないので常に盤上にある
        match self.pieces[PieceId::king_of(c).index()].place {
            Place::Board(sq) => sq,
            Place::Hand(_) => unreachable!("king is never captured"),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in 0..9 {
            for file in 0..9 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(p) => {
                        let mut ch = p.kind.letter();
                        if p.owner == Color::White {
                            ch = ch.to_ascii_lowercase();
                        }
                        write!(f, "{}{ch}", if p.promoted { '+' } else { ' ' })?;
                    }
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_layout() {
        let board = Board::new_game(Color::White);
        // 玉は先手が 76、後手が 4
        assert_eq!(board.king_square(Color::Black), Square::new(4, 8));
        assert_eq!(board.king_square(Color::White), Square::new(4, 0));
        // 香-桂-銀-金の対称配置
        for (file, kind) in [
            (0, PieceType::Lance),
            (1, PieceType::Knight),
            (2, PieceType::Silver),
            (3, PieceType::Gold),
        ] {
            for fl in [file, 8 - file] {
                assert_eq!(board.piece_at(Square::new(fl, 0)).map(|p| p.kind), Some(kind));
                assert_eq!(board.piece_at(Square::new(fl, 8)).map(|p| p.kind), Some(kind));
            }
        }
        // 飛と角
        assert_eq!(
            board.piece_at(Square::new(7, 7)).map(|p| p.kind),
            Some(PieceType::Rook)
        );
        assert_eq!(
            board.piece_at(Square::new(1, 1)).map(|p| p.kind),
            Some(PieceType::Rook)
        );
        assert_eq!(
            board.piece_at(Square::new(1, 7)).map(|p| p.kind),
            Some(PieceType::Bishop)
        );
        assert_eq!(
            board.piece_at(Square::new(7, 1)).map(|p| p.kind),
            Some(PieceType::Bishop)
        );
        // 歩は両者とも自陣3段目に9枚
        for file in 0..9 {
            let w = board.piece_at(Square::new(file, 2)).unwrap();
            assert_eq!((w.kind, w.owner), (PieceType::Pawn, Color::White));
            let b = board.piece_at(Square::new(file, 6)).unwrap();
            assert_eq!((b.kind, b.owner), (PieceType::Pawn, Color::Black));
        }
        assert_eq!(board.status(), GameStatus::InProgress);
        assert_eq!(board.side_to_move(), Color::White);
        assert_eq!(board.history().len(), 1);
        assert!(board.hand(Color::Black).is_empty());
        assert!(board.hand(Color::White).is_empty());
    }

    #[test]
    fn test_apply_move_rejects_wrong_piece() {
        let mut board = Board::new_game(Color::White);
        let pawn = board.piece_id_at(Square::new(0, 2)).unwrap();
        // 移動元が駒表と食い違う
        let err = board
            .apply_move(pawn, Square::new(1, 2), Square::new(0, 3), false)
            .unwrap_err();
        assert!(matches!(err, MoveError::InvalidPieceReference(_)));
        // 合法手にない移動先
        let err = board
            .apply_move(pawn, Square::new(0, 2), Square::new(0, 4), false)
            .unwrap_err();
        assert!(matches!(err, MoveError::IllegalMove { .. }));
        // 手番でない側の駒
        let black_pawn = board.piece_id_at(Square::new(0, 6)).unwrap();
        let err = board
            .apply_move(black_pawn, Square::new(0, 6), Square::new(0, 5), false)
            .unwrap_err();
        assert!(matches!(err, MoveError::IllegalMove { .. }));
    }

    #[test]
    fn test_apply_drop_rejects_board_piece() {
        let mut board = Board::new_game(Color::White);
        let pawn = board.piece_id_at(Square::new(0, 2)).unwrap();
        let err = board.apply_drop(pawn, Square::new(0, 4)).unwrap_err();
        assert!(matches!(err, MoveError::InvalidPieceReference(_)));
    }

    #[test]
    fn test_display_contains_kings() {
        let board = Board::new_game(Color::Black);
        let s = board.to_string();
        assert!(s.contains('K'));
        assert!(s.contains('k'));
    }
}
