//! 棋譜履歴（HistoryEntry）
//!
//! 1手ごとに着手直後の局面を圧縮して記録する。エントリ 0 は対局開始
//! の番兵で、着手情報を持たない。エントリは作成後に変更されず、列を
//! 順に展開すれば任意の過去局面を検討用に再現できる。
//!
//! 駒1枚は1バイトに圧縮される:
//! 下位4ビット = 駒種、bit5 = 成り、bit6 = 駒台、bit7 = 先手。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Color, Piece, PieceType, Place, Square};

/// 着手1手ぶんのメタ情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveMeta {
    /// 動いた駒の駒種
    pub kind: PieceType,
    /// 着手前から成っていたか
    pub was_promoted: bool,
    /// 移動元（打ちの場合は None）
    pub from: Option<Square>,
    /// 移動先
    pub to: Square,
    /// この手で成ったか
    pub promotes: bool,
    /// 駒を取ったか
    pub capture: bool,
}

impl MoveMeta {
    /// 駒台からの打ちか
    #[inline]
    pub fn is_drop(&self) -> bool {
        self.from.is_none()
    }
}

/// 圧縮バイトから復元した駒情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedPiece {
    pub owner: Color,
    pub kind: PieceType,
    pub promoted: bool,
    pub in_hand: bool,
}

/// 駒を1バイトに圧縮する
pub(crate) fn pack_piece(p: &Piece) -> u8 {
    let mut b = p.kind() as u8;
    if p.owner() == Color::Black {
        b |= 128;
    }
    if p.in_hand() {
        b |= 64;
    }
    if p.is_promoted() {
        b |= 32;
    }
    b
}

/// 圧縮バイトを展開する。駒種が不正なら None
pub fn unpack_piece(b: u8) -> Option<PackedPiece> {
    Some(PackedPiece {
        owner: if b & 128 != 0 { Color::Black } else { Color::White },
        kind: PieceType::from_u8(b & 15)?,
        promoted: b & 32 != 0,
        in_hand: b & 64 != 0,
    })
}

/// 着手直後の局面スナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 占有升 → 圧縮駒バイト
    board: BTreeMap<u8, u8>,
    /// 両駒台の圧縮駒リスト（捕獲順）
    hands: [Vec<u8>; 2],
    /// 着手情報（番兵は None）
    meta: Option<MoveMeta>,
}

impl HistoryEntry {
    pub(crate) fn snapshot(pieces: &[Piece; 40], meta: Option<MoveMeta>) -> HistoryEntry {
        let mut board = BTreeMap::new();
        let mut hands = [Vec::new(), Vec::new()];
        for p in pieces {
            match p.place() {
                Place::Board(sq) => {
                    board.insert(sq.index() as u8, pack_piece(p));
                }
                Place::Hand(c) => hands[c.index()].push(pack_piece(p)),
            }
        }
        HistoryEntry { board, hands, meta }
    }

    /// 着手情報。対局開始の番兵では None
    #[inline]
    pub fn meta(&self) -> Option<&MoveMeta> {
        self.meta.as_ref()
    }

    /// 盤上の駒を (升, 駒情報) で列挙する
    pub fn board_pieces(&self) -> impl Iterator<Item = (Square, PackedPiece)> + '_ {
        self.board
            .iter()
            .filter_map(|(&sq, &b)| Some((Square::from_index(sq as usize)?, unpack_piece(b)?)))
    }

    /// 指定した側の駒台の駒を捕獲順で列挙する
    pub fn hand_pieces(&self, side: Color) -> impl Iterator<Item = PackedPiece> + '_ {
        self.hands[side.index()].iter().filter_map(|&b| unpack_piece(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_roundtrip() {
        let mut p = Piece::new(Color::Black, PieceType::Silver, Square::new(3, 3));
        p.promoted = true;
        let b = pack_piece(&p);
        let up = unpack_piece(b).unwrap();
        assert_eq!(up.owner, Color::Black);
        assert_eq!(up.kind, PieceType::Silver);
        assert!(up.promoted);
        assert!(!up.in_hand);

        let q = Piece {
            owner: Color::White,
            kind: PieceType::Pawn,
            promoted: false,
            place: Place::Hand(Color::White),
            moves: Default::default(),
        };
        let up = unpack_piece(pack_piece(&q)).unwrap();
        assert_eq!(up.owner, Color::White);
        assert_eq!(up.kind, PieceType::Pawn);
        assert!(up.in_hand);
    }

    #[test]
    fn test_unpack_rejects_bad_kind() {
        assert_eq!(unpack_piece(0x0f), None);
        assert_eq!(unpack_piece(0x08), None);
    }

    #[test]
    fn test_snapshot_counts() {
        let board = crate::position::Board::new_game(Color::Black);
        let entry = &board.history()[0];
        assert_eq!(entry.board_pieces().count(), 40);
        assert_eq!(entry.hand_pieces(Color::Black).count(), 0);
        assert!(entry.meta().is_none());
    }
}
