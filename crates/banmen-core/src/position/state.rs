//! 玉の派生状態（KingState）
//!
//! 王手元の一覧と、相手の利きが及ぶ危険升マップ。いずれも再計算
//! サイクルごとに作り直される派生情報で、レコードには保存されない。

use smallvec::SmallVec;

use crate::bitboard::Bitboard;
use crate::types::Square;

/// 片方の玉に付随する王手・危険升情報
#[derive(Debug, Clone, Default)]
pub struct KingState {
    /// 王手をかけている敵駒の升（0個 = 王手なし、2個以上 = 両王手）
    checks: SmallVec<[Square; 2]>,
    /// 相手駒の利きが及ぶ升の集合
    danger: Bitboard,
}

impl KingState {
    pub(crate) fn reset(&mut self) {
        self.checks.clear();
        self.danger = Bitboard::EMPTY;
    }

    /// 王手がかかっているか
    #[inline]
    pub fn in_check(&self) -> bool {
        !self.checks.is_empty()
    }

    /// 王手をかけている敵駒の数
    #[inline]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// 最初に記録された王手元の升
    #[inline]
    pub fn first_check(&self) -> Option<Square> {
        self.checks.first().copied()
    }

    pub(crate) fn add_check(&mut self, sq: Square) {
        if !self.checks.contains(&sq) {
            self.checks.push(sq);
        }
    }

    pub(crate) fn mark_danger(&mut self, sq: Square) {
        self.danger.set(sq);
    }

    /// 玉がその升に移動しても相手の利きに入らないか
    #[inline]
    pub fn is_safe(&self, sq: Square) -> bool {
        !self.danger.contains(sq)
    }

    /// 相手駒の利きが及ぶ升の集合
    #[inline]
    pub fn danger(&self) -> Bitboard {
        self.danger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_king_state_checks() {
        let mut ks = KingState::default();
        assert!(!ks.in_check());
        ks.add_check(Square::new(4, 4));
        ks.add_check(Square::new(4, 4));
        assert_eq!(ks.check_count(), 1);
        ks.add_check(Square::new(2, 2));
        assert_eq!(ks.check_count(), 2);
        assert_eq!(ks.first_check(), Some(Square::new(4, 4)));
        ks.reset();
        assert!(!ks.in_check());
        assert_eq!(ks.first_check(), None);
    }

    #[test]
    fn test_king_state_danger() {
        let mut ks = KingState::default();
        let sq = Square::new(3, 5);
        assert!(ks.is_safe(sq));
        ks.mark_danger(sq);
        assert!(!ks.is_safe(sq));
        assert!(ks.is_safe(Square::new(3, 6)));
        ks.reset();
        assert!(ks.is_safe(sq));
    }
}
