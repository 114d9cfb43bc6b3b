//! 手番（Color）

/// 先後（先手/後手）
///
/// 符号表現では先手が -1、後手が +1。盤面の線形座標上では先手玉が
/// 76 に、後手玉が 4 に配置され、先手は段番号の小さい方向へ進む。
/// 直列化も符号表現で行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "i8", into = "i8")]
#[repr(u8)]
pub enum Color {
    Black = 0,
    White = 1,
}

impl Color {
    /// 手番の数
    pub const NUM: usize = 2;

    /// 両手番
    pub const ALL: [Color; 2] = [Color::Black, Color::White];

    /// 相手番を返す
    #[inline]
    pub const fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// インデックスとして使用（配列アクセス用）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 符号表現（先手 = -1 / 後手 = +1）
    #[inline]
    pub const fn sign(self) -> i32 {
        match self {
            Color::Black => -1,
            Color::White => 1,
        }
    }

    /// 符号表現から復元する
    #[inline]
    pub const fn from_sign(n: i32) -> Option<Color> {
        match n {
            -1 => Some(Color::Black),
            1 => Some(Color::White),
            _ => None,
        }
    }

    /// 前進方向の段差分（先手 = -1 / 後手 = +1）
    #[inline]
    pub const fn forward(self) -> i32 {
        self.sign()
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        self.opponent()
    }
}

impl From<Color> for i8 {
    #[inline]
    fn from(c: Color) -> i8 {
        c.sign() as i8
    }
}

impl TryFrom<i8> for Color {
    type Error = String;

    fn try_from(n: i8) -> Result<Color, String> {
        Color::from_sign(n as i32).ok_or_else(|| format!("invalid color sign: {n}"))
    }
}
