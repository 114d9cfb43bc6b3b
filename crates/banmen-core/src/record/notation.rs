//! 棋譜表記
//!
//! 国際式の将棋表記で1手を文字列化する。段を a-i、筋を 1-9 で表し、
//! 成駒は `+` 前置、打ちは `*`、取りは `x`、この手で成れば `+` 後置。

use super::history::HistoryEntry;

impl HistoryEntry {
    /// 表記文字列を返す。`first` は対局開始の番兵エントリかどうか
    pub fn notation(&self, first: bool) -> String {
        let meta = if first { None } else { self.meta() };
        let Some(m) = meta else {
            return "Game start".to_string();
        };
        let mut s = String::new();
        s.push(if m.was_promoted { '+' } else { ' ' });
        s.push(m.kind.letter());
        if let Some(from) = m.from {
            s.push_str(&from.to_string());
        }
        s.push(if m.capture {
            'x'
        } else if m.is_drop() {
            '*'
        } else {
            '-'
        });
        s.push_str(&m.to.to_string());
        if m.promotes {
            s.push('+');
        }
        s
    }
}
