// src/counters/generic.rs
//! 行コメントだけを持つ言語の汎用カウンタ
//!
//! 行コメントマーカー以降を落とし、空白を除いて残りがあれば SLOC。
//! 文終端文字が決まっている言語では、それを含む行を LLOC に数える。

use std::path::Path;

use crate::context::CountContext;
use crate::counters::strutil;

/// 汎用の行ベースカウンタ
pub fn count_generic(
    ctx: &mut CountContext,
    path: &Path,
    eol_comment: &str,
    terminator: &str,
) -> (u64, u64) {
    let mut sloc: u64 = 0;
    let mut lloc: u64 = 0;

    if !ctx.open(path) {
        return (0, 0);
    }

    while ctx.read_line() {
        if let Some(i) = strutil::find(&ctx.line, eol_comment.as_bytes()) {
            ctx.line.truncate(i);
        }
        let trimmed = strutil::trim(&ctx.line);
        if !trimmed.is_empty() {
            sloc += 1;
            if !terminator.is_empty() && strutil::contains(trimmed, terminator.as_bytes()) {
                lloc += 1;
            }
        }
    }

    (sloc, lloc)
}
