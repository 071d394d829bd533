// src/counters/pascal.rs
//! Pascal 系 (Pascal, Modula-3, ML, Oberon) のカウンタ
//!
//! `(* *)` のブロックコメントと、言語によっては `{ }` も扱う。
//! コメントのネストには対応しない。

use std::path::Path;

use crate::catalog::PascalLang;
use crate::context::CountContext;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    InComment,
}

/// Pascal 系ソースの SLOC/LLOC を数える
///
/// 検証器は分類器側で済んでいる前提。
pub fn count_pascal(ctx: &mut CountContext, path: &Path, lang: &PascalLang) -> (u64, u64) {
    if !ctx.open(path) {
        return (0, 0);
    }

    let terminator = lang.terminator.as_bytes();
    let mut sloc: u64 = 0;
    let mut lloc: u64 = 0;
    let mut mode = Mode::Normal;
    let mut start_line: u64 = 0;

    while let Some(c) = ctx.get_byte() {
        match mode {
            Mode::Normal => {
                if lang.bracket_comments && c == b'{' {
                    mode = Mode::InComment;
                    start_line = ctx.line_number;
                } else if c == b'(' && ctx.ispeek(b'*') {
                    ctx.get_byte();
                    mode = Mode::InComment;
                    start_line = ctx.line_number;
                } else if c == b'\n' {
                    if ctx.nonblank {
                        sloc += 1;
                    }
                    ctx.nonblank = false;
                } else if !isspace(c) {
                    ctx.nonblank = true;
                }
                if !terminator.is_empty() && c == terminator[0] {
                    lloc += 1;
                }
            }
            Mode::InComment => {
                if lang.bracket_comments && c == b'}' {
                    mode = Mode::Normal;
                } else if c == b'*' && ctx.ispeek(b')') {
                    ctx.get_byte();
                    mode = Mode::Normal;
                }
            }
        }
    }

    // EOF without a final newline still counts the last line.
    if ctx.nonblank {
        sloc += 1;
    }
    ctx.nonblank = false;

    if mode == Mode::InComment {
        eprintln!(
            "\"{}\", line {}: ERROR - terminated in comment beginning here",
            path.display(),
            start_line
        );
    }

    (sloc, lloc)
}

fn isspace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x0c)
}
