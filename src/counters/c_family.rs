// src/counters/c_family.rs
//! C 系言語のカウンタ
//!
//! バイト単位の状態機械で SLOC/LLOC を数える。対応する構文:
//! - ブロックコメント (開始/終了トークン) と行コメント
//! - 文字列リテラル (バックスラッシュエスケープはフラグ次第)
//! - 文字リテラル (`'x'`, `'\n'`)
//! - 複数行文字列デリミタ (Go のバッククォート等、1 バイト)
//! - 行頭 `#` はプリプロセッサ指令として LLOC に数える
//! - 行頭 `%` で lex ファイルと判定し、以後クォートを無視する
//!
//! ネストしたブロックコメントには対応しない。最初の終了トークンで
//! コメントが閉じる。

use std::path::Path;

use crate::catalog::{BACKSLASH_ESCAPES, EOL_WARN, GenericLang, RAW_BACKTICK};
use crate::context::CountContext;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    InString,
    InMultistring,
    InComment,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CommentKind {
    Block,
    Eol,
}

/// C 系ソースの SLOC/LLOC を数える
///
/// 検証器と生成ファイル検出は分類器側で済んでいる前提。
pub fn count_c_family(ctx: &mut CountContext, path: &Path, lang: &GenericLang) -> (u64, u64) {
    if !ctx.open(path) {
        return (0, 0);
    }

    let block_open = lang.block_open.as_bytes();
    let block_close = lang.block_close.as_bytes();
    let eol = lang.eol_comment.as_bytes();
    let multistring = lang.multistring.as_bytes();
    let terminator = lang.terminator.as_bytes();
    let cbs = lang.has_flag(BACKSLASH_ESCAPES);

    let mut sloc: u64 = 0;
    let mut lloc: u64 = 0;
    let mut mode = Mode::Normal;
    let mut kind = CommentKind::Block;
    let mut start_line: u64 = 0;

    // # at start of file - assume it's a cpp directive
    if ctx.consume(b"#") {
        lloc += 1;
    }

    loop {
        let Some(first) = ctx.get_byte() else { break };
        let mut c = first;

        match mode {
            Mode::Normal => {
                if !ctx.lexfile && c == b'"' {
                    ctx.nonblank = true;
                    mode = Mode::InString;
                    start_line = ctx.line_number;
                } else if cbs && !ctx.lexfile && c == b'\'' {
                    // Consume a whole character literal, escape included.
                    ctx.nonblank = true;
                    if let Some(c2) = ctx.get_byte() {
                        c = c2;
                        if c == b'\\' {
                            c = ctx.get_byte().unwrap_or(0);
                        }
                        loop {
                            c = ctx.get_byte().unwrap_or(0);
                            if c == b'\'' || c == b'\n' || c == 0 {
                                break;
                            }
                        }
                    }
                } else if c == block_open[0] && ctx.consume(&block_open[1..]) {
                    mode = Mode::InComment;
                    kind = CommentKind::Block;
                    start_line = ctx.line_number;
                } else if !eol.is_empty() && c == eol[0] && ctx.consume(&eol[1..]) {
                    mode = Mode::InComment;
                    kind = CommentKind::Eol;
                    start_line = ctx.line_number;
                } else if !multistring.is_empty() && c == multistring[0] {
                    ctx.nonblank = true;
                    mode = Mode::InMultistring;
                    start_line = ctx.line_number;
                } else if lang.has_flag(RAW_BACKTICK) && c == b'`' {
                    let tick_start = ctx.line_number;
                    loop {
                        match ctx.get_byte() {
                            Some(b'`') => break,
                            Some(_) => {}
                            None => {
                                eprintln!(
                                    "WARNING - unterminated backtick, line {}, file {}",
                                    tick_start,
                                    path.display()
                                );
                                break;
                            }
                        }
                    }
                } else if !isspace(c) {
                    ctx.nonblank = true;
                }
            }
            Mode::InString => {
                // Only lines with non-whitespace count, to handle
                // syntactically invalid programs gracefully.
                if !isspace(c) {
                    ctx.nonblank = true;
                }
                if c == b'"' {
                    mode = Mode::Normal;
                } else if cbs && c == b'\\' && (ctx.ispeek(b'"') || ctx.ispeek(b'\\')) {
                    c = ctx.get_byte().unwrap_or(0);
                } else if cbs && c == b'\\' && ctx.ispeek(b'\n') {
                    c = ctx.get_byte().unwrap_or(0);
                } else if c == b'\n' && lang.has_flag(EOL_WARN) {
                    // A bare newline in a string. Common enough in real
                    // code that we warn and carry on rather than reset.
                    eprintln!(
                        "WARNING - newline in string, line {}, file {}",
                        ctx.line_number,
                        path.display()
                    );
                }
            }
            Mode::InMultistring => {
                if !isspace(c) {
                    ctx.nonblank = true;
                }
                // The first delimiter byte closes; all catalog delimiters
                // are a single byte.
                if c == multistring[0] {
                    mode = Mode::Normal;
                }
            }
            Mode::InComment => {
                if c == b'\n' && kind == CommentKind::Eol {
                    mode = Mode::Normal;
                }
                if kind == CommentKind::Block
                    && c == block_close[0]
                    && ctx.consume(&block_close[1..])
                {
                    mode = Mode::Normal;
                }
            }
        }

        if c == b'\n' {
            if ctx.nonblank {
                sloc += 1;
            }
            ctx.nonblank = false;
            // % at start of line marks a lex file; section headers and
            // rules count as code.
            if ctx.consume(b"%") {
                ctx.lexfile = true;
                ctx.nonblank = true;
            }
            // # at start of line - assume it's a cpp directive
            if ctx.consume(b"#") {
                lloc += 1;
            }
        }
        if mode == Mode::Normal && !terminator.is_empty() && c == terminator[0] {
            lloc += 1;
        }
    }

    // EOF without a final newline still counts the last line.
    if ctx.nonblank {
        sloc += 1;
    }
    ctx.nonblank = false;
    if mode == Mode::InComment && kind == CommentKind::Eol {
        mode = Mode::Normal;
    }

    if mode == Mode::InComment {
        eprintln!(
            "\"{}\", line {}: ERROR - terminated in comment beginning here",
            path.display(),
            start_line
        );
    } else if mode == Mode::InString || mode == Mode::InMultistring {
        eprintln!(
            "\"{}\", line {}: ERROR - terminated in string beginning here",
            path.display(),
            start_line
        );
    }

    (sloc, lloc)
}

fn isspace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x0c)
}
