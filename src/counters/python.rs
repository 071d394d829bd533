// src/counters/python.rs
//! Python のカウンタ
//!
//! Python 固有の対応:
//! - トリプルクォート: 行頭で始まるものは docstring としてコメント扱い、
//!   それ以外は複数行のデータ文字列としてコード扱い
//! - `#` 行コメント
//! - LLOC は行末のバックスラッシュ継続で増やさない

use std::path::Path;
use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::context::CountContext;
use crate::counters::strutil;

const DT: &[u8] = b"\"\"\"";
const ST: &[u8] = b"'''";

fn dtriple() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("\"\"\".\"\"\"").unwrap())
}

fn striple() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("'''.'''").unwrap())
}

fn dlonely() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[ \t]*\"[^\"]+\"").unwrap())
}

fn slonely() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[ \t]*'[^']+'").unwrap())
}

fn dtrailer() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(".*\"\"\"").unwrap())
}

fn strailer() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(".*'''").unwrap())
}

fn triple_boundary(line: &[u8]) -> bool {
    strutil::contains(line, DT) || strutil::contains(line, ST)
}

fn strip_hash_comment(line: &mut Vec<u8>) {
    if let Some(i) = strutil::find(line, b"#") {
        line.truncate(i);
    }
}

/// Python ソースの SLOC/LLOC を数える
pub fn count_python(ctx: &mut CountContext, path: &Path) -> (u64, u64) {
    let mut sloc: u64 = 0;
    let mut lloc: u64 = 0;
    let mut in_triple = false;
    let mut in_comment_triple = false;

    if !ctx.open(path) {
        return (0, 0);
    }

    while ctx.read_line() {
        strip_hash_comment(&mut ctx.line);

        if !in_triple {
            // Triple-quotes that begin and end on this line vanish,
            // leaving the surrounding code visible.
            ctx.erase(dtriple());
            ctx.erase(striple());
            // Lonely strings at start of line are docstring-shaped.
            ctx.erase(dlonely());
            ctx.erase(slonely());
            // Erasing a string may have exposed a comment.
            strip_hash_comment(&mut ctx.line);
            // Does a multi-line triple-quote begin here?
            if triple_boundary(&ctx.line) {
                in_triple = true;
                let trimmed = strutil::trim(&ctx.line).to_vec();
                ctx.line = trimmed;
                // It's a docstring if at beginning of line.
                if ctx.line.starts_with(DT) || ctx.line.starts_with(ST) {
                    in_comment_triple = true;
                }
            }
        } else if triple_boundary(&ctx.line) {
            // A closing docstring erases through the close; a data
            // string leaves something there to count.
            let filler: &[u8] = if in_comment_triple { b"" } else { b"x" };
            let replaced = dtrailer().replace_all(&ctx.line, filler).into_owned();
            let replaced = strailer().replace_all(&replaced, filler).into_owned();
            ctx.line = replaced;
            // Another triple may open on the same line; if so the state
            // is unchanged.
            if !triple_boundary(&ctx.line) {
                in_triple = false;
                in_comment_triple = false;
            }
        }

        let trimmed = strutil::trim(&ctx.line);
        if !in_comment_triple && !trimmed.is_empty() {
            sloc += 1;
            // A trailing backslash continues the logical line.
            if trimmed.last() != Some(&b'\\') {
                lloc += 1;
            }
        }
    }

    (sloc, lloc)
}
