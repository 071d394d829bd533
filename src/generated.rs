// src/generated.rs
//! 機械生成ファイルの検出
//!
//! 先頭 15 行に「generated by」「do not edit」等の決まり文句があれば、
//! そのファイルは数えない。マーカーはコメント行に現れるはずなので、
//! 言語の行コメントマーカー (または `*`) に続く形でだけマッチさせる。
//!
//! 新しい決まり文句は `GENERATED_PHRASES` に足すこと。ここにロジックを
//! 埋め込まない。

use std::path::Path;
use std::sync::Mutex;
use std::sync::OnceLock;

use hashbrown::HashMap;
use regex::bytes::Regex;

use crate::context::CountContext;
use crate::debug_level;

const GENERATED_PHRASES: &str = "automatically generated\
    |generated automatically\
    |generated by\
    |a lexical scanner generated by flex\
    |this is a generated file\
    |generated with the.*utility\
    |do not edit\
    |do not hand-hack";

/// 先頭何行を調べるか
const SCAN_LINES: u32 = 15;

/// 行コメントマーカーごとの検出用正規表現 (遅延コンパイル + キャッシュ)
fn marker_regex(eol_comment: &'static str) -> &'static Regex {
    static CACHE: OnceLock<Mutex<HashMap<&'static str, &'static Regex>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap();
    *cache.entry(eol_comment).or_insert_with(|| {
        // A "*" leader would shadow the block-comment alternative and make
        // every COBOL comment look generated, so it is dropped; an empty
        // leader lets the phrases match anywhere in the line.
        let leader = if eol_comment == "*" {
            String::new()
        } else if eol_comment.is_empty() {
            "|".to_string()
        } else {
            format!("|{}", regex::escape(eol_comment))
        };
        let pattern = format!("(\\*{leader}).*(?i:{GENERATED_PHRASES})");
        Box::leak(Box::new(Regex::new(&pattern).unwrap()))
    })
}

/// ファイルが機械生成の印を持つかどうか
pub fn was_generated(ctx: &mut CountContext, path: &Path, eol_comment: &'static str) -> bool {
    if !ctx.open(path) {
        return false;
    }

    let re = marker_regex(eol_comment);
    let mut remaining = SCAN_LINES;
    while remaining > 0 && ctx.read_line() {
        if ctx.matchline(re) {
            if debug_level() > 0 {
                eprintln!("{}: is generated", path.display());
            }
            return true;
        }
        remaining -= 1;
    }

    false
}
