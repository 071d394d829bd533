// src/context.rs
//! ファイル単位の読み取りコンテキスト
//!
//! 1ファイルを処理する間のスクラッチ状態:
//! - バッファ付きバイトリーダー (peek / 条件付き consume / 行読み)
//! - 行番号 (改行の「次の」バイトでインクリメント)
//! - `nonblank` / `lexfile` フラグ
//!
//! 同一ファイルに対する verifier とカウンタの再オープンは `open` の
//! 呼び直しで行う。コンテキストはスレッド間で共有されない。

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// 1ファイル分の読み取り状態
#[derive(Default)]
pub struct CountContext {
    reader: Option<BufReader<File>>,
    pending: Vec<u8>,
    /// 直近に read_line で読んだ行 (末尾の改行を含む)
    pub line: Vec<u8>,
    /// 現在の行番号 (1 始まり)
    pub line_number: u64,
    was_newline: bool,
    /// 現在の行に空白以外を見たか
    pub nonblank: bool,
    /// 行頭の `%` を見たか (lex ファイル)
    pub lexfile: bool,
}

impl CountContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ファイルを開き、状態をリセットする。
    ///
    /// 開けなかった場合は診断を出して `false` を返す (そのファイルは
    /// スキップされる)。
    pub fn open(&mut self, path: &Path) -> bool {
        match File::open(path) {
            Ok(f) => {
                self.reader = Some(BufReader::new(f));
                self.pending.clear();
                self.line.clear();
                self.line_number = 1;
                self.was_newline = false;
                self.nonblank = false;
                self.lexfile = false;
                true
            }
            Err(e) => {
                eprintln!("loccount: {}: {}", path.display(), e);
                false
            }
        }
    }

    fn fill(&mut self, n: usize) {
        let Some(reader) = self.reader.as_mut() else {
            return;
        };
        let mut byte = [0u8; 1];
        while self.pending.len() < n {
            match reader.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => self.pending.push(byte[0]),
                Err(e) => {
                    // Unexpected read errors end the file; the partial
                    // count up to here is still returned.
                    eprintln!("loccount: read error: {e}");
                    self.reader = None;
                    break;
                }
            }
        }
    }

    /// 先読み (消費しない)。EOF 付近では n より短いスライスを返す。
    pub fn peek(&mut self, n: usize) -> &[u8] {
        self.fill(n);
        &self.pending[..n.min(self.pending.len())]
    }

    /// 次の 1 バイトが `c` かどうか
    pub fn ispeek(&mut self, c: u8) -> bool {
        self.peek(1).first() == Some(&c)
    }

    /// 期待するバイト列が続く場合のみ消費する (all-or-nothing)
    pub fn consume(&mut self, expect: &[u8]) -> bool {
        if self.peek(expect.len()) == expect {
            self.pending.drain(..expect.len());
            true
        } else {
            false
        }
    }

    /// 1 バイト読む。EOF で `None`。
    ///
    /// 行番号は改行そのものではなく、その次のバイトを読んだ時点で
    /// 進む。最終行に改行が無くても行番号が正しく付く。
    pub fn get_byte(&mut self) -> Option<u8> {
        self.fill(1);
        if self.pending.is_empty() {
            return None;
        }
        let c = self.pending.remove(0);
        if self.was_newline {
            self.line_number += 1;
        }
        self.was_newline = c == b'\n';
        Some(c)
    }

    /// 1 行読んで `self.line` に格納する。EOF で `false`。
    ///
    /// 改行で終わらない最終行も 1 行として返す。
    pub fn read_line(&mut self) -> bool {
        self.line.clear();
        if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            self.line.extend(self.pending.drain(..=pos));
        } else {
            self.line.append(&mut self.pending);
            if let Some(reader) = self.reader.as_mut()
                && let Err(e) = reader.read_until(b'\n', &mut self.line)
            {
                eprintln!("loccount: read error: {e}");
                self.reader = None;
            }
        }
        if self.line.is_empty() {
            return false;
        }
        self.line_number += 1;
        true
    }

    /// 直近の行が正規表現にマッチするか
    pub fn matchline(&self, re: &regex::bytes::Regex) -> bool {
        re.is_match(&self.line)
    }

    /// 直近の行からマッチ部分を取り除く
    pub fn erase(&mut self, re: &regex::bytes::Regex) {
        if re.is_match(&self.line) {
            let replaced = re.replace_all(&self.line, &b""[..]).into_owned();
            self.line = replaced;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn context_over(content: &str) -> (CountContext, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let mut ctx = CountContext::new();
        assert!(ctx.open(file.path()));
        (ctx, file)
    }

    #[test]
    fn test_peek_does_not_consume() {
        let (mut ctx, _f) = context_over("abc");
        assert_eq!(ctx.peek(2), b"ab");
        assert_eq!(ctx.get_byte(), Some(b'a'));
        assert_eq!(ctx.get_byte(), Some(b'b'));
    }

    #[test]
    fn test_peek_short_at_eof() {
        let (mut ctx, _f) = context_over("x");
        assert_eq!(ctx.peek(4), b"x");
    }

    #[test]
    fn test_consume_all_or_nothing() {
        let (mut ctx, _f) = context_over("#!/bin/sh");
        assert!(!ctx.consume(b"#?"));
        assert!(ctx.consume(b"#!"));
        assert_eq!(ctx.get_byte(), Some(b'/'));
    }

    #[test]
    fn test_line_number_increments_after_newline() {
        let (mut ctx, _f) = context_over("a\nb");
        assert_eq!(ctx.line_number, 1);
        ctx.get_byte(); // 'a'
        assert_eq!(ctx.line_number, 1);
        ctx.get_byte(); // '\n' still belongs to line 1
        assert_eq!(ctx.line_number, 1);
        ctx.get_byte(); // 'b' starts line 2
        assert_eq!(ctx.line_number, 2);
    }

    #[test]
    fn test_read_line_counts_unterminated_final_line() {
        let (mut ctx, _f) = context_over("one\ntwo");
        assert!(ctx.read_line());
        assert_eq!(ctx.line, b"one\n");
        assert!(ctx.read_line());
        assert_eq!(ctx.line, b"two");
        assert!(!ctx.read_line());
    }

    #[test]
    fn test_read_line_after_peek() {
        let (mut ctx, _f) = context_over("#line\nrest\n");
        assert!(ctx.consume(b"#"));
        assert!(ctx.read_line());
        assert_eq!(ctx.line, b"line\n");
        assert!(ctx.read_line());
        assert_eq!(ctx.line, b"rest\n");
    }

    #[test]
    fn test_reopen_resets_state() {
        let (mut ctx, f) = context_over("x\ny\n");
        ctx.read_line();
        ctx.read_line();
        ctx.nonblank = true;
        assert!(ctx.open(f.path()));
        assert_eq!(ctx.line_number, 1);
        assert!(!ctx.nonblank);
        assert!(ctx.read_line());
        assert_eq!(ctx.line, b"x\n");
    }
}
