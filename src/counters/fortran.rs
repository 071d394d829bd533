// src/counters/fortran.rs
//! Fortran 系のカウンタ
//!
//! 行ごとにコメント判定の正規表現を当てるだけ。コメント判定に
//! マッチしても、コンパイラ指示行 (`!hpf$`, `!omp$` 等) の正規表現に
//! マッチする行はコードとして数える。LLOC は報告しない。

use std::path::Path;

use crate::catalog::FortranLang;
use crate::context::CountContext;

/// Fortran 系ソースの SLOC を数える
pub fn count_fortran(ctx: &mut CountContext, path: &Path, lang: &FortranLang) -> u64 {
    let mut sloc: u64 = 0;

    if !ctx.open(path) {
        return 0;
    }

    while ctx.read_line() {
        // The comment patterns anchor on $, so the line ending must go.
        let line = ctx.line.strip_suffix(b"\n").unwrap_or(&ctx.line);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if !(lang.comment.is_match(line) && !lang.nocomment.is_match(line)) {
            sloc += 1;
        }
    }

    sloc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fortran_langs;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn count(content: &str, suffix: &str) -> u64 {
        let lang = fortran_langs().iter().find(|l| l.suffix == suffix).unwrap();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let mut ctx = CountContext::new();
        count_fortran(&mut ctx, file.path(), lang)
    }

    #[test]
    fn test_f77_comment_column_one() {
        assert_eq!(count("C comment line\n      print *,1\n", ".f"), 1);
    }

    #[test]
    fn test_f77_lowercase_and_star_comments() {
        assert_eq!(count("c note\n* note\n      x = 1\n", ".f"), 1);
    }

    #[test]
    fn test_f90_bang_comment() {
        assert_eq!(count("! comment\n  x = 1\n", ".f90"), 1);
    }

    #[test]
    fn test_directive_counts_as_code() {
        assert_eq!(count("!omp$ parallel\n", ".f90"), 1);
    }

    #[test]
    fn test_blank_lines_skipped() {
        assert_eq!(count("\n   \n      end\n", ".f"), 1);
    }

    #[test]
    fn test_trailing_bang_is_still_code() {
        // Only a leading ! makes a comment line.
        assert_eq!(count("      x = 1 ! tail\n", ".f90"), 1);
    }
}
