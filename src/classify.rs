// src/classify.rs
//! ファイルの言語分類
//!
//! カタログを宣言順に 1 パス走査し、最初に成功した行で確定する:
//!
//! 1. C 系/汎用テーブル (接尾辞一致 → 検証器 → 生成ファイル検出 →
//!    カウンタ、SLOC > 0 なら確定)
//! 2. 特例: `.py`/hashbang python、`.pl` `.pm` `.ph`/hashbang perl、
//!    basename `wscript` (waf)
//! 3. スクリプト言語テーブル (接尾辞か hashbang)
//! 4. Pascal 系 → 5. Fortran 系 (最初に SLOC が出た行で確定)
//!
//! どの言語でもなければ空の言語名のまま返し、`-u` で報告される。
//! 生成ファイルとして拒否されたものも空のまま返るが、こちらは
//! 未分類としては報告されない。

use std::path::{Path, PathBuf};

use crate::catalog::{self, GENERIC_LANGS, PASCAL_LANGS, SCRIPT_LANGS};
use crate::context::CountContext;
use crate::counters;
use crate::generated::was_generated;

/// 1 ファイル分の計測結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStat {
    pub path: PathBuf,
    /// 空文字列なら未分類 (または生成ファイルとして拒否)
    pub language: &'static str,
    pub sloc: u64,
    pub lloc: u64,
    /// 生成ファイルとして拒否された。未分類としては報告しない。
    pub rejected: bool,
}

impl SourceStat {
    fn unclassified(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            language: "",
            sloc: 0,
            lloc: 0,
            rejected: false,
        }
    }
}

/// パスを分類して行数を数える
///
/// 決定的: 同じファイルには常に同じ結果を返す。
#[must_use]
pub fn classify(path: &Path) -> SourceStat {
    let mut ctx = CountContext::new();
    let mut stat = SourceStat::unclassified(path);
    let path_str = path.to_string_lossy();

    for lang in GENERIC_LANGS {
        if !path_str.ends_with(lang.suffix) {
            continue;
        }
        if let Some(verifier) = lang.verifier
            && !verifier(&mut ctx, path)
        {
            continue;
        }
        if was_generated(&mut ctx, path, lang.eol_comment) {
            stat.rejected = true;
            return stat;
        }
        let (sloc, lloc) = if lang.is_c_family() {
            counters::count_c_family(&mut ctx, path, lang)
        } else {
            counters::count_generic(&mut ctx, path, lang.eol_comment, lang.terminator)
        };
        if sloc > 0 {
            stat.language = lang.name;
            stat.sloc = sloc;
            stat.lloc = lloc;
            return stat;
        }
    }

    if path_str.ends_with(".py") || hashbang(&mut ctx, path, "python") {
        if was_generated(&mut ctx, path, "#") {
            stat.rejected = true;
            return stat;
        }
        stat.language = "python";
        (stat.sloc, stat.lloc) = counters::count_python(&mut ctx, path);
        return stat;
    }

    if path_str.ends_with(".pl")
        || path_str.ends_with(".pm")
        || path_str.ends_with(".ph")
        || hashbang(&mut ctx, path, "perl")
    {
        if was_generated(&mut ctx, path, "#") {
            stat.rejected = true;
            return stat;
        }
        stat.language = "perl";
        (stat.sloc, stat.lloc) = counters::count_perl(&mut ctx, path);
        return stat;
    }

    if path.file_name().is_some_and(|n| n == "wscript") {
        if was_generated(&mut ctx, path, "#") {
            stat.rejected = true;
            return stat;
        }
        stat.language = "waf";
        (stat.sloc, stat.lloc) = counters::count_python(&mut ctx, path);
        return stat;
    }

    for lang in SCRIPT_LANGS {
        if !(path_str.ends_with(lang.suffix) || hashbang(&mut ctx, path, lang.hashbang)) {
            continue;
        }
        if let Some(verifier) = lang.verifier
            && !verifier(&mut ctx, path)
        {
            continue;
        }
        if was_generated(&mut ctx, path, "#") {
            stat.rejected = true;
            return stat;
        }
        stat.language = lang.name;
        (stat.sloc, stat.lloc) = counters::count_generic(&mut ctx, path, "#", "");
        return stat;
    }

    for lang in PASCAL_LANGS {
        if !path_str.ends_with(lang.suffix) {
            continue;
        }
        if let Some(verifier) = lang.verifier
            && !verifier(&mut ctx, path)
        {
            continue;
        }
        let (sloc, lloc) = counters::count_pascal(&mut ctx, path, lang);
        if sloc > 0 {
            stat.language = lang.name;
            stat.sloc = sloc;
            stat.lloc = lloc;
            return stat;
        }
    }

    for lang in catalog::fortran_langs() {
        if !path_str.ends_with(lang.suffix) {
            continue;
        }
        let sloc = counters::count_fortran(&mut ctx, path, lang);
        if sloc > 0 {
            stat.language = lang.name;
            stat.sloc = sloc;
            return stat;
        }
    }

    stat
}

/// hashbang 行に指定のインタープリタ名があるか
///
/// 実行ビットが立っていないファイルは読まない。
fn hashbang(ctx: &mut CountContext, path: &Path, token: &str) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let Ok(meta) = std::fs::metadata(path) else {
            return false;
        };
        if meta.permissions().mode() & 0o111 == 0 {
            return false;
        }
        if !ctx.open(path) {
            return false;
        }
        ctx.read_line()
            && ctx.line.starts_with(b"#!")
            && crate::counters::strutil::contains(&ctx.line, token.as_bytes())
    }
    #[cfg(not(unix))]
    {
        let _ = (ctx, path, token);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn classify_named(name: &str, content: &str) -> SourceStat {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        classify(&path)
    }

    #[test]
    fn test_c_file() {
        let stat = classify_named("x.c", "int main(){return 0;}\n");
        assert_eq!(stat.language, "c");
        assert_eq!(stat.sloc, 1);
        assert_eq!(stat.lloc, 1);
    }

    #[test]
    fn test_c_header() {
        let stat = classify_named("x.h", "int f(void);\n");
        assert_eq!(stat.language, "c-header");
        assert_eq!(stat.sloc, 1);
    }

    #[test]
    fn test_python_file() {
        let stat = classify_named("x.py", "\"\"\"doc\nstring\"\"\"\nx=1\n");
        assert_eq!(stat.language, "python");
        assert_eq!(stat.sloc, 1);
        assert_eq!(stat.lloc, 1);
    }

    #[test]
    fn test_perl_module() {
        // A .pl suffix would hit the prolog row first; .pm goes straight
        // to the perl counter.
        let stat = classify_named("x.pm", "print 1;\n=pod\ndoc\n=cut\nprint 2;\n");
        assert_eq!(stat.language, "perl");
        assert_eq!(stat.sloc, 2);
        assert_eq!(stat.lloc, 2);
    }

    #[test]
    fn test_perl_script_with_variables() {
        // $-variables make the prolog verifier reject, so .pl falls
        // through to perl.
        let stat = classify_named("x.pl", "my $x = 1;\nprint $x;\n");
        assert_eq!(stat.language, "perl");
        assert_eq!(stat.sloc, 2);
        assert_eq!(stat.lloc, 2);
    }

    #[test]
    fn test_prolog_beats_perl_when_verified() {
        let stat = classify_named("facts.pl", "parent(tom, bob).\n");
        assert_eq!(stat.language, "prolog");
        assert_eq!(stat.sloc, 1);
    }

    #[test]
    fn test_fortran_77_file() {
        let stat = classify_named("x.f", "C comment line\n      print *,1\n");
        assert_eq!(stat.language, "fortran");
        assert_eq!(stat.sloc, 1);
    }

    #[test]
    fn test_wscript_is_waf() {
        let stat = classify_named("wscript", "def build(bld):\n    pass\n");
        assert_eq!(stat.language, "waf");
        assert_eq!(stat.sloc, 2);
    }

    #[test]
    fn test_shell_by_suffix() {
        let stat = classify_named("x.sh", "echo hi\n# comment\n");
        assert_eq!(stat.language, "shell");
        assert_eq!(stat.sloc, 1);
    }

    #[test]
    fn test_generated_file_rejected() {
        let stat = classify_named("gen.c", "/* automatically generated */\nint x;\n");
        assert_eq!(stat.language, "");
        assert_eq!(stat.sloc, 0);
        assert!(stat.rejected);
    }

    #[test]
    fn test_unknown_suffix_unclassified() {
        let stat = classify_named("x.qqq", "whatever\n");
        assert_eq!(stat.language, "");
        assert_eq!(stat.sloc, 0);
    }

    #[test]
    fn test_lex_rejection_falls_back_to_lisp() {
        let stat = classify_named("x.l", "(defun foo () 1)\n; comment\n");
        assert_eq!(stat.language, "lisp");
        assert_eq!(stat.sloc, 1);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.c");
        fs::write(&path, "int x;\n/* c */\nint y;\n").unwrap();
        let first = classify(&path);
        for _ in 0..3 {
            assert_eq!(classify(&path), first);
        }
    }

    #[test]
    fn test_pascal_verifier_on_dot_p() {
        let src = "program hello;\nprocedure greet;\nbegin\nend;\nbegin\n  greet\nend.\n";
        let stat = classify_named("x.p", src);
        assert_eq!(stat.language, "pascal");
        assert!(stat.sloc > 0);
    }

    #[test]
    fn test_empty_file_stays_unclassified() {
        let stat = classify_named("empty.qqq", "");
        assert_eq!(stat.language, "");
        assert_eq!(stat.sloc, 0);
    }
}
