// src/verify.rs
//! 拡張子が多重定義されたファイルの内容検証
//!
//! `.m` `.l` `.p` `.pl` `.f` `.exp` `.sa` などは複数言語で使われる。
//! 各検証器はファイルを開き直して行を走査し、その言語らしさの証拠を
//! 集めて採否を返す。拒否されたら分類器はカタログ走査を続ける。

use std::path::Path;
use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::context::CountContext;
use crate::counters::strutil;
use crate::debug_level;

fn report(lang: &str, verdict: bool, path: &Path) -> bool {
    if debug_level() > 0 {
        eprintln!("{lang} verifier returned {verdict} on {}", path.display());
    }
    verdict
}

/// どれかのキーワードを含む行があるかどうか
fn has_any_keyword(ctx: &mut CountContext, path: &Path, lang: &str, tells: &[&[u8]]) -> bool {
    let mut matching = false;

    if ctx.open(path) {
        while ctx.read_line() {
            if tells.iter().any(|t| strutil::contains(&ctx.line, t)) {
                matching = true;
                break;
            }
        }
    }

    report(lang, matching, path)
}

/// 全てのキーワードがファイル中のどこかに現れるかどうか
fn has_all_keywords(ctx: &mut CountContext, path: &Path, lang: &str, tells: &[&[u8]]) -> bool {
    let mut seen = vec![false; tells.len()];

    if ctx.open(path) {
        while ctx.read_line() {
            for (i, t) in tells.iter().enumerate() {
                if !seen[i] && strutil::contains(&ctx.line, t) {
                    seen[i] = true;
                }
            }
            if seen.iter().all(|&s| s) {
                break;
            }
        }
    }

    report(lang, seen.iter().all(|&s| s), path)
}

/// `.m`: 本当に Objective-C か
pub fn really_objective_c(ctx: &mut CountContext, path: &Path) -> bool {
    static BRACE_AT_MARGIN: OnceLock<Regex> = OnceLock::new();
    static BRACE_AT_END: OnceLock<Regex> = OnceLock::new();
    static PLUS_MINUS: OnceLock<Regex> = OnceLock::new();
    static WORD_MAIN: OnceLock<Regex> = OnceLock::new();
    static SPECIAL: OnceLock<Regex> = OnceLock::new();
    let brace_at_margin = BRACE_AT_MARGIN.get_or_init(|| Regex::new(r"^\s*[{}]").unwrap());
    let brace_at_end = BRACE_AT_END.get_or_init(|| Regex::new(r"[{}];?\s*$").unwrap());
    let plus_minus = PLUS_MINUS.get_or_init(|| Regex::new(r"^\s*[+-]").unwrap());
    let word_main = WORD_MAIN.get_or_init(|| Regex::new(r"\bmain\s*\(").unwrap());
    let special = SPECIAL.get_or_init(|| Regex::new(r"(?i)^\s*\[object name\];\s*").unwrap());

    let mut brace_lines = 0u32; // lines that begin or end with a curly brace
    let mut plus_minus_lines = 0u32; // method definitions begin with + or -
    let mut has_main = false;
    let mut has_special = false; // the [object name]; idiom

    if ctx.open(path) {
        while ctx.read_line() {
            if ctx.matchline(brace_at_margin) || ctx.matchline(brace_at_end) {
                brace_lines += 1;
            }
            if ctx.matchline(plus_minus) {
                plus_minus_lines += 1;
            }
            if ctx.matchline(word_main) {
                has_main = true;
            }
            if ctx.matchline(special) {
                has_special = true;
            }
        }
    }

    let verdict = brace_lines > 1 && (plus_minus_lines > 1 || has_main || has_special);
    report("objc", verdict, path)
}

/// `.l`: 本当に lex か
pub fn really_lex(ctx: &mut CountContext, path: &Path) -> bool {
    has_any_keyword(ctx, path, "lex", &[b"%{", b"%%", b"%}"])
}

/// `.p`: 本当に Pop-11 か
pub fn really_pop11(ctx: &mut CountContext, path: &Path) -> bool {
    has_all_keywords(ctx, path, "pop11", &[b"define", b"printf"])
}

/// `.sa`: 本当に Sather か
pub fn really_sather(ctx: &mut CountContext, path: &Path) -> bool {
    has_any_keyword(ctx, path, "sather", &[b"class"])
}

/// `.f`: 本当に occam か
///
/// `--` だけなら Fortran のコメントでもあり得るので、`PROC` も要求する。
pub fn really_occam(ctx: &mut CountContext, path: &Path) -> bool {
    has_all_keywords(ctx, path, "occam", &[b"--", b"PROC"])
}

/// `.pl`: 本当に Prolog か
///
/// `#` で始まる行や `$英字` があれば Perl の可能性が高いので拒否する。
pub fn really_prolog(ctx: &mut CountContext, path: &Path) -> bool {
    static DOLLAR_ALPHA: OnceLock<Regex> = OnceLock::new();
    let dollar_alpha = DOLLAR_ALPHA.get_or_init(|| Regex::new(r"\$[[:alpha:]]").unwrap());

    if !ctx.open(path) {
        return report("prolog", false, path);
    }
    while ctx.read_line() {
        if ctx.line.starts_with(b"#") || ctx.matchline(dollar_alpha) {
            return report("prolog", false, path);
        }
    }
    report("prolog", true, path)
}

/// `.exp`: 本当に Expect か
///
/// 多くの `.exp` はエクスポートデータなので内容で判定する:
/// 1. `load_lib` があり、`#` コメントか `{ }` の両方がある
/// 2. `{`, `}` と、`proc` / `if` / `[...]` / `expect` のどれか
pub fn really_expect(ctx: &mut CountContext, path: &Path) -> bool {
    static BEGIN_BRACE: OnceLock<Regex> = OnceLock::new();
    static OPEN_AT_END: OnceLock<Regex> = OnceLock::new();
    static END_BRACE: OnceLock<Regex> = OnceLock::new();
    static CLOSE_AT_END: OnceLock<Regex> = OnceLock::new();
    static LOAD_LIB: OnceLock<Regex> = OnceLock::new();
    static PROC: OnceLock<Regex> = OnceLock::new();
    static IF: OnceLock<Regex> = OnceLock::new();
    static BRACKETS: OnceLock<Regex> = OnceLock::new();
    static EXPECT: OnceLock<Regex> = OnceLock::new();
    let begin_brace = BEGIN_BRACE.get_or_init(|| Regex::new(r"^\s*\{").unwrap());
    let open_at_end = OPEN_AT_END.get_or_init(|| Regex::new(r"\{\s*$").unwrap());
    let end_brace = END_BRACE.get_or_init(|| Regex::new(r"^\s*}").unwrap());
    let close_at_end = CLOSE_AT_END.get_or_init(|| Regex::new(r"};?\s*$").unwrap());
    let load_lib = LOAD_LIB.get_or_init(|| Regex::new(r"^\s*load_lib\s+\S").unwrap());
    let proc = PROC.get_or_init(|| Regex::new(r"^\s*proc\s").unwrap());
    let if_cmd = IF.get_or_init(|| Regex::new(r"^\s*if\s").unwrap());
    let brackets = BRACKETS.get_or_init(|| Regex::new(r"\[.*\]").unwrap());
    let expect_cmd = EXPECT.get_or_init(|| Regex::new(r"^\s*expect\s").unwrap());

    let mut has_begin_brace = false;
    let mut has_end_brace = false;
    let mut has_load_lib = false;
    let mut has_proc = false;
    let mut has_if = false;
    let mut has_brackets = false;
    let mut has_expect = false;
    let mut has_pound = false;

    if ctx.open(path) {
        while ctx.read_line() {
            if let Some(i) = strutil::find(&ctx.line, b"#") {
                has_pound = true;
                ctx.line.truncate(i);
            }
            if ctx.matchline(begin_brace) || ctx.matchline(open_at_end) {
                has_begin_brace = true;
            }
            if ctx.matchline(end_brace) || ctx.matchline(close_at_end) {
                has_end_brace = true;
            }
            if ctx.matchline(load_lib) {
                has_load_lib = true;
            }
            if ctx.matchline(proc) {
                has_proc = true;
            }
            if ctx.matchline(if_cmd) {
                has_if = true;
            }
            if ctx.matchline(brackets) {
                has_brackets = true;
            }
            if ctx.matchline(expect_cmd) {
                has_expect = true;
            }
        }
    }

    let mut verdict = false;
    if has_load_lib && (has_pound || (has_begin_brace && has_end_brace)) {
        verdict = true;
    }
    if has_begin_brace && has_end_brace && (has_proc || has_if || has_brackets || has_expect) {
        verdict = true;
    }
    report("expect", verdict, path)
}

/// `.p` / `.inc`: 本当に Pascal か
///
/// 多くの `.p` は Perl や C の抽出物。`{...}` と `(*...*)` のコメントを
/// 消した上で、次のどれかを満たせば Pascal と判定する:
/// 1. program/unit + procedure/function/interface/implementation +
///    begin + 末尾の `end.`
/// 2. module + 末尾の `end.`
/// 3. program + begin + 末尾の `end.`
pub fn really_pascal(ctx: &mut CountContext, path: &Path) -> bool {
    static BRACE_COMMENT: OnceLock<Regex> = OnceLock::new();
    static PAREN_COMMENT: OnceLock<Regex> = OnceLock::new();
    static PROGRAM: OnceLock<Regex> = OnceLock::new();
    static UNIT: OnceLock<Regex> = OnceLock::new();
    static MODULE: OnceLock<Regex> = OnceLock::new();
    static PROCEDURE: OnceLock<Regex> = OnceLock::new();
    static FUNCTION: OnceLock<Regex> = OnceLock::new();
    static INTERFACE: OnceLock<Regex> = OnceLock::new();
    static IMPLEMENTATION: OnceLock<Regex> = OnceLock::new();
    static BEGIN: OnceLock<Regex> = OnceLock::new();
    static TERMINATING_END: OnceLock<Regex> = OnceLock::new();
    let brace_comment = BRACE_COMMENT.get_or_init(|| Regex::new(r"\{.*?\}").unwrap());
    let paren_comment = PAREN_COMMENT.get_or_init(|| Regex::new(r"\(\*.*\*\)").unwrap());
    let program = PROGRAM.get_or_init(|| Regex::new(r"(?i)\bprogram\s+[A-Za-z]").unwrap());
    let unit = UNIT.get_or_init(|| Regex::new(r"(?i)\bunit\s+[A-Za-z]").unwrap());
    let module = MODULE.get_or_init(|| Regex::new(r"(?i)\bmodule\s+[A-Za-z]").unwrap());
    let procedure = PROCEDURE.get_or_init(|| Regex::new(r"(?i)\bprocedure\b").unwrap());
    let function = FUNCTION.get_or_init(|| Regex::new(r"(?i)\bfunction\b").unwrap());
    let interface = INTERFACE.get_or_init(|| Regex::new(r"(?i)^\s*interface\s+").unwrap());
    let implementation =
        IMPLEMENTATION.get_or_init(|| Regex::new(r"(?i)^\s*implementation\s+").unwrap());
    let begin = BEGIN.get_or_init(|| Regex::new(r"(?i)\bbegin\b").unwrap());
    let terminating_end = TERMINATING_END.get_or_init(|| Regex::new(r"(?i)end\.\s*$").unwrap());

    let mut has_program = false;
    let mut has_unit = false;
    let mut has_module = false;
    let mut has_procedure_or_function = false;
    let mut has_begin = false;
    // "end." anywhere, not just the last line: fpc sources commonly put
    // a changelog comment after it.
    let mut has_terminating_end = false;

    if ctx.open(path) {
        while ctx.read_line() {
            ctx.erase(brace_comment);
            ctx.erase(paren_comment);

            if ctx.matchline(program) {
                has_program = true;
            }
            if ctx.matchline(unit) {
                has_unit = true;
            }
            if ctx.matchline(module) {
                has_module = true;
            }
            if ctx.matchline(procedure)
                || ctx.matchline(function)
                || ctx.matchline(interface)
                || ctx.matchline(implementation)
            {
                has_procedure_or_function = true;
            }
            if ctx.matchline(begin) {
                has_begin = true;
            }
            if ctx.matchline(terminating_end) {
                has_terminating_end = true;
            }
        }
    }

    let verdict = ((has_unit || has_program)
        && has_procedure_or_function
        && has_begin
        && has_terminating_end)
        || (has_module && has_terminating_end)
        || (has_program && has_begin && has_terminating_end);
    report("pascal", verdict, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_lex_accepts_marker_sections() {
        let f = file_with("%{\nint x;\n%}\n%%\n");
        let mut ctx = CountContext::new();
        assert!(really_lex(&mut ctx, f.path()));
    }

    #[test]
    fn test_lex_rejects_lisp() {
        let f = file_with("(defun foo () 1)\n");
        let mut ctx = CountContext::new();
        assert!(!really_lex(&mut ctx, f.path()));
    }

    #[test]
    fn test_objc_accepts_method_syntax() {
        let src = "@implementation Foo\n- (void)bar {\n}\n+ (id)baz {\n}\n@end\n";
        let f = file_with(src);
        let mut ctx = CountContext::new();
        assert!(really_objective_c(&mut ctx, f.path()));
    }

    #[test]
    fn test_objc_rejects_mumps() {
        let f = file_with("TEST ; a mumps routine\n W \"HELLO\"\n Q\n");
        let mut ctx = CountContext::new();
        assert!(!really_objective_c(&mut ctx, f.path()));
    }

    #[test]
    fn test_prolog_rejects_perl() {
        let f = file_with("#!/usr/bin/perl\nprint $x;\n");
        let mut ctx = CountContext::new();
        assert!(!really_prolog(&mut ctx, f.path()));
    }

    #[test]
    fn test_prolog_accepts_facts() {
        let f = file_with("parent(tom, bob).\nparent(bob, ann).\n");
        let mut ctx = CountContext::new();
        assert!(really_prolog(&mut ctx, f.path()));
    }

    #[test]
    fn test_expect_accepts_proc_with_braces() {
        let src = "proc check {} {\n    expect \"ok\"\n}\n";
        let f = file_with(src);
        let mut ctx = CountContext::new();
        assert!(really_expect(&mut ctx, f.path()));
    }

    #[test]
    fn test_expect_rejects_export_data() {
        let f = file_with("symbol_one\nsymbol_two\nsymbol_three\n");
        let mut ctx = CountContext::new();
        assert!(!really_expect(&mut ctx, f.path()));
    }

    #[test]
    fn test_pascal_accepts_program() {
        let src = "program hello;\nprocedure greet;\nbegin\nend;\nbegin\n  greet\nend.\n";
        let f = file_with(src);
        let mut ctx = CountContext::new();
        assert!(really_pascal(&mut ctx, f.path()));
    }

    #[test]
    fn test_pascal_rejects_perl_glob() {
        let f = file_with("sub glob { return 1; }\n");
        let mut ctx = CountContext::new();
        assert!(!really_pascal(&mut ctx, f.path()));
    }

    #[test]
    fn test_pascal_keywords_in_comments_ignored() {
        let src = "{ program fake; begin end. }\nreal data\n";
        let f = file_with(src);
        let mut ctx = CountContext::new();
        assert!(!really_pascal(&mut ctx, f.path()));
    }

    #[test]
    fn test_occam_requires_both_tells() {
        let f = file_with("-- a comment only\n");
        let mut ctx = CountContext::new();
        assert!(!really_occam(&mut ctx, f.path()));
    }
}
