// src/catalog.rs
//! 言語カタログ
//!
//! 認識する全言語の静的テーブル。4 つのテーブルに分かれる:
//!
//! - C 系/汎用: ブロックコメント + 行コメント (ブロック開始が空なら
//!   行ベースの汎用カウンタで処理)
//! - スクリプト言語: `#` コメントのみ。拡張子か hashbang 行で認識
//! - Pascal 系: `(* *)` ブロックコメント (`{ }` 併用はフラグ)
//! - Fortran 系: 行頭の正規表現でコメント判定
//!
//! テーブルは起動後は読み取り専用。拡張子の重複は「検証器付きの行が
//! 先、検証器なしのフォールバックは末尾に 1 つだけ」の規則に従う
//! (`self_check` が検査する)。同名の行は連続して並べること。

use std::path::Path;
use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::context::CountContext;
use crate::error::AppError;
use crate::verify;

/// 拡張子が多重定義されたときに内容で判定する述語
pub type Verifier = fn(&mut CountContext, &Path) -> bool;

// Syntax flags
pub const NF: u8 = 0x00;
/// 文字列中の生の改行を警告する
pub const EOL_WARN: u8 = 0x01;
/// C 流のバックスラッシュエスケープを解釈する
pub const BACKSLASH_ESCAPES: u8 = 0x02;
/// Go 流のバッククォート raw string を解釈する
pub const RAW_BACKTICK: u8 = 0x04;

/// C 系・汎用言語のテーブル行
pub struct GenericLang {
    pub name: &'static str,
    pub suffix: &'static str,
    pub block_open: &'static str,
    pub block_close: &'static str,
    pub eol_comment: &'static str,
    pub multistring: &'static str,
    pub flags: u8,
    pub terminator: &'static str,
    pub verifier: Option<Verifier>,
}

impl GenericLang {
    /// ブロック開始があれば C 系バイトマシン、なければ行ベース
    #[must_use]
    pub fn is_c_family(&self) -> bool {
        !self.block_open.is_empty()
    }

    #[must_use]
    pub fn has_flag(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }
}

pub struct ScriptLang {
    pub name: &'static str,
    pub suffix: &'static str,
    pub hashbang: &'static str,
    pub verifier: Option<Verifier>,
}

pub struct PascalLang {
    pub name: &'static str,
    pub suffix: &'static str,
    pub bracket_comments: bool,
    pub terminator: &'static str,
    pub verifier: Option<Verifier>,
}

pub struct FortranLang {
    pub name: &'static str,
    pub suffix: &'static str,
    pub comment: Regex,
    pub nocomment: Regex,
}

// For speed, more common languages and extensions go earlier. Verifiers
// are expensive, so extensions that need them come after extensions that
// don't, where the scan order allows it.
pub static GENERIC_LANGS: &[GenericLang] = &[
    // C family
    lang("c", ".c", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", None),
    lang("c-header", ".h", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", None),
    lang("c-header", ".hpp", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", None),
    lang("c-header", ".hxx", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", None),
    lang("yacc", ".y", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", None),
    lang("lex", ".l", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", Some(verify::really_lex)),
    lang("c++", ".cpp", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", None),
    lang("c++", ".cxx", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", None),
    lang("c++", ".cc", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", None),
    lang("java", ".java", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", None),
    lang("javascript", ".js", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, "", None),
    lang("obj-c", ".m", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", Some(verify::really_objective_c)),
    lang("c#", ".cs", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", None),
    lang("php", ".php", "/*", "*/", "//", "", EOL_WARN | BACKSLASH_ESCAPES, ";", None),
    lang("go", ".go", "/*", "*/", "//", "`", EOL_WARN | BACKSLASH_ESCAPES | RAW_BACKTICK, "", None),
    lang("swift", ".swift", "/*", "*/", "//", "", EOL_WARN, "", None),
    lang("sql", ".sql", "/*", "*/", "--", "", NF, "", None),
    lang("haskell", ".hs", "{-", "-}", "--", "", EOL_WARN, "", None),
    lang("pl/1", ".pl1", "/*", "*/", "", "", EOL_WARN, ";", None),
    // everything else
    lang("asm", ".asm", "/*", "*/", ";", "", EOL_WARN, "\n", None),
    lang("asm", ".s", "/*", "*/", ";", "", EOL_WARN, "\n", None),
    lang("asm", ".S", "/*", "*/", ";", "", EOL_WARN, "\n", None),
    lang("ada", ".ada", "", "", "--", "", EOL_WARN, ";", None),
    lang("ada", ".adb", "", "", "--", "", EOL_WARN, ";", None),
    lang("ada", ".ads", "", "", "--", "", EOL_WARN, ";", None),
    lang("ada", ".pad", "", "", "--", "", EOL_WARN, "", None), // Oracle Ada preprocessor
    lang("css", ".css", "/*", "*/", "", "", EOL_WARN, "", None),
    lang("makefile", ".mk", "", "", "#", "", EOL_WARN, "", None),
    lang("makefile", "Makefile", "", "", "#", "", EOL_WARN, "", None),
    lang("makefile", "makefile", "", "", "#", "", EOL_WARN, "", None),
    lang("makefile", "Imakefile", "", "", "#", "", EOL_WARN, "", None),
    lang("m4", ".m4", "", "", "#", "", EOL_WARN, "", None),
    lang("lisp", ".lisp", "", "", ";", "", EOL_WARN, "", None),
    lang("lisp", ".lsp", "", "", ";", "", EOL_WARN, "", None), // XLISP
    lang("lisp", ".cl", "", "", ";", "", EOL_WARN, "", None),  // Common Lisp
    lang("lisp", ".l", "", "", ";", "", EOL_WARN, "", None),
    lang("scheme", ".scm", "", "", ";", "", EOL_WARN, "", None),
    lang("elisp", ".el", "", "", ";", "", EOL_WARN, "", None), // Emacs Lisp
    lang("clojure", ".clj", "", "", ";", "", EOL_WARN, "", None),
    lang("clojure", ".cljc", "", "", ";", "", EOL_WARN, "", None),
    lang("clojurescript", ".cljs", "", "", ";", "", EOL_WARN, "", None),
    lang("cobol", ".CBL", "", "", "*", "", EOL_WARN, "", None),
    lang("cobol", ".cbl", "", "", "*", "", EOL_WARN, "", None),
    lang("cobol", ".COB", "", "", "*", "", EOL_WARN, "", None),
    lang("cobol", ".cob", "", "", "*", "", EOL_WARN, "", None),
    lang("eiffel", ".e", "", "", "--", "", EOL_WARN, "", None),
    lang("sather", ".sa", "", "", "--", "", EOL_WARN, ";", Some(verify::really_sather)),
    lang("lua", ".lua", "--[[", "]]", "--", "", EOL_WARN, "", None),
    lang("clu", ".clu", "", "", "%", "", EOL_WARN, ";", None),
    lang("rust", ".rs", "", "", "//", "", EOL_WARN, ";", None),
    lang("rust", ".rlib", "", "", "//", "", EOL_WARN, ";", None),
    lang("erlang", ".erl", "", "", "%", "", EOL_WARN, "", None),
    lang("vhdl", ".vhdl", "", "", "--", "", NF, "", None),
    lang("verilog", ".v", "/*", "*/", "//", "", EOL_WARN, ";", None),
    lang("verilog", ".vh", "/*", "*/", "//", "", EOL_WARN, ";", None),
    lang("d", ".d", "/+", "+/", "//", "", EOL_WARN, ";", None),
    lang("occam", ".f", "", "", "//", "", EOL_WARN, "", Some(verify::really_occam)),
    lang("f#", ".fs", "", "", "//", "", EOL_WARN, "", None),
    lang("f#", ".fsi", "", "", "//", "", EOL_WARN, "", None),
    lang("f#", ".fsx", "", "", "//", "", EOL_WARN, "", None),
    lang("f#", ".fscript", "", "", "//", "", EOL_WARN, "", None),
    lang("kotlin", ".kt", "", "", "//", "", EOL_WARN, "", None),
    lang("dart", ".dart", "", "", "//", "", EOL_WARN, ";", None),
    lang("prolog", ".pl", "", "", "%", "", EOL_WARN, ".", Some(verify::really_prolog)),
    lang("mumps", ".m", "", "", ";", "", EOL_WARN, "", None),
    lang("mumps", ".mps", "", "", ";", "", EOL_WARN, "", None),
    lang("pop11", ".p", "", "", ";", "", EOL_WARN, "", Some(verify::really_pop11)),
    lang("rebol", ".r", "", "", "comment", "", NF, "", None),
    lang("simula", ".sim", "", "", "comment", "", NF, ";", None),
    lang("icon", ".icn", "", "", "#", "", NF, "", None),
    lang("algol60", ".alg", "", "", "COMMENT", "", NF, ";", None),
    // autoconf cruft
    lang("autotools", "config.h.in", "/*", "*/", "//", "", EOL_WARN, "", None),
    lang("autotools", "autogen.sh", "", "", "#", "", EOL_WARN, "", None),
    lang("autotools", "configure.in", "", "", "#", "", EOL_WARN, "", None),
    lang("autotools", "Makefile.in", "", "", "#", "", EOL_WARN, "", None),
    lang("autotools", ".am", "", "", "#", "", EOL_WARN, "", None),
    lang("autotools", ".ac", "", "", "#", "", EOL_WARN, "", None),
    lang("autotools", ".mf", "", "", "#", "", EOL_WARN, "", None),
    // Scons
    lang("scons", "SConstruct", "", "", "#", "", EOL_WARN, "", None),
];

#[allow(clippy::too_many_arguments)]
const fn lang(
    name: &'static str,
    suffix: &'static str,
    block_open: &'static str,
    block_close: &'static str,
    eol_comment: &'static str,
    multistring: &'static str,
    flags: u8,
    terminator: &'static str,
    verifier: Option<Verifier>,
) -> GenericLang {
    GenericLang {
        name,
        suffix,
        block_open,
        block_close,
        eol_comment,
        multistring,
        flags,
        terminator,
        verifier,
    }
}

pub static SCRIPT_LANGS: &[ScriptLang] = &[
    // tcl before sh, because tclsh
    ScriptLang { name: "tcl", suffix: ".tcl", hashbang: "tcl", verifier: None },
    ScriptLang { name: "tcl", suffix: ".tcl", hashbang: "wish", verifier: None },
    ScriptLang { name: "csh", suffix: ".csh", hashbang: "csh", verifier: None },
    ScriptLang { name: "shell", suffix: ".sh", hashbang: "sh", verifier: None },
    ScriptLang { name: "ruby", suffix: ".rb", hashbang: "ruby", verifier: None },
    ScriptLang { name: "awk", suffix: ".awk", hashbang: "awk", verifier: None },
    ScriptLang { name: "sed", suffix: ".sed", hashbang: "sed", verifier: None },
    ScriptLang { name: "expect", suffix: ".exp", hashbang: "expect", verifier: Some(verify::really_expect) },
];

pub static PASCAL_LANGS: &[PascalLang] = &[
    PascalLang { name: "pascal", suffix: ".pas", bracket_comments: true, terminator: ";", verifier: None },
    PascalLang { name: "pascal", suffix: ".p", bracket_comments: true, terminator: ";", verifier: Some(verify::really_pascal) },
    PascalLang { name: "pascal", suffix: ".inc", bracket_comments: true, terminator: ";", verifier: Some(verify::really_pascal) },
    PascalLang { name: "modula3", suffix: ".i3", bracket_comments: false, terminator: ";", verifier: None },
    PascalLang { name: "modula3", suffix: ".m3", bracket_comments: false, terminator: ";", verifier: None },
    PascalLang { name: "modula3", suffix: ".ig", bracket_comments: false, terminator: ";", verifier: None },
    PascalLang { name: "modula3", suffix: ".mg", bracket_comments: false, terminator: ";", verifier: None },
    // Could be CAML or OCaml
    PascalLang { name: "ml", suffix: ".ml", bracket_comments: false, terminator: "", verifier: None },
    PascalLang { name: "ml", suffix: ".mli", bracket_comments: false, terminator: "", verifier: None },
    PascalLang { name: "ml", suffix: ".mll", bracket_comments: false, terminator: "", verifier: None },
    PascalLang { name: "ml", suffix: ".mly", bracket_comments: false, terminator: "", verifier: None },
    PascalLang { name: "oberon", suffix: ".mod", bracket_comments: false, terminator: ";", verifier: None },
];

/// Fortran 系テーブル (正規表現は起動時に一度だけコンパイル)
pub fn fortran_langs() -> &'static [FortranLang] {
    static LANGS: OnceLock<Vec<FortranLang>> = OnceLock::new();
    LANGS.get_or_init(|| {
        let f90_comment = Regex::new(r"^([ \t]*!|[ \t]*$)").unwrap();
        let f90_nocomment = Regex::new(r"^[ \t]*!(hpf|omp)[$]").unwrap();
        let f77_comment = Regex::new(r"^([cC*!]|[ \t]+!|[ \t]*$)").unwrap();
        let f77_nocomment = Regex::new(r"^[cC*!](hpf|omp)[$]").unwrap();
        vec![
            FortranLang {
                name: "fortran90",
                suffix: ".f90",
                comment: f90_comment.clone(),
                nocomment: f90_nocomment.clone(),
            },
            FortranLang {
                name: "fortran95",
                suffix: ".f95",
                comment: f90_comment.clone(),
                nocomment: f90_nocomment.clone(),
            },
            FortranLang {
                name: "fortran03",
                suffix: ".f03",
                comment: f90_comment,
                nocomment: f90_nocomment,
            },
            FortranLang {
                name: "fortran",
                suffix: ".f77",
                comment: f77_comment.clone(),
                nocomment: f77_nocomment.clone(),
            },
            FortranLang {
                name: "fortran",
                suffix: ".f",
                comment: f77_comment,
                nocomment: f77_nocomment,
            },
        ]
    })
}

/// c-header バケットの振り替え先の優先順
pub static C_HEADER_PRIORITY: &[&str] = &["c", "c++", "obj-c"];

/// 報告可能な言語名の一覧 (重複除去・ソート済み)
///
/// `lloc_only` なら LLOC を報告できる言語に絞る。
#[must_use]
pub fn list_languages(lloc_only: bool) -> Vec<&'static str> {
    // The hard-coded counters first.
    let mut names: Vec<&'static str> = vec!["python", "waf", "perl"];

    // Same-name rows are contiguous, so dedup is a single pass.
    let mut last = "";
    for lang in GENERIC_LANGS {
        if lang.name != last && (!lloc_only || !lang.terminator.is_empty()) {
            names.push(lang.name);
            last = lang.name;
        }
    }
    last = "";
    for lang in PASCAL_LANGS {
        if lang.name != last && (!lloc_only || !lang.terminator.is_empty()) {
            names.push(lang.name);
            last = lang.name;
        }
    }
    if !lloc_only {
        last = "";
        for lang in SCRIPT_LANGS {
            if lang.name != last {
                names.push(lang.name);
                last = lang.name;
            }
        }
        last = "";
        for lang in fortran_langs() {
            if lang.name != last {
                names.push(lang.name);
                last = lang.name;
            }
        }
    }
    names.sort_unstable();
    names
}

/// 言語ごとの認識パターン一覧 (`-e` 用)
#[must_use]
pub fn extensions_by_language() -> Vec<(&'static str, Vec<&'static str>)> {
    let mut map: hashbrown::HashMap<&'static str, Vec<&'static str>> =
        hashbrown::HashMap::new();
    map.insert("python", vec![".py"]);
    map.insert("waf", vec!["wscript"]);
    map.insert("perl", vec![".pl", ".pm", ".ph"]);
    for lang in GENERIC_LANGS {
        map.entry(lang.name).or_default().push(lang.suffix);
    }
    for lang in SCRIPT_LANGS {
        map.entry(lang.name).or_default().push(lang.suffix);
    }
    for lang in PASCAL_LANGS {
        map.entry(lang.name).or_default().push(lang.suffix);
    }
    for lang in fortran_langs() {
        map.entry(lang.name).or_default().push(lang.suffix);
    }
    list_languages(false)
        .into_iter()
        .map(|name| (name, map.remove(name).unwrap_or_default()))
        .collect()
}

/// カタログの整合性検査
///
/// ある接尾辞について、検証器なしの行は高々 1 つで、かつその接尾辞の
/// 全ての行の後に来なければならない (検証器なしの行が先にあると後続は
/// 決して選ばれない)。テーブルは分類器の走査順に連結して調べる。
pub fn self_check() -> Result<(), AppError> {
    // (suffix, name, has_verifier) in classifier scan order
    let mut rows: Vec<(&str, &str, bool)> = Vec::new();
    for lang in GENERIC_LANGS {
        rows.push((lang.suffix, lang.name, lang.verifier.is_some()));
    }
    for lang in SCRIPT_LANGS {
        rows.push((lang.suffix, lang.name, lang.verifier.is_some()));
    }
    for lang in PASCAL_LANGS {
        rows.push((lang.suffix, lang.name, lang.verifier.is_some()));
    }
    for lang in fortran_langs() {
        rows.push((lang.suffix, lang.name, false));
    }

    for (i, &(suffix, name, verified)) in rows.iter().enumerate() {
        if verified {
            continue;
        }
        // Nothing after an unverified row may share its suffix, except
        // rows of the same language (hashbang aliases).
        for &(later_suffix, later_name, _) in &rows[i + 1..] {
            if later_suffix == suffix && later_name != name {
                return Err(AppError::Catalog(format!(
                    "{later_name}: {suffix} is shadowed by an unverified {name} entry"
                )));
            }
        }
    }
    Ok(())
}
