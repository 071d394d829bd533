// src/filter.rs
//! パスフィルタ
//!
//! 分類器に渡す前に、数える価値のないパスを落とす。規則はルートからの
//! 相対パスに対して判定する。判定は次の順:
//!
//! 1. 常に無関係な接尾辞 (オブジェクト、画像、フォント、文書、
//!    アーカイブ、音声、バイトコード、man ページ) と末尾 `~`
//! 2. 先頭が `.` / パス中の `.so.` と `/.` (ドットディレクトリは
//!    中にも降りない)
//! 3. 小文字化した basename の固定集合 (README, configure, …)
//! 4. `-x` の除外正規表現
//! 5. 通常ファイル以外 (シンボリックリンクは辿らない)
//! 6. `Makefile.in` が隣にある `Makefile` (生成物)

use std::fs::Metadata;
use std::path::Path;
use std::sync::OnceLock;

use hashbrown::HashSet;

use crate::config::Config;
use crate::debug_level;

/// フィルタの判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// ファイルなら分類する。ディレクトリなら中に降りる。
    Keep,
    /// このパスは数えない。ディレクトリの場合、中へは降りる。
    Skip,
    /// ディレクトリごと読み飛ばす。
    SkipDir,
}

fn never_interesting_by_suffix() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            ".a", ".la", ".o", ".so", ".ko",
            ".gif", ".jpg", ".jpeg", ".ico", ".xpm", ".xbm", ".bmp",
            ".ps", ".pdf", ".eps",
            ".tfm", ".ttf", ".bdf", ".afm",
            ".fig", ".pic",
            ".pyc", ".pyo", ".elc",
            ".1", ".2", ".3", ".4", ".5", ".6", ".7", ".8", ".n", ".man",
            ".html", ".htm", ".sgml", ".xml",
            ".adoc", ".md", ".txt", ".tex", ".texi",
            ".po",
            ".gz", ".bz2", ".Z", ".tgz", ".zip",
            ".au", ".wav", ".ogg",
        ]
        .into_iter()
        .collect()
    })
}

fn never_interesting_by_basename() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "readme", "readme.tk", "readme.md",
            "changelog", "repository", "changes",
            "bugs", "todo", "copying", "maintainers", "news",
            "configure", "autom4te.cache", "config.log", "config.status",
            "lex.yy.c", "lex.yy.cc",
            "y.code.c", "y.tab.c", "y.tab.h",
        ]
        .into_iter()
        .collect()
    })
}

static NEVER_INTERESTING_BY_PREFIX: &[&str] = &["."];
static NEVER_INTERESTING_BY_INFIX: &[&str] = &[".so.", "/."];

fn debug_reject(rule: &str, path: &Path) {
    if debug_level() > 0 {
        eprintln!("{rule} filter failed: {}", path.display());
    }
}

/// パスを検査して判定を返す
///
/// `rel` は走査ルートからの相対パス (規則の判定対象)。`path` は
/// 実際にアクセスするためのパス。
#[must_use]
pub fn check(path: &Path, rel: &str, meta: &Metadata, config: &Config) -> Verdict {
    if let Some(ext) = extension_of(rel)
        && never_interesting_by_suffix().contains(ext)
    {
        debug_reject("suffix", path);
        return Verdict::Skip;
    }
    if rel.ends_with('~') {
        debug_reject("suffix", path);
        return Verdict::Skip;
    }

    for prefix in NEVER_INTERESTING_BY_PREFIX {
        if rel.starts_with(prefix) {
            debug_reject("prefix", path);
            return Verdict::Skip;
        }
    }

    for infix in NEVER_INTERESTING_BY_INFIX {
        if rel.contains(infix) {
            debug_reject("infix", path);
            if meta.is_dir() {
                return Verdict::SkipDir;
            }
            return Verdict::Skip;
        }
    }

    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if never_interesting_by_basename().contains(basename.as_str()) {
        debug_reject("basename", path);
        return Verdict::Skip;
    }

    if let Some(exclusions) = &config.exclude
        && exclusions.is_match(rel)
    {
        debug_reject("exclusion", path);
        return Verdict::Skip;
    }

    if meta.is_dir() {
        return Verdict::Keep;
    }

    // Symlinks and other non-regular files are never counted.
    if !meta.is_file() {
        debug_reject("regular-file", path);
        return Verdict::Skip;
    }

    // Toss generated Makefiles.
    if path.file_name().is_some_and(|n| n == "Makefile") {
        let mut sibling = path.as_os_str().to_owned();
        sibling.push(".in");
        if Path::new(&sibling).exists() {
            debug_reject("generated-makefile", path);
            return Verdict::Skip;
        }
    }

    if debug_level() > 0 {
        eprintln!("passed filter: {}", path.display());
    }
    Verdict::Keep
}

/// basename の最後のドット以降 (ドット込み) を返す
fn extension_of(path: &str) -> Option<&str> {
    let base_start = path.rfind('/').map_or(0, |i| i + 1);
    let base = &path[base_start..];
    match base.rfind('.') {
        Some(0) | None => None,
        Some(i) => Some(&base[i..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    fn check_rel(dir: &TempDir, rel: &str, config: &Config) -> Verdict {
        let path = dir.path().join(rel);
        if !path.exists() {
            fs::write(&path, "content\n").unwrap();
        }
        let meta = fs::symlink_metadata(&path).unwrap();
        check(&path, rel, &meta, config)
    }

    #[test]
    fn test_object_files_skipped() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        assert_eq!(check_rel(&dir, "x.o", &config), Verdict::Skip);
        assert_eq!(check_rel(&dir, "x.so", &config), Verdict::Skip);
        assert_eq!(check_rel(&dir, "x.pdf", &config), Verdict::Skip);
    }

    #[test]
    fn test_backup_files_skipped() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        assert_eq!(check_rel(&dir, "main.c~", &config), Verdict::Skip);
    }

    #[test]
    fn test_source_file_kept() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        assert_eq!(check_rel(&dir, "main.c", &config), Verdict::Keep);
    }

    #[test]
    fn test_dotfile_at_root_skipped() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        assert_eq!(check_rel(&dir, ".gitignore", &config), Verdict::Skip);
    }

    #[test]
    fn test_nested_dot_directory_not_descended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub/.git");
        fs::create_dir_all(&path).unwrap();
        let meta = fs::symlink_metadata(&path).unwrap();
        assert_eq!(
            check(&path, "sub/.git", &meta, &Config::default()),
            Verdict::SkipDir
        );
    }

    #[test]
    fn test_versioned_shared_object_skipped() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        assert_eq!(check_rel(&dir, "libfoo.so.1.2", &config), Verdict::Skip);
    }

    #[test]
    fn test_boring_basenames_skipped() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        assert_eq!(check_rel(&dir, "README", &config), Verdict::Skip);
        assert_eq!(check_rel(&dir, "ChangeLog", &config), Verdict::Skip);
        assert_eq!(check_rel(&dir, "configure", &config), Verdict::Skip);
        assert_eq!(check_rel(&dir, "y.tab.c", &config), Verdict::Skip);
    }

    #[test]
    fn test_exclusion_regex() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            exclude: Some(regex::Regex::new("third_party").unwrap()),
            ..Config::default()
        };
        fs::create_dir(dir.path().join("third_party")).unwrap();
        assert_eq!(check_rel(&dir, "third_party/x.c", &config), Verdict::Skip);
        assert_eq!(check_rel(&dir, "first_party.c", &config), Verdict::Keep);
    }

    #[test]
    fn test_generated_makefile_skipped() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        fs::write(dir.path().join("Makefile.in"), "all:\n").unwrap();
        assert_eq!(check_rel(&dir, "Makefile", &config), Verdict::Skip);
    }

    #[test]
    fn test_plain_makefile_kept() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        assert_eq!(check_rel(&dir, "Makefile", &config), Verdict::Keep);
    }

    #[test]
    fn test_directory_with_boring_name_still_descends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo");
        fs::create_dir(&path).unwrap();
        let meta = fs::symlink_metadata(&path).unwrap();
        // Basename rules reject counting, and for a file that means skip;
        // the walker interprets Skip on a directory as descend-only.
        assert_eq!(check(&path, "todo", &meta, &Config::default()), Verdict::Skip);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_skipped() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("real.c");
        fs::write(&target, "int x;\n").unwrap();
        let link = dir.path().join("link.c");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        let meta = fs::symlink_metadata(&link).unwrap();
        assert_eq!(check(&link, "link.c", &meta, &Config::default()), Verdict::Skip);
    }
}
