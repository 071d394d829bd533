// src/counters/perl.rs
//! Perl のカウンタ
//!
//! Perl 固有の対応:
//! - `#` 行コメント
//! - POD: 行頭の `=word` ～ `=cut`
//! - ヒアドキュメント: `<<TAG`, `<<'TAG'`, `<<"TAG"` — 中身は
//!   POD の形をしていてもコードとして数える
//! - `__END__` 以降は読まない

use std::path::Path;
use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::context::CountContext;
use crate::counters::strutil;

fn pod_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^=[a-zA-Z]").unwrap())
}

/// Perl ソースの SLOC/LLOC を数える
pub fn count_perl(ctx: &mut CountContext, path: &Path) -> (u64, u64) {
    let mut sloc: u64 = 0;
    let mut lloc: u64 = 0;
    let mut heredoc: Vec<u8> = Vec::new();
    let mut in_pod = false;

    if !ctx.open(path) {
        return (0, 0);
    }

    while ctx.read_line() {
        if let Some(i) = strutil::find(&ctx.line, b"#") {
            ctx.line.truncate(i);
        }
        ctx.line = strutil::trim(&ctx.line).to_vec();

        if !heredoc.is_empty() && ctx.line.starts_with(&heredoc) {
            // Finished the here-document; the terminator line counts.
            heredoc.clear();
        } else if let Some(i) = strutil::find(&ctx.line, b"<<") {
            // Beginning of a here-document.
            heredoc = strutil::trim_set(&ctx.line[i..], b"< \t\"';,").to_vec();
        } else if heredoc.is_empty() && ctx.line.starts_with(b"=cut") {
            if !in_pod {
                eprintln!(
                    "\"{}\", {}: cut without pod start",
                    path.display(),
                    ctx.line_number
                );
            }
            in_pod = false;
            // Don't count the cut command.
            continue;
        } else if heredoc.is_empty() && ctx.matchline(pod_header()) {
            // Starting or continuing a POD; multiple commands are fine.
            // Note that "=" followed by space is NOT a POD.
            in_pod = true;
        } else if ctx.line.starts_with(b"__END__") {
            break;
        }

        if !in_pod && !ctx.line.is_empty() {
            sloc += 1;
            if ctx.line.contains(&b';') {
                lloc += 1;
            }
        }
    }

    (sloc, lloc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn count(content: &str) -> (u64, u64) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let mut ctx = CountContext::new();
        count_perl(&mut ctx, file.path())
    }

    #[test]
    fn test_pod_block_not_counted() {
        assert_eq!(count("print 1;\n=pod\ndoc\n=cut\nprint 2;\n"), (2, 2));
    }

    #[test]
    fn test_comment_lines() {
        assert_eq!(count("# note\nmy $x = 1;  # trailing\n"), (1, 1));
    }

    #[test]
    fn test_heredoc_body_counts_as_code() {
        let src = "print <<EOF;\n=pod\nlooks like pod\nEOF\nprint 2;\n";
        assert_eq!(count(src), (5, 2));
    }

    #[test]
    fn test_quoted_heredoc_tag() {
        let src = "print <<'END';\ntext\nEND\n";
        assert_eq!(count(src), (3, 1));
    }

    #[test]
    fn test_end_marker_stops_counting() {
        assert_eq!(count("print 1;\n__END__\nnot code\n"), (1, 1));
    }

    #[test]
    fn test_pod_header_variants() {
        assert_eq!(count("=head1 NAME\ntext\n=cut\nuse strict;\n"), (1, 1));
    }

    #[test]
    fn test_statement_without_semicolon() {
        assert_eq!(count("}\n"), (1, 0));
    }
}
