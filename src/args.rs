// src/args.rs
use std::path::PathBuf;

use clap::{Parser, ValueHint};

/// Top-level CLI arguments parsed via clap.
#[derive(Parser, Debug)]
#[command(
    name = "loccount",
    version = crate::VERSION,
    about = "多言語ソースツリーの物理/論理行数 (SLOC/LLOC) 集計ツール",
    after_help = "With no PATH, the current directory is counted."
)]
pub struct Args {
    /// report COCOMO-model estimation
    #[arg(short = 'c')]
    pub cocomo: bool,

    /// set debug level
    #[arg(short = 'd', value_name = "N", default_value_t = 0)]
    pub debug: u32,

    /// list extensions associated with each language and exit
    #[arg(short = 'e')]
    pub extensions: bool,

    /// list counts and types for individual files
    #[arg(short = 'i')]
    pub individual: bool,

    /// dump aggregate statistics as one JSON object per line
    #[arg(short = 'j')]
    pub json: bool,

    /// list languages that yield LLOC and exit
    #[arg(short = 'l')]
    pub lloc_languages: bool,

    /// list languages that yield SLOC and exit
    #[arg(short = 's')]
    pub sloc_languages: bool,

    /// list unclassified files
    #[arg(short = 'u')]
    pub unclassified: bool,

    /// paths and directories to exclude
    #[arg(short = 'x', value_name = "REGEX")]
    pub exclude: Option<String>,

    /// 対象パス
    #[arg(value_name = "PATH", value_hint = ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from(["loccount", "-c", "-j", "src", "lib"]).unwrap();
        assert!(args.cocomo);
        assert!(args.json);
        assert_eq!(args.paths.len(), 2);
    }

    #[test]
    fn test_debug_level_takes_value() {
        let args = Args::try_parse_from(["loccount", "-d", "2", "."]).unwrap();
        assert_eq!(args.debug, 2);
    }

    #[test]
    fn test_exclude_takes_pattern() {
        let args = Args::try_parse_from(["loccount", "-x", "tests?/", "."]).unwrap();
        assert_eq!(args.exclude.as_deref(), Some("tests?/"));
    }

    #[test]
    fn test_listing_flags() {
        let args = Args::try_parse_from(["loccount", "-s"]).unwrap();
        assert!(args.sloc_languages);
        let args = Args::try_parse_from(["loccount", "-l", "-i"]).unwrap();
        assert!(args.lloc_languages);
        assert!(args.individual);
    }
}
