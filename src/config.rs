// src/config.rs
//! CLI 引数から実行時設定への変換

use std::path::PathBuf;

use regex::Regex;

use crate::args::Args;
use crate::error::AppError;

/// 実行時設定
#[derive(Debug, Default)]
pub struct Config {
    /// COCOMO 見積もりを出力する
    pub cocomo: bool,
    /// デバッグレベル
    pub debug: u32,
    /// ファイルごとの行を出力する (`-i`、`-u` でも有効)
    pub individual: bool,
    /// 未分類ファイルのパスだけを出力する
    pub unclassified: bool,
    /// 集計を JSON Lines で出力する
    pub json: bool,
    /// パス除外の正規表現
    pub exclude: Option<Regex>,
    /// 走査するルート
    pub roots: Vec<PathBuf>,
}

impl TryFrom<Args> for Config {
    type Error = AppError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let exclude = args.exclude.as_deref().map(Regex::new).transpose()?;
        let roots = if args.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            args.paths
        };
        Ok(Self {
            cocomo: args.cocomo,
            debug: args.debug,
            // Unclassified listing is a variant of individual output.
            individual: args.individual || args.unclassified,
            unclassified: args.unclassified,
            json: args.json,
            exclude,
            roots,
        })
    }
}
