// src/cli.rs
//! CLI の組み立て
//!
//! 引数解析 → 一覧系の早期終了 → 走査スレッド + 集計コンシューマ →
//! レポート出力、の順に配線する。

use std::fs;
use std::thread;

use clap::Parser;
use crossbeam_channel::{Sender, bounded};

use crate::aggregate;
use crate::args::Args;
use crate::catalog;
use crate::classify::{SourceStat, classify};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::filter::{self, Verdict};
use crate::output;
use crate::walker::{self, WALKERS};

/// プロセスのエントリポイント
///
/// # Errors
/// 致命的な走査エラーとカタログ検査の失敗で非ゼロ終了になる。
pub fn run_from_cli() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.sloc_languages {
        catalog::self_check()?;
        output::print_languages(false, args.individual);
        return Ok(());
    }
    if args.lloc_languages {
        output::print_languages(true, args.individual);
        return Ok(());
    }
    if args.extensions {
        catalog::self_check()?;
        output::print_extensions();
        return Ok(());
    }

    let config = Config::try_from(args)?;
    run(&config)?;
    Ok(())
}

/// 設定どおりに走査・集計・出力する
///
/// # Errors
/// 最初の致命的 I/O エラーを返す。その場合も部分的な集計は出力済み。
pub fn run(config: &Config) -> Result<()> {
    crate::set_debug(config.debug);

    // In per-file modes the pipeline depth is zero: producers rendezvous
    // with the consumer, which serializes the output. Otherwise the
    // pipeline is as deep as the worker pool.
    let depth = if config.individual { 0 } else { WALKERS };
    let (tx, rx) = bounded::<SourceStat>(depth);

    let (summary, walk_result) = thread::scope(|s| {
        let producer = s.spawn(move || -> Result<()> {
            for root in &config.roots {
                let meta = fs::metadata(root)
                    .map_err(|e| AppError::Walk(format!("{}: {e}", root.display())))?;
                if meta.is_dir() {
                    walker::walk(root, config, &tx)?;
                } else {
                    count_file_root(root, &meta, config, &tx);
                }
            }
            Ok(())
        });
        let summary = aggregate::collect(&rx, config);
        (summary, producer.join().expect("walker thread panicked"))
    });

    if let Some(summary) = &summary {
        output::print_summary(summary, config.json);
        if config.cocomo {
            output::report_cocomo(summary);
        }
    }

    walk_result
}

/// コマンドラインで直接指定された 1 ファイルを処理する
fn count_file_root(
    root: &std::path::Path,
    meta: &fs::Metadata,
    config: &Config,
    tx: &Sender<SourceStat>,
) {
    let rel = root.to_string_lossy();
    let rel = rel.strip_prefix("./").unwrap_or(&rel);
    if filter::check(root, rel, meta, config) == Verdict::Keep {
        let _ = tx.send(classify(root));
    }
}
