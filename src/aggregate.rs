// src/aggregate.rs
//! 結果パイプラインの集計
//!
//! 単一のコンシューマが SourceStat を読み、言語別バケットに合算する。
//! EOF 後に c-header の振り替えを行い、SLOC 降順に並べる。
//! `-i` / `-u` ではバケットを作らず、その場で 1 行ずつ出力する。

use crossbeam_channel::Receiver;
use hashbrown::HashMap;
use serde::Serialize;

use crate::catalog::C_HEADER_PRIORITY;
use crate::classify::SourceStat;
use crate::config::Config;

/// 言語別の集計レコード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountRecord {
    pub language: &'static str,
    pub sloc: u64,
    pub lloc: u64,
    pub filecount: u64,
}

impl CountRecord {
    fn absorb(&mut self, stat: &SourceStat) {
        self.sloc += stat.sloc;
        self.lloc += stat.lloc;
        self.filecount += 1;
    }
}

/// 集計結果。`rows` は SLOC 降順で、2 ファイル以上数えたときは
/// 先頭に `all` 行を含む。
#[derive(Debug, Default)]
pub struct Summary {
    pub rows: Vec<CountRecord>,
    pub totals: CountRecord,
}

/// パイプラインを消費する
///
/// 集計モードでは `Some(Summary)` を返す。`-i` / `-u` では 1 件ごとに
/// 出力して `None` を返す。
pub fn collect(rx: &Receiver<SourceStat>, config: &Config) -> Option<Summary> {
    let mut counts: HashMap<&'static str, CountRecord> = HashMap::new();
    let mut totals = CountRecord {
        language: "all",
        ..CountRecord::default()
    };

    for stat in rx.iter() {
        if config.debug > 0 {
            eprintln!(
                "from pipeline: {} {} {}",
                stat.path.display(),
                stat.sloc,
                stat.language
            );
        }

        if config.individual {
            if !config.unclassified && stat.sloc > 0 {
                println!(
                    "{} {} {} {}",
                    stat.path.display(),
                    stat.language,
                    stat.sloc,
                    stat.lloc
                );
            } else if config.unclassified && stat.sloc == 0 && !stat.rejected {
                // Not a recognized source type, nor anything we know
                // to discard.
                println!("{}", stat.path.display());
            }
            continue;
        }

        if stat.sloc > 0 {
            counts
                .entry(stat.language)
                .or_insert_with(|| CountRecord {
                    language: stat.language,
                    ..CountRecord::default()
                })
                .absorb(&stat);
            totals.absorb(&stat);
        }
    }

    if config.individual {
        return None;
    }

    reassign_c_headers(&mut counts);

    let mut rows: Vec<CountRecord> = Vec::new();
    if totals.filecount > 1 {
        rows.push(totals);
    }
    rows.extend(counts.into_values());
    rows.sort_by(|a, b| b.sloc.cmp(&a.sloc).then(a.language.cmp(b.language)));

    Some(Summary { rows, totals })
}

/// c-header バケットを C 系の支配的な言語へ振り替える
///
/// ツリー内にどの C 系言語があるかに依存するので、ファイル単位ではなく
/// 集計後にしかできない。どれも無ければ c-header のまま残す。
fn reassign_c_headers(counts: &mut HashMap<&'static str, CountRecord>) {
    if counts.get("c-header").is_none_or(|r| r.sloc == 0) {
        return;
    }
    for &target in C_HEADER_PRIORITY {
        if counts.get(target).is_some_and(|r| r.sloc > 0) {
            let header = counts.remove("c-header").unwrap();
            let record = counts.get_mut(target).unwrap();
            record.sloc += header.sloc;
            record.lloc += header.lloc;
            record.filecount += header.filecount;
            return;
        }
    }
}
