// src/walker.rs
//! 並行ディレクトリウォーカー
//!
//! 「展開待ちディレクトリ」の有界キューを固定数 (16) のワーカーが
//! 消費する。ワーカーはファイルをフィルタ + 分類して結果パイプラインへ
//! 流し、ディレクトリは列挙して子ディレクトリをキューへ非ブロッキングで
//! 積む。キューが満杯ならブロックせず、その場で自分が処理する。
//!
//! 未処理アイテム数は wait-group で追跡し、0 になったらキューを閉じて
//! 終了する。致命的エラーは最初の 1 件をラッチし、以後の処理を
//! 打ち切る。シンボリックリンクは辿らない。

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex};
use std::thread;

use crossbeam_channel::{Sender, TrySendError, bounded};

use crate::classify::{SourceStat, classify};
use crate::config::Config;
use crate::error::AppError;
use crate::filter::{self, Verdict};

/// ワーカースレッド数。CPU 数ではなくファイル I/O の重なりを狙った値。
pub const WALKERS: usize = 16;

const QUEUE_DEPTH: usize = 1024;

struct WorkItem {
    path: PathBuf,
    meta: Metadata,
}

/// Go の sync.WaitGroup 相当
struct WaitGroup {
    count: Mutex<usize>,
    zero: Condvar,
}

impl WaitGroup {
    fn new() -> Self {
        Self {
            count: Mutex::new(0),
            zero: Condvar::new(),
        }
    }

    fn add(&self, n: usize) {
        *self.count.lock().unwrap() += n;
    }

    fn done(&self) {
        let mut count = self.count.lock().unwrap();
        *count -= 1;
        if *count == 0 {
            self.zero.notify_all();
        }
    }

    fn wait(&self) {
        let mut count = self.count.lock().unwrap();
        while *count > 0 {
            count = self.zero.wait(count).unwrap();
        }
    }
}

struct WalkState<'a> {
    work: Mutex<Option<Sender<WorkItem>>>,
    active: WaitGroup,
    first_error: Mutex<Option<AppError>>,
    root: &'a Path,
    config: &'a Config,
    out: &'a Sender<SourceStat>,
}

impl WalkState<'_> {
    fn terminated(&self) -> bool {
        self.first_error.lock().unwrap().is_some()
    }

    fn latch_error(&self, err: AppError) {
        let mut first = self.first_error.lock().unwrap();
        if first.is_none() {
            *first = Some(err);
        }
    }

    /// キューに積めたら `None`、満杯 (または閉鎖済み) なら返品
    fn try_push(&self, item: WorkItem) -> Option<WorkItem> {
        let work = self.work.lock().unwrap();
        let Some(tx) = work.as_ref() else {
            return Some(item);
        };
        match tx.try_send(item) {
            Ok(()) => None,
            Err(TrySendError::Full(item) | TrySendError::Disconnected(item)) => Some(item),
        }
    }
}

/// `root` 以下を並行に走査し、分類結果を `out` に流す
///
/// # Errors
/// ルートを stat できない場合と、走査中の最初の致命的 I/O エラーを
/// 返す。エラー時も、それまでに流れた結果は有効。
pub fn walk(root: &Path, config: &Config, out: &Sender<SourceStat>) -> Result<(), AppError> {
    let meta = fs::symlink_metadata(root)
        .map_err(|e| AppError::Walk(format!("{}: {e}", root.display())))?;

    let (tx, rx) = bounded::<WorkItem>(QUEUE_DEPTH);
    let state = WalkState {
        work: Mutex::new(Some(tx)),
        active: WaitGroup::new(),
        first_error: Mutex::new(None),
        root,
        config,
        out,
    };

    thread::scope(|s| {
        let state = &state;
        for _ in 0..WALKERS {
            let rx = rx.clone();
            s.spawn(move || {
                for item in rx.iter() {
                    visit(state, item);
                    state.active.done();
                }
            });
        }

        state.active.add(1);
        let root_item = WorkItem {
            path: root.to_path_buf(),
            meta,
        };
        if let Some(returned) = state.try_push(root_item) {
            // The queue was empty, so this only happens if it is tiny;
            // expand in place like any other full-queue fallback.
            visit(state, returned);
            state.active.done();
        }

        state.active.wait();
        // Closing the queue lets the workers drain out and exit.
        state.work.lock().unwrap().take();
    });

    match state.first_error.into_inner().unwrap() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn visit(state: &WalkState<'_>, item: WorkItem) {
    if state.terminated() {
        return;
    }

    let rel = relative(state.root, &item.path);
    let verdict = filter::check(&item.path, &rel, &item.meta, state.config);

    if !item.meta.is_dir() {
        if verdict == Verdict::Keep {
            // A dropped send means the consumer is gone; nothing useful
            // to do with the stat then.
            let _ = state.out.send(classify(&item.path));
        }
        return;
    }
    if verdict == Verdict::SkipDir {
        return;
    }

    let names = match read_dir_names(&item.path) {
        Ok(names) => names,
        Err(e) => {
            state.latch_error(AppError::Walk(format!("{}: {e}", item.path.display())));
            return;
        }
    };

    for name in names {
        if state.terminated() {
            return;
        }
        let child = item.path.join(&name);
        let meta = match fs::symlink_metadata(&child) {
            Ok(meta) => meta,
            Err(e) => {
                state.latch_error(AppError::Walk(format!("{}: {e}", child.display())));
                return;
            }
        };
        let child_item = WorkItem { path: child, meta };
        if child_item.meta.is_dir() {
            state.active.add(1);
            if let Some(returned) = state.try_push(child_item) {
                // Queue full: undo the reservation and expand it here
                // instead of blocking.
                state.active.done();
                visit(state, returned);
            }
        } else {
            visit(state, child_item);
        }
    }
}

/// ディレクトリエントリ名のソート済み一覧
fn read_dir_names(dir: &Path) -> std::io::Result<Vec<std::ffi::OsString>> {
    let mut names: Vec<_> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<std::io::Result<_>>()?;
    names.sort_unstable();
    Ok(names)
}

fn relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().into_owned()
}
