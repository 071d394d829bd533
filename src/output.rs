// src/output.rs
//! 集計結果・言語一覧・COCOMO 見積もりの出力

use crate::aggregate::Summary;
use crate::catalog;

/// 集計テーブルを出力する
///
/// `json` なら 1 言語 1 行の JSON、さもなくば固定幅のテーブル。
pub fn print_summary(summary: &Summary, json: bool) {
    let total_sloc = summary.totals.sloc;
    for row in &summary.rows {
        if json {
            // CountRecord serializes in report order:
            // language, sloc, lloc, filecount.
            match serde_json::to_string(row) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("loccount: JSON error: {e}"),
            }
        } else {
            let percent = if total_sloc == 0 {
                0.0
            } else {
                row.sloc as f64 * 100.0 / total_sloc as f64
            };
            println!(
                "{:<12} SLOC={:<7} ({:2.2}%)\tLLOC={:<7} in {} files",
                row.language, row.sloc, percent, row.lloc, row.filecount
            );
        }
    }
}

/// `-s` / `-l` の言語一覧を出力する
pub fn print_languages(lloc_only: bool, one_per_line: bool) {
    let names = catalog::list_languages(lloc_only);
    if one_per_line {
        for name in names {
            println!("{name}");
        }
    } else {
        println!("{}: [{}]", names.len(), names.join(" "));
    }
}

/// `-e` の言語別パターン一覧を出力する
pub fn print_extensions() {
    for (name, patterns) in catalog::extensions_by_language() {
        println!("{name}: [{}]", patterns.join(" "));
    }
}

// COCOMO constants. See https://en.wikipedia.org/wiki/COCOMO
const SCHED_MULT: f64 = 2.5;
const SCHED_EXP: f64 = 0.38;
const SALARY: f64 = 790_000.0;
const OVERHEAD: f64 = 2.40;

/// COCOMO I: SLOC から人月を見積もる
fn cocomo81(sloc: u64) -> f64 {
    const TIME_MULT: f64 = 2.4;
    const TIME_EXP: f64 = 1.05;
    println!();
    println!("Total Physical Source Lines of Code (SLOC)                = {sloc}");
    println!(" (COCOMO I model, Person-Months = {TIME_MULT:2.2} * (KSLOC**{TIME_EXP:2.2}))");
    TIME_MULT * (sloc as f64 / 1000.0).powf(TIME_EXP)
}

/// COCOMO II: LLOC から人月を見積もる
fn cocomo2000(lloc: u64) -> f64 {
    const TIME_MULT: f64 = 3.2;
    const TIME_EXP: f64 = 1.05;
    println!();
    println!("Total Logical Source Lines of Code (LLOC)                 = {lloc}");
    println!(" (COCOMO II model, Person-Months = {TIME_MULT:2.2} * (KLOC**{TIME_EXP:2.2}))");
    TIME_MULT * (lloc as f64 / 1000.0).powf(TIME_EXP)
}

fn report_curve(loc: u64, curve: fn(u64) -> f64) {
    let person_months = curve(loc);
    println!(
        "Development Effort Estimate, Person-Years (Person-Months) = {:2.2} ({:2.2})",
        person_months / 12.0,
        person_months
    );
    let sched_months = SCHED_MULT * person_months.powf(SCHED_EXP);
    println!(
        "Schedule Estimate, Years (Months)                         = {:2.2} ({:2.2})",
        sched_months / 12.0,
        sched_months
    );
    println!(" (COCOMO model, Months = {SCHED_MULT:2.2} * (person-months**{SCHED_EXP:2.2}))");
    println!(
        "Estimated Average Number of Developers (Effort/Schedule)  = {:2.2}",
        person_months / sched_months
    );
    println!(
        "Total Estimated Cost to Develop                           = ${}",
        (SALARY * (person_months / 12.0) * OVERHEAD) as i64
    );
    println!(" (average salary = ${SALARY:.0}/year, overhead = {OVERHEAD:2.2}).");
}

/// `-c`: COCOMO I/II の見積もりを出力する
pub fn report_cocomo(summary: &Summary) {
    report_curve(summary.totals.sloc, cocomo81);
    report_curve(summary.totals.lloc, cocomo2000);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CountRecord;

    #[test]
    fn test_json_record_shape() {
        let record = CountRecord {
            language: "c",
            sloc: 100,
            lloc: 40,
            filecount: 3,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            "{\"language\":\"c\",\"sloc\":100,\"lloc\":40,\"filecount\":3}"
        );
    }

    #[test]
    fn test_cocomo_curves() {
        // 10 KSLOC under COCOMO I: 2.4 * 10^1.05 ≈ 26.9 person-months.
        let pm = 2.4_f64 * 10.0_f64.powf(1.05);
        assert!((pm - 26.9).abs() < 0.1);
        // Schedule: 2.5 * pm^0.38 ≈ 8.7 months.
        let sched = 2.5 * pm.powf(0.38);
        assert!((sched - 8.7).abs() < 0.1);
    }

    #[test]
    fn test_summary_printing_does_not_panic_on_empty() {
        print_summary(&Summary::default(), false);
        print_summary(&Summary::default(), true);
    }
}
