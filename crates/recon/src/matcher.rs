use chrono::NaiveDate;

use crate::model::{ComparisonResult, MonthDifference, PeriodEntry};

/// Sum a period's rows the way the comparison path does: straight
/// addition, no filtering. A row without a numeric value poisons the sum
/// with NaN; loaders must hand this path fully numeric rows.
fn sum_rows(entry: &PeriodEntry) -> f64 {
    entry.rows.iter().map(|row| row.value.unwrap_or(f64::NAN)).sum()
}

/// Align `test` against `compared` by period key and classify each pair.
///
/// Pairs are visited in `test` order; the first `compared` entry with the
/// same key wins, later duplicates are ignored. A period missing from
/// `compared`, or dated strictly before `floor`, is skipped entirely.
///
/// Classification per aligned pair:
/// - sums exactly equal → counted as a match;
/// - |test − compared| ≥ `tolerance` → recorded in
///   `months_with_differences`;
/// - anything in between → counted in the denominator only, reported
///   nowhere.
///
/// Accuracy is matched / aligned × 100, or 0 when nothing aligned.
pub fn compare_series(
    test: &[PeriodEntry],
    compared: &[PeriodEntry],
    floor: NaiveDate,
    tolerance: f64,
) -> ComparisonResult {
    let mut match_count = 0usize;
    let mut total_count = 0usize;
    let mut total_difference = 0.0f64;
    let mut months_with_differences = Vec::new();

    for test_entry in test {
        let Some(compared_entry) = compared.iter().find(|e| e.period == test_entry.period)
        else {
            continue;
        };
        if test_entry.period.first_day() < floor {
            continue;
        }

        let test_sum = sum_rows(test_entry);
        let compared_sum = sum_rows(compared_entry);
        let difference = test_sum - compared_sum;

        if test_sum == compared_sum {
            match_count += 1;
        } else if difference.abs() >= tolerance {
            months_with_differences.push(MonthDifference {
                month: test_entry.period,
                difference,
                test_value: test_sum,
                compared_value: compared_sum,
            });
        }

        total_count += 1;
        total_difference += difference;
    }

    let accuracy = if total_count > 0 {
        (match_count as f64 / total_count as f64) * 100.0
    } else {
        0.0
    };

    ComparisonResult {
        accuracy,
        total_difference,
        months_with_differences,
    }
}
