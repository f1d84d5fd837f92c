//! Derives the human-readable deterioration explanation and the numeric
//! default-month indicators from a DPD history. Pure functions over the
//! token timeline; no pattern matching happens here.

use crate::extract::normalize::{is_clean_token, round1};
use crate::report::DpdHistory;

/// Sentinel dirty codes that flag deterioration even without a visible
/// clean-to-dirty transition in the sequence.
const KNOWN_DIRTY_CODES: [&str; 3] = ["015", "032", "046"];

/// Walk years in ascending order and apply three mutually exclusive rules in
/// priority order, returning on the first year where any rule fires:
///
/// 1. completely dirty — the year has tokens and no clean sentinel at all;
/// 2. clean↔dirty transition — the first adjacent pair whose classification
///    flips, naming the direction and both tokens;
/// 3. explicit dirty code — one of the known-dirty sentinels appears.
///
/// An empty result means the account is not deteriorating.
pub fn deterioration_reasoning(history: &DpdHistory) -> String {
    for (year, tokens) in history {
        if tokens.is_empty() {
            continue;
        }
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_uppercase()).collect();

        if !tokens.iter().any(|t| is_clean_token(t)) {
            return format!("COMPLETELY_DIRTY: {} dirty tokens in {year}", tokens.len());
        }

        for pair in tokens.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            let clean_prev = is_clean_token(prev);
            let clean_curr = is_clean_token(curr);
            if clean_prev != clean_curr {
                let direction = if clean_curr {
                    "DIRTY_TO_CLEAN"
                } else {
                    "CLEAN_TO_DIRTY"
                };
                return format!("{direction}: '{prev}'→'{curr}' in {year}");
            }
        }

        for code in KNOWN_DIRTY_CODES {
            if tokens.iter().any(|t| t == code) {
                return format!("EXPLICIT_DIRTY: '{code}' in {year}");
            }
        }
    }
    String::new()
}

/// 1-based position of the first non-clean token in a year's sequence, or
/// `None` when the year is entirely clean or empty.
pub fn default_month_for_year(tokens: &[String]) -> Option<usize> {
    tokens
        .iter()
        .position(|t| !is_clean_token(t))
        .map(|i| i + 1)
}

/// Account-level default month: mean of the per-year default months across
/// all years present.
pub fn default_month_number(history: &DpdHistory) -> Option<f64> {
    let months: Vec<usize> = history
        .values()
        .filter_map(|tokens| default_month_for_year(tokens))
        .collect();
    if months.is_empty() {
        return None;
    }
    Some(round1(months.iter().sum::<usize>() as f64 / months.len() as f64))
}

/// Document-level default-month average with a two-tier policy: when at
/// least 5 accounts have a value for the current calendar year, average only
/// those; otherwise fall back to current-year plus previous-year values
/// combined. Null when neither tier yields anything.
pub fn final_default_month_average(histories: &[&DpdHistory], current_year: i32) -> Option<f64> {
    let current = current_year.to_string();
    let previous = (current_year - 1).to_string();

    let mut current_values = Vec::new();
    let mut fallback_values = Vec::new();
    for history in histories {
        if let Some(m) = history.get(&current).and_then(|t| default_month_for_year(t)) {
            current_values.push(m);
        }
        if let Some(m) = history.get(&previous).and_then(|t| default_month_for_year(t)) {
            fallback_values.push(m);
        }
    }

    if current_values.len() >= 5 {
        let sum: usize = current_values.iter().sum();
        return Some(round1(sum as f64 / current_values.len() as f64));
    }

    current_values.extend(fallback_values);
    if current_values.is_empty() {
        return None;
    }
    let sum: usize = current_values.iter().sum();
    Some(round1(sum as f64 / current_values.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(entries: &[(&str, &[&str])]) -> DpdHistory {
        entries
            .iter()
            .map(|(year, tokens)| {
                (
                    year.to_string(),
                    tokens.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn completely_dirty_year() {
        let h = history(&[("2023", &["015", "032"])]);
        assert_eq!(
            deterioration_reasoning(&h),
            "COMPLETELY_DIRTY: 2 dirty tokens in 2023"
        );
    }

    #[test]
    fn clean_to_dirty_transition() {
        let h = history(&[("2023", &["000", "015"])]);
        assert_eq!(
            deterioration_reasoning(&h),
            "CLEAN_TO_DIRTY: '000'→'015' in 2023"
        );
    }

    #[test]
    fn dirty_to_clean_transition() {
        let h = history(&[("2023", &["090", "STD"])]);
        // Rule 1 needs zero clean tokens, so this falls through to rule 2.
        assert_eq!(
            deterioration_reasoning(&h),
            "DIRTY_TO_CLEAN: '090'→'STD' in 2023"
        );
    }

    #[test]
    fn earlier_year_takes_priority() {
        let h = history(&[("2021", &["001", "002"]), ("2023", &["000", "015"])]);
        assert_eq!(
            deterioration_reasoning(&h),
            "COMPLETELY_DIRTY: 2 dirty tokens in 2021"
        );
    }

    #[test]
    fn clean_year_is_skipped_not_terminal() {
        // 2022 triggers nothing; the walk continues into 2023 where a
        // single dirty token satisfies rule 1.
        let h = history(&[("2022", &["000"]), ("2023", &["015"])]);
        assert_eq!(
            deterioration_reasoning(&h),
            "COMPLETELY_DIRTY: 1 dirty tokens in 2023"
        );
    }

    #[test]
    fn all_clean_history_has_no_reasoning() {
        let h = history(&[("2023", &["000", "XXX", "STD", "-"])]);
        assert_eq!(deterioration_reasoning(&h), "");
        assert_eq!(deterioration_reasoning(&DpdHistory::new()), "");
    }

    #[test]
    fn default_month_is_first_non_clean_position() {
        let h = history(&[("2023", &["000", "000", "015", "XXX"])]);
        assert_eq!(default_month_for_year(&h["2023"]), Some(3));
        assert_eq!(default_month_number(&h), Some(3.0));
    }

    #[test]
    fn default_month_none_when_clean() {
        let h = history(&[("2023", &["000", "XXX"])]);
        assert_eq!(default_month_number(&h), None);
    }

    #[test]
    fn default_month_averages_across_years() {
        let h = history(&[("2022", &["015"]), ("2023", &["000", "000", "032"])]);
        // Years default at month 1 and month 3.
        assert_eq!(default_month_number(&h), Some(2.0));
    }

    #[test]
    fn final_average_uses_current_year_tier_at_five_accounts() {
        // Six accounts with current-year defaults at months 1..=6, plus
        // previous-year noise that the first tier must ignore.
        let histories: Vec<DpdHistory> = (1..=6)
            .map(|month| {
                let mut tokens = vec!["000"; month - 1];
                tokens.push("090");
                history(&[("2025", tokens.as_slice()), ("2024", &["090"])])
            })
            .collect();
        let refs: Vec<&DpdHistory> = histories.iter().collect();
        assert_eq!(final_default_month_average(&refs, 2025), Some(3.5));
    }

    #[test]
    fn final_average_falls_back_below_five_accounts() {
        // Four current-year values (months 1,2,3,4) is under the tier
        // threshold, so the previous year's single value (month 6) joins in.
        let mut histories: Vec<DpdHistory> = (1..=4)
            .map(|month| {
                let mut tokens = vec!["000"; month - 1];
                tokens.push("090");
                history(&[("2025", tokens.as_slice())])
            })
            .collect();
        histories.push(history(&[(
            "2024",
            &["000", "000", "000", "000", "000", "090"],
        )]));
        let refs: Vec<&DpdHistory> = histories.iter().collect();
        // (1+2+3+4+6)/5 = 3.2
        assert_eq!(final_default_month_average(&refs, 2025), Some(3.2));
    }

    #[test]
    fn final_average_none_without_any_values() {
        let h = history(&[("2020", &["090"])]);
        let refs = vec![&h];
        assert_eq!(final_default_month_average(&refs, 2025), None);
    }
}
