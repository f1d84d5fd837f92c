//! Assembles the unified output record from per-format intermediates:
//! yearly/account DPD averages, document aggregates, latest-month enquiry
//! filtering, and the shared identity snapshot.

use std::collections::BTreeSet;

use chrono::{Datelike, Local, Utc};

use crate::extract::normalize::{dpd_to_number, is_clean_token, round1};
use crate::extract::patterns::{
    first_match, CKYC_RE, EMAIL_RE, MOBILE_RE, NAME_RE, PAN_RE, REPORT_DATE_RE,
};
use crate::extract::reasoning;
use crate::report::{
    Account, AccountSection, BasicInfo, DpdHistory, DpdSummary, Enquiry, EnquirySection, Metadata,
    OverdueSummary, UnifiedReport, YearlyAverage,
};

/// Per-format intermediate account shape. Segmenters fill in whatever their
/// layout yields; conversion to the unified `Account` derives the rest.
#[derive(Debug, Clone)]
pub struct RawAccount {
    pub member_name: Option<String>,
    pub account_type: Option<String>,
    pub status: Option<String>,
    pub date_opened: Option<String>,
    pub date_closed: Option<String>,
    pub date_reported: Option<String>,
    pub sanctioned_amount: String,
    pub current_balance: String,
    pub overdue_amount: Option<String>,
    pub dpd_history: DpdHistory,
    pub deterioration_reasoning: String,
}

impl Default for RawAccount {
    fn default() -> Self {
        Self {
            member_name: None,
            account_type: None,
            status: None,
            date_opened: None,
            date_closed: None,
            date_reported: None,
            sanctioned_amount: "0".to_string(),
            current_balance: "0".to_string(),
            overdue_amount: None,
            dpd_history: DpdHistory::new(),
            deterioration_reasoning: String::new(),
        }
    }
}

/// Yearly DPD average over the numeric (non-clean) tokens only; clean
/// sentinels are excluded from the mean, not counted as zero.
fn yearly_averages(history: &DpdHistory) -> Vec<YearlyAverage> {
    history
        .iter()
        .filter_map(|(year, tokens)| {
            let numeric: Vec<i64> = tokens
                .iter()
                .filter(|t| !is_clean_token(t))
                .map(|t| dpd_to_number(t))
                .collect();
            if numeric.is_empty() {
                return None;
            }
            Some(YearlyAverage {
                year: year.clone(),
                average_dpd: round1(numeric.iter().sum::<i64>() as f64 / numeric.len() as f64),
            })
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(round1(values.iter().sum::<f64>() / values.len() as f64))
}

/// Derive the unified account from a segmented intermediate.
pub fn to_account(account_index: usize, raw: RawAccount) -> Account {
    let yearly = yearly_averages(&raw.dpd_history);
    let per_year: Vec<f64> = yearly.iter().map(|y| y.average_dpd).collect();
    let account_dpd_average = mean(&per_year);
    let default_month_number = reasoning::default_month_number(&raw.dpd_history);

    Account {
        account_index,
        member_name: raw.member_name,
        account_type: raw.account_type,
        status: raw.status,
        date_opened: raw.date_opened,
        date_closed: raw.date_closed,
        date_reported: raw.date_reported,
        sanctioned_amount: raw.sanctioned_amount,
        current_balance: raw.current_balance,
        overdue_amount: raw.overdue_amount,
        dpd_history: raw.dpd_history,
        deterioration_reasoning: raw.deterioration_reasoning,
        default_month_number,
        dpd_summary: DpdSummary {
            yearly_averages: yearly,
            account_dpd_average,
        },
    }
}

/// Keep only the enquiries belonging to the chronologically latest
/// year-month present. Deterministic and order-independent; empty input or
/// no parsed dates yield an empty list.
pub fn filter_latest_month(enquiries: Vec<Enquiry>) -> Vec<Enquiry> {
    let latest = enquiries
        .iter()
        .filter_map(|e| e.parsed_date.get(..7))
        .max()
        .map(str::to_string);
    match latest {
        Some(month) => enquiries
            .into_iter()
            .filter(|e| e.parsed_date.starts_with(&month))
            .collect(),
        None => Vec::new(),
    }
}

/// Identity fields shared by both formats. The score is layout-dependent and
/// left for the segmenter to fill in.
pub fn basic_info_from_text(text: &str) -> BasicInfo {
    let mobiles: BTreeSet<String> = MOBILE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    let emails: BTreeSet<String> = EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    BasicInfo {
        name: first_match(&NAME_RE, text),
        pan_card: first_match(&PAN_RE, text),
        ckyc: first_match(&CKYC_RE, text),
        report_date: first_match(&REPORT_DATE_RE, text),
        score: None,
        mobile_numbers: mobiles.into_iter().collect(),
        emails: emails.into_iter().collect(),
    }
}

/// Merge per-document results into the unified schema and compute the
/// document-level aggregates.
pub fn build_report(
    basic_info: BasicInfo,
    enquiries: Vec<Enquiry>,
    accounts: Vec<Account>,
    overdue_summary: OverdueSummary,
    format_type: &str,
) -> UnifiedReport {
    let averages: Vec<f64> = accounts
        .iter()
        .filter_map(|a| a.dpd_summary.account_dpd_average)
        .collect();
    let final_dpd_average = mean(&averages);

    let histories: Vec<&DpdHistory> = accounts.iter().map(|a| &a.dpd_history).collect();
    let final_default_month_average =
        reasoning::final_default_month_average(&histories, Local::now().year());

    UnifiedReport {
        basic_info,
        enquiries: EnquirySection {
            total_count: enquiries.len(),
            latest_month_enquiries: enquiries,
        },
        accounts: AccountSection {
            total_accounts_extracted: accounts.len(),
            final_dpd_average,
            final_default_month_average,
            accounts_list: accounts,
        },
        overdue_summary,
        metadata: Metadata {
            format_type: format_type.to_string(),
            extraction_timestamp: Utc::now().to_rfc3339(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enquiry(date: &str, parsed: &str) -> Enquiry {
        Enquiry {
            date: date.to_string(),
            parsed_date: parsed.to_string(),
            member: None,
            purpose: None,
            amount: None,
        }
    }

    #[test]
    fn latest_month_filter_keeps_only_newest_month() {
        let all = vec![
            enquiry("05-10-2025", "2025-10-05"),
            enquiry("15-12-2025", "2025-12-15"),
            enquiry("20-11-2025", "2025-11-20"),
            enquiry("01-12-2025", "2025-12-01"),
        ];
        let kept = filter_latest_month(all);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|e| e.parsed_date.starts_with("2025-12")));
    }

    #[test]
    fn latest_month_filter_is_order_independent() {
        let forward = vec![
            enquiry("01-11-2025", "2025-11-01"),
            enquiry("01-12-2025", "2025-12-01"),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        let a = filter_latest_month(forward);
        let b = filter_latest_month(reversed);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].parsed_date, b[0].parsed_date);
    }

    #[test]
    fn latest_month_filter_empty_input() {
        assert!(filter_latest_month(Vec::new()).is_empty());
    }

    #[test]
    fn yearly_average_excludes_clean_tokens() {
        let mut raw = RawAccount::default();
        raw.dpd_history.insert(
            "2023".to_string(),
            ["000", "015", "XXX", "030"].map(String::from).to_vec(),
        );
        let account = to_account(1, raw);
        let yearly = &account.dpd_summary.yearly_averages;
        assert_eq!(yearly.len(), 1);
        // (15 + 30) / 2, clean tokens excluded rather than counted as zero.
        assert_eq!(yearly[0].average_dpd, 22.5);
        assert_eq!(account.dpd_summary.account_dpd_average, Some(22.5));
    }

    #[test]
    fn account_average_is_mean_of_yearly_averages() {
        let mut raw = RawAccount::default();
        raw.dpd_history
            .insert("2022".to_string(), vec!["010".to_string()]);
        raw.dpd_history
            .insert("2023".to_string(), vec!["030".to_string()]);
        let account = to_account(1, raw);
        assert_eq!(account.dpd_summary.account_dpd_average, Some(20.0));
    }

    #[test]
    fn clean_only_history_has_no_averages() {
        let mut raw = RawAccount::default();
        raw.dpd_history
            .insert("2023".to_string(), vec!["000".to_string()]);
        let account = to_account(1, raw);
        assert!(account.dpd_summary.yearly_averages.is_empty());
        assert_eq!(account.dpd_summary.account_dpd_average, None);
        assert_eq!(account.default_month_number, None);
    }

    #[test]
    fn amount_defaults_are_zero_strings() {
        let raw = RawAccount::default();
        assert_eq!(raw.sanctioned_amount, "0");
        assert_eq!(raw.current_balance, "0");
        assert_eq!(raw.overdue_amount, None);
    }

    #[test]
    fn basic_info_dedupes_and_normalizes_contacts() {
        let text = "CONSUMER NAME: RAVI KUMAR\nPAN: ABCDE1234F\n9876543210 9876543210\nRavi@Example.COM\nravi@example.com";
        let info = basic_info_from_text(text);
        assert_eq!(info.name.as_deref(), Some("RAVI KUMAR"));
        assert_eq!(info.mobile_numbers, vec!["9876543210".to_string()]);
        assert_eq!(info.emails, vec!["ravi@example.com".to_string()]);
    }

    #[test]
    fn report_aggregates_over_accounts_with_averages() {
        let mut a = RawAccount::default();
        a.dpd_history
            .insert("2023".to_string(), vec!["010".to_string()]);
        let mut b = RawAccount::default();
        b.dpd_history
            .insert("2023".to_string(), vec!["030".to_string()]);
        // No averages for this one; it must not drag the mean down.
        let c = RawAccount::default();

        let accounts = vec![to_account(1, a), to_account(2, b), to_account(3, c)];
        let report = build_report(
            BasicInfo::default(),
            Vec::new(),
            accounts,
            OverdueSummary::default(),
            "HTML",
        );
        assert_eq!(report.accounts.final_dpd_average, Some(20.0));
        assert_eq!(report.accounts.total_accounts_extracted, 3);
        assert_eq!(report.metadata.format_type, "HTML");
    }
}
