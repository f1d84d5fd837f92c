//! Page-text extraction. The PDF is reduced to plain text up front; the
//! account grids are flat token streams here rather than year-labelled
//! blocks, and only deteriorating accounts are kept on this path.

use std::path::Path;

use crate::extract::dpd;
use crate::extract::normalize::{clean_amount, parse_date};
use crate::extract::patterns::{
    first_match, BLANK_RUN_RE, CURRENT_AMOUNT_RE, DPD_HEADER_RE, ENQUIRY_SECTION_RE,
    OVERDUE_AMOUNT_RE, OVERDUE_COUNT_RE, PDF_ACCOUNT_TYPE_RE, PDF_CURRENT_BALANCE_RE,
    PDF_DATE_CLOSED_RE, PDF_DATE_OPENED_RE, PDF_DATE_REPORTED_RE, PDF_MEMBER_NAME_RE,
    PDF_OVERDUE_RE, PDF_SANCTIONED_RE, PDF_SCORE_RES, SCORE_RE, STRICT_DATE_RE,
};
use crate::extract::reasoning::deterioration_reasoning;
use crate::extract::unified::{self, RawAccount};
use crate::extract::ExtractError;
use crate::report::{Account, Enquiry, OverdueSummary, UnifiedReport};

/// Hard cap on accounts per document; large reports carry hundreds of
/// closed tradelines.
const MAX_ACCOUNTS: usize = 200;
/// Metadata window around a grid header, in lines. The fields sit near the
/// header but on either side of it depending on the layout.
const META_BEFORE: usize = 25;
const META_AFTER: usize = 60;

pub fn extract_from_path(path: &Path) -> Result<UnifiedReport, ExtractError> {
    let text = pdf_extract::extract_text(path).map_err(|source| ExtractError::Pdf {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(extract_from_text(&text))
}

pub fn extract_from_text(raw: &str) -> UnifiedReport {
    let text = BLANK_RUN_RE.replace_all(raw, "\n\n");

    let mut basic_info = unified::basic_info_from_text(&text);
    basic_info.score = layout_score(&text)
        .or_else(|| first_match(&SCORE_RE, &text).and_then(|s| s.parse().ok()));

    let accounts = segment_deteriorating_accounts(&text);
    let enquiries = extract_enquiries(&text);
    let summary = overdue_summary(&text);
    unified::build_report(basic_info, enquiries, accounts, summary, "PDF")
}

/// Try the layout-specific score rules in order; a hit counts only inside
/// the plausible score band.
fn layout_score(text: &str) -> Option<i64> {
    for re in PDF_SCORE_RES.iter() {
        if let Some(value) = first_match(re, text).and_then(|v| v.parse::<i64>().ok()) {
            if (300..=900).contains(&value) {
                return Some(value);
            }
        }
    }
    None
}

/// The banner row that opens the next account's table.
fn is_account_banner(line: &str) -> bool {
    ["ACCOUNT", "DATES", "AMOUNTS", "STATUS"]
        .iter()
        .all(|w| line.contains(w))
}

/// Walk the lines for grid headers. Each header gets a metadata window
/// around it and a token run below it, up to the next account banner or
/// header. The account ordinal counts every header seen, but only accounts
/// with a deterioration verdict are kept.
fn segment_deteriorating_accounts(text: &str) -> Vec<Account> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut accounts = Vec::new();
    let mut account_idx = 1usize;
    let mut i = 0usize;
    while i < lines.len() {
        if !DPD_HEADER_RE.is_match(lines[i]) {
            i += 1;
            continue;
        }
        if account_idx > MAX_ACCOUNTS {
            break;
        }

        let meta_start = i.saturating_sub(META_BEFORE);
        let meta_end = (i + META_AFTER).min(lines.len());
        let meta_block = lines[meta_start..meta_end].join("\n");

        let mut j = i + 1;
        let mut run_parts = vec![lines[i]];
        while j < lines.len() {
            if is_account_banner(lines[j]) || DPD_HEADER_RE.is_match(lines[j]) {
                break;
            }
            run_parts.push(lines[j]);
            j += 1;
        }

        let dpd_history = dpd::history_from_run(&run_parts.join(" "));
        let reasoning = deterioration_reasoning(&dpd_history);
        if !reasoning.is_empty() {
            let raw = RawAccount {
                member_name: first_match(&PDF_MEMBER_NAME_RE, &meta_block),
                account_type: first_match(&PDF_ACCOUNT_TYPE_RE, &meta_block),
                status: None,
                date_opened: first_match(&PDF_DATE_OPENED_RE, &meta_block),
                date_closed: first_match(&PDF_DATE_CLOSED_RE, &meta_block),
                date_reported: first_match(&PDF_DATE_REPORTED_RE, &meta_block),
                sanctioned_amount: first_match(&PDF_SANCTIONED_RE, &meta_block)
                    .map(|v| clean_amount(&v))
                    .unwrap_or_else(|| "0".to_string()),
                current_balance: first_match(&PDF_CURRENT_BALANCE_RE, &meta_block)
                    .map(|v| clean_amount(&v))
                    .unwrap_or_else(|| "0".to_string()),
                overdue_amount: Some(
                    first_match(&PDF_OVERDUE_RE, &meta_block)
                        .map(|v| clean_amount(&v))
                        .unwrap_or_else(|| "0".to_string()),
                ),
                dpd_history,
                deterioration_reasoning: reasoning,
            };
            accounts.push(unified::to_account(account_idx, raw));
        }
        account_idx += 1;
        i = j;
    }
    accounts
}

/// The enquiry section is date-only on this path; member, purpose and
/// amount never survive the text extraction.
fn extract_enquiries(text: &str) -> Vec<Enquiry> {
    let Some(section) = first_match(&ENQUIRY_SECTION_RE, text) else {
        return Vec::new();
    };
    let mut enquiries = Vec::new();
    for m in STRICT_DATE_RE.find_iter(&section) {
        if let Some(parsed) = parse_date(m.as_str()) {
            enquiries.push(Enquiry {
                date: m.as_str().to_string(),
                parsed_date: parsed,
                member: None,
                purpose: None,
                amount: None,
            });
        }
    }
    unified::filter_latest_month(enquiries)
}

/// Document totals over the raw text: the first OVERDUE count, the second
/// amount-shaped OVERDUE value (the first one is the count again), and the
/// first parseable CURRENT value.
fn overdue_summary(text: &str) -> OverdueSummary {
    let total_overdue_accounts = first_match(&OVERDUE_COUNT_RE, text).and_then(|v| v.parse().ok());
    let total_overdue_amount = OVERDUE_AMOUNT_RE
        .captures_iter(text)
        .nth(1)
        .and_then(|c| c[1].replace(',', "").parse::<i64>().ok());
    let total_current_amount = CURRENT_AMOUNT_RE
        .captures_iter(text)
        .find_map(|c| c[1].replace(',', "").parse::<i64>().ok());

    OverdueSummary {
        total_overdue_accounts,
        total_overdue_amount,
        total_current_amount,
    }
}
