//! Markup-format extraction. The document is flattened to visible text
//! lines first; everything after that is line-oriented segmentation, so the
//! markup structure itself never matters beyond which text is visible.

use scraper::{Html, Node};
use tracing::warn;

use crate::extract::dpd;
use crate::extract::normalize::{clean_amount, parse_date};
use crate::extract::patterns::{
    first_match, ACCOUNT_DELIM_RE, ACCOUNT_SECTION_RE, AMOUNT_DIGITS_RE, ENQUIRY_HEADING_RE,
    ENQUIRY_LINE_DATE_RE, FALLBACK_SCORE_RE, HTML_ACCOUNT_TYPE_RE, HTML_CURRENT_BALANCE_RE,
    HTML_DATE_CLOSED_RE, HTML_DATE_OPENED_RE, HTML_DATE_REPORTED_RE, HTML_MEMBER_NAME_RE,
    HTML_SANCTIONED_RE, HTML_STATUS_RE, SCORE_RE, SUMMARY_CURRENT_RE, SUMMARY_OVERDUE_AMOUNT_LOOSE_RE,
    SUMMARY_OVERDUE_AMOUNT_RE, SUMMARY_OVERDUE_COUNT_RE, SUMMARY_SECTION_RE, WHITESPACE_RE,
};
use crate::extract::reasoning::deterioration_reasoning;
use crate::extract::unified::{self, RawAccount};
use crate::report::{Account, Enquiry, OverdueSummary, UnifiedReport};

/// Split fragments shorter than this are noise, not account blocks.
const MIN_BLOCK_LEN: usize = 50;

pub fn extract_from_html(html: &str) -> UnifiedReport {
    let text = flatten_markup(html);

    let mut basic_info = unified::basic_info_from_text(&text);
    basic_info.score = first_match(&SCORE_RE, &text)
        .or_else(|| first_match(&FALLBACK_SCORE_RE, &text))
        .and_then(|s| s.parse().ok());

    let accounts = segment_accounts(&text);
    let enquiries = extract_enquiries(&text);
    let summary = overdue_summary(&text);
    unified::build_report(basic_info, enquiries, accounts, summary, "HTML")
}

/// Visible text content, one text node per line. Script, style and noscript
/// subtrees are invisible and excluded.
pub fn flatten_markup(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut lines: Vec<String> = Vec::new();
    for node in doc.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| match a.value() {
            Node::Element(el) => matches!(el.name(), "script" | "style" | "noscript"),
            _ => false,
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    lines.join("\n")
}

/// Split the account section on the block delimiters. A dd-mm-yyyy date
/// opens the next block and stays with it; the field-label delimiters are
/// consumed by the split.
fn split_blocks(section: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start = 0usize;
    for m in ACCOUNT_DELIM_RE.find_iter(section) {
        let opens_block = m.as_str().starts_with(|c: char| c.is_ascii_digit());
        if m.start() > start {
            blocks.push(&section[start..m.start()]);
        }
        start = if opens_block { m.start() } else { m.end() };
    }
    if start < section.len() {
        blocks.push(&section[start..]);
    }
    blocks
}

/// Every block of meaningful size becomes an account; all fields are
/// optional, so a block with nothing but a DPD grid is still kept.
fn segment_accounts(text: &str) -> Vec<Account> {
    let section = match ACCOUNT_SECTION_RE.find(text) {
        Some(m) => &text[m.start()..],
        None => {
            warn!("no account details heading, scanning full text");
            text
        }
    };

    let mut accounts = Vec::new();
    for block in split_blocks(section) {
        let block = block.trim();
        if block.len() < MIN_BLOCK_LEN {
            continue;
        }
        let dpd_history = dpd::history_from_block(block);
        let reasoning = deterioration_reasoning(&dpd_history);
        let raw = RawAccount {
            member_name: first_match(&HTML_MEMBER_NAME_RE, block),
            account_type: first_match(&HTML_ACCOUNT_TYPE_RE, block),
            status: first_match(&HTML_STATUS_RE, block),
            date_opened: first_match(&HTML_DATE_OPENED_RE, block),
            date_closed: first_match(&HTML_DATE_CLOSED_RE, block),
            date_reported: first_match(&HTML_DATE_REPORTED_RE, block),
            sanctioned_amount: first_match(&HTML_SANCTIONED_RE, block)
                .map(|v| clean_amount(&v))
                .unwrap_or_else(|| "0".to_string()),
            current_balance: first_match(&HTML_CURRENT_BALANCE_RE, block)
                .map(|v| clean_amount(&v))
                .unwrap_or_else(|| "0".to_string()),
            overdue_amount: None,
            dpd_history,
            deterioration_reasoning: reasoning,
        };
        accounts.push(unified::to_account(accounts.len() + 1, raw));
    }
    accounts
}

/// Table rows flatten to one cell per line: member, date, purpose, amount.
/// Rows are recognized by their date cell; the neighbours are read
/// positionally around it.
fn extract_enquiries(text: &str) -> Vec<Enquiry> {
    let Some(heading) = ENQUIRY_HEADING_RE.find(text) else {
        return Vec::new();
    };
    let mut lines: Vec<&str> = text[heading.end()..]
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.first().is_some_and(|l| {
        let upper = l.to_uppercase();
        upper.contains("MEMBER NAME") || upper.contains("ENQUIRY DATE")
    }) {
        lines.remove(0);
    }

    let mut enquiries = Vec::new();
    let mut i = 0;
    while i + 2 < lines.len() {
        if let Some(date) = first_match(&ENQUIRY_LINE_DATE_RE, lines[i]) {
            if let Some(parsed) = parse_date(&date) {
                let member = (i > 0).then(|| lines[i - 1].to_string());
                let purpose = Some(lines[i + 1].to_string());
                let amount = lines[i + 2..lines.len().min(i + 4)]
                    .iter()
                    .find_map(|l| AMOUNT_DIGITS_RE.find(l).map(|m| clean_amount(m.as_str())))
                    .unwrap_or_else(|| "0".to_string());
                enquiries.push(Enquiry {
                    date,
                    parsed_date: parsed,
                    member,
                    purpose,
                    amount: Some(amount),
                });
            }
        }
        i += 1;
    }
    unified::filter_latest_month(enquiries)
}

/// Document totals from the account summary section, whitespace-normalized
/// so the rules hold across table layouts. The overdue amount prefers the
/// ₹-marked match; the loose fallback takes whatever amount-shaped value
/// follows the first "Overdue" label.
fn overdue_summary(text: &str) -> OverdueSummary {
    let section = first_match(&SUMMARY_SECTION_RE, text).unwrap_or_else(|| text.to_string());
    let normalized = WHITESPACE_RE.replace_all(&section, " ");

    let total_overdue_accounts =
        first_match(&SUMMARY_OVERDUE_COUNT_RE, &normalized).and_then(|v| v.parse().ok());
    let total_current_amount = first_match(&SUMMARY_CURRENT_RE, &normalized)
        .map(|v| clean_amount(&v))
        .and_then(|v| v.parse().ok());
    let total_overdue_amount = first_match(&SUMMARY_OVERDUE_AMOUNT_RE, &normalized)
        .or_else(|| first_match(&SUMMARY_OVERDUE_AMOUNT_LOOSE_RE, &normalized))
        .map(|v| clean_amount(&v))
        .and_then(|v| v.parse().ok());

    OverdueSummary {
        total_overdue_accounts,
        total_overdue_amount,
        total_current_amount,
    }
}
