//! Report exporter and history filtering.
//!
//! `build_report` is a pure formatting function: it never touches the
//! entity store and refuses an empty entry list.  The output is a
//! paginated plain-text document with a practice header, one block per
//! entry and a confidentiality footer on every page.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use serena_shared::constants::PRACTICE_NAME;
use serena_shared::{DailyEntry, Mood, User};

use crate::error::ReportError;

/// Lines of body content per page, footer excluded.
const PAGE_BODY_LINES: usize = 44;

/// Column budget for word wrapping.
const WRAP_WIDTH: usize = 78;

const FOOTER: &str = "Confidential document for therapeutic use. Generated by Serena.";

// ---------------------------------------------------------------------------
// History window
// ---------------------------------------------------------------------------

/// Recency filter over entry creation timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    All,
    LastWeek,
    LastMonth,
    LastYear,
}

impl HistoryWindow {
    /// Oldest timestamp admitted by this window, or `None` for no limit.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            HistoryWindow::All => None,
            HistoryWindow::LastWeek => Some(now - Duration::days(7)),
            HistoryWindow::LastMonth => Some(now - Duration::days(30)),
            HistoryWindow::LastYear => Some(now - Duration::days(365)),
        }
    }
}

/// Keep only entries inside the window, preserving order.
pub fn filter_by_window(
    entries: Vec<DailyEntry>,
    window: HistoryWindow,
    now: DateTime<Utc>,
) -> Vec<DailyEntry> {
    match window.cutoff(now) {
        None => entries,
        Some(cutoff) => entries
            .into_iter()
            .filter(|e| e.timestamp >= cutoff)
            .collect(),
    }
}

/// Per-mood entry counts, worst mood first.  Drives the frequency chart.
pub fn mood_frequency(entries: &[DailyEntry]) -> Vec<(Mood, usize)> {
    Mood::ALL
        .iter()
        .map(|&mood| (mood, entries.iter().filter(|e| e.mood == mood).count()))
        .collect()
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A rendered, paginated report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub pages: Vec<String>,
}

impl Report {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whole document as one string, pages separated by form feeds.
    pub fn render(&self) -> String {
        self.pages.join("\x0c")
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Greedy word wrap, measured in characters so accented text wraps the
/// same as plain ASCII.  Words longer than the budget are hard-split so
/// no output line ever exceeds `width`.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut word_len = word.chars().count();

        while word_len > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let split = word
                .char_indices()
                .nth(width)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            let (head, tail) = word.split_at(split);
            lines.push(head.to_owned());
            word = tail;
            word_len -= width;
        }

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Format a user's entries into a paginated document.
///
/// Entries are laid out oldest first regardless of input order.  The
/// caller owns filtering and must check for emptiness beforehand; an
/// empty set is refused, not rendered.
pub fn build_report(user: &User, entries: &[DailyEntry]) -> Result<Report, ReportError> {
    if entries.is_empty() {
        return Err(ReportError::NoEntries);
    }

    let mut sorted: Vec<&DailyEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then(a.timestamp.cmp(&b.timestamp)));

    let first = sorted[0].date;
    let last = sorted[sorted.len() - 1].date;

    let mut lines: Vec<String> = vec![
        PRACTICE_NAME.to_owned(),
        "Individual Therapy Report".to_owned(),
        String::new(),
        format!("Patient: {}", user.full_name),
        format!("Period: {} to {}", format_date(first), format_date(last)),
        "-".repeat(WRAP_WIDTH),
        String::new(),
    ];

    for entry in sorted {
        lines.push(format!(
            "{}    Mood: {}",
            format_date(entry.date),
            entry.mood.label()
        ));
        lines.extend(wrap_text(&entry.notes, WRAP_WIDTH));
        lines.push(String::new());
    }

    // Trailing blank line adds nothing to the last block.
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let mut pages = Vec::new();
    for chunk in lines.chunks(PAGE_BODY_LINES) {
        let mut page = chunk.join("\n");
        page.push_str("\n\n");
        page.push_str(FOOTER);
        pages.push(page);
    }

    Ok(Report { pages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ana() -> User {
        User {
            id: Uuid::new_v4(),
            username: "ana".into(),
            password: "hunter2".into(),
            full_name: "Ana Silva".into(),
            email: "ana@example.com".into(),
            cpf: "123.456.789-00".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
        }
    }

    fn entry_on(user_id: Uuid, date: NaiveDate, mood: Mood, notes: &str) -> DailyEntry {
        DailyEntry::new(user_id, date, mood, notes)
    }

    #[test]
    fn empty_entry_list_is_refused() {
        let user = ana();
        assert!(matches!(
            build_report(&user, &[]),
            Err(ReportError::NoEntries)
        ));
    }

    #[test]
    fn report_has_header_footer_and_oldest_first_blocks() {
        let user = ana();
        let later = entry_on(
            user.id,
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            Mood::Excellent,
            "a really good day",
        );
        let earlier = entry_on(
            user.id,
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            Mood::Bad,
            "a rough one",
        );

        let report = build_report(&user, &[later, earlier]).unwrap();
        assert_eq!(report.page_count(), 1);

        let page = &report.pages[0];
        assert!(page.starts_with(PRACTICE_NAME));
        assert!(page.contains("Patient: Ana Silva"));
        assert!(page.contains("Period: 02/05/2024 to 20/05/2024"));
        assert!(page.ends_with(FOOTER));

        let rough = page.find("a rough one").unwrap();
        let good = page.find("a really good day").unwrap();
        assert!(rough < good, "entries must be oldest first");
        assert!(page.contains("Mood: Bad"));
        assert!(page.contains("Mood: Excellent"));
    }

    #[test]
    fn long_reports_paginate_with_footer_on_every_page() {
        let user = ana();
        let entries: Vec<DailyEntry> = (0..60)
            .map(|i| {
                entry_on(
                    user.id,
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i),
                    Mood::Neutral,
                    "an ordinary day with nothing special to report",
                )
            })
            .collect();

        let report = build_report(&user, &entries).unwrap();
        assert!(report.page_count() > 1);
        for page in &report.pages {
            assert!(page.ends_with(FOOTER));
        }

        let rendered = report.render();
        assert_eq!(
            rendered.matches('\x0c').count(),
            report.page_count() - 1
        );
    }

    #[test]
    fn notes_are_word_wrapped_to_width() {
        let user = ana();
        let long_notes = "word ".repeat(100);
        let entry = entry_on(
            user.id,
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            Mood::Good,
            long_notes.trim(),
        );

        let report = build_report(&user, &[entry]).unwrap();
        for line in report.pages.iter().flat_map(|p| p.lines()) {
            assert!(line.len() <= WRAP_WIDTH, "line too long: {line:?}");
        }
    }

    #[test]
    fn wrap_hard_splits_oversized_words() {
        let word = "x".repeat(WRAP_WIDTH * 2 + 5);
        let lines = wrap_text(&word, WRAP_WIDTH);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.len() <= WRAP_WIDTH));
    }

    #[test]
    fn wrap_counts_characters_not_bytes() {
        let word = "ã".repeat(WRAP_WIDTH + 1);
        let lines = wrap_text(&word, WRAP_WIDTH);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), WRAP_WIDTH);
        assert_eq!(lines[1], "ã");
    }

    #[test]
    fn window_filtering_by_timestamp() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let mut recent = entry_on(
            user_id,
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            Mood::Good,
            "recent",
        );
        recent.timestamp = now - Duration::days(2);
        let mut old = recent.clone();
        old.id = Uuid::new_v4();
        old.notes = "old".into();
        old.timestamp = now - Duration::days(90);

        let all = vec![recent.clone(), old.clone()];

        assert_eq!(filter_by_window(all.clone(), HistoryWindow::All, now).len(), 2);
        let week = filter_by_window(all.clone(), HistoryWindow::LastWeek, now);
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].notes, "recent");
        assert_eq!(
            filter_by_window(all.clone(), HistoryWindow::LastMonth, now).len(),
            1
        );
        assert_eq!(filter_by_window(all, HistoryWindow::LastYear, now).len(), 2);
    }

    #[test]
    fn mood_frequency_counts_every_scale_point() {
        let user_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let entries = vec![
            entry_on(user_id, date, Mood::Good, "a"),
            entry_on(user_id, date, Mood::Good, "b"),
            entry_on(user_id, date, Mood::VeryBad, "c"),
        ];

        let freq = mood_frequency(&entries);
        assert_eq!(freq.len(), 5);
        assert_eq!(freq[0], (Mood::VeryBad, 1));
        assert_eq!(freq[3], (Mood::Good, 2));
        assert_eq!(freq[4], (Mood::Excellent, 0));
    }
}
