//! Plain-text rendering of list views and records.
//!
//! Everything here returns a `String` so output can be checked in tests;
//! the command layer prints it.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::listing::ListView;
use crate::models::{Book, Borrow, Profile, UserRecord};
use crate::screens::borrows::{due_badge, BorrowStats, DueDateStats, NO_BORROWS_MESSAGE};
use crate::screens::catalog::{CatalogStats, NO_BOOKS_MESSAGE};
use crate::screens::profile::current_loans;
use crate::screens::users::NO_USERS_MESSAGE;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// "Page X of Y", with an empty result counted as one page.
pub fn page_footer<T>(view: &ListView<'_, T>) -> String {
    format!("Page {} of {}", view.page(), view.total_pages().max(1))
}

fn footer<T>(out: &mut String, view: &ListView<'_, T>, total: usize) {
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Showing {} of {} records. {}",
        view.total_matches(),
        total,
        page_footer(view)
    );
}

fn availability(book: &Book) -> &'static str {
    if book.available {
        "Available"
    } else {
        "Borrowed"
    }
}

pub fn books_table(view: &ListView<'_, Book>, total: usize) -> String {
    if view.is_empty() {
        return format!("{}\n", NO_BOOKS_MESSAGE);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6}  {:<30}  {:<20}  {:<12}  {:<12}  {:<10}",
        "ID", "TITLE", "AUTHOR", "GENRE", "PLACE", "STATUS"
    );
    let _ = writeln!(out, "{}", "-".repeat(100));
    for book in view.page_slice() {
        let _ = writeln!(
            out,
            "{:<6}  {:<30}  {:<20}  {:<12}  {:<12}  {:<10}",
            book.id,
            truncate(&book.title, 30),
            truncate(&book.author, 20),
            truncate(or_dash(book.genre()), 12),
            truncate(or_dash(book.book_place.as_deref().unwrap_or("")), 12),
            availability(book)
        );
    }
    footer(&mut out, view, total);
    out
}

pub fn borrows_table(view: &ListView<'_, Borrow>, total: usize, now: DateTime<Utc>) -> String {
    if view.is_empty() {
        return format!("{}\n", NO_BORROWS_MESSAGE);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6}  {:<30}  {:<16}  {:<10}  {:<10}  {:<10}",
        "ID", "BOOK", "USER", "DUE", "RETURNED", "STATUS"
    );
    let _ = writeln!(out, "{}", "-".repeat(94));
    for borrow in view.page_slice() {
        let returned = borrow
            .return_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<6}  {:<30}  {:<16}  {:<10}  {:<10}  {:<10}",
            borrow.id,
            truncate(&borrow.book.title, 30),
            truncate(&borrow.user.username, 16),
            borrow.due_date.format(DATE_FORMAT),
            returned,
            borrow.status(now)
        );
    }
    footer(&mut out, view, total);
    out
}

pub fn due_dates_table(view: &ListView<'_, Borrow>, total: usize, now: DateTime<Utc>) -> String {
    if view.is_empty() {
        return format!("{}\n", NO_BORROWS_MESSAGE);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6}  {:<30}  {:<16}  {:<10}  {:<20}",
        "ID", "BOOK", "USER", "DUE", "STATUS"
    );
    let _ = writeln!(out, "{}", "-".repeat(90));
    for borrow in view.page_slice() {
        let _ = writeln!(
            out,
            "{:<6}  {:<30}  {:<16}  {:<10}  {:<20}",
            borrow.id,
            truncate(&borrow.book.title, 30),
            truncate(&borrow.user.username, 16),
            borrow.due_date.format(DATE_FORMAT),
            due_badge(borrow, now)
        );
    }
    footer(&mut out, view, total);
    out
}

pub fn users_table(view: &ListView<'_, UserRecord>, total: usize) -> String {
    if view.is_empty() {
        return format!("{}\n", NO_USERS_MESSAGE);
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<6}  {:<20}  {:<36}", "ID", "USERNAME", "EMAIL");
    let _ = writeln!(out, "{}", "-".repeat(66));
    for user in view.page_slice() {
        let _ = writeln!(
            out,
            "{:<6}  {:<20}  {:<36}",
            user.id,
            truncate(&user.username, 20),
            truncate(&user.email, 36)
        );
    }
    footer(&mut out, view, total);
    out
}

pub fn catalog_summary(stats: &CatalogStats) -> String {
    format!(
        "Total: {}  Available: {}  Borrowed: {}",
        stats.total, stats.available, stats.borrowed
    )
}

pub fn borrow_summary(stats: &BorrowStats) -> String {
    format!(
        "Total: {}  Returned: {}  Overdue: {}  Due Soon: {}  Active: {}",
        stats.total, stats.returned, stats.overdue, stats.due_soon, stats.active
    )
}

pub fn due_date_summary(stats: &DueDateStats) -> String {
    format!(
        "Total: {}  Currently Borrowed: {}  Returned: {}  Overdue: {}",
        stats.total, stats.borrowed, stats.returned, stats.overdue
    )
}

pub fn profile_card(profile: &Profile, now: DateTime<Utc>) -> String {
    let details = &profile.user_details;
    let mut out = String::new();
    let _ = writeln!(out, "Name:         {}", or_dash(&details.full_name));
    let _ = writeln!(out, "Email:        {}", or_dash(&details.email));
    let _ = writeln!(
        out,
        "Library Card: {}",
        details.library_card_number.as_deref().unwrap_or("-")
    );
    let _ = writeln!(out);

    let loans = current_loans(profile, now);
    if loans.is_empty() {
        let _ = writeln!(out, "No books currently borrowed");
    } else {
        let _ = writeln!(out, "{:<30}  {:<10}  {:<8}", "BOOK", "DUE", "STATUS");
        let _ = writeln!(out, "{}", "-".repeat(52));
        for (loan, standing) in loans {
            let _ = writeln!(
                out,
                "{:<30}  {:<10}  {:<8}",
                truncate(&loan.title, 30),
                loan.due_date.format(DATE_FORMAT),
                standing
            );
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Outstanding fines: {:.2}",
        profile.fines.outstanding_amount
    );
    out
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// Truncate to `max_len` characters with an ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
