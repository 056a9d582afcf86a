//! Book catalog screens: the reader-facing explore page and the staff
//! issue/edit/delete table.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::info;

use super::{patch_where, LoadOutcome, MutationOutcome, Screen};
use crate::api::LibraryApi;
use crate::forms::{validate_issue_username, BookForm};
use crate::listing::{ListState, RecordFilter, SearchMode, Searchable};
use crate::models::{Book, BookPayload, IssueRequest, RecordId};

pub const NO_BOOKS_MESSAGE: &str = "No books found";

impl Searchable for Book {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.author.as_str()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => write!(f, "available"),
            Availability::Unavailable => write!(f, "unavailable"),
        }
    }
}

impl FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "available" => Ok(Availability::Available),
            "unavailable" | "borrowed" => Ok(Availability::Unavailable),
            other => Err(format!(
                "Unknown availability '{}', expected available or unavailable",
                other
            )),
        }
    }
}

/// Genre and availability, both optional. An empty genre matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub genre: Option<String>,
    pub availability: Option<Availability>,
}

impl RecordFilter<Book> for CatalogFilter {
    fn matches(&self, book: &Book, _now: DateTime<Utc>) -> bool {
        let genre_ok = match self.genre.as_deref() {
            Some(genre) if !genre.is_empty() => book.genre() == genre,
            _ => true,
        };
        let availability_ok = match self.availability {
            Some(Availability::Available) => book.available,
            Some(Availability::Unavailable) => !book.available,
            None => true,
        };
        genre_ok && availability_ok
    }
}

pub type CatalogScreen = Screen<Book, CatalogFilter>;

/// Reader catalog. The search term goes to the backend.
pub fn explore_screen(page_size: usize) -> CatalogScreen {
    Screen::new(ListState::new(page_size).with_search_mode(SearchMode::Remote))
}

/// Staff catalog with local title/author search.
pub fn issue_screen(page_size: usize) -> CatalogScreen {
    Screen::new(ListState::new(page_size))
}

/// Non-empty genres, deduplicated and sorted.
pub fn distinct_genres(books: &[Book]) -> Vec<String> {
    books
        .iter()
        .map(Book::genre)
        .filter(|g| !g.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub available: usize,
    pub borrowed: usize,
}

pub fn catalog_stats(books: &[Book]) -> CatalogStats {
    let available = books.iter().filter(|b| b.available).count();
    CatalogStats {
        total: books.len(),
        available,
        borrowed: books.len() - available,
    }
}

pub fn mark_issued(books: Vec<Book>, id: RecordId) -> Vec<Book> {
    patch_where(
        books,
        |b| b.id == id,
        |b| Book {
            available: false,
            ..b
        },
    )
}

pub fn remove_book(books: Vec<Book>, id: RecordId) -> Vec<Book> {
    books.into_iter().filter(|b| b.id != id).collect()
}

pub fn apply_book_edit(books: Vec<Book>, id: RecordId, payload: &BookPayload) -> Vec<Book> {
    patch_where(
        books,
        |b| b.id == id,
        |b| Book {
            title: payload.title.clone(),
            author: payload.author.clone(),
            genre: Some(payload.genre.clone()),
            book_place: Some(payload.book_place.clone()),
            description: Some(payload.description.clone()),
            ..b
        },
    )
}

/// Load the explore catalog for the current search term.
pub async fn load_explore(screen: &mut CatalogScreen, api: &dyn LibraryApi) -> LoadOutcome {
    let activation = screen.activate();
    let search = screen.list().search().to_string();
    let result = api.search_books(&search).await;
    screen.finish_load(activation, result)
}

/// Load every book for the staff table.
pub async fn load_all_books(screen: &mut CatalogScreen, api: &dyn LibraryApi) -> LoadOutcome {
    let activation = screen.activate();
    let result = api.list_all_books().await;
    screen.finish_load(activation, result)
}

pub async fn issue_book(
    screen: &mut CatalogScreen,
    api: &dyn LibraryApi,
    book_id: RecordId,
    username: &str,
) -> MutationOutcome {
    let username = match validate_issue_username(username) {
        Ok(username) => username,
        Err(errors) => return MutationOutcome::Invalid(errors),
    };
    let Some(ticket) = screen.begin_mutation(book_id) else {
        return MutationOutcome::Busy;
    };

    let request = IssueRequest { username, book_id };
    let result = api.issue_book(&request).await;
    let outcome = screen.finish_mutation(ticket, result, "Error issuing book", |books, ()| {
        mark_issued(books, book_id)
    });
    if outcome.is_applied() {
        info!(book_id, username = %request.username, "Book issued");
    }
    outcome
}

pub async fn edit_book(
    screen: &mut CatalogScreen,
    api: &dyn LibraryApi,
    book_id: RecordId,
    form: &BookForm,
) -> MutationOutcome {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => return MutationOutcome::Invalid(errors),
    };
    let Some(ticket) = screen.begin_mutation(book_id) else {
        return MutationOutcome::Busy;
    };

    let result = api.update_book(book_id, &payload).await;
    screen.finish_mutation(ticket, result, "Error updating book", |books, ()| {
        apply_book_edit(books, book_id, &payload)
    })
}

pub async fn delete_book(
    screen: &mut CatalogScreen,
    api: &dyn LibraryApi,
    book_id: RecordId,
    confirmed: bool,
) -> MutationOutcome {
    if !confirmed {
        return MutationOutcome::Unconfirmed;
    }
    let Some(ticket) = screen.begin_mutation(book_id) else {
        return MutationOutcome::Busy;
    };

    let result = api.delete_book(book_id).await;
    let outcome = screen.finish_mutation(ticket, result, "Error deleting book", |books, ()| {
        remove_book(books, book_id)
    });
    if outcome.is_applied() {
        info!(book_id, "Book deleted");
    }
    outcome
}

/// Submit the add-book form. Not tied to a list; nothing is patched locally.
pub async fn add_book(api: &dyn LibraryApi, form: &BookForm) -> MutationOutcome {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => return MutationOutcome::Invalid(errors),
    };

    match api.add_book(&payload).await {
        Ok(()) => {
            info!(title = %payload.title, "Book added");
            MutationOutcome::Applied
        }
        Err(e) => MutationOutcome::Failed(e.message_or("Error adding book")),
    }
}
