//! Local form validation.
//!
//! Required-field checks run before any network call. A failed check
//! produces a per-field message and never clears the other fields.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use crate::models::{Book, BookPayload, LoginRequest, RegisterRequest, UserRecord, UserUpdate};
use crate::session::Role;

lazy_static! {
    /// Loose email shape check; the backend does the real validation
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid");
}

/// Field-level validation messages, in the order they were found.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(&'static str, String)>,
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|(_, m)| m.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) -> &mut Self {
        self.errors.push((field, message.into()));
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    /// Drop the error for one field, e.g. once the user edits it
    pub fn clear(&mut self, field: &str) {
        self.errors.retain(|(f, _)| *f != field);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    fn require(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

/// Add-book and edit-book form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub book_place: String,
    pub genre: String,
    pub description: String,
}

impl BookForm {
    /// Prefill from an existing record for editing
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            book_place: book.book_place.clone().unwrap_or_default(),
            genre: book.genre.clone().unwrap_or_default(),
            description: book.description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<BookPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("author", &self.author, "Author is required");
        errors.require("bookPlace", &self.book_place, "Book Place is required");
        errors.require("genre", &self.genre, "Genre is required");
        errors.finish()?;

        Ok(BookPayload {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            book_place: self.book_place.trim().to_string(),
            genre: self.genre.trim().to_string(),
            description: self.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("username", &self.username, "Username is required");
        errors.require("password", &self.password, "Password is required");
        errors.finish()?;

        Ok(LoginRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Default for SignupForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            role: Role::User,
        }
    }
}

impl SignupForm {
    pub fn validate(&self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("username", &self.username, "Username is required");
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "Invalid email format");
        }
        errors.require("password", &self.password, "Password is required");
        if !Role::SIGNUP.contains(&self.role) {
            errors.add("role", "Role must be USER or STAFF");
        }
        errors.finish()?;

        Ok(RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: self.role.as_str().to_string(),
        })
    }
}

/// Edit-user drawer. The password is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserEditForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl UserEditForm {
    pub fn from_user(user: &UserRecord) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            password: String::new(),
        }
    }

    pub fn validate(&self) -> Result<UserUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("username", &self.username, "Username is required");
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "Invalid email format");
        }
        errors.finish()?;

        Ok(UserUpdate {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

/// Username typed into the issue-book box.
pub fn validate_issue_username(username: &str) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.require("username", username, "Please enter a username");
    errors.finish()?;
    Ok(username.trim().to_string())
}

/// Longest single extension accepted, roughly a century.
pub const MAX_EXTRA_DAYS: u32 = 36_500;

/// Days to add to a due date; a positive whole number up to `MAX_EXTRA_DAYS`.
pub fn validate_extra_days(days: Option<i64>) -> Result<u32, FieldErrors> {
    match days {
        Some(d) if d > 0 && d <= i64::from(MAX_EXTRA_DAYS) => Ok(d as u32),
        _ => {
            let mut errors = FieldErrors::new();
            errors.add("extraDays", "Please enter valid number of days");
            Err(errors)
        }
    }
}
