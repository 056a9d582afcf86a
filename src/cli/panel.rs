//! Staff dashboards and which tabs each one carries.

use std::fmt;

use crate::routes::Destination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Admin,
    LibraryStaff,
    Staff,
}

/// One tab (or action inside a tab) of a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Books,
    IssueBook,
    EditBook,
    DeleteBook,
    AddBook,
    Borrows,
    ReturnBook,
    DueDates,
    ExtendDueDate,
    Users,
    EditUser,
}

impl Tab {
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Books => "books",
            Tab::IssueBook => "issue",
            Tab::EditBook => "edit-book",
            Tab::DeleteBook => "delete-book",
            Tab::AddBook => "add-book",
            Tab::Borrows => "borrows",
            Tab::ReturnBook => "return",
            Tab::DueDates => "due-dates",
            Tab::ExtendDueDate => "extend",
            Tab::Users => "users",
            Tab::EditUser => "edit-user",
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self, Tab::Books | Tab::Borrows | Tab::DueDates)
    }

    fn is_user_management(&self) -> bool {
        matches!(self, Tab::Users | Tab::EditUser)
    }
}

impl Panel {
    pub fn destination(&self) -> Destination {
        match self {
            Panel::Admin => Destination::Admin,
            Panel::LibraryStaff => Destination::LibraryStaff,
            Panel::Staff => Destination::Staff,
        }
    }

    /// Admins get everything, library staff everything but user
    /// management, staff only the listings.
    pub fn allows(&self, tab: Tab) -> bool {
        match self {
            Panel::Admin => true,
            Panel::LibraryStaff => !tab.is_user_management(),
            Panel::Staff => tab.is_read_only(),
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Panel::Admin => write!(f, "admin"),
            Panel::LibraryStaff => write!(f, "library-staff"),
            Panel::Staff => write!(f, "staff"),
        }
    }
}
