//! CLI module for the libradesk command-line front desk.
//!
//! Provides subcommands for working against a library backend:
//! - `signup` / `login` / `logout` / `whoami` - Account and session
//! - `home` / `goto` - Show where the current session lands, or visit a path
//! - `explore` - Browse and search the catalog
//! - `profile` - Show your details, loans and fines
//! - `admin` / `library-staff` / `staff` - Staff dashboards
//! - `config check` - Validate configuration file

pub mod panel;
pub mod render;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::api::ApiError;
use crate::config::Config;
use crate::forms::{BookForm, LoginForm, SignupForm, UserEditForm};
use crate::models::RecordId;
use crate::routes::{home_destination, Destination, GuardDecision};
use crate::screens::borrows::{self, BorrowFilter, DueDateFilter};
use crate::screens::catalog::{self, Availability, CatalogScreen};
use crate::screens::{profile, users, LoadOutcome, MutationOutcome, Screen};
use crate::session::{Role, SessionState};
use crate::AppContext;

pub use panel::{Panel, Tab};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "libradesk")]
#[command(author, version, about = "Front desk for a library management backend", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "libradesk.toml", global = true)]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Backend URL (overrides [api].base_url)
    #[arg(long, env = "LIBRADESK_API_URL", global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Signup {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "LIBRADESK_PASSWORD")]
        password: String,
        /// USER or STAFF
        #[arg(long, default_value = "USER")]
        role: Role,
    },

    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "LIBRADESK_PASSWORD")]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user and roles
    Whoami,

    /// Show the home destination of the current session
    Home,

    /// Visit a client path such as `/`, `/profile` or `/admin`
    Goto {
        path: String,
    },

    /// Browse the catalog
    Explore {
        #[command(flatten)]
        list: ListArgs,
        /// Only show this genre
        #[arg(short, long)]
        genre: Option<String>,
        /// available or unavailable
        #[arg(short, long)]
        availability: Option<Availability>,
    },

    /// Show your profile, current loans and fines
    Profile,

    /// Admin dashboard
    #[command(subcommand)]
    Admin(PanelCommands),

    /// Library staff dashboard
    #[command(subcommand)]
    LibraryStaff(PanelCommands),

    /// Staff dashboard (read-only)
    #[command(subcommand)]
    Staff(PanelCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Search and page selection shared by list commands
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Case-insensitive search term
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page to show (clamped to the last page)
    #[arg(long, default_value = "1")]
    pub page: usize,
}

/// Dashboard subcommands
#[derive(Subcommand, Debug)]
pub enum PanelCommands {
    /// List all books
    Books {
        #[command(flatten)]
        list: ListArgs,
        #[arg(short, long)]
        genre: Option<String>,
    },
    /// Issue a book to a user
    Issue {
        book_id: RecordId,
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Edit a book; unspecified fields keep their current value
    EditBook {
        book_id: RecordId,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Delete a book
    DeleteBook {
        book_id: RecordId,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Add a book to the catalog
    AddBook {
        #[command(flatten)]
        fields: BookFields,
    },
    /// List borrow records
    Borrows {
        #[command(flatten)]
        list: ListArgs,
        /// all, active, returned or overdue
        #[arg(long)]
        status: Option<BorrowFilter>,
    },
    /// Mark a borrow as returned
    Return { borrow_id: RecordId },
    /// List due dates
    DueDates {
        #[command(flatten)]
        list: ListArgs,
        /// all, borrowed, returned or overdue
        #[arg(long)]
        status: Option<DueDateFilter>,
    },
    /// Push a due date back by some days
    Extend {
        borrow_id: RecordId,
        #[arg(short, long, allow_negative_numbers = true)]
        days: Option<i64>,
    },
    /// List users
    Users {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Edit a user; leave --password out to keep the current one
    EditUser {
        user_id: RecordId,
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },
}

impl PanelCommands {
    pub fn tab(&self) -> Tab {
        match self {
            PanelCommands::Books { .. } => Tab::Books,
            PanelCommands::Issue { .. } => Tab::IssueBook,
            PanelCommands::EditBook { .. } => Tab::EditBook,
            PanelCommands::DeleteBook { .. } => Tab::DeleteBook,
            PanelCommands::AddBook { .. } => Tab::AddBook,
            PanelCommands::Borrows { .. } => Tab::Borrows,
            PanelCommands::Return { .. } => Tab::ReturnBook,
            PanelCommands::DueDates { .. } => Tab::DueDates,
            PanelCommands::Extend { .. } => Tab::ExtendDueDate,
            PanelCommands::Users { .. } => Tab::Users,
            PanelCommands::EditUser { .. } => Tab::EditUser,
        }
    }
}

/// Book form fields as flags
#[derive(Args, Debug, Clone, Default)]
pub struct BookFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub book_place: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

impl BookFields {
    /// Overlay the given flags on `form`
    fn apply(&self, mut form: BookForm) -> BookForm {
        if let Some(title) = &self.title {
            form.title = title.clone();
        }
        if let Some(author) = &self.author {
            form.author = author.clone();
        }
        if let Some(book_place) = &self.book_place {
            form.book_place = book_place.clone();
        }
        if let Some(genre) = &self.genre {
            form.genre = genre.clone();
        }
        if let Some(description) = &self.description {
            form.description = description.clone();
        }
        form
    }
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Run a CLI command. `config check` is handled before a context exists.
pub async fn run_command(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Signup {
            username,
            email,
            password,
            role,
        } => cmd_signup(ctx, username, email, password, *role).await,
        Commands::Login { username, password } => cmd_login(ctx, username, password).await,
        Commands::Logout => cmd_logout(ctx),
        Commands::Whoami => cmd_whoami(ctx),
        Commands::Home => cmd_home(ctx),
        Commands::Goto { path } => cmd_goto(ctx, path),
        Commands::Explore {
            list,
            genre,
            availability,
        } => cmd_explore(ctx, list, genre.clone(), *availability).await,
        Commands::Profile => cmd_profile(ctx).await,
        Commands::Admin(command) => cmd_panel(ctx, Panel::Admin, command).await,
        Commands::LibraryStaff(command) => cmd_panel(ctx, Panel::LibraryStaff, command).await,
        Commands::Staff(command) => cmd_panel(ctx, Panel::Staff, command).await,
        Commands::Config(ConfigCommands::Check) => {
            bail!("`config check` runs without a backend context")
        }
    }
}

/// Pass the route guard for `destination` or explain why not.
fn enter(ctx: &AppContext, destination: Destination) -> Result<()> {
    match ctx.navigate(destination) {
        GuardDecision::Render => Ok(()),
        GuardDecision::Redirect(Destination::Login) => {
            bail!("Not logged in. Run `libradesk login` first.")
        }
        GuardDecision::Redirect(home) => {
            let role = destination
                .required_role()
                .map(|r| r.to_string())
                .unwrap_or_default();
            bail!(
                "{} requires the {} role. Your home is {}",
                destination,
                role,
                home
            )
        }
    }
}

fn report_load(outcome: &LoadOutcome) {
    if let LoadOutcome::Failed(message) = outcome {
        eprintln!("[!!] {}. Run the command again to retry.", message);
    }
}

fn report(outcome: MutationOutcome, success: &str) -> Result<()> {
    match outcome {
        MutationOutcome::Applied => {
            println!("[OK] {}", success);
            Ok(())
        }
        MutationOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field, message);
            }
            bail!("{}", errors)
        }
        MutationOutcome::Busy => bail!("Another change to this record is still in progress"),
        MutationOutcome::Unconfirmed => bail!("Nothing deleted. Re-run with --yes to confirm."),
        MutationOutcome::Failed(message) => bail!("{}", message),
        MutationOutcome::Stale => {
            debug!("Mutation finished after the screen was left");
            Ok(())
        }
    }
}

async fn cmd_signup(
    ctx: &AppContext,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<()> {
    let form = SignupForm {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role,
    };
    let request = form.validate()?;

    match ctx.api.register(&request).await {
        Ok(()) => {
            println!("Signup successful! Please login.");
            Ok(())
        }
        Err(e) => bail!("{}", e.message_or("Signup failed")),
    }
}

async fn cmd_login(ctx: &AppContext, username: &str, password: &str) -> Result<()> {
    let form = LoginForm {
        username: username.to_string(),
        password: password.to_string(),
    };
    let request = form.validate()?;

    match ctx.api.login(&request).await {
        Ok(response) => {
            ctx.session.login(&response);
            if let SessionState::Authenticated(session) = ctx.session.current() {
                println!("Logged in as {}", session.username);
                println!("Home: {}", home_destination(&session));
            }
            Ok(())
        }
        Err(ApiError::InvalidCredentials) => bail!("Invalid username or password"),
        Err(e) => {
            error!(error = %e, "Login failed");
            bail!("An error occurred. Please try again.")
        }
    }
}

fn cmd_logout(ctx: &AppContext) -> Result<()> {
    ctx.session.logout();
    println!("Logged out");
    Ok(())
}

fn cmd_whoami(ctx: &AppContext) -> Result<()> {
    match ctx.session.current() {
        SessionState::Unauthenticated => println!("Not logged in"),
        SessionState::Authenticated(session) => {
            let roles: Vec<&str> = session.roles.iter().map(String::as_str).collect();
            println!("Username: {}", session.username);
            println!("Roles:    {}", roles.join(", "));
            println!("Home:     {}", home_destination(&session));
        }
    }
    Ok(())
}

fn cmd_home(ctx: &AppContext) -> Result<()> {
    let home = match ctx.session.current() {
        SessionState::Unauthenticated => Destination::Login,
        SessionState::Authenticated(session) => home_destination(&session),
    };
    visit(ctx, home)
}

fn cmd_goto(ctx: &AppContext, path: &str) -> Result<()> {
    let Some(destination) = Destination::from_path(path) else {
        bail!("Unknown destination {}", path);
    };
    visit(ctx, destination)
}

/// Render the landing text of `destination` once the guard lets us in.
fn visit(ctx: &AppContext, destination: Destination) -> Result<()> {
    enter(ctx, destination)?;
    println!("{}", destination);
    println!("{}", landing(destination));
    Ok(())
}

fn landing(destination: Destination) -> &'static str {
    match destination {
        Destination::Signup => "Create an account with `libradesk signup`",
        Destination::Login => "Log in with `libradesk login`",
        Destination::LearningCentre => {
            "Welcome to the learning centre. Browse books with `libradesk explore` \
             or check your loans with `libradesk profile`"
        }
        Destination::Explore => "Browse the catalog with `libradesk explore`",
        Destination::Profile => "See your loans and fines with `libradesk profile`",
        Destination::Admin => "Admin tabs: `libradesk admin --help`",
        Destination::Staff => "Staff tabs: `libradesk staff --help`",
        Destination::LibraryStaff => "Library staff tabs: `libradesk library-staff --help`",
    }
}

async fn cmd_explore(
    ctx: &AppContext,
    list: &ListArgs,
    genre: Option<String>,
    availability: Option<Availability>,
) -> Result<()> {
    enter(ctx, Destination::Explore)?;

    let mut screen = catalog::explore_screen(ctx.config.listing.catalog_page_size);
    if let Some(search) = &list.search {
        screen.list_mut().set_search(search.clone());
    }
    let outcome = catalog::load_explore(&mut screen, ctx.api.as_ref()).await;
    report_load(&outcome);

    screen.list_mut().set_filter(catalog::CatalogFilter {
        genre,
        availability,
    });
    screen.list_mut().set_page(list.page);

    let genres = catalog::distinct_genres(screen.records());
    let total = screen.records().len();
    let view = screen.view(Utc::now());
    println!();
    if !genres.is_empty() {
        println!("Genres: {}", genres.join(", "));
        println!();
    }
    print!("{}", render::books_table(&view, total));
    println!();
    Ok(())
}

async fn cmd_profile(ctx: &AppContext) -> Result<()> {
    enter(ctx, Destination::Profile)?;

    match profile::load_profile(ctx.api.as_ref()).await {
        Some(profile) => {
            println!();
            print!("{}", render::profile_card(&profile, Utc::now()));
            println!();
        }
        None => println!("Profile not found"),
    }
    Ok(())
}

async fn cmd_panel(ctx: &AppContext, panel: Panel, command: &PanelCommands) -> Result<()> {
    enter(ctx, panel.destination())?;

    let tab = command.tab();
    if !panel.allows(tab) {
        bail!("The {} dashboard has no {} tab", panel, tab.name());
    }

    let page_size = ctx.config.listing.admin_page_size;
    let api = ctx.api.as_ref();
    let now = Utc::now();

    match command {
        PanelCommands::Books { list, genre } => {
            let mut screen = catalog::issue_screen(page_size);
            report_load(&catalog::load_all_books(&mut screen, api).await);
            apply_list_args(&mut screen, list);
            screen
                .list_mut()
                .update_filter(|filter| filter.genre = genre.clone());
            screen.list_mut().set_page(list.page);

            let stats = catalog::catalog_stats(screen.records());
            let total = screen.records().len();
            let view = screen.view(now);
            println!();
            print!("{}", render::books_table(&view, total));
            println!("{}", render::catalog_summary(&stats));
            Ok(())
        }
        PanelCommands::Issue { book_id, username } => {
            let mut screen = catalog::issue_screen(page_size);
            report_load(&catalog::load_all_books(&mut screen, api).await);
            let title = find_book_title(&screen, *book_id)?;
            let username = username.clone().unwrap_or_default();

            let outcome = catalog::issue_book(&mut screen, api, *book_id, &username).await;
            report(outcome, &format!("Issued \"{}\" to {}", title, username.trim()))
        }
        PanelCommands::EditBook { book_id, fields } => {
            let mut screen = catalog::issue_screen(page_size);
            report_load(&catalog::load_all_books(&mut screen, api).await);
            let current = screen
                .records()
                .iter()
                .find(|b| b.id == *book_id)
                .map(BookForm::from_book);
            let Some(current) = current else {
                bail!("Book {} not found", book_id);
            };

            let form = fields.apply(current);
            let outcome = catalog::edit_book(&mut screen, api, *book_id, &form).await;
            report(outcome, "Book updated successfully")
        }
        PanelCommands::DeleteBook { book_id, yes } => {
            let mut screen = catalog::issue_screen(page_size);
            report_load(&catalog::load_all_books(&mut screen, api).await);
            let title = find_book_title(&screen, *book_id)?;
            if !yes {
                println!("About to delete \"{}\"", title);
            }

            let outcome = catalog::delete_book(&mut screen, api, *book_id, *yes).await;
            report(outcome, "Book deleted")
        }
        PanelCommands::AddBook { fields } => {
            let form = fields.apply(BookForm::default());
            let outcome = catalog::add_book(api, &form).await;
            report(outcome, "Book added successfully")
        }
        PanelCommands::Borrows { list, status } => {
            let mut screen = borrows::borrow_screen(page_size);
            report_load(&borrows::load_borrows(&mut screen, api).await);
            apply_list_args(&mut screen, list);
            screen.list_mut().set_filter(status.unwrap_or_default());
            screen.list_mut().set_page(list.page);

            let stats = borrows::borrow_stats(screen.records(), now);
            let total = screen.records().len();
            let view = screen.view(now);
            println!();
            print!("{}", render::borrows_table(&view, total, now));
            println!("{}", render::borrow_summary(&stats));
            Ok(())
        }
        PanelCommands::Return { borrow_id } => {
            let mut screen = borrows::borrow_screen(page_size);
            report_load(&borrows::load_borrows(&mut screen, api).await);
            if !screen.records().iter().any(|b| b.id == *borrow_id) {
                bail!("Borrow {} not found", borrow_id);
            }

            let outcome = borrows::return_book(&mut screen, api, *borrow_id, now).await;
            report(outcome, "Book returned successfully")
        }
        PanelCommands::DueDates { list, status } => {
            let mut screen = borrows::due_date_screen(page_size);
            report_load(&borrows::load_borrows(&mut screen, api).await);
            apply_list_args(&mut screen, list);
            screen.list_mut().set_filter(status.unwrap_or_default());
            screen.list_mut().set_page(list.page);

            let stats = borrows::due_date_stats(screen.records(), now);
            let total = screen.records().len();
            let view = screen.view(now);
            println!();
            print!("{}", render::due_dates_table(&view, total, now));
            println!("{}", render::due_date_summary(&stats));
            Ok(())
        }
        PanelCommands::Extend { borrow_id, days } => {
            let mut screen = borrows::due_date_screen(page_size);
            report_load(&borrows::load_borrows(&mut screen, api).await);
            if !screen.records().iter().any(|b| b.id == *borrow_id) {
                bail!("Borrow {} not found", borrow_id);
            }

            let outcome = borrows::extend_due_date(&mut screen, api, *borrow_id, *days).await;
            report(outcome, "Due date extended successfully!")?;
            if let Some(borrow) = screen.records().iter().find(|b| b.id == *borrow_id) {
                println!("New due date: {}", borrow.due_date.format("%Y-%m-%d"));
            }
            Ok(())
        }
        PanelCommands::Users { list } => {
            let mut screen = users::user_screen(page_size);
            report_load(&users::load_users(&mut screen, api).await);
            apply_list_args(&mut screen, list);
            screen.list_mut().set_page(list.page);

            let total = screen.records().len();
            let view = screen.view(now);
            println!();
            print!("{}", render::users_table(&view, total));
            Ok(())
        }
        PanelCommands::EditUser {
            user_id,
            username,
            email,
            password,
        } => {
            let mut screen = users::user_screen(page_size);
            report_load(&users::load_users(&mut screen, api).await);
            let current = screen
                .records()
                .iter()
                .find(|u| u.id == *user_id)
                .map(UserEditForm::from_user);
            let Some(mut form) = current else {
                bail!("User {} not found", user_id);
            };

            if let Some(username) = username {
                form.username = username.clone();
            }
            if let Some(email) = email {
                form.email = email.clone();
            }
            if let Some(password) = password {
                form.password = password.clone();
            }
            let outcome = users::edit_user(&mut screen, api, *user_id, &form).await;
            report(outcome, "User updated")
        }
    }
}

fn apply_list_args<T, F>(screen: &mut Screen<T, F>, list: &ListArgs) {
    if let Some(search) = &list.search {
        screen.list_mut().set_search(search.clone());
    }
}

fn find_book_title(screen: &CatalogScreen, book_id: RecordId) -> Result<String> {
    match screen.records().iter().find(|b| b.id == book_id) {
        Some(book) => Ok(book.title.clone()),
        None => bail!("Book {} not found", book_id),
    }
}

/// Validate a configuration file and print a summary
pub fn cmd_config_check(config_path: &Path) -> Result<()> {
    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("Defaults will be used.");
        println!("To customise, copy libradesk.example.toml to libradesk.toml");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("API:");
            println!("  Base URL:     {}", config.api.base_url);
            match config.api.request_timeout_secs {
                Some(secs) => println!("  Timeout:      {}s", secs),
                None => println!("  Timeout:      none"),
            }
            println!();
            println!("Storage:");
            println!("  Path:         {}", config.storage.path.display());
            println!();
            println!("Listing:");
            println!("  Catalog page: {}", config.listing.catalog_page_size);
            println!("  Admin page:   {}", config.listing.admin_page_size);
            println!();
            println!("Logging:");
            println!("  Level:        {}", config.logging.level);
            println!();

            if config.api.base_url.starts_with("http://")
                && !config.api.base_url.contains("localhost")
                && !config.api.base_url.contains("127.0.0.1")
            {
                println!("Warnings:");
                println!("  [!] Backend URL is not HTTPS - bearer tokens are sent in plaintext");
                println!();
            }
            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            println!("Please check the configuration file syntax and try again.");
            bail!("Invalid configuration file");
        }
    }
}
