use tracing::info;

use super::{patch_where, LoadOutcome, MutationOutcome, Screen};
use crate::api::LibraryApi;
use crate::forms::UserEditForm;
use crate::listing::{ListState, NoFilter, Searchable};
use crate::models::{RecordId, UserRecord, UserUpdate};

pub const NO_USERS_MESSAGE: &str = "No users found";

impl Searchable for UserRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.username.as_str(), self.email.as_str()]
    }
}

pub type UserScreen = Screen<UserRecord, NoFilter>;

pub fn user_screen(page_size: usize) -> UserScreen {
    Screen::new(ListState::new(page_size))
}

pub fn apply_user_edit(users: Vec<UserRecord>, id: RecordId, update: &UserUpdate) -> Vec<UserRecord> {
    patch_where(
        users,
        |u| u.id == id,
        |u| UserRecord {
            username: update.username.clone(),
            email: update.email.clone(),
            ..u
        },
    )
}

pub async fn load_users(screen: &mut UserScreen, api: &dyn LibraryApi) -> LoadOutcome {
    let activation = screen.activate();
    let result = api.list_users().await;
    screen.finish_load(activation, result)
}

pub async fn edit_user(
    screen: &mut UserScreen,
    api: &dyn LibraryApi,
    user_id: RecordId,
    form: &UserEditForm,
) -> MutationOutcome {
    let update = match form.validate() {
        Ok(update) => update,
        Err(errors) => return MutationOutcome::Invalid(errors),
    };
    let Some(ticket) = screen.begin_mutation(user_id) else {
        return MutationOutcome::Busy;
    };

    let result = api.update_user(user_id, &update).await;
    let outcome = screen.finish_mutation(ticket, result, "Update failed", |users, ()| {
        apply_user_edit(users, user_id, &update)
    });
    if outcome.is_applied() {
        info!(user_id, username = %update.username, "User updated");
    }
    outcome
}
