//! The browser pages for adding, editing and deleting expenses, for saving
//! the total and for looking up the expenses saved for an email address.
//!
//! Every form posts back to the server, which redirects to the expense list on
//! success so the list and the total are always rebuilt from the database.

mod edit_page;
mod error_page;
mod expenses_page;
mod form;
mod previous_page;
mod state;

pub use edit_page::{get_edit_expense_page, post_edit_expense};
pub use expenses_page::{
    get_expenses_page, post_create_expense, post_delete_expense, post_save_total,
};
pub use previous_page::get_previous_expenses_page;
pub use state::TrackerState;
