//! Expenses: the domain types, database queries and the JSON API endpoints.

mod create_endpoint;
mod db;
mod delete_endpoint;
mod domain;
mod edit_endpoint;
mod export_endpoint;
mod get_endpoint;
mod list_endpoint;
mod state;
mod total;

pub use create_endpoint::create_expense_endpoint;
pub use db::{
    count_expenses, create_expense, create_expense_table, delete_expense, get_expense,
    get_expenses, get_expenses_by_category, get_expenses_by_email, update_expense,
};
pub use delete_endpoint::delete_expense_endpoint;
pub use domain::{
    AmountInput, Expense, ExpenseId, ExpenseInput, ExpensePatch, MAX_AMOUNT, NewExpense,
    SUGGESTED_CATEGORIES, parse_expense_id,
};
pub use edit_endpoint::update_expense_endpoint;
pub use export_endpoint::export_expenses_endpoint;
pub use get_endpoint::{get_expense_endpoint, get_expenses_by_category_endpoint};
pub use list_endpoint::list_expenses_endpoint;
pub use state::ExpenseState;
pub use total::total_expense;
