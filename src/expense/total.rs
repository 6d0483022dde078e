use crate::expense::Expense;

/// The sum of the expense amounts, rounded to two decimal places.
pub fn total_expense(expenses: &[Expense]) -> f64 {
    let sum: f64 = expenses.iter().map(|expense| expense.amount).sum();

    (sum * 100.0).round() / 100.0
}
