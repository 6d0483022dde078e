use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::expense::{AmountInput, Expense, ExpenseInput, SUGGESTED_CATEGORIES};

/// The fields of the add and edit expense forms, as submitted.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub email: String,
}

impl ExpenseForm {
    /// Fill the form with the current values of `expense`.
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            description: expense.description.clone(),
            amount: expense.amount.to_string(),
            category: expense.category.clone(),
            email: expense.email.clone().unwrap_or_default(),
        }
    }

    /// The submitted values as API input, every field counts as supplied.
    pub fn to_input(&self) -> ExpenseInput {
        ExpenseInput {
            description: Some(self.description.clone()),
            amount: Some(AmountInput::Text(self.amount.clone())),
            category: Some(self.category.clone()),
            email: Some(self.email.clone()),
        }
    }
}

pub fn expense_form(
    action: &str,
    form: &ExpenseForm,
    submit_label: &str,
    error_message: Option<&str>,
) -> Markup {
    let custom_category = !form.category.is_empty()
        && !SUGGESTED_CATEGORIES.contains(&form.category.as_str());

    html! {
        form method="post" action=(action) class="card"
        {
            label for="description" { "Description" }
            input
                type="text"
                name="description"
                id="description"
                placeholder="What did you spend on?"
                required
                value=(form.description);

            label for="amount" { "Amount" }
            input
                type="number"
                name="amount"
                id="amount"
                step="0.01"
                min="0.01"
                placeholder="0.00"
                required
                value=(form.amount);

            label for="category" { "Category" }
            select name="category" id="category" required
            {
                option value="" disabled selected[form.category.is_empty()] { "Select a category" }

                @for category in SUGGESTED_CATEGORIES {
                    option value=(category) selected[form.category == category] { (category) }
                }

                @if custom_category {
                    option value=(form.category) selected { (form.category) }
                }
            }

            label for="email" { "Email (optional)" }
            input
                type="email"
                name="email"
                id="email"
                placeholder="you@example.com"
                value=(form.email);

            @if let Some(error_message) = error_message {
                p class="error" { (error_message) }
            }

            button type="submit" { (submit_label) }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::datetime;
    use uuid::Uuid;

    use super::{ExpenseForm, expense_form};
    use crate::expense::{AmountInput, Expense};

    #[test]
    fn form_values_become_input() {
        let form = ExpenseForm {
            description: "Coffee".to_owned(),
            amount: "4.50".to_owned(),
            category: "Food".to_owned(),
            email: String::new(),
        };

        let input = form.to_input();

        assert_eq!(input.amount, Some(AmountInput::Text("4.50".to_owned())));
        assert_eq!(input.into_new_expense().unwrap().email, None);
    }

    #[test]
    fn form_is_filled_from_expense() {
        let expense = Expense {
            id: Uuid::new_v4(),
            description: "Bus".to_owned(),
            amount: 2.5,
            category: "Transport".to_owned(),
            email: Some("me@example.com".to_owned()),
            date: datetime!(2025-10-05 12:00 UTC),
        };

        let form = ExpenseForm::from_expense(&expense);

        assert_eq!(form.amount, "2.5");
        assert_eq!(form.email, "me@example.com");
    }

    #[test]
    fn form_selects_current_category() {
        let form = ExpenseForm {
            category: "Bills".to_owned(),
            ..Default::default()
        };

        let html = Html::parse_fragment(&expense_form("/expenses", &form, "Add", None).into_string());
        let selected = html
            .select(&Selector::parse("option[selected]").unwrap())
            .map(|option| option.value().attr("value").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();

        assert_eq!(selected, vec!["Bills".to_owned()]);
    }

    #[test]
    fn form_keeps_custom_category() {
        let form = ExpenseForm {
            category: "Gifts".to_owned(),
            ..Default::default()
        };

        let html = Html::parse_fragment(&expense_form("/expenses", &form, "Add", None).into_string());
        let options = html
            .select(&Selector::parse("option").unwrap())
            .count();

        assert_eq!(options, 7);
    }
}
