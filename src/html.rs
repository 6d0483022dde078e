//! Shared markup for the server-rendered pages.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, html};
use numfmt::{Formatter, Precision};
use time::{OffsetDateTime, macros::format_description};

use crate::endpoints;

const STYLE: &str = r#"
body {
    font-family: system-ui, sans-serif;
    max-width: 56rem;
    margin: 0 auto;
    padding: 1rem;
    color: #1f2937;
    background: #f9fafb;
}
.card {
    background: #fff;
    border: 1px solid #e5e7eb;
    border-radius: 0.5rem;
    padding: 1rem;
    margin-bottom: 1rem;
}
.total { font-size: 2rem; font-weight: 700; }
form.inline { display: inline; }
label { display: block; margin-top: 0.5rem; }
input, select { padding: 0.4rem; width: 100%; box-sizing: border-box; }
button { margin-top: 0.75rem; padding: 0.4rem 1rem; cursor: pointer; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid #e5e7eb; }
.badge {
    display: inline-block;
    padding: 0.1rem 0.6rem;
    border-radius: 9999px;
    background: #dbeafe;
    color: #1e40af;
    font-size: 0.8rem;
}
.error { color: #b91c1c; }
.notice { color: #047857; }
"#;

pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Expense Tracker" }
                style { (STYLE) }
            }

            body
            {
                (content)
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str) -> Markup {
    let content = html!(
        section class="card"
        {
            h1 { (header) }
            p { (description) }
            a href=(endpoints::EXPENSES_VIEW) { "Back to expenses" }
        }
    );

    base(title, &content)
}

pub fn format_currency(number: f64) -> String {
    if !number.is_finite() {
        return "$-".to_owned();
    }

    static POSITIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .ok()
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
    });

    let Some(positive_fmt) = positive_fmt else {
        return format!("${number:.2}");
    };

    if number <= 0.0 {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        return "$0.00".to_owned();
    }

    let mut formatted_string = positive_fmt.fmt_string(number);

    // numfmt omits trailing zeros, e.g. "12.30" is rendered as "12.3" and "12.00" as "12".
    match formatted_string.rfind('.') {
        None => formatted_string.push_str(".00"),
        Some(dot) if formatted_string.len() - dot == 2 => formatted_string.push('0'),
        Some(_) => {}
    }

    formatted_string
}

/// Format a timestamp as a date for display, e.g. "2025-10-05".
pub fn format_date(date: OffsetDateTime) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.date().to_string())
}
