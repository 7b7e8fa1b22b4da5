//! Alert boxes for displaying success, warning and error messages to users.

use maud::{Markup, html};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    Success,
    Warning,
    Error,
}

/// A message box with a short headline and optional details.
#[derive(Debug, Clone)]
pub struct Alert<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> Alert<'a> {
    /// Create a new success alert
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new warning alert
    pub fn warning(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Warning,
            message,
            details,
        }
    }

    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }

    pub fn into_html(self) -> Markup {
        let style = match self.alert_type {
            AlertType::Success => {
                "p-4 mb-4 text-sm rounded-lg text-green-800 bg-green-50 \
                dark:bg-gray-800 dark:text-green-400"
            }
            AlertType::Warning => {
                "p-4 mb-4 text-sm rounded-lg text-yellow-800 bg-yellow-50 \
                dark:bg-gray-800 dark:text-yellow-300"
            }
            AlertType::Error => {
                "p-4 mb-4 text-sm rounded-lg text-red-800 bg-red-50 \
                dark:bg-gray-800 dark:text-red-400"
            }
        };

        html! {
            div class=(style) role="alert" data-alert-type=(format!("{:?}", self.alert_type).to_lowercase())
            {
                span class="font-medium" { (self.message) }

                @if !self.details.is_empty() {
                    " " (self.details)
                }
            }
        }
    }
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn renders_message_and_details() {
        let markup = Alert::warning("Groceries", "is over budget by $20.00").into_html();
        let html = Html::parse_fragment(&markup.into_string());

        let alert = html
            .select(&Selector::parse("div[role=alert]").unwrap())
            .next()
            .expect("No alert found");

        assert_eq!(alert.value().attr("data-alert-type"), Some("warning"));
        let text = alert.text().collect::<String>();
        assert_eq!(text, "Groceries is over budget by $20.00");
    }

    #[test]
    fn omits_empty_details() {
        let markup = Alert::error("Something went wrong", "").into_html();
        let html = Html::parse_fragment(&markup.into_string());

        let text = html.root_element().text().collect::<String>();
        assert_eq!(text, "Something went wrong");
    }
}
