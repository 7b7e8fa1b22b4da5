//! Summary cards for the balance and the income and expense totals.

use maud::{Markup, html};

use crate::{
    html::{TABLE_CELL_GREEN_STYLE, TABLE_CELL_RED_STYLE, amount_color_class, format_currency},
    transaction::Totals,
};

/// A single figure with a label, e.g. "Balance $1,234.00".
fn summary_card(id: &str, label: &str, amount: f64, amount_style: &str) -> Markup {
    html! {
        div
            id=(id)
            class="bg-white dark:bg-gray-800 border border-gray-200
                   dark:border-gray-700 rounded-lg p-4 shadow-md
                   flex flex-col justify-between"
        {
            h3 class="text-sm font-medium text-gray-600 dark:text-gray-400" { (label) }

            p class={"text-2xl font-bold tabular-nums " (amount_style)}
            {
                (format_currency(amount))
            }
        }
    }
}

/// Renders the balance, total income and total expense cards.
pub(super) fn summary_cards_view(balance: f64, totals: &Totals) -> Markup {
    html! {
        section class="w-full grid grid-cols-1 sm:grid-cols-3 gap-4"
        {
            (summary_card("balance", "Balance", balance, amount_color_class(balance)))
            (summary_card("total-income", "Income", totals.income, TABLE_CELL_GREEN_STYLE))
            (summary_card("total-expenses", "Expenses", totals.expenses, TABLE_CELL_RED_STYLE))
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::transaction::Totals;

    use super::summary_cards_view;

    fn card_amount(html: &Html, id: &str) -> String {
        let selector = Selector::parse(&format!("#{id} p")).unwrap();

        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("missing card {id}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[test]
    fn shows_balance_and_totals() {
        let totals = Totals {
            income: 1500.0,
            expenses: 1750.25,
        };

        let html = Html::parse_fragment(&summary_cards_view(-250.25, &totals).into_string());

        assert_eq!(card_amount(&html, "balance"), "-$250.25");
        assert_eq!(card_amount(&html, "total-income"), "$1,500.00");
        assert_eq!(card_amount(&html, "total-expenses"), "$1,750.25");
    }
}
