//! Budget notices for categories that are over budget or earning less than planned.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    alert::Alert,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    report::{BudgetReport, get_budget_report},
};

/// What a budget notice is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// More was spent in an expense category than planned.
    OverBudget,
    /// Less was earned in an income category than planned.
    IncomeBelowPlan,
}

/// A warning about one category of the budget report.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub category_name: String,
    pub planned: f64,
    pub actual: f64,
}

impl Notice {
    /// The headline shown for the notice.
    pub fn message(&self) -> String {
        match self.kind {
            NoticeKind::OverBudget => format!("{} is over budget", self.category_name),
            NoticeKind::IncomeBelowPlan => format!("{} income is below plan", self.category_name),
        }
    }

    pub fn details(&self) -> String {
        match self.kind {
            NoticeKind::OverBudget => format!(
                "Spent {} of {} planned ({} over).",
                format_currency(self.actual),
                format_currency(self.planned),
                format_currency(self.actual - self.planned)
            ),
            NoticeKind::IncomeBelowPlan => format!(
                "Earned {} of {} planned ({} short).",
                format_currency(self.actual),
                format_currency(self.planned),
                format_currency(self.planned - self.actual)
            ),
        }
    }
}

/// Collect the notices for `report`, expenses first.
pub fn budget_notices(report: &BudgetReport) -> Vec<Notice> {
    let over_budget = report
        .expenses
        .rows
        .iter()
        .filter(|row| row.actual > row.planned)
        .map(|row| Notice {
            kind: NoticeKind::OverBudget,
            category_name: row.name.clone(),
            planned: row.planned,
            actual: row.actual,
        });

    let income_below_plan = report
        .income
        .rows
        .iter()
        .filter(|row| row.planned > 0.0 && row.actual < row.planned)
        .map(|row| Notice {
            kind: NoticeKind::IncomeBelowPlan,
            category_name: row.name.clone(),
            planned: row.planned,
            actual: row.actual,
        });

    over_budget.chain(income_below_plan).collect()
}

/// The state needed for the notifications page.
#[derive(Debug, Clone)]
pub struct NotificationsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NotificationsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the user's budget notices.
pub async fn get_notifications_page(
    State(state): State<NotificationsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let report = get_budget_report(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not build budget report: {error}"))?;

    Ok(notifications_view(&budget_notices(&report)).into_response())
}

fn notice_alert(notice: &Notice) -> Markup {
    let message = notice.message();
    let details = notice.details();

    match notice.kind {
        NoticeKind::OverBudget => Alert::error(&message, &details).into_html(),
        NoticeKind::IncomeBelowPlan => Alert::warning(&message, &details).into_html(),
    }
}

fn notifications_view(notices: &[Notice]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NOTIFICATIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="space-y-4 lg:max-w-3xl lg:w-full lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Notifications" }

                    a href=(endpoints::MASTER_TABLE_VIEW) class=(LINK_STYLE) { "View Master Table" }
                }

                @if notices.is_empty() {
                    (Alert::success("All on track.", "No categories are over budget or below plan.").into_html())
                } @else {
                    ul id="notices" class="space-y-2"
                    {
                        @for notice in notices {
                            li { (notice_alert(notice)) }
                        }
                    }
                }
            }
        }
    };

    base("Notifications", &[], &content)
}
