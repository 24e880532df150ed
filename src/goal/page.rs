//! The page for viewing and editing a month's spending goals.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, CategoryId, get_categories},
    endpoints,
    goal::core::get_goals_for_period,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, dollar_input_styles, link,
    },
    navigation::NavBar,
    period::{Period, PeriodQuery},
};

/// The state needed for the goals page.
#[derive(Debug, Clone)]
pub struct GoalsPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading categories and goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the goals form for the requested month, defaulting to the current month.
pub async fn get_goals_page(
    State(state): State<GoalsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    let period = query.resolve(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let goals = get_goals_for_period(user_id, period, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve goals: {error}"))?;

    Ok(goals_view(period, &categories, &goals).into_response())
}

fn period_picker(period: Period) -> Markup {
    html! {
        form method="get" action=(endpoints::GOALS) class="flex items-end gap-2 w-full"
        {
            div class="grow"
            {
                label for="period-month" class=(FORM_LABEL_STYLE) { "Month" }
                input
                    id="period-month"
                    type="number"
                    name="month"
                    min="1"
                    max="12"
                    value=(period.month)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="grow"
            {
                label for="period-year" class=(FORM_LABEL_STYLE) { "Year" }
                input
                    id="period-year"
                    type="number"
                    name="year"
                    value=(period.year)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="w-24"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Show" }
            }
        }
    }
}

fn goals_view(
    period: Period,
    categories: &[Category],
    goals: &BTreeMap<CategoryId, Decimal>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-xl"
            {
                h1 class="text-xl font-bold" { "Spending goals for " (period.month) "/" (period.year) }

                (period_picker(period))

                @if categories.is_empty() {
                    p
                    {
                        "Goals are set per category. "
                        (link(endpoints::CATEGORIES_VIEW, "Create a category"))
                        " first."
                    }
                } @else {
                    form
                        hx-post=(endpoints::GOALS)
                        hx-target-error="#alert-container"
                        class="w-full space-y-4"
                    {
                        input type="hidden" name="month" value=(period.month);
                        input type="hidden" name="year" value=(period.year);

                        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Goal" }
                                }
                            }

                            tbody
                            {
                                @for category in categories {
                                    @let input_id = format!("goal-{}", category.id);

                                    tr class=(TABLE_ROW_STYLE)
                                    {
                                        td class=(TABLE_CELL_STYLE)
                                        {
                                            label for=(input_id) { (category.name) }
                                        }
                                        td class=(TABLE_CELL_STYLE)
                                        {
                                            div class="input-wrapper w-full"
                                            {
                                                input
                                                    id=(input_id)
                                                    type="number"
                                                    step="0.01"
                                                    min="0"
                                                    placeholder="0.00"
                                                    name={ "goals[" (category.id) "]" }
                                                    value=[goals.get(&category.id)]
                                                    class=(FORM_TEXT_INPUT_STYLE);
                                            }
                                        }
                                    }
                                }
                            }
                        }

                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Goals" }
                    }
                }
            }
        }
    };

    base("Goals", &[dollar_input_styles()], &content)
}
