//! The stats page comparing a month's spending against its goals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    http::{HeaderMap, Uri},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    AppState, Error,
    auth::{UserID, wants_json},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    period::{Period, PeriodQuery},
    stats::{
        chart::{CHART_ID, chart_script, spend_vs_goal_chart},
        core::{StatsSummary, get_stats_summary},
    },
};

/// The ECharts build the chart script expects.
const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// The state needed for the stats page.
#[derive(Debug, Clone)]
pub struct StatsPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading transactions and goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for StatsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the month's spend vs goal summary, or return it as JSON for API callers.
pub async fn get_stats_page(
    State(state): State<StatsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PeriodQuery>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let as_json = wants_json(uri.query(), &headers);

    let result = query
        .resolve(&state.local_timezone)
        .and_then(|period| {
            let connection = state
                .db_connection
                .lock()
                .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
                .map_err(|_| Error::DatabaseLockError)?;

            get_stats_summary(user_id, period, &connection)
        });

    match (result, as_json) {
        (Ok(summary), true) => Json(summary).into_response(),
        (Ok(summary), false) => stats_view(&summary).into_response(),
        (Err(error), true) => error.into_json_response(),
        (Err(error), false) => error.into_response(),
    }
}

fn period_picker(month: u8, year: i32) -> Markup {
    html! {
        form method="get" action=(endpoints::STATS) class="flex items-end gap-2 w-full"
        {
            div class="grow"
            {
                label for="stats-month" class=(FORM_LABEL_STYLE) { "Month" }
                input
                    id="stats-month"
                    type="number"
                    name="month"
                    min="1"
                    max="12"
                    value=(month)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="grow"
            {
                label for="stats-year" class=(FORM_LABEL_STYLE) { "Year" }
                input
                    id="stats-year"
                    type="number"
                    name="year"
                    value=(year)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="w-24"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Show" }
            }
        }
    }
}

fn amount_cell(amount: Option<&Decimal>) -> Markup {
    html! {
        td class=(TABLE_CELL_STYLE)
        {
            @match amount {
                Some(amount) => (format_currency(*amount)),
                None => "-",
            }
        }
    }
}

fn stats_view(summary: &StatsSummary) -> Markup {
    let nav_bar = NavBar::new(endpoints::STATS).into_html();
    let period = Period {
        month: summary.month,
        year: summary.year,
    };

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-4xl"
            {
                h1 class="text-xl font-bold" { "Stats for " (period.month) "/" (period.year) }

                (period_picker(period.month, period.year))

                @if summary.categories.is_empty() {
                    p { "Nothing to show yet. Add some categories and transactions first." }
                } @else {
                    div id=(CHART_ID) class="min-h-[380px] w-full rounded dark:bg-gray-100" {}

                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Spent" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Goal" }
                            }
                        }

                        tbody
                        {
                            @for name in &summary.categories {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (name) }
                                    (amount_cell(summary.spending_by_category.get(name)))
                                    (amount_cell(summary.goals_by_category.get(name)))
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    let head_elements = if summary.categories.is_empty() {
        Vec::new()
    } else {
        vec![
            HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
            chart_script(&spend_vs_goal_chart(summary)),
        ]
    };

    base("Stats", &head_elements, &content)
}

#[cfg(test)]
mod stats_page_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{
        Extension,
        extract::{Query, State},
        http::{HeaderMap, HeaderValue, StatusCode, Uri, header::ACCEPT},
    };
    use rust_decimal::Decimal;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        auth::UserID,
        category::{CategoryName, create_category, get_categories},
        goal::{RawGoalEntry, upsert_goals},
        period::{Period, PeriodQuery},
        stats::chart::CHART_ID,
        test_utils::{
            assert_content_type, assert_valid_html, create_test_user, get_test_connection,
            parse_html_document,
        },
        transaction::{NewTransaction, create_transaction},
    };

    use super::{StatsPageState, get_stats_page};

    fn get_state() -> (StatsPageState, UserID) {
        let mut conn = get_test_connection();
        let user_id = create_test_user("test@example.com", &conn).id;
        let food = create_category(CategoryName::new_unchecked("Food"), user_id, &conn).unwrap();
        create_category(CategoryName::new_unchecked("Rent"), user_id, &conn).unwrap();

        for (amount, date) in [("30", date!(2024 - 03 - 02)), ("50", date!(2024 - 03 - 20))] {
            let transaction = NewTransaction {
                category_id: food.id,
                amount: Decimal::from_str(amount).unwrap(),
                date,
                comment: None,
            };
            create_transaction(user_id, &transaction, &conn).unwrap();
        }

        upsert_goals(
            user_id,
            Period {
                month: 3,
                year: 2024,
            },
            &[RawGoalEntry::new(&food.id.to_string(), "100")],
            &mut conn,
        )
        .unwrap();

        (
            StatsPageState {
                local_timezone: "Etc/UTC".to_owned(),
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user_id,
        )
    }

    fn march_2024() -> Query<PeriodQuery> {
        Query(PeriodQuery {
            month: Some("3".to_owned()),
            year: Some("2024".to_owned()),
        })
    }

    #[tokio::test]
    async fn json_summary_for_period() {
        let (state, user_id) = get_state();

        let response = get_stats_page(
            State(state),
            Extension(user_id),
            march_2024(),
            Uri::from_static("/stats?month=3&year=2024&api=true"),
            HeaderMap::new(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["month"], 3);
        assert_eq!(json["year"], 2024);
        assert_eq!(
            Decimal::from_str(json["spendingByCategory"]["Food"].as_str().unwrap()).unwrap(),
            Decimal::new(80, 0)
        );
        assert_eq!(json["goalsByCategory"]["Food"], "100");
        assert_eq!(json["categories"], serde_json::json!(["Food", "Rent"]));
    }

    #[tokio::test]
    async fn accept_header_selects_json() {
        let (state, user_id) = get_state();
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let response = get_stats_page(
            State(state),
            Extension(user_id),
            march_2024(),
            Uri::from_static("/stats?month=3&year=2024"),
            headers,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "application/json");
    }

    #[tokio::test]
    async fn invalid_period_is_bad_request_for_json() {
        let (state, user_id) = get_state();

        let response = get_stats_page(
            State(state),
            Extension(user_id),
            Query(PeriodQuery {
                month: Some("13".to_owned()),
                year: None,
            }),
            Uri::from_static("/stats?month=13&api=true"),
            HeaderMap::new(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Invalid month or year");
    }

    #[tokio::test]
    async fn html_shows_chart_and_table() {
        let (state, user_id) = get_state();

        let response = get_stats_page(
            State(state),
            Extension(user_id),
            march_2024(),
            Uri::from_static("/stats?month=3&year=2024"),
            HeaderMap::new(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let chart_selector = Selector::parse(&format!("#{CHART_ID}")).unwrap();
        assert!(html.select(&chart_selector).next().is_some());

        let rows: Vec<Vec<String>> = html
            .select(&Selector::parse("tbody tr").unwrap())
            .map(|row| {
                row.select(&Selector::parse("td").unwrap())
                    .map(|cell| cell.text().collect::<String>().trim().to_owned())
                    .collect()
            })
            .collect();
        assert_eq!(
            rows,
            [
                ["Food", "$80.00", "$100.00"],
                ["Rent", "-", "-"],
            ]
        );
    }

    #[tokio::test]
    async fn overflowing_total_is_an_error_and_later_requests_succeed() {
        let (state, user_id) = get_state();
        {
            let conn = state.db_connection.lock().unwrap();
            let food = get_categories(user_id, &conn).unwrap().remove(0);
            for _ in 0..2 {
                let transaction = NewTransaction {
                    category_id: food.id,
                    amount: Decimal::MAX,
                    date: date!(2024 - 04 - 10),
                    comment: None,
                };
                create_transaction(user_id, &transaction, &conn).unwrap();
            }
        }

        let response = get_stats_page(
            State(state.clone()),
            Extension(user_id),
            Query(PeriodQuery {
                month: Some("4".to_owned()),
                year: Some("2024".to_owned()),
            }),
            Uri::from_static("/stats?month=4&year=2024&api=true"),
            HeaderMap::new(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!state.db_connection.is_poisoned());

        let response = get_stats_page(
            State(state),
            Extension(user_id),
            march_2024(),
            Uri::from_static("/stats?month=3&year=2024&api=true"),
            HeaderMap::new(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
