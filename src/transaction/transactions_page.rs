//! The page for listing and filtering a user's transactions, also available as JSON.

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
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{UserID, wants_json},
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        delete_button, format_currency, link,
    },
    money::sum_amounts,
    navigation::NavBar,
    transaction::core::{Transaction, TransactionFilter, get_transactions},
};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for querying transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw query string for the transactions page.
///
/// Values that are missing, blank or not integers are ignored rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// The month to list, 1 to 12.
    pub month: Option<String>,
    /// The year to list.
    pub year: Option<String>,
    /// The ID of the category to list.
    pub category: Option<String>,
}

impl TransactionsQuery {
    fn to_filter(&self) -> TransactionFilter {
        TransactionFilter {
            month: parse_filter(self.month.as_deref()),
            year: parse_filter(self.year.as_deref()),
            category_id: parse_filter(self.category.as_deref()),
        }
    }
}

/// The JSON body for API callers.
#[derive(Debug, Serialize)]
struct TransactionsJson {
    transactions: Vec<Transaction>,
}

fn parse_filter(value: Option<&str>) -> Option<i64> {
    value.and_then(|value| value.trim().parse().ok())
}

/// Render the user's transactions, or list them as JSON for API callers.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsQuery>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let filter = query.to_filter();
    let as_json = wants_json(uri.query(), &headers);

    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            let transactions = get_transactions(user_id, filter, &connection)?;
            let categories = if as_json {
                Vec::new()
            } else {
                get_categories(user_id, &connection)?
            };

            Ok((transactions, categories))
        });

    match (result, as_json) {
        (Ok((transactions, _)), true) => Json(TransactionsJson { transactions }).into_response(),
        (Ok((transactions, categories)), false) => {
            match sum_amounts(transactions.iter().map(|transaction| transaction.amount)) {
                Ok(total) => transactions_view(&transactions, &categories, filter, total)
                    .into_response(),
                Err(error) => error.into_response(),
            }
        }
        (Err(error), true) => error.into_json_response(),
        (Err(error), false) => {
            tracing::error!("Could not load transactions for user {user_id}: {error}");
            error.into_response()
        }
    }
}

fn filter_form(categories: &[Category], filter: TransactionFilter) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="grid grid-cols-2 lg:grid-cols-4 gap-2 items-end w-full"
        {
            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                select name="month" id="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All months" }

                    @for (index, name) in MONTH_NAMES.iter().enumerate() {
                        @let month = index as i64 + 1;
                        option value=(month) selected[filter.month == Some(month)] { (name) }
                    }
                }
            }

            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                input
                    type="number"
                    name="year"
                    id="year"
                    placeholder="All years"
                    value=[filter.year]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All categories" }

                    @for category in categories {
                        option
                            value=(category.id)
                            selected[filter.category_id == Some(category.id)]
                        {
                            (category.name)
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the {} transaction on {}?",
        format_currency(transaction.amount),
        transaction.date
    );

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { time datetime=(transaction.date) { (transaction.date) } }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (transaction.category_name) }
            }
            td class={ (TABLE_CELL_STYLE) " text-right" } { (format_currency(transaction.amount)) }
            td class=(TABLE_CELL_STYLE) { (transaction.comment.as_deref().unwrap_or_default()) }
            td class=(TABLE_CELL_STYLE)
            {
                (delete_button(&delete_url, &confirm_message, "closest tr"))
            }
        }
    }
}

fn transactions_view(
    transactions: &[Transaction],
    categories: &[Category],
    filter: TransactionFilter,
    total: Decimal,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    (link(endpoints::TRANSACTION, "Add Transaction"))
                }

                (filter_form(categories, filter))

                @if transactions.is_empty() {
                    p { "No transactions match these filters." }
                } @else {
                    p class="font-semibold" { "Total: " (format_currency(total)) }

                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Comment" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction))
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}
