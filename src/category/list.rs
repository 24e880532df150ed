//! Category management page and the JSON category listing.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        delete_button,
    },
    navigation::NavBar,
};

/// The state needed for listing categories.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    /// The database connection for listing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category management page.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(categories_view(&categories).into_response())
}

/// List the user's categories as JSON, sorted by name.
pub async fn get_categories_json(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response();
        }
    };

    match get_categories(user_id, &connection) {
        Ok(categories) => Json(categories).into_response(),
        Err(error) => error.into_json_response(),
    }
}

fn new_category_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::CATEGORIES)
            hx-target-error="#alert-container"
            class="flex items-end gap-2 w-full max-w-md"
        {
            div class="grow"
            {
                label for="name" class=(FORM_LABEL_STYLE) { "New category" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Groceries"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="w-24"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add" }
            }
        }
    }
}

fn category_row(category: &Category) -> Markup {
    let category_url = endpoints::format_endpoint(endpoints::CATEGORY, category.id);
    let confirm_message = format!(
        "Are you sure you want to delete '{}'? Its transactions and goals will be deleted too.",
        category.name
    );

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (category.name) }
            }

            td class=(TABLE_CELL_STYLE)
            {
                form
                    hx-put=(category_url)
                    hx-target-error="#alert-container"
                    class="flex gap-2"
                {
                    input
                        type="text"
                        name="name"
                        value=(category.name)
                        aria-label="New name"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    button type="submit" class="underline text-blue-600 dark:text-blue-500"
                    {
                        "Rename"
                    }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                (delete_button(&category_url, &confirm_message, "closest tr"))
            }
        }
    }
}

fn categories_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-3xl"
            {
                h1 class="text-xl font-bold" { "Categories" }

                (new_category_form())

                @if categories.is_empty() {
                    p { "No categories yet. Add one above to start recording transactions." }
                } @else {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Rename" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for category in categories {
                                (category_row(category))
                            }
                        }
                    }
                }
            }
        }
    );

    base("Categories", &[], &content)
}
