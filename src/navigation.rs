//! The navigation bar shown at the top of every page behind the log-in.
//!
//! On small screens the same links move to a bar at the bottom of the screen, where the less used
//! pages are tucked into a "More" menu.

use maud::{Markup, html};

use crate::endpoints;

/// Where a link sits in the mobile layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Always visible in the bottom bar.
    Primary,
    /// Listed under "More".
    Secondary,
}

const LINKS: [(&str, &str, Placement); 6] = [
    (endpoints::TRANSACTION, "Add", Placement::Primary),
    (endpoints::TRANSACTIONS_VIEW, "Transactions", Placement::Primary),
    (endpoints::STATS, "Stats", Placement::Primary),
    (endpoints::CATEGORIES_VIEW, "Categories", Placement::Secondary),
    (endpoints::GOALS, "Goals", Placement::Secondary),
    (endpoints::LOG_OUT, "Log out", Placement::Secondary),
];

const TOP_LINK_STYLE: &str = "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100 \
    lg:hover:bg-transparent lg:hover:text-blue-700 lg:p-0 dark:text-white \
    lg:dark:hover:text-blue-500 dark:hover:bg-gray-700";
const TOP_LINK_CURRENT_STYLE: &str = "block py-2 px-3 text-white bg-blue-700 rounded-sm \
    lg:bg-transparent lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500";
const BOTTOM_LINK_STYLE: &str = "flex w-full items-center justify-center rounded-lg px-2.5 py-2 \
    text-xs font-semibold text-gray-600 hover:text-blue-700 dark:text-gray-300";
const BOTTOM_LINK_CURRENT_STYLE: &str = "flex w-full items-center justify-center rounded-lg \
    px-2.5 py-2 text-xs font-semibold bg-blue-50 text-blue-700 dark:bg-blue-900/30 \
    dark:text-blue-200";

/// The navigation bar for the page served at `active_endpoint`.
pub struct NavBar<'a> {
    active_endpoint: &'a str,
}

impl<'a> NavBar<'a> {
    /// The link whose URL equals `active_endpoint` is highlighted. Log out is never highlighted.
    pub fn new(active_endpoint: &'a str) -> Self {
        Self { active_endpoint }
    }

    fn is_current(&self, url: &str) -> bool {
        url != endpoints::LOG_OUT && url == self.active_endpoint
    }

    pub fn into_html(self) -> Markup {
        let more_is_current = LINKS
            .iter()
            .any(|(url, _, placement)| *placement == Placement::Secondary && self.is_current(url));

        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::TRANSACTION)
                        class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "Spendwise"
                    }

                    ul
                        class="hidden lg:flex font-medium flex-row space-x-8 rtl:space-x-reverse"
                    {
                        @for (url, title, _) in LINKS {
                            @let current = self.is_current(url);

                            li
                            {
                                a
                                    href=(url)
                                    class=(if current { TOP_LINK_CURRENT_STYLE } else { TOP_LINK_STYLE })
                                    aria-current=[current.then_some("page")]
                                {
                                    (title)
                                }
                            }
                        }
                    }
                }
            }

            nav
                class="fixed inset-x-0 bottom-0 z-40 lg:hidden border-t border-gray-200
                bg-white/95 dark:border-gray-700 dark:bg-gray-900/95"
            {
                ul class="grid grid-cols-4 gap-2 px-4 py-3" aria-label="Primary"
                {
                    @for (url, title, placement) in LINKS {
                        @if placement == Placement::Primary {
                            @let current = self.is_current(url);

                            li
                            {
                                a
                                    href=(url)
                                    class=(if current { BOTTOM_LINK_CURRENT_STYLE } else { BOTTOM_LINK_STYLE })
                                {
                                    (title)
                                }
                            }
                        }
                    }

                    li
                    {
                        details class="relative"
                        {
                            summary
                                class={
                                    "list-none cursor-pointer "
                                    (if more_is_current { BOTTOM_LINK_CURRENT_STYLE } else { BOTTOM_LINK_STYLE })
                                }
                            {
                                "More"
                            }

                            ul
                                class="absolute bottom-full right-0 mb-3 w-40 rounded-xl border
                                border-gray-200 bg-white p-2 shadow-xl flex flex-col gap-1
                                text-sm dark:border-gray-700 dark:bg-gray-900"
                            {
                                @for (url, title, placement) in LINKS {
                                    @if placement == Placement::Secondary {
                                        li
                                        {
                                            a
                                                href=(url)
                                                class="block rounded-lg px-3 py-2 text-gray-700
                                                hover:bg-gray-100 dark:text-gray-200"
                                            {
                                                (title)
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        )
    }
}
