//! Page shell: header navigation, footer, and placeholder notices.

use leptos::prelude::*;

pub const TITLE: &str = "Who is in the Hubb?";

/// Top-level navigation entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Me,
    Home,
    Stats,
    MyStats,
}

impl NavItem {
    pub const ALL: [Self; 4] = [Self::Me, Self::Home, Self::Stats, Self::MyStats];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Me => "ME",
            Self::Home => "SMURFS IN THE HUBB",
            Self::Stats => "STATS",
            Self::MyStats => "MY STATS",
        }
    }

    #[must_use]
    pub fn href(self) -> &'static str {
        match self {
            Self::Me => "/me",
            Self::Home => "/",
            Self::Stats => "/stats/study-year",
            Self::MyStats => "/user/me",
        }
    }

    /// Whether this entry is highlighted while viewing `path`.
    #[must_use]
    pub fn is_active(self, path: &str) -> bool {
        match self {
            Self::Me => path == "/me",
            Self::Home => path == "/",
            Self::Stats => path.starts_with("/stats/"),
            Self::MyStats => path.starts_with("/user/"),
        }
    }
}

/// Site title and navigation, with the entry for `path` marked active.
#[component]
pub fn Header(path: String) -> impl IntoView {
    let items = NavItem::ALL
        .into_iter()
        .map(|item| {
            let is_active = item.is_active(&path);
            view! {
                <li class:active=is_active>
                    <a href=item.href()>{item.label()}</a>
                </li>
            }
        })
        .collect::<Vec<_>>();

    view! {
        <header>
            <h1><a href="/">{TITLE}</a></h1>
            <nav><ul class="menu">{items}</ul></nav>
        </header>
    }
}

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer>
            <span>
                "Created with 💙 by "
                <a href="https://github.com/rosengrenen">"🌹 Rosen 🌹"</a>
                " & "
                <a href="https://github.com/viddem">"✌ Vidde ✌"</a>
            </span>
        </footer>
    }
}

/// An error message in place of page content.
#[component]
pub fn ErrorNotice(message: &'static str) -> impl IntoView {
    view! { <div class="error">{message}</div> }
}

pub const FETCH_FAILED: &str = "Something went wrong while loading data. Please try again later.";
pub const NOT_FOUND: &str = "Page not found";

/// Shown while a page is waiting on data it does not have yet.
#[component]
pub fn Loading() -> impl IntoView {
    view! { <div class="loading">"Loading data..."</div> }
}

/// Render a complete HTML document with `body` in the main area and the nav
/// entry for `path` marked.
#[must_use]
pub fn page(path: &str, body: impl IntoView) -> String {
    let path = path.to_string();
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{TITLE}</title>
            </head>
            <body>
                <Header path=path/>
                <main>{body}</main>
                <Footer/>
            </body>
        </html>
    }
    .to_html()
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
