//! Webview app drawing the templates of a Qute project and the Java methods they call.
//!
//! The drawing itself lives in [`components::project_graph`]; this file only mounts it behind a
//! router and sets up browser logging.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod components;
mod pages;

use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Routes `log` output to the browser console and reports panics there as well.
pub fn init_logging() {
	if console_log::init_with_level(Level::Debug).is_err() {
		return;
	}
	console_error_panic_hook::set_once();
	info!("project graph webview starting");
}

/// Root view: the graph page at `/`, a not-found page for anything else.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		<Title text="Qute Project Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
