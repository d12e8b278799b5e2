use leptos::ev;
use leptos::prelude::*;
use log::warn;
use web_sys::MessageEvent;

use crate::components::project_graph::{
	GraphData, HostMessage, Link, LinkLabel, Node, NodeKind, ProjectGraphCanvas, RenderRequest,
};

/// Sample project: a few templates including each other and calling into Java methods.
fn sample_project() -> RenderRequest {
	let templates = ["main", "base", "header", "footer", "items"];
	let methods = ["@Inventory#items", "@Item#price", "@Formatter#currency"];

	let nodes = templates
		.iter()
		.map(|name| (name, NodeKind::Container))
		.chain(methods.iter().map(|name| (name, NodeKind::Leaf)))
		.enumerate()
		.map(|(i, (name, kind))| Node::new(i.to_string(), *name, kind))
		.collect();

	let label = |content: &str| LinkLabel {
		content: content.to_owned(),
		class: None,
	};
	let link = |source, target, labels: Vec<LinkLabel>| Link {
		source,
		target,
		labels,
	};
	let links = vec![
		link(0, 1, vec![label("include")]),
		link(1, 2, vec![label("insert")]),
		link(1, 3, vec![label("insert")]),
		link(0, 4, vec![label("include")]),
		link(4, 5, vec![label("items")]),
		link(4, 6, vec![label("price")]),
		link(6, 7, vec![label("currency"), label("format")]),
		link(0, 0, vec![]),
	];

	RenderRequest::with_graph(GraphData { nodes, links }).rule_name("main")
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (message, set_message) =
		signal(Some(HostMessage::UpdateGraphData(sample_project())));

	// The embedding host posts JSON messages into the page.
	let _listener = window_event_listener(ev::message, move |ev: MessageEvent| {
		let Some(json) = js_sys::JSON::stringify(&ev.data())
			.ok()
			.and_then(|s| s.as_string())
		else {
			return;
		};
		match HostMessage::from_json(&json) {
			Ok(parsed) => set_message.set(Some(parsed)),
			Err(err) => warn!("ignoring host message: {err}"),
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ProjectGraphCanvas message=message fullscreen=true />
				<div class="graph-overlay">
					<h1>"Qute Project Graph"</h1>
					<p class="subtitle">"Scroll to zoom. Drag background to pan."</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
