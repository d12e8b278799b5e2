//! Messages posted from the host into the webview.

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::renderer::ProjectGraphRenderer;
use super::surface::DrawingSurface;
use super::types::RenderRequest;

/// A command from the host, tagged by its `command` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum HostMessage {
	/// Draw a new graph.
	UpdateGraphData(RenderRequest),
	/// Draw a new graph sent in the older envelope, which nests the request under `graphData`.
	UpdateQutereeData {
		/// The request; absent means "no data".
		#[serde(rename = "graphData", default)]
		request: RenderRequest,
	},
	/// Return to the initial viewport.
	ResetTransformation,
	/// Nothing is selected in the editor.
	ShowNoSelection {
		/// Message text.
		text: String,
	},
}

impl HostMessage {
	/// Decodes a JSON message.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Carries the message out on `renderer`.
	pub fn dispatch<S: DrawingSurface>(self, renderer: &mut ProjectGraphRenderer<S>) {
		match self {
			HostMessage::UpdateGraphData(request) | HostMessage::UpdateQutereeData { request } => {
				renderer.render(request);
			}
			HostMessage::ResetTransformation => {
				if renderer.reset_transformation().is_none() {
					debug!("reset requested with no graph shown");
				}
			}
			HostMessage::ShowNoSelection { text } => renderer.show_no_selection(&text),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::project_graph::config::RendererConfig;
	use crate::components::project_graph::error::GraphError;
	use crate::components::project_graph::scene::{FixedAdvance, Scene};

	#[test]
	fn decodes_update() {
		let message = HostMessage::from_json(
			r#"{ "command": "updateGraphData", "ruleName": "main",
				 "graphData": { "nodes": [ { "id": "1", "name": "main", "type": 0 } ], "links": [] } }"#,
		)
		.unwrap();
		let HostMessage::UpdateGraphData(request) = message else {
			panic!("unexpected {message:?}");
		};
		assert_eq!(request.rule_name.as_deref(), Some("main"));
		assert_eq!(request.graph_data.unwrap().nodes.len(), 1);
	}

	#[test]
	fn accepts_legacy_envelope() {
		let message = HostMessage::from_json(
			r#"{ "command": "updateQutereeData",
				 "graphData": {
					"uri": { "scheme": "file", "path": "/project/templates/hello.html" },
					"ruleName": "main?",
					"maxLabelCount": 3,
					"graphData": { "nodes": [
						{ "name": "main?", "id": "1", "type": 0 },
						{ "name": "todo", "id": 2, "type": 0 },
						{ "name": "@MyClass", "id": 2, "type": 1 }
					] },
					"initialScale": 0.5,
					"initialTranslation": {}
				 } }"#,
		)
		.unwrap();
		let HostMessage::UpdateQutereeData { request } = &message else {
			panic!("unexpected {message:?}");
		};
		assert_eq!(request.rule_name.as_deref(), Some("main?"));
		assert_eq!(request.initial_scale, Some(0.5));
		assert_eq!(request.graph_data.as_ref().unwrap().nodes.len(), 3);

		let mut renderer = ProjectGraphRenderer::new(
			Scene::new(400.0, 400.0, FixedAdvance::default()),
			RendererConfig::default(),
		);
		message.dispatch(&mut renderer);
		// The repeated id 2 is merged into the first node carrying it.
		assert_eq!(renderer.nodes().len(), 2);
		assert!(renderer.surface().is_visible());
	}

	#[test]
	fn legacy_envelope_without_request_shows_placeholder() {
		let message = HostMessage::from_json(r#"{ "command": "updateQutereeData" }"#).unwrap();
		assert_eq!(
			message,
			HostMessage::UpdateQutereeData {
				request: RenderRequest::default()
			}
		);
	}

	#[test]
	fn rejects_unknown_command() {
		let err = HostMessage::from_json(r#"{ "command": "explode" }"#).unwrap_err();
		assert!(matches!(err, GraphError::Message(_)));
	}

	#[test]
	fn bad_link_does_not_block_the_graph() {
		let message = HostMessage::from_json(
			r#"{ "command": "updateGraphData",
				 "graphData": {
					"nodes": [ { "id": "1", "name": "main", "type": 0 },
							   { "id": "2", "name": "@Item#price", "type": 1 } ],
					"links": [ { "source": 0, "target": 1 }, { "source": -1, "target": 1 } ]
				 } }"#,
		)
		.unwrap();
		let mut renderer = ProjectGraphRenderer::new(
			Scene::new(400.0, 400.0, FixedAdvance::default()),
			RendererConfig::default(),
		);
		message.dispatch(&mut renderer);
		assert_eq!(renderer.nodes().len(), 2);
		assert_eq!(renderer.handles().unwrap().links.len(), 1);
	}

	#[test]
	fn dispatch_drives_renderer() {
		let mut renderer = ProjectGraphRenderer::new(
			Scene::new(400.0, 400.0, FixedAdvance::default()),
			RendererConfig::default(),
		);
		HostMessage::ShowNoSelection {
			text: "Select a template".into(),
		}
		.dispatch(&mut renderer);
		assert_eq!(renderer.surface().messages()[0].class, "noSelection");

		HostMessage::from_json(
			r#"{ "command": "updateGraphData",
				 "graphData": { "nodes": [ { "id": "1", "name": "main", "type": 0 } ] } }"#,
		)
		.unwrap()
		.dispatch(&mut renderer);
		assert!(renderer.surface().messages().is_empty());
		assert_eq!(renderer.nodes().len(), 1);

		renderer.pan(30.0, 0.0);
		HostMessage::ResetTransformation.dispatch(&mut renderer);
		assert_eq!(renderer.viewport().unwrap().translation.x, 200.0);
	}
}
