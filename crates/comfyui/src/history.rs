//! Typed models for the ComfyUI `/history` response and artifact
//! resolution.
//!
//! `GET /history/{prompt_id}` returns a JSON object keyed by prompt ID.
//! The entry for a prompt appears once the server has recorded results
//! for it; each entry carries an `outputs` object keyed by node ID, and
//! image-producing nodes list their artifacts under `images`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The full `/history/{prompt_id}` response: prompt ID -> entry.
///
/// Presence of the queried prompt ID as a key is the completion signal
/// the poller waits for.
pub type HistoryResponse = HashMap<String, HistoryEntry>;

/// One recorded prompt execution.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    /// Per-node outputs, keyed by node ID.
    #[serde(default)]
    pub outputs: HashMap<String, NodeOutput>,
}

/// Output slot of a single node.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeOutput {
    /// Artifact descriptors for image-producing nodes.
    #[serde(default)]
    pub images: Vec<ArtifactDescriptor>,
}

/// Reference to one retrievable artifact on the ComfyUI server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// File name under the server's output directory.
    pub filename: String,
    /// Subdirectory, empty for the top level.
    #[serde(default)]
    pub subfolder: String,
    /// Server-side folder category (`output`, `temp`, `input`).
    #[serde(rename = "type", default = "default_folder_type")]
    pub folder_type: String,
}

fn default_folder_type() -> String {
    "output".to_string()
}

/// Errors locating artifacts within a completed entry's outputs.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// The expected output node is absent from `outputs`.
    #[error("No output image found")]
    NoOutput { node: String },

    /// The output node is present but produced no images.
    #[error("No images generated")]
    EmptyOutput { node: String },
}

impl HistoryEntry {
    /// Resolve the artifact descriptors produced by `node`.
    ///
    /// Ordering from the server is authoritative and preserved; callers
    /// wanting a single image take the first descriptor.
    pub fn resolve_images(&self, node: &str) -> Result<&[ArtifactDescriptor], OutputError> {
        let output = self.outputs.get(node).ok_or_else(|| OutputError::NoOutput {
            node: node.to_string(),
        })?;
        if output.images.is_empty() {
            return Err(OutputError::EmptyOutput {
                node: node.to_string(),
            });
        }
        Ok(&output.images)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn entry(json: &str) -> HistoryEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parse_full_history_response() {
        let json = r#"{
            "abc": {
                "outputs": {
                    "60": {"images": [
                        {"filename": "cat.png", "subfolder": "", "type": "output"}
                    ]}
                },
                "status": {"completed": true}
            }
        }"#;
        let history: HistoryResponse = serde_json::from_str(json).unwrap();
        let images = history["abc"].resolve_images("60").unwrap();
        assert_eq!(images[0].filename, "cat.png");
    }

    #[test]
    fn missing_node_yields_no_output() {
        let e = entry(r#"{"outputs": {"59": {"images": [{"filename": "x.png"}]}}}"#);
        assert_matches!(e.resolve_images("60"), Err(OutputError::NoOutput { node }) if node == "60");
    }

    #[test]
    fn empty_image_list_yields_empty_output() {
        let e = entry(r#"{"outputs": {"60": {"images": []}}}"#);
        assert_matches!(e.resolve_images("60"), Err(OutputError::EmptyOutput { .. }));
    }

    #[test]
    fn node_without_images_key_yields_empty_output() {
        let e = entry(r#"{"outputs": {"60": {"text": ["hello"]}}}"#);
        assert_matches!(e.resolve_images("60"), Err(OutputError::EmptyOutput { .. }));
    }

    #[test]
    fn first_descriptor_is_returned_untouched() {
        let e = entry(
            r#"{"outputs": {"60": {"images": [
                {"filename": "first.png", "subfolder": "batch", "type": "temp"},
                {"filename": "second.png"}
            ]}}}"#,
        );
        let images = e.resolve_images("60").unwrap();
        assert_eq!(
            images[0],
            ArtifactDescriptor {
                filename: "first.png".to_string(),
                subfolder: "batch".to_string(),
                folder_type: "temp".to_string(),
            }
        );
    }

    #[test]
    fn descriptor_defaults_apply() {
        let e = entry(r#"{"outputs": {"60": {"images": [{"filename": "cat.png"}]}}}"#);
        let images = e.resolve_images("60").unwrap();
        assert_eq!(images[0].subfolder, "");
        assert_eq!(images[0].folder_type, "output");
    }

    #[test]
    fn entry_without_outputs_parses_empty() {
        let e = entry(r#"{"status": {"completed": false}}"#);
        assert_matches!(e.resolve_images("60"), Err(OutputError::NoOutput { .. }));
    }
}
