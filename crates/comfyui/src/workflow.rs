//! Typed workflow template and parameter binder.
//!
//! A ComfyUI workflow is a JSON object keyed by opaque node IDs, each
//! node carrying an `inputs` object of named fields. [`Workflow`] wraps
//! that shape and enforces the "node and field must exist" invariant in
//! one place instead of via ad-hoc indexing at each call site.
//!
//! The loaded template is a prototype: [`Workflow::bind`] deep-copies it
//! before writing caller values, so concurrent jobs can share a single
//! template loaded at startup.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use renderpod_core::generation::GenerationRequest;

// ---------------------------------------------------------------------------
// Template field map
//
// These node IDs and field names are a versioned contract with the
// workflow JSON file. Changing the template requires updating this map
// in lockstep.
// ---------------------------------------------------------------------------

/// Node holding the positive prompt text.
pub const PROMPT_NODE_ID: &str = "231";
/// String field on the prompt node.
pub const PROMPT_FIELD: &str = "String";
/// Node holding the output width.
pub const WIDTH_NODE_ID: &str = "91";
/// Node holding the output height.
pub const HEIGHT_NODE_ID: &str = "92";
/// Numeric-as-string field on the width/height nodes.
pub const DIMENSION_FIELD: &str = "Number";
/// Sampler node holding seed and step count.
pub const SAMPLER_NODE_ID: &str = "75";
/// Seed field on the sampler node.
pub const SEED_FIELD: &str = "seed";
/// Step-count field on the sampler node.
pub const STEPS_FIELD: &str = "steps";
/// SaveImage node whose outputs carry the generated artifacts.
pub const OUTPUT_NODE_ID: &str = "60";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from template parsing and parameter binding.
///
/// Shape errors indicate a template/binder version mismatch and must not
/// be silently ignored.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The template document is not valid JSON or not a top-level object.
    #[error("Failed to parse workflow template: {0}")]
    Parse(#[from] serde_json::Error),

    /// A node ID the binder writes to is absent from the template.
    #[error("Workflow template has no node '{node}'")]
    MissingNode { node: String },

    /// A node exists but has no `inputs` object.
    #[error("Workflow node '{node}' has no inputs object")]
    MissingInputs { node: String },

    /// A node's `inputs` object lacks the target field.
    #[error("Workflow node '{node}' has no input field '{field}'")]
    MissingField { node: String, field: String },
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// A parsed workflow template (node ID -> node definition).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workflow(serde_json::Map<String, Value>);

impl Workflow {
    /// Parse a workflow template from its JSON text.
    pub fn parse(json: &str) -> Result<Self, WorkflowError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read one input field, if the node and field exist.
    pub fn input(&self, node: &str, field: &str) -> Option<&Value> {
        self.0.get(node)?.get("inputs")?.get(field)
    }

    /// Overwrite one existing input field.
    ///
    /// Fails if the node, its `inputs` object, or the field is absent --
    /// the binder only writes to fields the template already declares.
    pub fn set_input<V: Into<Value>>(
        &mut self,
        node: &str,
        field: &str,
        value: V,
    ) -> Result<(), WorkflowError> {
        let node_value = self.0.get_mut(node).ok_or_else(|| WorkflowError::MissingNode {
            node: node.to_string(),
        })?;
        let inputs = node_value
            .get_mut("inputs")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| WorkflowError::MissingInputs {
                node: node.to_string(),
            })?;
        match inputs.get_mut(field) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(WorkflowError::MissingField {
                node: node.to_string(),
                field: field.to_string(),
            }),
        }
    }

    /// Produce a submission-ready copy with the request values bound.
    ///
    /// Writes the prompt, width/height (as their string representations),
    /// and seed/steps (as numbers) into the fixed field map above. The
    /// prototype itself is never mutated.
    pub fn bind(&self, request: &GenerationRequest) -> Result<Workflow, WorkflowError> {
        let mut bound = self.clone();
        bound.set_input(PROMPT_NODE_ID, PROMPT_FIELD, request.prompt.clone())?;
        bound.set_input(WIDTH_NODE_ID, DIMENSION_FIELD, request.width.to_string())?;
        bound.set_input(HEIGHT_NODE_ID, DIMENSION_FIELD, request.height.to_string())?;
        bound.set_input(SAMPLER_NODE_ID, SEED_FIELD, request.seed)?;
        bound.set_input(SAMPLER_NODE_ID, STEPS_FIELD, request.steps)?;
        Ok(bound)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn template() -> Workflow {
        Workflow::parse(
            r#"{
                "231": {"class_type": "String Literal", "inputs": {"String": ""}},
                "91":  {"class_type": "Int Literal",    "inputs": {"Number": "1024"}},
                "92":  {"class_type": "Int Literal",    "inputs": {"Number": "1024"}},
                "75":  {"class_type": "KSampler",       "inputs": {"seed": 0, "steps": 20, "cfg": 4.5}},
                "60":  {"class_type": "SaveImage",      "inputs": {"filename_prefix": "out"}}
            }"#,
        )
        .unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "a cat".to_string(),
            width: 512,
            height: 768,
            seed: 42,
            steps: 30,
        }
    }

    #[test]
    fn bind_round_trips_all_five_fields() {
        let bound = template().bind(&request()).unwrap();
        assert_eq!(bound.input("231", "String"), Some(&json!("a cat")));
        assert_eq!(bound.input("91", "Number"), Some(&json!("512")));
        assert_eq!(bound.input("92", "Number"), Some(&json!("768")));
        assert_eq!(bound.input("75", "seed"), Some(&json!(42)));
        assert_eq!(bound.input("75", "steps"), Some(&json!(30)));
    }

    #[test]
    fn bind_does_not_mutate_the_prototype() {
        let prototype = template();
        let before = serde_json::to_value(&prototype).unwrap();
        let _ = prototype.bind(&request()).unwrap();
        assert_eq!(serde_json::to_value(&prototype).unwrap(), before);
    }

    #[test]
    fn bind_leaves_unrelated_fields_alone() {
        let bound = template().bind(&request()).unwrap();
        assert_eq!(bound.input("75", "cfg"), Some(&json!(4.5)));
        assert_eq!(bound.input("60", "filename_prefix"), Some(&json!("out")));
    }

    #[test]
    fn missing_node_is_a_shape_error() {
        let mut wf = Workflow::parse(r#"{"1": {"inputs": {"a": 1}}}"#).unwrap();
        let result = wf.set_input("231", "String", "x");
        assert_matches!(result, Err(WorkflowError::MissingNode { node }) if node == "231");
    }

    #[test]
    fn node_without_inputs_is_a_shape_error() {
        let mut wf = Workflow::parse(r#"{"231": {"class_type": "String Literal"}}"#).unwrap();
        let result = wf.set_input("231", "String", "x");
        assert_matches!(result, Err(WorkflowError::MissingInputs { .. }));
    }

    #[test]
    fn missing_field_is_a_shape_error() {
        let mut wf = template();
        let result = wf.set_input("75", "denoise", 1.0);
        assert_matches!(
            result,
            Err(WorkflowError::MissingField { node, field })
                if node == "75" && field == "denoise"
        );
    }

    #[test]
    fn non_object_template_fails_to_parse() {
        assert_matches!(Workflow::parse("[1, 2, 3]"), Err(WorkflowError::Parse(_)));
        assert_matches!(Workflow::parse("not json"), Err(WorkflowError::Parse(_)));
    }

    #[test]
    fn serializes_back_to_the_node_map() {
        let wf = template();
        let value = serde_json::to_value(&wf).unwrap();
        assert!(value.is_object());
        assert!(value.get("231").is_some());
    }
}
