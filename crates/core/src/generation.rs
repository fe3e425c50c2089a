//! Generation request model, defaults, and validation.
//!
//! A raw [`GenerationInput`] arrives from the invocation host with every
//! field optional and untyped: a caller may send a string where a number
//! belongs, and that is still caller input, not a transport fault.
//! [`GenerationInput::validate`] resolves defaults, type-checks each
//! field, and range-checks the result, producing an immutable
//! [`GenerationRequest`] that the orchestrator owns for the rest of the
//! job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Prompt used when the caller omits one.
pub const DEFAULT_PROMPT: &str = "a beautiful landscape";
/// Default output width in pixels.
pub const DEFAULT_WIDTH: u32 = 1440;
/// Default output height in pixels.
pub const DEFAULT_HEIGHT: u32 = 1920;
/// Default number of sampler steps.
pub const DEFAULT_STEPS: u32 = 25;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Minimum accepted width/height in pixels.
pub const MIN_DIMENSION: u32 = 64;
/// Maximum accepted width/height in pixels.
pub const MAX_DIMENSION: u32 = 4096;
/// Minimum accepted sampler step count.
pub const MIN_STEPS: u32 = 1;
/// Maximum accepted sampler step count.
pub const MAX_STEPS: u32 = 100;

// ---------------------------------------------------------------------------
// Request model
// ---------------------------------------------------------------------------

/// Raw job input as received from the invocation host.
///
/// Fields stay untyped [`Value`]s so that a mistyped field deserializes
/// fine and is rejected by [`validate`](Self::validate) with the field's
/// own error message instead of failing at the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationInput {
    pub prompt: Option<Value>,
    pub width: Option<Value>,
    pub height: Option<Value>,
    pub seed: Option<Value>,
    pub steps: Option<Value>,
}

/// A fully validated generation request.
///
/// Immutable once constructed; one instance per orchestration invocation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    /// Passed through to the sampler unvalidated beyond being an
    /// integer. When absent from the input it is drawn uniformly from
    /// `[0, 2^32 - 1]`.
    pub seed: i64,
    pub steps: u32,
}

impl GenerationInput {
    /// Resolve defaults, type-check, and validate ranges.
    ///
    /// Checks run before any network activity and short-circuit on the
    /// first failure:
    /// - prompt: a string, non-empty after trimming
    /// - width, height: integers in `[64, 4096]` inclusive
    /// - steps: integer in `[1, 100]` inclusive
    /// - seed: any integer accepted; defaulted via [`random_seed`]
    pub fn validate(self) -> Result<GenerationRequest, CoreError> {
        let prompt = match self.prompt {
            None => DEFAULT_PROMPT.to_string(),
            Some(Value::String(s)) => s,
            Some(_) => return Err(invalid_prompt()),
        };
        if prompt.trim().is_empty() {
            return Err(invalid_prompt());
        }

        let width = validate_dimension("width", self.width, DEFAULT_WIDTH)?;
        let height = validate_dimension("height", self.height, DEFAULT_HEIGHT)?;

        let steps = match self.steps {
            None => DEFAULT_STEPS as i64,
            Some(value) => value.as_i64().ok_or_else(invalid_steps)?,
        };
        if steps < MIN_STEPS as i64 || steps > MAX_STEPS as i64 {
            return Err(invalid_steps());
        }

        let seed = match self.seed {
            None => random_seed(),
            Some(value) => value.as_i64().ok_or_else(|| {
                CoreError::Validation("Invalid seed. Must be an integer.".to_string())
            })?,
        };

        Ok(GenerationRequest {
            prompt,
            width,
            height,
            seed,
            steps: steps as u32,
        })
    }
}

/// Draw a default seed uniformly from `[0, 2^32 - 1]`.
pub fn random_seed() -> i64 {
    i64::from(rand::random::<u32>())
}

/// Type-check and range-check one pixel dimension.
///
/// Non-integer values get the same message as out-of-range ones, the
/// way the host contract words it.
fn validate_dimension(name: &str, value: Option<Value>, default: u32) -> Result<u32, CoreError> {
    let invalid = || {
        CoreError::Validation(format!(
            "Invalid {name}. Must be between {MIN_DIMENSION} and {MAX_DIMENSION}."
        ))
    };
    let value = match value {
        None => default as i64,
        Some(v) => v.as_i64().ok_or_else(invalid)?,
    };
    if value < MIN_DIMENSION as i64 || value > MAX_DIMENSION as i64 {
        return Err(invalid());
    }
    Ok(value as u32)
}

fn invalid_prompt() -> CoreError {
    CoreError::Validation("Invalid prompt. Please provide a non-empty string.".to_string())
}

fn invalid_steps() -> CoreError {
    CoreError::Validation(format!(
        "Invalid steps. Must be between {MIN_STEPS} and {MAX_STEPS}."
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::error::CoreError;

    fn input() -> GenerationInput {
        GenerationInput {
            prompt: Some(json!("a cat")),
            width: Some(json!(512)),
            height: Some(json!(512)),
            seed: Some(json!(42)),
            steps: Some(json!(20)),
        }
    }

    // -- Prompt --

    #[test]
    fn accepts_single_character_prompt() {
        let req = GenerationInput {
            prompt: Some(json!("x")),
            ..input()
        }
        .validate()
        .unwrap();
        assert_eq!(req.prompt, "x");
    }

    #[test]
    fn rejects_empty_prompt() {
        let result = GenerationInput {
            prompt: Some(json!("")),
            ..input()
        }
        .validate();
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("prompt"));
    }

    #[test]
    fn rejects_whitespace_only_prompt() {
        let result = GenerationInput {
            prompt: Some(json!("   \t\n")),
            ..input()
        }
        .validate();
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_non_string_prompt() {
        let result = GenerationInput {
            prompt: Some(json!(12345)),
            ..input()
        }
        .validate();
        assert_matches!(
            result,
            Err(CoreError::Validation(msg))
                if msg == "Invalid prompt. Please provide a non-empty string."
        );
    }

    #[test]
    fn missing_prompt_uses_default() {
        let req = GenerationInput {
            prompt: None,
            ..input()
        }
        .validate()
        .unwrap();
        assert_eq!(req.prompt, DEFAULT_PROMPT);
    }

    // -- Dimension boundaries --

    #[test]
    fn width_boundaries() {
        for (value, ok) in [(63, false), (64, true), (4096, true), (4097, false)] {
            let result = GenerationInput {
                width: Some(json!(value)),
                ..input()
            }
            .validate();
            assert_eq!(result.is_ok(), ok, "width {value}");
        }
    }

    #[test]
    fn height_boundaries() {
        for (value, ok) in [(63, false), (64, true), (4096, true), (4097, false)] {
            let result = GenerationInput {
                height: Some(json!(value)),
                ..input()
            }
            .validate();
            assert_eq!(result.is_ok(), ok, "height {value}");
        }
    }

    #[test]
    fn rejects_negative_width() {
        let result = GenerationInput {
            width: Some(json!(-512)),
            ..input()
        }
        .validate();
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("width"));
    }

    #[test]
    fn rejects_string_typed_width() {
        let result = GenerationInput {
            width: Some(json!("512")),
            ..input()
        }
        .validate();
        assert_matches!(
            result,
            Err(CoreError::Validation(msg))
                if msg == "Invalid width. Must be between 64 and 4096."
        );
    }

    #[test]
    fn rejects_fractional_height() {
        let result = GenerationInput {
            height: Some(json!(512.5)),
            ..input()
        }
        .validate();
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("height"));
    }

    // -- Steps boundaries --

    #[test]
    fn steps_boundaries() {
        for (value, ok) in [(0, false), (1, true), (100, true), (101, false)] {
            let result = GenerationInput {
                steps: Some(json!(value)),
                ..input()
            }
            .validate();
            assert_eq!(result.is_ok(), ok, "steps {value}");
        }
    }

    #[test]
    fn rejects_string_typed_steps() {
        let result = GenerationInput {
            steps: Some(json!("20")),
            ..input()
        }
        .validate();
        assert_matches!(
            result,
            Err(CoreError::Validation(msg))
                if msg == "Invalid steps. Must be between 1 and 100."
        );
    }

    // -- Seed --

    #[test]
    fn supplied_seed_is_echoed_exactly() {
        let req = GenerationInput {
            seed: Some(json!(9_876_543_210i64)),
            ..input()
        }
        .validate()
        .unwrap();
        assert_eq!(req.seed, 9_876_543_210);
    }

    #[test]
    fn negative_seed_is_accepted_unvalidated() {
        let req = GenerationInput {
            seed: Some(json!(-5)),
            ..input()
        }
        .validate()
        .unwrap();
        assert_eq!(req.seed, -5);
    }

    #[test]
    fn rejects_non_integer_seed() {
        let result = GenerationInput {
            seed: Some(json!("not a number")),
            ..input()
        }
        .validate();
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("seed"));
    }

    #[test]
    fn missing_seed_is_drawn_from_u32_range() {
        for _ in 0..100 {
            let req = GenerationInput {
                seed: None,
                ..input()
            }
            .validate()
            .unwrap();
            assert!((0..=i64::from(u32::MAX)).contains(&req.seed));
        }
    }

    // -- Defaults --

    #[test]
    fn empty_input_resolves_all_defaults() {
        let req = GenerationInput::default().validate().unwrap();
        assert_eq!(req.prompt, DEFAULT_PROMPT);
        assert_eq!(req.width, DEFAULT_WIDTH);
        assert_eq!(req.height, DEFAULT_HEIGHT);
        assert_eq!(req.steps, DEFAULT_STEPS);
    }

    #[test]
    fn mistyped_fields_still_deserialize_as_input() {
        let input: GenerationInput =
            serde_json::from_str(r#"{"prompt": 7, "width": "512"}"#).unwrap();
        assert_eq!(input.prompt, Some(json!(7)));
        assert_eq!(input.width, Some(json!("512")));
        assert!(input.height.is_none());
    }
}
