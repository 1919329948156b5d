//! Fixed prompt text and response markers

/// Marker the model places before the generated document
pub const CODE_REGION_OPENER: &str = "<<<CODE>>>";

/// Marker the model places after the generated document
pub const CODE_REGION_CLOSER: &str = "<<<END>>>";

/// Name of the field holding the spec in the Stage 1 JSON response
pub const SPEC_FIELD: &str = "spec";

/// Instructions for turning a video into a learning-app spec.
///
/// The model answers with `{"spec": "..."}`.
pub const SPEC_FROM_VIDEO_PROMPT: &str = r#"You are a pedagogist and product designer with deep expertise in crafting engaging learning experiences via interactive web apps.

Examine the contents of the attached video. Then, write a detailed and carefully considered spec for an interactive web app designed to complement the video and reinforce its key idea or ideas. The recipient of the spec does not have access to the video, so the spec must be thorough and self-contained (the spec must not mention that it is based on a video).

The goal of the app is to enhance understanding through simple and playful design. The provided spec should not be overly complex: a junior web developer should be able to implement it in a single HTML file, with all styles and scripts inline. Most importantly, the spec must clearly outline the core mechanics of the app, and those mechanics must be highly effective in reinforcing the given video's key idea(s).

Provide the result as a JSON object containing a single field called "spec", whose value is the spec for the web app."#;

/// Appended exactly once to every freshly generated spec.
///
/// Tells the code model how to shape and delimit its answer.
pub const SPEC_ADDENDUM: &str = r#"

The app must be fully responsive and function properly on both desktop and mobile. Provide the code as a single, self-contained HTML document. All styles and scripts must be inline. In the result, encase the code between "<<<CODE>>>" and "<<<END>>>" for easy parsing."#;
