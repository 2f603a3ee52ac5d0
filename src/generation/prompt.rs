//! Prompt construction from the form fields

/// Placeholder used when a text field is left empty
pub const DEFAULT_FIELD_TEXT: &str = "As in the original image(s).";

/// Appended when the background should be removed
pub const TRANSPARENT_BACKGROUND_INSTRUCTION: &str =
    "The final image must have a transparent background. Do not add any other background elements.";

/// Build the text prompt sent alongside the reference images
pub fn build_prompt(
    character_description: &str,
    background_setting: &str,
    remove_background: bool,
) -> String {
    let mut prompt = format!(
        "Based on the provided image(s), create a new artistic version of the character.\n\
         Character Description: {}\n\
         Background / Setting: {}",
        or_default(character_description),
        or_default(background_setting),
    );

    if remove_background {
        prompt.push('\n');
        prompt.push_str(TRANSPARENT_BACKGROUND_INSTRUCTION);
    }

    prompt
}

fn or_default(field: &str) -> &str {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        DEFAULT_FIELD_TEXT
    } else {
        trimmed
    }
}
