//! Text rendering of the controller state

use std::fmt::Write;

use crate::app::{Controller, FormFields, Phase, Quality};
use crate::generation::VARIANT_COUNT;
use crate::response::base64;
use crate::upload::{UploadedImage, ACCEPTED_MEDIA_TYPES, MAX_UPLOADS};

const CHARACTER_PLACEHOLDER: &str = "e.g., a warrior with glowing blue eyes, wearing silver armor";
const BACKGROUND_PLACEHOLDER: &str = "e.g., a mystical forest at night, with fireflies";
pub const EMPTY_RESULTS_TITLE: &str = "Your generated images will appear here.";
pub const EMPTY_RESULTS_HINT: &str = "Upload an image and provide a description to get started.";

/// Render the whole panel
pub fn render(controller: &Controller) -> String {
    let mut out = String::new();

    out.push_str("Image Creator\n=============\n");

    if let Some(message) = controller.error_message() {
        let _ = writeln!(out, "\nError: {}", message);
    }

    out.push('\n');
    render_uploads(&mut out, controller.uploads());
    out.push('\n');
    render_form(&mut out, controller.form());
    out.push('\n');
    render_generate_button(&mut out, controller);
    out.push('\n');
    render_results(&mut out, controller.phase());

    out
}

fn render_uploads(out: &mut String, uploads: &[UploadedImage]) {
    let _ = writeln!(out, "Upload Images ({}/{})", uploads.len(), MAX_UPLOADS);
    for (i, image) in uploads.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{}] {}  {}  {}   (remove {})",
            i + 1,
            image.file_name,
            image.media_type,
            format_size(image.byte_len()),
            i + 1
        );
    }
    if uploads.len() < MAX_UPLOADS {
        let _ = writeln!(out, "  [+] Add Image ({})", ACCEPTED_MEDIA_TYPES.join(", "));
    }
}

fn render_form(out: &mut String, form: &FormFields) {
    let _ = writeln!(
        out,
        "Remove Background: [{}]",
        if form.remove_background { "on" } else { "off" }
    );
    let _ = writeln!(
        out,
        "Character Description: {}",
        text_or_placeholder(&form.character_description, CHARACTER_PLACEHOLDER)
    );
    let _ = writeln!(
        out,
        "Background & Setting: {}",
        text_or_placeholder(&form.background_setting, BACKGROUND_PLACEHOLDER)
    );

    let choices: Vec<String> = Quality::ALL
        .iter()
        .map(|q| {
            if *q == form.quality {
                format!("[{}]", q)
            } else {
                format!(" {} ", q)
            }
        })
        .collect();
    let _ = writeln!(out, "Output Quality: {}", choices.join(" "));
}

fn render_generate_button(out: &mut String, controller: &Controller) {
    let label = if controller.is_generating() {
        "[ Generating... ]"
    } else if controller.can_generate() {
        "[ Generate ]"
    } else {
        "[ Generate ] (disabled: add an image first)"
    };
    let _ = writeln!(out, "{}", label);
}

fn render_results(out: &mut String, phase: &Phase) {
    match phase {
        Phase::ResultsReady(result) => {
            let _ = writeln!(out, "Results                [Download All]");
            for (i, image) in result.images().iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  [{}] generated image  {}   (download {})",
                    i + 1,
                    format_size(base64::decoded_len(image)),
                    i + 1
                );
            }
        }
        Phase::Generating => {
            let _ = writeln!(out, "Results");
            for i in 0..VARIANT_COUNT {
                let _ = writeln!(out, "  [{}] ░░░░░░░░ generating...", i + 1);
            }
        }
        Phase::Idle | Phase::Error(_) => {
            let _ = writeln!(out, "Results");
            let _ = writeln!(out, "  {}", EMPTY_RESULTS_TITLE);
            let _ = writeln!(out, "  {}", EMPTY_RESULTS_HINT);
        }
    }
}

fn text_or_placeholder(text: &str, placeholder: &str) -> String {
    if text.trim().is_empty() {
        format!("({})", placeholder)
    } else {
        text.to_string()
    }
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
