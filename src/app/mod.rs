//! Application controller: uploads, form fields and the generation state machine

pub mod command;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::generation::{GenerationClient, GenerationRequest, GenerationResult};
use crate::response::FileHandler;
use crate::upload::{self, UploadList, UploadedImage, MAX_UPLOADS};

/// Requested output quality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Quality {
    #[default]
    Standard,
    TwoK,
    FourK,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Standard, Quality::TwoK, Quality::FourK];

    pub fn label(&self) -> &'static str {
        match self {
            Quality::Standard => "Standard",
            Quality::TwoK => "2K",
            Quality::FourK => "4K",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Quality::Standard),
            "2k" => Ok(Quality::TwoK),
            "4k" => Ok(Quality::FourK),
            other => Err(format!(
                "unknown quality '{}', expected Standard, 2K or 4K",
                other
            )),
        }
    }
}

/// Free-text inputs and toggles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub character_description: String,
    pub background_setting: String,
    pub remove_background: bool,
    pub quality: Quality,
}

/// Where the controller is in the generation lifecycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Generating,
    ResultsReady(GenerationResult),
    Error(String),
}

/// Owns all application state and drives generation
pub struct Controller {
    client: GenerationClient,
    files: FileHandler,
    uploads: UploadList,
    form: FormFields,
    phase: Phase,
    /// Upload or validation message shown instead of a generation error
    alert: Option<String>,
}

impl Controller {
    pub fn new(client: GenerationClient, files: FileHandler) -> Self {
        Self {
            client,
            files,
            uploads: UploadList::new(),
            form: FormFields::default(),
            phase: Phase::Idle,
            alert: None,
        }
    }

    /// Handle to the generation client, for awaiting a request outside the controller
    pub fn client(&self) -> GenerationClient {
        self.client.clone()
    }

    pub fn uploads(&self) -> &[UploadedImage] {
        self.uploads.images()
    }

    pub fn form(&self) -> &FormFields {
        &self.form
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.phase, Phase::Generating)
    }

    /// The single error message currently shown, if any
    pub fn error_message(&self) -> Option<&str> {
        match (&self.alert, &self.phase) {
            (Some(alert), _) => Some(alert),
            (None, Phase::Error(message)) => Some(message),
            _ => None,
        }
    }

    /// Generated images, empty unless results are ready
    pub fn results(&self) -> &[String] {
        match &self.phase {
            Phase::ResultsReady(result) => result.images(),
            _ => &[],
        }
    }

    /// The generate action is available
    pub fn can_generate(&self) -> bool {
        !self.is_generating() && !self.uploads.is_empty()
    }

    /// Add files in selection order, keeping only as many as there are free slots
    ///
    /// Returns the number of images added.
    pub async fn add_files(&mut self, paths: Vec<PathBuf>) -> Result<usize> {
        let accepted = self.admit(paths)?;

        match upload::encode_files(&accepted).await {
            Ok(images) => Ok(self.append(images)),
            Err(e) => {
                if let AppError::FileRead(detail) = &e {
                    warn!(detail = %detail, "Upload batch rejected");
                }
                self.raise(e.to_string());
                Err(e)
            }
        }
    }

    /// Add already encoded images, with the same slot rules as [`Controller::add_files`]
    pub fn add_images(&mut self, images: Vec<UploadedImage>) -> Result<usize> {
        let accepted = self.admit(images)?;
        Ok(self.append(accepted))
    }

    /// Apply the upload limit to a selection and update the alert accordingly
    fn admit<T>(&mut self, selection: Vec<T>) -> Result<Vec<T>> {
        if self.is_generating() {
            return Err(AppError::InvalidRequest(
                "Cannot change uploads while generating.".to_string(),
            ));
        }

        let slots = self.uploads.available_slots();
        if slots == 0 {
            let err = AppError::UploadLimit {
                max: MAX_UPLOADS,
                accepted: 0,
            };
            self.raise(err.to_string());
            return Err(err);
        }

        let selected = selection.len();
        if selected > slots {
            let warning = AppError::UploadLimit {
                max: MAX_UPLOADS,
                accepted: slots,
            };
            debug!(selected, slots, "Truncating upload selection");
            self.raise(warning.to_string());
        } else {
            self.clear_errors();
        }

        Ok(selection.into_iter().take(slots).collect())
    }

    fn append(&mut self, images: Vec<UploadedImage>) -> usize {
        let added = self.uploads.extend(images);
        info!(added, total = self.uploads.len(), "Added uploads");
        added
    }

    /// Remove the upload at `index` (0-based)
    pub fn remove_image(&mut self, index: usize) -> Option<UploadedImage> {
        let removed = self.uploads.remove(index);
        if let Some(image) = &removed {
            debug!(index, file = %image.file_name, "Removed upload");
        }
        removed
    }

    pub fn set_character_description(&mut self, text: impl Into<String>) {
        self.form.character_description = text.into();
    }

    pub fn set_background_setting(&mut self, text: impl Into<String>) {
        self.form.background_setting = text.into();
    }

    pub fn set_remove_background(&mut self, enabled: bool) {
        self.form.remove_background = enabled;
    }

    pub fn toggle_remove_background(&mut self) -> bool {
        self.form.remove_background = !self.form.remove_background;
        self.form.remove_background
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.form.quality = quality;
    }

    /// Request built from the current uploads and form
    pub fn generation_request(&self) -> GenerationRequest {
        GenerationRequest::new(
            self.uploads.images().to_vec(),
            self.form.character_description.clone(),
            self.form.background_setting.clone(),
            self.form.remove_background,
        )
    }

    /// Validate and enter [`Phase::Generating`], clearing previous results and errors
    pub fn begin_generation(&mut self) -> Result<GenerationRequest> {
        if self.is_generating() {
            return Err(AppError::InvalidRequest(
                "A generation is already in progress.".to_string(),
            ));
        }
        if self.uploads.is_empty() {
            let err = AppError::NoUploads;
            self.raise(err.to_string());
            return Err(err);
        }

        self.alert = None;
        self.phase = Phase::Generating;
        debug!(quality = %self.form.quality, "Generation started");
        Ok(self.generation_request())
    }

    /// Leave [`Phase::Generating`] with the outcome of the client call
    pub fn complete_generation(&mut self, outcome: Result<GenerationResult>) -> Result<()> {
        match outcome {
            Ok(result) => {
                info!(count = result.len(), "Generation finished");
                self.phase = Phase::ResultsReady(result);
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Run a full generation with the current uploads and form
    pub async fn generate(&mut self) -> Result<()> {
        let request = self.begin_generation()?;
        let outcome = self.client.generate(request).await;
        self.complete_generation(outcome)
    }

    /// Save the result at `index` (0-based)
    pub async fn download(&self, index: usize) -> Result<PathBuf> {
        let image = self.results().get(index).ok_or_else(|| {
            AppError::InvalidRequest(format!("No generated image #{}", index + 1))
        })?;
        let path = self.files.download(image, index + 1).await?;
        info!(path = ?path, "Downloaded image");
        Ok(path)
    }

    /// Save every result
    pub async fn download_all(&self) -> Result<Vec<PathBuf>> {
        if self.results().is_empty() {
            return Ok(Vec::new());
        }
        let paths = self.files.download_all(self.results()).await?;
        info!(count = paths.len(), dir = ?self.files.output_dir(), "Downloaded all images");
        Ok(paths)
    }

    fn raise(&mut self, message: String) {
        if matches!(self.phase, Phase::Error(_)) {
            self.phase = Phase::Idle;
        }
        self.alert = Some(message);
    }

    fn clear_errors(&mut self) {
        if matches!(self.phase, Phase::Error(_)) {
            self.phase = Phase::Idle;
        }
        self.alert = None;
    }
}
