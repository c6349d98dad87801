//! File classification by name.
//!
//! The walker and the upload client both sort files by extension; the rules
//! live here so they agree.

use serde::{Deserialize, Serialize};

use crate::project::DownloadKind;

const SOLIDWORKS_EXTENSIONS: [&str; 3] = [".sldprt", ".sldasm", ".slddrw"];
const IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".bmp", ".webp"];
const MODEL_EXTENSION: &str = ".glb";

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    let lower = name.to_ascii_lowercase();
    extensions.iter().any(|ext| lower.ends_with(ext))
}

pub fn is_solidworks_file(name: &str) -> bool {
    has_extension(name, &SOLIDWORKS_EXTENSIONS)
}

pub fn is_image_file(name: &str) -> bool {
    has_extension(name, &IMAGE_EXTENSIONS)
}

pub fn is_readme_file(name: &str) -> bool {
    name.to_ascii_lowercase().contains("readme")
}

pub fn is_model_file(name: &str) -> bool {
    has_extension(name, &[MODEL_EXTENSION])
}

pub fn download_kind(name: &str) -> DownloadKind {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".sldasm") {
        DownloadKind::Assembly
    } else if lower.ends_with(".sldprt") {
        DownloadKind::Part
    } else if lower.ends_with(".slddrw") {
        DownloadKind::Drawing
    } else {
        DownloadKind::File
    }
}

/// How an uploaded file is described in the generated README.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadFileRole {
    Assembly,
    Part,
    Drawing,
    Screenshot,
    Guide,
    Other,
}

impl UploadFileRole {
    pub fn from_name(name: &str) -> Self {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "sldasm" => UploadFileRole::Assembly,
            "sldprt" => UploadFileRole::Part,
            "slddrw" => UploadFileRole::Drawing,
            "png" | "jpg" | "jpeg" => UploadFileRole::Screenshot,
            "pdf" => UploadFileRole::Guide,
            _ => UploadFileRole::Other,
        }
    }
}
