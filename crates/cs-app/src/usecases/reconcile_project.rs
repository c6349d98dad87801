//! Turns the file listing of one project folder into a [`ProjectRecord`].
//!
//! Pure: no I/O, no logging. The walker decides which listing belongs to
//! which project and hands it over together with the 1-based number.

use cs_core::classify::{download_kind, is_image_file, is_model_file, is_readme_file, is_solidworks_file};
use cs_core::convention::is_spot_test_folder;
use cs_core::{ContentEntry, DayKey, Download, ProjectRecord, WorkType};

/// Build the record of one project.
///
/// - downloads: every SOLIDWORKS file, in listing order
/// - preview: first image; the remaining images become additional previews
/// - detail page: the README when present, otherwise the folder itself
/// - 3D model: first `.glb`
///
/// Directories inside `files` are ignored.
pub fn reconcile_project(
    folder: &ContentEntry,
    files: &[ContentEntry],
    kind: WorkType,
    day: &DayKey,
    number: u32,
) -> ProjectRecord {
    let files: Vec<&ContentEntry> = files.iter().filter(|entry| entry.is_file()).collect();

    let downloads = files
        .iter()
        .filter(|entry| is_solidworks_file(&entry.name))
        .map(|entry| Download {
            kind: download_kind(&entry.name),
            url: entry.raw_url(),
        })
        .collect();

    let mut images = files
        .iter()
        .filter(|entry| is_image_file(&entry.name))
        .map(|entry| entry.raw_url());
    let preview_url = images.next();
    let additional_preview_urls = images.collect();

    let detail_page_url = files
        .iter()
        .find(|entry| is_readme_file(&entry.name))
        .map(|readme| readme.web_url())
        .unwrap_or_else(|| folder.web_url());

    let model3d_url = files
        .iter()
        .find(|entry| is_model_file(&entry.name))
        .map(|model| model.raw_url());

    ProjectRecord {
        name: ProjectRecord::display_name(kind, number, day),
        detail_page_url,
        downloads,
        preview_url,
        additional_preview_urls,
        model3d_url,
        is_spot_test: is_spot_test_folder(&folder.name),
    }
}
