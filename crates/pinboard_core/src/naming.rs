use std::path::{Path, PathBuf};

/// Path token of the thumbnail rendition in pin asset urls.
pub const LOW_RES_SEGMENT: &str = "/236x/";
/// Path token of the full-size rendition.
pub const HIGH_RES_SEGMENT: &str = "/736x/";

/// Directory name for a keyword: spaces are stripped.
pub fn directory_name(keyword: &str) -> String {
    keyword.chars().filter(|c| *c != ' ').collect()
}

/// Board directory, optionally nested under a root.
pub fn download_dir(root: Option<&Path>, keyword: &str) -> PathBuf {
    let name = directory_name(keyword);
    match root {
        Some(root) => root.join(name),
        None => PathBuf::from(name),
    }
}

/// `{keyword}_{index}.jpg`, spaces in the keyword become underscores.
pub fn image_filename(keyword: &str, success_index: u32) -> String {
    format!("{}_{}.jpg", keyword.replace(' ', "_"), success_index)
}

/// Swaps the thumbnail token for the full-size one.
///
/// Returns `None` when the url carries no thumbnail token; the low-res url is
/// never passed through.
pub fn upgrade_to_high_res(asset_url: &str) -> Option<String> {
    if asset_url.contains(LOW_RES_SEGMENT) {
        Some(asset_url.replace(LOW_RES_SEGMENT, HIGH_RES_SEGMENT))
    } else {
        None
    }
}
