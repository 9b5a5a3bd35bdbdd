//! Content-addressed storage layer (§4.E): copies uploads into
//! `root/{modality}/{collection}/{name}`, suffixing collisions, and serves
//! the path-safety check the download endpoint reuses (§8 P8, §9).

use std::path::{Component, Path, PathBuf};

use crate::error::IngestError;

/// Strips control characters, angle brackets, and path separators from a
/// desired file name before it is joined onto the storage root (§9).
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*'))
        .collect();
    let cleaned = cleaned.replace(['/', '\\'], "_");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Rejects any path whose normalized form contains a `..` segment or an
/// absolute prefix (§8 P8, §9). Used both for names destined for storage
/// and for download requests resolving a stored `storage_uri`.
pub fn is_safe_relative_path(path: &Path) -> bool {
    if path.is_absolute() {
        return false;
    }
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

fn split_stem_and_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => (&name[..idx], &name[idx..]),
    }
}

/// Copies `source_path` into `<root>/<modality>/<collection>/<desired_name>`,
/// appending `_1`, `_2`, … before the extension until the destination name
/// is unique. Returns the forward-slash relative URI (§4.E).
pub fn copy_into_storage(
    root: &Path,
    source_path: &Path,
    modality: &str,
    collection: &str,
    desired_name: &str,
) -> Result<String, IngestError> {
    let safe_name = sanitize_name(desired_name);
    let dest_dir = root.join(modality).join(collection);

    let relative_dir = PathBuf::from(modality).join(collection);
    if !is_safe_relative_path(&relative_dir) {
        return Err(IngestError::InvalidPath(format!("unsafe modality/collection path: {modality}/{collection}")));
    }

    std::fs::create_dir_all(&dest_dir).map_err(|e| IngestError::StorageWriteFailed(e.to_string()))?;

    let (stem, ext) = split_stem_and_ext(&safe_name);
    let mut candidate = safe_name.clone();
    let mut attempt = 0;
    while dest_dir.join(&candidate).exists() {
        attempt += 1;
        candidate = format!("{stem}_{attempt}{ext}");
    }

    let dest_path = dest_dir.join(&candidate);
    std::fs::copy(source_path, &dest_path).map_err(|e| IngestError::StorageWriteFailed(e.to_string()))?;

    let relative = PathBuf::from(modality).join(collection).join(&candidate);
    Ok(relative.to_string_lossy().replace('\\', "/"))
}

/// Resolves a `storage_uri` against `root`, rejecting any path escaping it
/// (§6 download endpoint, §8 P8).
pub fn resolve_download_path(root: &Path, relative_uri: &str) -> Result<PathBuf, IngestError> {
    let relative = PathBuf::from(relative_uri);
    if !is_safe_relative_path(&relative) {
        return Err(IngestError::InvalidPath(format!("path escapes storage root: {relative_uri}")));
    }
    Ok(root.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn first_copy_uses_desired_name_unchanged() {
        let root = tempdir().unwrap();
        let src = tempdir().unwrap();
        let src_file = src.path().join("cat.jpg");
        std::fs::write(&src_file, b"abc").unwrap();

        let uri = copy_into_storage(root.path(), &src_file, "image", "media_assets", "cat.jpg").unwrap();
        assert_eq!(uri, "image/media_assets/cat.jpg");
    }

    #[test]
    fn collision_appends_numeric_suffix() {
        let root = tempdir().unwrap();
        let src = tempdir().unwrap();
        let first = src.path().join("a.jpg");
        let second = src.path().join("b.jpg");
        std::fs::write(&first, b"abc").unwrap();
        std::fs::write(&second, b"different content").unwrap();

        copy_into_storage(root.path(), &first, "image", "media_assets", "cat.jpg").unwrap();
        let uri = copy_into_storage(root.path(), &second, "image", "media_assets", "cat.jpg").unwrap();
        assert_eq!(uri, "image/media_assets/cat_1.jpg");
    }

    #[test]
    fn rejects_dot_dot_segments() {
        let root = tempdir().unwrap();
        let err = resolve_download_path(root.path(), "../../etc/passwd").unwrap_err();
        assert_eq!(err.code(), "INVALID_PATH");
    }

    #[test]
    fn rejects_absolute_paths() {
        let root = tempdir().unwrap();
        let err = resolve_download_path(root.path(), "/etc/passwd").unwrap_err();
        assert_eq!(err.code(), "INVALID_PATH");
    }

    #[test]
    fn accepts_ordinary_relative_paths() {
        let root = tempdir().unwrap();
        let resolved = resolve_download_path(root.path(), "image/media_assets/cat.jpg").unwrap();
        assert_eq!(resolved, root.path().join("image/media_assets/cat.jpg"));
    }

    #[test]
    fn sanitize_name_strips_reserved_characters() {
        assert_eq!(sanitize_name("a/b\\c:d*e"), "a_b_cde");
    }
}
