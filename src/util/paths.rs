//! Path normalization helpers.

use std::path::Path;

/// Make every relative path in *paths* absolute by joining it onto
/// *base_dir*; already-absolute paths pass through untouched.
///
/// Pure string/path manipulation: no existence checks, no canonicalization.
pub fn absolutize<S: AsRef<str>>(paths: &[S], base_dir: &Path) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            let path = Path::new(p.as_ref());
            if path.is_absolute() {
                p.as_ref().to_string()
            } else {
                base_dir.join(path).to_string_lossy().into_owned()
            }
        })
        .collect()
}
