//! JSX module
//!
//! The transpiler port and the file-system adapter that routes matching
//! files through it.

mod file_system;
mod transformer;

pub use file_system::JsxFileSystem;
pub use transformer::{CommandTransformer, JsxTransformer};

/// Normalize configured extensions to lowercase with a leading dot
pub fn normalize_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|ext| {
            let ext = ext.as_ref().trim().to_ascii_lowercase();
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{ext}")
            }
        })
        .filter(|ext| ext.len() > 1)
        .collect()
}
