pub mod cache;
pub mod catalog;
pub mod inventory;

pub use cache::{read_index, read_table, write_index, write_table};
pub use catalog::load_catalog;
pub use inventory::load_inventory;

use std::path::Path;

/// Display form of a path, with the home directory written as `~`.
pub fn short_path(path: &Path) -> String {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => under_home(path, Path::new(&home)),
        _ => path.display().to_string(),
    }
}

fn under_home(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}
