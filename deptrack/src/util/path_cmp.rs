//! Platform-aware file name comparison.

use std::path::Path;

/// Compare two paths the way the host platform compares file names.
///
/// On Windows, file names are compared ASCII-case-insensitively and the
/// two directory separators are identified; everywhere else the
/// comparison is byte-for-byte. Both the dependency registry and the
/// note store deduplicate and look up under this comparison, so a note
/// recorded under a differently-cased spelling of a registered path
/// still matches on case-insensitive hosts.
#[cfg(not(windows))]
pub(crate) fn same_file_name(a: &Path, b: &Path) -> bool {
    a == b
}

#[cfg(windows)]
pub(crate) fn same_file_name(a: &Path, b: &Path) -> bool {
    let a = a.as_os_str().as_encoded_bytes();
    let b = b.as_os_str().as_encoded_bytes();

    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(&x, &y)| normalize(x) == normalize(y))
}

#[cfg(windows)]
fn normalize(byte: u8) -> u8 {
    if byte == b'\\' {
        b'/'
    } else {
        byte.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_paths_match() {
        assert!(same_file_name(Path::new("dir/a.s"), Path::new("dir/a.s")));
    }

    #[cfg(not(windows))]
    #[test]
    fn posix_compare_is_case_sensitive() {
        assert!(!same_file_name(Path::new("a.s"), Path::new("A.s")));
    }

    #[cfg(windows)]
    #[test]
    fn windows_compare_folds_case_and_separators() {
        assert!(same_file_name(Path::new("Dir\\A.s"), Path::new("dir/a.s")));
    }
}
