//! Prim path validation for local-ID drag items

use crate::error::{AnchorError, AnchorResult};

/// Whether `path` is an absolute prim path such as `/root/foo`
///
/// `/` alone names the pseudo-root. Every other component must be a
/// non-empty identifier: a letter or underscore followed by letters, digits
/// or underscores.
pub fn is_valid_prim_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    rest.split('/').all(is_identifier)
}

/// Check `path` with [`is_valid_prim_path`], naming `what` in the error
pub fn validate_prim_path(path: &str, what: &str) -> AnchorResult<()> {
    if is_valid_prim_path(path) {
        Ok(())
    } else {
        Err(AnchorError::InvalidArgument(format!("{what} '{path}' is not a valid prim path")))
    }
}

fn is_identifier(component: &str) -> bool {
    let mut chars = component.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert!(is_valid_prim_path("/"));
        assert!(is_valid_prim_path("/root"));
        assert!(is_valid_prim_path("/root/foo"));
        assert!(is_valid_prim_path("/_hidden/Geo_01"));
    }

    #[test]
    fn test_invalid_paths() {
        assert!(!is_valid_prim_path(""));
        assert!(!is_valid_prim_path("root/foo"));
        assert!(!is_valid_prim_path("/root/"));
        assert!(!is_valid_prim_path("/root//foo"));
        assert!(!is_valid_prim_path("/1st"));
        assert!(!is_valid_prim_path("/root/foo.bar"));
    }

    #[test]
    fn test_validate_names_the_argument() {
        let err = validate_prim_path("nope", "from_parent").unwrap_err();
        assert!(err.to_string().contains("from_parent"));
    }
}
