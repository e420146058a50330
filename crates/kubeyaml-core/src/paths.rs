//! Home-directory expansion for user supplied paths

use std::path::{Path, PathBuf};

/// Expand a leading `~` component to the current user's home directory
///
/// `~` and `~/rest` are expanded; `~user` forms and every other path are
/// returned unchanged, as is everything when no home directory is known.
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();

    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paths_unchanged() {
        assert_eq!(expand_tilde("manifests/app.yml"), PathBuf::from("manifests/app.yml"));
        assert_eq!(expand_tilde("/etc/kube.yml"), PathBuf::from("/etc/kube.yml"));
    }

    #[test]
    fn test_other_user_unchanged() {
        assert_eq!(expand_tilde("~alice/x.yml"), PathBuf::from("~alice/x.yml"));
    }

    #[test]
    fn test_tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };

        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("~/deploy/app.yml"), home.join("deploy/app.yml"));
    }
}
