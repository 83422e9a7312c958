use std::path::PathBuf;

/// Expands a leading `~` (alone or followed by a separator) to the home
/// directory. Anything else, `~user` included, is returned unchanged.
pub fn expand_home<S: AsRef<str>>(path: S) -> PathBuf {
    expand_home_with(path.as_ref(), dirs::home_dir())
}

fn expand_home_with(path: &str, home_dir: Option<PathBuf>) -> PathBuf {
    let home = match home_dir {
        Some(home) => home,
        None => return PathBuf::from(path),
    };

    if path == "~" {
        return home;
    }

    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}
