use lazy_static::lazy_static;
use regex::Regex;

/// Turn an issue title into something safe to use as a file name.
///
/// Characters rejected by common filesystems are dropped, surrounding
/// whitespace is trimmed and the remaining spaces become hyphens. Case and
/// any other punctuation are left alone.
pub fn sanitize_title(title: &str) -> String {
    lazy_static! {
        static ref ILLEGAL: Regex = Regex::new(r#"[/\\:*?"<>|]"#).unwrap();
    }

    ILLEGAL.replace_all(title, "").trim().replace(' ', "-")
}

/// Make a label name usable as a single path component.
///
/// Separators become hyphens and names made only of dots are replaced, so a
/// category can neither nest directories nor climb out of its root.
pub fn path_segment(name: &str) -> String {
    let segment = name.replace(['/', '\\'], "-");
    if segment.chars().all(|c| c == '.') {
        segment.replace('.', "_")
    } else {
        segment
    }
}

/// Percent-encode the spaces of a relative link target.
pub fn encode_path(path: &str) -> String {
    path.replace(' ', "%20")
}
