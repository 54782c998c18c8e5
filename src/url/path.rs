use std::path::{Path, PathBuf};
use url::Url;

/// File name used for directory-style URLs
pub const INDEX_FILE: &str = "index.html";

/// Maps an absolute URL to its file under the mirror root
///
/// The URL path is used verbatim (still percent-encoded, extension kept)
/// beneath `mirror_root`. An empty path, `/`, or any path ending in `/` gets
/// `index.html` appended. Query strings are ignored, so `/a/` and `/a/?p=2`
/// map to the same file; last write wins.
///
/// # Examples
///
/// ```
/// use site_mirror::url::map_to_path;
/// use std::path::Path;
/// use url::Url;
///
/// let root = Path::new("mirror");
/// let url = Url::parse("https://example.com/a/b/").unwrap();
/// assert_eq!(map_to_path(root, &url), Path::new("mirror/a/b/index.html"));
/// ```
pub fn map_to_path(mirror_root: &Path, url: &Url) -> PathBuf {
    let url_path = url.path();
    let mut path = mirror_root.to_path_buf();

    for segment in url_path
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
    {
        path.push(segment);
    }

    if url_path.is_empty() || url_path.ends_with('/') {
        path.push(INDEX_FILE);
    }

    path
}
