//! Shared constants and small helpers: media types, status-range
//! classification, URL path joining.

use url::Url;

use crate::error::Error;

pub const CONTENT_TYPE: &str = "Content-Type";

// Registered media type strings, without a charset parameter, so they
// compare exactly against parsed `Content-Type` media types.
pub const TYPE_JSON: &str = "application/json";
pub const TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const TYPE_MULTI: &str = "multipart/form-data";

/// True if the status code is between 100 and 199 inclusive.
pub fn is_info(status: u16) -> bool {
    (100..=199).contains(&status)
}

/// True if the status code is between 200 and 299 inclusive.
pub fn is_ok(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// True if the status code is between 300 and 399 inclusive.
pub fn is_redir(status: u16) -> bool {
    (300..=399).contains(&status)
}

/// True if the status code is between 400 and 499 inclusive.
pub fn is_client_err(status: u16) -> bool {
    (400..=499).contains(&status)
}

/// True if the status code is between 500 and 599 inclusive.
pub fn is_server_err(status: u16) -> bool {
    (500..=599).contains(&status)
}

/// Appends one segment to the URL path, slash-separated. The segment
/// must be non-empty; an empty segment would silently target the site
/// root, so it is rejected instead.
pub fn url_append(url: &mut Url, segment: &str) -> Result<(), Error> {
    if segment.is_empty() {
        return Err(Error::EmptySegment);
    }
    let mut segments = url
        .path_segments_mut()
        .map_err(|()| Error::Url("URL cannot carry path segments".to_string()))?;
    segments.pop_if_empty().push(segment);
    Ok(())
}

/// Appends every segment via [`url_append`].
pub fn url_join<I, S>(url: &mut Url, segments: I) -> Result<(), Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for segment in segments {
        url_append(url, segment.as_ref())?;
    }
    Ok(())
}
