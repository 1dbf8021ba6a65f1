//! Initials avatar URLs.
//!
//! The avatars endpoint renders an image from a name on request, so the URL
//! can be built locally without a round trip.

use url::Url;

/// Build the initials avatar URL for `name`.
///
/// Produces `{endpoint}/avatars/initials?name={name}&project={project_id}`.
#[must_use]
pub fn initials_url(endpoint: &Url, project_id: &str, name: &str) -> String {
    let mut url = endpoint.clone();
    // Validated endpoints always have a base; others keep their path as-is.
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(["avatars", "initials"]);
    }
    url.query_pairs_mut()
        .clear()
        .append_pair("name", name)
        .append_pair("project", project_id);
    url.into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_initials_url() {
        let endpoint = Url::parse("https://cloud.appwrite.io/v1").unwrap();
        assert_eq!(
            initials_url(&endpoint, "proj", "alice"),
            "https://cloud.appwrite.io/v1/avatars/initials?name=alice&project=proj"
        );
    }

    #[test]
    fn test_initials_url_encodes_name() {
        let endpoint = Url::parse("https://cloud.appwrite.io/v1").unwrap();
        let url = initials_url(&endpoint, "proj", "Alice Smith & co");
        assert!(url.contains("name=Alice+Smith+%26+co"));
    }

    #[test]
    fn test_initials_url_is_deterministic() {
        let endpoint = Url::parse("http://localhost/v1/").unwrap();
        assert_eq!(
            initials_url(&endpoint, "p", "bob"),
            initials_url(&endpoint, "p", "bob")
        );
        assert!(initials_url(&endpoint, "p", "bob").starts_with("http://localhost/v1/avatars/initials?"));
    }
}
