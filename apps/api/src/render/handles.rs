//! Short profile handles ("johndoe") derived from full profile URLs.

use url::Url;

/// Profile platform whose URL layout is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilePlatform {
    LinkedIn,
    GitHub,
}

impl ProfilePlatform {
    fn host(self) -> &'static str {
        match self {
            ProfilePlatform::LinkedIn => "linkedin.com",
            ProfilePlatform::GitHub => "github.com",
        }
    }

    /// Path segment that precedes the handle on this platform (`linkedin.com/in/<handle>`).
    fn path_prefix(self) -> Option<&'static str> {
        match self {
            ProfilePlatform::LinkedIn => Some("in"),
            ProfilePlatform::GitHub => None,
        }
    }
}

/// Extracts the handle from a profile URL.
///
/// Accepts a bare handle (returned unchanged), or a URL with or without
/// scheme, `www.` and trailing slashes. Returns the first non-empty path
/// segment after the host (and after the platform prefix, if any), or an
/// empty string when there is none.
pub fn derive_handle(input: &str, platform: ProfilePlatform) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }
    if is_bare_handle(input) {
        return input.to_string();
    }

    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{input}")
    };
    let Ok(url) = Url::parse(&candidate) else {
        return String::new();
    };

    let mut segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let host = url.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.eq_ignore_ascii_case(platform.host()) {
        if let Some(prefix) = platform.path_prefix() {
            if segments.first() == Some(&prefix) {
                segments.remove(0);
            }
        }
    }

    segments
        .first()
        .map(|segment| segment.to_string())
        .unwrap_or_default()
}

fn is_bare_handle(input: &str) -> bool {
    input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
}
