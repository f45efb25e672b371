//! View preferences: filters, expand mode, toggles and the base host.

use serde::{Deserialize, Serialize};

/// Default lazy-load offset in pixels.
pub const DEFAULT_LAZY_LOAD_OFFSET: u32 = 800;

/// Which tests the report lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    All,
    Failed,
}

/// Which sections start expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpandMode {
    All,
    #[default]
    Errors,
    Retries,
    None,
}

/// Host part of the base-host override.
///
/// Follows slash-denotes-host parsing: `"http://h:1/x"` gives host `h:1` and
/// protocol `http:`, `"//h"` gives host `h` with no protocol, and anything
/// without `//` is taken verbatim as the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedHost {
    pub host: String,
    pub protocol: Option<String>,
}

impl ParsedHost {
    #[must_use]
    pub fn parse(base_host: &str) -> Self {
        if !base_host.contains("//") {
            return Self::verbatim(base_host);
        }
        let protocol_relative = base_host.starts_with("//");
        let candidate = if protocol_relative {
            format!("http:{base_host}")
        } else {
            base_host.to_string()
        };
        match url::Url::parse(&candidate) {
            Ok(parsed) => {
                let Some(host) = parsed.host_str() else {
                    return Self::verbatim(base_host);
                };
                // `Url` drops a scheme's default port; keep it when written out.
                let port = parsed
                    .port_or_known_default()
                    .filter(|_| has_explicit_port(&candidate));
                let host = match port {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                };
                Self {
                    host,
                    protocol: (!protocol_relative).then(|| format!("{}:", parsed.scheme())),
                }
            }
            Err(e) => {
                tracing::debug!(base_host, error = %e, "Base host is not a URL; using it verbatim");
                Self::verbatim(base_host)
            }
        }
    }

    fn verbatim(base_host: &str) -> Self {
        Self {
            host: base_host.to_string(),
            protocol: None,
        }
    }
}

/// Whether the authority of `url` ends in `:<digits>`.
fn has_explicit_port(url: &str) -> bool {
    let Some((_, rest)) = url.split_once("//") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    host_port
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}

/// View preferences. None of this is part of the authoritative run result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub view_mode: ViewMode,
    pub expand: ExpandMode,
    pub show_skipped: bool,
    pub show_only_diff: bool,
    pub scale_images: bool,
    pub lazy_load_offset: u32,
    pub group_by_error: bool,
    pub test_name_filter: String,
    pub filtered_browsers: Vec<String>,
    pub base_host: String,
    pub parsed_host: ParsedHost,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::All,
            expand: ExpandMode::Errors,
            show_skipped: false,
            show_only_diff: false,
            scale_images: false,
            lazy_load_offset: DEFAULT_LAZY_LOAD_OFFSET,
            group_by_error: false,
            test_name_filter: String::new(),
            filtered_browsers: Vec::new(),
            base_host: String::new(),
            parsed_host: ParsedHost::default(),
        }
    }
}

impl ViewState {
    pub fn set_base_host(&mut self, base_host: impl Into<String>) {
        self.base_host = base_host.into();
        self.parsed_host = ParsedHost::parse(&self.base_host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_is_verbatim() {
        let parsed = ParsedHost::parse("test.com");
        assert_eq!(parsed.host, "test.com");
        assert_eq!(parsed.protocol, None);
    }

    #[test]
    fn full_url_splits_protocol_and_host() {
        let parsed = ParsedHost::parse("https://qa.example.org:8443/some/path?x=1");
        assert_eq!(parsed.host, "qa.example.org:8443");
        assert_eq!(parsed.protocol.as_deref(), Some("https:"));
    }

    #[test]
    fn protocol_relative_has_no_protocol() {
        let parsed = ParsedHost::parse("//cdn.example.org/assets");
        assert_eq!(parsed.host, "cdn.example.org");
        assert_eq!(parsed.protocol, None);
    }

    #[test]
    fn default_port_is_kept_when_written() {
        let parsed = ParsedHost::parse("http://h:80");
        assert_eq!(parsed.host, "h:80");
        assert_eq!(parsed.protocol.as_deref(), Some("http:"));
        assert_eq!(ParsedHost::parse("https://user@h:443/x").host, "h:443");
        assert_eq!(ParsedHost::parse("//h:80/x").host, "h:80");
        assert_eq!(ParsedHost::parse("http://h/a:80").host, "h");
    }

    #[test]
    fn empty_host() {
        assert_eq!(ParsedHost::parse(""), ParsedHost::default());
    }

    #[test]
    fn set_base_host_updates_parsed_fields() {
        let mut view = ViewState::default();
        view.set_base_host("http://localhost:3000");
        assert_eq!(view.base_host, "http://localhost:3000");
        assert_eq!(view.parsed_host.host, "localhost:3000");
        assert_eq!(view.parsed_host.protocol.as_deref(), Some("http:"));
    }

    #[test]
    fn modes_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&ViewMode::Failed).unwrap(), "\"failed\"");
        assert_eq!(serde_json::to_string(&ExpandMode::None).unwrap(), "\"none\"");
    }
}
