//! Route templates compiled to anchored regular expressions.

use regex::Regex;

use crate::PathParams;
use crate::router::RouteError;

const PARAM_CAPTURE: &str = r"(\w+)";

/// A compiled route template such as `/users/:id/posts/:postId`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    regex: Regex,
    /// Parameter names with the index of the path segment they stand for.
    params: Vec<(usize, String)>,
}

impl PathPattern {
    /// Compiles `template`: regex metacharacters are escaped and every `:name` segment
    /// becomes a word capture, anchored at both ends.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidRoute`] if the template doesn't start with `/`.
    pub fn new(template: impl Into<String>) -> Result<Self, RouteError> {
        let template = template.into();
        if !template.starts_with('/') {
            return Err(RouteError::invalid_route(&template, "path must start with '/'"));
        }

        let body = template
            .split('/')
            .map(|segment| match placeholder(segment) {
                Some(_) => PARAM_CAPTURE.to_string(),
                None => regex::escape(segment),
            })
            .collect::<Vec<_>>()
            .join("/");
        let regex = Regex::new(&format!("^{body}$")).map_err(|e| RouteError::invalid_route(&template, e))?;

        let params = template
            .split('/')
            .enumerate()
            .filter_map(|(index, segment)| placeholder(segment).map(|name| (index, name.to_string())))
            .collect();

        Ok(Self { template, regex, params })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Pairs every placeholder with the path segment at the same position.
    pub fn params(&self, path: &str) -> PathParams {
        if self.params.is_empty() {
            return PathParams::empty();
        }

        let segments: Vec<&str> = path.split('/').collect();
        self.params
            .iter()
            .filter_map(|(index, name)| segments.get(*index).map(|value| (name.clone(), (*value).to_string())))
            .collect()
    }

    /// Returns the pattern of the same template mounted under `prefix`.
    ///
    /// The root prefix `/` adds nothing, a trailing `/` on the prefix is ignored, and the
    /// root route of a mounted router answers the prefix itself.
    pub(crate) fn with_prefix(&self, prefix: &str) -> Result<Self, RouteError> {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return Ok(self.clone());
        }
        if self.template == "/" {
            return Self::new(prefix);
        }
        Self::new(format!("{prefix}{}", self.template))
    }
}

/// Returns the parameter name of a `:name` segment.
fn placeholder(segment: &str) -> Option<&str> {
    segment
        .strip_prefix(':')
        .filter(|name| !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_'))
}
