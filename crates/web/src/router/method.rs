use std::fmt;

use http::Method;

/// The methods a route answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    /// Every method, see [`Router::all`](crate::Router::all)
    All,
    Only(Method),
}

impl MethodFilter {
    #[inline]
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            MethodFilter::All => true,
            MethodFilter::Only(expected) => expected == method,
        }
    }
}

impl From<Method> for MethodFilter {
    fn from(method: Method) -> Self {
        MethodFilter::Only(method)
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodFilter::All => f.write_str("ALL"),
            MethodFilter::Only(method) => f.write_str(method.as_str()),
        }
    }
}
