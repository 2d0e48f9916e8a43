//! Status code to reason phrase table.
//!
//! The table follows the IANA status code registry, with the three unofficial
//! codes that nginx made common (444, 499 and 599).

use crate::protocol::UnknownStatus;

/// Sorted by code, looked up with a binary search.
static REASON_PHRASES: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (102, "Processing"),
    (103, "Early Hints"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (207, "Multi-Status"),
    (208, "Already Reported"),
    (226, "IM Used"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    (307, "Temporary Redirect"),
    (308, "Permanent Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Payload Too Large"),
    (414, "URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (418, "I'm a teapot"),
    (421, "Misdirected Request"),
    (422, "Unprocessable Entity"),
    (423, "Locked"),
    (424, "Failed Dependency"),
    (425, "Too Early"),
    (426, "Upgrade Required"),
    (428, "Precondition Required"),
    (429, "Too Many Requests"),
    (431, "Request Header Fields Too Large"),
    (444, "Connection Closed Without Response"),
    (451, "Unavailable For Legal Reasons"),
    (499, "Client Closed Request"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
    (506, "Variant Also Negotiates"),
    (507, "Insufficient Storage"),
    (508, "Loop Detected"),
    (510, "Not Extended"),
    (511, "Network Authentication Required"),
    (599, "Network Connect Timeout Error"),
];

/// Returns the reason phrase registered for `code`.
///
/// # Errors
///
/// Returns [`UnknownStatus`] when the code is not part of the table.
pub fn reason_phrase(code: u16) -> Result<&'static str, UnknownStatus> {
    REASON_PHRASES
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|index| REASON_PHRASES[index].1)
        .ok_or(UnknownStatus(code))
}

/// Returns true when `code` has a registered reason phrase.
#[inline]
pub fn is_known(code: u16) -> bool {
    reason_phrase(code).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        assert!(REASON_PHRASES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn known_codes() {
        assert_eq!(reason_phrase(200), Ok("OK"));
        assert_eq!(reason_phrase(404), Ok("Not Found"));
        assert_eq!(reason_phrase(444), Ok("Connection Closed Without Response"));
        assert_eq!(reason_phrase(599), Ok("Network Connect Timeout Error"));
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(reason_phrase(299), Err(UnknownStatus(299)));
        assert_eq!(reason_phrase(0), Err(UnknownStatus(0)));
        assert!(!is_known(999));
    }
}
