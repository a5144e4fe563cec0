//! # Provider Error Sanitization
//!
//! The Scalapay API sometimes surfaces raw transport traces as error
//! messages (status line, headers, request ids). Those are useless and
//! confusing to a customer, so anything that looks like a protocol dump is
//! replaced with a generic message before display. Meaningful messages pass
//! through verbatim.

/// Shown in place of a raw protocol trace
pub const GENERIC_TECHNICAL_ERROR: &str = "We are sorry, a technical error occurred. \
     Please try again, or contact us if the problem persists.";

/// Sanitize a provider error message for end-user display.
pub fn sanitize_api_error(message: &str) -> String {
    if message.contains("HTTP") {
        GENERIC_TECHNICAL_ERROR.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_protocol_trace_is_replaced() {
        let raw = "HTTP/1.1 401 Unauthorized\n\
                   Date: Mon, 18 Oct 2021 13:07:20 GMT\n\
                   Content-Type: application/json\n\
                   Unauthorized";
        assert_eq!(sanitize_api_error(raw), GENERIC_TECHNICAL_ERROR);
    }

    #[test]
    fn test_embedded_marker_is_replaced() {
        assert_eq!(
            sanitize_api_error("error: HTTP 502 from upstream"),
            GENERIC_TECHNICAL_ERROR
        );
    }

    #[test]
    fn test_meaningful_message_passes_through() {
        assert_eq!(sanitize_api_error("Invalid SKU"), "Invalid SKU");
        assert_eq!(sanitize_api_error(""), "");
    }
}
