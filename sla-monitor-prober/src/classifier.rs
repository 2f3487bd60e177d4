//! Classifier
//!
//! Maps a completed `ProbeResult` to an error taxonomy tag and a daily
//! uptime bucket. Pure and stateless — the same `ProbeResult` always
//! classifies the same way, independent of anything persisted so far.

use sla_monitor_core::{ErrorType, ProbeResult, ProbeStatus, UptimeBucket};

/// The canonical 4xx rule fixed throughout this workspace: the uptime
/// bucket treats 4xx as `po` (partial outage — the service answered, it
/// just didn't like the request); the live `ProbeStatus` is `Degraded` iff
/// the status code fell outside the service's expected list, computed by
/// the prober itself, not re-derived here.
pub fn classify(result: &ProbeResult) -> (Option<ErrorType>, UptimeBucket) {
    let error_type = error_type_of(result);

    let bucket = match result.status {
        ProbeStatus::Operational if result.http_status >= 400 && result.http_status < 500 => {
            UptimeBucket::PartialOutage
        }
        ProbeStatus::Operational => UptimeBucket::Operational,
        ProbeStatus::Degraded => UptimeBucket::PartialOutage,
        ProbeStatus::Down => UptimeBucket::MajorOutage,
    };

    (error_type, bucket)
}

fn error_type_of(result: &ProbeResult) -> Option<ErrorType> {
    if result.status == ProbeStatus::Operational && result.http_status < 400 {
        return None;
    }

    if result.http_status == 0 {
        let is_timeout = result
            .error
            .as_deref()
            .map(|msg| msg.eq_ignore_ascii_case("timeout") || msg.contains("timed out"))
            .unwrap_or(false);

        if is_timeout {
            return Some(ErrorType::Timeout);
        }

        let is_dns = result
            .error
            .as_deref()
            .map(|msg| {
                let lower = msg.to_ascii_lowercase();
                lower.contains("dns") || lower.contains("name resolution") || lower.contains("lookup")
            })
            .unwrap_or(false);

        if is_dns {
            return Some(ErrorType::DnsError);
        }

        return Some(ErrorType::ConnectionError);
    }

    if result.http_status >= 400 {
        return Some(ErrorType::HttpError);
    }

    None
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sla_monitor_core::ProbeResult;

    use super::*;

    fn result(status: ProbeStatus, http_status: u16, error: Option<&str>) -> ProbeResult {
        ProbeResult {
            service_id: "svc".to_string(),
            url: "https://svc.example.com/health".to_string(),
            method: "GET".to_string(),
            status,
            http_status,
            response_time_ms: 100,
            timestamp: Utc::now(),
            error: error.map(str::to_string),
            attempts_used: 1,
        }
    }

    #[test]
    fn operational_200_has_no_error_type_and_operational_bucket() {
        let (error_type, bucket) = classify(&result(ProbeStatus::Operational, 200, None));
        assert_eq!(error_type, None);
        assert_eq!(bucket, UptimeBucket::Operational);
    }

    #[test]
    fn operational_4xx_is_http_error_with_partial_outage_bucket() {
        let (error_type, bucket) = classify(&result(ProbeStatus::Operational, 400, Some("bad request")));
        assert_eq!(error_type, Some(ErrorType::HttpError));
        assert_eq!(bucket, UptimeBucket::PartialOutage);
    }

    #[test]
    fn degraded_4xx_is_http_error_with_partial_outage_bucket() {
        let (error_type, bucket) = classify(&result(ProbeStatus::Degraded, 404, Some("not found")));
        assert_eq!(error_type, Some(ErrorType::HttpError));
        assert_eq!(bucket, UptimeBucket::PartialOutage);
    }

    #[test]
    fn down_5xx_is_http_error_with_major_outage_bucket() {
        let (error_type, bucket) = classify(&result(ProbeStatus::Down, 503, Some("service unavailable")));
        assert_eq!(error_type, Some(ErrorType::HttpError));
        assert_eq!(bucket, UptimeBucket::MajorOutage);
    }

    #[test]
    fn down_with_no_response_and_timeout_message_classifies_as_timeout() {
        let (error_type, bucket) = classify(&result(ProbeStatus::Down, 0, Some("request timed out")));
        assert_eq!(error_type, Some(ErrorType::Timeout));
        assert_eq!(bucket, UptimeBucket::MajorOutage);
    }

    #[test]
    fn down_with_no_response_and_dns_message_classifies_as_dns_error() {
        let (error_type, _bucket) = classify(&result(ProbeStatus::Down, 0, Some("dns lookup failed for host")));
        assert_eq!(error_type, Some(ErrorType::DnsError));
    }

    #[test]
    fn down_with_no_response_and_unrecognized_message_classifies_as_connection_error() {
        let (error_type, _bucket) = classify(&result(ProbeStatus::Down, 0, Some("connection reset by peer")));
        assert_eq!(error_type, Some(ErrorType::ConnectionError));
    }

    #[test]
    fn cancelled_probe_has_no_response_and_classifies_as_connection_error() {
        let (error_type, bucket) = classify(&result(ProbeStatus::Down, 0, Some("cancelled")));
        assert_eq!(error_type, Some(ErrorType::ConnectionError));
        assert_eq!(bucket, UptimeBucket::MajorOutage);
    }

    proptest::proptest! {
        /// `Down` always buckets as `mo`, independent of which status code
        /// or error message happened to accompany it.
        #[test]
        fn down_always_buckets_as_major_outage(http_status in 0u16..600, error in ".*") {
            let (_error_type, bucket) = classify(&result(ProbeStatus::Down, http_status, Some(&error)));
            proptest::prop_assert_eq!(bucket, UptimeBucket::MajorOutage);
        }

        /// Any 4xx response, whatever the live `ProbeStatus` the prober
        /// assigned it, always buckets as `po` — the canonical 4xx rule
        /// applies uniformly regardless of `expected_statuses`.
        #[test]
        fn any_4xx_buckets_as_partial_outage(http_status in 400u16..500) {
            for status in [ProbeStatus::Operational, ProbeStatus::Degraded] {
                let (_error_type, bucket) = classify(&result(status, http_status, Some("http error")));
                proptest::prop_assert_eq!(bucket, UptimeBucket::PartialOutage);
            }
        }

        /// A clean 2xx/3xx operational result never carries an error type.
        #[test]
        fn operational_below_400_has_no_error_type(http_status in 1u16..400) {
            let (error_type, bucket) = classify(&result(ProbeStatus::Operational, http_status, None));
            proptest::prop_assert_eq!(error_type, None);
            proptest::prop_assert_eq!(bucket, UptimeBucket::Operational);
        }
    }
}
