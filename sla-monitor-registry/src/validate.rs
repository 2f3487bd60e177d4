//! Startup validation.
//!
//! All invariants are checked up front and reported together — a
//! misconfigured deployment should see every problem in one failure, not
//! discover them one restart at a time.

use std::time::Duration;

use sla_monitor_core::{Error, ServiceConfig};

use crate::defaults::{MIN_CYCLE_INTERVAL, MIN_REQUEST_TIMEOUT};

pub fn validate(services: &[ServiceConfig], cycle_interval: Duration) -> Result<(), Error> {
    let mut problems = Vec::new();

    if cycle_interval < MIN_CYCLE_INTERVAL {
        problems.push(format!(
            "monitoring interval {:?} is below the minimum of {:?}",
            cycle_interval, MIN_CYCLE_INTERVAL
        ));
    }

    if services.is_empty() {
        problems.push("no services resolved from descriptor file, environment, or defaults".to_string());
    }

    for service in services {
        if let Err(e) = url::Url::parse(&service.url) {
            problems.push(format!("service '{}': invalid url '{}': {e}", service.id, service.url));
        }

        if service.timeout < MIN_REQUEST_TIMEOUT {
            problems.push(format!(
                "service '{}': timeout {:?} is below the minimum of {:?}",
                service.id, service.timeout, MIN_REQUEST_TIMEOUT
            ));
        }

        if service.timeout >= cycle_interval {
            problems.push(format!(
                "service '{}': timeout {:?} must be strictly less than the cycle interval {:?}",
                service.id, service.timeout, cycle_interval
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(problems))
    }
}
