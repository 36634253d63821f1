use biometrics::{Collector, Counter, Moments};

pub(crate) static CONTROLLER_REQUESTS: Counter = Counter::new("chatterbox.controller.requests");
pub(crate) static CONTROLLER_UPLOADS: Counter = Counter::new("chatterbox.controller.uploads");
pub(crate) static CONTROLLER_FAILURES: Counter = Counter::new("chatterbox.controller.failures");
pub(crate) static CONTROLLER_REJECTED: Counter = Counter::new("chatterbox.controller.rejected");
pub(crate) static CONTROLLER_STALE_SETTLES: Counter =
    Counter::new("chatterbox.controller.stale_settles");
pub(crate) static CONTROLLER_REQUEST_DURATION: Moments =
    Moments::new("chatterbox.controller.request_duration_seconds");

pub(crate) static TRANSPORT_REQUESTS: Counter = Counter::new("chatterbox.transport.requests");
pub(crate) static TRANSPORT_ERRORS: Counter = Counter::new("chatterbox.transport.errors");

pub(crate) static HISTORY_APPENDS: Counter = Counter::new("chatterbox.history.appends");
pub(crate) static HISTORY_EVICTIONS: Counter = Counter::new("chatterbox.history.evictions");
pub(crate) static HISTORY_LOAD_FAILURES: Counter =
    Counter::new("chatterbox.history.load_failures");
pub(crate) static HISTORY_PERSIST_FAILURES: Counter =
    Counter::new("chatterbox.history.persist_failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CONTROLLER_REQUESTS);
    collector.register_counter(&CONTROLLER_UPLOADS);
    collector.register_counter(&CONTROLLER_FAILURES);
    collector.register_counter(&CONTROLLER_REJECTED);
    collector.register_counter(&CONTROLLER_STALE_SETTLES);
    collector.register_moments(&CONTROLLER_REQUEST_DURATION);

    collector.register_counter(&TRANSPORT_REQUESTS);
    collector.register_counter(&TRANSPORT_ERRORS);

    collector.register_counter(&HISTORY_APPENDS);
    collector.register_counter(&HISTORY_EVICTIONS);
    collector.register_counter(&HISTORY_LOAD_FAILURES);
    collector.register_counter(&HISTORY_PERSIST_FAILURES);
}
