use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub pickup_requests_total: IntCounterVec,
    pub invoices_generated_total: IntCounter,
    pub emails_total: IntCounterVec,
    pub notifications_in_queue: IntGauge,
    pub notification_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let pickup_requests_total = IntCounterVec::new(
            Opts::new(
                "pickup_requests_total",
                "Pickup requests by resulting status",
            ),
            &["status"],
        )
        .expect("valid pickup_requests_total metric");

        let invoices_generated_total = IntCounter::new(
            "invoices_generated_total",
            "Invoices created or recomputed",
        )
        .expect("valid invoices_generated_total metric");

        let emails_total = IntCounterVec::new(
            Opts::new("emails_total", "Emails attempted by kind and outcome"),
            &["kind", "outcome"],
        )
        .expect("valid emails_total metric");

        let notifications_in_queue = IntGauge::new(
            "notifications_in_queue",
            "Current number of queued notification events",
        )
        .expect("valid notifications_in_queue metric");

        let notification_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "notification_latency_seconds",
                "Latency of notification processing in seconds",
            ),
            &["outcome"],
        )
        .expect("valid notification_latency_seconds metric");

        registry
            .register(Box::new(pickup_requests_total.clone()))
            .expect("register pickup_requests_total");
        registry
            .register(Box::new(invoices_generated_total.clone()))
            .expect("register invoices_generated_total");
        registry
            .register(Box::new(emails_total.clone()))
            .expect("register emails_total");
        registry
            .register(Box::new(notifications_in_queue.clone()))
            .expect("register notifications_in_queue");
        registry
            .register(Box::new(notification_latency_seconds.clone()))
            .expect("register notification_latency_seconds");

        Self {
            registry,
            pickup_requests_total,
            invoices_generated_total,
            emails_total,
            notifications_in_queue,
            notification_latency_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
