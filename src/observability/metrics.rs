use prometheus::{
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub deliveries_created_total: IntCounter,
    pub sync_attempts_total: IntCounterVec,
    pub sync_batch_latency_seconds: Histogram,
    pub pending_sync_requests: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let deliveries_created_total = IntCounter::new(
            "deliveries_created_total",
            "Total delivery requests created",
        )
        .expect("valid deliveries_created_total metric");

        let sync_attempts_total = IntCounterVec::new(
            Opts::new("sync_attempts_total", "Sync payloads processed by outcome"),
            &["outcome"],
        )
        .expect("valid sync_attempts_total metric");

        let sync_batch_latency_seconds = Histogram::with_opts(prometheus::HistogramOpts::new(
            "sync_batch_latency_seconds",
            "Latency of sync batch reconciliation in seconds",
        ))
        .expect("valid sync_batch_latency_seconds metric");

        let pending_sync_requests = IntGauge::new(
            "pending_sync_requests",
            "Delivery requests currently awaiting sync",
        )
        .expect("valid pending_sync_requests metric");

        registry
            .register(Box::new(deliveries_created_total.clone()))
            .expect("register deliveries_created_total");
        registry
            .register(Box::new(sync_attempts_total.clone()))
            .expect("register sync_attempts_total");
        registry
            .register(Box::new(sync_batch_latency_seconds.clone()))
            .expect("register sync_batch_latency_seconds");
        registry
            .register(Box::new(pending_sync_requests.clone()))
            .expect("register pending_sync_requests");

        Self {
            registry,
            deliveries_created_total,
            sync_attempts_total,
            sync_batch_latency_seconds,
            pending_sync_requests,
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
