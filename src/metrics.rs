use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};
use std::time::Duration;

use crate::core::{DocumentError, OutputFormat};

static DOCUMENTS_GENERATED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "appendix_documents_generated_total",
        "Appendix documents generated, by output format",
        &["format"]
    )
    .expect("register appendix_documents_generated_total")
});

static GENERATION_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "appendix_generation_failures_total",
        "Failed appendix generations, by failure kind",
        &["kind"]
    )
    .expect("register appendix_generation_failures_total")
});

static GENERATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "appendix_generation_seconds",
        "Time spent laying out and converting one appendix",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("register appendix_generation_seconds")
});

pub fn record_generated(format: OutputFormat, elapsed: Duration) {
    DOCUMENTS_GENERATED
        .with_label_values(&[format.extension()])
        .inc();
    GENERATION_SECONDS.observe(elapsed.as_secs_f64());
}

pub fn record_failure(error: &DocumentError) {
    GENERATION_FAILURES.with_label_values(&[error.kind()]).inc();
}

/// Forces registration so `/metrics` lists the series before the first request.
pub fn init() {
    Lazy::force(&DOCUMENTS_GENERATED);
    Lazy::force(&GENERATION_FAILURES);
    Lazy::force(&GENERATION_SECONDS);
}
