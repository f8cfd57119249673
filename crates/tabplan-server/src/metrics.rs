//! Prometheus counters for the planning workflow

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    prompts_validated: IntCounterVec,
    plans_generated: IntCounterVec,
    transforms: IntCounterVec,
    noop_operations: IntCounter,
}

impl Metrics {
    pub fn new(namespace: &str) -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some(namespace.to_string()), None)?;

        let prompts_validated = IntCounterVec::new(
            Opts::new("prompts_validated_total", "Prompts run through the validator"),
            &["valid"],
        )?;
        let plans_generated = IntCounterVec::new(
            Opts::new("plans_generated_total", "Plan tables generated, by detector"),
            &["detector"],
        )?;
        let transforms = IntCounterVec::new(
            Opts::new("transforms_total", "Executed transforms, by outcome"),
            &["outcome"],
        )?;
        let noop_operations = IntCounter::new("noop_operations_total", "Operations skipped during execution")?;

        registry.register(Box::new(prompts_validated.clone()))?;
        registry.register(Box::new(plans_generated.clone()))?;
        registry.register(Box::new(transforms.clone()))?;
        registry.register(Box::new(noop_operations.clone()))?;

        Ok(Self {
            registry,
            prompts_validated,
            plans_generated,
            transforms,
            noop_operations,
        })
    }

    pub fn record_validation(&self, valid: bool) {
        let label = if valid { "true" } else { "false" };
        self.prompts_validated.with_label_values(&[label]).inc();
    }

    pub fn record_plan(&self, detectors: &[&str]) {
        for detector in detectors {
            self.plans_generated.with_label_values(&[*detector]).inc();
        }
    }

    pub fn record_transform(&self, outcome: &str) {
        self.transforms.with_label_values(&[outcome]).inc();
    }

    pub fn record_noops(&self, count: usize) {
        self.noop_operations.inc_by(count as u64);
    }

    /// Text exposition of every registered metric
    pub fn gather(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}
