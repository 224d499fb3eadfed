//! Prometheus counters for operator actions.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;
use services::Activity;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ActionLabels {
    pub action: String,
    pub outcome: String,
}

pub struct Metrics {
    registry: Registry,
    actions: Family<ActionLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let actions = Family::<ActionLabels, Counter>::default();
        // exposed as console_actions_total
        registry.register(
            "console_actions",
            "Operator actions by kind and outcome",
            actions.clone(),
        );
        Self { registry, actions }
    }

    pub fn record(&self, activity: Activity, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.actions
            .get_or_create(&ActionLabels {
                action: activity.as_str().to_string(),
                outcome: outcome.to_string(),
            })
            .inc();
    }

    /// OpenMetrics text exposition of every registered metric.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}
