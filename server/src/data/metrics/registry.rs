//! Prometheus-backed metric registry
//!
//! Owns every metric family the exporter publishes. Families are registered
//! once at startup and handed out as cheap cloneable handles; handles are
//! updated concurrently by the export pipeline and read by the scrape
//! endpoint.
//!
//! Series values live in prometheus atomic cells, so concurrent `set`/`add`
//! calls on the same label tuple never lose updates.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use prometheus::core::Collector;
use prometheus::proto::MetricFamily;
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};

use super::error::RegistryError;

/// How a mapped value is written into its series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Overwrite the stored value (absolute readings)
    Set,
    /// Accumulate onto the stored value (interval deltas)
    Add,
}

#[derive(Clone)]
enum Family {
    Gauge(SeriesHandle),
    Counter(CounterHandle),
}

impl Family {
    fn label_names(&self) -> &[String] {
        match self {
            Family::Gauge(h) => &h.label_names,
            Family::Counter(h) => &h.label_names,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Family::Gauge(_) => "gauge",
            Family::Counter(_) => "counter",
        }
    }
}

/// Registry of named, labeled metric families
pub struct MetricRegistry {
    registry: Registry,
    families: RwLock<HashMap<String, Family>>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            families: RwLock::new(HashMap::new()),
        }
    }

    /// Register a gauge family, or return the existing handle when the same
    /// name was already registered with an identical label schema.
    pub fn register(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<SeriesHandle, RegistryError> {
        let mut families = self.families.write();
        if let Some(existing) = families.get(name) {
            return match existing {
                Family::Gauge(handle) if same_schema(&handle.label_names, label_names) => {
                    Ok(handle.clone())
                }
                other => Err(schema_mismatch(name, other)),
            };
        }

        let gauge = GaugeVec::new(Opts::new(name, help), label_names)?;
        self.registry.register(Box::new(gauge.clone()))?;

        let handle = SeriesHandle {
            name: Arc::from(name),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            gauge,
        };
        families.insert(name.to_string(), Family::Gauge(handle.clone()));
        tracing::debug!(metric = name, labels = ?label_names, "Registered gauge");
        Ok(handle)
    }

    /// Register a monotonic counter family (self-observability)
    pub fn register_counter(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<CounterHandle, RegistryError> {
        let mut families = self.families.write();
        if let Some(existing) = families.get(name) {
            return match existing {
                Family::Counter(handle) if same_schema(&handle.label_names, label_names) => {
                    Ok(handle.clone())
                }
                other => Err(schema_mismatch(name, other)),
            };
        }

        let counter = CounterVec::new(Opts::new(name, help), label_names)?;
        self.registry.register(Box::new(counter.clone()))?;

        let handle = CounterHandle {
            name: Arc::from(name),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            counter,
        };
        families.insert(name.to_string(), Family::Counter(handle.clone()));
        tracing::debug!(metric = name, labels = ?label_names, "Registered counter");
        Ok(handle)
    }

    /// Total number of live series across every registered family
    pub fn series_count(&self) -> usize {
        self.registry
            .gather()
            .iter()
            .map(|family| family.get_metric().len())
            .sum()
    }

    /// Render all families in the Prometheus text exposition format
    pub fn encode(&self) -> Result<String, RegistryError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| RegistryError::Encoding(e.to_string()))
    }

    /// Content type of [`encode`](Self::encode) output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}

/// Handle to one registered gauge family
#[derive(Clone)]
pub struct SeriesHandle {
    name: Arc<str>,
    label_names: Arc<[String]>,
    gauge: GaugeVec,
}

impl SeriesHandle {
    /// Overwrite the series identified by `label_values`
    pub fn set(&self, label_values: &[&str], value: f64) -> Result<(), RegistryError> {
        check_arity(&self.name, &self.label_names, label_values)?;
        self.gauge
            .get_metric_with_label_values(label_values)?
            .set(value);
        Ok(())
    }

    /// Accumulate onto the series identified by `label_values` (starts at 0)
    pub fn add(&self, label_values: &[&str], delta: f64) -> Result<(), RegistryError> {
        check_arity(&self.name, &self.label_names, label_values)?;
        self.gauge
            .get_metric_with_label_values(label_values)?
            .add(delta);
        Ok(())
    }

    pub fn update(
        &self,
        mode: UpdateMode,
        label_values: &[&str],
        value: f64,
    ) -> Result<(), RegistryError> {
        match mode {
            UpdateMode::Set => self.set(label_values, value),
            UpdateMode::Add => self.add(label_values, value),
        }
    }

    /// Current value of a series, without creating it
    pub fn get(&self, label_values: &[&str]) -> Option<f64> {
        let families = self.gauge.collect();
        find_series(&families, &self.label_names, label_values)
            .map(|metric| metric.get_gauge().get_value())
    }
}

/// Handle to one registered counter family
#[derive(Clone)]
pub struct CounterHandle {
    name: Arc<str>,
    label_names: Arc<[String]>,
    counter: CounterVec,
}

impl CounterHandle {
    pub fn inc(&self, label_values: &[&str]) -> Result<(), RegistryError> {
        check_arity(&self.name, &self.label_names, label_values)?;
        self.counter
            .get_metric_with_label_values(label_values)?
            .inc();
        Ok(())
    }

    pub fn get(&self, label_values: &[&str]) -> Option<f64> {
        let families = self.counter.collect();
        find_series(&families, &self.label_names, label_values)
            .map(|metric| metric.get_counter().get_value())
    }
}

fn check_arity(
    metric: &str,
    label_names: &[String],
    label_values: &[&str],
) -> Result<(), RegistryError> {
    debug_assert_eq!(
        label_names.len(),
        label_values.len(),
        "label arity mismatch for metric '{metric}'"
    );
    if label_names.len() != label_values.len() {
        return Err(RegistryError::LabelArity {
            metric: metric.to_string(),
            expected: label_names.len(),
            actual: label_values.len(),
        });
    }
    Ok(())
}

fn same_schema(registered: &[String], requested: &[&str]) -> bool {
    registered.len() == requested.len() && registered.iter().zip(requested).all(|(a, b)| a == b)
}

fn schema_mismatch(name: &str, existing: &Family) -> RegistryError {
    RegistryError::SchemaMismatch {
        metric: name.to_string(),
        registered: format!("{}: {}", existing.kind(), existing.label_names().join(", ")),
    }
}

fn find_series<'a>(
    families: &'a [MetricFamily],
    label_names: &[String],
    label_values: &[&str],
) -> Option<&'a prometheus::proto::Metric> {
    if label_names.len() != label_values.len() {
        return None;
    }
    families
        .iter()
        .flat_map(|family| family.get_metric())
        .find(|metric| {
            let pairs = metric.get_label();
            pairs.len() == label_names.len()
                && pairs.iter().all(|pair| {
                    label_names
                        .iter()
                        .position(|name| name == pair.get_name())
                        .is_some_and(|idx| label_values[idx] == pair.get_value())
                })
        })
}
