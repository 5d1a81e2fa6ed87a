use std::{
    collections::{BTreeMap, HashMap},
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::error::MetricError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    Counter,
    Gauge,
    Rate,
    /// Summarized through a histogram instead of being sent per sample.
    Trend,
}
impl core::fmt::Display for MetricType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Rate => "rate",
            MetricType::Trend => "trend",
        };
        f.write_str(name)
    }
}

/// Handle assigned once per metric by a [`MetricRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricId(u32);

#[derive(Debug)]
pub struct Metric {
    id: MetricId,
    name: String,
    metric_type: MetricType,
}
impl Metric {
    pub fn id(&self) -> MetricId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }
}

#[derive(Debug, Default)]
pub struct MetricRegistry {
    metrics: HashMap<String, Arc<Metric>>,
}
impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the already registered metric when the name and the type match.
    pub fn new_metric(
        &mut self,
        name: &str,
        metric_type: MetricType,
    ) -> Result<Arc<Metric>, MetricError> {
        if name.is_empty() {
            return Err(MetricError::EmptyName);
        }
        if let Some(metric) = self.metrics.get(name) {
            if metric.metric_type != metric_type {
                return Err(MetricError::TypeMismatch {
                    name: name.to_owned(),
                    registered: metric.metric_type,
                    requested: metric_type,
                });
            }
            return Ok(Arc::clone(metric));
        }
        let id = u32::try_from(self.metrics.len()).map_err(|_| MetricError::TooManyMetrics)?;
        let metric = Arc::new(Metric {
            id: MetricId(id),
            name: name.to_owned(),
            metric_type,
        });
        self.metrics.insert(name.to_owned(), Arc::clone(&metric));
        Ok(metric)
    }
    pub fn get(&self, name: &str) -> Option<&Arc<Metric>> {
        self.metrics.get(name)
    }
    pub fn len(&self) -> usize {
        self.metrics.len()
    }
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Unordered set of tag pairs; equality only depends on the contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagSet {
    tags: BTreeMap<String, String>,
}
impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
    pub fn len(&self) -> usize {
        self.tags.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
impl<K, V> FromIterator<(K, V)> for TagSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let tags = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { tags }
    }
}

/// A metric paired with one concrete tag set.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    metric: Arc<Metric>,
    tags: Arc<TagSet>,
}
impl TimeSeries {
    pub fn new(metric: Arc<Metric>, tags: Arc<TagSet>) -> Self {
        Self { metric, tags }
    }

    pub fn metric(&self) -> &Arc<Metric> {
        &self.metric
    }
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }
}
impl PartialEq for TimeSeries {
    fn eq(&self, other: &Self) -> bool {
        self.metric.id == other.metric.id && self.tags == other.tags
    }
}
impl Eq for TimeSeries {}
impl Hash for TimeSeries {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.metric.id.hash(state);
        self.tags.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn registry_reuses_metric_with_same_type() {
        let mut registry = MetricRegistry::new();
        let a = registry.new_metric("http_reqs", MetricType::Counter).unwrap();
        let b = registry.new_metric("http_reqs", MetricType::Counter).unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(registry.len(), 1);

        let c = registry.new_metric("vus", MetricType::Gauge).unwrap();
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn registry_rejects_type_mismatch() {
        let mut registry = MetricRegistry::new();
        registry.new_metric("http_reqs", MetricType::Counter).unwrap();
        let err = registry
            .new_metric("http_reqs", MetricType::Trend)
            .unwrap_err();
        assert!(matches!(err, MetricError::TypeMismatch { .. }));
        assert!(matches!(
            registry.new_metric("", MetricType::Rate),
            Err(MetricError::EmptyName)
        ));
    }

    #[test]
    fn time_series_identity_follows_tag_contents() {
        let mut registry = MetricRegistry::new();
        let metric = registry.new_metric("http_req_duration", MetricType::Trend).unwrap();

        let a = TimeSeries::new(
            Arc::clone(&metric),
            Arc::new(TagSet::new().with("method", "GET").with("status", "200")),
        );
        let b = TimeSeries::new(
            Arc::clone(&metric),
            Arc::new([("status", "200"), ("method", "GET")].into_iter().collect()),
        );
        let c = TimeSeries::new(metric, Arc::new(TagSet::new().with("method", "POST")));
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
