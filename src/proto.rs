// Wire messages of the metrics ingestion API, see `proto/metrics.proto`.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetricSet {
    #[prost(message, repeated, tag = "1")]
    pub metrics: Vec<Metric>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Metric {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "MetricType", tag = "2")]
    pub r#type: i32,
    #[prost(message, repeated, tag = "3")]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MetricType {
    Unspecified = 0,
    Counter = 1,
    Gauge = 2,
    Rate = 3,
    Trend = 4,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimeSeries {
    #[prost(message, repeated, tag = "1")]
    pub labels: Vec<Label>,
    #[prost(oneof = "time_series::Samples", tags = "2, 3, 4, 5")]
    pub samples: Option<time_series::Samples>,
}

pub mod time_series {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Samples {
        #[prost(message, tag = "2")]
        CounterSamples(super::CounterSamples),
        #[prost(message, tag = "3")]
        GaugeSamples(super::GaugeSamples),
        #[prost(message, tag = "4")]
        RateSamples(super::RateSamples),
        #[prost(message, tag = "5")]
        TrendHdrSamples(super::TrendHdrSamples),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Label {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CounterSamples {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<CounterValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CounterValue {
    #[prost(message, optional, tag = "1")]
    pub time: Option<::prost_types::Timestamp>,
    #[prost(double, tag = "2")]
    pub value: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GaugeSamples {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<GaugeValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GaugeValue {
    #[prost(message, optional, tag = "1")]
    pub time: Option<::prost_types::Timestamp>,
    #[prost(double, tag = "2")]
    pub last: f64,
    #[prost(double, tag = "3")]
    pub min: f64,
    #[prost(double, tag = "4")]
    pub max: f64,
    #[prost(double, tag = "5")]
    pub avg: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RateSamples {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<RateValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RateValue {
    #[prost(message, optional, tag = "1")]
    pub time: Option<::prost_types::Timestamp>,
    #[prost(uint32, tag = "2")]
    pub nonzero_count: u32,
    #[prost(uint32, tag = "3")]
    pub total_count: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TrendHdrSamples {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<TrendHdrValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TrendHdrValue {
    #[prost(message, optional, tag = "1")]
    pub time: Option<::prost_types::Timestamp>,
    #[prost(uint32, repeated, tag = "2")]
    pub counters: Vec<u32>,
    #[prost(uint32, tag = "3")]
    pub lower_counter_index: u32,
    #[prost(double, tag = "4")]
    pub min_resolution: f64,
    #[prost(uint32, tag = "5")]
    pub significant_digits: u32,
    #[prost(double, tag = "6")]
    pub min_value: f64,
    #[prost(double, tag = "7")]
    pub max_value: f64,
    #[prost(double, tag = "8")]
    pub sum: f64,
    #[prost(uint32, tag = "9")]
    pub count: u32,
    #[prost(uint32, optional, tag = "10")]
    pub extra_low_values_counter: Option<u32>,
    #[prost(uint32, optional, tag = "11")]
    pub extra_high_values_counter: Option<u32>,
}
