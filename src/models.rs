pub mod domain {
    use serde_json::{Map, Value};

    use crate::error::MalformedRecord;

    pub const STATS_EVENT_TYPE: &str = "stats";

    /// One line of the EVE log.
    #[derive(Debug, Clone)]
    pub struct EveRecord {
        fields: Map<String, Value>,
    }

    impl EveRecord {
        pub fn parse(line: &str) -> Result<Self, MalformedRecord> {
            if line.trim().is_empty() {
                return Err(MalformedRecord::Blank);
            }
            match serde_json::from_str::<Value>(line)? {
                Value::Object(fields) => Ok(Self { fields }),
                _ => Err(MalformedRecord::NotAnObject),
            }
        }

        pub fn event_type(&self) -> Option<&str> {
            self.fields.get("event_type").and_then(Value::as_str)
        }

        pub fn is_stats(&self) -> bool {
            self.event_type() == Some(STATS_EVENT_TYPE)
        }

        pub fn timestamp(&self) -> Option<&str> {
            self.fields.get("timestamp").and_then(Value::as_str)
        }

        pub fn stats(&self) -> StatsSnapshot<'_> {
            StatsSnapshot {
                stats: self.fields.get("stats"),
            }
        }
    }

    /// Borrowed view over the `stats` object of a stats event.
    #[derive(Debug, Clone, Copy)]
    pub struct StatsSnapshot<'a> {
        stats: Option<&'a Value>,
    }

    impl<'a> StatsSnapshot<'a> {
        pub fn new(stats: &'a Value) -> Self {
            Self { stats: Some(stats) }
        }

        /// Reads a counter by JSON pointer relative to `stats`, e.g. `/decoder/pkts`.
        /// Anything missing, null or not an unsigned integer reads as zero.
        pub fn counter(&self, pointer: &str) -> u64 {
            self.stats
                .and_then(|stats| stats.pointer(pointer))
                .and_then(Value::as_u64)
                .unwrap_or(0)
        }
    }
}

pub mod dto {
    use serde::{Deserialize, Serialize};

    use super::domain::StatsSnapshot;

    /// Body POSTed to the webhook. Field order is the wire order.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SummaryPayload {
        pub traffic: Traffic,
        pub protocols: Protocols,
        pub app_layers: AppLayers,
        pub capture: Capture,
        pub flow: Flow,
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Traffic {
        pub packets: u64,
        pub bytes: u64,
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Protocols {
        pub tcp: u64,
        pub udp: u64,
        pub icmpv4: u64,
        pub icmpv6: u64,
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AppLayers {
        pub http: u64,
        pub tls: u64,
        pub dns: u64,
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Capture {
        pub kernel_packets: u64,
        pub kernel_drops: u64,
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Flow {
        pub total: u64,
        pub tcp: u64,
        pub udp: u64,
    }

    impl From<StatsSnapshot<'_>> for SummaryPayload {
        fn from(stats: StatsSnapshot<'_>) -> Self {
            SummaryPayload {
                traffic: Traffic {
                    packets: stats.counter("/decoder/pkts"),
                    bytes: stats.counter("/decoder/bytes"),
                },
                protocols: Protocols {
                    tcp: stats.counter("/decoder/tcp"),
                    udp: stats.counter("/decoder/udp"),
                    icmpv4: stats.counter("/decoder/icmpv4"),
                    icmpv6: stats.counter("/decoder/icmpv6"),
                },
                app_layers: AppLayers {
                    http: stats.counter("/app_layer/flow/http"),
                    tls: stats.counter("/app_layer/flow/tls"),
                    // EVE splits DNS by transport; only the UDP count is reported
                    dns: stats.counter("/app_layer/flow/dns_udp"),
                },
                capture: Capture {
                    kernel_packets: stats.counter("/capture/kernel_packets"),
                    kernel_drops: stats.counter("/capture/kernel_drops"),
                },
                flow: Flow {
                    total: stats.counter("/flow/total"),
                    tcp: stats.counter("/flow/tcp"),
                    udp: stats.counter("/flow/udp"),
                },
            }
        }
    }
}
