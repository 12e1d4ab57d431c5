//! In-memory MaxMind DB writer for tests.
//!
//! Produces databases with a 24-bit record search tree, the data section and
//! the metadata map, enough for `maxminddb::Reader` to open and query.

use std::net::IpAddr;

const METADATA_MARKER: &[u8] = b"\xab\xcd\xefMaxMind.com";
const DATA_SECTION_SEPARATOR: [u8; 16] = [0; 16];
const RECORD_SIZE: u16 = 24;

/// A value in the MaxMind DB data format.
#[derive(Debug, Clone)]
pub enum Value {
    Str(String),
    F64(f64),
    U16(u16),
    U32(u32),
    U64(u64),
    Map(Vec<(String, Value)>),
    Array(Vec<Value>),
}

impl Value {
    pub fn str(s: &str) -> Self {
        Self::Str(s.to_string())
    }

    pub fn map<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::Str(s) => {
                control(out, 2, s.len());
                out.extend_from_slice(s.as_bytes());
            }
            Self::F64(v) => {
                control(out, 3, 8);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::U16(v) => unsigned(out, 5, &v.to_be_bytes()),
            Self::U32(v) => unsigned(out, 6, &v.to_be_bytes()),
            Self::U64(v) => unsigned(out, 9, &v.to_be_bytes()),
            Self::Map(entries) => {
                control(out, 7, entries.len());
                for (key, value) in entries {
                    Self::Str(key.clone()).encode(out);
                    value.encode(out);
                }
            }
            Self::Array(items) => {
                control(out, 11, items.len());
                for item in items {
                    item.encode(out);
                }
            }
        }
    }
}

/// Writes a control byte, the extended type byte and any size bytes.
fn control(out: &mut Vec<u8>, type_num: u8, size: usize) {
    let (size_bits, extra) = match size {
        0..=28 => (size as u8, Vec::new()),
        29..=284 => (29, vec![(size - 29) as u8]),
        _ => (30, ((size - 285) as u16).to_be_bytes().to_vec()),
    };

    if type_num <= 7 {
        out.push((type_num << 5) | size_bits);
    } else {
        out.push(size_bits);
        out.push(type_num - 7);
    }
    out.extend_from_slice(&extra);
}

/// Unsigned integers are stored big-endian without leading zero bytes.
fn unsigned(out: &mut Vec<u8>, type_num: u8, be_bytes: &[u8]) {
    let skip = be_bytes.iter().take_while(|b| **b == 0).count();
    let bytes = &be_bytes[skip..];
    control(out, type_num, bytes.len());
    out.extend_from_slice(bytes);
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Empty,
    Node(usize),
    Data(usize),
}

/// Builds a database from network/value pairs.
///
/// Networks must not overlap.
pub struct MmdbBuilder {
    database_type: String,
    ip_version: u16,
    nodes: Vec<[Slot; 2]>,
    data: Vec<u8>,
}

impl MmdbBuilder {
    pub fn new(database_type: &str, ip_version: u16) -> Self {
        Self {
            database_type: database_type.to_string(),
            ip_version,
            nodes: vec![[Slot::Empty, Slot::Empty]],
            data: Vec::new(),
        }
    }

    /// Adds `value` for a network written as `address/prefix`.
    pub fn insert(mut self, network: &str, value: Value) -> Self {
        let bits = self.network_bits(network);
        let offset = self.data.len();
        value.encode(&mut self.data);

        let mut node = 0;
        for (i, bit) in bits.iter().enumerate() {
            let side = usize::from(*bit);
            if i == bits.len() - 1 {
                self.nodes[node][side] = Slot::Data(offset);
                break;
            }
            node = match self.nodes[node][side] {
                Slot::Node(next) => next,
                _ => {
                    let next = self.nodes.len();
                    self.nodes.push([Slot::Empty, Slot::Empty]);
                    self.nodes[node][side] = Slot::Node(next);
                    next
                }
            };
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let node_count = self.nodes.len();
        let mut out = Vec::new();

        for node in &self.nodes {
            for slot in node {
                let record = match slot {
                    Slot::Empty => node_count,
                    Slot::Node(next) => *next,
                    Slot::Data(offset) => node_count + DATA_SECTION_SEPARATOR.len() + offset,
                };
                out.extend_from_slice(&(record as u32).to_be_bytes()[1..]);
            }
        }

        out.extend_from_slice(&DATA_SECTION_SEPARATOR);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(METADATA_MARKER);
        self.metadata(node_count).encode(&mut out);
        out
    }

    fn metadata(&self, node_count: usize) -> Value {
        Value::map([
            ("binary_format_major_version", Value::U16(2)),
            ("binary_format_minor_version", Value::U16(0)),
            ("build_epoch", Value::U64(1_700_000_000)),
            ("database_type", Value::str(&self.database_type)),
            (
                "description",
                Value::map([("en", Value::str("GeoFlow test database"))]),
            ),
            ("ip_version", Value::U16(self.ip_version)),
            ("languages", Value::Array(vec![Value::str("en")])),
            ("node_count", Value::U32(node_count as u32)),
            ("record_size", Value::U16(RECORD_SIZE)),
        ])
    }

    /// Search tree path for a network. IPv4 networks in an IPv6 tree live
    /// under `::/96`.
    fn network_bits(&self, network: &str) -> Vec<bool> {
        let (addr, prefix) = network.split_once('/').expect("network needs a prefix");
        let addr: IpAddr = addr.parse().expect("valid address");
        let prefix: usize = prefix.parse().expect("valid prefix");

        let (bytes, offset) = match addr {
            IpAddr::V4(v4) if self.ip_version == 6 => {
                let mut bytes = vec![0u8; 12];
                bytes.extend_from_slice(&v4.octets());
                (bytes, 96)
            }
            IpAddr::V4(v4) => (v4.octets().to_vec(), 0),
            IpAddr::V6(v6) => (v6.octets().to_vec(), 0),
        };

        bytes
            .iter()
            .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
            .take(offset + prefix)
            .collect()
    }
}

/// A GeoLite2-City style record.
pub fn city_record(iso_code: &str, city: Option<&str>, location: Option<(f64, f64)>) -> Value {
    let mut entries = vec![(
        "country",
        Value::map([
            ("geoname_id", Value::U32(6252001)),
            ("iso_code", Value::str(iso_code)),
            ("names", Value::map([("en", Value::str("United States"))])),
        ]),
    )];
    if let Some(city) = city {
        entries.push((
            "city",
            Value::map([
                ("geoname_id", Value::U32(5375480)),
                (
                    "names",
                    Value::map([("de", Value::str(city)), ("en", Value::str(city))]),
                ),
            ]),
        ));
    }
    if let Some((latitude, longitude)) = location {
        entries.push((
            "location",
            Value::map([
                ("accuracy_radius", Value::U16(1000)),
                ("latitude", Value::F64(latitude)),
                ("longitude", Value::F64(longitude)),
                ("time_zone", Value::str("America/Los_Angeles")),
            ]),
        ));
    }
    Value::map(entries)
}

/// A GeoLite2-ASN style record.
pub fn asn_record(number: u32, organization: &str) -> Value {
    Value::map([
        ("autonomous_system_number", Value::U32(number)),
        ("autonomous_system_organization", Value::str(organization)),
    ])
}
