//! Range table keyed by network prefix.

use crate::RangeRow;
use ip_network::IpNetwork;
use ip_network_table::IpNetworkTable;
use std::net::IpAddr;
use std::sync::Arc;

/// Network ranges of a geolocation CSV, searchable by address.
///
/// IPv4 and IPv6 ranges share one `ip_network_table` trie; a lookup returns
/// the most specific range covering the address.
pub struct CidrTable {
    table: IpNetworkTable<RangeRow>,

    /// Header row, shared with every stored row
    columns: Arc<Vec<String>>,

    ipv4_count: usize,
    ipv6_count: usize,
}

impl std::fmt::Debug for CidrTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CidrTable")
            .field("columns", &self.columns)
            .field("ranges", &self.len())
            .finish_non_exhaustive()
    }
}

impl CidrTable {
    /// Creates an empty table for rows with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            table: IpNetworkTable::new(),
            columns: Arc::new(columns),
            ipv4_count: 0,
            ipv6_count: 0,
        }
    }

    /// Stores a row under the range written in `range`.
    ///
    /// `range` may be a prefix (`8.8.8.0/24`), a prefix with host bits set
    /// (`8.8.8.8/24`, stored as `8.8.8.0/24`) or a bare address, which covers
    /// only itself. Storing a range twice keeps the later row.
    pub fn insert(&mut self, range: &str, values: Vec<String>) -> Result<(), String> {
        let network = parse_network(range)?;
        let row = RangeRow::new(values, Arc::clone(&self.columns));

        let replaced = self.table.insert(network, row).is_some();
        if !replaced {
            if matches!(network, IpNetwork::V4(_)) {
                self.ipv4_count += 1;
            } else {
                self.ipv6_count += 1;
            }
        }
        Ok(())
    }

    /// Looks up an address and returns the longest matching prefix with its row.
    pub fn lookup_addr(&self, addr: IpAddr) -> Option<(IpNetwork, &RangeRow)> {
        self.table.longest_match(addr)
    }

    /// Number of distinct ranges stored.
    pub fn len(&self) -> usize {
        self.ipv4_count + self.ipv6_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ipv4_count(&self) -> usize {
        self.ipv4_count
    }

    pub fn ipv6_count(&self) -> usize {
        self.ipv6_count
    }
}

fn parse_network(range: &str) -> Result<IpNetwork, String> {
    let range = range.trim();
    let (addr, prefix) = match range.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (range, None),
    };

    let addr: IpAddr = addr
        .parse()
        .map_err(|_| format!("Invalid address in range '{range}'"))?;
    let prefix = match prefix {
        Some(prefix) => prefix
            .parse::<u8>()
            .map_err(|_| format!("Invalid prefix length in range '{range}'"))?,
        None if addr.is_ipv4() => 32,
        None => 128,
    };

    IpNetwork::new_truncate(addr, prefix).map_err(|e| format!("Invalid range '{range}': {e}"))
}
