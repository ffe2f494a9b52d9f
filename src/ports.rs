use crate::form::FormPortMapping;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Public ports already allocated to other containers. Fetched once per
/// session and never mutated by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedPortSet {
    ports: BTreeSet<u16>,
}

impl UsedPortSet {
    pub fn new(ports: impl IntoIterator<Item = u16>) -> Self {
        Self {
            ports: ports.into_iter().collect(),
        }
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports.contains(&port)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConflict {
    pub row_id: Uuid,
    pub conflict: bool,
}

/// Parses a port field the way the form does: trimmed, integer only.
pub fn parse_port(field: &str) -> Option<u16> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    field.parse().ok()
}

pub fn is_conflicting(public_port: &str, used: &UsedPortSet) -> bool {
    parse_port(public_port).is_some_and(|port| used.contains(port))
}

/// One flag per row, in row order.
pub fn check_conflicts(rows: &[FormPortMapping], used: &UsedPortSet) -> Vec<PortConflict> {
    rows.iter()
        .map(|row| PortConflict {
            row_id: row.id,
            conflict: is_conflicting(&row.public_port, used),
        })
        .collect()
}

/// Every colliding public port, in row order, each reported once.
pub fn conflicting_ports(rows: &[FormPortMapping], used: &UsedPortSet) -> Vec<u16> {
    let mut ports = Vec::new();
    for port in rows.iter().filter_map(|row| parse_port(&row.public_port)) {
        if used.contains(port) && !ports.contains(&port) {
            ports.push(port);
        }
    }
    ports
}
