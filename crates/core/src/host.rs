// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host identity records

use crate::id::HostId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_ssh_port() -> u16 {
    22
}

/// Stable identity record for a deployment target host.
///
/// Roles drive compose service filtering; labels are free-form metadata.
/// Serialization is deterministic: roles are kept sorted and labels live
/// in a sorted-key map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostRef {
    pub id: HostId,
    pub address: String,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl HostRef {
    pub fn new(id: impl Into<HostId>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            ssh_port: default_ssh_port(),
            roles: Vec::new(),
            labels: BTreeMap::new(),
        }
    }

    /// Sort and dedupe the role set.
    pub fn normalize(&mut self) {
        self.roles.sort();
        self.roles.dedup();
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
