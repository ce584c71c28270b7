// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::utils::MAX_ADDR_LEN;

/// Top-level configuration for the demo binary: which address to dial or
/// listen on, and the runtime knobs that don't travel over the wire.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Endpoint identity and wire-visible parameters.
    pub endpoint: EndpointConfig,
    /// Local-only runtime behaviour.
    pub runtime: RuntimeConfig,
}

/// Whether the demo binary's endpoint dials out or listens.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EndpointRole {
    /// Client: connect to `endpoint.url`.
    Dial,
    /// Server: bind `endpoint.url` and accept.
    Listen,
}

/// Parameters the transport itself cares about: the address, which side of
/// the handshake this process plays, and the two values spec.md §3 says are
/// "copied from socket at creation" — here, copied from config instead.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EndpointConfig {
    #[serde(rename = "Url")]
    /// `ipc://`-scheme address to dial or bind.
    pub url: String,

    #[serde(rename = "Role")]
    /// Dial or Listen.
    pub role: EndpointRole,

    #[serde(rename = "Proto")]
    /// Local scalability-protocol identifier advertised during handshake.
    pub proto: u16,

    #[serde(rename = "RecvMax", default)]
    /// Maximum accepted message payload, in bytes. `0` means unlimited.
    pub rcvmax: usize,
}

/// Settings that shape how the demo binary drives the transport, with no
/// wire representation.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RuntimeConfig {
    #[serde(rename = "Message")]
    /// Payload sent by a dialling peer, once per iteration.
    pub message: String,

    #[serde(rename = "MessageCount", default = "default_message_count")]
    /// Number of messages a dialling peer sends before closing.
    pub message_count: u32,

    #[serde(rename = "ConnectTimeout", with = "serde_secs")]
    /// Deadline for the initial connect/accept to complete.
    pub connect_timeout: Duration,
}

fn default_message_count() -> u32 {
    1
}

impl Config {
    /// Loads the configuration from YAML, validates it, and returns the
    /// ready-to-use value.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let mut cfg: Config =
            serde_yaml::from_str(&s).context("failed to parse config YAML")?;
        cfg.validate_and_normalize()?;
        Ok(cfg)
    }

    /// Validates invariants a YAML file can't express on its own.
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        ensure!(
            self.endpoint.url.len() <= MAX_ADDR_LEN,
            "endpoint.Url exceeds {MAX_ADDR_LEN} bytes"
        );
        ensure!(
            self.endpoint.url.starts_with(crate::utils::IPC_SCHEME),
            "endpoint.Url must start with {:?}",
            crate::utils::IPC_SCHEME
        );
        if self.endpoint.role == EndpointRole::Listen {
            ensure!(
                self.runtime.message_count == default_message_count(),
                "runtime.MessageCount only applies to a dialling endpoint"
            );
        } else {
            ensure!(
                self.runtime.message_count >= 1,
                "runtime.MessageCount must be >= 1"
            );
        }
        Ok(())
    }
}

/// Serde helper for representing `Duration` as a number of seconds.
mod serde_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}
