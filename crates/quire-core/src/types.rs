// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the registry, server and CLI crates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Per-application settings that activated extensions may adjust.
pub type Settings = BTreeMap<String, serde_json::Value>;

/// Resolution state of a registry entry, as reported to diagnostics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// A usable value is held.
    Ready,
    /// A factory is registered but has not been resolved yet.
    Deferred,
    /// Registration failed the version gate.
    Failed,
}
