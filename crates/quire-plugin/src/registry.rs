// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extension registry with version gating and lazy initialization.
//!
//! The `ExtensionRegistry` maps extension names to entries. An entry is a
//! ready value, a deferred factory, or a failed marker recorded when the
//! registration did not pass the version gate. The first successful
//! registration of a name wins; later registrations are no-ops. Failed
//! markers never count as successful and may be overwritten.

use std::sync::Arc;

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use quire_core::{framework_version, satisfies, EntryState, Extension, QuireError};
use semver::Version;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Signature of a deferred extension initializer.
pub type FactoryFn = dyn Fn() -> Result<Arc<dyn Extension>, QuireError> + Send + Sync;

/// What a caller hands to [`ExtensionRegistry::register`].
pub enum Provider {
    /// A ready-to-use value.
    Namespace(Arc<dyn Extension>),
    /// A zero-argument initializer run on first load.
    Factory(Box<FactoryFn>),
}

impl Provider {
    /// Wraps a ready value.
    pub fn value(extension: impl Extension) -> Self {
        Provider::Namespace(Arc::new(extension))
    }

    /// Wraps a deferred initializer.
    pub fn factory<F>(init: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Extension>, QuireError> + Send + Sync + 'static,
    {
        Provider::Factory(Box::new(init))
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Namespace(ext) => f.debug_tuple("Namespace").field(&ext.name()).finish(),
            Provider::Factory(_) => f.write_str("Factory(<fn>)"),
        }
    }
}

/// Outcome of a [`ExtensionRegistry::register`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A new entry was stored.
    Registered,
    /// A working entry already existed; nothing changed.
    AlreadyRegistered,
    /// The version gate rejected the registration; a failed marker was stored.
    Incompatible { message: String },
}

/// Result of a [`ExtensionRegistry::load`] call.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// The extension is available.
    Found(Arc<dyn Extension>),
    /// Nothing is registered under the name.
    NotFound,
    /// The name was registered but failed the version gate.
    Unavailable { message: String },
}

impl Lookup {
    /// Returns true for [`Lookup::Found`].
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Returns the extension, if one was found.
    pub fn into_extension(self) -> Option<Arc<dyn Extension>> {
        match self {
            Lookup::Found(ext) => Some(ext),
            _ => None,
        }
    }
}

/// Snapshot of one entry for listings and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryStatus {
    pub name: String,
    pub state: EntryState,
    /// Failure message for failed entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A factory together with its memoized result.
///
/// `OnceCell::get_or_try_init` runs the initializer at most once
/// successfully, blocks racing callers until it finishes, and leaves the
/// cell empty when the initializer fails.
struct Deferred {
    init: Box<FactoryFn>,
    value: OnceCell<Arc<dyn Extension>>,
}

#[derive(Clone)]
enum RegistryEntry {
    Namespace(Arc<dyn Extension>),
    Factory(Arc<Deferred>),
    Failed(String),
}

impl RegistryEntry {
    fn state(&self) -> EntryState {
        match self {
            RegistryEntry::Namespace(_) => EntryState::Ready,
            RegistryEntry::Factory(deferred) if deferred.value.get().is_some() => {
                EntryState::Ready
            }
            RegistryEntry::Factory(_) => EntryState::Deferred,
            RegistryEntry::Failed(_) => EntryState::Failed,
        }
    }
}

/// Registry of named extensions for one running framework version.
///
/// Shared by reference (usually `Arc<ExtensionRegistry>`) with everything
/// that registers or loads extensions. All operations take `&self` and are
/// safe to call from several threads.
pub struct ExtensionRegistry {
    framework_version: Version,
    entries: DashMap<String, RegistryEntry>,
}

impl ExtensionRegistry {
    /// Create an empty registry gated against the compiled framework version.
    pub fn new() -> Self {
        Self::with_framework_version(framework_version())
    }

    /// Create an empty registry gated against an explicit framework version.
    pub fn with_framework_version(framework_version: Version) -> Self {
        Self {
            framework_version,
            entries: DashMap::new(),
        }
    }

    /// The version registrations are checked against.
    pub fn framework_version(&self) -> &Version {
        &self.framework_version
    }

    /// Register an extension under `name`.
    ///
    /// If a ready or deferred entry already exists this is a no-op. If
    /// `constraint` is given and the framework version does not satisfy it
    /// (or it cannot be parsed), a failed marker is stored instead of the
    /// provider. The only error is an empty or whitespace-padded name.
    pub fn register(
        &self,
        name: &str,
        provider: Provider,
        constraint: Option<&str>,
    ) -> Result<Registration, QuireError> {
        validate_name(name)?;

        let slot = self.entries.entry(name.to_string());
        if let MapEntry::Occupied(existing) = &slot {
            if !matches!(existing.get(), RegistryEntry::Failed(_)) {
                debug!(extension = name, "extension already registered, skipping");
                return Ok(Registration::AlreadyRegistered);
            }
        }

        let (entry, outcome) = match self.check_version(name, constraint) {
            Some(message) => {
                warn!(extension = name, "{message}");
                (
                    RegistryEntry::Failed(message.clone()),
                    Registration::Incompatible { message },
                )
            }
            None => {
                let entry = match provider {
                    Provider::Namespace(value) => RegistryEntry::Namespace(value),
                    Provider::Factory(init) => RegistryEntry::Factory(Arc::new(Deferred {
                        init,
                        value: OnceCell::new(),
                    })),
                };
                info!(extension = name, state = %entry.state(), "extension registered");
                (entry, Registration::Registered)
            }
        };

        match slot {
            MapEntry::Occupied(mut existing) => {
                existing.insert(entry);
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(entry);
            }
        }
        Ok(outcome)
    }

    /// Resolve `name` to a usable extension.
    ///
    /// Unknown names and failed entries are ordinary results, not errors.
    /// A deferred entry runs its factory once; the result replaces the
    /// factory. If the factory fails the error is returned and the entry
    /// stays deferred, so a later call retries.
    pub fn load(&self, name: &str) -> Result<Lookup, QuireError> {
        // Cloned out so no map lock is held while a factory runs.
        let entry = match self.entries.get(name) {
            Some(entry) => entry.value().clone(),
            None => return Ok(Lookup::NotFound),
        };

        match entry {
            RegistryEntry::Namespace(value) => Ok(Lookup::Found(value)),
            RegistryEntry::Failed(message) => Ok(Lookup::Unavailable { message }),
            RegistryEntry::Factory(deferred) => {
                let value = deferred
                    .value
                    .get_or_try_init(|| {
                        debug!(extension = name, "resolving deferred extension");
                        (deferred.init)()
                    })
                    .map_err(|e| QuireError::Factory {
                        name: name.to_string(),
                        source: Box::new(e),
                    })?
                    .clone();

                if let Some(mut slot) = self.entries.get_mut(name) {
                    let unchanged = matches!(
                        slot.value(),
                        RegistryEntry::Factory(current) if Arc::ptr_eq(current, &deferred)
                    );
                    if unchanged {
                        *slot.value_mut() = RegistryEntry::Namespace(value.clone());
                    }
                }
                Ok(Lookup::Found(value))
            }
        }
    }

    /// Returns true if any entry, including a failed one, exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Status of a single entry.
    pub fn status(&self, name: &str) -> Option<EntryStatus> {
        self.entries.get(name).map(|entry| status_of(name, entry.value()))
    }

    /// Status of every entry, sorted by name.
    pub fn statuses(&self) -> Vec<EntryStatus> {
        let mut all: Vec<EntryStatus> = self
            .entries
            .iter()
            .map(|item| status_of(item.key(), item.value()))
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the version gate, returning the failure message on rejection.
    fn check_version(&self, name: &str, constraint: Option<&str>) -> Option<String> {
        let requested = constraint?;
        let passed = match satisfies(Some(requested), &self.framework_version) {
            Ok(passed) => passed,
            Err(e) => {
                warn!(extension = name, error = %e, "unparsable version constraint");
                false
            }
        };
        if passed {
            None
        } else {
            Some(format!(
                "{name} failed version check. Requested {requested}, got {}",
                self.framework_version
            ))
        }
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("framework_version", &self.framework_version.to_string())
            .field("entries", &self.names())
            .finish()
    }
}

fn status_of(name: &str, entry: &RegistryEntry) -> EntryStatus {
    EntryStatus {
        name: name.to_string(),
        state: entry.state(),
        message: match entry {
            RegistryEntry::Failed(message) => Some(message.clone()),
            _ => None,
        },
    }
}

fn validate_name(name: &str) -> Result<(), QuireError> {
    let reason = if name.is_empty() {
        "name must not be empty"
    } else if name.trim() != name {
        "name must not have leading or trailing whitespace"
    } else {
        return Ok(());
    };
    Err(QuireError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}
