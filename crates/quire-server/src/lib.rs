// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sandboxed applications and the preview server that hosts them.
//!
//! An [`App`] is created per invocation from the shared extension registry
//! and activates the extensions it needs. [`start_server`] serves an app
//! over HTTP together with `/__quire` introspection routes.

pub mod app;
pub mod handlers;
pub mod server;

pub use app::App;
pub use server::{router, start_server, ServerHandle, ServerOptions, DEFAULT_HOST, DEFAULT_PORT};
