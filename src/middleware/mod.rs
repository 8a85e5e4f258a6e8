// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Middleware modules (authentication, security headers).

pub mod auth;
pub mod security;

pub use auth::require_auth;
