// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Agent Conduit Test Utilities
//!
//! Shared helpers for tests that exercise real process spawning. Stubs stand
//! in for the agent CLIs so the suite never needs network access, credentials
//! or an installed agent.

pub mod stub;

pub use stub::{StubBuilder, StubExecutable};
