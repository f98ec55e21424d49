//! On-demand sandbox containers for code execution.
//!
//! `code-sandbox` provisions a fresh, interactive container on whichever
//! Docker-compatible engine the host runs. Two pieces do the work:
//!
//! - a connection resolver that tries the environment-derived endpoint and
//!   then well-known local sockets, keeping the first engine that answers a
//!   ping;
//! - a provisioner that makes sure the image is present (pulling it within a
//!   fixed budget and classifying failures), then creates and starts a
//!   container with `/app` as its working directory, a TTY and open stdin.
//!
//! # Modules
//!
//! - [`api`]: The inbound `initialize` call, which never fails outright
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`engine`]: Engine discovery, image acquisition and container provisioning
//! - [`error`]: Semantic error types for the application

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
