#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Owner-scoped task management behind a bearer-token auth gate, with"]
#![doc = "per-task file attachments stored in an S3-compatible object store."]
#![doc = "Contains the domain models, authentication, attachment lifecycle,"]
#![doc = "routing configuration, and error handling used by the `main` binary."]

pub mod attachments;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod storage;
