//! FileHub REST API client
//!
//! Typed access to the FileHub platform API: one module per entity, each
//! exposing list/find/create/update/delete through an accessor struct
//! reached from [`Client`].

pub mod client;
pub mod common;
pub mod error;

pub mod as2_partners;
pub mod as2_stations;
pub mod automations;
pub mod behaviors;
pub mod group_users;
pub mod groups;
pub mod remote_servers;
pub mod share_groups;
pub mod syncs;
pub mod users;

pub use client::Client;
pub use common::{ApiQueryParams, ListParams, Page};
pub use error::ApiError;
