//! LabKey participant lookup library
//!
//! Fetches a single participant row from the Genomics England LabKey
//! `selectRows` API and reshapes it into `name,dob,nhs_number`.
//!
//! # Modules
//!
//! - `config`: Endpoint and timeout configuration.
//! - `errors`: Error handling types.
//! - `labkey_client`: LabKey HTTP client.
//! - `models`: Query parameters, response validation and the derived record.

pub mod config;
pub mod errors;
pub mod labkey_client;
pub mod models;

pub use errors::FetchError;
pub use labkey_client::LabKeyClient;
pub use models::{Query, Record};
