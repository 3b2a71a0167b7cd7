//! Boundary to the REST backend: envelopes, transport seam, credentials,
//! list queries and the submission gateway.

pub mod credentials;
pub mod envelope;
pub mod gateway;
pub mod query;
pub mod transport;

pub use credentials::{CredentialSource, EnvCredential, StaticCredential};
pub use envelope::ApiEnvelope;
pub use gateway::{ErrorKind, ListPage, SubmissionError, SubmissionGateway, SubmissionResult};
pub use query::ListQuery;
pub use transport::{ApiRequest, HttpMethod, Transport, TransportError};
