//! The fetch pipeline.
//!
//! [`fetch_data`] is the one mechanism every domain service uses to turn a
//! remote resource into a validated domain value. The network itself sits
//! behind [`HttpTransport`]; [`ReqwestTransport`] is the production
//! implementation and tests plug in stubs.

mod pipeline;
mod transport;

pub use pipeline::fetch_data;
#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
pub use transport::{FetchMethod, FetchRequest, HttpResponse, HttpTransport, TransportError};
