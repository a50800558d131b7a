// starmap-api: Async HTTP session for the StArMap mapping service (APIv1 + APIv2)

pub mod error;
pub mod session;
pub mod transport;

pub use error::Error;
pub use session::{MockSession, RecordedRequest, StarmapResponse, StarmapSession, Transport};
pub use transport::{ApiVersion, TlsMode, TransportConfig};
