//! In-memory model of a captured request/response exchange
//!
//! These types are decoupled from any HTTP client or server crate: whatever
//! transport produced the traffic converts it into a [`RequestRecord`] and,
//! once the response arrives, a [`ResponseRecord`].

mod normalize;
mod record;
mod request;
mod response;

use std::collections::BTreeMap;

pub use normalize::{IdentityNormalizer, RequestNormalizer};
pub use record::{ExchangeRecord, ExchangeState};
pub use request::{BodyStream, RequestRecord, DEFAULT_CHUNK_SIZE};
pub use response::ResponseRecord;

/// Header mapping shared by requests and responses
pub type Headers = BTreeMap<String, String>;

/// Case-insensitive header lookup
pub(crate) fn header_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
