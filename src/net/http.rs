//! HTTP request framing.
//!
//! Pure formatting, no I/O.  The publisher sends whatever bytes come out
//! of here and never looks at their shape.

use core::fmt::Write;

use heapless::String;

use crate::config::{Endpoint, RequestFormat};
use crate::error::FormatError;

/// Capacity of one framed request.
pub const REQUEST_CAPACITY: usize = 512;

pub type Request = String<REQUEST_CAPACITY>;

/// Frame `payload` for `endpoint`.
///
/// - [`RequestFormat::Query`]: `GET <path>?api_key=<key>&<field>=<payload>\r\n`,
///   one line, no headers.
/// - [`RequestFormat::Form`]: `POST <path> HTTP/1.1` with `Host`,
///   `Content-Type` and a `Content-Length` equal to the byte length of
///   the `<field>=<payload>` body.
pub fn build_request(endpoint: &Endpoint, payload: &str) -> Result<Request, FormatError> {
    let mut req = Request::new();
    let res = match endpoint.format {
        RequestFormat::Query => write!(
            req,
            "GET {}?api_key={}&{}={}\r\n",
            endpoint.path, endpoint.api_key, endpoint.field, payload
        ),
        RequestFormat::Form => {
            let body_len = endpoint.field.len() + 1 + payload.len();
            write!(
                req,
                "POST {} HTTP/1.1\r\n\
                 Host: {}\r\n\
                 Content-Type: application/x-www-form-urlencoded\r\n\
                 Content-Length: {}\r\n\r\n\
                 {}={}",
                endpoint.path, endpoint.host, body_len, endpoint.field, payload
            )
        }
    };
    res.map_err(|_| FormatError::RequestTooLarge)?;
    Ok(req)
}
