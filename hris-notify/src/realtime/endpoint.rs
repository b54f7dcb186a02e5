//! WebSocket endpoint construction.

use url::Url;

use crate::client::unquote_token;
use crate::error::{Error, Result};

/// Path of the push endpoint on the API origin.
pub const WS_PATH: &str = "/api/v1/ws";

/// Build the push endpoint from the API base URL and a bearer token.
///
/// The scheme is upgraded (`http` to `ws`, `https` to `wss`), the path is
/// replaced with [`WS_PATH`] and the unquoted token is passed as the `token`
/// query parameter.
pub fn websocket_url(base_url: &str, token: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::InvalidArgument(format!(
                "unsupported scheme `{}` in base URL",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| Error::InvalidArgument(format!("cannot use scheme `{}`", scheme)))?;

    let token = unquote_token(token);
    if token.is_empty() {
        return Err(Error::AuthRequired);
    }

    url.set_path(WS_PATH);
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut().append_pair("token", token);

    Ok(url)
}
