//! Fake parking API served by warp on an ephemeral port.

#![allow(dead_code)]

use sigepark::config::Config;
use sigepark::http::ApiClient;
use std::time::Duration;
use warp::{Filter, Rejection, Reply};

/// Every route in the fake API insists on the tunnel header, like the real
/// tunnel does for JSON responses.
pub fn tunnel() -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::exact("ngrok-skip-browser-warning", "true")
}

/// Serves `routes` in the background and returns a config pointing at it.
pub fn serve<F, R>(routes: F) -> Config
where
    F: Filter<Extract = (R,), Error = Rejection> + Clone + Send + Sync + 'static,
    R: Reply,
{
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    Config::new(&format!("http://{}", addr))
        .unwrap()
        .with_timeout(Duration::from_secs(5))
}

pub fn client(config: &Config) -> ApiClient {
    ApiClient::new(config).unwrap()
}

/// A config whose port had a listener a moment ago and now refuses
/// connections.
pub fn unreachable() -> Config {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Config::new(&format!("http://{}", addr))
        .unwrap()
        .with_timeout(Duration::from_secs(5))
}
