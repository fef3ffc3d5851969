mod http_relay_transport;

pub use http_relay_transport::HttpRelayTransport;
