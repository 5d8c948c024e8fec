#![allow(dead_code)]

pub mod config;
pub mod mock_ollama;
pub mod server;

/// Address nothing listens on
pub fn dead_backend_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}
