// src/test_support.rs
// =============================================================================
// Helpers shared by the unit tests of several modules.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::rustls::{Certificate, PrivateKey, ServerConfig};
use tokio_rustls::TlsAcceptor;

use crate::checker::USER_AGENT;

// Starts a tiny HTTP server on a random local port
//
// Routes:
//   /ok       200
//   /missing  404
//   /created  201
//   /moved    301 -> /ok
//   /agent    200 with our browser User-Agent, 403 otherwise
//   /slow     200 after two seconds
//   anything else 500
//
// Returns the base URL, e.g. "http://127.0.0.1:41234"
pub async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(serve(socket));
        }
    });

    format!("http://{}", addr)
}

// Same routes as spawn_server, over HTTPS with a freshly generated
// self-signed certificate for "localhost"
//
// Returns the base URL, e.g. "https://localhost:41234"
pub async fn spawn_tls_server() -> String {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert_der = cert.serialize_der().unwrap();
    let key_der = cert.serialize_private_key_der();

    let config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(vec![Certificate(cert_der)], PrivateKey(key_der))
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // Handshake failures are expected for verifying clients
                if let Ok(stream) = acceptor.accept(socket).await {
                    serve(stream).await;
                }
            });
        }
    });

    format!("https://localhost:{}", port)
}

// Answers a single request on `socket`
async fn serve<S>(mut socket: S)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; 8192];
    let n = socket.read(&mut buf).await.unwrap_or(0);
    let request = String::from_utf8_lossy(&buf[..n]).to_string();
    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

    let (status, extra) = match path.as_str() {
        "/ok" => ("200 OK", ""),
        "/missing" => ("404 Not Found", ""),
        "/created" => ("201 Created", ""),
        "/moved" => ("301 Moved Permanently", "Location: /ok\r\n"),
        "/agent" if request.contains(USER_AGENT) => ("200 OK", ""),
        "/agent" => ("403 Forbidden", ""),
        "/slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            ("200 OK", "")
        }
        _ => ("500 Internal Server Error", ""),
    };

    let response = format!(
        "HTTP/1.1 {}\r\n{}Content-Length: 0\r\nConnection: close\r\n\r\n",
        status, extra
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
