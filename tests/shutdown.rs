use vigilis::{Outcome, ServerBuilder, Service};

use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

struct LineEcho;

impl Service for LineEcho {
    fn respond(&self, request: &[u8]) -> Outcome {
        match request.iter().position(|&b| b == b'\n') {
            Some(end) => Outcome::Response {
                body: request[..=end].to_vec(),
                keep_alive: true,
            },
            None => Outcome::Incomplete,
        }
    }
}

#[test]
fn stop_request_drains_and_releases_everything() {
    let _ = tracing_subscriber::fmt().try_init();

    let server = ServerBuilder::new(0)
        .worker_threads(4)
        .service(LineEcho)
        .build()
        .expect("Failed to build server");

    let addr = server.local_addr();
    let notifier = server.notifier();

    let handle = thread::spawn(move || server.run());

    // An established, working connection.
    let mut stream = TcpStream::connect(addr).expect("Failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("Failed to set timeout");

    stream.write_all(b"ping\n").expect("Failed to write");
    let mut buf = [0u8; 5];
    stream.read_exact(&mut buf).expect("Failed to read echo");
    assert_eq!(&buf, b"ping\n");

    // Stop mid-loop: the reactor finishes the current batch, tears the
    // connection down, joins the workers, and returns cleanly.
    notifier.request_stop();
    handle
        .join()
        .expect("Server thread panicked")
        .expect("Server failed");

    // The open connection was torn down.
    let n = stream.read(&mut buf).expect("Failed to read");
    assert_eq!(n, 0, "connection should be closed at shutdown");

    // The listening socket is gone.
    let refused = TcpStream::connect_timeout(&addr, Duration::from_secs(1));
    assert!(refused.is_err(), "listener should be closed after stop");
}
