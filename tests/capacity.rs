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
fn connection_over_capacity_is_closed_immediately() {
    let _ = tracing_subscriber::fmt().try_init();

    let server = ServerBuilder::new(0)
        .worker_threads(2)
        .max_connections(1)
        .service(LineEcho)
        .build()
        .expect("Failed to build server");

    let addr = server.local_addr();
    let notifier = server.notifier();

    let handle = thread::spawn(move || server.run());

    // Fill the single connection slot and prove it works.
    let mut first = TcpStream::connect(addr).expect("Failed to connect");
    first
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("Failed to set timeout");

    first.write_all(b"one\n").expect("Failed to write");
    let mut buf = [0u8; 4];
    first.read_exact(&mut buf).expect("Failed to read echo");
    assert_eq!(&buf, b"one\n");

    // The next connection is accepted and closed straight away.
    let mut second = TcpStream::connect(addr).expect("Failed to connect");
    second
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("Failed to set timeout");

    let mut scratch = [0u8; 16];
    let n = second.read(&mut scratch).expect("Failed to read");
    assert_eq!(n, 0, "over-capacity connection should see EOF");

    // The established connection is unaffected.
    first.write_all(b"two\n").expect("Failed to write");
    first.read_exact(&mut buf).expect("Failed to read echo");
    assert_eq!(&buf, b"two\n");

    notifier.request_stop();
    handle
        .join()
        .expect("Server thread panicked")
        .expect("Server failed");
}
