use vigilis::{Outcome, ServerBuilder, Service};

use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

/// Newline-delimited echo, the simplest protocol the seam supports.
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
fn request_response_roundtrip() {
    let _ = tracing_subscriber::fmt().try_init();

    let server = ServerBuilder::new(0)
        .worker_threads(2)
        .service(LineEcho)
        .build()
        .expect("Failed to build server");

    let addr = server.local_addr();
    let notifier = server.notifier();

    let handle = thread::spawn(move || server.run());

    // One complete request, one response, clean disconnect.
    let mut stream = TcpStream::connect(addr).expect("Failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("Failed to set timeout");

    stream.write_all(b"hello\n").expect("Failed to write");

    let mut buf = [0u8; 6];
    stream.read_exact(&mut buf).expect("Failed to read echo");
    assert_eq!(&buf, b"hello\n");

    // The connection stays open for the next request.
    stream.write_all(b"again\n").expect("Failed to write");
    stream.read_exact(&mut buf).expect("Failed to read echo");
    assert_eq!(&buf, b"again\n");

    drop(stream);

    // A request arriving in fragments stays buffered until complete.
    let mut stream = TcpStream::connect(addr).expect("Failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("Failed to set timeout");

    stream.write_all(b"par").expect("Failed to write");
    thread::sleep(Duration::from_millis(100));
    stream.write_all(b"tial\n").expect("Failed to write");

    let mut buf = [0u8; 8];
    stream.read_exact(&mut buf).expect("Failed to read echo");
    assert_eq!(&buf, b"partial\n");

    drop(stream);

    notifier.request_stop();
    handle
        .join()
        .expect("Server thread panicked")
        .expect("Server failed");
}
