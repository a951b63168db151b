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
fn sigterm_stops_the_server() {
    let _ = tracing_subscriber::fmt().try_init();

    let server = ServerBuilder::new(0)
        .worker_threads(2)
        .service(LineEcho)
        .build()
        .expect("Failed to build server");

    let addr = server.local_addr();

    let handle = thread::spawn(move || server.run());

    // Prove the loop is up before signaling.
    let mut stream = TcpStream::connect(addr).expect("Failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("Failed to set timeout");

    stream.write_all(b"up\n").expect("Failed to write");
    let mut buf = [0u8; 3];
    stream.read_exact(&mut buf).expect("Failed to read echo");
    assert_eq!(&buf, b"up\n");

    // The real thing: SIGTERM through the bridge, not the notifier.
    unsafe {
        libc::kill(libc::getpid(), libc::SIGTERM);
    }

    handle
        .join()
        .expect("Server thread panicked")
        .expect("Server failed");

    let n = stream.read(&mut buf).expect("Failed to read");
    assert_eq!(n, 0, "connection should be closed at shutdown");
}
