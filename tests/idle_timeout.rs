use vigilis::{Outcome, ServerBuilder, Service};

use std::io::Read;
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

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
fn silent_connection_is_reaped() {
    let _ = tracing_subscriber::fmt().try_init();

    // One-second ticks, so the idle timeout is three seconds.
    let server = ServerBuilder::new(0)
        .worker_threads(2)
        .tick_interval(Duration::from_secs(1))
        .service(LineEcho)
        .build()
        .expect("Failed to build server");

    let addr = server.local_addr();
    let notifier = server.notifier();

    let handle = thread::spawn(move || server.run());

    // Connect and send nothing at all.
    let mut stream = TcpStream::connect(addr).expect("Failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("Failed to set timeout");

    let started = Instant::now();
    let mut buf = [0u8; 16];
    let n = stream.read(&mut buf).expect("Failed to read");
    let elapsed = started.elapsed();

    // EOF from the server's tear-down, with no response bytes ever sent.
    assert_eq!(n, 0, "idle connection should be closed by the sweep");
    assert!(
        elapsed >= Duration::from_secs(2),
        "closed too early: {elapsed:?}"
    );
    assert!(
        elapsed <= Duration::from_secs(8),
        "closed too late: {elapsed:?}"
    );

    notifier.request_stop();
    handle
        .join()
        .expect("Server thread panicked")
        .expect("Server failed");
}
