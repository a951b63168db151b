use vigilis::{Outcome, ServerBuilder, Service};

use std::env;
use std::process;

use tracing::info;

/// Line-oriented echo protocol used by the standalone binary.
///
/// A request is one newline-terminated line; the response echoes it
/// back and the connection stays open for the next line.
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

fn main() {
    tracing_subscriber::fmt().init();

    let mut args = env::args();
    let prog = args.next().unwrap_or_else(|| "vigilis".to_string());

    let Some(port) = args.next().and_then(|arg| arg.parse::<u16>().ok()) else {
        eprintln!("usage: {prog} port_number");
        process::exit(1);
    };

    let server = match ServerBuilder::new(port).service(LineEcho).build() {
        Ok(server) => server,
        Err(err) => {
            eprintln!("{prog}: {err}");
            process::exit(1);
        }
    };

    info!(addr = %server.local_addr(), "listening");

    if let Err(err) = server.run() {
        eprintln!("{prog}: {err}");
        process::exit(1);
    }
}
