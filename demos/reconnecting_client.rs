// ABOUTME: Reference driver wiring the transport-free STOMP core to a real TCP socket
// ABOUTME: Outside src/ on purpose: the core never opens a socket, starts a timer or spawns a thread

use std::time::Duration;

use stomp_core::commands::AckMode;
use stomp_core::failover::{self, BackoffSequence, Endpoint};
use stomp_core::frame::HeaderList;
use stomp_core::parser::{ParseEvent, Parser};
use stomp_core::session::{Event, Session};
use stomp_core::version::StompVersion;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::sleep;

const FAILOVER_URI: &str = "failover:(tcp://localhost:61613,tcp://localhost:61614)?randomize=false";
const DESTINATION: &str = "/queue/demo";

/// Drives one `Session` across however many TCP connections it takes,
/// sleeping between attempts per the failover back-off sequence, and
/// replaying subscriptions after every reconnect.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let uri = failover::parse(FAILOVER_URI)?;
    let mut sequence = BackoffSequence::from_uri(uri)?;
    let mut session: Session<u64> = Session::new();

    loop {
        let Some((endpoint, delay_ms)) = sequence.next() else {
            return Err("failover sequence exhausted its reconnect attempt cap".into());
        };
        if delay_ms > 0 {
            tracing::info!(delay_ms, "waiting before reconnect attempt");
            sleep(Duration::from_millis(delay_ms)).await;
        }

        match run_connection(&endpoint, &mut session).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                tracing::warn!(%endpoint, %err, "connection lost, will reconnect");
                for event in session.disconnected() {
                    tracing::debug!(?event, "discarded pending work on disconnect");
                }
            }
        }
    }
}

/// Runs a single TCP connection to completion: connect, handshake,
/// subscribe, pump frames until the socket closes, an ERROR arrives, or
/// a graceful DISCONNECT receipt comes back (in which case this returns
/// `Ok(())` and the caller does not reconnect).
async fn run_connection(
    endpoint: &Endpoint,
    session: &mut Session<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut socket = TcpStream::connect((endpoint.host.as_str(), endpoint.port)).await?;

    let connect_frame = session.connect(
        &[StompVersion::V1_1, StompVersion::V1_2],
        &endpoint.host,
        None,
        None,
        (10_000, 10_000),
    )?;
    socket.write_all(&connect_frame.render(StompVersion::V1_2)).await?;

    let mut parser = Parser::new(StompVersion::V1_2);
    let mut buf = [0u8; 4096];

    loop {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Err("connection closed by peer".into());
        }

        for parse_event in parser.feed(&buf[..n])? {
            let ParseEvent::Frame(frame) = parse_event else {
                continue;
            };

            for session_event in session.receive(frame)? {
                match session_event {
                    Event::Connected { version } => {
                        tracing::info!(?version, "handshake complete");
                        let (subscribe_frame, id) =
                            session.subscribe(DESTINATION, AckMode::Auto, HeaderList::new(), 1)?;
                        tracing::info!(id, destination = DESTINATION, "subscribing");
                        socket.write_all(&subscribe_frame.render(version)).await?;
                        for replayed in session.replay()? {
                            socket.write_all(&replayed.render(version)).await?;
                        }
                    }
                    Event::MessageReceived { ack, frame, .. } => {
                        tracing::info!(body_len = frame.body.len(), "message received");
                        let version = session.version().unwrap_or(StompVersion::V1_2);
                        let ack_frame = session.ack(&ack, None)?;
                        socket.write_all(&ack_frame.render(version)).await?;
                    }
                    Event::OrphanMessage { frame } => {
                        tracing::warn!(?frame.command, "message for an unknown subscription");
                    }
                    Event::ReceiptReceived { .. } | Event::ReceiptCancelled { .. } => {}
                    Event::OrphanReceipt { receipt_id } => {
                        tracing::warn!(receipt_id, "receipt matched no pending request");
                    }
                    Event::ErrorReceived { frame } => {
                        return Err(format!(
                            "broker ERROR: {}",
                            String::from_utf8_lossy(&frame.body)
                        )
                        .into());
                    }
                }
            }
        }
    }
}
