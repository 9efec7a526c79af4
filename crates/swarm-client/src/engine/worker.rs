//! One flow: dial, then a fixed number of request/reply rounds spaced by a
//! fixed interval, then close.
//!
//! ```text
//! DIALING ──ok──> ACTIVE(0) -> ACTIVE(1) -> ... -> CLOSED
//!    │                 │
//!    └──err──> ABORTED <┘ (write/read error)
//! ```
//!
//! There are no deadlines anywhere in here. A peer that accepts and then
//! stays silent holds the flow, and its slot, until the process exits.

use crate::engine::cycler::Target;
use crate::engine::tracker::ConnectionSlot;
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::time::Instant;
use swarm_common::{FlowConfig, ProtocolMode};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tracing::{debug, trace, warn};

/// Terminates the canned HTTP request and every HTTP-mode reply.
pub const REPLY_SENTINEL: &str = "EOF\n";

pub const HTTP_REQUEST: &str = "GET /index.html HTTP/1.1\n\
Host: high-connection-load-generator\n\
User-Agent: swarm-client\n\
Accept-Encoding: gzip, deflate\n\
Accept: */*\n\
Connection: keep-alive\n\
\n\
EOF\n";

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("dial failed: {0}")]
    Dial(#[source] io::Error),
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    #[error("peer closed the connection")]
    PeerClosed,
}

#[derive(Debug)]
pub enum FlowOutcome {
    /// All requests were exchanged.
    Completed { requests: u32 },
    /// Never got past DIALING.
    DialFailed(FlowError),
    /// Gave up during request `request` (zero based).
    Aborted { request: u32, error: FlowError },
}

/// Message for request `index` of a flow aimed at `port`.
pub fn request_message(protocol: ProtocolMode, port: u16, index: u32) -> Cow<'static, str> {
    match protocol {
        ProtocolMode::Http => Cow::Borrowed(HTTP_REQUEST),
        ProtocolMode::Raw => Cow::Owned(format!("#{}-{}\n", port, index)),
    }
}

/// Local side of a flow as it appears in log lines.
struct Local(Option<std::net::IpAddr>);

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ip) => write!(f, "{}", ip),
            None => f.write_str("<any>"),
        }
    }
}

/// Connects to `target`, binding the local address first when one is set.
pub async fn dial(target: &Target) -> Result<TcpStream, FlowError> {
    let host = target.endpoint.ip.as_str();
    let port = target.endpoint.port;

    let Some(local) = target.local else {
        return TcpStream::connect((host, port))
            .await
            .map_err(FlowError::Dial);
    };

    let mut candidates = lookup_host((host, port)).await.map_err(FlowError::Dial)?;
    let remote = candidates
        .find(|addr| addr.is_ipv4() == local.is_ipv4())
        .ok_or_else(|| {
            FlowError::Dial(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{} has no address in the family of {}", host, local),
            ))
        })?;

    let socket = if remote.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(FlowError::Dial)?;
    socket
        .bind(SocketAddr::new(local, 0))
        .map_err(FlowError::Dial)?;
    socket.connect(remote).await.map_err(FlowError::Dial)
}

/// Reads one reply. RAW takes a single line of any bytes; HTTP keeps
/// reading until the sentinel line shows up.
async fn read_reply<R>(
    reader: &mut R,
    protocol: ProtocolMode,
    line: &mut Vec<u8>,
) -> Result<(), FlowError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', line)
            .await
            .map_err(FlowError::Read)?;
        if n == 0 {
            return Err(FlowError::PeerClosed);
        }
        trace!(reply = %String::from_utf8_lossy(line).trim_end(), "Reply line");
        if protocol == ProtocolMode::Raw || line.as_slice() == REPLY_SENTINEL.as_bytes() {
            return Ok(());
        }
    }
}

/// Runs one flow to its end. The slot is held for the whole call and
/// released when it returns, on every path.
pub async fn run_flow(target: Target, flow: &FlowConfig, slot: ConnectionSlot) -> FlowOutcome {
    let started = Instant::now();
    let local = Local(target.local);
    let port = target.endpoint.port;
    let stats = slot.stats();

    let stream = match dial(&target).await {
        Ok(s) => s,
        Err(e) => {
            warn!(target_port = port, local = %local, error = %e, "Dial failed");
            stats.dial_failures.fetch_add(1, Ordering::Relaxed);
            return FlowOutcome::DialFailed(e);
        }
    };
    debug!(
        server = %target.endpoint.ip,
        target_port = port,
        local = %local,
        "Flow established"
    );

    let mut conn = BufReader::new(stream);
    let mut line = Vec::new();

    for i in 0..flow.requests_per_flow {
        let msg = request_message(flow.protocol, port, i);
        if let Err(e) = conn.get_mut().write_all(msg.as_bytes()).await {
            warn!(
                local = %local,
                target_port = port,
                attempt = i + 1,
                requests_per_flow = flow.requests_per_flow,
                elapsed = ?started.elapsed(),
                error = %e,
                "Flow write failed"
            );
            stats.write_failures.fetch_add(1, Ordering::Relaxed);
            return FlowOutcome::Aborted {
                request: i,
                error: FlowError::Write(e),
            };
        }

        if let Err(e) = read_reply(&mut conn, flow.protocol, &mut line).await {
            warn!(
                local = %local,
                target_port = port,
                attempt = i + 1,
                requests_per_flow = flow.requests_per_flow,
                elapsed = ?started.elapsed(),
                error = %e,
                "Flow read failed"
            );
            if matches!(e, FlowError::PeerClosed) {
                stats.peer_closed.fetch_add(1, Ordering::Relaxed);
            } else {
                stats.read_failures.fetch_add(1, Ordering::Relaxed);
            }
            return FlowOutcome::Aborted {
                request: i,
                error: e,
            };
        }

        tokio::time::sleep(flow.request_interval()).await;
    }

    stats.completed.fetch_add(1, Ordering::Relaxed);
    debug!(target_port = port, local = %local, elapsed = ?started.elapsed(), "Flow finished");
    FlowOutcome::Completed {
        requests: flow.requests_per_flow,
    }
}
