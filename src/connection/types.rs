use std::net::SocketAddr;
use tokio::net::TcpStream;

/// One worker node known to the coordinator.
///
/// `identity` is the stable deduplication key across discovery rounds. The
/// stream is present only while a connection is established, and `active` is
/// true only while that connection is believed healthy. `rx` accumulates
/// bytes across readiness passes until a complete result frame is available.
#[derive(Debug)]
pub struct WorkerHandle {
    pub identity: SocketAddr,
    pub stream: Option<TcpStream>,
    pub active: bool,
    pub(super) rx: Vec<u8>,
}

impl WorkerHandle {
    pub fn new(identity: SocketAddr, stream: TcpStream) -> Self {
        Self {
            identity,
            stream: Some(stream),
            active: true,
            rx: Vec::new(),
        }
    }

    /// Installs a fresh connection in this slot, discarding any stale buffer.
    pub(super) fn revive(&mut self, stream: TcpStream) {
        self.stream = Some(stream);
        self.active = true;
        self.rx.clear();
    }

    /// Demotes the slot: the connection and any partial frame are discarded.
    pub(super) fn mark_dead(&mut self) {
        self.stream = None;
        self.active = false;
        self.rx.clear();
    }
}
