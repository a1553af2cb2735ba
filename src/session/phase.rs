/// Connection lifecycle phase of a `Session`.
///
/// Transitions are monotonic and acyclic:
/// `Disconnected -> Connecting -> Connected -> Disconnecting -> Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}
