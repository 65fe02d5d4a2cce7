//! Wire Protocol Definitions
//!
//! The shared vocabulary between the coordinator and the workers. Two fixed-width
//! TCP message shapes plus the UDP discovery tokens.
//!
//! ## Encoding Contract
//! Messages are serialized with bincode's legacy config (fixed-width integers,
//! little-endian, no length prefix), so each shape has a single known byte size:
//! a `TaskAssignment` is always [`ASSIGNMENT_WIRE_LEN`] bytes and a `TaskResult`
//! is always [`RESULT_WIRE_LEN`] bytes. The reader must know from protocol
//! position which shape comes next and read exactly that many bytes; a short
//! read is a connection failure for the caller, never a protocol-level retry.
//!
//! There is no versioning and no checksum.

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Payload of a coordinator discovery probe datagram.
pub const DISCOVERY_PROBE: &[u8] = b"DISCOVER";

/// Payload a worker sends back when probed. The coordinator treats any reply
/// as a pure presence signal and never parses the content.
pub const DISCOVERY_ACK: &[u8] = b"I am here";

/// Exact on-wire size of a serialized [`TaskAssignment`]: i32 + f64 + f64.
pub const ASSIGNMENT_WIRE_LEN: usize = 20;

/// Exact on-wire size of a serialized [`TaskResult`]: i32 + f64.
pub const RESULT_WIRE_LEN: usize = 12;

/// Coordinator -> worker: one subinterval of the integration domain.
///
/// `index` is the correlation key the worker must echo back in its result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub index: i32,
    pub start: f64,
    pub end: f64,
}

/// Worker -> coordinator: the computed value for one assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub index: i32,
    pub value: f64,
}

/// Serializes an assignment into its fixed 20-byte frame.
pub fn encode_assignment(msg: &TaskAssignment) -> Result<Vec<u8>> {
    let frame = bincode::serialize(msg).context("Failed to serialize TaskAssignment")?;
    debug_assert_eq!(frame.len(), ASSIGNMENT_WIRE_LEN);
    Ok(frame)
}

/// Decodes an assignment from a frame of exactly [`ASSIGNMENT_WIRE_LEN`] bytes.
pub fn decode_assignment(frame: &[u8]) -> Result<TaskAssignment> {
    ensure!(
        frame.len() == ASSIGNMENT_WIRE_LEN,
        "Assignment frame is {} bytes, expected {}",
        frame.len(),
        ASSIGNMENT_WIRE_LEN
    );
    bincode::deserialize(frame).context("Failed to deserialize TaskAssignment")
}

/// Serializes a result into its fixed 12-byte frame.
pub fn encode_result(msg: &TaskResult) -> Result<Vec<u8>> {
    let frame = bincode::serialize(msg).context("Failed to serialize TaskResult")?;
    debug_assert_eq!(frame.len(), RESULT_WIRE_LEN);
    Ok(frame)
}

/// Decodes a result from a frame of exactly [`RESULT_WIRE_LEN`] bytes.
pub fn decode_result(frame: &[u8]) -> Result<TaskResult> {
    ensure!(
        frame.len() == RESULT_WIRE_LEN,
        "Result frame is {} bytes, expected {}",
        frame.len(),
        RESULT_WIRE_LEN
    );
    bincode::deserialize(frame).context("Failed to deserialize TaskResult")
}
