use crate::StrError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Defines an encoded value exchanged between ranks
pub type Payload = Vec<u8>;

/// Defines the message-passing substrate shared by all ranks of a run
///
/// Implementations provide a single blocking primitive: every rank contributes
/// one payload and receives the payloads of all ranks, ordered by rank. The
/// payloads are plain bytes, so the same primitive runs over threads of one
/// process or over MPI processes. The reductions and ghost exchanges of the
/// simulator are built on top of it by [super::Collective].
///
/// **Important:** `all_gather_payload` is collective. Every rank must call it the
/// same number of times, in the same order.
pub trait Communicator {
    /// Returns the rank of this process (0 ≤ rank < size)
    fn rank(&self) -> usize;

    /// Returns the number of ranks
    fn size(&self) -> usize;

    /// Gathers one payload from every rank (blocking until all ranks contribute)
    fn all_gather_payload(&self, value: Payload) -> Result<Vec<Payload>, StrError>;
}

impl dyn Communicator + '_ {
    /// Gathers one value from every rank, ordered by rank
    ///
    /// The value travels as JSON; a payload that does not decode as `T` means
    /// that another rank issued a different gather.
    pub fn all_gather<T>(&self, value: &T) -> Result<Vec<T>, StrError>
    where
        T: Serialize + DeserializeOwned,
    {
        let payload = encode(value)?;
        let gathered = self.all_gather_payload(payload)?;
        gathered.iter().map(|p| decode(p)).collect()
    }
}

/// Encodes a value into a payload
pub fn encode<T: Serialize>(value: &T) -> Result<Payload, StrError> {
    serde_json::to_vec(value).map_err(|_| "cannot encode the collective payload")
}

/// Decodes a payload into a value
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, StrError> {
    serde_json::from_slice(payload).map_err(|_| "collective operations were called in different order across ranks")
}

/// Implements the communicator of a single-rank run
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialComm;

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_gather_payload(&self, value: Payload) -> Result<Vec<Payload>, StrError> {
        Ok(vec![value])
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
