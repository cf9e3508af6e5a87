//! Account record and fetch parameter types.

use crate::*;

/// How settled a block must be before the remote api reports from it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Commitment {
    /// Most recent block seen by the node.
    Processed,
    /// Voted on by a supermajority of the cluster.
    Confirmed,
    /// Rooted by a supermajority of the cluster.
    Finalized,
}

/// A byte sub-range of an account's raw data.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct DataSlice {
    /// Offset of the first byte.
    pub offset: usize,
    /// Number of bytes.
    pub length: usize,
}

impl DataSlice {
    /// Construct a new data slice.
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// One past the last byte covered by this slice.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }
}

/// Parameters of a single account lookup.
///
/// `data_slice` is only meaningful together with `encoding`; a lookup
/// carrying a slice but no encoding is rejected by the loader.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct FetchParams {
    /// Commitment level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitment: Option<Commitment>,

    /// Minimum slot the request may be evaluated at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_context_slot: Option<u64>,

    /// Payload encoding. Lookups without one let the loader decide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,

    /// Restrict the returned payload to a byte range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_slice: Option<DataSlice>,
}

impl FetchParams {
    /// Set the commitment.
    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = Some(commitment);
        self
    }

    /// Set the minimum context slot.
    pub fn with_min_context_slot(mut self, slot: u64) -> Self {
        self.min_context_slot = Some(slot);
        self
    }

    /// Set the encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Set the data slice.
    pub fn with_data_slice(mut self, offset: usize, length: usize) -> Self {
        self.data_slice = Some(DataSlice::new(offset, length));
        self
    }

    /// These parameters with the data slice removed. Two lookups whose
    /// parameters agree here can share a physical call.
    pub fn sans_data_slice(&self) -> Self {
        Self {
            data_slice: None,
            ..*self
        }
    }
}

/// The data payload of an account record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AccountData {
    /// `[text, encoding]` as returned when an encoding was requested.
    Encoded(String, Encoding),

    /// A bare base58 string.
    Legacy(String),
}

impl AccountData {
    /// Encode raw bytes.
    pub fn encode(raw: &[u8], encoding: Encoding) -> LoaderResult<Self> {
        Ok(Self::Encoded(encoding.encode(raw)?, encoding))
    }

    /// The encoding of this payload.
    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Encoded(_, encoding) => *encoding,
            Self::Legacy(_) => Encoding::Base58,
        }
    }

    /// Decode into raw bytes.
    pub fn decode(&self) -> LoaderResult<Vec<u8>> {
        match self {
            Self::Encoded(text, encoding) => encoding.decode(text),
            Self::Legacy(text) => Encoding::Base58.decode(text),
        }
    }

    /// Cut `length` bytes starting at `start` out of the decoded payload
    /// and re-encode them in the same encoding and shape.
    /// The range is clamped to the payload.
    pub fn slice(&self, start: usize, length: usize) -> LoaderResult<Self> {
        let raw = self.decode()?;
        let start = start.min(raw.len());
        let end = start.saturating_add(length).min(raw.len());
        let sliced = &raw[start..end];
        Ok(match self {
            Self::Encoded(_, encoding) => {
                Self::Encoded(encoding.encode(sliced)?, *encoding)
            }
            Self::Legacy(_) => Self::Legacy(Encoding::Base58.encode(sliced)?),
        })
    }
}

/// A remote account record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// The data payload.
    pub data: AccountData,
    /// Whether the account holds a loaded program.
    pub executable: bool,
    /// Balance in lamports.
    pub lamports: u64,
    /// The owning program.
    pub owner: Address,
    /// Epoch at which rent is next due.
    pub rent_epoch: u64,
    /// Size of the raw data in bytes.
    pub space: u64,
}

impl Account {
    /// Produce the record a caller asked for from a record fetched with
    /// a (possibly wider) `fetched` span. Only the payload is adjusted.
    pub fn slice_for(
        &self,
        requested: &DataSlice,
        fetched: Option<&DataSlice>,
    ) -> LoaderResult<Self> {
        let base = fetched.map(|s| s.offset).unwrap_or(0);
        let true_offset = requested.offset.saturating_sub(base);
        Ok(Self {
            data: self.data.slice(true_offset, requested.length)?,
            ..self.clone()
        })
    }
}

/// The result of one account lookup. `None` if the account does not exist.
pub type AccountValue = Option<Account>;
