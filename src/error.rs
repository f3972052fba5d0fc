#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration detected at construction time.
    #[error("invalid config: {0}")]
    Config(String),

    #[error("payload too large: {actual} bytes exceeds limit of {limit}")]
    PayloadTooLarge { actual: usize, limit: usize },

    #[error("{field} out of range: {value} not in {min}..={max}")]
    FieldOutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("header decode failed: {0}")]
    HeaderDecode(String),

    #[error("not enough bytes: got {actual}, need at least {minimum}")]
    NotEnoughData { actual: usize, minimum: usize },

    #[error("CRC checksum mismatch")]
    CrcMismatch,

    #[error("sync marker missing or invalid")]
    AsmMismatch,

    #[error("length does not match value in header")]
    LengthMismatch,

    #[error("unexpected frame type")]
    TypeMismatch,

    #[error("short write: sink accepted {wrote} of {expected} bytes")]
    WriteShort { wrote: usize, expected: usize },

    /// The byte source was depleted. Terminates reception cleanly.
    #[error("end of stream")]
    EndOfStream,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
