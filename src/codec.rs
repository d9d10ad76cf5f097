//! Persisted state tokens.
//!
//! A token is the grid's cell matrix, serialized with `bincode`, compressed with raw DEFLATE
//! at the best compression level, and encoded as URL-safe base64 without padding:
//!
//! ```notrust
//! rows of bools -> bincode (standard) -> DEFLATE (best) -> base64url (no '=')
//! ```
//!
//! The generation counter is not part of the token. Decoding always yields a grid at
//! generation 0.

use std::fmt;
use std::io;
use std::io::Read;
use std::io::Write;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::grid::Grid;
use crate::grid::GridError;

/// Largest inflated payload we accept, which bounds both decompression and the matrix decoder.
pub const MAX_PAYLOAD: usize = 1 << 24;

/// Wire form of a grid
#[derive(Serialize, Deserialize)]
struct Snapshot {
    cells: Vec<Vec<bool>>,
}

fn config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<MAX_PAYLOAD>()
}

/// A URL-safe text form of a grid's cells
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Token {
    type Err = CodecError;

    /// Accepts only strings that decode to a valid grid.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)?;

        Ok(Token(s.to_owned()))
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to serialize cells: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("failed to compress cells: {0}")]
    Compress(#[source] io::Error),

    #[error("serialized cells take {size} bytes, more than the {limit} a token may hold")]
    TooLarge { size: usize, limit: usize },

    #[error("failed to decode state token: {0}")]
    DecodeFailed(#[from] DecodeError),
}

/// The stage at which a token was rejected
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("corrupt compressed stream: {0}")]
    Inflate(#[source] io::Error),

    #[error("inflated payload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("malformed cell matrix: {0}")]
    Format(#[from] bincode::error::DecodeError),

    #[error("{0} trailing bytes after the cell matrix")]
    TrailingBytes(usize),

    #[error("invalid cell matrix: {0}")]
    Shape(#[from] GridError),
}

/// Serialize `grid` into a token. The same cells always produce the same token.
///
/// Grids whose cells serialize to more than [`MAX_PAYLOAD`] bytes are rejected with
/// `CodecError::TooLarge`, so every token this returns can be decoded.
pub fn encode(grid: &Grid) -> Result<Token, CodecError> {
    let snapshot = Snapshot {
        cells: grid.to_rows(),
    };
    let bytes = bincode::serde::encode_to_vec(&snapshot, config())?;

    // The limit only binds the decoder, so refuse here what `decode` would refuse.
    if bytes.len() > MAX_PAYLOAD {
        return Err(CodecError::TooLarge {
            size: bytes.len(),
            limit: MAX_PAYLOAD,
        });
    }

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&bytes).map_err(CodecError::Compress)?;
    let compressed = encoder.finish().map_err(CodecError::Compress)?;

    Ok(Token(URL_SAFE_NO_PAD.encode(compressed)))
}

/// Restore a grid from a token. Any failure is reported as `CodecError::DecodeFailed`.
pub fn decode(token: &str) -> Result<Grid, CodecError> {
    Ok(decode_stages(token)?)
}

fn decode_stages(token: &str) -> Result<Grid, DecodeError> {
    let compressed = URL_SAFE_NO_PAD.decode(token.trim())?;

    // Read one byte past the limit so oversized payloads can be told apart.
    let mut bytes = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .take(MAX_PAYLOAD as u64 + 1)
        .read_to_end(&mut bytes)
        .map_err(DecodeError::Inflate)?;

    if bytes.len() > MAX_PAYLOAD {
        return Err(DecodeError::TooLarge { limit: MAX_PAYLOAD });
    }

    let (snapshot, read): (Snapshot, usize) = bincode::serde::decode_from_slice(&bytes, config())?;
    if read != bytes.len() {
        return Err(DecodeError::TrailingBytes(bytes.len() - read));
    }

    Ok(Grid::from_rows(&snapshot.cells)?)
}
