//! Chart state <-> URL fragment token.
//!
//! Current format: compact JSON (`t`, `s`, `i`, `n`, `p`; positions quantized to `0..=999`)
//! compressed with LZ-string into the URI-component alphabet (`A-Z a-z 0-9 + - $`).
//!
//! Legacy format: standard base64 of the plain JSON state (`title`, `scopes`, float
//! `position`). It is never written by [`encode`] but stays readable forever so that old links
//! keep working.

use crate::model::{ChartState, DEFAULT_TITLE, Scope};
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};

/// Largest quantized position; `p = round(position * 999)`.
pub const MAX_QUANTIZED_POSITION: u16 = 999;
const POSITION_SCALE: f64 = MAX_QUANTIZED_POSITION as f64;

const LEGACY_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("empty token")]
    Empty,
    #[error("unexpected character {ch:?} in token")]
    Alphabet { ch: char },
    #[error("token is not a valid compressed payload")]
    Decompress,
    #[error("decompressed payload is not valid UTF-16")]
    Utf16,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("legacy payload is not valid UTF-8")]
    Utf8,
    #[error("invalid chart payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scope {id:?} has position {value} outside {range}")]
    PositionOutOfRange {
        id: String,
        value: f64,
        range: &'static str,
    },
    #[error("duplicate scope id {id:?}")]
    DuplicateScopeId { id: String },
    #[error("unrecognized token (current format: {current}; legacy format: {legacy})")]
    Unrecognized {
        current: Box<DecodeError>,
        legacy: Box<DecodeError>,
    },
}

/// Which encoding a token turned out to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormat {
    Current,
    Legacy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub state: ChartState,
    pub format: TokenFormat,
}

#[derive(Serialize)]
struct CompactStateRef<'a> {
    t: &'a str,
    s: Vec<CompactScopeRef<'a>>,
}

#[derive(Serialize)]
struct CompactScopeRef<'a> {
    i: &'a str,
    n: &'a str,
    p: u16,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CompactState {
    #[serde(default)]
    t: Option<String>,
    #[serde(default)]
    s: Option<Vec<CompactScope>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CompactScope {
    i: String,
    n: String,
    p: i64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyState {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    scopes: Option<Vec<LegacyScope>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyScope {
    id: String,
    name: String,
    position: f64,
}

pub fn quantize_position(position: f64) -> u16 {
    let position = if position.is_finite() {
        position.clamp(0.0, 1.0)
    } else {
        0.0
    };
    (position * POSITION_SCALE).round() as u16
}

pub fn dequantize_position(p: u16) -> f64 {
    f64::from(p) / POSITION_SCALE
}

/// Encodes `state` into a token safe to place directly after `#`.
///
/// Deterministic: equal states always yield equal tokens.
pub fn encode(state: &ChartState) -> String {
    let compact = CompactStateRef {
        t: &state.title,
        s: state
            .scopes
            .iter()
            .map(|scope| CompactScopeRef {
                i: &scope.id,
                n: &scope.name,
                p: quantize_position(scope.position),
            })
            .collect(),
    };
    // Serializing plain strings and integers cannot fail.
    let json = serde_json::to_string(&compact).unwrap_or_default();
    lz_str::compress_to_encoded_uri_component(json.as_str())
}

/// Encodes `state` in the legacy (uncompressed, unquantized) format.
pub fn encode_legacy(state: &ChartState) -> String {
    let json = serde_json::to_string(state).unwrap_or_default();
    LEGACY_BASE64.encode(json.as_bytes())
}

pub fn decode(token: &str) -> Result<ChartState, DecodeError> {
    decode_with_format(token).map(|decoded| decoded.state)
}

/// Decodes a token, trying the current format first and the legacy format second.
///
/// A leading `#` and surrounding whitespace are ignored. Inner spaces are read as `+`, which
/// form-style URL decoding turns into spaces.
pub fn decode_with_format(token: &str) -> Result<Decoded, DecodeError> {
    let token = normalize_token(token);
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }
    let token = token.replace(' ', "+");
    let token = token.as_str();

    let current = match decode_current(token) {
        Ok(state) => {
            return Ok(Decoded {
                state,
                format: TokenFormat::Current,
            });
        }
        Err(err) => err,
    };

    match decode_legacy(token) {
        Ok(state) => {
            tracing::debug!(scopes = state.scopes.len(), "decoded legacy chart token");
            Ok(Decoded {
                state,
                format: TokenFormat::Legacy,
            })
        }
        Err(legacy) => Err(DecodeError::Unrecognized {
            current: Box::new(current),
            legacy: Box::new(legacy),
        }),
    }
}

/// Decodes `token`, falling back to the default chart when it cannot be read.
pub fn decode_or_default(token: &str) -> ChartState {
    match decode(token) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable chart token");
            ChartState::default()
        }
    }
}

fn normalize_token(token: &str) -> &str {
    let token = token.trim();
    token.strip_prefix('#').unwrap_or(token).trim()
}

fn decode_current(token: &str) -> Result<ChartState, DecodeError> {
    if let Some(ch) = token
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '$')))
    {
        return Err(DecodeError::Alphabet { ch });
    }

    let wide = lz_str::decompress_from_encoded_uri_component(token)
        .filter(|wide| !wide.is_empty())
        .ok_or(DecodeError::Decompress)?;
    let json = String::from_utf16(&wide).map_err(|_| DecodeError::Utf16)?;
    let compact: CompactState = serde_json::from_str(&json)?;

    let scopes = compact
        .s
        .unwrap_or_default()
        .into_iter()
        .map(|scope| {
            let p = u16::try_from(scope.p)
                .ok()
                .filter(|p| *p <= MAX_QUANTIZED_POSITION)
                .ok_or_else(|| DecodeError::PositionOutOfRange {
                    id: scope.i.clone(),
                    value: scope.p as f64,
                    range: "0..=999",
                })?;
            Ok(Scope {
                id: scope.i,
                name: scope.n,
                position: dequantize_position(p),
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    finish(compact.t, scopes)
}

fn decode_legacy(token: &str) -> Result<ChartState, DecodeError> {
    let bytes = LEGACY_BASE64.decode(token)?;
    let json = String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)?;
    let legacy: LegacyState = serde_json::from_str(&json)?;

    let scopes = legacy
        .scopes
        .unwrap_or_default()
        .into_iter()
        .map(|scope| {
            if !(0.0..=1.0).contains(&scope.position) {
                return Err(DecodeError::PositionOutOfRange {
                    id: scope.id,
                    value: scope.position,
                    range: "0..=1",
                });
            }
            Ok(Scope {
                id: scope.id,
                name: scope.name,
                position: scope.position,
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    finish(legacy.title, scopes)
}

fn finish(title: Option<String>, scopes: Vec<Scope>) -> Result<ChartState, DecodeError> {
    let state = ChartState {
        title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        scopes,
    };
    if let Some(id) = state.duplicate_scope_id() {
        return Err(DecodeError::DuplicateScopeId { id: id.to_string() });
    }
    Ok(state)
}
