//! Generation of the names uploaded files are stored under

use chrono::Utc;
use clap::ValueEnum;
use md5::{Digest, Md5};
use rand::{thread_rng, RngCore};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

/// Attempts made to find a free name before an upload is given up
pub const MAX_NAME_ATTEMPTS: usize = 16;

/// Longest extension (without the dot) carried over from the client file name
const MAX_EXTENSION_LEN: usize = 16;

/// Number of random bytes used by [`NameStrategy::Random`]
const RANDOM_NAME_BYTES: usize = 8;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    Serialize,
    Deserialize,
    IntoStaticStr,
    VariantNames,
    EnumString,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum NameStrategy {
    /// Hex MD5 digest of the content, identical uploads share a name
    Md5,
    /// Random hex string
    Random,
    /// Base-36 encoded nanosecond timestamp
    #[default]
    Timestamp,
}

impl NameStrategy {
    /// Generate a file name for `data` uploaded as `client_name`.
    ///
    /// `attempt` counts previous collisions for this upload, starting at zero.
    pub fn file_name(self, data: &[u8], client_name: &str, attempt: usize) -> String {
        let stem = match self {
            Self::Md5 => hex::encode(Md5::digest(data)),
            Self::Random => {
                let mut bytes = [0u8; RANDOM_NAME_BYTES];
                thread_rng().fill_bytes(&mut bytes);
                hex::encode(bytes)
            }
            Self::Timestamp => {
                let nanos = Utc::now()
                    .timestamp_nanos_opt()
                    .map_or(0, |n| u128::try_from(n).unwrap_or_default());
                let encoded = to_base36(nanos);
                if attempt == 0 {
                    encoded
                } else {
                    format!("{encoded}-{attempt}")
                }
            }
        };

        format!("{stem}{}", extension(client_name))
    }

    /// Whether an existing file with the generated name holds the same upload
    pub const fn is_content_addressed(self) -> bool {
        matches!(self, Self::Md5)
    }
}

/// Extension of the client supplied file name, including the leading dot.
///
/// Returns an empty string if there is none or it contains anything other
/// than ASCII alphanumerics.
pub fn extension(client_name: &str) -> &str {
    let base = client_name.rsplit('/').next().unwrap_or_default();
    let Some(idx) = base.rfind('.') else {
        return "";
    };
    let ext = &base[idx..];
    let body = &ext[1..];

    if body.is_empty()
        || body.len() > MAX_EXTENSION_LEN
        || !body.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return "";
    }

    ext
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();

    String::from_utf8(out).unwrap_or_default()
}
