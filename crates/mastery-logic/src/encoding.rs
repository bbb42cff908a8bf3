//! Compact share codes for a build.
//!
//! Each active node becomes one byte:
//!
//! ```text
//!  bit  7   6 5     4 3 2      1 0
//!      [0] [branch] [tier-1]  [col-1]
//! ```
//!
//! The bytes, in ascending node order, are base64url encoded without
//! padding. A build of five masteries fits in an eight-character code.
//!
//! ```
//! use mastery_logic::encoding::{decode, encode};
//! use mastery_logic::node::ActiveSet;
//!
//! let build: ActiveSet = ["offense-1-2", "offense-2-2"]
//!     .iter()
//!     .map(|s| s.parse().unwrap())
//!     .collect();
//! let code = encode(&build);
//! assert_eq!(decode(&code).unwrap().nodes, build);
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::Result;
use crate::node::{ActiveSet, Branch, NodeId};

/// Pack one node into its share byte.
pub fn encode_node(id: NodeId) -> u8 {
    ((id.branch as u8) << 5) | ((id.tier - 1) << 2) | (id.column - 1)
}

/// Unpack a share byte, or `None` if it does not name a node of the tree.
pub fn decode_node(byte: u8) -> Option<NodeId> {
    if byte & 0b1000_0000 != 0 {
        return None;
    }
    let branch = Branch::from_index((byte >> 5) & 0b11)?;
    let tier = ((byte >> 2) & 0b111) + 1;
    let column = (byte & 0b11) + 1;
    NodeId::new(branch, tier, column)
}

/// Encode an active set as a base64url share code.
pub fn encode(active: &ActiveSet) -> String {
    let bytes: Vec<u8> = active.iter().map(encode_node).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Result of decoding a share code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedSelection {
    pub nodes: ActiveSet,
    /// Bytes that did not name a node and were dropped.
    pub skipped: Vec<u8>,
}

/// Decode a share code.
///
/// Fails only when the text is not base64. Individual bytes outside the
/// tree are skipped and reported in [`DecodedSelection::skipped`].
/// Trailing `=` padding and the standard `+`/`/` alphabet are accepted.
pub fn decode(code: &str) -> Result<DecodedSelection> {
    let normalized: String = code
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(normalized)?;

    let mut selection = DecodedSelection::default();
    for byte in bytes {
        match decode_node(byte) {
            Some(id) => {
                selection.nodes.insert(id);
            }
            None => selection.skipped.push(byte),
        }
    }
    if !selection.skipped.is_empty() {
        log::warn!(
            "Share code contained {} invalid entries",
            selection.skipped.len()
        );
    }
    Ok(selection)
}

/// Full share link for a code.
pub fn share_link(base_url: &str, param: &str, code: &str) -> String {
    format!("{}?{}={}", base_url, param, code)
}

/// Extract the share code from a link's query string.
pub fn share_code_from_link<'a>(link: &'a str, param: &str) -> Option<&'a str> {
    let query = link.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    query.split('&').find_map(|pair| match pair.split_once('=') {
        Some((key, value)) if key == param => Some(value),
        _ => None,
    })
}
