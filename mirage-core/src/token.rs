//! Virtual-id codec.
//!
//! A virtual token is `mrg1.<tag>.<base64url(source id)>`: the reserved
//! marker, a namespace tag (`view` or `item`), and the url-safe unpadded
//! base64 of the UTF-8 source identifier. The upstream server issues plain
//! hex GUIDs, so no native id can carry the marker; the trailing digit
//! versions the format, and a future alphabet change bumps it so stale
//! tokens fail closed as corrupt instead of decoding to garbage.
//!
//! The codec is pure and stateless: tokens are stable across restarts and
//! across every instance of the proxy.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{ProxyError, Result};
use mirage_model::CollectionId;

/// Reserved leading marker of every virtual token.
pub const TOKEN_MARKER: &str = "mrg1";

const DELIMITER: char = '.';

/// The kind of synthetic entity a token names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    View,
    Item,
}

impl Namespace {
    pub fn tag(&self) -> &'static str {
        match self {
            Namespace::View => "view",
            Namespace::Item => "item",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "view" => Some(Namespace::View),
            "item" => Some(Namespace::Item),
            _ => None,
        }
    }
}

/// Outcome of decoding a client-presented id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// No marker: the id belongs to the upstream server, pass through.
    Native,
    /// A well-formed virtual token.
    Virtual {
        namespace: Namespace,
        source_id: String,
    },
}

/// Encode `(namespace, source id)` into a virtual token.
pub fn encode(namespace: Namespace, source_id: &str) -> String {
    format!(
        "{TOKEN_MARKER}{DELIMITER}{}{DELIMITER}{}",
        namespace.tag(),
        URL_SAFE_NO_PAD.encode(source_id.as_bytes())
    )
}

/// Decode a client-presented id.
///
/// An id without the marker is [`Decoded::Native`] with no side effects. An
/// id that carries the marker but fails to parse is a hard
/// [`ProxyError::MalformedToken`]: a corrupted or replayed token must never
/// be reinterpreted as some unrelated native entity.
pub fn decode(id: &str) -> Result<Decoded> {
    let Some(rest) = id.strip_prefix(TOKEN_MARKER) else {
        return Ok(Decoded::Native);
    };
    let Some(rest) = rest.strip_prefix(DELIMITER) else {
        return Err(ProxyError::MalformedToken(format!(
            "missing tag delimiter in {id:?}"
        )));
    };
    let Some((tag, payload)) = rest.split_once(DELIMITER) else {
        return Err(ProxyError::MalformedToken(format!(
            "missing payload delimiter in {id:?}"
        )));
    };
    let Some(namespace) = Namespace::from_tag(tag) else {
        return Err(ProxyError::MalformedToken(format!(
            "unknown namespace tag {tag:?}"
        )));
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|err| ProxyError::MalformedToken(format!("bad payload encoding: {err}")))?;
    let source_id = String::from_utf8(bytes)
        .map_err(|_| ProxyError::MalformedToken("payload is not valid UTF-8".to_string()))?;
    if source_id.is_empty() {
        return Err(ProxyError::MalformedToken("empty payload".to_string()));
    }
    Ok(Decoded::Virtual {
        namespace,
        source_id,
    })
}

/// Token for a virtual view backed by the given collection.
pub fn view_token(collection: &CollectionId) -> String {
    encode(Namespace::View, &collection.to_string())
}

/// Token for a placeholder item identified by an external catalog id.
pub fn item_token(source_id: &str) -> String {
    encode(Namespace::Item, source_id)
}

/// Interpret a decoded view-token payload as a collection id.
pub fn view_collection(source_id: &str) -> Result<CollectionId> {
    CollectionId::parse(source_id).map_err(|_| {
        ProxyError::MalformedToken(format!(
            "view token payload is not a collection id: {source_id:?}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_both_namespaces() {
        for namespace in [Namespace::View, Namespace::Item] {
            for source_id in ["tmdb:603", "imdb:tt0062622", "日本語", "a"] {
                let token = encode(namespace, source_id);
                assert_eq!(
                    decode(&token).unwrap(),
                    Decoded::Virtual {
                        namespace,
                        source_id: source_id.to_string()
                    },
                    "token {token}"
                );
            }
        }
    }

    #[test]
    fn native_ids_decode_as_native() {
        for id in [
            "f3b9c2d41a0e4b6d9c2f1e8a7b5d3c4e",
            "8a7b5d3c",
            "",
            "mrg", // shorter than the marker
        ] {
            assert_eq!(decode(id).unwrap(), Decoded::Native, "id {id:?}");
        }
    }

    #[test]
    fn marked_but_malformed_is_corrupt() {
        for id in [
            "mrg1",
            "mrg1.",
            "mrg1.view",
            "mrg1.view.",
            "mrg1.view.%%%",
            "mrg1.playlist.dG1kYjo2MDM",
            "mrg1..dG1kYjo2MDM",
        ] {
            let err = decode(id).unwrap_err();
            assert!(
                matches!(err, ProxyError::MalformedToken(_)),
                "id {id:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn tokens_never_collide_with_native_ids() {
        // Upstream ids are hex GUIDs; the marker contains non-hex letters.
        let token = item_token("tmdb:603");
        assert!(token.starts_with("mrg1."));
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()
            || c == '.'
            || c == '-'
            || c == '_'));
    }

    #[test]
    fn view_tokens_carry_the_collection_id() {
        let collection = CollectionId::new();
        let token = view_token(&collection);
        let Decoded::Virtual {
            namespace,
            source_id,
        } = decode(&token).unwrap()
        else {
            panic!("expected virtual");
        };
        assert_eq!(namespace, Namespace::View);
        assert_eq!(view_collection(&source_id).unwrap(), collection);
    }

    #[test]
    fn view_payload_must_be_a_collection_id() {
        let token = encode(Namespace::View, "not-a-uuid");
        let Decoded::Virtual { source_id, .. } = decode(&token).unwrap() else {
            panic!("expected virtual");
        };
        assert!(matches!(
            view_collection(&source_id),
            Err(ProxyError::MalformedToken(_))
        ));
    }
}
