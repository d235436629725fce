//! # Promo Code Codec
//!
//! Reversible, integrity-protected encoding of a promotion's identity tuple
//! (promo text, promoter, restaurant, post, dish) into an opaque bearer
//! string.
//!
//! ## Invariants
//! - Decode(Encode(t)) == t
//! - Any modified byte fails decoding; wrong fields are never returned
//! - Field contents never affect field boundaries
//! - Keys are injected, never read from global state

mod cipher;
mod errors;
mod key;
mod payload;

pub use cipher::{PromoCodec, CODE_VERSION};
pub use errors::{CodecError, CodecResult};
pub use key::{PromoKey, PromoKeyring, KEY_ID_LEN, KEY_LEN};
pub use payload::PromoFields;
