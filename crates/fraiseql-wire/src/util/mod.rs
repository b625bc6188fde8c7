//! Utility modules for protocol and data handling

pub mod bytes;
pub mod oid;

pub use self::bytes::BytesExt;
pub use self::oid::{JSONB_OID, JSON_OID, OID};
