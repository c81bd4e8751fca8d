// src/ident.rs

//! Identifier generation.
//!
//! [`uuid`] is the everyday random identifier. [`uuid_time`] trades
//! randomness for rough time ordering: version 1 identifiers from one
//! process sort by creation time, which keeps related rows together in
//! range scans.

use lazy_static::lazy_static;
use uuid::Uuid;

lazy_static! {
    // random node id, fixed for the lifetime of the process
    static ref NODE_ID: [u8; 6] = {
        let seed = Uuid::new_v4();
        let bytes = seed.as_bytes();
        [bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]]
    };
}

/// Random (version 4) UUID, lowercase hyphenated.
pub fn uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Time-based (version 1) UUID, lowercase hyphenated.
pub fn uuid_time() -> String {
    Uuid::now_v1(&NODE_ID).to_string()
}
