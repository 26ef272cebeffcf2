//! SASL-PLAIN initial response construction (§4.1.1 step 4).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// `{accountGuid}@{domain}\0{accountGuid}\0{chatToken}`, base64-encoded, per
/// the SASL-PLAIN mechanism.
pub fn plain_initial_response(account_guid: &str, domain: &str, chat_token: &str) -> String {
    let raw = format!("{account_guid}@{domain}\0{account_guid}\0{chat_token}");
    STANDARD.encode(raw.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_vector() {
        assert_eq!(STANDARD.encode(b"hello"), "aGVsbG8=");
    }

    #[test]
    fn plain_response_roundtrips() {
        let encoded = plain_initial_response("acct", "domain", "tok");
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, b"acct@domain\0acct\0tok");
    }
}
