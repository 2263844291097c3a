//! Pure lookup tables for TLS cipher suite and version names, used by the
//! storage backend TLS configuration options.

use thiserror::Error;

/// Error returned when a cipher suite or TLS version name is not recognized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsNameError {
    /// No cipher suite with this name is known.
    #[error("unsupported cipher suite name: {0}")]
    UnknownCipherSuite(String),
    /// No TLS version with this name is known.
    #[error("unsupported TLS version name: {0}")]
    UnknownVersion(String),
}

fn cipher_suite_name_to_id(name: &str) -> Option<u16> {
    Some(match name {
        "TLS_AES_128_GCM_SHA256" => 0x1301,
        "TLS_AES_256_GCM_SHA384" => 0x1302,
        "TLS_CHACHA20_POLY1305_SHA256" => 0x1303,
        "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256" => 0xc02f,
        "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384" => 0xc030,
        "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256" => 0xc02b,
        "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384" => 0xc02c,
        "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256" => 0xcca8,
        "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256" => 0xcca9,
        _ => return None,
    })
}

/// Map cipher suite names to their IANA identifiers, preserving input
/// order. An empty slice returns an empty vector with no error. If any
/// name is unrecognized, the whole call fails — this does not filter
/// unknown names out, it rejects the list.
pub fn cipher_suite_names_to_ids(names: &[String]) -> Result<Vec<u16>, TlsNameError> {
    names
        .iter()
        .map(|n| {
            cipher_suite_name_to_id(n).ok_or_else(|| TlsNameError::UnknownCipherSuite(n.clone()))
        })
        .collect()
}

/// Map a TLS version name (`"1.0"` through `"1.3"`) to its protocol
/// version number.
pub fn version_name_to_id(name: &str) -> Result<u16, TlsNameError> {
    Ok(match name {
        "1.0" => 0x0301,
        "1.1" => 0x0302,
        "1.2" => 0x0303,
        "1.3" => 0x0304,
        _ => return Err(TlsNameError::UnknownVersion(name.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_cipher_suites_resolve_in_order_with_no_error() {
        let ids = cipher_suite_names_to_ids(&names(&[
            "TLS_AES_128_GCM_SHA256",
            "TLS_AES_256_GCM_SHA384",
        ]))
        .unwrap();
        assert_eq!(ids, vec![0x1301, 0x1302]);
    }

    #[test]
    fn unknown_cipher_suite_name_fails_the_whole_call() {
        let err = cipher_suite_names_to_ids(&names(&["TLS_INVALID"])).unwrap_err();
        assert_eq!(err, TlsNameError::UnknownCipherSuite("TLS_INVALID".into()));
    }

    #[test]
    fn empty_input_yields_empty_output_and_no_error() {
        assert_eq!(cipher_suite_names_to_ids(&[]).unwrap(), Vec::<u16>::new());
    }

    #[test]
    fn known_versions_resolve() {
        assert_eq!(version_name_to_id("1.2"), Ok(0x0303));
        assert_eq!(version_name_to_id("1.3"), Ok(0x0304));
    }

    #[test]
    fn unknown_version_errors() {
        assert!(version_name_to_id("Invalid").is_err());
    }
}
