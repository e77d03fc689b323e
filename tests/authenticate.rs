//! Authentication of tokens signed with keys of all supported families.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};

use jwt_gate::{
    claims, issue_token, prelude::*, AuthError, ErrorKind, InvalidToken, Key, Keystore,
    NamedKeystore, SingleKeystore, ValidationError,
};

mod shared;

use crate::shared::{
    all_key_pairs, ecdsa_keys, hmac_keys, make_claims, make_token, make_token_with_timestamps,
    mangle_signature_bits, replace_claims, rsa_keys, KeyPair, Timestamps,
};

fn authenticate(token: &str, store: &dyn Keystore) -> Result<AuthContext, AuthError> {
    DefaultAuthenticator::default().authenticate(&AuthContext::new(), token, store)
}

fn test_key_family(keys: &KeyPair) {
    let store = NamedKeystore::new();
    store.trust("some-issuer", keys.trusted.clone()).unwrap();

    // Valid token
    let token = make_token("some-issuer", "some-subject", &keys.trusted, &["read"]);
    let context = authenticate(&token, &store).unwrap();
    let claims = context.claims().unwrap();
    assert_eq!(claims.subject(), "some-subject");
    assert_eq!(claims.strings("scopes"), ["read"]);
    assert_eq!(context.token(), Some(token.as_str()));

    // Tokens with mangled signatures
    for mangled_token in mangle_signature_bits(&token) {
        let err = authenticate(&mangled_token, &store).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidToken, "{err}");
    }

    // Token with modified claims
    let elevated_claims = make_claims("some-issuer", "root", Timestamps::valid(), &["read"]);
    let modified_token = replace_claims(&token, &elevated_claims);
    let err = authenticate(&modified_token, &store).unwrap_err();
    assert_matches!(
        err,
        AuthError::InvalidToken {
            cause: InvalidToken::Validation(ValidationError::InvalidSignature),
            ..
        }
    );

    // Token signed with an untrusted key
    let token = make_token("some-issuer", "some-subject", &keys.untrusted, &["read"]);
    let err = authenticate(&token, &store).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidToken, "{err}");

    // Expired token
    let issued_at = Utc::now() - Duration::hours(1);
    let times = Timestamps {
        issued_at: Some(issued_at),
        not_before: None,
        expires_at: Some(issued_at + Duration::minutes(1)),
    };
    let token = make_token_with_timestamps("some-issuer", "some-subject", &keys.trusted, times, &[]);
    let err = authenticate(&token, &store).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
    assert!(err.to_string().contains("expired"), "{err}");
    assert!(err.metadata().unwrap().claims.is_some());

    // Token that is not valid yet
    let now = Utc::now();
    let times = Timestamps {
        issued_at: Some(now),
        not_before: Some(now + Duration::minutes(1)),
        expires_at: Some(now + Duration::minutes(2)),
    };
    let token = make_token_with_timestamps("some-issuer", "some-subject", &keys.trusted, times, &[]);
    let err = authenticate(&token, &store).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
    assert!(err.to_string().contains("not valid yet"), "{err}");
}

#[test]
fn hmac_tokens() {
    test_key_family(&hmac_keys());
}

#[test]
fn rsa_tokens() {
    test_key_family(&rsa_keys());
}

#[test]
fn ecdsa_tokens() {
    test_key_family(&ecdsa_keys());
}

#[test]
fn public_keys_verify_tokens() {
    for (family, keys) in [("RSA", rsa_keys()), ("ECDSA", ecdsa_keys())] {
        let store = SingleKeystore::new(keys.trusted.to_public());
        let token = make_token("some-issuer", "some-subject", &keys.trusted, &[]);
        let context = authenticate(&token, &store)
            .unwrap_or_else(|err| panic!("{family} token not authenticated: {err}"));
        assert_eq!(context.claims().unwrap().subject(), "some-subject");
    }
}

#[test]
fn tokens_signed_with_other_key_family_are_rejected() {
    let pairs = all_key_pairs();
    for (trusted_family, trusted_keys) in &pairs {
        let store = SingleKeystore::new(trusted_keys.trusted.clone());
        for (signing_family, signing_keys) in &pairs {
            if trusted_family == signing_family {
                continue;
            }
            let token = make_token("some-issuer", "some-subject", &signing_keys.trusted, &[]);
            let err = authenticate(&token, &store).unwrap_err();
            assert_matches!(
                err,
                AuthError::InvalidToken {
                    cause: InvalidToken::Validation(ValidationError::AlgorithmMismatch { .. }),
                    ..
                },
                "{signing_family} token accepted by {trusted_family} key"
            );
        }
    }
}

#[test]
fn unknown_issuers_are_rejected() {
    let keys = hmac_keys();
    let store = NamedKeystore::new();
    store.trust("some-issuer", keys.trusted.clone()).unwrap();

    let token = make_token("suspicious-issuer", "some-subject", &keys.trusted, &[]);
    let err = authenticate(&token, &store).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidToken);
    assert_eq!(err.untrusted_issuer_name(), Some("suspicious-issuer"));
    assert!(err.to_string().contains("suspicious-issuer"), "{err}");
}

#[test]
fn revoked_issuers_are_rejected() {
    let keys = ecdsa_keys();
    let store = NamedKeystore::new();
    store.trust("some-issuer", keys.trusted.clone()).unwrap();
    let token = make_token("some-issuer", "some-subject", &keys.trusted, &[]);
    authenticate(&token, &store).unwrap();

    store.revoke_trust("some-issuer");
    let err = authenticate(&token, &store).unwrap_err();
    assert_eq!(err.untrusted_issuer_name(), Some("some-issuer"));
}

#[test]
fn non_string_issuers_are_converted() {
    let keys = hmac_keys();
    let store = NamedKeystore::new();
    store.trust("7", keys.trusted.clone()).unwrap();

    let token = issue_token(&keys.trusted, &claims!["iss", 7, "sub", "some-subject"]).unwrap();
    let context = authenticate(&token, &store).unwrap();
    assert_eq!(context.claims().unwrap().issuer(), "7");
}

#[test]
fn tokens_without_issuer_use_empty_issuer() {
    let keys = hmac_keys();
    let store = NamedKeystore::new();
    store.trust("", keys.trusted.clone()).unwrap();

    let token = issue_token(&keys.trusted, &claims!["sub", "some-subject"]).unwrap();
    let context = authenticate(&token, &store).unwrap();
    assert_eq!(context.claims().unwrap().issuer(), "");
}

#[test]
fn claims_survive_authentication() {
    let keys = rsa_keys();
    let store = SingleKeystore::new(keys.trusted.clone());
    let claims = claims!["potatoes", "fried", "count", 3, "crispy", true];
    let token = issue_token(&keys.trusted, &claims).unwrap();

    let context = authenticate(&token, &store).unwrap();
    let authenticated = context.claims().unwrap();
    assert_eq!(*authenticated, claims);
    assert_eq!(authenticated.string("potatoes"), "fried");
    assert_eq!(authenticated.int("count"), 3);
    assert!(authenticated.bool("crispy"));
}

#[test]
fn leeway_accepts_recently_expired_tokens() {
    let keys = hmac_keys();
    let store = SingleKeystore::new(keys.trusted.clone());
    let now = Utc::now();
    let times = Timestamps {
        issued_at: Some(now - Duration::minutes(2)),
        not_before: None,
        expires_at: Some(now - Duration::seconds(30)),
    };
    let token = make_token_with_timestamps("some-issuer", "some-subject", &keys.trusted, times, &[]);
    authenticate(&token, &store).unwrap_err();

    let verifier = TokenVerifier::new(TimeOptions::from_leeway(Duration::minutes(5)));
    let authenticator = DefaultAuthenticator::new(verifier);
    authenticator
        .authenticate(&AuthContext::new(), &token, &store)
        .unwrap();
}

#[test]
fn signing_with_public_keys_is_unsupported() {
    let public_key: Key = rsa_keys().trusted.to_public();
    assert!(!public_key.can_sign());
    let err = issue_token(&public_key, &claims!["sub", "some-subject"]).unwrap_err();
    assert!(err.to_string().contains("RSA key"), "{err}");
}
