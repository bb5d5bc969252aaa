use chrono::{TimeZone, Utc};
use volc_speech::auth::{
    CanonicalRequest, Credential, CredentialSigner, SignableRequest, SigningError,
    encode_component, hash_payload,
};

fn signer() -> CredentialSigner {
    CredentialSigner::new(Credential::new("AKTEST", "secret", "sami", "cn-north-1"))
}

fn request() -> SignableRequest {
    SignableRequest::new("POST", "/")
        .with_query("Version", "2021-07-27")
        .with_query("Action", "GetToken")
        .with_header("Host", "open.volcengineapi.com")
        .with_header("Content-Type", "application/json")
        .with_body(br#"{"appkey":"app","token_version":"volc-auth-v1","expiration":3600}"#)
}

fn timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
}

#[test]
fn signing_is_deterministic() {
    let a = signer().sign(&request(), timestamp()).unwrap();
    let b = signer().sign(&request(), timestamp()).unwrap();

    assert_eq!(a, b);
    assert_eq!(a.x_date, "20240102T030405Z");
    assert_eq!(a.content_sha256, request().body_hash);
}

#[test]
fn authorization_header_shape() {
    let signed = signer().sign(&request(), timestamp()).unwrap();

    let prefix = "HMAC-SHA256 Credential=AKTEST/20240102/cn-north-1/sami/request, \
                  SignedHeaders=content-type;host;x-content-sha256;x-date, Signature=";
    assert!(
        signed.authorization.starts_with(prefix),
        "unexpected authorization: {}",
        signed.authorization
    );

    let signature = &signed.authorization[prefix.len()..];
    assert_eq!(signature.len(), 64);
    assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));

    let names: Vec<&str> = signed.pairs().iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["Authorization", "X-Date", "X-Content-Sha256"]);
}

#[test]
fn canonical_request_layout() {
    let canonical = CanonicalRequest::build(&request(), "20240102T030405Z").unwrap();
    let body_hash = request().body_hash;

    let expected = format!(
        "POST\n/\nAction=GetToken&Version=2021-07-27\n\
         content-type:application/json\nhost:open.volcengineapi.com\n\
         x-content-sha256:{body_hash}\nx-date:20240102T030405Z\n\n\
         content-type;host;x-content-sha256;x-date\n{body_hash}"
    );
    assert_eq!(canonical.text, expected);
}

#[test]
fn headers_are_trimmed_and_lower_cased() {
    let messy = SignableRequest::new("post", "/")
        .with_header("  HOST ", "  open.volcengineapi.com  ")
        .with_body(b"{}");
    let clean = SignableRequest::new("POST", "/")
        .with_header("host", "open.volcengineapi.com")
        .with_body(b"{}");

    assert_eq!(
        CanonicalRequest::build(&messy, "20240102T030405Z").unwrap(),
        CanonicalRequest::build(&clean, "20240102T030405Z").unwrap()
    );
}

#[test]
fn query_is_rfc3986_encoded_and_sorted() {
    assert_eq!(encode_component("a b+c/~-_."), "a%20b%2Bc%2F~-_.");

    let request = SignableRequest::new("GET", "/")
        .with_query("b", "2")
        .with_query("a", "z y")
        .with_query("a", "x");
    let canonical = CanonicalRequest::build(&request, "20240102T030405Z").unwrap();

    assert_eq!(canonical.text.lines().nth(2), Some("a=x&a=z%20y&b=2"));
}

#[test]
fn every_input_changes_the_signature() {
    let base = signer().sign(&request(), timestamp()).unwrap().authorization;

    let mut other_body = request();
    other_body.body_hash = hash_payload(br#"{"appkey":"apq","token_version":"volc-auth-v1","expiration":3600}"#);

    let variants = vec![
        CredentialSigner::new(Credential::new("AKTEST", "secreu", "sami", "cn-north-1"))
            .sign(&request(), timestamp()),
        CredentialSigner::new(Credential::new("AKTEST", "secret", "samj", "cn-north-1"))
            .sign(&request(), timestamp()),
        CredentialSigner::new(Credential::new("AKTEST", "secret", "sami", "cn-north-2"))
            .sign(&request(), timestamp()),
        signer().sign(&other_body, timestamp()),
        signer().sign(&request().with_query("Extra", "1"), timestamp()),
        signer().sign(&request().with_header("X-Extra", "1"), timestamp()),
        signer().sign(
            &SignableRequest { method: "PUT".into(), ..request() },
            timestamp(),
        ),
        signer().sign(
            &SignableRequest { path: "/a".into(), ..request() },
            timestamp(),
        ),
        signer().sign(&request(), Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 6).unwrap()),
    ];

    for variant in variants {
        let signature = variant.unwrap().authorization;
        assert_ne!(signature.rsplit('=').next(), base.rsplit('=').next());
    }
}

#[test]
fn invalid_inputs_are_rejected() {
    let bad_name = request().with_header("Bad Header", "x");
    assert_eq!(
        signer().sign(&bad_name, timestamp()),
        Err(SigningError::InvalidHeaderName("Bad Header".to_string()))
    );

    let empty_name = request().with_header("  ", "x");
    assert!(matches!(
        signer().sign(&empty_name, timestamp()),
        Err(SigningError::InvalidHeaderName(_))
    ));

    let bad_value = request().with_header("X-Note", "line\nbreak");
    assert_eq!(
        signer().sign(&bad_value, timestamp()),
        Err(SigningError::InvalidHeaderValue("x-note".to_string()))
    );

    let no_method = SignableRequest { method: " ".into(), ..request() };
    assert_eq!(signer().sign(&no_method, timestamp()), Err(SigningError::EmptyMethod));

    let bad_path = SignableRequest { path: "relative".into(), ..request() };
    assert!(matches!(
        signer().sign(&bad_path, timestamp()),
        Err(SigningError::InvalidPath(_))
    ));
}

#[test]
fn credential_debug_hides_secret() {
    let debug = format!("{:?}", Credential::new("AKTEST", "topsecret", "sami", "cn-north-1"));

    assert!(debug.contains("AKTEST"));
    assert!(!debug.contains("topsecret"));
}

#[test]
fn signing_key_follows_date_region_service_chain() {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    fn mac(key: &[u8], data: &str) -> Vec<u8> {
        let mut mac = Hmac::<Sha256>::new_from_slice(key).unwrap();
        mac.update(data.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    let expected = mac(
        &mac(&mac(&mac(b"secret", "20240102"), "cn-north-1"), "sami"),
        "request",
    );

    assert_eq!(signer().signing_key("20240102").unwrap(), expected);
    assert_eq!(
        signer().credential_scope("20240102"),
        "20240102/cn-north-1/sami/request"
    );
}
