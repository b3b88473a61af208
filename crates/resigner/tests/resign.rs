use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::TempDir;

use simple_resigner::{ResignError, RunConfig, run};

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(config: &str, message: impl AsRef<[u8]>) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.txt"), config).unwrap();
        fs::write(dir.path().join("message.txt"), message).unwrap();
        Self { dir }
    }

    fn message_path(&self) -> PathBuf {
        self.dir.path().join("message.txt")
    }

    fn run_config(&self) -> RunConfig {
        RunConfig::new(self.message_path()).with_config_path(self.dir.path().join("config.txt"))
    }

    fn message(&self) -> String {
        fs::read_to_string(self.message_path()).unwrap()
    }

    fn message_bytes(&self) -> Vec<u8> {
        fs::read(self.message_path()).unwrap()
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(data))
}

// ── Single stage over one parsed field ──────────────────────────────

#[test]
fn resigns_parsed_field_with_sha256_hex() {
    let fixture = Fixture::new(
        "algorithm:sha256:hex\n\
         signatureParameter:sig=\n\
         parseParameter:id=\n\
         doFinalString:parseParameter-00.\n",
        "id=abc\nsig=deadbeef\n",
    );

    let report = run(&fixture.run_config()).unwrap();
    let expected = sha256_hex(b"abc");

    assert_eq!(report.signed.old_signature, b"deadbeef");
    assert_eq!(report.signed.digest_input, b"abc");
    assert_eq!(report.signed.new_signature, expected.as_bytes());
    assert_eq!(report.lines_rewritten, 1);
    assert!(report.spliced);
    assert_eq!(fixture.message(), format!("id=abc\nsig={expected}\n"));
}

// ── Message body ─────────────────────────────────────────────────────

#[test]
fn body_sentinel_feeds_the_whole_payload() {
    let fixture = Fixture::new(
        "algorithm:sha256:hex\r\n\
         signatureParameter:X-Signature: \r\n\
         parseParameter:X-Timestamp: \r\n\
         parseParameter:[BCTt:message_body]\r\n\
         doFinalString:parseParameter-00.parseParameter-01.\r\n",
        "POST /api HTTP/1.1\r\n\
         X-Timestamp: 1700000000\r\n\
         X-Signature: 00ff\r\n\
         \r\n\
         first\n\
         second\n\
         third",
    );

    let report = run(&fixture.run_config()).unwrap();

    assert_eq!(report.signed.digest_input, b"1700000000firstsecondthird");
    let expected = sha256_hex(b"1700000000firstsecondthird");
    assert_eq!(report.signed.new_signature, expected.as_bytes());
    assert_eq!(
        fixture.message(),
        format!(
            "POST /api HTTP/1.1\r\nX-Timestamp: 1700000000\r\nX-Signature: {expected}\r\n\r\nfirst\nsecond\nthird"
        )
    );
}

// ── Unsupported algorithms ───────────────────────────────────────────

#[test]
fn unsupported_algorithm_leaves_message_untouched() {
    let message = "id=abc\nsig=deadbeef\n";
    let fixture = Fixture::new(
        "algorithm:sha256:hex\n\
         algorithm:sha3-256:hex\n\
         signatureParameter:sig=\n\
         parseParameter:id=\n\
         doFinalString:parseParameter-00.\n",
        message,
    );

    let err = run(&fixture.run_config()).unwrap_err();

    assert!(matches!(err, ResignError::AlgorithmUnsupported(ref name) if name == "sha3-256"));
    assert_eq!(err.exit_code(), 12);
    assert_eq!(fixture.message(), message);
}

// ── Post-parse parameters ────────────────────────────────────────────

#[test]
fn post_parse_parameter_is_independent_of_message() {
    let config = "algorithm:sha256:hex\n\
                  signatureParameter:sig=\n\
                  postParseParameter:device:XYZ\n\
                  doFinalString:postParseParameter-00.\n";
    let first = Fixture::new(config, "hello\nsig=1\n");
    let second = Fixture::new(config, "something else entirely\nsig=2\n");

    let a = run(&first.run_config()).unwrap();
    let b = run(&second.run_config()).unwrap();

    assert_eq!(a.signed.digest_input, b"XYZ");
    assert_eq!(b.signed.digest_input, b"XYZ");
    assert_eq!(a.signed.new_signature, b.signed.new_signature);
    assert_eq!(a.signed.new_signature, sha256_hex(b"XYZ").as_bytes());
}

// ── Hex case ─────────────────────────────────────────────────────────

#[test]
fn hex_encoding_is_uppercase() {
    let fixture = Fixture::new(
        "algorithm:sha256:hex\nsignatureParameter:sig=\nparseParameter:id=\ndoFinalString:parseParameter-00.\n",
        "id=abc\nsig=x\n",
    );

    let report = run(&fixture.run_config()).unwrap();

    assert_eq!(
        report.signed.new_signature,
        b"BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
    );
}

#[test]
fn hexlower_encoding_is_lowercase() {
    let fixture = Fixture::new(
        "algorithm:sha256:hexlower\nsignatureParameter:sig=\nparseParameter:id=\ndoFinalString:parseParameter-00.\n",
        "id=abc\nsig=x\n",
    );

    let report = run(&fixture.run_config()).unwrap();

    assert_eq!(
        report.signed.new_signature,
        b"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

// ── Non-UTF-8 messages ───────────────────────────────────────────────

#[test]
fn latin1_message_is_resigned() {
    let fixture = Fixture::new(
        "algorithm:sha256:hex\nsignatureParameter:sig=\nparseParameter:id=\ndoFinalString:parseParameter-00.\n",
        b"id=caf\xe9\nsig=x\n",
    );

    let report = run(&fixture.run_config()).unwrap();
    let expected = sha256_hex(b"caf\xe9");

    assert_eq!(report.signed.digest_input, b"caf\xe9");
    assert_eq!(report.signed.new_signature, expected.as_bytes());
    assert!(report.spliced);
    assert_eq!(
        fixture.message_bytes(),
        [b"id=caf\xe9\nsig=".as_slice(), expected.as_bytes(), b"\n".as_slice()].concat()
    );
}

#[test]
fn final_none_stage_splices_raw_digest_bytes() {
    let fixture = Fixture::new(
        "algorithm:md5:none\nsignatureParameter:sig=\nparseParameter:id=\ndoFinalString:parseParameter-00.\n",
        "id=a\nsig=x\n",
    );

    let report = run(&fixture.run_config()).unwrap();
    // md5("a") holds no zero byte, so nothing is truncated.
    let raw = md5::Md5::digest(b"a").to_vec();

    assert_eq!(report.signed.new_signature, raw);
    assert_eq!(fixture.message_bytes(), [b"id=a\nsig=".as_slice(), &raw[..], b"\n".as_slice()].concat());
}

// ── Chains, keys and mixed parameters ────────────────────────────────

#[test]
fn hmac_then_base64_chain_with_mixed_parameters() {
    let fixture = Fixture::new(
        "algorithm:hmac<sha1>*topsecret:hex\n\
         algorithm:md5:base64\n\
         signatureParameter:sig=\n\
         parseParameter:user=\n\
         postParseParameter:salt:pepper\n\
         doFinalString:postParseParameter-00.parseParameter-00.\n",
        "user=alice\nsig=AAAA\n",
    );

    let report = run(&fixture.run_config()).unwrap();

    assert_eq!(report.signed.digest_input, b"pepperalice");
    assert_eq!(report.signed.old_signature, b"AAAA");
    // md5 is 16 bytes, so the base64 form always ends in "==".
    let signature = String::from_utf8(report.signed.new_signature).unwrap();
    assert_eq!(signature.len(), 24);
    assert!(signature.ends_with("=="));
    assert_eq!(fixture.message(), format!("user=alice\nsig={signature}\n"));
}

#[test]
fn dry_run_reports_without_writing() {
    let message = "id=abc\nsig=deadbeef\n";
    let fixture = Fixture::new(
        "algorithm:sha256:hex\nsignatureParameter:sig=\nparseParameter:id=\ndoFinalString:parseParameter-00.\n",
        message,
    );

    let report = run(&fixture.run_config().with_dry_run(true)).unwrap();

    assert_eq!(report.signed.new_signature, sha256_hex(b"abc").as_bytes());
    assert!(!report.spliced);
    assert_eq!(fixture.message(), message);
}

#[test]
fn rerun_is_idempotent() {
    let fixture = Fixture::new(
        "algorithm:sha256:hex\nsignatureParameter:sig=\nparseParameter:id=\ndoFinalString:parseParameter-00.\n",
        "id=abc\nsig=deadbeef\n",
    );

    run(&fixture.run_config()).unwrap();
    let after_first = fixture.message();
    let second = run(&fixture.run_config()).unwrap();

    assert_eq!(second.signed.old_signature, second.signed.new_signature);
    assert!(!second.spliced);
    assert_eq!(fixture.message(), after_first);
}

// ── Failure paths ────────────────────────────────────────────────────

#[test]
fn missing_config_is_config_not_found() {
    let fixture = Fixture::new("", "id=1\n");
    let run_config = RunConfig::new(fixture.message_path()).with_config_path(fixture.path().join("nope.txt"));

    let err = run(&run_config).unwrap_err();
    assert!(matches!(err, ResignError::ConfigNotFound { .. }));
    assert_eq!(err.exit_code(), 11);
}

#[test]
fn incomplete_config_is_invalid() {
    let fixture = Fixture::new("algorithm:md5:hex\nparseParameter:id=\n", "id=1\nsig=2\n");

    let err = run(&fixture.run_config()).unwrap_err();
    assert!(matches!(err, ResignError::ConfigInvalid(_)));
    assert_eq!(fixture.message(), "id=1\nsig=2\n");
}

#[test]
fn missing_message_is_unreadable() {
    let fixture = Fixture::new(
        "algorithm:md5:hex\nsignatureParameter:sig=\nparseParameter:id=\ndoFinalString:parseParameter-00.\n",
        "",
    );
    let run_config = RunConfig::new(fixture.path().join("absent.txt"))
        .with_config_path(fixture.path().join("config.txt"));

    let err = run(&run_config).unwrap_err();
    assert!(matches!(err, ResignError::MessageUnreadable { .. }));
    assert_eq!(err.exit_code(), 14);
}

#[test]
fn template_index_out_of_range() {
    let message = "id=1\nsig=2\n";
    let fixture = Fixture::new(
        "algorithm:md5:hex\nsignatureParameter:sig=\nparseParameter:id=\ndoFinalString:parseParameter-00.parseParameter-01.\n",
        message,
    );

    let err = run(&fixture.run_config()).unwrap_err();
    assert!(matches!(err, ResignError::IndexOutOfRange { ref token } if token == "parseParameter-01"));
    assert_eq!(fixture.message(), message);
}

#[test]
fn staging_failure_leaves_original_byte_identical() {
    let message = "id=abc\r\nsig=deadbeef\r\n";
    let fixture = Fixture::new(
        "algorithm:sha256:hex\nsignatureParameter:sig=\nparseParameter:id=\ndoFinalString:parseParameter-00.\n",
        message,
    );
    let run_config = fixture
        .run_config()
        .with_staging_dir(fixture.path().join("does-not-exist"));

    let err = run(&run_config).unwrap_err();

    assert!(matches!(err, ResignError::SpliceIo { .. }));
    assert_eq!(err.exit_code(), 15);
    assert_eq!(fs::read(fixture.message_path()).unwrap(), message.as_bytes());
}

#[test]
fn sample_config_signs_its_documented_message() {
    let config = fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config.sample.txt")).unwrap();
    let fixture = Fixture::new(
        &config,
        "POST /v1/orders HTTP/1.1\r\n\
         X-Api-Timestamp: 1700000000\r\n\
         X-Api-Signature: AAAA\r\n\
         \r\n\
         {\"item\":42}",
    );

    let report = run(&fixture.run_config()).unwrap();

    assert_eq!(report.signed.digest_input, b"1700000000{\"item\":42}");
    assert_eq!(report.signed.old_signature, b"AAAA");
    let signature = String::from_utf8(report.signed.new_signature).unwrap();
    assert_eq!(signature.len(), 44);
    assert!(fixture.message().contains(&format!("X-Api-Signature: {signature}\r\n")));
}
