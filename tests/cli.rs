use assert_cmd::Command;
use predicates::str::contains;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("predictasearch").unwrap();
    cmd.env_remove("PREDICTA_API_KEY")
        .env_remove("PREDICTA_API_URL")
        .env_remove("PREDICTA_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("email"))
        .stdout(contains("phone"))
        .stdout(contains("networks"))
        .stdout(contains("--filter"))
        .stdout(contains("--pretty"));
}

#[test]
fn missing_api_key_fails_before_any_request() {
    // an unroutable URL proves no request is needed to fail
    cmd()
        .env("PREDICTA_API_URL", "http://127.0.0.1:9")
        .args(["email", "johndoe@gmail.com"])
        .assert()
        .failure()
        .stderr(contains("PREDICTA_API_KEY is not set"));
}

#[test]
fn empty_api_key_is_treated_as_missing() {
    cmd()
        .env("PREDICTA_API_KEY", "")
        .arg("networks")
        .assert()
        .failure()
        .stderr(contains("PREDICTA_API_KEY"));
}

#[test]
fn invalid_base_url_is_a_configuration_error() {
    cmd()
        .env("PREDICTA_API_KEY", "sk_test_dummy")
        .env("PREDICTA_API_URL", "not a url")
        .arg("networks")
        .assert()
        .failure()
        .stderr(contains("configuration error"));
}

#[test]
fn empty_identifier_is_rejected() {
    cmd()
        .env("PREDICTA_API_KEY", "sk_test_dummy")
        .env("PREDICTA_API_URL", "http://127.0.0.1:9")
        .args(["email", ""])
        .assert()
        .failure()
        .stderr(contains("identifier must not be empty"));
}

#[test]
fn unreachable_service_is_a_transport_failure() {
    cmd()
        .env("PREDICTA_API_KEY", "sk_test_dummy")
        .env("PREDICTA_API_URL", "http://127.0.0.1:9")
        .env("PREDICTA_TIMEOUT_SECS", "5")
        .args(["phone", "+1234567890", "--filter", "facebook,tiktok"])
        .assert()
        .failure()
        .stderr(contains("phone search for +1234567890 failed"))
        .stderr(contains("transport error"));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    cmd().assert().failure().stderr(contains("Usage"));
}
