// ============================
// tests/unit/config_tests.rs
// ============================
//! Settings loading through the public API
use backend_lib::config::{Environment, MailTransport, Settings, StorageBackend};
use figment::Jail;

#[test]
fn test_for_tests_settings_are_valid() {
    let settings = Settings::for_tests();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.environment, Environment::Test);
    assert_eq!(settings.storage, StorageBackend::Memory);
    assert_eq!(settings.smtp.transport, MailTransport::Log);
}

#[test]
fn test_load_from_file_and_env() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "app.toml",
            r#"
                storage = "memory"
                frontend_url = "https://app.example.com"

                [smtp]
                transport = "log"
            "#,
        )?;
        jail.set_env("SAAS_JWT__ACCESS_TTL_SECS", "60");

        let settings = Settings::load_from("app.toml").expect("settings should load");
        assert_eq!(settings.storage, StorageBackend::Memory);
        assert_eq!(settings.frontend_url, "https://app.example.com");
        assert_eq!(settings.smtp.transport, MailTransport::Log);
        assert_eq!(settings.jwt.access_ttl_secs, 60);
        Ok(())
    });
}

#[test]
fn test_load_rejects_invalid_values() {
    Jail::expect_with(|jail| {
        jail.create_file("app.toml", "bcrypt_cost = 2")?;

        assert!(Settings::load_from("app.toml").is_err());
        Ok(())
    });
}
