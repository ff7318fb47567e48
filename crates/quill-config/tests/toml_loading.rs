use figment::Jail;
use quill_config::QuillConfig;

#[test]
fn project_local_toml_is_read() {
    Jail::expect_with(|jail| {
        jail.create_dir(".quill")?;
        jail.create_file(
            ".quill/config.toml",
            r#"
                [api]
                base_url = "https://staging.example.com/api"
            "#,
        )?;

        let config: QuillConfig = QuillConfig::figment().extract()?;
        assert_eq!(config.api.base_url, "https://staging.example.com/api");
        // Unset fields keep their defaults.
        assert_eq!(config.api.timeout_secs, 10);
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".quill")?;
        jail.create_file(
            ".quill/config.toml",
            r#"
                [api]
                base_url = "https://from-toml.example.com/api"
            "#,
        )?;
        jail.set_env("QUILL_API__BASE_URL", "https://from-env.example.com/api");

        let config: QuillConfig = QuillConfig::figment().extract()?;
        assert_eq!(config.api.base_url, "https://from-env.example.com/api");
        Ok(())
    });
}
