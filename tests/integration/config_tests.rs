use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use rowdupe::config::Config;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.job_timeout_secs, 60);
}

#[test]
fn test_config_load_from_env() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("ROWDUPE_SHARDS", "6");
        jail.set_env("ROWDUPE_PRETTY", "true");

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("ROWDUPE_").split("__"))
            .extract()?;

        assert_eq!(config.shards, 6);
        assert!(config.pretty);
        assert_eq!(config.delimiter, ',');
        Ok(())
    });
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "delimiter = \";\"\nshards = 4\njob_timeout_secs = 15\n",
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.delimiter, ';');
    assert_eq!(config.shards, 4);
    assert_eq!(config.job_timeout_secs, 15);
    assert!(!config.progress);
}

#[test]
fn test_config_env_overrides_toml() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("rowdupe.toml", "shards = 2\npretty = true\n")?;
        jail.set_env("ROWDUPE_SHARDS", "9");

        let config = Config::load(Some(std::path::Path::new("rowdupe.toml")))
            .map_err(|e| e.to_string())?;

        assert_eq!(config.shards, 9);
        assert!(config.pretty);
        Ok(())
    });
}

#[test]
fn test_config_load_rejects_invalid_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("bad.toml", "shards = 0\n")?;
        assert!(Config::load(Some(std::path::Path::new("bad.toml"))).is_err());

        jail.create_file("bad_type.toml", "shards = \"many\"\n")?;
        assert!(Config::load(Some(std::path::Path::new("bad_type.toml"))).is_err());
        Ok(())
    });
}

#[test]
fn test_config_finder_settings() {
    let config = Config {
        delimiter: '|',
        shards: 3,
        ..Config::default()
    };
    let finder = config.finder_config().unwrap();
    assert_eq!(finder.delimiter, b'|');
    assert_eq!(finder.shards, 3);
}
