use roulette::config::Config;

#[tokio::test]
async fn default_config_written_and_reloaded() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    let path = path.to_str().unwrap();
    Config::create_default(path).await.unwrap();

    let config = Config::load(path).await.unwrap();
    assert_eq!(config.game.default_lives, 3);
    assert_eq!(config.game.dealer_name, "Dealer");
    assert!(config.game.seed.is_none());
    assert_eq!(config.storage.data_dir, "./data");
}

#[tokio::test]
async fn missing_or_broken_config_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("nope.toml");
    let err = Config::load(missing.to_str().unwrap()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));

    let broken = tmp.path().join("broken.toml");
    std::fs::write(&broken, "[game\ndefault_lives = ").unwrap();
    let err = Config::load(broken.to_str().unwrap()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[tokio::test]
async fn absent_config_falls_back_but_broken_config_does_not() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("absent.toml");
    let config = Config::load_or_default(missing.to_str().unwrap()).await.unwrap();
    assert_eq!(config.storage.data_dir, "./data");

    let broken = tmp.path().join("broken.toml");
    let mydata = tmp.path().join("mydata");
    std::fs::write(
        &broken,
        format!("[storage]\ndata_dir = {:?}\n[game\n", mydata.to_str().unwrap()),
    )
    .unwrap();
    let err = Config::load_or_default(broken.to_str().unwrap())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"), "{}", err);

    let good = tmp.path().join("good.toml");
    std::fs::write(
        &good,
        format!("[storage]\ndata_dir = {:?}\n", mydata.to_str().unwrap()),
    )
    .unwrap();
    let config = Config::load_or_default(good.to_str().unwrap()).await.unwrap();
    assert_eq!(config.storage.data_dir, mydata.to_str().unwrap());
}
