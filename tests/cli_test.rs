use std::fs;
use std::process::Command;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_prints_only_the_summary_on_stdout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sample_sales.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("name,Amount \n Alice,10\nBob,\n,20"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let root = dir.path().display().to_string();
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        format!(
            "paths:\n  logs: '{root}/logs'\n  raw_data: '{root}/data/raw'\n  processed_data: '{root}/data/processed'\n\
             data_sources:\n  sample_sales: '{}/sample_sales.csv'\n",
            server.uri()
        ),
    )
    .unwrap();

    let output = tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_etl_pipeline"))
            .arg("--config")
            .arg(&config_path)
            .env_remove("RUST_LOG")
            .output()
    })
    .await
    .unwrap()
    .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "Pipeline completed! Processed 3 rows\n"
    );
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains(" - INFO - Starting pipeline for sample_sales"), "{}", stderr);
}
