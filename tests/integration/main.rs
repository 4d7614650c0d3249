//! Integration tests for logocache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::io::{Cursor, Read, Write};
    use std::net::TcpListener;
    use tempfile::TempDir;

    /// Run the binary against a config path that does not exist, so
    /// defaults apply regardless of the host's real config.
    fn logocache(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("logocache");
        cmd.env("LOGOCACHE_CONFIG", temp.path().join("config.toml"));
        cmd
    }

    fn closed_port() -> u16 {
        TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    fn crest_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([20, 60, 160, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    /// Serve `body` as a PNG to a single connection, returning the base URL
    fn serve_png_once(body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        });

        format!("http://{}", addr)
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        logocache(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("URL-keyed image"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        logocache(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("logocache"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        logocache(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        logocache(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[fetch]"));
    }

    #[test]
    fn config_init_creates_file() {
        let temp = TempDir::new().unwrap();
        logocache(&temp).args(["config", "init"]).assert().success();
        assert!(temp.path().join("config.toml").exists());
    }

    #[test]
    fn invalid_config_fails_with_hint() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[fetch\n").unwrap();
        logocache(&temp)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("config init --force"));
    }

    #[test]
    fn load_requires_url() {
        let temp = TempDir::new().unwrap();
        logocache(&temp).arg("load").assert().failure();
    }

    #[test]
    fn load_malformed_url_shows_placeholder() {
        let temp = TempDir::new().unwrap();
        logocache(&temp)
            .args(["load", "not a url"])
            .assert()
            .success()
            .stdout(predicate::str::contains("placeholder"))
            .stdout(predicate::str::contains("Invalid image URL"));
    }

    #[test]
    fn load_json_reports_invalid_url() {
        let temp = TempDir::new().unwrap();
        logocache(&temp)
            .args(["load", "--format", "json", "team42.png"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"error_kind\": \"invalid_url\""))
            .stdout(predicate::str::contains("\"showing\": \"placeholder\""));
    }

    #[test]
    fn load_unreachable_host_reports_fetch_failure() {
        let temp = TempDir::new().unwrap();
        let url = format!("http://127.0.0.1:{}/logos/team42.png", closed_port());
        logocache(&temp)
            .args(["load", "--format", "json", &url])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"error_kind\": \"fetch_failed\""));
    }

    #[test]
    fn load_repeat_runs_each_round() {
        let temp = TempDir::new().unwrap();
        logocache(&temp)
            .args(["load", "--format", "json", "--repeat", "2", "not a url"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"round\": 2"))
            .stdout(predicate::str::contains("\"invalid_urls\": 2"));
    }

    #[test]
    fn load_fetches_then_hits_cache() {
        let temp = TempDir::new().unwrap();
        let url = format!("{}/logos/team42.png", serve_png_once(crest_png(24, 18)));

        let output = logocache(&temp)
            .args(["load", "--format", "json", "--repeat", "2", &url])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let report: serde_json::Value = serde_json::from_slice(&output).unwrap();

        let first = &report["rounds"][0]["slots"][0];
        assert_eq!(first["outcome"], "fetched");
        assert_eq!(first["showing"], "image");
        assert_eq!(first["width"], 24);
        assert_eq!(first["height"], 18);

        let second = &report["rounds"][1]["slots"][0];
        assert_eq!(second["outcome"], "cache-hit");
        assert_eq!(second["showing"], "image");

        assert_eq!(report["loader"]["fetches"], 1);
        assert_eq!(report["loader"]["cache_hits"], 1);
        assert_eq!(report["cache"]["entries"], 1);
    }
}
