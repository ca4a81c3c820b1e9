use folder_guard::configuration::get_configuration;
use folder_guard::startup::Application;
use folder_guard::telemetry::get_subscriber;
use folder_guard::telemetry::init_subscriber;
use once_cell::sync::Lazy;
use secrecy::Secret;

/// Init a static subscriber once per test binary.
///
/// To opt in to verbose logging, use the env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the intuitive solution of assigning 2 different "closure types" to the
    // same var is not allowed by the compiler, hence the match arms
    match std::env::var("TEST_LOG") {
        Ok(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::stdout);
            init_subscriber(subscriber);
        }
        Err(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::sink);
            init_subscriber(subscriber);
        }
    };
});

pub struct TestApp {
    pub addr: String,
}

impl TestApp {
    /// `GET {path}` with no Authorization header
    pub async fn get(
        &self,
        path: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}{}", self.addr, path))
            .send()
            .await
            .expect("execute request")
    }

    /// `GET {path}` with `Authorization: Basic base64(username:password)`
    pub async fn get_with_credentials(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}{}", self.addr, path))
            .basic_auth(username, Some(password))
            .send()
            .await
            .expect("execute request")
    }

    /// `GET {path}` with an Authorization header built from raw bytes, which
    /// need not be valid UTF-8
    pub async fn get_with_authorization_bytes(
        &self,
        path: &str,
        header_value: &[u8],
    ) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}{}", self.addr, path))
            .header(
                "Authorization",
                reqwest::header::HeaderValue::from_bytes(header_value)
                    .expect("bytes must be header-legal"),
            )
            .send()
            .await
            .expect("execute request")
    }

    /// `GET {path}` with a raw (possibly malformed) Authorization header value
    pub async fn get_with_raw_authorization(
        &self,
        path: &str,
        header_value: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}{}", self.addr, path))
            .header("Authorization", header_value)
            .send()
            .await
            .expect("execute request")
    }
}

/// Spawn the app with the given folder -> password protection map, on a
/// randomised port.
///
/// Returns the address to which the server was bound, in the form
/// `http://localhost:{port}` -- the `http://` prefix is important, as this is
/// the address that clients will send requests to.
pub async fn spawn_app(folders: &[(&str, &str)]) -> TestApp {
    // init the tracing subscriber once only
    Lazy::force(&TRACING);

    let cfg = {
        let mut cfg = get_configuration().unwrap();

        // port 0 is reserved by the OS; the server will be spawned on an
        // address with a random available port
        cfg.application.port = 0;

        // each test supplies its own protection snapshot
        cfg.protection.folders = folders
            .iter()
            .map(|(name, password)| (name.to_string(), Secret::new(password.to_string())))
            .collect();

        cfg
    };

    let app = Application::build(cfg).await.unwrap();
    let addr = format!("http://localhost:{}", app.get_port());
    tokio::spawn(app.run_until_stopped());

    TestApp { addr }
}
