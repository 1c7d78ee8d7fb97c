//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pipeline_config_server::config::ServerConfig;
use pipeline_config_server::lifecycle::{self, Shutdown, Started};
use pipeline_config_server::mirror::{Mirror, SyncError};
use pipeline_config_server::store::ConfigStore;
use tempfile::TempDir;

/// Stand-in for git: `sync` copies the published upstream files into the
/// mirror root. Files from earlier publications are left in place, like a
/// pull that only adds.
pub struct FixtureMirror {
    root: PathBuf,
    upstream: Mutex<BTreeMap<String, String>>,
    delay: Duration,
    fail: AtomicBool,
    syncs: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FixtureMirror {
    pub fn new(root: &Path) -> Arc<Self> {
        Self::with_delay(root, Duration::ZERO)
    }

    /// Every sync sleeps for `delay` before writing.
    pub fn with_delay(root: &Path, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            root: root.to_path_buf(),
            upstream: Mutex::new(BTreeMap::new()),
            delay,
            fail: AtomicBool::new(false),
            syncs: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    /// Replace the upstream contents picked up by the next sync.
    pub fn publish(&self, files: &[(&str, &str)]) {
        let mut upstream = self.upstream.lock().unwrap();
        upstream.clear();
        for (name, content) in files {
            upstream.insert(name.to_string(), content.to_string());
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn syncs(&self) -> usize {
        self.syncs.load(Ordering::SeqCst)
    }

    /// Highest number of syncs observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn write_upstream(&self) -> io::Result<()> {
        let upstream = self.upstream.lock().unwrap().clone();
        for (name, content) in upstream {
            let path = self.root.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }
        Ok(())
    }
}

impl Mirror for FixtureMirror {
    fn root(&self) -> &Path {
        &self.root
    }

    fn sync(&self) -> Result<(), SyncError> {
        self.syncs.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        std::thread::sleep(self.delay);

        let result = if self.fail.load(Ordering::SeqCst) {
            Err(SyncError::Spawn {
                operation: "pull",
                source: io::Error::new(io::ErrorKind::Other, "upstream unreachable"),
            })
        } else {
            self.write_upstream().map_err(|source| SyncError::Prepare {
                path: self.root.clone(),
                source,
            })
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// A server running on an ephemeral port; shut down on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<ConfigStore>,
    pub mirror: Arc<FixtureMirror>,
    shutdown: Shutdown,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server whose upstream initially holds `files`.
pub async fn start_server(files: &[(&str, &str)], secret: Option<&str>) -> TestServer {
    start_server_with(files, |config| {
        config.webhook.secret = secret.map(str::to_string);
    })
    .await
}

/// Like `start_server`, with a hook to adjust the configuration.
pub async fn start_server_with<F>(files: &[(&str, &str)], configure: F) -> TestServer
where
    F: FnOnce(&mut ServerConfig),
{
    let dir = tempfile::tempdir().unwrap();
    let mirror = FixtureMirror::new(&dir.path().join("mirror"));
    mirror.publish(files);

    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.repository.data_folder = dir.path().join("mirror");
    configure(&mut config);

    let Started {
        server,
        listener,
        store,
    } = lifecycle::start(&config, mirror.clone()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        store,
        mirror,
        shutdown,
        _dir: dir,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Body the CI server sends for a configuration lookup.
pub fn lookup_body(repo_url: &str) -> serde_json::Value {
    serde_json::json!({
        "build": { "after": "3d21ec53a331a6f037a91c368710b99387d012c1" },
        "repo": { "git_http_url": repo_url, "slug": "octocat/hello-world" }
    })
}
