use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use anyhow::Context;
use droidhost_runtime::ContainerSpec;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DISPLAY_PORT: u16 = 6080;

/// Startup configuration, read once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: IpAddr,
    pub port: u16,
    pub runtime_bin: String,
    pub container_name: String,
    pub image: String,
    pub device: String,
    /// Published on the same port on both host and container side.
    pub display_port: u16,
    pub public_dir: PathBuf,
    pub emulator_info: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            runtime_bin: "docker".to_string(),
            container_name: "android-web".to_string(),
            image: "budtmo/docker-android:emulator_11.0".to_string(),
            device: "Samsung Galaxy S10".to_string(),
            display_port: DEFAULT_DISPLAY_PORT,
            public_dir: PathBuf::from("./public"),
            emulator_info: "Android 11 (Docker)".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| {
            get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let port_var = |name: &str, default: u16| -> anyhow::Result<u16> {
            match var(name) {
                Some(v) => v
                    .parse::<u16>()
                    .with_context(|| format!("{name} must be a port number, got {v:?}")),
                None => Ok(default),
            }
        };

        let mut cfg = Config::default();
        cfg.port = port_var("PORT", DEFAULT_PORT)?;
        cfg.display_port = port_var("DROIDHOST_DISPLAY_PORT", DEFAULT_DISPLAY_PORT)?;
        if cfg.display_port == 0 {
            anyhow::bail!("DROIDHOST_DISPLAY_PORT must not be 0");
        }
        if let Some(v) = var("DROIDHOST_BIND") {
            cfg.bind = v
                .parse()
                .with_context(|| format!("DROIDHOST_BIND must be an IP address, got {v:?}"))?;
        }
        if let Some(v) = var("DROIDHOST_RUNTIME_BIN") {
            cfg.runtime_bin = v;
        }
        if let Some(v) = var("DROIDHOST_CONTAINER_NAME") {
            cfg.container_name = v;
        }
        if let Some(v) = var("DROIDHOST_IMAGE") {
            cfg.image = v;
        }
        if let Some(v) = var("DROIDHOST_DEVICE") {
            cfg.device = v;
        }
        if let Some(v) = var("DROIDHOST_PUBLIC_DIR") {
            cfg.public_dir = PathBuf::from(v);
        }
        if let Some(v) = var("DROIDHOST_EMULATOR_INFO") {
            cfg.emulator_info = v;
        }
        Ok(cfg)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn display_url(&self) -> String {
        format!("http://localhost:{}", self.display_port)
    }

    pub fn container_spec(&self) -> ContainerSpec {
        ContainerSpec::new(&self.container_name, &self.image)
            .publish(self.display_port, self.display_port)
            .env("EMULATOR_DEVICE", &self.device)
            .env("WEB_VNC", "true")
            .privileged(true)
    }
}
