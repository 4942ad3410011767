use std::sync::Arc;

use crate::{ProcessOutput, ProcessRunner, RuntimeError};

/// Parameters for `run -d`. The argument order is part of the runtime contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub host_port: u16,
    pub container_port: u16,
    pub env: Vec<(String, String)>,
    pub privileged: bool,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            host_port: 0,
            container_port: 0,
            env: Vec::new(),
            privileged: false,
        }
    }

    pub fn publish(mut self, host_port: u16, container_port: u16) -> Self {
        self.host_port = host_port;
        self.container_port = container_port;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    pub fn run_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ];
        if self.host_port != 0 {
            args.push("-p".to_string());
            args.push(format!("{}:{}", self.host_port, self.container_port));
        }
        for (k, v) in &self.env {
            args.push("-e".to_string());
            args.push(format!("{k}={v}"));
        }
        if self.privileged {
            args.push("--privileged".to_string());
        }
        args.push(self.image.clone());
        args
    }
}

/// Runtime CLI facade. Cheap to clone; all clones share one runner.
#[derive(Clone)]
pub struct ContainerRuntime {
    binary: String,
    runner: Arc<dyn ProcessRunner>,
}

impl std::fmt::Debug for ContainerRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerRuntime")
            .field("binary", &self.binary)
            .finish_non_exhaustive()
    }
}

impl ContainerRuntime {
    pub fn new(binary: impl Into<String>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            binary: binary.into(),
            runner,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    async fn exec(&self, args: Vec<String>) -> Result<ProcessOutput, RuntimeError> {
        let out = self
            .runner
            .run(&self.binary, &args)
            .await
            .map_err(|source| RuntimeError::Spawn {
                program: self.binary.clone(),
                source,
            })?;
        if !out.success() {
            return Err(RuntimeError::from_output(&out));
        }
        Ok(out)
    }

    /// Raw `--version` text, untrimmed.
    pub async fn version(&self) -> Result<String, RuntimeError> {
        let out = self.exec(vec!["--version".to_string()]).await?;
        Ok(out.stdout)
    }

    pub async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        self.exec(vec!["stop".to_string(), name.to_string()])
            .await
            .map(|_| ())
    }

    pub async fn remove(&self, name: &str) -> Result<(), RuntimeError> {
        self.exec(vec!["rm".to_string(), name.to_string()])
            .await
            .map(|_| ())
    }

    /// `stop` then `rm`, both best-effort. The container usually does not exist.
    pub async fn discard(&self, name: &str) {
        if let Err(err) = self.stop(name).await {
            tracing::debug!(%err, container = name, "ignoring stop failure");
        }
        if let Err(err) = self.remove(name).await {
            tracing::debug!(%err, container = name, "ignoring rm failure");
        }
    }

    /// Starts the container detached and returns the runtime's stdout
    /// (normally the new container id followed by a newline).
    pub async fn run_detached(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        let out = self.exec(spec.run_args()).await?;
        Ok(out.stdout)
    }
}
