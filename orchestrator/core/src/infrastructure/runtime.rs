// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::runtime::{
    ExecutionBackend, ExecutionEnvironment, ExecutionOutput, MountedFile, RuntimeError,
};
use async_trait::async_trait;
use bollard::container::LogOutput;
use bollard::models::{ContainerCreateBody, HostConfig};
use bollard::query_parameters::{
    CreateContainerOptionsBuilder, CreateImageOptionsBuilder, LogsOptionsBuilder,
    RemoveContainerOptionsBuilder, StartContainerOptions, UploadToContainerOptionsBuilder,
    WaitContainerOptions,
};
use bollard::Docker;
use futures::future::BoxFuture;
use futures::StreamExt;
use std::future::Future;
use tracing::{debug, info, warn};

/// Runs each cosign command in a fresh, auto-removed Docker container.
pub struct DockerRuntime {
    docker: Docker,
    network_mode: Option<String>,
    autopull: bool,
}

impl DockerRuntime {
    pub fn new(
        socket_path: Option<String>,
        network_mode: Option<String>,
        autopull: bool,
    ) -> Result<Self, RuntimeError> {
        // Connect to Docker daemon (custom socket or auto-detect)
        let docker = if let Some(path) = socket_path {
            #[cfg(unix)]
            let result = Docker::connect_with_unix(&path, 120, bollard::API_DEFAULT_VERSION);

            #[cfg(windows)]
            let result = Docker::connect_with_named_pipe(&path, 120, bollard::API_DEFAULT_VERSION);

            result.map_err(|e| {
                RuntimeError::ConnectionFailed(format!(
                    "Failed to connect to Docker at {}: {}\n\n\
                     Ensure Docker is running and the socket path is correct.",
                    path, e
                ))
            })?
        } else {
            Docker::connect_with_local_defaults().map_err(|e| {
                RuntimeError::ConnectionFailed(format!(
                    "Failed to connect to Docker: {}\n\n\
                     Common causes:\n\
                     - Docker daemon not running (check: docker ps)\n\
                     - Permission denied accessing Docker socket\n\
                     - DOCKER_HOST points at an unreachable daemon",
                    e
                ))
            })?
        };

        Ok(Self {
            docker,
            network_mode,
            autopull,
        })
    }

    /// Verify Docker daemon is accessible
    pub async fn healthcheck(&self) -> Result<(), RuntimeError> {
        self.docker.ping().await.map_err(|e| {
            RuntimeError::ConnectionFailed(format!(
                "Cannot connect to Docker daemon: {}\n\nVerify with: docker ps",
                e
            ))
        })?;
        Ok(())
    }

    async fn ensure_image(&self, image: &str) -> Result<(), RuntimeError> {
        if self.docker.inspect_image(image).await.is_ok() {
            debug!("Image {} present locally", image);
            return Ok(());
        }

        if !self.autopull {
            return Err(RuntimeError::ImagePullFailed(format!(
                "Image {} not found locally and autopull is disabled",
                image
            )));
        }

        info!("Pulling image: {}", image);
        let options = CreateImageOptionsBuilder::default().from_image(image).build();
        let mut stream = self.docker.create_image(Some(options), None, None);
        while let Some(result) = stream.next().await {
            if let Err(e) = result {
                return Err(RuntimeError::ImagePullFailed(format!(
                    "Failed to pull image {}: {}\n\n\
                     Common causes:\n\
                     - No connectivity to the registry\n\
                     - Image name is incorrect or doesn't exist\n\
                     - Registry authentication required\n\n\
                     Try manually: docker pull {}",
                    image, e, image
                )));
            }
        }
        info!("Successfully pulled image: {}", image);
        Ok(())
    }

    async fn create(&self, env: &ExecutionEnvironment) -> Result<String, RuntimeError> {
        let name = format!("cosign-{}", uuid::Uuid::new_v4());
        let options = CreateContainerOptionsBuilder::default().name(&name).build();

        let config = ContainerCreateBody {
            image: Some(env.image.clone()),
            user: Some(env.user.clone()),
            tty: Some(false),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            env: Some(env.env_pairs()),
            cmd: Some(env.cmd.clone()),
            host_config: Some(HostConfig {
                network_mode: self.network_mode.clone(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let res = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| RuntimeError::SpawnFailed(e.to_string()))?;
        debug!("Created container {} ({})", name, res.id);
        Ok(res.id)
    }

    async fn upload_files(
        &self,
        id: &str,
        env: &ExecutionEnvironment,
    ) -> Result<(), RuntimeError> {
        let files = &env.files;
        if files.is_empty() {
            return Ok(());
        }

        let mut contents = Vec::with_capacity(files.len());
        for file in files {
            let data = tokio::fs::read(&file.source).await.map_err(|e| {
                RuntimeError::SpawnFailed(format!("Failed to read {:?}: {}", file.source, e))
            })?;
            contents.push(data);
        }

        let dirs = env.missing_directories();
        let mtime = chrono::Utc::now().timestamp().max(0) as u64;
        let archive = build_archive(&env.user, &dirs, files, &contents, mtime)?;
        // copyUIDGID makes the daemon chown every entry to the container user
        let options = UploadToContainerOptionsBuilder::default()
            .path("/")
            .copy_uidgid("1")
            .build();
        self.docker
            .upload_to_container(id, Some(options), bollard::body_full(archive.into()))
            .await
            .map_err(|e| RuntimeError::SpawnFailed(format!("Failed to mount files: {}", e)))?;

        for file in files {
            debug!("Mounted {:?} at {}", file.source, file.target);
        }
        Ok(())
    }

    async fn run(
        &self,
        id: &str,
        env: &ExecutionEnvironment,
    ) -> Result<ExecutionOutput, RuntimeError> {
        self.upload_files(id, env).await?;

        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await
            .map_err(|e| RuntimeError::SpawnFailed(format!("Failed to start container: {}", e)))?;

        let mut exit_code = 0;
        let mut wait = self.docker.wait_container(id, None::<WaitContainerOptions>);
        while let Some(result) = wait.next().await {
            match result {
                Ok(response) => exit_code = response.status_code,
                Err(bollard::errors::Error::DockerContainerWaitError { code, .. }) => {
                    exit_code = code
                }
                Err(e) => {
                    return Err(RuntimeError::SpawnFailed(format!(
                        "Failed waiting for container: {}",
                        e
                    )))
                }
            }
        }

        let mut stdout = String::new();
        let mut stderr = String::new();
        let options = LogsOptionsBuilder::default().stdout(true).stderr(true).build();
        let mut logs = self.docker.logs(id, Some(options));
        while let Some(msg) = logs.next().await {
            match msg {
                Ok(LogOutput::StdOut { message }) => {
                    stdout.push_str(&String::from_utf8_lossy(&message))
                }
                Ok(LogOutput::StdErr { message }) => {
                    stderr.push_str(&String::from_utf8_lossy(&message))
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to read container logs: {}", e),
            }
        }

        if exit_code != 0 {
            return Err(RuntimeError::ExecutionFailed {
                exit_code,
                stderr: if stderr.is_empty() { stdout } else { stderr },
            });
        }

        Ok(ExecutionOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}

#[async_trait]
impl ExecutionBackend for DockerRuntime {
    async fn execute(&self, env: ExecutionEnvironment) -> Result<ExecutionOutput, RuntimeError> {
        self.ensure_image(&env.image).await?;

        let id = self.create(&env).await?;
        // Removal also runs if this future is dropped mid-flight
        let removal = CleanupGuard::new(remove_container(self.docker.clone(), id.clone()));
        let result = self.run(&id, &env).await;
        removal.run().await;

        result
    }
}

async fn remove_container(docker: Docker, id: String) {
    let options = RemoveContainerOptionsBuilder::default().force(true).build();
    if let Err(e) = docker.remove_container(&id, Some(options)).await {
        warn!("Failed to remove container {}: {}", id, e);
    } else {
        debug!("Removed container {}", id);
    }
}

/// Async cleanup that runs exactly once: awaited through [`CleanupGuard::run`],
/// or spawned onto the current runtime when the guard is dropped.
struct CleanupGuard {
    cleanup: Option<BoxFuture<'static, ()>>,
}

impl CleanupGuard {
    fn new(cleanup: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            cleanup: Some(Box::pin(cleanup)),
        }
    }

    async fn run(mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup.await;
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let Some(cleanup) = self.cleanup.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(cleanup);
            }
            Err(_) => warn!("No async runtime left to remove the cosign container"),
        }
    }
}

/// Pack mounted files into a tar stream rooted at `/`.
///
/// Numeric ids are zero; the upload asks the daemon to map every entry to
/// the container user. Missing directories come first so they are not
/// created implicitly as root.
fn build_archive(
    owner: &str,
    dirs: &[String],
    files: &[MountedFile],
    contents: &[Vec<u8>],
    mtime: u64,
) -> Result<Vec<u8>, RuntimeError> {
    let pack_err =
        |e: std::io::Error| RuntimeError::SpawnFailed(format!("Failed to pack files: {}", e));

    let mut builder = tar::Builder::new(Vec::new());
    for dir in dirs {
        let mut header = owned_header(owner, mtime).map_err(pack_err)?;
        header.set_entry_type(tar::EntryType::Directory);
        header.set_mode(0o755);
        header.set_size(0);
        builder
            .append_data(&mut header, dir.trim_start_matches('/'), std::io::empty())
            .map_err(pack_err)?;
    }
    for (file, data) in files.iter().zip(contents) {
        let mut header = owned_header(&file.owner, mtime).map_err(pack_err)?;
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(data.len() as u64);
        builder
            .append_data(&mut header, file.target.trim_start_matches('/'), data.as_slice())
            .map_err(pack_err)?;
    }
    builder.into_inner().map_err(pack_err)
}

fn owned_header(owner: &str, mtime: u64) -> std::io::Result<tar::Header> {
    let mut header = tar::Header::new_gnu();
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(mtime);
    header.set_username(owner)?;
    header.set_groupname(owner)?;
    Ok(header)
}
