use std::io;
use std::net::TcpStream;
use std::path::{Path, PathBuf};

use ssh2::{Session, Sftp};
use tracing::{info, instrument};

use crate::config::SftpConfig;
use crate::error::AppError;

/// One connect-operate-disconnect cycle against the remote endpoint.
///
/// The session lives exactly as long as this value: dropping it tears the
/// connection down on every exit path, so an error mid-transfer can never
/// leak an open session. There is no pooling and no retry.
pub struct TransferSession {
    session: Session,
    sftp: Sftp,
}

impl TransferSession {
    #[instrument(skip(config), fields(host = %config.host, port = config.port))]
    pub fn connect(config: &SftpConfig) -> Result<Self, AppError> {
        info!("Opening SFTP session");
        let stream = TcpStream::connect((config.host.as_str(), config.port)).map_err(|err| {
            AppError::Transfer(format!(
                "Failed to connect to {}:{}: {}",
                config.host, config.port, err
            ))
        })?;

        let mut session = Session::new()?;
        session.set_tcp_stream(stream);
        session.handshake()?;
        session.userauth_password(&config.username, &config.password)?;

        let sftp = session.sftp()?;

        Ok(Self { session, sftp })
    }

    /// Pushes one local file to the remote root under the given name.
    pub fn upload(&self, local: &Path, remote_name: &str) -> Result<(), AppError> {
        let remote_path = format!("/{}", remote_name);
        let mut local_file = std::fs::File::open(local).map_err(|err| {
            AppError::Transfer(format!("Failed to open {}: {}", local.display(), err))
        })?;

        let mut remote_file = self.sftp.create(Path::new(&remote_path))?;
        io::copy(&mut local_file, &mut remote_file)
            .map_err(|err| AppError::Transfer(format!("Failed to upload {}: {}", remote_path, err)))?;

        Ok(())
    }

    /// Names of the CSV files in the remote root directory.
    pub fn list_remote_csvs(&self) -> Result<Vec<String>, AppError> {
        let entries = self.sftp.readdir(Path::new("/"))?;

        Ok(entries
            .into_iter()
            .filter_map(|(path, _)| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .filter(|name| name.ends_with(".csv"))
            .collect())
    }

    /// Fetches one remote file into `local`, overwriting any previous copy.
    pub fn download(&self, remote_name: &str, local: &Path) -> Result<(), AppError> {
        let remote_path = format!("/{}", remote_name);
        let mut remote_file = self.sftp.open(Path::new(&remote_path))?;

        let mut local_file = std::fs::File::create(local).map_err(|err| {
            AppError::Transfer(format!("Failed to create {}: {}", local.display(), err))
        })?;
        io::copy(&mut remote_file, &mut local_file).map_err(|err| {
            AppError::Transfer(format!("Failed to download {}: {}", remote_path, err))
        })?;

        Ok(())
    }

    /// Orderly shutdown. Drop covers the error paths.
    pub fn disconnect(self) -> Result<(), AppError> {
        self.session
            .disconnect(None, "session complete", None)
            .map_err(AppError::from)
    }
}

/// Connectivity probe: connect, authenticate, disconnect.
pub fn check(config: &SftpConfig) -> Result<(), AppError> {
    let session = TransferSession::connect(config)?;
    session.disconnect()
}

/// Uploads each exported file to `/<logical-name>.csv` and returns the
/// logical names pushed.
#[instrument(skip(config, files))]
pub fn upload_files(
    config: &SftpConfig,
    files: &[(String, PathBuf)],
) -> Result<Vec<String>, AppError> {
    let session = TransferSession::connect(config)?;

    let mut uploaded = Vec::with_capacity(files.len());
    for (name, local) in files {
        session.upload(local, &format!("{}.csv", name))?;
        uploaded.push(name.clone());
    }

    session.disconnect()?;
    info!(count = uploaded.len(), "Uploaded CSV files");
    Ok(uploaded)
}

/// Downloads every remote CSV into `csv_dir` under a `downloaded_` prefix,
/// overwriting previous downloads, and returns the remote names fetched.
/// File contents are not inspected.
#[instrument(skip(config, csv_dir))]
pub fn download_files(config: &SftpConfig, csv_dir: &Path) -> Result<Vec<String>, AppError> {
    std::fs::create_dir_all(csv_dir).map_err(|err| {
        AppError::Transfer(format!("Failed to create {}: {}", csv_dir.display(), err))
    })?;

    let session = TransferSession::connect(config)?;

    let names = session.list_remote_csvs()?;
    for name in &names {
        let local = csv_dir.join(downloaded_name(name));
        session.download(name, &local)?;
    }

    session.disconnect()?;
    info!(count = names.len(), "Downloaded CSV files");
    Ok(names)
}

pub fn downloaded_name(remote_name: &str) -> String {
    format!("downloaded_{}", remote_name)
}
