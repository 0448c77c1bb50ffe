//! Archive extraction module
//!
//! Handles tar.gz, tar.xz, tar.zst, plain tar and zip archives.

use std::path::Path;

use async_compression::tokio::bufread::{GzipDecoder, XzDecoder, ZstdDecoder};
use tokio::io::{AsyncRead, BufReader};
use tokio_tar::Archive;

use super::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarXz,
    TarZst,
    Tar,
    Zip,
}

impl ArchiveFormat {
    /// Detect archive format from a file name.
    pub fn detect(name: &str) -> Option<Self> {
        let name = name.to_lowercase();

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(Self::TarXz)
        } else if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
            Some(Self::TarZst)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Unpack `archive` into `dest`, replacing files that already exist.
///
/// # Errors
///
/// Returns [`FetchError::Io`] for filesystem or decompression failures and
/// [`FetchError::Archive`] for a malformed zip.
pub async fn unpack(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<(), FetchError> {
    tokio::fs::create_dir_all(dest).await?;

    match format {
        ArchiveFormat::Zip => unpack_zip(archive, dest).await,
        ArchiveFormat::TarGz => {
            let reader = open(archive).await?;
            unpack_tar(GzipDecoder::new(reader), dest).await
        }
        ArchiveFormat::TarXz => {
            let reader = open(archive).await?;
            unpack_tar(XzDecoder::new(reader), dest).await
        }
        ArchiveFormat::TarZst => {
            let reader = open(archive).await?;
            unpack_tar(ZstdDecoder::new(reader), dest).await
        }
        ArchiveFormat::Tar => {
            let reader = open(archive).await?;
            unpack_tar(reader, dest).await
        }
    }
}

async fn open(archive: &Path) -> std::io::Result<BufReader<tokio::fs::File>> {
    Ok(BufReader::new(tokio::fs::File::open(archive).await?))
}

async fn unpack_tar<R>(reader: R, dest: &Path) -> Result<(), FetchError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut archive = Archive::new(reader);
    archive.unpack(dest).await?;
    Ok(())
}

async fn unpack_zip(archive: &Path, dest: &Path) -> Result<(), FetchError> {
    let archive_path = archive.to_path_buf();
    let extract_path = dest.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&archive_path)?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| FetchError::Archive(e.to_string()))?;
        archive
            .extract(&extract_path)
            .map_err(|e| FetchError::Archive(e.to_string()))?;
        Ok::<(), FetchError>(())
    })
    .await
    .map_err(std::io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn detects_release_formats() {
        assert_eq!(
            ArchiveFormat::detect("shellcheck-v0.7.1.linux.x86_64.tar.xz"),
            Some(ArchiveFormat::TarXz)
        );
        assert_eq!(ArchiveFormat::detect("shellcheck-v0.7.1.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::detect("a.TGZ"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect("a.tar.zst"), Some(ArchiveFormat::TarZst));
        assert_eq!(ArchiveFormat::detect("shellcheck"), None);
        assert_eq!(ArchiveFormat::detect("a.rar"), None);
    }

    #[tokio::test]
    async fn unpacks_tar_gz_over_existing_files() {
        let tmp = TempDir::new().unwrap();
        let archive_path = tmp.path().join("a.tar.gz");

        let encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let body = b"#!/bin/sh\necho new\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, "pkg/shellcheck", &body[..])
            .unwrap();
        let bytes = builder.into_inner().unwrap().finish().unwrap();
        std::fs::write(&archive_path, bytes).unwrap();

        let dest = tmp.path().join("out");
        std::fs::create_dir_all(dest.join("pkg")).unwrap();
        std::fs::write(dest.join("pkg/shellcheck"), b"old").unwrap();

        unpack(&archive_path, ArchiveFormat::TarGz, &dest).await.unwrap();
        let content = std::fs::read(dest.join("pkg/shellcheck")).unwrap();
        assert_eq!(content, body);
    }

    async fn tar_xz(path: &str, body: &[u8]) -> Vec<u8> {
        use async_compression::tokio::write::XzEncoder;
        use tokio::io::AsyncWriteExt;

        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, body).unwrap();
        let tarball = builder.into_inner().unwrap();

        let mut encoder = XzEncoder::new(Vec::new());
        encoder.write_all(&tarball).await.unwrap();
        encoder.shutdown().await.unwrap();
        encoder.into_inner()
    }

    #[tokio::test]
    async fn unpacks_tar_xz_and_overwrites_on_repeat() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");
        let binary = dest.join("shellcheck-v0.7.1/shellcheck");

        let first = tmp.path().join("first.tar.xz");
        std::fs::write(&first, tar_xz("shellcheck-v0.7.1/shellcheck", b"v1").await).unwrap();
        unpack(&first, ArchiveFormat::TarXz, &dest).await.unwrap();
        assert_eq!(std::fs::read(&binary).unwrap(), b"v1");

        let second = tmp.path().join("second.tar.xz");
        std::fs::write(&second, tar_xz("shellcheck-v0.7.1/shellcheck", b"v2").await).unwrap();
        unpack(&second, ArchiveFormat::TarXz, &dest).await.unwrap();
        assert_eq!(std::fs::read(&binary).unwrap(), b"v2");
    }

    #[tokio::test]
    async fn zip_overwrites_on_repeat() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("shellcheck-v0.7.1.exe"), b"MZ-stale").unwrap();

        let archive_path = tmp.path().join("a.zip");
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("shellcheck-v0.7.1.exe", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"MZ-new").unwrap();
        std::fs::write(&archive_path, writer.finish().unwrap().into_inner()).unwrap();

        unpack(&archive_path, ArchiveFormat::Zip, &dest).await.unwrap();
        assert_eq!(std::fs::read(dest.join("shellcheck-v0.7.1.exe")).unwrap(), b"MZ-new");
    }

    #[tokio::test]
    async fn unpacks_zip() {
        let tmp = TempDir::new().unwrap();
        let archive_path = tmp.path().join("a.zip");

        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("shellcheck.exe", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"MZ").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        std::fs::write(&archive_path, bytes).unwrap();

        let dest = tmp.path().join("out");
        unpack(&archive_path, ArchiveFormat::Zip, &dest).await.unwrap();
        assert_eq!(std::fs::read(dest.join("shellcheck.exe")).unwrap(), b"MZ");
    }

    #[tokio::test]
    async fn corrupt_zip_is_an_archive_error() {
        let tmp = TempDir::new().unwrap();
        let archive_path = tmp.path().join("a.zip");
        std::fs::write(&archive_path, b"not a zip").unwrap();

        let err = unpack(&archive_path, ArchiveFormat::Zip, &tmp.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Archive(_)));
    }
}
