use crate::config::ServerConfig;
use crate::error::ServerError;
use actix_files::NamedFile;
use actix_multipart::{Field, Multipart};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::TryStreamExt;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::io::AsyncWriteExt;

const MAX_TEXT_FIELD: usize = 64 * 1024;

#[derive(Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub p: String,
}

fn peer(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Sends the requested file as an attachment.
pub async fn get_file(
    req: HttpRequest,
    config: web::Data<ServerConfig>,
    query: web::Query<PathQuery>,
) -> Result<HttpResponse, ServerError> {
    let path = config.root.resolve([query.p.as_str()])?;

    let meta = match tokio::fs::metadata(&path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::NotFound(path));
        }
        Err(e) => return Err(e.into()),
    };
    if !meta.is_file() {
        return Err(ServerError::NotAFile(path));
    }

    tracing::info!("Download {:?} from {}", path, peer(&req));

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = NamedFile::open_async(&path)
        .await?
        .set_content_type(mime_guess::mime::APPLICATION_OCTET_STREAM)
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        });

    Ok(file.into_response(&req))
}

/// Stores every file part of the form in the directory named by the
/// `path` field, which has to come first.
pub async fn upload(
    req: HttpRequest,
    config: web::Data<ServerConfig>,
    mut payload: Multipart,
) -> Result<HttpResponse, ServerError> {
    tracing::info!("Receiving upload from: {}", peer(&req));

    let mut dir_path: Option<String> = None;

    while let Some(mut field) = payload.try_next().await? {
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);

        let Some(file_name) = file_name else {
            let name = field.name().unwrap_or_default().to_owned();
            let value = read_text_field(&mut field).await?;
            if name == "path" {
                dir_path = Some(value);
            }
            continue;
        };

        let dir = dir_path.as_deref().ok_or_else(|| {
            ServerError::InvalidForm("the path field must precede the files".into())
        })?;
        let file_name = client_file_name(&file_name)
            .ok_or_else(|| ServerError::InvalidForm("missing file name".into()))?;

        let dest = config.root.resolve([dir, file_name])?;
        let written = write_field(&mut field, &dest).await.map_err(|e| {
            tracing::error!("Could not store upload {:?}: {}", dest, e);
            e
        })?;

        tracing::info!("Uploaded: {:?} ({} bytes)", dest, written);
    }

    Ok(HttpResponse::Ok().finish())
}

/// Creates `foldername` inside the directory given by `path`.
pub async fn new_folder(
    req: HttpRequest,
    config: web::Data<ServerConfig>,
    payload: Multipart,
) -> Result<HttpResponse, ServerError> {
    tracing::info!("Received request to create a new folder from: {}", peer(&req));

    let form = read_text_fields(payload).await?;
    let current = form.get("path").map(String::as_str).unwrap_or_default();
    let folder = form.get("foldername").map(String::as_str).unwrap_or_default();

    if current.is_empty() || folder.is_empty() {
        return Err(ServerError::InvalidForm("path and foldername are required".into()));
    }

    let dir = config.root.resolve([current, folder])?;
    tokio::fs::create_dir(&dir).await?;
    tracing::info!("Created folder {:?}", dir);

    Ok(HttpResponse::Ok().finish())
}

/// Browsers on Windows may send the full client-side path; keep the last
/// component only. `None` for names that do not denote a file.
fn client_file_name(raw: &str) -> Option<&str> {
    let name = raw.rsplit(['\\', '/']).next().unwrap_or(raw).trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

async fn read_text_field(field: &mut Field) -> Result<String, ServerError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if buf.len() + chunk.len() > MAX_TEXT_FIELD {
            return Err(ServerError::InvalidForm("form field too large".into()));
        }
        buf.extend_from_slice(&chunk);
    }
    String::from_utf8(buf).map_err(|_| ServerError::InvalidForm("form field is not UTF-8".into()))
}

/// Collects the text fields of a form, discarding any file parts.
async fn read_text_fields(mut payload: Multipart) -> Result<HashMap<String, String>, ServerError> {
    let mut fields = HashMap::new();
    while let Some(mut field) = payload.try_next().await? {
        let is_file = field
            .content_disposition()
            .is_some_and(|cd| cd.get_filename().is_some());
        if is_file {
            while field.try_next().await?.is_some() {}
            continue;
        }
        let name = field.name().unwrap_or_default().to_owned();
        let value = read_text_field(&mut field).await?;
        fields.insert(name, value);
    }
    Ok(fields)
}

async fn write_field(field: &mut Field, dest: &Path) -> Result<u64, ServerError> {
    let mut file = tokio::fs::File::create(dest).await?;
    let mut written = 0u64;
    while let Some(chunk) = field.try_next().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
