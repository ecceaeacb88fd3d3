use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use tracing::{debug, info};
use uuid::Uuid;

use crate::args::Request;
use crate::error::{Error, Result};

/// Builds the message described by an already validated request.
pub fn build_message(request: &Request) -> Result<Message> {
    let builder = Message::builder()
        .from(mailbox(&request.from)?)
        .to(mailbox(&request.to)?)
        .subject(request.subject.as_str())
        .date_now()
        .message_id(None);

    if request.attachments.is_empty() {
        return Ok(builder
            .header(ContentType::TEXT_PLAIN)
            .body(request.body.clone())?);
    }

    // Body first, then attachments in the order they were given.
    let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(request.body.clone()));
    for path in &request.attachments {
        multipart = multipart.singlepart(load_attachment(path)?);
    }

    Ok(builder.multipart(multipart)?)
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address.parse().map_err(|source| Error::Address {
        address: address.to_string(),
        source,
    })
}

/// Reads a file into an attachment part named after the file, with the
/// content type guessed from its extension.
pub fn load_attachment(path: &Path) -> Result<SinglePart> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::AttachmentName {
            path: path.to_path_buf(),
        })?;

    let content = fs::read(path).map_err(|source| Error::Attachment {
        path: path.to_path_buf(),
        source,
    })?;

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let content_type =
        ContentType::parse(mime.as_ref()).map_err(|_| Error::ContentType(mime.to_string()))?;

    debug!(
        file = %filename,
        bytes = content.len(),
        content_type = %mime,
        "attaching file"
    );
    Ok(Attachment::new(filename).body(content, content_type))
}

/// Writes the rendered message into `dir` under a fresh `<uuid>.eml` name.
///
/// The bytes go to a hidden temporary file first and are renamed into place
/// only once fully written; on failure the temporary file is removed.
pub fn write_eml(dir: &Path, message: &Message) -> Result<PathBuf> {
    let write_err = |source: std::io::Error| Error::Write {
        dir: dir.to_path_buf(),
        source,
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".emlgen-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    staged.write_all(&message.formatted()).map_err(write_err)?;
    staged.as_file().sync_all().map_err(write_err)?;

    let target = dir.join(format!("{}.eml", Uuid::new_v4()));
    staged
        .persist_noclobber(&target)
        .map_err(|e| write_err(e.error))?;

    info!(path = %target.display(), "eml file written");
    Ok(target)
}

/// Builds the message and drops it into the request's output directory.
pub fn deliver(request: &Request) -> Result<PathBuf> {
    let message = build_message(request)?;
    write_eml(&request.output_dir, &message)
}
