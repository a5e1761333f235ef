use declarative_render::PatchSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, Read, Write};
use std::sync::mpsc::Receiver;

/// Outbound frames carry whole documents, so their cap is generous.
pub const HOST_TO_CLIENT_CAP: usize = 16 * 1_048_576;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "t")]
pub enum HostEnvelope {
    #[serde(rename = "ready")]
    Ready { sid: String, capabilities: Value },

    #[serde(rename = "rendered")]
    Rendered {
        sid: String,
        rev: u64,
        target: String,
        html: String,
        patches: PatchSet,
        created: bool,
    },

    #[serde(rename = "command")]
    Command {
        sid: String,
        target: String,
        event: String,
        command: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        element_id: Option<String>,
    },

    #[serde(rename = "error")]
    Error {
        sid: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        rev: Option<u64>,
        code: String,
        message: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderRequest {
    pub sid: String,
    pub rev: u64,
    pub target: String,
    pub view: Value,
    /// `name -> description` map backing the resolver.
    #[serde(default)]
    pub registry: Option<Value>,
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub credentials: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "t")]
pub enum ClientEnvelope {
    #[serde(rename = "render")]
    Render(RenderRequest),

    #[serde(rename = "event")]
    Event {
        sid: String,
        target: String,
        event: String,
        #[serde(default)]
        path: Vec<usize>,
    },

    #[serde(rename = "dispose")]
    Dispose { sid: String, target: String },
}

impl ClientEnvelope {
    pub fn sid(&self) -> &str {
        match self {
            Self::Render(request) => &request.sid,
            Self::Event { sid, .. } | Self::Dispose { sid, .. } => sid,
        }
    }
}

pub fn ready_envelope(sid: String) -> HostEnvelope {
    HostEnvelope::Ready {
        sid,
        capabilities: serde_json::json!({
            "transport": "stdio-packet-4",
            "patches": true,
            "events": declarative_render::reconcile::DEFAULT_EVENTS,
        }),
    }
}

pub fn error_envelope(
    sid: String,
    rev: Option<u64>,
    code: impl Into<String>,
    message: impl Into<String>,
) -> HostEnvelope {
    HostEnvelope::Error {
        sid,
        rev,
        code: code.into(),
        message: message.into(),
    }
}

pub fn writer_loop(rx: Receiver<HostEnvelope>) -> io::Result<()> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    for envelope in rx {
        let payload = encode_host_envelope(&envelope)?;
        write_frame(&mut writer, &payload, HOST_TO_CLIENT_CAP)?;
        writer.flush()?;
    }

    Ok(())
}

/// Reads frames from stdin until EOF. Frames that do not decode are handed
/// to `on_envelope` as errors; transport failures end the loop.
pub fn reader_loop<F>(max_payload: usize, mut on_envelope: F) -> io::Result<()>
where
    F: FnMut(Result<ClientEnvelope, serde_json::Error>),
{
    let stdin = io::stdin();
    let mut reader = stdin.lock();

    loop {
        match read_frame(&mut reader, max_payload) {
            Ok(payload) => on_envelope(decode_client_envelope(&payload)),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(err) => return Err(err),
        }
    }
}

fn encode_host_envelope(envelope: &HostEnvelope) -> io::Result<Vec<u8>> {
    serde_json::to_vec(envelope).map_err(json_error)
}

fn decode_client_envelope(payload: &[u8]) -> Result<ClientEnvelope, serde_json::Error> {
    serde_json::from_slice(payload)
}

fn read_frame(reader: &mut impl Read, max_payload: usize) -> io::Result<Vec<u8>> {
    let mut len_buf = [0_u8; 4];
    reader.read_exact(&mut len_buf)?;

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_payload {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {len} > {max_payload}"),
        ));
    }

    let mut payload = vec![0_u8; len];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

fn write_frame(writer: &mut impl Write, payload: &[u8], max_payload: usize) -> io::Result<()> {
    if payload.len() > max_payload {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {} > {}", payload.len(), max_payload),
        ));
    }

    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "payload exceeds u32"))?;

    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    Ok(())
}

fn json_error(err: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}
