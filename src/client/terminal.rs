use super::http::HttpRelayClient;
use super::{ ChatSession, RelayTransport, SubmitRejected, THINKING_NOTICE };
use crate::cli::ChatArgs;
use crate::models::chat::{ Role, Turn };
use log::{ info, warn };
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, BufReader };
use tokio::sync::mpsc;

const APP_TITLE: &str = "BestyAI";

/// Line reader over raw bytes. A read cut short by `select!` leaves its
/// bytes in `buf`, so the next call picks the line up where it stopped.
struct RawLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> RawLines<R> {
    fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new() }
    }

    async fn next_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let n = self.reader.read_until(b'\n', &mut self.buf).await?;
        if n == 0 && self.buf.is_empty() {
            return Ok(None);
        }
        let mut line = std::mem::take(&mut self.buf);
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

pub fn format_turn(turn: &Turn) -> String {
    let label = match turn.role() {
        Role::User => "you",
        Role::Model => APP_TITLE,
    };
    format!("{}> {}", label, turn.text())
}

pub async fn run_chat(args: &ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("Chatting with relay at {}", args.endpoint);
    let transport: Arc<dyn RelayTransport> = Arc::new(HttpRelayClient::new(args.endpoint.clone()));
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    let session = drive(stdin, &mut stdout, transport).await?;
    info!("Chat closed after {} turns", session.conversation().len());
    Ok(())
}

/// Feeds lines from `input` into a fresh session and prints replies to
/// `out`. The request runs on its own task so input keeps flowing (and is
/// refused) while a reply is pending. Returns once input is exhausted and
/// nothing is in flight.
pub async fn drive<R, W>(
    input: R,
    out: &mut W,
    transport: Arc<dyn RelayTransport>
) -> Result<ChatSession, Box<dyn Error + Send + Sync>>
    where R: AsyncBufRead + Unpin, W: Write
{
    let mut session = ChatSession::new();
    let mut lines = RawLines::new(input);
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
    let mut input_open = true;

    writeln!(out, "{}", APP_TITLE)?;
    writeln!(out, "Type a message and press Enter. Ctrl-D quits.")?;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line? {
                    Some(bytes) => {
                        let Ok(line) = String::from_utf8(bytes) else {
                            warn!("Skipping input line that is not valid UTF-8");
                            writeln!(out, "(input was not valid UTF-8, line skipped)")?;
                            continue;
                        };
                        session.set_input(line);
                        match session.begin_submit() {
                            Ok(request) => {
                                writeln!(out, "{}", THINKING_NOTICE)?;
                                let transport = transport.clone();
                                let reply_tx = reply_tx.clone();
                                tokio::spawn(async move {
                                    let outcome = transport.post_chat(&request).await;
                                    let _ = reply_tx.send(outcome);
                                });
                            }
                            Err(SubmitRejected::EmptyInput) => {}
                            Err(SubmitRejected::AwaitingReply) => {
                                writeln!(out, "(still waiting for a reply, message not sent)")?;
                            }
                        }
                    }
                    None => {
                        input_open = false;
                    }
                }
            }
            Some(outcome) = reply_rx.recv() => {
                if let Some(turn) = session.complete(outcome) {
                    writeln!(out, "{}", format_turn(turn))?;
                }
            }
        }

        if !input_open && !session.is_loading() {
            break;
        }
    }

    Ok(session)
}
