use log::error;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{ self, AsyncBufReadExt, AsyncWriteExt, BufReader };

use crate::agent::HealthAgent;

/// Interactive terminal chat. One session for the process lifetime;
/// `:speak` replays the last assistant reply through the local output
/// device.
pub async fn run_repl(
    agent: Arc<HealthAgent>,
    session_id: &str
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    let mut last_reply: Option<String> = None;

    stdout.write_all(
        b"HealthBuddy ready. Ask a health question, :speak to hear the last reply, :quit to exit.\n"
    ).await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => {
                continue;
            }
            ":quit" | ":q" => {
                break;
            }
            ":speak" => {
                match &last_reply {
                    Some(text) => {
                        if let Err(e) = agent.speak(text, None).await {
                            error!("Speech playback failed: {}", e);
                        }
                    }
                    None => {
                        stdout.write_all(b"Nothing to speak yet.\n").await?;
                    }
                }
            }
            text => {
                let reply = agent.chat(session_id, text, None, None).await?;
                stdout.write_all(format!("\n{}\n", reply.content).as_bytes()).await?;
                if let Some(sources) = &reply.sources {
                    stdout.write_all(b"References:\n").await?;
                    for source in sources {
                        stdout.write_all(
                            format!("  - {} ({})\n", source.title, source.uri).as_bytes()
                        ).await?;
                    }
                }
                stdout.write_all(b"\n").await?;
                last_reply = Some(reply.content);
            }
        }
    }
    Ok(())
}
