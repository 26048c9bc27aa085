//! Mock SMTP server for transport tests
//!
//! Speaks just enough ESMTP for lettre over a plain connection: greeting,
//! EHLO with `AUTH PLAIN`, AUTH, MAIL, RCPT, DATA and QUIT. Every command
//! and message body is recorded for assertions.
#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::RwLock,
    task::JoinHandle,
};

/// Something the server received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Command(String),
    /// Message content sent after DATA, without the terminating dot
    Content(String),
}

#[derive(Debug, Clone)]
struct Reply {
    code: u16,
    text: String,
}

impl Reply {
    fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        format!("{} {}\r\n", self.code, self.text).into_bytes()
    }
}

#[derive(Debug, Clone)]
struct ServerConfig {
    auth: Reply,
    data_end: Reply,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            auth: Reply::new(235, "2.7.0 Authentication successful"),
            data_end: Reply::new(250, "2.0.0 OK queued as MOCK123"),
        }
    }
}

/// Running mock server; aborted on drop
pub struct MockSmtpServer {
    addr: SocketAddr,
    received: Arc<RwLock<Vec<Received>>>,
    connections: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockSmtpServer {
    pub fn builder() -> MockSmtpServerBuilder {
        MockSmtpServerBuilder {
            config: ServerConfig::default(),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub async fn received(&self) -> Vec<Received> {
        self.received.read().await.clone()
    }

    /// Command lines in the order received
    pub async fn commands(&self) -> Vec<String> {
        self.received()
            .await
            .into_iter()
            .filter_map(|r| match r {
                Received::Command(line) => Some(line),
                Received::Content(_) => None,
            })
            .collect()
    }

    pub async fn messages(&self) -> Vec<String> {
        self.received()
            .await
            .into_iter()
            .filter_map(|r| match r {
                Received::Content(body) => Some(body),
                Received::Command(_) => None,
            })
            .collect()
    }

    async fn handle_client(
        stream: TcpStream,
        config: Arc<ServerConfig>,
        received: Arc<RwLock<Vec<Received>>>,
    ) -> std::io::Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        writer.write_all(b"220 mock.local ESMTP ready\r\n").await?;
        writer.flush().await?;

        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(());
            }

            let cmd_line = line.trim_end().to_string();
            received.write().await.push(Received::Command(cmd_line.clone()));

            let verb = cmd_line
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_uppercase();

            let reply: Vec<u8> = match verb.as_str() {
                "EHLO" => b"250-mock.local\r\n250 AUTH PLAIN\r\n".to_vec(),
                "HELO" => Reply::new(250, "mock.local").to_bytes(),
                "AUTH" => config.auth.to_bytes(),
                "MAIL" | "RCPT" | "RSET" | "NOOP" => Reply::new(250, "OK").to_bytes(),
                "DATA" => {
                    writer
                        .write_all(&Reply::new(354, "End data with <CR><LF>.<CR><LF>").to_bytes())
                        .await?;
                    writer.flush().await?;

                    let mut content = String::new();
                    loop {
                        line.clear();
                        if reader.read_line(&mut line).await? == 0 {
                            return Ok(());
                        }
                        if line.trim_end() == "." {
                            break;
                        }
                        content.push_str(&line);
                    }
                    received.write().await.push(Received::Content(content));
                    config.data_end.to_bytes()
                }
                "QUIT" => {
                    writer.write_all(&Reply::new(221, "Bye").to_bytes()).await?;
                    writer.flush().await?;
                    return Ok(());
                }
                _ => Reply::new(502, "Command not implemented").to_bytes(),
            };

            writer.write_all(&reply).await?;
            writer.flush().await?;
        }
    }
}

impl Drop for MockSmtpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Builder for [`MockSmtpServer`]
pub struct MockSmtpServerBuilder {
    config: ServerConfig,
}

impl MockSmtpServerBuilder {
    /// Reply sent to any AUTH command
    pub fn with_auth_response(mut self, code: u16, text: impl Into<String>) -> Self {
        self.config.auth = Reply::new(code, text);
        self
    }

    /// Reply sent after the message content
    pub fn with_data_end_response(mut self, code: u16, text: impl Into<String>) -> Self {
        self.config.data_end = Reply::new(code, text);
        self
    }

    pub async fn build(self) -> MockSmtpServer {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock smtp listener");
        let addr = listener.local_addr().expect("mock smtp local addr");

        let config = Arc::new(self.config);
        let received = Arc::new(RwLock::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let handle = tokio::spawn({
            let received = received.clone();
            let connections = connections.clone();
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    connections.fetch_add(1, Ordering::SeqCst);
                    let config = config.clone();
                    let received = received.clone();
                    tokio::spawn(async move {
                        let _ = MockSmtpServer::handle_client(stream, config, received).await;
                    });
                }
            }
        });

        MockSmtpServer {
            addr,
            received,
            connections,
            handle,
        }
    }
}

/// A port with nothing listening on it
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let port = listener.local_addr().expect("probe addr").port();
    drop(listener);
    port
}
