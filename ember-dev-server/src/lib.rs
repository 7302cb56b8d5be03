use anyhow::Result;
use axum::{
    Router,
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

/// Configuration for the local preview server
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Built-site directory to serve and watch
    pub root: PathBuf,
    /// Auto-open browser
    pub open: bool,
    /// Substrings of paths to ignore when watching
    pub ignore: Vec<String>,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            root: PathBuf::from("./out"),
            open: false,
            ignore: vec![],
        }
    }
}

/// Serves the output directory and pushes a reload message over a websocket
/// whenever something under it changes.
pub struct DevServer {
    config: DevServerConfig,
}

#[derive(Clone)]
struct AppState {
    reload_tx: broadcast::Sender<String>,
}

impl DevServer {
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        if !self.config.root.exists() {
            return Err(anyhow::anyhow!(
                "Output directory does not exist: {}",
                self.config.root.display()
            ));
        }

        let (reload_tx, _) = broadcast::channel::<String>(64);
        let state = AppState {
            reload_tx: reload_tx.clone(),
        };

        let watch_root = self.config.root.clone();
        let ignore = self.config.ignore.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_output(watch_root, reload_tx, ignore).await {
                eprintln!("File watcher error: {}", e);
            }
        });

        let app = Router::new()
            .route("/__reload", get(websocket_handler))
            .fallback_service(ServeDir::new(&self.config.root))
            .with_state(state);

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        println!("Serving {} at http://{}", self.config.root.display(), addr);

        if self.config.open {
            if let Err(e) = open::that(format!("http://{}", addr)) {
                eprintln!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| websocket_connection(socket, state.reload_tx))
}

async fn websocket_connection(mut socket: WebSocket, reload_tx: broadcast::Sender<String>) {
    let mut rx = reload_tx.subscribe();

    loop {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Ok(reload_msg) => {
                        if socket.send(Message::Text(reload_msg.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            msg = socket.recv() => {
                if msg.is_none() {
                    break;
                }
            }
        }
    }
}

async fn watch_output(
    root: PathBuf,
    reload_tx: broadcast::Sender<String>,
    ignore: Vec<String>,
) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(64);

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for event in events {
                    let path = event.path.to_string_lossy().to_string();
                    if !ignore.iter().any(|pattern| path.contains(pattern.as_str())) {
                        let _ = tx.blocking_send(event.path);
                    }
                }
            }
        },
    )?;

    debouncer
        .watcher()
        .watch(&root, notify::RecursiveMode::Recursive)?;

    while let Some(path) = rx.recv().await {
        println!("Output changed: {}", path.display());
        let _ = reload_tx.send("reload".to_string());
    }

    Ok(())
}

/// Splice the reload client into a rendered page, just before `</body>` when
/// there is one.
pub fn inject_reload_script(html: &str, host: &str, port: u16) -> String {
    let script = format!(
        r#"<script>
(function () {{
    var socket = new WebSocket('ws://{}:{}/__reload');
    socket.onmessage = function (event) {{
        if (event.data === 'reload') {{
            location.reload();
        }}
    }};
}})();
</script>
"#,
        host, port
    );

    match html.rfind("</body>") {
        Some(pos) => {
            let mut result = String::with_capacity(html.len() + script.len());
            result.push_str(&html[..pos]);
            result.push_str(&script);
            result.push_str(&html[pos..]);
            result
        }
        None => format!("{}{}", html, script),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_lands_before_the_body_close() {
        let html = "<html><body><p>hi</p></body></html>";
        let injected = inject_reload_script(html, "127.0.0.1", 3000);
        let script_pos = injected.find("__reload").unwrap();
        let body_pos = injected.find("</body>").unwrap();
        assert!(script_pos < body_pos);
        assert!(injected.contains("ws://127.0.0.1:3000/__reload"));
    }

    #[test]
    fn pages_without_a_body_get_the_script_appended() {
        let injected = inject_reload_script("<p>fragment</p>", "localhost", 8080);
        assert!(injected.ends_with("</script>\n"));
    }
}
