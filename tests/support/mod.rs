// Boots one arena server per test binary and hands out its address.
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

static SERVER_ADDR: OnceLock<String> = OnceLock::new();

/// Returns `host:port` of the shared test server, starting it on first use.
pub fn ensure_server() -> &'static str {
    SERVER_ADDR.get_or_init(|| {
        let published = Arc::new(OnceLock::<String>::new());
        let published_thread = Arc::clone(&published);

        // The server gets its own thread and runtime so it outlives each `#[tokio::test]` runtime.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("local addr");
                let _ = published_thread.set(addr.to_string());
                arena_server::run(listener).await.expect("server failed");
            });
        });

        wait_until_accepting(&published)
    })
}

pub fn http_url(path: &str) -> String {
    format!("http://{}{path}", ensure_server())
}

pub fn ws_url() -> String {
    format!("ws://{}/ws", ensure_server())
}

fn wait_until_accepting(published: &OnceLock<String>) -> String {
    let addr = loop {
        if let Some(addr) = published.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return addr;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}
