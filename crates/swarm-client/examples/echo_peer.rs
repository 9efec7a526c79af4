use std::error::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Line echo server over a port range. Echoing `EOF\n` back ends an HTTP
/// mode reply, so one peer serves both protocol modes.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let min_port: u16 = args.next().map(|p| p.parse()).transpose()?.unwrap_or(20000);
    let max_port: u16 = args.next().map(|p| p.parse()).transpose()?.unwrap_or(min_port);

    println!("Echo peer on {}:{}-{}", host, min_port, max_port);

    let mut handles = vec![];
    for port in min_port..=max_port {
        let listener = TcpListener::bind((host.as_str(), port)).await?;
        handles.push(tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut conn = BufReader::new(socket);
                    let mut line = String::new();
                    loop {
                        line.clear();
                        match conn.read_line(&mut line).await {
                            Ok(0) | Err(_) => break,
                            Ok(_) => {
                                if conn.get_mut().write_all(line.as_bytes()).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                });
            }
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }
    Ok(())
}
