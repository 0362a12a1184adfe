//! Load-test driver for the framed RPC server.
//!
//! Opens many connections and fires bursts of text-join requests, writing
//! each frame in deliberately fragmented chunks to exercise the server's
//! reassembly path. Reports send count, error count, and elapsed time per
//! worker.

use std::time::{Duration, Instant};

use clap::Parser;
use rand::Rng;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use framed_rpc::protocol::wire::{self, STATUS_OK};
use framed_rpc::protocol::FrameBuffer;
use framed_rpc::service::text_join;

const READ_BUFSIZE: usize = 4096;

/// Boundaries at which each request frame is split before sending, with a
/// short pause between chunks so the server sees genuinely partial reads.
const SPLIT_POINTS: [usize; 3] = [10, 50, 500];

#[derive(Parser)]
#[command(name = "load-test")]
#[command(about = "Burst load driver for the framed RPC server", long_about = None)]
struct Cli {
    /// Server host
    host: String,

    /// Server port
    port: u16,

    /// Connections opened per worker, sequentially
    connections: u32,

    /// Requests sent on each connection
    requests_per_connection: u32,

    /// Concurrent workers
    #[arg(short, long, default_value_t = 4)]
    workers: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);

    let mut handles = Vec::new();
    for worker in 0..cli.workers {
        let addr = addr.clone();
        let connections = cli.connections;
        let requests = cli.requests_per_connection;
        handles.push(tokio::spawn(async move {
            run_worker(worker, &addr, connections, requests).await
        }));
    }

    let mut sent = 0u64;
    let mut errors = 0u64;
    for handle in handles {
        let (s, e) = handle.await??;
        sent += s;
        errors += e;
    }

    println!("Done: sent = {}, errors = {}", sent, errors);
    Ok(())
}

async fn run_worker(
    worker: u32,
    addr: &str,
    connections: u32,
    requests_per_connection: u32,
) -> Result<(u64, u64), Box<dyn std::error::Error + Send + Sync>> {
    let body = text_join::encode_body(
        &"lorem ipsum dolor sit amet ".repeat(8),
        &"consectetur adipiscing elit ".repeat(8),
    );

    let mut sent = 0u64;
    let mut errors = 0u64;
    let start = Instant::now();

    for _ in 0..connections {
        let mut stream = TcpStream::connect(addr).await?;
        let mut frames = FrameBuffer::responses(u32::MAX);
        let mut read_buf = [0u8; READ_BUFSIZE];

        for _ in 0..requests_per_connection {
            sent += 1;
            let request_id: u32 = rand::thread_rng().gen_range(0..1_000_000);
            let frame = wire::encode_request(request_id, &body);

            send_fragmented(&mut stream, &frame).await?;

            let response = loop {
                let count = stream.read(&mut read_buf).await?;
                if count == 0 {
                    return Err("connection closed mid-response".into());
                }
                if let Some(frame) = frames.push(&read_buf[..count])?.into_iter().next() {
                    break frame;
                }
            };

            if response.status() != STATUS_OK || response.request_id() != request_id {
                errors += 1;
            }
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    println!(
        "[worker-{:02}] sent = {:7}, errors = {:7}, elapsed = {:.3} sec",
        worker, sent, errors, elapsed
    );

    Ok((sent, errors))
}

/// Write a frame in several chunks with pauses in between, so the bytes
/// arrive at the server across multiple reads.
async fn send_fragmented(
    stream: &mut TcpStream,
    frame: &[u8],
) -> std::io::Result<()> {
    let mut from = 0;
    for split in SPLIT_POINTS {
        let to = split.min(frame.len());
        if to <= from {
            break;
        }
        stream.write_all(&frame[from..to]).await?;
        tokio::time::sleep(Duration::from_millis(5)).await;
        from = to;
    }
    if from < frame.len() {
        stream.write_all(&frame[from..]).await?;
    }
    Ok(())
}
