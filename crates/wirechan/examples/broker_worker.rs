//! Minimal broker/worker pair over a Unix domain socket.
//!
//! The broker binds a socket and asks the worker to shout a greeting; the
//! worker answers on a second message id. Both ends run the same channel
//! stack — the roles differ only in who binds and who connects.
//!
//! Run with:
//!   cargo run --example broker_worker

use std::sync::{Arc, Mutex};

use wirechan::transport::{IpcStream, StreamTransport, UnixDomainSocket};
use wirechan::wire::{PackedDecoder, PackedEncoder, ReceiveAccumulator};
use wirechan::{Channel, Router, WireValue};

const MSG_SHOUT: u32 = 300;
const MSG_SHOUT_REPLY: u32 = 301;

type UdsChannel = Channel<StreamTransport<IpcStream>>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let sock_dir = std::env::temp_dir().join(format!("wirechan-demo-{}", std::process::id()));
    std::fs::create_dir_all(&sock_dir)?;
    let sock_path = sock_dir.join("demo.sock");

    let listener = UnixDomainSocket::bind(&sock_path)?;

    // The worker would normally be a separate sandboxed process; a thread
    // keeps the example self-contained.
    let worker_path = sock_path.clone();
    let worker = std::thread::spawn(move || worker_main(&worker_path));

    let stream = listener.accept()?;
    if let Some((uid, _gid, pid)) = stream.peer_credentials() {
        eprintln!("broker: worker connected (uid {uid}, pid {pid})");
    }
    let mut channel = Channel::new(StreamTransport::new(stream));

    channel.send::<PackedEncoder>(MSG_SHOUT, &[WireValue::from("hello, worker")])?;

    let reply: Arc<Mutex<String>> = Arc::default();
    let slot = Arc::clone(&reply);
    let mut routes = Router::new().route(
        MSG_SHOUT_REPLY,
        move |_msg_id: u32, _ch: &mut UdsChannel, args: &[WireValue]| {
            *slot.lock().unwrap() = args[0].as_str8().unwrap_or_default().to_owned();
            0
        },
    );
    channel.receive::<PackedDecoder<ReceiveAccumulator>, _>(&mut routes)?;

    eprintln!("broker: worker replied {:?}", &*reply.lock().unwrap());

    worker.join().expect("worker thread panicked")?;
    let _ = std::fs::remove_dir_all(&sock_dir);
    Ok(())
}

fn worker_main(sock_path: &std::path::Path) -> Result<(), wirechan::ChannelError> {
    let stream = UnixDomainSocket::connect(sock_path)?;
    let mut channel = Channel::new(StreamTransport::new(stream));

    let mut routes = Router::new().route(
        MSG_SHOUT,
        |_msg_id: u32, ch: &mut UdsChannel, args: &[WireValue]| {
            let text = args[0].as_str8().unwrap_or_default().to_uppercase();
            ch.send::<PackedEncoder>(MSG_SHOUT_REPLY, &[WireValue::from(text)])
                .map(|_| 0)
                .unwrap_or(1)
        },
    );
    channel.receive::<PackedDecoder<ReceiveAccumulator>, _>(&mut routes)?;
    Ok(())
}
