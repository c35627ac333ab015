#![cfg(test)]

use std::{net::SocketAddr, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    net::{TcpListener, TcpSocket, TcpStream},
};

/// Upper bound for any single step of a test.
pub const STEP: Duration = Duration::from_secs(1);

/// Generates a random port in the range `49_152..65_535`.
macro_rules! port {
    () => {
        crate::testing::gen_range(49_152..65_535)
    };
}
pub(crate) use port;

/// Creates a new Ipv4 address.
///
/// This macro has three versions:
///
/// - `ipv4!([127, 0, 0, 1], 12345)` will create the address `127.0.0.1:12345`.
/// - `ipv4!([127, 0, 0, 1])` will create the address `127.0.0.1` with a random port in the range
///   `49_152..65_535`.
/// - `ipv4!()` will create a random address in the range `127.0.0.1-127.0.0.255` with a random
///    port in the range `49_152..65_535`.
macro_rules! ipv4 {
    ([$($addr:tt),*], $port:tt) => {
        ::std::net::SocketAddr::new(::std::net::IpAddr::V4(::std::net::Ipv4Addr::new($($addr),*)), $port)
    };
    ([$($addr:tt),*]) => {
        ::std::net::SocketAddr::new(::std::net::IpAddr::V4(::std::net::Ipv4Addr::new($($addr),*)),
        crate::testing::port!())
    };
    () => {
        ::std::net::SocketAddr::new(
            ::std::net::IpAddr::V4(
                ::std::net::Ipv4Addr::new(127, 0, 0, crate::testing::gen_range(1..255))
            ),
            crate::testing::port!()
        )
    }
}
pub(crate) use ipv4;

/// Generates a random value in the given range.
pub fn gen_range<T, R>(range: R) -> T
where
    T: rand::distributions::uniform::SampleUniform,
    R: rand::distributions::uniform::SampleRange<T>,
{
    use rand::Rng;
    rand::thread_rng().gen_range(range)
}

/// Binds a listener that stands in for the tracker's server.
///
/// Tries a few random loopback addresses in case one of them is already taken.
pub async fn tracker() -> (TcpListener, SocketAddr) {
    let mut last_error = None;
    for _ in 0..8 {
        let address = ipv4!();
        match TcpListener::bind(address).await {
            Ok(listener) => return (listener, address),
            Err(error) => last_error = Some(error),
        }
    }
    panic!("should bind to a loopback address: {last_error:?}");
}

/// Accepts the next client on the `listener`.
pub async fn accept(listener: &TcpListener) -> BufReader<TcpStream> {
    let (stream, _) = tokio::time::timeout(STEP, listener.accept())
        .await
        .expect("should not timeout")
        .expect("should accept a connection");
    BufReader::new(stream)
}

/// Reads `count` lines sent by the client, keeping their terminators.
pub async fn read_lines(stream: &mut BufReader<TcpStream>, count: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(count);
    for _ in 0..count {
        let mut line = String::new();
        let length = tokio::time::timeout(STEP, stream.read_line(&mut line))
            .await
            .expect("should not timeout")
            .expect("should read a line");
        assert_ne!(length, 0, "client closed the connection early");
        lines.push(line);
    }
    lines
}

/// Binds a listener that never accepts, and fills its backlog so that new handshakes stall.
///
/// The returned streams keep the backlog full and must outlive the test.
pub async fn stalled_tracker() -> (TcpListener, SocketAddr, Vec<TcpStream>) {
    let (listener, address) = loop {
        let address = ipv4!();
        let socket = TcpSocket::new_v4().expect("should create a socket");
        if socket.bind(address).is_ok() {
            break (socket.listen(1).expect("should listen"), address);
        }
    };
    let mut queued = Vec::new();
    for _ in 0..4 {
        if let Ok(Ok(stream)) =
            tokio::time::timeout(Duration::from_millis(50), TcpStream::connect(address)).await
        {
            queued.push(stream);
        }
    }
    (listener, address, queued)
}
