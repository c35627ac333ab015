use super::*;
use crate::testing::{self, STEP};
use tokio::{io::AsyncWriteExt, time::timeout};

async fn connect(address: SocketAddr) -> Connection {
    timeout(
        STEP,
        Connection::connect(&Endpoint::from(address), None, 64),
    )
    .await
    .expect("should not timeout")
    .expect("should connect to the tracker")
}

#[tokio::test]
async fn connect_and_send() {
    let (listener, address) = testing::tracker().await;
    let handle = tokio::spawn(async move {
        let mut stream = testing::accept(&listener).await;
        testing::read_lines(&mut stream, 2).await
    });

    let mut connection = connect(address).await;
    assert_eq!(connection.peer_addr(), address);
    let first = Command::set("ENABLE_SEND_DATA", true).expect("should be a valid command");
    let second = Command::set("ENABLE_SEND_TIME", true).expect("should be a valid command");
    connection
        .send_all(&[first, second])
        .await
        .expect("should send the commands");

    let lines = timeout(STEP, handle)
        .await
        .expect("should not timeout")
        .expect("should complete successfully");
    assert_eq!(
        lines,
        vec![
            String::from("<SET ID=\"ENABLE_SEND_DATA\" STATE=\"1\" />\r\n"),
            String::from("<SET ID=\"ENABLE_SEND_TIME\" STATE=\"1\" />\r\n"),
        ]
    );
}

#[tokio::test]
async fn connect_with_timeout() {
    let (listener, address) = testing::tracker().await;
    let handle = tokio::spawn(async move { testing::accept(&listener).await });

    let connection = timeout(
        STEP,
        Connection::connect(&Endpoint::from(address), Some(STEP), 64),
    )
    .await
    .expect("should not timeout")
    .expect("should connect to the tracker");
    assert_eq!(connection.peer_addr(), address);

    timeout(STEP, handle)
        .await
        .expect("should not timeout")
        .expect("should complete successfully");
}

#[tokio::test]
async fn connect_times_out() {
    let (_listener, address, _queued) = testing::stalled_tracker().await;
    let limit = Duration::from_millis(50);

    let error = timeout(
        STEP,
        Connection::connect(&Endpoint::from(address), Some(limit), 64),
    )
    .await
    .expect("should not timeout")
    .expect_err("should not connect to a full backlog");
    assert!(matches!(error, Error::Timeout(elapsed) if elapsed == limit));
}

#[tokio::test]
async fn connect_refused() {
    let (listener, address) = testing::tracker().await;
    std::mem::drop(listener);

    let error = timeout(
        STEP,
        Connection::connect(&Endpoint::from(address), None, 64),
    )
    .await
    .expect("should not timeout")
    .expect_err("should not connect to a closed port");
    assert!(matches!(error, Error::Io(_)));
}

#[tokio::test]
async fn recv_reassembles_records() {
    let (listener, address) = testing::tracker().await;
    let handle = tokio::spawn(async move {
        let mut stream = testing::accept(&listener).await.into_inner();
        for chunk in [&b"<REC CNT=\"1\" />\r\n<REC C"[..], &b"NT=\"2\" />\r\n"[..]] {
            stream.write_all(chunk).await.expect("should write");
            stream.flush().await.expect("should flush");
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    });

    let mut connection = connect(address).await;
    for expected in [&b"<REC CNT=\"1\" />"[..], &b"<REC CNT=\"2\" />"[..]] {
        let record = timeout(STEP, connection.recv())
            .await
            .expect("should not timeout")
            .expect("should receive without errors")
            .expect("should receive a record");
        assert_eq!(record.as_bytes(), expected);
    }

    timeout(STEP, handle)
        .await
        .expect("should not timeout")
        .expect("should complete successfully");
    let end = timeout(STEP, connection.recv())
        .await
        .expect("should not timeout")
        .expect("should receive without errors");
    assert!(end.is_none());
}

#[tokio::test]
async fn recv_rejects_overlong_record() {
    let (listener, address) = testing::tracker().await;
    let handle = tokio::spawn(async move {
        let mut stream = testing::accept(&listener).await.into_inner();
        stream
            .write_all(&[b'x'; 256])
            .await
            .expect("should write");
        stream
    });

    let mut connection = connect(address).await;
    let error = timeout(STEP, connection.recv())
        .await
        .expect("should not timeout")
        .expect_err("should reject the record");
    assert!(matches!(error, Error::RecordTooLong { max: 64, .. }));

    std::mem::drop(handle);
}

#[tokio::test]
async fn close_shuts_down_write_half() {
    let (listener, address) = testing::tracker().await;
    let handle = tokio::spawn(async move {
        let mut stream = testing::accept(&listener).await;
        let mut line = String::new();
        tokio::io::AsyncBufReadExt::read_line(&mut stream, &mut line)
            .await
            .expect("should read until end-of-file")
    });

    let connection = connect(address).await;
    timeout(STEP, connection.close())
        .await
        .expect("should not timeout")
        .expect("should close the connection");

    let length = timeout(STEP, handle)
        .await
        .expect("should not timeout")
        .expect("should complete successfully");
    assert_eq!(length, 0);
}
