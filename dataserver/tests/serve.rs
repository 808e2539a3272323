use std::{fs, time::Duration};

use comms::{BatchRequest, SAMPLE_SIZE, frame_len};
use dataserver::{Closed, Corpus, Mnist, idx, serve_connection};
use tempfile::TempDir;
use tokio::io::{self, AsyncReadExt, AsyncWriteExt};

const IDLE: Duration = Duration::from_secs(10);

/// Sample `i` of a corpus is filled with `i + offset`, and so is its label.
fn numbered(len: usize, offset: u8) -> (Vec<u8>, Vec<u8>) {
    let samples = (0..len)
        .flat_map(|i| [i as u8 + offset; SAMPLE_SIZE])
        .collect();
    let labels = (0..len).map(|i| i as u8 + offset).collect();
    (samples, labels)
}

fn mnist() -> Mnist {
    let (samples, labels) = numbered(20, 0);
    let train = Corpus::new(samples, labels).unwrap();
    let (samples, labels) = numbered(5, 200);
    let test = Corpus::new(samples, labels).unwrap();

    Mnist { train, test }
}

#[tokio::test]
async fn answers_requests_until_the_peer_closes() -> io::Result<()> {
    let mnist = mnist();
    let (mut device, mut server) = io::duplex(8192);

    let device = async move {
        device.write_all(&BatchRequest::new(5, 4).encode()).await?;
        let mut frame = vec![0; frame_len(4)];
        device.read_exact(&mut frame).await?;

        assert_eq!(frame.len(), 3140);
        assert!(frame[..SAMPLE_SIZE].iter().all(|&px| px == 5));
        assert!(frame[3 * SAMPLE_SIZE..4 * SAMPLE_SIZE].iter().all(|&px| px == 8));
        assert_eq!(frame[4 * SAMPLE_SIZE..], [5, 6, 7, 8]);

        device.write_all(&BatchRequest::single(3).encode()).await?;
        let mut frame = vec![0; frame_len(1)];
        device.read_exact(&mut frame).await?;

        assert_eq!(frame.len(), 785);
        assert_eq!(frame[SAMPLE_SIZE], 203);

        io::Result::Ok(())
    };

    let (closed, device) = tokio::join!(serve_connection(&mut server, &mnist, IDLE), device);
    device?;
    assert_eq!(closed?, (2, Closed::Eof));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn closes_idle_connections() -> io::Result<()> {
    let mnist = mnist();
    let (_device, mut server) = io::duplex(64);
    let start = tokio::time::Instant::now();

    let closed = serve_connection(&mut server, &mnist, IDLE).await?;

    assert_eq!(closed, (0, Closed::Idle));
    assert!(start.elapsed() >= IDLE);
    Ok(())
}

#[tokio::test]
async fn closes_on_out_of_range_requests() -> io::Result<()> {
    let mnist = mnist();

    for req in [
        BatchRequest::new(18, 4),
        BatchRequest::new(-1, 1),
        BatchRequest::new(0, -2),
        BatchRequest::single(5),
    ] {
        let (mut device, mut server) = io::duplex(8192);
        device.write_all(&req.encode()).await?;

        let closed = serve_connection(&mut server, &mnist, IDLE).await?;
        assert_eq!(closed, (0, Closed::OutOfRange), "{req:?}");
    }

    Ok(())
}

#[tokio::test]
async fn cut_requests_are_errors() {
    let mnist = mnist();
    // Test sample 0 is all 200s, label included.
    let frame = vec![200; frame_len(1)];

    // One full exchange, then the peer goes away three bytes into the next request.
    let mut stream = tokio_test::io::Builder::new()
        .read(&BatchRequest::single(0).encode())
        .write(&frame)
        .read(&[1, 0, 0])
        .build();

    let err = serve_connection(&mut stream, &mnist, IDLE).await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn loads_the_idx_files_of_a_directory() {
    let dir = TempDir::new().unwrap();
    let (train_samples, train_labels) = numbered(6, 0);
    let (test_samples, test_labels) = numbered(2, 50);

    for (name, bytes) in [
        ("train-images-idx3-ubyte", idx::encode::images(&train_samples)),
        ("train-labels-idx1-ubyte", idx::encode::labels(&train_labels)),
        ("t10k-images-idx3-ubyte", idx::encode::images(&test_samples)),
        ("t10k-labels-idx1-ubyte", idx::encode::labels(&test_labels)),
    ] {
        fs::write(dir.path().join(name), bytes).unwrap();
    }

    let mnist = Mnist::load_dir(dir.path()).unwrap();
    assert_eq!(mnist.train.len(), 6);
    assert_eq!(mnist.test.len(), 2);

    let (_, labels) = mnist.answer(&BatchRequest::single(1)).unwrap();
    assert_eq!(labels, [51]);
}

#[test]
fn missing_files_name_the_path() {
    let dir = TempDir::new().unwrap();

    let err = Mnist::load_dir(dir.path()).unwrap_err();
    assert!(err.to_string().contains("train-images-idx3-ubyte"));
}
