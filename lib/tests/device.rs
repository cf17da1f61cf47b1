// Copyright (c) 2023-2024 The Spacemesh Ledger Contributors

use std::time::Duration;

use ledger_spacemesh::{
    apdu::{
        path::Path,
        sign::{Domain, SignPayload},
        Instruction,
    },
    DeviceConfig, DeviceHandle, Error, Operation,
};

mod helpers;
use helpers::*;

#[tokio::test]
async fn app_version() {
    setup_logging();

    let t = MockTransport::new([Reply::Ok(vec![0, 1, 2, 3, 0, 0x33, 0x10, 0x00, 0x04])]);
    let h = DeviceHandle::from(t.clone());

    let v = h.app_version().await.unwrap();
    assert!(!v.test_mode);
    assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));
    assert!(!v.device_locked);
    assert_eq!(v.target_id, Some([0x33, 0x10, 0x00, 0x04]));

    // Bare command, no data
    let sent = t.sent();
    assert_eq!(sent[0].command, [0x45, Instruction::GetVersion as u8, 0, 0, 0]);
    assert_eq!(sent[0].timeout, h.config().request_timeout);
}

#[tokio::test]
async fn app_version_errors() {
    let t = MockTransport::new([Reply::Ok(vec![0, 1])]);
    let h = DeviceHandle::from(t);
    assert!(matches!(
        h.app_version().await,
        Err(Error::MalformedResponse)
    ));

    let t = MockTransport::new([Reply::Status(0x6e01)]);
    let h = DeviceHandle::from(t);
    assert!(matches!(
        h.app_version().await,
        Err(Error::DeviceRejected {
            status: 0x6e01,
            code: Some(_)
        })
    ));

    let t = MockTransport::new([]);
    let h = DeviceHandle::from(t);
    assert!(matches!(
        h.app_version().await,
        Err(Error::Transport {
            operation: Operation::Version,
            ..
        })
    ));
}

#[test]
fn config_validation() {
    let t = MockTransport::new([]);

    for chunk_size in [0, 20, 256, 1024] {
        let cfg = DeviceConfig {
            chunk_size,
            ..Default::default()
        };
        assert!(
            matches!(
                DeviceHandle::with_config(t.clone(), cfg),
                Err(Error::Configuration(_))
            ),
            "chunk size {} accepted",
            chunk_size
        );
    }

    let cfg = DeviceConfig {
        request_timeout: Duration::ZERO,
        ..Default::default()
    };
    assert!(matches!(
        DeviceHandle::with_config(t.clone(), cfg),
        Err(Error::Configuration(_))
    ));

    for chunk_size in [21, 64, 250, 255] {
        let cfg = DeviceConfig {
            chunk_size,
            ..Default::default()
        };
        let h = DeviceHandle::with_config(t.clone(), cfg).unwrap();
        assert_eq!(h.config().chunk_size, chunk_size);
    }
}

#[tokio::test]
async fn small_chunk_size() {
    let cfg = DeviceConfig {
        chunk_size: 32,
        ..Default::default()
    };

    let message = [0x42; 100];
    let payload = SignPayload::new(&[], Domain::Proposal, &message);

    // 20 byte path + 101 byte payload in 32 byte chunks
    let t = MockTransport::new(chunked_replies(4, Reply::Ok(vec![0x01; 64])));
    let h = DeviceHandle::with_config(t.clone(), cfg).unwrap();

    h.sign(&Path::spacemesh(0, 0, 0), &payload).await.unwrap();

    let sent = t.sent();
    assert_eq!(sent.len(), 4);
    for s in &sent {
        let (_, d) = s.parse();
        assert!(d.len() <= 32);
    }
}

#[tokio::test]
async fn concurrent_operations_do_not_interleave() {
    setup_logging();

    let message = [0x42; 600];
    let payload = SignPayload::new(&[], Domain::Ballot, &message);
    let path = Path::spacemesh(0, 0, 0);

    // Two three-chunk operations
    let mut replies = chunked_replies(3, Reply::Ok(vec![0x01; 64]));
    replies.extend(chunked_replies(3, Reply::Ok(vec![0x02; 64])));

    let t = MockTransport::new(replies);
    let h = DeviceHandle::from(t.clone());

    let (a, b) = tokio::join!(h.sign(&path, &payload), h.sign(&path, &payload));
    a.unwrap();
    b.unwrap();

    // Each operation sends its chunks contiguously
    let ordinals: Vec<_> = t.sent().iter().map(|s| s.parse().0.p1).collect();
    assert_eq!(ordinals, [1, 2, 3, 1, 2, 3]);
}

#[test]
fn path_errors() {
    use std::str::FromStr;

    let e: Error = Path::from_str("m/44'/540'").unwrap_err().into();
    assert!(matches!(e, Error::InvalidPath(_)));
    assert_eq!(
        e.to_string(),
        "Invalid path: expected 5 path components, found 2"
    );
}
