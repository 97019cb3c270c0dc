use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

use dmjournal::journal::{chunk_text, send_chunked, PLATFORM_MESSAGE_LIMIT};
use dmjournal::transport::{ChannelSink, Destination, MessageSink};

/// Sink that accepts a fixed number of sends and then fails.
struct FlakySink {
    sent: Mutex<Vec<String>>,
    accept: usize,
}

#[async_trait]
impl MessageSink for FlakySink {
    async fn send(&self, _to: &Destination, content: &str) -> Result<()> {
        let mut sent = self.sent.lock().unwrap();
        if sent.len() >= self.accept {
            return Err(anyhow!("transport rejected message"));
        }
        sent.push(content.to_string());
        Ok(())
    }
}

#[test]
fn concatenated_chunks_reproduce_input() {
    let samples = [
        String::new(),
        "short".to_string(),
        "📓".repeat(PLATFORM_MESSAGE_LIMIT),
        "line\n".repeat(1234),
        format!("{}tail", "ü".repeat(3999)),
    ];
    for text in samples.iter() {
        for limit in [1usize, 7, 500, PLATFORM_MESSAGE_LIMIT] {
            let chunks = chunk_text(text, limit);
            let len = text.chars().count();
            assert_eq!(chunks.len(), len.div_ceil(limit), "limit {}", limit);
            assert!(chunks.iter().all(|c| c.chars().count() <= limit));
            assert_eq!(chunks.concat(), *text);
        }
    }
}

#[tokio::test]
async fn sends_chunks_in_order_to_one_destination() {
    let (sink, mut rx) = ChannelSink::pair();
    let to = Destination::Direct("alice".into());
    let text: String = (0..4500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();

    let sent = send_chunked(&sink, &to, &text, PLATFORM_MESSAGE_LIMIT)
        .await
        .unwrap();
    assert_eq!(sent, 3);

    let mut received = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        assert_eq!(msg.to, to);
        received.push(msg.content);
    }
    assert_eq!(received.len(), 3);
    assert_eq!(received[0].chars().count(), 2000);
    assert_eq!(received[2].chars().count(), 500);
    assert_eq!(received.concat(), text);
}

#[tokio::test]
async fn empty_text_sends_nothing() {
    let (sink, mut rx) = ChannelSink::pair();
    let sent = send_chunked(&sink, &Destination::Channel("general".into()), "", 2000)
        .await
        .unwrap();
    assert_eq!(sent, 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn send_failure_stops_remaining_chunks() {
    let sink = FlakySink {
        sent: Mutex::new(Vec::new()),
        accept: 1,
    };
    let text = "x".repeat(25);
    let result = send_chunked(&sink, &Destination::Direct("bob".into()), &text, 10).await;
    assert!(result.is_err());
    assert_eq!(sink.sent.lock().unwrap().len(), 1);
}
