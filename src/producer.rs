use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use log::{debug, error, info};
use rdkafka::ClientConfig;
use rdkafka::client::ClientContext;
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use rdkafka::producer::{BaseRecord, DeliveryResult, Producer, ProducerContext, ThreadedProducer};
use rdkafka::types::RDKafkaErrorCode;

use crate::codecs;
use crate::config::ProducerConfig;

/// Logs per-message delivery outcomes. Runs on the producer's poll thread,
/// interleaved arbitrarily with the send loop.
pub struct DeliveryLogger;

impl ClientContext for DeliveryLogger {}

impl ProducerContext for DeliveryLogger {
    type DeliveryOpaque = ();

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, _: ()) {
        match delivery_result {
            Ok(message) => {
                let value = String::from_utf8_lossy(message.payload().unwrap_or_default());
                match message.key().and_then(codecs::deserialize_key) {
                    Some(key) => info!("Message {}, {}", key, value),
                    None => info!("Message <no key>, {}", value),
                }
            }
            Err((e, _)) => error!("delivery failed: {}", e),
        }
    }
}

/// Key sequence for one run: `count` values from `start`, stepping by
/// `increment`.
pub struct SequenceRange {
    next: i32,
    remaining: i32,
    increment: i32,
}

impl SequenceRange {
    pub fn new(start: i32, count: i32, increment: i32) -> Self {
        SequenceRange {
            next: start,
            remaining: count,
            increment,
        }
    }
}

impl Iterator for SequenceRange {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.remaining <= 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next;
        self.next = self.next.wrapping_add(self.increment);
        Some(current)
    }
}

fn create_producer(
    properties: &HashMap<String, String>,
) -> anyhow::Result<ThreadedProducer<DeliveryLogger>> {
    let mut client_config = ClientConfig::new();
    for (k, v) in properties {
        client_config.set(k.clone(), v.clone());
    }
    client_config
        .create_with_context(DeliveryLogger)
        .context("failed to create kafka producer")
}

/// Sends the configured sequence of messages, pacing with a blocking sleep,
/// then flushes so pending deliveries complete before returning. Enqueue and
/// delivery failures are logged and never abort the loop.
pub fn run(config: &ProducerConfig) -> anyhow::Result<()> {
    let producer = create_producer(&config.properties)?;
    for seq in SequenceRange::new(config.start_seq, config.num_mesg, config.increment) {
        let key = codecs::serialize_key(seq);
        let value = format!("{} is {}", config.message, seq);
        let record: BaseRecord<'_, [u8], [u8]> = BaseRecord::to(&config.topic)
            .key(&key[..])
            .payload(codecs::serialize_value(&value));
        if let Err((e, _)) = producer.send(record) {
            if let KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull) = e {
                error!("Kafka queue full");
            } else {
                error!("Kafka send error: {}", e);
            }
        }
        debug!("sleeping {}ms before next send", config.delay.as_millis());
        thread::sleep(config.delay);
    }
    producer
        .flush(Duration::from_secs(5))
        .context("failed to flush pending messages")?;
    Ok(())
}
